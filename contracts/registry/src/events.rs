use healthchain_common::Role;
use soroban_sdk::{symbol_short, Address, Env, String};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

/// Event published when a wallet registers for the first time.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserRegisteredEvent {
    pub user: Address,
    pub role: Role,
    pub full_name: String,
    pub timestamp: u64,
}

/// Event published when an existing profile's fields are updated.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProfileUpdatedEvent {
    pub user: Address,
    pub timestamp: u64,
}

/// Event published when an admin verifies a doctor's credentials.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DoctorVerifiedEvent {
    pub doctor: Address,
    pub verifier: Address,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_user_registered(env: &Env, user: Address, role: Role, full_name: String) {
    let topics = (symbol_short!("USR_REG"), user.clone());
    let data = UserRegisteredEvent {
        user,
        role,
        full_name,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_profile_updated(env: &Env, user: Address) {
    let topics = (symbol_short!("USR_UPD"), user.clone());
    let data = ProfileUpdatedEvent {
        user,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when a doctor's credentials pass admin review.
pub fn publish_doctor_verified(env: &Env, doctor: Address, verifier: Address) {
    let topics = (symbol_short!("DOC_VER"), doctor.clone(), verifier.clone());
    let data = DoctorVerifiedEvent {
        doctor,
        verifier,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
