use soroban_sdk::{symbol_short, Address, Env, String};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub registry: Address,
    pub records: Address,
    pub timestamp: u64,
}

/// Event published when a doctor files a new access request.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestCreatedEvent {
    pub request_id: u64,
    pub doctor: Address,
    pub patient: Address,
    pub record_count: u32,
    pub expires_at: u64,
    pub timestamp: u64,
}

/// Event published when a patient approves a request.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestApprovedEvent {
    pub request_id: u64,
    pub doctor: Address,
    pub patient: Address,
    pub expires_at: u64,
    pub timestamp: u64,
}

/// Event published when a patient denies a request.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestDeniedEvent {
    pub request_id: u64,
    pub doctor: Address,
    pub patient: Address,
    pub reason: Option<String>,
    pub timestamp: u64,
}

/// Event published when a patient explicitly revokes a request.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestRevokedEvent {
    pub request_id: u64,
    pub doctor: Address,
    pub patient: Address,
    pub timestamp: u64,
}

/// Event published when a request's expiry deadline is persisted, either by
/// a lazy transition during a patient action or by the sweep.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestExpiredEvent {
    pub request_id: u64,
    pub doctor: Address,
    pub patient: Address,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address, registry: Address, records: Address) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        registry,
        records,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_request_created(
    env: &Env,
    request_id: u64,
    doctor: Address,
    patient: Address,
    record_count: u32,
    expires_at: u64,
) {
    let topics = (symbol_short!("REQ_NEW"), doctor.clone(), patient.clone());
    let data = RequestCreatedEvent {
        request_id,
        doctor,
        patient,
        record_count,
        expires_at,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_request_approved(
    env: &Env,
    request_id: u64,
    doctor: Address,
    patient: Address,
    expires_at: u64,
) {
    let topics = (symbol_short!("REQ_APPR"), doctor.clone(), patient.clone());
    let data = RequestApprovedEvent {
        request_id,
        doctor,
        patient,
        expires_at,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_request_denied(
    env: &Env,
    request_id: u64,
    doctor: Address,
    patient: Address,
    reason: Option<String>,
) {
    let topics = (symbol_short!("REQ_DENY"), doctor.clone(), patient.clone());
    let data = RequestDeniedEvent {
        request_id,
        doctor,
        patient,
        reason,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_request_revoked(env: &Env, request_id: u64, doctor: Address, patient: Address) {
    let topics = (symbol_short!("REQ_RVK"), doctor.clone(), patient.clone());
    let data = RequestRevokedEvent {
        request_id,
        doctor,
        patient,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_request_expired(env: &Env, request_id: u64, doctor: Address, patient: Address) {
    let topics = (symbol_short!("REQ_EXP"), doctor.clone(), patient.clone());
    let data = RequestExpiredEvent {
        request_id,
        doctor,
        patient,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
