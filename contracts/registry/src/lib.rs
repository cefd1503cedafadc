#![no_std]
//! User & role directory: resolves a wallet to its role and profile.
//!
//! Registration is self-service on first wallet link. The role chosen at
//! registration is immutable afterwards; re-registering with the same role
//! updates profile fields only. Profiles are never hard-deleted. Doctor
//! credential review is an admin action that flips the `verified` flag.

pub mod events;

use healthchain_common::Role;
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, String,
    Symbol,
};

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

const MIN_NAME_LEN: u32 = 2;
const MAX_NAME_LEN: u32 = 64;

fn user_key(user: &Address) -> (Symbol, Address) {
    (symbol_short!("USER"), user.clone())
}

fn extend_ttl_user_key(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// A registered user's profile. The wallet address is the unique key.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserProfile {
    pub address: Address,
    pub role: Role,
    pub full_name: String,
    pub contact: String,
    pub license_number: Option<String>,
    pub specialization: Option<String>,
    pub hospital_affiliation: Option<String>,
    pub verified: bool,
    pub registered_at: u64,
    pub updated_at: u64,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RegistryError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    UserNotFound = 4,
    InvalidName = 5,
    MissingCredentials = 6,
    RoleImmutable = 7,
    NotADoctor = 8,
}

/// Names must be printable ASCII within length bounds.
fn validate_name(name: &String) -> Result<(), RegistryError> {
    let len = name.len();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(RegistryError::InvalidName);
    }

    let mut buf = [0u8; MAX_NAME_LEN as usize];
    name.copy_into_slice(&mut buf[..len as usize]);
    for &b in &buf[..len as usize] {
        if !(32..=126).contains(&b) {
            return Err(RegistryError::InvalidName);
        }
    }

    Ok(())
}

#[contract]
pub struct RegistryContract;

#[contractimpl]
impl RegistryContract {
    /// Initialize the directory with an admin address.
    pub fn initialize(env: Env, admin: Address) -> Result<(), RegistryError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(RegistryError::AlreadyInitialized);
        }

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);

        events::publish_initialized(&env, admin);

        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, RegistryError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(RegistryError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    /// Register the calling wallet, or update its profile fields.
    ///
    /// The first registration fixes the role permanently. Doctors must supply
    /// a license number; their `verified` flag starts false and only an admin
    /// review sets it.
    pub fn register(
        env: Env,
        user: Address,
        role: Role,
        full_name: String,
        contact: String,
        license_number: Option<String>,
        specialization: Option<String>,
        hospital_affiliation: Option<String>,
    ) -> Result<(), RegistryError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(RegistryError::NotInitialized);
        }
        user.require_auth();

        validate_name(&full_name)?;

        if role == Role::Doctor {
            match &license_number {
                Some(license) if license.len() > 0 => {}
                _ => return Err(RegistryError::MissingCredentials),
            }
        }

        let key = user_key(&user);
        let now = env.ledger().timestamp();

        let existing: Option<UserProfile> = env.storage().persistent().get(&key);
        let is_new = existing.is_none();
        let profile = match existing {
            Some(prior) => {
                if prior.role != role {
                    return Err(RegistryError::RoleImmutable);
                }
                UserProfile {
                    address: user.clone(),
                    role,
                    full_name: full_name.clone(),
                    contact,
                    license_number,
                    specialization,
                    hospital_affiliation,
                    verified: prior.verified,
                    registered_at: prior.registered_at,
                    updated_at: now,
                }
            }
            None => UserProfile {
                address: user.clone(),
                role,
                full_name: full_name.clone(),
                contact,
                license_number,
                specialization,
                hospital_affiliation,
                verified: false,
                registered_at: now,
                updated_at: now,
            },
        };

        env.storage().persistent().set(&key, &profile);
        extend_ttl_user_key(&env, &key);

        if is_new {
            events::publish_user_registered(&env, user, role, full_name);
        } else {
            events::publish_profile_updated(&env, user);
        }

        Ok(())
    }

    /// Resolve a wallet to its profile. `None` is the expected answer for a
    /// freshly connected, unregistered wallet, not an error.
    pub fn get_user(env: Env, user: Address) -> Option<UserProfile> {
        env.storage().persistent().get(&user_key(&user))
    }

    /// Admin credential review: mark a doctor's license as verified.
    pub fn verify_doctor(env: Env, caller: Address, doctor: Address) -> Result<(), RegistryError> {
        caller.require_auth();

        let admin = Self::get_admin(env.clone())?;
        if caller != admin {
            return Err(RegistryError::Unauthorized);
        }

        let key = user_key(&doctor);
        let mut profile: UserProfile = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(RegistryError::UserNotFound)?;

        if profile.role != Role::Doctor {
            return Err(RegistryError::NotADoctor);
        }

        profile.verified = true;
        profile.updated_at = env.ledger().timestamp();
        env.storage().persistent().set(&key, &profile);
        extend_ttl_user_key(&env, &key);

        events::publish_doctor_verified(&env, doctor, caller);

        Ok(())
    }

    pub fn is_verified(env: Env, user: Address) -> bool {
        Self::get_user(env, user).map_or(false, |p| p.verified)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }
}
