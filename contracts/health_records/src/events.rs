use crate::FileKind;
use soroban_sdk::{symbol_short, Address, Env, String};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

/// Event published when a new record's metadata is stored.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordAddedEvent {
    pub record_id: u64,
    pub patient: Address,
    pub file_type: FileKind,
    pub timestamp: u64,
}

/// Event published when a record's metadata is updated.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordUpdatedEvent {
    pub record_id: u64,
    pub patient: Address,
    pub timestamp: u64,
}

/// Event published when a record is soft-deleted. Consumed off-chain to
/// unpin the content address.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordDeletedEvent {
    pub record_id: u64,
    pub patient: Address,
    pub cid: String,
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

pub fn publish_record_added(env: &Env, record_id: u64, patient: Address, file_type: FileKind) {
    let topics = (symbol_short!("REC_ADD"), patient.clone());
    let data = RecordAddedEvent {
        record_id,
        patient,
        file_type,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_record_updated(env: &Env, record_id: u64, patient: Address) {
    let topics = (symbol_short!("REC_UPD"), patient.clone());
    let data = RecordUpdatedEvent {
        record_id,
        patient,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_record_deleted(env: &Env, record_id: u64, patient: Address, cid: String) {
    let topics = (symbol_short!("REC_DEL"), patient.clone());
    let data = RecordDeletedEvent {
        record_id,
        patient,
        cid,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
