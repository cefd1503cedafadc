//! Persistence layer for access-request rows and their wallet indexes.
//!
//! Rows are keyed by a monotonically assigned id; per-doctor and per-patient
//! indexes hold ids in creation order. Creation order equals send order here
//! (requests are created directly as sent), so reverse index iteration yields
//! the newest-first listing the dashboards expect.

use healthchain_common::RequestStatus;
use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

const REQUEST_CTR: Symbol = symbol_short!("REQ_CTR");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// The central entity of the platform: one doctor's request for time-boxed
/// access to a set of a patient's records.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRequest {
    pub id: u64,
    pub doctor: Address,
    pub patient: Address,
    /// Empty means a general request covering all of the patient's records.
    pub record_ids: Vec<u64>,
    pub purpose: String,
    pub status: RequestStatus,
    /// Set only when the patient denies the request.
    pub denial_reason: Option<String>,
    pub created_at: u64,
    pub sent_at: u64,
    /// 0 until the patient responds.
    pub responded_at: u64,
    /// `sent_at + duration`; 0 means no expiry.
    pub expires_at: u64,
}

fn request_key(request_id: u64) -> (Symbol, u64) {
    (symbol_short!("REQUEST"), request_id)
}

fn doctor_index_key(doctor: &Address) -> (Symbol, Address) {
    (symbol_short!("DOC_IDX"), doctor.clone())
}

fn patient_index_key(patient: &Address) -> (Symbol, Address) {
    (symbol_short!("PAT_IDX"), patient.clone())
}

fn extend_ttl_request_key(env: &Env, key: &(Symbol, u64)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn extend_ttl_index_key(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Allocate the next request id.
pub fn next_request_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&REQUEST_CTR)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&REQUEST_CTR, &id);
    id
}

/// Highest id assigned so far (0 when no requests exist).
pub fn request_count(env: &Env) -> u64 {
    env.storage().instance().get(&REQUEST_CTR).unwrap_or(0)
}

pub fn save_request(env: &Env, request: &AccessRequest) {
    let key = request_key(request.id);
    env.storage().persistent().set(&key, request);
    extend_ttl_request_key(env, &key);
}

pub fn load_request(env: &Env, request_id: u64) -> Option<AccessRequest> {
    env.storage().persistent().get(&request_key(request_id))
}

/// Append a freshly created request to both wallet indexes.
pub fn index_request(env: &Env, request: &AccessRequest) {
    for key in [
        doctor_index_key(&request.doctor),
        patient_index_key(&request.patient),
    ] {
        let mut ids: Vec<u64> = env
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or(Vec::new(env));
        ids.push_back(request.id);
        env.storage().persistent().set(&key, &ids);
        extend_ttl_index_key(env, &key);
    }
}

/// Ids of all requests filed by a doctor, in creation order.
pub fn doctor_request_ids(env: &Env, doctor: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&doctor_index_key(doctor))
        .unwrap_or(Vec::new(env))
}

/// Ids of all requests addressed to a patient, in creation order.
pub fn patient_request_ids(env: &Env, patient: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&patient_index_key(patient))
        .unwrap_or(Vec::new(env))
}

/// Find a live pending request by this doctor for the identical
/// (patient, record-set) pair. Requests that have already passed their
/// deadline no longer block re-requesting, even before the expiry is
/// persisted.
pub fn find_pending_duplicate(
    env: &Env,
    doctor: &Address,
    patient: &Address,
    record_ids: &Vec<u64>,
    now: u64,
) -> Option<u64> {
    for id in doctor_request_ids(env, doctor).iter() {
        if let Some(req) = load_request(env, id) {
            if req.status == RequestStatus::Sent
                && !healthchain_common::lifecycle::has_timed_out(
                    req.status,
                    req.expires_at,
                    now,
                )
                && req.patient == *patient
                && req.record_ids == *record_ids
            {
                return Some(id);
            }
        }
    }
    None
}
