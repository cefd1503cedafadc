#![no_std]
//! Access-request lifecycle and permission resolution.
//!
//! Doctors file time-boxed requests against a patient's records; patients
//! approve, deny, or revoke them; expiry happens by clock. The permission a
//! viewer holds on a record is never stored: it is derived on demand from
//! the request rows, the clock, and the records' soft-delete markers, through
//! the shared derivation in `healthchain_common`.

pub mod errors;
pub mod events;
pub mod store;

use healthchain_common::lifecycle::{can_transition, has_timed_out};
use healthchain_common::resolution::{effective_status, resolve_permission};
use healthchain_common::{Permission, RequestFacts, RequestStatus, Role};
use health_records::HealthRecordsContractClient;
use registry::RegistryContractClient;
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, Env, String, Symbol, Vec,
};

pub use errors::{ContractError, ErrorCategory, ErrorSeverity};
pub use store::AccessRequest;

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const REGISTRY: Symbol = symbol_short!("REGISTRY");
const RECORDS: Symbol = symbol_short!("RECORDS");

const MAX_PURPOSE_LEN: u32 = 500;

/// Access windows run from one hour to one year.
const MIN_DURATION_SECONDS: u64 = 3600;
const MAX_DURATION_SECONDS: u64 = 31_536_000;

/// A request row joined with the display fields the dashboards need,
/// populated at query time and never persisted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestSummary {
    pub request: AccessRequest,
    pub doctor_name: String,
    pub patient_name: String,
    pub record_titles: Vec<String>,
    pub all_records_deleted: bool,
    /// Persisted status overlaid with lazy expiry and implicit revocation.
    pub effective_status: RequestStatus,
}

#[contract]
pub struct AccessRequestsContract;

#[contractimpl]
impl AccessRequestsContract {
    /// Initialize with an admin and the registry / records contract ids.
    pub fn initialize(
        env: Env,
        admin: Address,
        registry: Address,
        records: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&REGISTRY, &registry);
        env.storage().instance().set(&RECORDS, &records);
        env.storage().instance().set(&INITIALIZED, &true);

        events::publish_initialized(&env, admin, registry, records);

        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_registry(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&REGISTRY)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_records(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&RECORDS)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    /// File a new access request. The request is live (`Sent`) immediately,
    /// with its expiry fixed at `now + duration_seconds`.
    ///
    /// An empty `record_ids` set asks for general access to all of the
    /// patient's records. A duplicate of a still-pending request for the
    /// identical (patient, record-set) pair is rejected; the check and the
    /// insert run inside one transaction, so no second duplicate can slip in
    /// between them.
    pub fn create_request(
        env: Env,
        doctor: Address,
        patient: Address,
        record_ids: Vec<u64>,
        purpose: String,
        duration_seconds: u64,
    ) -> Result<u64, ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        doctor.require_auth();

        if purpose.len() == 0 {
            return Err(ContractError::EmptyPurpose);
        }
        if purpose.len() > MAX_PURPOSE_LEN {
            return Err(ContractError::PurposeTooLong);
        }
        if !(MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&duration_seconds) {
            return Err(ContractError::InvalidDuration);
        }

        let registry_id = Self::get_registry(env.clone())?;
        let registry_client = RegistryContractClient::new(&env, &registry_id);

        let doctor_profile = registry_client
            .get_user(&doctor)
            .ok_or(ContractError::UserNotFound)?;
        if doctor_profile.role != Role::Doctor {
            return Err(ContractError::NotADoctor);
        }
        if !doctor_profile.verified {
            return Err(ContractError::DoctorNotVerified);
        }

        let patient_profile = registry_client
            .get_user(&patient)
            .ok_or(ContractError::UserNotFound)?;
        if patient_profile.role != Role::Patient {
            return Err(ContractError::NotAPatient);
        }

        let records_id = Self::get_records(env.clone())?;
        let records_client = HealthRecordsContractClient::new(&env, &records_id);
        for record_id in record_ids.iter() {
            let record = match records_client.try_get_record(&record_id) {
                Ok(Ok(record)) => record,
                _ => return Err(ContractError::RecordNotFound),
            };
            if record.patient != patient {
                return Err(ContractError::RecordNotOwnedByPatient);
            }
            if record.deleted {
                return Err(ContractError::RecordUnavailable);
            }
        }

        let now = env.ledger().timestamp();
        if store::find_pending_duplicate(&env, &doctor, &patient, &record_ids, now).is_some() {
            return Err(ContractError::DuplicatePendingRequest);
        }

        let request = AccessRequest {
            id: store::next_request_id(&env),
            doctor: doctor.clone(),
            patient: patient.clone(),
            record_ids: record_ids.clone(),
            purpose,
            status: RequestStatus::Sent,
            denial_reason: None,
            created_at: now,
            sent_at: now,
            responded_at: 0,
            expires_at: now.saturating_add(duration_seconds),
        };

        store::save_request(&env, &request);
        store::index_request(&env, &request);

        events::publish_request_created(
            &env,
            request.id,
            doctor,
            patient,
            record_ids.len(),
            request.expires_at,
        );

        Ok(request.id)
    }

    /// Patient approves a pending request, opening the access window until
    /// the request's expiry.
    pub fn approve_request(
        env: Env,
        patient: Address,
        request_id: u64,
    ) -> Result<(), ContractError> {
        patient.require_auth();

        let mut request = Self::load_owned(&env, &patient, request_id)?;
        Self::settle_expiry(&env, &mut request);

        if !can_transition(request.status, RequestStatus::Approved) {
            return Err(ContractError::InvalidTransition);
        }

        request.status = RequestStatus::Approved;
        request.responded_at = env.ledger().timestamp();
        store::save_request(&env, &request);

        events::publish_request_approved(
            &env,
            request.id,
            request.doctor,
            request.patient,
            request.expires_at,
        );

        Ok(())
    }

    /// Patient denies a pending request, with an optional reason.
    pub fn deny_request(
        env: Env,
        patient: Address,
        request_id: u64,
        reason: Option<String>,
    ) -> Result<(), ContractError> {
        patient.require_auth();

        let mut request = Self::load_owned(&env, &patient, request_id)?;
        Self::settle_expiry(&env, &mut request);

        if !can_transition(request.status, RequestStatus::Denied) {
            return Err(ContractError::InvalidTransition);
        }

        request.status = RequestStatus::Denied;
        request.denial_reason = reason.clone();
        request.responded_at = env.ledger().timestamp();
        store::save_request(&env, &request);

        events::publish_request_denied(&env, request.id, request.doctor, request.patient, reason);

        Ok(())
    }

    /// Patient withdraws a pending or approved request. Unlike the implicit
    /// revocation inferred from deleted records, this persists the status.
    pub fn revoke_request(
        env: Env,
        patient: Address,
        request_id: u64,
    ) -> Result<(), ContractError> {
        patient.require_auth();

        let mut request = Self::load_owned(&env, &patient, request_id)?;
        Self::settle_expiry(&env, &mut request);

        if !can_transition(request.status, RequestStatus::Revoked) {
            return Err(ContractError::InvalidTransition);
        }

        request.status = RequestStatus::Revoked;
        store::save_request(&env, &request);

        events::publish_request_revoked(&env, request.id, request.doctor, request.patient);

        Ok(())
    }

    /// Permissionless paged sweep persisting the `Expired` status for every
    /// timed-out live request in `[from_id, from_id + limit)`. Returns the
    /// number of transitions applied. Uses the same timeout predicate as the
    /// lazy path, so the two can never disagree.
    pub fn sweep_expired(env: Env, from_id: u64, limit: u32) -> u32 {
        let now = env.ledger().timestamp();
        let highest = store::request_count(&env);
        let mut applied: u32 = 0;

        let mut id = from_id.max(1);
        let end = from_id.saturating_add(limit as u64);
        while id < end && id <= highest {
            if let Some(mut request) = store::load_request(&env, id) {
                if has_timed_out(request.status, request.expires_at, now) {
                    request.status = RequestStatus::Expired;
                    store::save_request(&env, &request);
                    events::publish_request_expired(
                        &env,
                        request.id,
                        request.doctor,
                        request.patient,
                    );
                    applied = applied.saturating_add(1);
                }
            }
            id = id.saturating_add(1);
        }

        applied
    }

    /// Fetch a stored request row as persisted.
    pub fn get_request(env: Env, request_id: u64) -> Result<AccessRequest, ContractError> {
        store::load_request(&env, request_id).ok_or(ContractError::RequestNotFound)
    }

    /// The status a viewer should see right now: persisted status overlaid
    /// with lazy expiry and the deleted-records revocation inference.
    pub fn effective_status_of(env: Env, request_id: u64) -> Result<RequestStatus, ContractError> {
        let request =
            store::load_request(&env, request_id).ok_or(ContractError::RequestNotFound)?;
        let facts = Self::facts_for(&env, &request)?;
        Ok(effective_status(facts, env.ledger().timestamp()))
    }

    /// Resolve the permission `viewer` holds on `record_id`.
    ///
    /// Owners are granted unconditionally. Otherwise the newest non-draft
    /// request by the viewer that covers the record decides, after expiry and
    /// deletion overlays.
    pub fn check_permission(
        env: Env,
        record_id: u64,
        viewer: Address,
    ) -> Result<Permission, ContractError> {
        let records_id = Self::get_records(env.clone())?;
        let records_client = HealthRecordsContractClient::new(&env, &records_id);

        let record = match records_client.try_get_record(&record_id) {
            Ok(Ok(record)) => record,
            _ => return Err(ContractError::RecordNotFound),
        };

        if record.patient == viewer {
            return Ok(Permission::Granted);
        }

        let candidate = Self::find_covering_request(&env, &viewer, &record.patient, record_id);
        let facts = match candidate {
            Some(request) => Some(Self::facts_for(&env, &request)?),
            None => None,
        };

        Ok(resolve_permission(
            false,
            facts,
            env.ledger().timestamp(),
        ))
    }

    /// All requests addressed to a patient, newest first, joined with the
    /// display fields the dashboard renders.
    pub fn list_for_patient(env: Env, patient: Address) -> Vec<RequestSummary> {
        Self::summarize(&env, store::patient_request_ids(&env, &patient))
    }

    /// All requests filed by a doctor, newest first, joined with the display
    /// fields the dashboard renders.
    pub fn list_for_doctor(env: Env, doctor: Address) -> Vec<RequestSummary> {
        Self::summarize(&env, store::doctor_request_ids(&env, &doctor))
    }

    pub fn get_request_count(env: Env) -> u64 {
        store::request_count(&env)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn load_owned(
        env: &Env,
        patient: &Address,
        request_id: u64,
    ) -> Result<AccessRequest, ContractError> {
        let request =
            store::load_request(env, request_id).ok_or(ContractError::RequestNotFound)?;
        if request.patient != *patient {
            return Err(ContractError::Unauthorized);
        }
        Ok(request)
    }

    /// Persist the lazy `-> Expired` transition if the deadline has passed.
    /// Subsequent transition checks then run against the settled status.
    fn settle_expiry(env: &Env, request: &mut AccessRequest) {
        if has_timed_out(request.status, request.expires_at, env.ledger().timestamp()) {
            request.status = RequestStatus::Expired;
            store::save_request(env, request);
            events::publish_request_expired(
                env,
                request.id,
                request.doctor.clone(),
                request.patient.clone(),
            );
        }
    }

    /// Gather the derivation inputs for one request row.
    fn facts_for(env: &Env, request: &AccessRequest) -> Result<RequestFacts, ContractError> {
        let records_id = Self::get_records(env.clone())?;
        Ok(RequestFacts {
            status: request.status,
            expires_at: request.expires_at,
            all_records_deleted: Self::all_records_deleted(env, &records_id, &request.record_ids),
        })
    }

    /// True when the request references at least one record and every one of
    /// them is soft-deleted. General (empty-set) requests are exempt.
    fn all_records_deleted(env: &Env, records_id: &Address, record_ids: &Vec<u64>) -> bool {
        if record_ids.is_empty() {
            return false;
        }
        let records_client = HealthRecordsContractClient::new(env, records_id);
        for record_id in record_ids.iter() {
            if !records_client.is_deleted(&record_id) {
                return false;
            }
        }
        true
    }

    /// The newest non-draft request by `viewer` against `patient` whose
    /// record set covers `record_id` (specific match or general request).
    fn find_covering_request(
        env: &Env,
        viewer: &Address,
        patient: &Address,
        record_id: u64,
    ) -> Option<AccessRequest> {
        let ids = store::doctor_request_ids(env, viewer);
        let len = ids.len();
        for offset in 0..len {
            let id = ids.get(len - 1 - offset)?;
            if let Some(request) = store::load_request(env, id) {
                if request.patient == *patient
                    && request.status != RequestStatus::Draft
                    && (request.record_ids.is_empty() || request.record_ids.contains(&record_id))
                {
                    return Some(request);
                }
            }
        }
        None
    }

    /// Join request rows with registry names and record titles, newest first.
    fn summarize(env: &Env, ids: Vec<u64>) -> Vec<RequestSummary> {
        let mut summaries = Vec::new(env);

        let registry_id: Option<Address> = env.storage().instance().get(&REGISTRY);
        let records_id: Option<Address> = env.storage().instance().get(&RECORDS);
        let (registry_id, records_id) = match (registry_id, records_id) {
            (Some(reg), Some(rec)) => (reg, rec),
            _ => return summaries,
        };

        let registry_client = RegistryContractClient::new(env, &registry_id);
        let records_client = HealthRecordsContractClient::new(env, &records_id);
        let now = env.ledger().timestamp();

        let len = ids.len();
        for offset in 0..len {
            let id = match ids.get(len - 1 - offset) {
                Some(id) => id,
                None => continue,
            };
            let request = match store::load_request(env, id) {
                Some(request) => request,
                None => continue,
            };

            let doctor_name = registry_client
                .get_user(&request.doctor)
                .map(|p| p.full_name)
                .unwrap_or(String::from_str(env, ""));
            let patient_name = registry_client
                .get_user(&request.patient)
                .map(|p| p.full_name)
                .unwrap_or(String::from_str(env, ""));

            let mut record_titles = Vec::new(env);
            let mut deleted_count: u32 = 0;
            for record_id in request.record_ids.iter() {
                if let Ok(Ok(record)) = records_client.try_get_record(&record_id) {
                    record_titles.push_back(record.title);
                    if record.deleted {
                        deleted_count = deleted_count.saturating_add(1);
                    }
                }
            }
            let all_records_deleted =
                !request.record_ids.is_empty() && deleted_count == request.record_ids.len();

            let facts = RequestFacts {
                status: request.status,
                expires_at: request.expires_at,
                all_records_deleted,
            };

            summaries.push_back(RequestSummary {
                request,
                doctor_name,
                patient_name,
                record_titles,
                all_records_deleted,
                effective_status: effective_status(facts, now),
            });
        }

        summaries
    }
}
