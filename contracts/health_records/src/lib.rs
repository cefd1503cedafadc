#![no_std]
//! Health-record metadata store.
//!
//! Holds document metadata only (title, content address, encryption key
//! reference), never file bytes. Deletion is soft: the row stays for audit
//! while the underlying content is unpinned off-chain, and downstream access
//! logic treats a fully deleted record set as an implicit revocation signal.

pub mod events;
pub mod validation;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, String,
    Symbol, Vec,
};

pub use validation::MAX_FILE_SIZE;

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const RECORD_CTR: Symbol = symbol_short!("REC_CTR");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

fn record_key(record_id: u64) -> (Symbol, u64) {
    (symbol_short!("RECORD"), record_id)
}

fn patient_index_key(patient: &Address) -> (Symbol, Address) {
    (symbol_short!("PAT_REC"), patient.clone())
}

fn extend_ttl_record_key(env: &Env, key: &(Symbol, u64)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn extend_ttl_index_key(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Broad file categories accepted by the upload pipeline.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileKind {
    /// PDF, DOC, DOCX, TXT
    Document,
    /// JPEG, PNG, and other photographs or scans
    Image,
    /// DICOM medical imaging
    Dicom,
    /// Lab results in spreadsheet form
    Spreadsheet,
    /// Bulk upload archives
    Archive,
}

/// A single uploaded document's metadata.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HealthRecord {
    pub id: u64,
    pub patient: Address,
    pub title: String,
    pub description: String,
    pub file_type: FileKind,
    pub file_size: u64,
    pub cid: String,
    pub encryption_key_id: String,
    pub tags: Vec<String>,
    pub created_at: u64,
    pub updated_at: u64,
    pub deleted: bool,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RecordsError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    RecordNotFound = 4,
    InvalidTitle = 5,
    InvalidDescription = 6,
    InvalidContentId = 7,
    InvalidKeyReference = 8,
    InvalidFileSize = 9,
}

#[contract]
pub struct HealthRecordsContract;

#[contractimpl]
impl HealthRecordsContract {
    /// Initialize the contract with an admin address.
    pub fn initialize(env: Env, admin: Address) -> Result<(), RecordsError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(RecordsError::AlreadyInitialized);
        }

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);

        events::publish_initialized(&env, admin);

        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, RecordsError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(RecordsError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    /// Store metadata for a freshly uploaded document.
    ///
    /// Only the owning patient can add records for themselves; the encrypted
    /// payload is already pinned by the time this is called.
    #[allow(clippy::too_many_arguments)]
    pub fn add_record(
        env: Env,
        patient: Address,
        title: String,
        description: String,
        file_type: FileKind,
        file_size: u64,
        cid: String,
        encryption_key_id: String,
        tags: Vec<String>,
    ) -> Result<u64, RecordsError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(RecordsError::NotInitialized);
        }
        patient.require_auth();

        validation::validate_title(&title)?;
        validation::validate_description(&description)?;
        validation::validate_cid(&cid)?;
        validation::validate_key_reference(&encryption_key_id)?;
        validation::validate_file_size(file_size)?;

        let record_id: u64 = env
            .storage()
            .instance()
            .get(&RECORD_CTR)
            .unwrap_or(0u64)
            .saturating_add(1);
        env.storage().instance().set(&RECORD_CTR, &record_id);

        let now = env.ledger().timestamp();
        let record = HealthRecord {
            id: record_id,
            patient: patient.clone(),
            title,
            description,
            file_type,
            file_size,
            cid,
            encryption_key_id,
            tags,
            created_at: now,
            updated_at: now,
            deleted: false,
        };

        let key = record_key(record_id);
        env.storage().persistent().set(&key, &record);
        extend_ttl_record_key(&env, &key);

        let index_key = patient_index_key(&patient);
        let mut patient_records: Vec<u64> = env
            .storage()
            .persistent()
            .get(&index_key)
            .unwrap_or(Vec::new(&env));
        patient_records.push_back(record_id);
        env.storage().persistent().set(&index_key, &patient_records);
        extend_ttl_index_key(&env, &index_key);

        events::publish_record_added(&env, record_id, patient, file_type);

        Ok(record_id)
    }

    /// Update mutable metadata fields. Owner only; deleted rows are frozen.
    pub fn update_record(
        env: Env,
        patient: Address,
        record_id: u64,
        title: String,
        description: String,
        tags: Vec<String>,
    ) -> Result<(), RecordsError> {
        patient.require_auth();

        let key = record_key(record_id);
        let mut record: HealthRecord = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(RecordsError::RecordNotFound)?;

        if record.patient != patient || record.deleted {
            return Err(RecordsError::Unauthorized);
        }

        validation::validate_title(&title)?;
        validation::validate_description(&description)?;

        record.title = title;
        record.description = description;
        record.tags = tags;
        record.updated_at = env.ledger().timestamp();

        env.storage().persistent().set(&key, &record);
        extend_ttl_record_key(&env, &key);

        events::publish_record_updated(&env, record_id, patient);

        Ok(())
    }

    /// Soft-delete a record: the metadata row persists for audit, flagged so
    /// every viewer sees the document as gone. Idempotent. The emitted event
    /// is what triggers the off-chain unpin of the content address.
    pub fn delete_record(env: Env, patient: Address, record_id: u64) -> Result<(), RecordsError> {
        patient.require_auth();

        let key = record_key(record_id);
        let mut record: HealthRecord = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(RecordsError::RecordNotFound)?;

        if record.patient != patient {
            return Err(RecordsError::Unauthorized);
        }

        if record.deleted {
            return Ok(());
        }

        record.deleted = true;
        record.updated_at = env.ledger().timestamp();
        env.storage().persistent().set(&key, &record);
        extend_ttl_record_key(&env, &key);

        events::publish_record_deleted(&env, record_id, patient, record.cid.clone());

        Ok(())
    }

    /// Fetch a record's metadata, deleted or not.
    pub fn get_record(env: Env, record_id: u64) -> Result<HealthRecord, RecordsError> {
        env.storage()
            .persistent()
            .get(&record_key(record_id))
            .ok_or(RecordsError::RecordNotFound)
    }

    /// All record ids ever uploaded by a patient, oldest first.
    pub fn get_patient_records(env: Env, patient: Address) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&patient_index_key(&patient))
            .unwrap_or(Vec::new(&env))
    }

    /// Deletion marker for a record id. Unknown ids read as deleted so that
    /// dangling references never grant access.
    pub fn is_deleted(env: Env, record_id: u64) -> bool {
        env.storage()
            .persistent()
            .get::<_, HealthRecord>(&record_key(record_id))
            .map_or(true, |r| r.deleted)
    }

    /// Get the total number of records
    pub fn get_record_count(env: Env) -> u64 {
        env.storage().instance().get(&RECORD_CTR).unwrap_or(0)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }
}
