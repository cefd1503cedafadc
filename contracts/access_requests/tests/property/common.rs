//! Shared fixture: a deployed registry, records store, and access-request
//! contract with one verified doctor and one patient.

use access_requests::{AccessRequestsContract, AccessRequestsContractClient};
use health_records::{FileKind, HealthRecordsContract, HealthRecordsContractClient};
use healthchain_common::Role;
use registry::{RegistryContract, RegistryContractClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{vec, Address, Env, String, Vec};

pub const BASE_TIME: u64 = 1_700_000_000;
pub const DAY: u64 = 86_400;

pub struct Fixture {
    pub env: Env,
    pub access: AccessRequestsContractClient<'static>,
    pub records: HealthRecordsContractClient<'static>,
    pub doctor: Address,
    pub patient: Address,
}

pub fn setup() -> Fixture {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(BASE_TIME);

    let registry_id = env.register(RegistryContract, ());
    let registry = RegistryContractClient::new(&env, &registry_id);
    let records_id = env.register(HealthRecordsContract, ());
    let records = HealthRecordsContractClient::new(&env, &records_id);
    let access_id = env.register(AccessRequestsContract, ());
    let access = AccessRequestsContractClient::new(&env, &access_id);

    let admin = Address::generate(&env);
    registry.initialize(&admin);
    records.initialize(&admin);
    access.initialize(&admin, &registry_id, &records_id);

    let doctor = Address::generate(&env);
    registry.register(
        &doctor,
        &Role::Doctor,
        &String::from_str(&env, "Dr. Property"),
        &String::from_str(&env, "prop@clinic.example"),
        &Some(String::from_str(&env, "MD-00001")),
        &None,
        &None,
    );
    registry.verify_doctor(&admin, &doctor);

    let patient = Address::generate(&env);
    registry.register(
        &patient,
        &Role::Patient,
        &String::from_str(&env, "Patient Property"),
        &String::from_str(&env, "prop@example.com"),
        &None,
        &None,
        &None,
    );

    Fixture {
        env,
        access,
        records,
        doctor,
        patient,
    }
}

pub fn add_record(fx: &Fixture, title: &str) -> u64 {
    fx.records.add_record(
        &fx.patient,
        &String::from_str(&fx.env, title),
        &String::from_str(&fx.env, ""),
        &FileKind::Document,
        &4096,
        &String::from_str(
            &fx.env,
            "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG",
        ),
        &String::from_str(&fx.env, "key-ref-001"),
        &vec![&fx.env],
    )
}

pub fn create_request(fx: &Fixture, record_ids: Vec<u64>, duration: u64) -> u64 {
    fx.access.create_request(
        &fx.doctor,
        &fx.patient,
        &record_ids,
        &String::from_str(&fx.env, "Property-based checkup"),
        &duration,
    )
}
