#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use access_requests::{AccessRequestsContract, AccessRequestsContractClient};
use health_records::{FileKind, HealthRecordsContract, HealthRecordsContractClient};
use healthchain_common::{Permission, RequestStatus, Role};
use registry::{RegistryContract, RegistryContractClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{vec, Address, Env, String};

const BASE_TIME: u64 = 1_700_000_000;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    CreateRequest { record_seed: u8, duration_hours: u16 },
    Approve { id_seed: u8 },
    Deny { id_seed: u8 },
    Revoke { id_seed: u8 },
    DeleteRecord { record_seed: u8 },
    AdvanceTime { seconds: u32 },
    Sweep { from_seed: u8 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
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
        &String::from_str(&env, "Dr. Fuzz"),
        &String::from_str(&env, "fuzz@clinic.example"),
        &Some(String::from_str(&env, "MD-FUZZ")),
        &None,
        &None,
    );
    registry.verify_doctor(&admin, &doctor);

    let patient = Address::generate(&env);
    registry.register(
        &patient,
        &Role::Patient,
        &String::from_str(&env, "Fuzz Patient"),
        &String::from_str(&env, "fuzz@example.com"),
        &None,
        &None,
        &None,
    );

    let mut record_ids = std::vec::Vec::new();
    for i in 0..4u32 {
        let title = match i {
            0 => "Blood Panel",
            1 => "X-Ray",
            2 => "MRI",
            _ => "Visit Notes",
        };
        record_ids.push(records.add_record(
            &patient,
            &String::from_str(&env, title),
            &String::from_str(&env, ""),
            &FileKind::Document,
            &4096,
            &String::from_str(&env, "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"),
            &String::from_str(&env, "key-ref-fuzz"),
            &vec![&env],
        ));
    }

    for action in actions {
        match action {
            FuzzAction::CreateRequest {
                record_seed,
                duration_hours,
            } => {
                let record = record_ids[(record_seed as usize) % record_ids.len()];
                let duration = 3600u64 * (1 + (duration_hours as u64 % 8760));
                let _ = access.try_create_request(
                    &doctor,
                    &patient,
                    &vec![&env, record],
                    &String::from_str(&env, "fuzzed purpose"),
                    &duration,
                );
            }
            FuzzAction::Approve { id_seed } => {
                let _ = access.try_approve_request(&patient, &(id_seed as u64));
            }
            FuzzAction::Deny { id_seed } => {
                let _ = access.try_deny_request(&patient, &(id_seed as u64), &None);
            }
            FuzzAction::Revoke { id_seed } => {
                let _ = access.try_revoke_request(&patient, &(id_seed as u64));
            }
            FuzzAction::DeleteRecord { record_seed } => {
                let record = record_ids[(record_seed as usize) % record_ids.len()];
                let _ = records.try_delete_record(&patient, &record);
            }
            FuzzAction::AdvanceTime { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + seconds as u64);
            }
            FuzzAction::Sweep { from_seed } => {
                let _ = access.try_sweep_expired(&(from_seed as u64), &32);
            }
        }
    }

    // Whatever sequence ran, the derived views must stay coherent.
    let total = access.get_request_count();
    for id in 1..=total {
        let request = access.get_request(&id);
        let effective = access.effective_status_of(&id);

        // Persisted terminal states are never overridden by the overlay.
        if matches!(
            request.status,
            RequestStatus::Denied | RequestStatus::Expired | RequestStatus::Revoked
        ) {
            assert_eq!(effective, request.status);
        }

        // Permission agrees with the effective status for every record the
        // request covers.
        for record_id in request.record_ids.iter() {
            let permission = access.check_permission(&record_id, &doctor);
            let expected = match effective {
                RequestStatus::Approved => Permission::Granted,
                RequestStatus::Sent => Permission::Pending,
                _ => Permission::None,
            };
            // Another, newer request may cover the same record; only assert
            // when this row is the deciding one.
            let newest_covering = (1..=total)
                .filter_map(|other| {
                    let req = access.get_request(&other);
                    (req.status != RequestStatus::Draft
                        && req.record_ids.contains(&record_id))
                    .then_some(other)
                })
                .max();
            if newest_covering == Some(id) {
                assert_eq!(permission, expected);
            }
        }

        // Owners always resolve to granted.
        for record_id in request.record_ids.iter() {
            assert_eq!(
                access.check_permission(&record_id, &patient),
                Permission::Granted
            );
        }
    }
});
