//! Resolution properties: the on-chain permission check must track the
//! derived effective status exactly, for every combination of response,
//! record deletion, and clock position.

use crate::common::{add_record, create_request, setup, BASE_TIME, DAY};
use healthchain_common::{Permission, RequestStatus};
use proptest::prelude::*;
use soroban_sdk::testutils::Ledger;
use soroban_sdk::vec;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// check_permission and effective_status_of are two views of one
    /// derivation: Approved ⇒ Granted, Sent ⇒ Pending, everything else ⇒
    /// None. Holds under arbitrary approval, deletion, and clock advance.
    #[test]
    fn prop_permission_tracks_effective_status(
        approve in any::<bool>(),
        delete_records in any::<bool>(),
        advance in 0u64..=20 * DAY,
    ) {
        let fx = setup();
        let record_id = add_record(&fx, "Observed record");
        let request_id = create_request(&fx, vec![&fx.env, record_id], 10 * DAY);

        if approve {
            fx.access.approve_request(&fx.patient, &request_id);
        }
        if delete_records {
            fx.records.delete_record(&fx.patient, &record_id);
        }
        fx.env.ledger().set_timestamp(BASE_TIME + advance);

        let effective = fx.access.effective_status_of(&request_id);
        let permission = fx.access.check_permission(&record_id, &fx.doctor);

        let expected = match effective {
            RequestStatus::Approved => Permission::Granted,
            RequestStatus::Sent => Permission::Pending,
            _ => Permission::None,
        };
        prop_assert_eq!(permission, expected);

        // And the deletion overlay is exactly the documented rule.
        if delete_records && matches!(effective, RequestStatus::Sent | RequestStatus::Approved) {
            prop_assert!(false, "deleted records must not leave a live effective status");
        }
    }

    /// Owner override: the patient resolves to Granted whatever happens to
    /// the request set or the records.
    #[test]
    fn prop_owner_override(
        approve in any::<bool>(),
        delete_records in any::<bool>(),
        advance in 0u64..=20 * DAY,
    ) {
        let fx = setup();
        let record_id = add_record(&fx, "Owned record");
        let request_id = create_request(&fx, vec![&fx.env, record_id], 10 * DAY);

        if approve {
            fx.access.approve_request(&fx.patient, &request_id);
        }
        if delete_records {
            fx.records.delete_record(&fx.patient, &record_id);
        }
        fx.env.ledger().set_timestamp(BASE_TIME + advance);

        prop_assert_eq!(
            fx.access.check_permission(&record_id, &fx.patient),
            Permission::Granted
        );
    }

    /// Repeated reads never drift: resolving twice in a row gives identical
    /// answers and leaves the stored row untouched.
    #[test]
    fn prop_resolution_is_stateless(
        delete_records in any::<bool>(),
        advance in 0u64..=20 * DAY,
    ) {
        let fx = setup();
        let record_id = add_record(&fx, "Reread record");
        let request_id = create_request(&fx, vec![&fx.env, record_id], 10 * DAY);

        if delete_records {
            fx.records.delete_record(&fx.patient, &record_id);
        }
        fx.env.ledger().set_timestamp(BASE_TIME + advance);

        let stored_before = fx.access.get_request(&request_id);
        let first = fx.access.check_permission(&record_id, &fx.doctor);
        let second = fx.access.check_permission(&record_id, &fx.doctor);
        let stored_after = fx.access.get_request(&request_id);

        prop_assert_eq!(first, second);
        prop_assert_eq!(stored_before, stored_after);
    }
}
