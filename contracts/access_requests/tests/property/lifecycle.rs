//! State-machine properties: random patient-action sequences must behave
//! exactly as the transition table predicts, and persisted expiry must agree
//! with the lazy read-time view.

use crate::common::{add_record, create_request, setup, DAY};
use access_requests::ContractError;
use healthchain_common::lifecycle::can_transition;
use healthchain_common::RequestStatus;
use proptest::prelude::*;
use soroban_sdk::testutils::Ledger;
use soroban_sdk::vec;

#[derive(Clone, Copy, Debug)]
enum PatientAction {
    Approve,
    Deny,
    Revoke,
}

impl PatientAction {
    fn target(self) -> RequestStatus {
        match self {
            PatientAction::Approve => RequestStatus::Approved,
            PatientAction::Deny => RequestStatus::Denied,
            PatientAction::Revoke => RequestStatus::Revoked,
        }
    }
}

fn action_strategy() -> impl Strategy<Value = PatientAction> {
    prop_oneof![
        Just(PatientAction::Approve),
        Just(PatientAction::Deny),
        Just(PatientAction::Revoke),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every patient action either succeeds or fails with
    /// `InvalidTransition`, in exact agreement with the transition table
    /// applied to a shadow model of the status.
    #[test]
    fn prop_actions_agree_with_transition_table(
        actions in prop::collection::vec(action_strategy(), 1..6),
    ) {
        let fx = setup();
        let record_id = add_record(&fx, "Model record");
        let request_id = create_request(&fx, vec![&fx.env, record_id], 30 * DAY);

        let mut model = RequestStatus::Sent;
        for action in actions {
            let target = action.target();
            let result = match action {
                PatientAction::Approve => fx.access.try_approve_request(&fx.patient, &request_id),
                PatientAction::Deny => fx.access.try_deny_request(&fx.patient, &request_id, &None),
                PatientAction::Revoke => fx.access.try_revoke_request(&fx.patient, &request_id),
            };

            if can_transition(model, target) {
                prop_assert!(result.is_ok(), "{:?} from {:?} should succeed", action, model);
                model = target;
            } else {
                prop_assert!(
                    matches!(result.unwrap_err(), Ok(ContractError::InvalidTransition)),
                    "{:?} from {:?} should be an invalid transition", action, model
                );
            }

            prop_assert_eq!(fx.access.get_request(&request_id).status, model);
        }
    }

    /// Sweep and lazy expiry agree: after the deadline, the derived status
    /// reads Expired before any write, and the sweep persists exactly that.
    #[test]
    fn prop_sweep_agrees_with_lazy_view(
        duration_days in 1u64..=30,
        late_by in 0u64..=5 * DAY,
    ) {
        let fx = setup();
        let record_id = add_record(&fx, "Expiring record");
        let request_id = create_request(&fx, vec![&fx.env, record_id], duration_days * DAY);

        let deadline = crate::common::BASE_TIME + duration_days * DAY;
        fx.env.ledger().set_timestamp(deadline + late_by);

        // Lazy view first, with no writes.
        prop_assert_eq!(fx.access.effective_status_of(&request_id), RequestStatus::Expired);
        prop_assert_eq!(fx.access.get_request(&request_id).status, RequestStatus::Sent);

        // The sweep persists the same answer.
        let applied = fx.access.sweep_expired(&1, &10);
        prop_assert_eq!(applied, 1);
        prop_assert_eq!(fx.access.get_request(&request_id).status, RequestStatus::Expired);
        prop_assert_eq!(fx.access.effective_status_of(&request_id), RequestStatus::Expired);

        // Nothing reverts it.
        let res = fx.access.try_approve_request(&fx.patient, &request_id);
        prop_assert!(matches!(res.unwrap_err(), Ok(ContractError::InvalidTransition)));
    }

    /// A denied request never grants access at any later time.
    #[test]
    fn prop_denial_is_permanent(advance in 0u64..=60 * DAY) {
        let fx = setup();
        let record_id = add_record(&fx, "Denied record");
        let request_id = create_request(&fx, vec![&fx.env, record_id], 30 * DAY);
        fx.access.deny_request(&fx.patient, &request_id, &None);

        fx.env.ledger().set_timestamp(crate::common::BASE_TIME + advance);
        prop_assert_eq!(
            fx.access.check_permission(&record_id, &fx.doctor),
            healthchain_common::Permission::None
        );
        prop_assert_eq!(fx.access.get_request(&request_id).status, RequestStatus::Denied);
    }
}
