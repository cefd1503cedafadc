//! Access-request lifecycle states and the transition table.
//!
//! Requests are created directly in `Sent`; `Draft` exists for forward
//! compatibility with saved-but-unsent requests. `Denied`, `Expired`, and
//! `Revoked` are terminal: re-requesting after any of them creates a brand
//! new request row, never a transition out of the old one.

use soroban_sdk::contracttype;

/// Persisted status of an access request.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RequestStatus {
    Draft = 0,
    Sent = 1,
    Approved = 2,
    Denied = 3,
    Expired = 4,
    Revoked = 5,
}

impl RequestStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Denied | RequestStatus::Expired | RequestStatus::Revoked
        )
    }
}

/// The full transition table. Everything not listed here is invalid.
///
/// - `Draft → Sent`: the doctor submits a saved request.
/// - `Sent → Approved | Denied`: the patient responds.
/// - `Sent → Expired`: the request timed out unanswered.
/// - `Approved → Expired`: the access window closed.
/// - `Sent | Approved → Revoked`: the patient withdraws access.
pub fn can_transition(from: RequestStatus, to: RequestStatus) -> bool {
    matches!(
        (from, to),
        (RequestStatus::Draft, RequestStatus::Sent)
            | (RequestStatus::Sent, RequestStatus::Approved)
            | (RequestStatus::Sent, RequestStatus::Denied)
            | (RequestStatus::Sent, RequestStatus::Expired)
            | (RequestStatus::Sent, RequestStatus::Revoked)
            | (RequestStatus::Approved, RequestStatus::Expired)
            | (RequestStatus::Approved, RequestStatus::Revoked)
    )
}

/// Whether a request has passed its expiry deadline while still live.
///
/// `expires_at == 0` means the request never expires. The same predicate
/// backs both the lazy read-time transition and the paged sweep, so the two
/// paths cannot disagree.
pub fn has_timed_out(status: RequestStatus, expires_at: u64, now: u64) -> bool {
    if expires_at == 0 {
        return false;
    }
    matches!(status, RequestStatus::Sent | RequestStatus::Approved) && now >= expires_at
}
