//! Permission resolution and the effective-status overlay.
//!
//! The persisted status of a request is not always what a viewer should see:
//! an `Approved` request past its deadline behaves as expired, and a live
//! request whose every referenced record has been soft-deleted behaves as
//! revoked. Those overlays are read-time derivations, not stored state, and
//! every call site (the contract's permission check, the sweep, the SDK
//! projection) must route through this module.

use crate::lifecycle::{has_timed_out, RequestStatus};
use soroban_sdk::contracttype;

/// Derived access state for a (record, viewer) pair. Never persisted.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Permission {
    None = 0,
    Pending = 1,
    Granted = 2,
}

/// Display bucket for categorized request lists.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Bucket {
    Pending,
    Approved,
    Declined,
    Expired,
    Revoked,
}

/// The inputs the derivations need from a single request row, decoupled from
/// how the row is stored (contract storage on-chain, fetched view off-chain).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RequestFacts {
    pub status: RequestStatus,
    /// 0 means no expiry.
    pub expires_at: u64,
    /// True when the request references at least one record and every one of
    /// them carries the soft-delete marker. A general (empty-set) request is
    /// never considered deleted.
    pub all_records_deleted: bool,
}

/// The one place implicit revocation is defined: a live request whose target
/// records are all gone no longer grants or promises anything, even though
/// its persisted status still reads `Sent` or `Approved`.
pub fn is_effectively_revoked(status: RequestStatus, all_records_deleted: bool) -> bool {
    all_records_deleted && matches!(status, RequestStatus::Sent | RequestStatus::Approved)
}

/// Persisted status overlaid with implicit revocation and lazy expiry.
///
/// Revocation inference wins over expiry: a deleted record set ends access
/// outright, and surfacing it as revoked tells the viewer why.
pub fn effective_status(facts: RequestFacts, now: u64) -> RequestStatus {
    if is_effectively_revoked(facts.status, facts.all_records_deleted) {
        return RequestStatus::Revoked;
    }
    if has_timed_out(facts.status, facts.expires_at, now) {
        return RequestStatus::Expired;
    }
    facts.status
}

/// Resolve the permission a viewer holds on a record.
///
/// `candidate` is the most recent non-draft request by the viewer whose
/// record set covers the record (or `None` when no such request exists).
/// Owners short-circuit to `Granted` before any request is consulted.
pub fn resolve_permission(
    viewer_is_owner: bool,
    candidate: Option<RequestFacts>,
    now: u64,
) -> Permission {
    if viewer_is_owner {
        return Permission::Granted;
    }
    let facts = match candidate {
        Some(f) => f,
        None => return Permission::None,
    };
    match effective_status(facts, now) {
        RequestStatus::Approved => Permission::Granted,
        RequestStatus::Sent => Permission::Pending,
        _ => Permission::None,
    }
}

/// Display bucket for a request row. `Draft` rows are not shown.
pub fn bucket_for(facts: RequestFacts, now: u64) -> Option<Bucket> {
    match effective_status(facts, now) {
        RequestStatus::Draft => None,
        RequestStatus::Sent => Some(Bucket::Pending),
        RequestStatus::Approved => Some(Bucket::Approved),
        RequestStatus::Denied => Some(Bucket::Declined),
        RequestStatus::Expired => Some(Bucket::Expired),
        RequestStatus::Revoked => Some(Bucket::Revoked),
    }
}
