#![no_std]
//! Shared types and pure derivation logic for the HealthChain contracts.
//!
//! Everything here is a function of its inputs only. The access-request
//! contract and the off-chain session SDK both depend on this crate so that
//! expiry, implicit revocation, and permission resolution are computed by
//! exactly one implementation everywhere they are displayed or filtered.

pub mod lifecycle;
pub mod resolution;

use soroban_sdk::contracttype;

/// Platform roles. Assigned at registration and immutable afterwards.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Patient = 1,
    Doctor = 2,
    Admin = 3,
}

pub use lifecycle::RequestStatus;
pub use resolution::{Bucket, Permission, RequestFacts};
