#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the access-request contract.

mod common;
mod lifecycle;
mod permissions;
