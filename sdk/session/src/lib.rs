//! Off-chain session layer for the HealthChain dashboards.
//!
//! The contracts are the source of truth; this crate owns the pieces a UI
//! session needs around them: a memoizing role-resolution cache with request
//! coalescing and auth-aware invalidation, the categorized filter/search
//! projection over denormalized request views, and a small optimistic-update
//! helper that rolls local state back when a mutation fails.
//!
//! Nothing here talks to the network directly: the host application injects
//! a [`directory::DirectoryBackend`] and feeds the projection with views it
//! assembled from contract queries.

pub mod command;
pub mod directory;
pub mod error;
pub mod projection;

pub use directory::{AuthEvent, CacheEvent, Directory, DirectoryBackend, Profile};
pub use error::{abbreviate_wallet, SessionError};
pub use projection::{Categorized, RecordRef, RequestView};
