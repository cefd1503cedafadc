//! Session-side user & role directory.
//!
//! Wraps an injected backend lookup with a process-wide cache so that every
//! dashboard surface asking "who is this wallet" during one session costs at
//! most one backend call. Concurrent resolutions of the same address share a
//! single in-flight fetch whose result is broadcast to all waiters, and every
//! fetch is tagged with the session epoch at issue time: a result that lands
//! after a sign-in/sign-out is discarded instead of applied.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use healthchain_common::Role;

use crate::error::{abbreviate_wallet, SessionError};

/// What the backend resolves a wallet to. `None` from a lookup is the normal
/// answer for a freshly connected, unregistered wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub wallet: String,
    pub role: Role,
    pub full_name: String,
    pub verified: bool,
}

/// The single lookup the host application must provide.
pub trait DirectoryBackend: Send + Sync {
    fn fetch(&self, wallet: &str) -> Result<Option<Profile>, SessionError>;
}

/// Auth-state transitions that invalidate everything cached so far.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Cache change notifications delivered to subscribers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CacheEvent {
    Resolved(String),
    Invalidated(String),
    Cleared,
}

type Listener = Box<dyn Fn(&CacheEvent) + Send + Sync>;
type FetchResult = Result<Option<Profile>, SessionError>;

/// Canonical form of a wallet address: trimmed, validated as 0x-prefixed
/// 40-digit hex, lowercased.
pub fn canonicalize_wallet(wallet: &str) -> Result<String, SessionError> {
    let trimmed = wallet.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"));
    match digits {
        Some(hex) if hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            Ok(trimmed.to_ascii_lowercase())
        }
        _ => Err(SessionError::InvalidWallet(abbreviate_wallet(trimmed))),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One shared in-flight lookup. The leader completes it; waiters block on the
/// condvar and all receive the same result.
struct Flight {
    slot: Mutex<Option<FetchResult>>,
    ready: Condvar,
}

impl Flight {
    fn new() -> Self {
        Flight {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn wait(&self) -> FetchResult {
        let mut slot = lock(&self.slot);
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = match self.ready.wait(slot) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    fn complete(&self, result: FetchResult) {
        *lock(&self.slot) = Some(result);
        self.ready.notify_all();
    }
}

struct DirectoryState {
    cache: HashMap<String, Option<Profile>>,
    in_flight: HashMap<String, Arc<Flight>>,
}

enum Plan {
    Hit(Option<Profile>),
    Wait(Arc<Flight>),
    Lead(Arc<Flight>, u64),
}

/// Process-wide role-resolution cache. Constructed once per session and
/// injected wherever resolution is needed; there is no ambient global.
pub struct Directory<B: DirectoryBackend> {
    backend: B,
    epoch: AtomicU64,
    state: Mutex<DirectoryState>,
    listeners: Mutex<Vec<Listener>>,
}

impl<B: DirectoryBackend> Directory<B> {
    pub fn new(backend: B) -> Self {
        Directory {
            backend,
            epoch: AtomicU64::new(0),
            state: Mutex::new(DirectoryState {
                cache: HashMap::new(),
                in_flight: HashMap::new(),
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Resolve a wallet to its profile, serving from cache when possible.
    ///
    /// Callers racing on the same address attach to one in-flight fetch
    /// rather than issuing duplicates. A retryable upstream failure is
    /// retried once, immediately, before being surfaced. All cache and
    /// registry writes happen inside the single state lock.
    pub fn resolve(&self, wallet: &str) -> FetchResult {
        let key = canonicalize_wallet(wallet)?;

        let plan = {
            let mut state = lock(&self.state);
            if let Some(hit) = state.cache.get(&key) {
                Plan::Hit(hit.clone())
            } else if let Some(flight) = state.in_flight.get(&key) {
                Plan::Wait(flight.clone())
            } else {
                let flight = Arc::new(Flight::new());
                state.in_flight.insert(key.clone(), flight.clone());
                Plan::Lead(flight, self.epoch.load(Ordering::SeqCst))
            }
        };

        match plan {
            Plan::Hit(profile) => Ok(profile),
            Plan::Wait(flight) => flight.wait(),
            Plan::Lead(flight, issued_epoch) => {
                let mut outcome = self.backend.fetch(&key);
                if outcome.as_ref().err().is_some_and(SessionError::retryable) {
                    outcome = self.backend.fetch(&key);
                }

                let result = {
                    let mut state = lock(&self.state);
                    state.in_flight.remove(&key);
                    if self.epoch.load(Ordering::SeqCst) != issued_epoch {
                        Err(SessionError::Stale)
                    } else {
                        match outcome {
                            Ok(profile) => {
                                state.cache.insert(key.clone(), profile.clone());
                                Ok(profile)
                            }
                            Err(err) => Err(err),
                        }
                    }
                };

                if result.is_ok() {
                    self.notify(&CacheEvent::Resolved(key));
                }
                flight.complete(result.clone());
                result
            }
        }
    }

    /// Drop one cached resolution.
    pub fn invalidate(&self, wallet: &str) -> Result<(), SessionError> {
        let key = canonicalize_wallet(wallet)?;
        let removed = lock(&self.state).cache.remove(&key).is_some();
        if removed {
            self.notify(&CacheEvent::Invalidated(key));
        }
        Ok(())
    }

    /// Drop every cached resolution.
    pub fn invalidate_all(&self) {
        lock(&self.state).cache.clear();
        self.notify(&CacheEvent::Cleared);
    }

    /// Record an auth-state transition: bumps the session epoch so in-flight
    /// results issued under the old identity are discarded on arrival, and
    /// clears the cache.
    pub fn auth_transition(&self, _event: AuthEvent) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.invalidate_all();
    }

    /// Register a cache-change listener.
    pub fn subscribe(&self, listener: impl Fn(&CacheEvent) + Send + Sync + 'static) {
        lock(&self.listeners).push(Box::new(listener));
    }

    fn notify(&self, event: &CacheEvent) {
        for listener in lock(&self.listeners).iter() {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::thread;

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
    const CANONICAL: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    struct CountingBackend {
        calls: AtomicUsize,
        delay_gate: Option<Arc<Barrier>>,
        fail_times: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            CountingBackend {
                calls: AtomicUsize::new(0),
                delay_gate: None,
                fail_times: AtomicUsize::new(0),
            }
        }

        fn gated(gate: Arc<Barrier>) -> Self {
            CountingBackend {
                calls: AtomicUsize::new(0),
                delay_gate: Some(gate),
                fail_times: AtomicUsize::new(0),
            }
        }

        fn failing(times: usize) -> Self {
            let backend = CountingBackend::new();
            backend.fail_times.store(times, Ordering::SeqCst);
            backend
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DirectoryBackend for CountingBackend {
        fn fetch(&self, wallet: &str) -> Result<Option<Profile>, SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.delay_gate {
                gate.wait();
            }
            let remaining = self.fail_times.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_times.store(remaining - 1, Ordering::SeqCst);
                return Err(SessionError::Upstream {
                    reason: "backend offline".into(),
                    retryable: true,
                });
            }
            Ok(Some(Profile {
                wallet: wallet.to_string(),
                role: Role::Patient,
                full_name: "Cache Test".into(),
                verified: false,
            }))
        }
    }

    #[test]
    fn canonicalization_lowercases_and_validates() {
        assert_eq!(canonicalize_wallet(WALLET).unwrap(), CANONICAL);
        assert_eq!(canonicalize_wallet(CANONICAL).unwrap(), CANONICAL);
        assert!(matches!(
            canonicalize_wallet("not-a-wallet"),
            Err(SessionError::InvalidWallet(_))
        ));
        assert!(matches!(
            canonicalize_wallet("0x1234"),
            Err(SessionError::InvalidWallet(_))
        ));
    }

    #[test]
    fn repeated_resolutions_hit_the_cache() {
        let directory = Directory::new(CountingBackend::new());

        let first = directory.resolve(WALLET).unwrap();
        assert!(first.is_some());
        // Mixed-case and canonical inputs share one cache entry.
        directory.resolve(CANONICAL).unwrap();
        directory.resolve(WALLET).unwrap();

        assert_eq!(directory.backend.calls(), 1);
    }

    #[test]
    fn unregistered_wallets_cache_the_none_answer() {
        struct EmptyBackend(AtomicUsize);
        impl DirectoryBackend for EmptyBackend {
            fn fetch(&self, _wallet: &str) -> Result<Option<Profile>, SessionError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }

        let directory = Directory::new(EmptyBackend(AtomicUsize::new(0)));
        assert_eq!(directory.resolve(WALLET).unwrap(), None);
        assert_eq!(directory.resolve(WALLET).unwrap(), None);
        assert_eq!(directory.backend.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_resolutions_coalesce_into_one_fetch() {
        const WAITERS: usize = 8;

        // The gate holds the leader inside the backend until every thread has
        // had a chance to pile onto the same flight.
        let gate = Arc::new(Barrier::new(2));
        let directory = Arc::new(Directory::new(CountingBackend::gated(gate.clone())));

        let start = Arc::new(Barrier::new(WAITERS + 1));
        let mut handles = Vec::new();
        for _ in 0..WAITERS {
            let directory = directory.clone();
            let start = start.clone();
            handles.push(thread::spawn(move || {
                start.wait();
                directory.resolve(WALLET)
            }));
        }

        start.wait();
        // Give the waiters time to register against the in-flight entry,
        // then release the leader.
        thread::sleep(std::time::Duration::from_millis(50));
        gate.wait();

        for handle in handles {
            let result = handle.join().unwrap().unwrap();
            assert_eq!(result.unwrap().full_name, "Cache Test");
        }
        assert_eq!(directory.backend.calls(), 1);
    }

    #[test]
    fn retryable_upstream_failure_is_retried_once() {
        let directory = Directory::new(CountingBackend::failing(1));
        assert!(directory.resolve(WALLET).unwrap().is_some());
        assert_eq!(directory.backend.calls(), 2);
    }

    #[test]
    fn persistent_upstream_failure_surfaces_after_one_retry() {
        let directory = Directory::new(CountingBackend::failing(5));
        let err = directory.resolve(WALLET).unwrap_err();
        assert!(err.retryable());
        // Exactly two attempts: the call and its single retry.
        assert_eq!(directory.backend.calls(), 2);
        // Failures are not cached; the next resolve tries again.
        assert!(directory.resolve(WALLET).is_err());
        assert_eq!(directory.backend.calls(), 4);
    }

    #[test]
    fn invalidation_forces_a_refetch() {
        let directory = Directory::new(CountingBackend::new());
        directory.resolve(WALLET).unwrap();
        directory.invalidate(WALLET).unwrap();
        directory.resolve(WALLET).unwrap();
        assert_eq!(directory.backend.calls(), 2);
    }

    #[test]
    fn auth_transition_clears_the_cache() {
        let directory = Directory::new(CountingBackend::new());
        directory.resolve(WALLET).unwrap();
        directory.auth_transition(AuthEvent::SignedOut);
        directory.resolve(WALLET).unwrap();
        assert_eq!(directory.backend.calls(), 2);
    }

    #[test]
    fn in_flight_result_is_discarded_after_auth_change() {
        let gate = Arc::new(Barrier::new(2));
        let directory = Arc::new(Directory::new(CountingBackend::gated(gate.clone())));

        let worker = {
            let directory = directory.clone();
            thread::spawn(move || directory.resolve(WALLET))
        };

        // The worker is now blocked inside the backend. Change identity,
        // then let the fetch finish.
        thread::sleep(std::time::Duration::from_millis(50));
        directory.auth_transition(AuthEvent::SignedOut);
        gate.wait();

        let result = worker.join().unwrap();
        assert_eq!(result.unwrap_err(), SessionError::Stale);

        // The stale result was not cached: a fresh resolve fetches again.
        let gate_again = gate.clone();
        let refetch = {
            let directory = directory.clone();
            thread::spawn(move || directory.resolve(WALLET))
        };
        thread::sleep(std::time::Duration::from_millis(50));
        gate_again.wait();
        assert!(refetch.join().unwrap().unwrap().is_some());
        assert_eq!(directory.backend.calls(), 2);
    }

    #[test]
    fn subscribers_observe_cache_events() {
        let directory = Directory::new(CountingBackend::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        {
            let events = events.clone();
            directory.subscribe(move |event| {
                lock(&events).push(event.clone());
            });
        }

        directory.resolve(WALLET).unwrap();
        directory.invalidate(WALLET).unwrap();
        directory.invalidate_all();

        let seen = lock(&events).clone();
        assert_eq!(
            seen,
            vec![
                CacheEvent::Resolved(CANONICAL.to_string()),
                CacheEvent::Invalidated(CANONICAL.to_string()),
                CacheEvent::Cleared,
            ]
        );
    }

    #[test]
    fn invalid_wallets_never_reach_the_backend() {
        let directory = Directory::new(CountingBackend::new());
        assert!(directory.resolve("0xZZ").is_err());
        assert_eq!(directory.backend.calls(), 0);
    }
}
