//! Optimistic mutation helper.
//!
//! UI mutations apply a tentative local change before the backend confirms.
//! The snapshot-restore shape guarantees the visible state after a failure is
//! exactly the state from before the attempt.

/// Apply `mutate` to `state` immediately, then run `commit`. On commit
/// failure the prior state is restored and the error returned.
pub fn apply_optimistic<T, E, M, C>(state: &mut T, mutate: M, commit: C) -> Result<(), E>
where
    T: Clone,
    M: FnOnce(&mut T),
    C: FnOnce(&T) -> Result<(), E>,
{
    let snapshot = state.clone();
    mutate(state);
    match commit(state) {
        Ok(()) => Ok(()),
        Err(err) => {
            *state = snapshot;
            Err(err)
        }
    }
}
