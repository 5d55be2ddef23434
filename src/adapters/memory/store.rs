//! Copy-on-write transactional store backing the in-memory repositories.

use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::DomainError;

/// Mutex-guarded state with all-or-nothing writes.
///
/// `transaction` runs the closure against a clone of the state and swaps it
/// in only when the closure returns `Ok`, so a failed compound write leaves
/// nothing behind and readers never observe a half-applied change.
pub struct InMemoryStore<S> {
    state: Mutex<S>,
}

impl<S: Clone + Default> InMemoryStore<S> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(S::default()),
        }
    }

    /// Run a compound write. Commits on `Ok`, rolls back on `Err`.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut S) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut guard = self.lock()?;
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        *guard = draft;
        Ok(out)
    }

    /// Run a read against the committed state.
    pub fn read<T>(&self, f: impl FnOnce(&S) -> T) -> Result<T, DomainError> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::database("In-memory store lock poisoned"))
    }
}

impl<S: Clone + Default> Default for InMemoryStore<S> {
    fn default() -> Self {
        Self::new()
    }
}
