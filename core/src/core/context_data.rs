// src/core/context_data.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable state for one pipeline run.
///
/// Every handler receives a clone of the same `ContextData`, so writes made
/// by one step are visible to the next. Guards are blocking and MUST be
/// dropped before any `.await`.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Runs `f` under a read lock and returns its result, so the guard can
  /// never outlive the call.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
    f(&self.0.read())
  }

  /// Runs `f` under a write lock.
  pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
    f(&mut self.0.write())
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}
