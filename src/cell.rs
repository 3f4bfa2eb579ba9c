use crate::store::{Store, StoreKey};
use serde::Serialize;

/// Typed accessor for one persisted collection.
///
/// A cell owns the in-memory snapshot for its key and mirrors every mutation
/// through the adapter. Construction takes an already-seeded value — the
/// caller performs the single read, choosing the right read flavor for the
/// key. Afterwards the snapshot is authoritative and the file is maintained
/// best-effort.
pub struct StoreCell<T> {
    key: StoreKey,
    value: T,
}

impl<T: std::fmt::Debug> std::fmt::Debug for StoreCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCell")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

impl<T> StoreCell<T>
where
    T: Serialize + Default,
{
    /// Create a cell for `key` holding the seeded `value`.
    pub fn new(key: StoreKey, value: T) -> Self {
        StoreCell { key, value }
    }

    /// Current in-memory snapshot. No I/O.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// The key this cell is bound to.
    pub fn key(&self) -> StoreKey {
        self.key
    }

    /// Replace the value and mirror it to the store.
    ///
    /// Memory updates first; a failed persist is logged and the in-memory
    /// value stays authoritative, so the on-disk copy may lag until the next
    /// successful write.
    pub fn set(&mut self, store: &mut Store, value: T) {
        self.value = value;
        self.persist(store);
    }

    /// Read-modify-write with a pure function of the previous value, all
    /// within the current execution turn.
    pub fn update(&mut self, store: &mut Store, f: impl FnOnce(T) -> T) {
        let next = f(std::mem::take(&mut self.value));
        self.set(store, next);
    }

    /// Remove the key from the store and reset the snapshot to default.
    pub fn clear(&mut self, store: &mut Store) {
        self.value = T::default();
        if let Err(err) = store.remove(self.key) {
            log::warn!("cell: failed to remove {}: {err}", self.key);
        }
    }

    /// Install an externally observed value without writing it back.
    ///
    /// Sync path only: when another context modified this key, whichever
    /// value arrives last wins.
    pub fn adopt(&mut self, value: T) {
        self.value = value;
    }

    fn persist(&self, store: &mut Store) {
        if let Err(err) = store.write(self.key, &self.value) {
            log::warn!(
                "cell: failed to persist {}, keeping in-memory value: {err}",
                self.key
            );
        }
    }
}
