// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Append-only, handle-addressed row storage.
//!
//! [`GrowableStore`] is the single storage primitive of the catalog. Rows are
//! appended at the end, addressed by their position, and never moved between
//! slots or compacted. Deletion is a one-way tombstone that keeps the slot in
//! place; memory is only reclaimed by releasing the whole store.
//!
//! # Borrow Rules
//!
//! Row references borrow the store, so a reference obtained from
//! [`append`](GrowableStore::append) or [`get_live`](GrowableStore::get_live)
//! cannot outlive the next mutation. Growth may relocate the backing buffer;
//! callers keep handles, never references, across calls.
use std::marker::PhantomData;

use tracing::trace;

use crate::error::CatalogError;
use crate::ident::Handle;

/// Largest number of rows any store may hold; one past the last handle.
pub(crate) const HANDLE_SPACE: usize = u32::MAX as usize;

/// Smallest capacity a store grows to on its first reservation.
const MIN_GROWTH: usize = 4;

/// Lifecycle of a slot. The only transition is `Live -> Tombstoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowState {
    /// The row is visible to lookups.
    Live,
    /// The row was torn down; its slot is kept but its data is gone.
    Tombstoned,
}

/// Row types drop their owned data when their slot is tombstoned.
pub trait Tombstone {
    /// Releases owned strings and buffers. Called exactly once per row.
    fn tombstone(&mut self);
}

#[derive(Debug, Clone)]
struct Slot<T> {
    state: RowState,
    row: T,
}

/// Append-only backing array of rows, indexed by handle.
///
/// The liveness of each slot is tracked separately from the row's own fields,
/// together with a running count of live rows so that "is anything still
/// alive" is answered without a scan.
#[derive(Debug, Clone)]
pub struct GrowableStore<T, H> {
    slots: Vec<Slot<T>>,
    live: usize,
    limit: usize,
    _handle: PhantomData<fn() -> H>,
}

impl<T, H> GrowableStore<T, H>
where
    T: Tombstone,
    H: Handle,
{
    /// Creates an empty store with room for `initial` rows.
    ///
    /// `limit` caps the number of rows the store will ever accept; `None`
    /// means the full 32-bit handle space.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::OutOfMemory`] when the initial reservation
    /// fails.
    pub fn with_capacity(initial: usize, limit: Option<usize>) -> Result<Self, CatalogError> {
        let limit = limit.map_or(HANDLE_SPACE, |l| l.min(HANDLE_SPACE));
        let initial = initial.min(limit);
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(initial)
            .map_err(|_| CatalogError::OutOfMemory { requested: initial })?;
        Ok(Self {
            slots,
            live: 0,
            limit,
            _handle: PhantomData,
        })
    }

    /// Appends a live row and returns its handle with a reference to it.
    ///
    /// The new handle equals the previous [`len`](Self::len).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CapacityExceeded`] when the store is at its row
    /// limit and [`CatalogError::OutOfMemory`] when growth fails. In both
    /// cases the store is left exactly as it was.
    pub fn append(&mut self, row: T) -> Result<(H, &mut T), CatalogError> {
        let index = self.slots.len();
        let handle = H::from_index(index)
            .filter(|_| index < self.limit)
            .ok_or(CatalogError::CapacityExceeded { limit: self.limit })?;
        self.reserve_one()?;
        self.slots.push(Slot {
            state: RowState::Live,
            row,
        });
        self.live += 1;
        Ok((handle, &mut self.slots[index].row))
    }

    /// Makes room for one more row, doubling the capacity when full.
    fn reserve_one(&mut self) -> Result<(), CatalogError> {
        let len = self.slots.len();
        let capacity = self.slots.capacity();
        if len < capacity {
            return Ok(());
        }
        let target = capacity.saturating_mul(2).max(MIN_GROWTH).min(self.limit);
        trace!(from = capacity, to = target, "growing store");
        self.slots
            .try_reserve_exact(target - len)
            .map_err(|_| CatalogError::OutOfMemory { requested: target })
    }

    /// Returns the row at `handle` whatever its state.
    pub fn get(&self, handle: H) -> Option<&T> {
        self.slots.get(handle.index()).map(|slot| &slot.row)
    }

    /// Returns the state of the slot at `handle`, or `None` when out of range.
    pub fn state(&self, handle: H) -> Option<RowState> {
        self.slots.get(handle.index()).map(|slot| slot.state)
    }

    /// Returns the row at `handle` if it is in range and live.
    pub fn get_live(&self, handle: H) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.state == RowState::Live)
            .map(|slot| &slot.row)
    }

    /// Mutable variant of [`get_live`](Self::get_live).
    pub fn get_live_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.state == RowState::Live)
            .map(|slot| &mut slot.row)
    }

    /// Number of slots ever appended, live or tombstoned.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing was ever appended.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of live rows.
    pub fn live_len(&self) -> usize {
        self.live
    }

    /// Number of rows the backing buffer holds before it must grow.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Maximum number of rows this store accepts.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Iterates live rows in handle order.
    pub fn iter_live(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == RowState::Live)
            .filter_map(|(index, slot)| H::from_index(index).map(|h| (h, &slot.row)))
    }

    /// Returns the first live handle, in handle order, whose row satisfies
    /// `pred`.
    pub fn find_live<P>(&self, mut pred: P) -> Option<H>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter_live()
            .find(|(_, row)| pred(row))
            .map(|(handle, _)| handle)
    }

    /// Tombstones the row at `handle`.
    ///
    /// Returns `true` if the row was live. Tombstoning an already tombstoned
    /// or out-of-range slot is a no-op.
    pub fn tombstone(&mut self, handle: H) -> bool {
        match self.slots.get_mut(handle.index()) {
            Some(slot) if slot.state == RowState::Live => {
                slot.row.tombstone();
                slot.state = RowState::Tombstoned;
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    /// Tombstones every live row and returns how many were live.
    pub fn tombstone_all(&mut self) -> usize {
        let mut count = 0;
        for slot in &mut self.slots {
            if slot.state == RowState::Live {
                slot.row.tombstone();
                slot.state = RowState::Tombstoned;
                count += 1;
            }
        }
        self.live = 0;
        count
    }

    /// Frees the backing buffer. Returns the number of slots released.
    ///
    /// The owner is expected to forget the store afterwards; the catalog
    /// models an uninitialized store as `None`.
    pub fn release(self) -> usize {
        let slots = self.slots.len();
        trace!(slots, live = self.live, "releasing store");
        slots
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ident::DimensionId;

    #[derive(Debug, Default)]
    struct Label(Option<String>);

    impl Tombstone for Label {
        fn tombstone(&mut self) {
            self.0 = None;
        }
    }

    fn label(s: &str) -> Label {
        Label(Some(s.to_owned()))
    }

    type Store = GrowableStore<Label, DimensionId>;

    #[test]
    fn append_hands_out_sequential_handles() {
        let mut store = Store::with_capacity(0, None).unwrap();
        for k in 0..10u32 {
            let (handle, _) = store.append(label("x")).unwrap();
            assert_eq!(handle, DimensionId(k));
        }
        assert_eq!(store.len(), 10);
        assert_eq!(store.live_len(), 10);
    }

    #[test]
    fn growth_doubles_capacity() {
        let mut store = Store::with_capacity(0, None).unwrap();
        store.append(label("a")).unwrap();
        let first = store.capacity();
        assert!(first >= MIN_GROWTH);
        while store.len() < first {
            store.append(label("a")).unwrap();
        }
        store.append(label("b")).unwrap();
        assert!(store.capacity() >= first * 2);
    }

    #[test]
    fn limit_rejects_append_and_keeps_store_intact() {
        let mut store = Store::with_capacity(1, Some(2)).unwrap();
        store.append(label("a")).unwrap();
        store.append(label("b")).unwrap();
        let err = store.append(label("c")).unwrap_err();
        assert_eq!(err, CatalogError::CapacityExceeded { limit: 2 });
        assert_eq!(store.len(), 2);
        assert_eq!(store.live_len(), 2);
        assert_eq!(store.get_live(DimensionId(1)).unwrap().0.as_deref(), Some("b"));
    }

    #[test]
    fn tombstone_keeps_slot_and_hides_row() {
        let mut store = Store::with_capacity(2, None).unwrap();
        store.append(label("a")).unwrap();
        store.append(label("b")).unwrap();

        assert!(store.tombstone(DimensionId(0)));
        assert!(!store.tombstone(DimensionId(0)), "second tombstone is a no-op");
        assert!(!store.tombstone(DimensionId(9)), "out of range is a no-op");

        assert_eq!(store.len(), 2);
        assert_eq!(store.live_len(), 1);
        assert_eq!(store.state(DimensionId(0)), Some(RowState::Tombstoned));
        assert!(store.get_live(DimensionId(0)).is_none());
        assert!(store.get(DimensionId(0)).unwrap().0.is_none(), "owned data dropped");
    }

    #[test]
    fn find_live_skips_tombstones_and_prefers_lowest_handle() {
        let mut store = Store::with_capacity(0, None).unwrap();
        store.append(label("dup")).unwrap();
        store.append(label("dup")).unwrap();
        store.append(label("other")).unwrap();
        let is_dup = |row: &Label| row.0.as_deref() == Some("dup");

        assert_eq!(store.find_live(is_dup), Some(DimensionId(0)));
        store.tombstone(DimensionId(0));
        assert_eq!(store.find_live(is_dup), Some(DimensionId(1)));
        store.tombstone(DimensionId(1));
        assert_eq!(store.find_live(is_dup), None);
    }

    #[test]
    fn tombstone_all_zeroes_live_count() {
        let mut store = Store::with_capacity(0, None).unwrap();
        for name in ["a", "b", "c"] {
            store.append(label(name)).unwrap();
        }
        store.tombstone(DimensionId(1));
        assert_eq!(store.tombstone_all(), 2);
        assert_eq!(store.live_len(), 0);
        assert_eq!(store.iter_live().count(), 0);
        assert_eq!(store.release(), 3);
    }
}
