use std::collections::BTreeMap;
use std::sync::RwLock;

use pricewatch_core::{OfferId, ProductId};
use pricewatch_offers::{OfferRecord, OfferStore, OfferStoreError};

#[derive(Debug)]
struct Inner {
    /// `None` once `i64::MAX` has been taken.
    next_id: Option<i64>,
    rows: BTreeMap<OfferId, OfferRecord>,
}

/// In-memory offer store.
///
/// Intended for tests/dev. Ids are handed out sequentially starting at 1 and
/// lookups return records in id order.
#[derive(Debug)]
pub struct InMemoryOfferStore {
    inner: RwLock<Inner>,
}

impl InMemoryOfferStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: Some(1),
                rows: BTreeMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryOfferStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> OfferStoreError {
    OfferStoreError::Unavailable("lock poisoned".to_string())
}

impl OfferStore for InMemoryOfferStore {
    fn save(&self, mut record: OfferRecord) -> Result<OfferRecord, OfferStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;

        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = inner.next_id.map(OfferId::new).ok_or_else(|| {
                    OfferStoreError::Backend("offer id space exhausted".to_string())
                })?;
                record
                    .assign_id(id)
                    .map_err(|e| OfferStoreError::Backend(e.to_string()))?;
                id
            }
        };

        // Explicit ids may run ahead of the sequence; never hand them out again.
        inner.next_id = match (inner.next_id, id.get().checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
        inner.rows.insert(id, record.clone());

        Ok(record)
    }

    fn find_by_product_id(&self, product_id: ProductId) -> Result<Vec<OfferRecord>, OfferStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner
            .rows
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    fn find_by_id(&self, offer_id: OfferId) -> Result<Option<OfferRecord>, OfferStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.rows.get(&offer_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_core::StoreId;

    fn offer(product: i64, store: i64) -> OfferRecord {
        OfferRecord::new(ProductId::new(product), StoreId::new(store), 4.25)
    }

    #[test]
    fn assigns_sequential_ids() {
        let store = InMemoryOfferStore::new();
        let a = store.save(offer(1, 1)).unwrap();
        let b = store.save(offer(1, 2)).unwrap();
        assert_eq!(a.id(), Some(OfferId::new(1)));
        assert_eq!(b.id(), Some(OfferId::new(2)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn saving_identified_record_replaces_it() {
        let store = InMemoryOfferStore::new();
        let mut saved = store.save(offer(1, 1)).unwrap();
        saved.withdrawn = true;
        store.save(saved.clone()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id(saved.id().unwrap()).unwrap(), Some(saved));
    }

    #[test]
    fn explicit_ids_advance_the_sequence() {
        let store = InMemoryOfferStore::new();
        store
            .save(OfferRecord::stored(OfferId::new(10), ProductId::new(1), StoreId::new(1), 1.0))
            .unwrap();
        let next = store.save(offer(1, 2)).unwrap();
        assert_eq!(next.id(), Some(OfferId::new(11)));
    }

    #[test]
    fn max_id_is_stored_and_exhausts_the_sequence() {
        let store = InMemoryOfferStore::new();
        let max = OfferRecord::stored(OfferId::new(i64::MAX), ProductId::new(1), StoreId::new(1), 1.0);

        let saved = store.save(max).unwrap();
        assert_eq!(saved.id(), Some(OfferId::new(i64::MAX)));

        // Updating the existing row still works.
        let mut withdrawn = saved.clone();
        withdrawn.withdrawn = true;
        store.save(withdrawn.clone()).unwrap();
        assert_eq!(store.find_by_id(OfferId::new(i64::MAX)).unwrap(), Some(withdrawn));

        let err = store.save(offer(1, 2)).unwrap_err();
        assert_eq!(err, OfferStoreError::Backend("offer id space exhausted".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn find_by_product_returns_only_that_product_in_id_order() {
        let store = InMemoryOfferStore::new();
        store.save(offer(42, 3)).unwrap();
        store.save(offer(7, 1)).unwrap();
        store.save(offer(42, 1)).unwrap();

        let found = store.find_by_product_id(ProductId::new(42)).unwrap();
        let ids: Vec<_> = found.iter().map(|r| r.id().unwrap().get()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(found.iter().all(|r| r.product_id == ProductId::new(42)));
    }

    #[test]
    fn find_by_id_misses_unknown_ids() {
        let store = InMemoryOfferStore::new();
        assert!(store.is_empty());
        assert_eq!(store.find_by_id(OfferId::new(1)).unwrap(), None);
    }
}
