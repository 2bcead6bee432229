//! Storage boundary for offer records.

use std::sync::Arc;

use thiserror::Error;

use pricewatch_core::{OfferId, ProductId};

use crate::offer::OfferRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OfferStoreError {
    /// The backend rejected or failed the operation.
    #[error("offer store backend error: {0}")]
    Backend(String),

    /// The backend could not be reached (no runtime, closed pool, poisoned lock).
    #[error("offer store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for offer records.
///
/// Implementations own concurrency control; callers hold no locks.
pub trait OfferStore: Send + Sync {
    /// Insert `record` when it has no id (assigning one), otherwise upsert it
    /// under its id. Returns the stored record, id populated.
    fn save(&self, record: OfferRecord) -> Result<OfferRecord, OfferStoreError>;

    /// All records for a product, in the order the backend returns them.
    fn find_by_product_id(&self, product_id: ProductId) -> Result<Vec<OfferRecord>, OfferStoreError>;

    fn find_by_id(&self, offer_id: OfferId) -> Result<Option<OfferRecord>, OfferStoreError>;
}

impl<S> OfferStore for Arc<S>
where
    S: OfferStore + ?Sized,
{
    fn save(&self, record: OfferRecord) -> Result<OfferRecord, OfferStoreError> {
        (**self).save(record)
    }

    fn find_by_product_id(&self, product_id: ProductId) -> Result<Vec<OfferRecord>, OfferStoreError> {
        (**self).find_by_product_id(product_id)
    }

    fn find_by_id(&self, offer_id: OfferId) -> Result<Option<OfferRecord>, OfferStoreError> {
        (**self).find_by_id(offer_id)
    }
}
