//! Offer recording service.
//!
//! `OfferRecorder` is stateless: it holds the injected store and clock and
//! delegates every write and read to the store. Two write paths exist and
//! they normalize differently:
//!
//! - [`OfferRecorder::record_existing`] re-activates a domain record and stamps
//!   `date_from` with today's date. A clock failure is logged and reported in
//!   the [`RecordOutcome`] but never blocks the save.
//! - [`OfferRecorder::record_new_entry`] maps a transport entry into a fresh
//!   record, keeps its dates as supplied, and writes the generated id back.

use thiserror::Error;

use pricewatch_core::{Clock, DomainError, OfferId, ProductId, SystemClock};

use crate::offer::{OfferEntry, OfferRecord};
use crate::store::{OfferStore, OfferStoreError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OfferError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] OfferStoreError),

    /// The store acknowledged a save without assigning an identifier.
    #[error("offer store returned a record without an id")]
    MissingId,
}

/// Result of [`OfferRecorder::record_existing`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    /// The record as persisted.
    pub record: OfferRecord,
    /// Set when today's date could not be determined; `record.date_from` then
    /// still holds the caller's value.
    pub date_error: Option<DomainError>,
}

impl RecordOutcome {
    pub fn date_normalized(&self) -> bool {
        self.date_error.is_none()
    }
}

#[derive(Debug)]
pub struct OfferRecorder<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S> OfferRecorder<S>
where
    S: OfferStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S, C> OfferRecorder<S, C>
where
    S: OfferStore,
    C: Clock,
{
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist an existing domain record as an active offer starting today.
    pub fn record_existing(&self, mut record: OfferRecord) -> Result<RecordOutcome, OfferError> {
        record.withdrawn = false;

        let date_error = match self.clock.today() {
            Ok(today) => {
                record.date_from = Some(today);
                None
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    product_id = %record.product_id,
                    store_id = %record.store_id,
                    "failed to normalize offer start date; saving with caller-supplied date"
                );
                Some(err)
            }
        };

        let record = self.store.save(record)?;

        tracing::debug!(
            offer_id = ?record.id(),
            product_id = %record.product_id,
            store_id = %record.store_id,
            "offer recorded"
        );

        Ok(RecordOutcome { record, date_error })
    }

    /// Persist a new offer from its transport shape and return the same entry
    /// carrying the generated id.
    ///
    /// Fails before touching the store when `product_id` or `shop_id` is not
    /// an integer.
    pub fn record_new_entry(&self, mut entry: OfferEntry) -> Result<OfferEntry, OfferError> {
        let record = OfferRecord::try_from(&entry)?;

        let saved = self.store.save(record)?;
        let id = saved.id().ok_or(OfferError::MissingId)?;
        entry.id = Some(id.to_string());

        tracing::debug!(
            offer_id = %id,
            product_id = %saved.product_id,
            store_id = %saved.store_id,
            "offer entry recorded"
        );

        Ok(entry)
    }

    pub fn find_by_product(&self, product_id: ProductId) -> Result<Vec<OfferRecord>, OfferError> {
        Ok(self.store.find_by_product_id(product_id)?)
    }

    /// Offers for a product that have not been withdrawn.
    pub fn find_active_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<OfferRecord>, OfferError> {
        let mut records = self.store.find_by_product_id(product_id)?;
        records.retain(|r| !r.withdrawn);
        Ok(records)
    }

    /// Mark an offer as no longer active.
    pub fn withdraw(&self, offer_id: OfferId) -> Result<OfferRecord, OfferError> {
        let mut record = self
            .store
            .find_by_id(offer_id)?
            .ok_or(DomainError::NotFound)?;

        record.withdrawn = true;
        let record = self.store.save(record)?;

        tracing::info!(offer_id = %offer_id, product_id = %record.product_id, "offer withdrawn");

        Ok(record)
    }
}
