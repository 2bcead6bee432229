//! Offers domain module.
//!
//! An offer states that a store sells a product at a price over a validity
//! window. This crate owns the two offer shapes (transport [`OfferEntry`] and
//! stored [`OfferRecord`]), the [`OfferStore`] boundary, and the
//! [`OfferRecorder`] service that normalizes and persists offers through it.

pub mod offer;
pub mod recorder;
pub mod store;

pub use offer::{OfferEntry, OfferRecord};
pub use recorder::{OfferError, OfferRecorder, RecordOutcome};
pub use store::{OfferStore, OfferStoreError};
