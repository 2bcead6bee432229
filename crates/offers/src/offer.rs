use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pricewatch_core::{DomainError, DomainResult, OfferId, ProductId, StoreId};

/// A stored association between a product and a store.
///
/// `id` is assigned by storage on first save and cannot change afterwards;
/// every other field is plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    id: Option<OfferId>,
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub price: f64,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub withdrawn: bool,
}

impl OfferRecord {
    /// A not-yet-persisted, active offer with an open validity window.
    pub fn new(product_id: ProductId, store_id: StoreId, price: f64) -> Self {
        Self {
            id: None,
            product_id,
            store_id,
            price,
            date_from: None,
            date_to: None,
            withdrawn: false,
        }
    }

    /// Rebuild a record that storage already holds under `id`.
    pub fn stored(id: OfferId, product_id: ProductId, store_id: StoreId, price: f64) -> Self {
        Self {
            id: Some(id),
            ..Self::new(product_id, store_id, price)
        }
    }

    pub fn with_dates(mut self, date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> Self {
        self.date_from = date_from;
        self.date_to = date_to;
        self
    }

    pub fn id(&self) -> Option<OfferId> {
        self.id
    }

    /// Attach the storage-assigned identifier.
    ///
    /// Re-assigning the same id is a no-op; a different id is a conflict.
    pub fn assign_id(&mut self, id: OfferId) -> DomainResult<()> {
        match self.id {
            None => {
                self.id = Some(id);
                Ok(())
            }
            Some(current) if current == id => Ok(()),
            Some(current) => Err(DomainError::conflict(format!(
                "offer id already assigned (current: {current}, attempted: {id})"
            ))),
        }
    }
}

/// Transport-facing offer shape exchanged with external callers.
///
/// Identifiers travel as text; `id` is only present once the offer has been
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub product_id: String,
    pub shop_id: String,
    pub price: f64,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl TryFrom<&OfferEntry> for OfferRecord {
    type Error = DomainError;

    fn try_from(entry: &OfferEntry) -> Result<Self, Self::Error> {
        let product_id: ProductId = entry.product_id.parse()?;
        let store_id: StoreId = entry.shop_id.parse()?;

        Ok(OfferRecord::new(product_id, store_id, entry.price)
            .with_dates(entry.date_from, entry.date_to))
    }
}

impl From<&OfferRecord> for OfferEntry {
    fn from(record: &OfferRecord) -> Self {
        OfferEntry {
            id: record.id.map(|id| id.to_string()),
            product_id: record.product_id.to_string(),
            shop_id: record.store_id.to_string(),
            price: record.price,
            date_from: record.date_from,
            date_to: record.date_to,
        }
    }
}
