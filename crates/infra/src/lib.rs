//! Infrastructure layer: offer storage adapters and store wiring.

pub mod config;
pub mod offer_store;


pub use config::{StoreBackend, StoreConfig, build_offer_store};
pub use offer_store::{InMemoryOfferStore, PostgresOfferStore};
