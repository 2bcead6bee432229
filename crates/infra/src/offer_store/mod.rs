//! `OfferStore` adapters.
//!
//! The in-memory store backs tests and local development; the Postgres store
//! is the durable backend.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryOfferStore;
pub use postgres::PostgresOfferStore;
