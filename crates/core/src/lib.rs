//! `pricewatch-core`: domain foundation building blocks.
//!
//! Pure domain primitives shared by the offer crates (no infrastructure
//! concerns): integral identifiers, the domain error model and a calendar clock.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{OfferId, ProductId, StoreId};
