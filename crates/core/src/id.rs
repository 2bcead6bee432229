//! Strongly-typed identifiers used across the domain.
//!
//! All identifiers are integral (`i64`), matching the relational keys the
//! storage layer hands out. Transport shapes carry them as decimal text and
//! parse them through [`FromStr`].

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product in the catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of a store (shop) that offers products.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(i64);

/// Identifier of a persisted offer record. Assigned by storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(i64);

macro_rules! impl_i64_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {:?}: {}", $name, s, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_i64_newtype!(ProductId, "ProductId");
impl_i64_newtype!(StoreId, "StoreId");
impl_i64_newtype!(OfferId, "OfferId");

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_decimal_text() {
        assert_eq!("7".parse::<ProductId>().unwrap(), ProductId::new(7));
        assert_eq!("-3".parse::<StoreId>().unwrap().get(), -3);
    }

    #[test]
    fn rejects_non_numeric_text() {
        let err = "abc".parse::<ProductId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => {
                assert!(msg.starts_with("ProductId"));
                assert!(msg.contains("abc"));
            }
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn rejects_padded_and_empty_text() {
        assert!(" 7".parse::<StoreId>().is_err());
        assert!("".parse::<StoreId>().is_err());
        assert!("1.5".parse::<OfferId>().is_err());
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&OfferId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: OfferId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OfferId::new(42));
    }

    proptest! {
        /// Property: any i64 rendered by Display parses back to the same id.
        #[test]
        fn display_then_parse_is_identity(raw in any::<i64>()) {
            let id = ProductId::new(raw);
            prop_assert_eq!(id.to_string().parse::<ProductId>().unwrap(), id);
        }
    }
}
