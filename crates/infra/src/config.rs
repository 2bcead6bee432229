//! Store configuration loaded from the environment.
//!
//! | variable | meaning |
//! |---|---|
//! | `USE_PERSISTENT_STORES` | `true` selects Postgres, anything else in-memory |
//! | `DATABASE_URL` | Postgres connection string, required when persistent |
//! | `DATABASE_MAX_CONNECTIONS` | pool size, defaults to 5 |

use std::sync::Arc;

use anyhow::{Context, bail};
use sqlx::postgres::PgPoolOptions;

use pricewatch_offers::OfferStore;

use crate::offer_store::{InMemoryOfferStore, PostgresOfferStore};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::InMemory,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (the environment
    /// in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw.trim().parse::<bool>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "USE_PERSISTENT_STORES is not a boolean; using in-memory store");
                false
            }),
        };

        if !use_persistent {
            return Ok(Self::in_memory());
        }

        let Some(database_url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) else {
            bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a positive integer: {raw:?}"))?,
        };
        if max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            backend: StoreBackend::Postgres {
                database_url,
                max_connections,
            },
        })
    }
}

/// Build the offer store selected by `config`.
///
/// The Postgres pool connects lazily, so this does not touch the database, but
/// it must be called from within a tokio runtime.
pub fn build_offer_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn OfferStore>> {
    match &config.backend {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory offer store");
            Ok(Arc::new(InMemoryOfferStore::new()))
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect_lazy(database_url)
                .context("invalid DATABASE_URL")?;
            tracing::info!(max_connections, "using postgres offer store");
            Ok(Arc::new(PostgresOfferStore::new(pool)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_in_memory() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::in_memory());
    }

    #[test]
    fn non_boolean_flag_falls_back_to_in_memory() {
        let config = StoreConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "yes")])).unwrap();
        assert_eq!(config.backend, StoreBackend::InMemory);
    }

    #[test]
    fn persistent_requires_database_url() {
        let err = StoreConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = StoreConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "  "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn persistent_reads_url_and_pool_size() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/pricewatch"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/pricewatch".to_string(),
                max_connections: 12,
            }
        );
    }

    #[test]
    fn pool_size_defaults_and_validates() {
        let base = [
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/pricewatch"),
        ];
        let config = StoreConfig::from_lookup(lookup(&base)).unwrap();
        assert!(matches!(
            config.backend,
            StoreBackend::Postgres { max_connections: DEFAULT_MAX_CONNECTIONS, .. }
        ));

        let mut bad = base.to_vec();
        bad.push(("DATABASE_MAX_CONNECTIONS", "many"));
        assert!(StoreConfig::from_lookup(lookup(&bad)).is_err());

        let mut zero = base.to_vec();
        zero.push(("DATABASE_MAX_CONNECTIONS", "0"));
        assert!(StoreConfig::from_lookup(lookup(&zero)).is_err());
    }

    #[test]
    fn builds_in_memory_store() {
        let store = build_offer_store(&StoreConfig::in_memory()).unwrap();
        assert!(
            store
                .find_by_product_id(pricewatch_core::ProductId::new(1))
                .unwrap()
                .is_empty()
        );
    }
}
