//! Postgres-backed offer store.
//!
//! Offers live in the `has_product` table, one row per product/store offer.
//! The `OfferStore` trait is synchronous, so the trait methods drive the async
//! sqlx queries on the ambient tokio runtime. This requires a multi-threaded
//! runtime: on a current-thread runtime (or outside any runtime) the store
//! reports `OfferStoreError::Unavailable` instead of blocking.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::instrument;

use pricewatch_core::{OfferId, ProductId, StoreId};
use pricewatch_offers::{OfferRecord, OfferStore, OfferStoreError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS has_product (
    id          BIGSERIAL PRIMARY KEY,
    product_id  BIGINT NOT NULL,
    store_id    BIGINT NOT NULL,
    price       DOUBLE PRECISION NOT NULL,
    date_from   DATE,
    date_to     DATE,
    withdrawn   BOOLEAN NOT NULL DEFAULT FALSE
)
"#;

const CREATE_PRODUCT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS has_product_product_id_idx ON has_product (product_id)";

// Never moves the sequence backwards; ids below 1 leave it where it is.
const ADVANCE_ID_SEQUENCE: &str = r#"
SELECT setval(
    pg_get_serial_sequence('has_product', 'id'),
    GREATEST($1, (SELECT last_value FROM has_product_id_seq))
)
"#;

#[derive(Debug, Clone)]
pub struct PostgresOfferStore {
    pool: Arc<PgPool>,
}

impl PostgresOfferStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `has_product` table and its product index if missing.
    pub async fn ensure_schema(&self) -> Result<(), OfferStoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        sqlx::query(CREATE_PRODUCT_INDEX)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    /// Insert a new row (id assigned by the sequence) or upsert an existing one.
    #[instrument(
        skip(self, record),
        fields(
            offer_id = ?record.id(),
            product_id = %record.product_id,
            store_id = %record.store_id
        ),
        err
    )]
    pub async fn save_record(&self, record: OfferRecord) -> Result<OfferRecord, OfferStoreError> {
        let row = match record.id() {
            None => {
                sqlx::query_as::<_, OfferRow>(
                    r#"
                    INSERT INTO has_product (product_id, store_id, price, date_from, date_to, withdrawn)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id, product_id, store_id, price, date_from, date_to, withdrawn
                    "#,
                )
                .bind(record.product_id.get())
                .bind(record.store_id.get())
                .bind(record.price)
                .bind(record.date_from)
                .bind(record.date_to)
                .bind(record.withdrawn)
                .fetch_one(&*self.pool)
                .await
            }
            Some(id) => return self.upsert_with_id(id, &record).await,
        }
        .map_err(|e| map_sqlx_error("save", e))?;

        Ok(row.into())
    }

    /// Upsert under a caller-supplied id and move the id sequence past it, so
    /// later id-less inserts never collide with it.
    async fn upsert_with_id(&self, id: OfferId, record: &OfferRecord) -> Result<OfferRecord, OfferStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query_as::<_, OfferRow>(
            r#"
            INSERT INTO has_product (id, product_id, store_id, price, date_from, date_to, withdrawn)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id)
            DO UPDATE SET
                product_id = EXCLUDED.product_id,
                store_id = EXCLUDED.store_id,
                price = EXCLUDED.price,
                date_from = EXCLUDED.date_from,
                date_to = EXCLUDED.date_to,
                withdrawn = EXCLUDED.withdrawn
            RETURNING id, product_id, store_id, price, date_from, date_to, withdrawn
            "#,
        )
        .bind(id.get())
        .bind(record.product_id.get())
        .bind(record.store_id.get())
        .bind(record.price)
        .bind(record.date_from)
        .bind(record.date_to)
        .bind(record.withdrawn)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("save", e))?;

        sqlx::query(ADVANCE_ID_SEQUENCE)
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("advance_id_sequence", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn load_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<OfferRecord>, OfferStoreError> {
        let rows = sqlx::query_as::<_, OfferRow>(
            r#"
            SELECT id, product_id, store_id, price, date_from, date_to, withdrawn
            FROM has_product
            WHERE product_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(product_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_product_id", e))?;

        Ok(rows.into_iter().map(OfferRecord::from).collect())
    }

    #[instrument(skip(self), fields(offer_id = %offer_id), err)]
    pub async fn load_by_id(&self, offer_id: OfferId) -> Result<Option<OfferRecord>, OfferStoreError> {
        let row = sqlx::query_as::<_, OfferRow>(
            r#"
            SELECT id, product_id, store_id, price, date_from, date_to, withdrawn
            FROM has_product
            WHERE id = $1
            "#,
        )
        .bind(offer_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        Ok(row.map(OfferRecord::from))
    }
}

impl OfferStore for PostgresOfferStore {
    fn save(&self, record: OfferRecord) -> Result<OfferRecord, OfferStoreError> {
        block_on_runtime(self.save_record(record))
    }

    fn find_by_product_id(&self, product_id: ProductId) -> Result<Vec<OfferRecord>, OfferStoreError> {
        block_on_runtime(self.load_by_product(product_id))
    }

    fn find_by_id(&self, offer_id: OfferId) -> Result<Option<OfferRecord>, OfferStoreError> {
        block_on_runtime(self.load_by_id(offer_id))
    }
}

/// Drive `fut` to completion from synchronous code running on a tokio worker.
fn block_on_runtime<F, T>(fut: F) -> Result<T, OfferStoreError>
where
    F: Future<Output = Result<T, OfferStoreError>>,
{
    let handle = Handle::try_current().map_err(|_| {
        OfferStoreError::Unavailable(
            "PostgresOfferStore requires a tokio runtime; call it from within one".to_string(),
        )
    })?;

    if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
        return Err(OfferStoreError::Unavailable(
            "PostgresOfferStore requires a multi-threaded tokio runtime".to_string(),
        ));
    }

    tokio::task::block_in_place(|| handle.block_on(fut))
}

/// Map SQLx errors to OfferStoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> OfferStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
            OfferStoreError::Backend(format!(
                "database error in {operation} (code {code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            OfferStoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            OfferStoreError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::Io(io_err) => {
            OfferStoreError::Unavailable(format!("io error in {operation}: {io_err}"))
        }
        other => OfferStoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct OfferRow {
    id: i64,
    product_id: i64,
    store_id: i64,
    price: f64,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    withdrawn: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for OfferRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(OfferRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            store_id: row.try_get("store_id")?,
            price: row.try_get("price")?,
            date_from: row.try_get("date_from")?,
            date_to: row.try_get("date_to")?,
            withdrawn: row.try_get("withdrawn")?,
        })
    }
}

impl From<OfferRow> for OfferRecord {
    fn from(row: OfferRow) -> Self {
        let mut record = OfferRecord::stored(
            OfferId::new(row.id),
            ProductId::new(row.product_id),
            StoreId::new(row.store_id),
            row.price,
        )
        .with_dates(row.date_from, row.date_to);
        record.withdrawn = row.withdrawn;
        record
    }
}
