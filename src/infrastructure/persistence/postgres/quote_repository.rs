//! # PostgreSQL Quote Repository
//!
//! PostgreSQL implementation of [`QuoteRepository`] using sqlx.
//!
//! Multi-row writes run in a single transaction. Items and notes are
//! removed with their quote through `ON DELETE CASCADE`.

use crate::domain::entities::{Quote, QuoteItem, QuoteNote, QuoteParts, SYSTEM_ACTOR};
use crate::domain::value_objects::{
    CompanyLocationId, CurrencyCode, CustomerId, NoteType, ParseQuoteStatusError, ProductId,
    QuoteId, QuoteItemId, QuoteNoteId, QuoteStatus, Timestamp, VariantId,
};
use crate::infrastructure::persistence::traits::{
    PageRequest, QuoteFilter, QuoteRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use crate::config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashSet;
use uuid::Uuid;

const QUOTE_COLUMNS: &str = "id, store_name, status, customer_id, company_location_id, \
     currency_code, po_number, subtotal, expiration_date, platform_order_id, \
     created_at, updated_at, created_by, updated_by, action_by";

/// PostgreSQL implementation of [`QuoteRepository`].
///
/// # Examples
///
/// ```ignore
/// use sqlx::PgPool;
/// use b2b_quotes::infrastructure::persistence::postgres::PostgresQuoteRepository;
///
/// let pool = PgPool::connect("postgres://...").await?;
/// let repo = PostgresQuoteRepository::new(pool);
/// repo.migrate().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresQuoteRepository {
    pool: PgPool,
}

impl PostgresQuoteRepository {
    /// Creates a new PostgreSQL quote repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from configuration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if the database is unreachable.
    pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if a migration fails.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))
    }

    async fn begin(&self) -> RepositoryResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))
    }
}

async fn commit(tx: Transaction<'_, Postgres>) -> RepositoryResult<()> {
    tx.commit()
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    items: &[QuoteItem],
) -> RepositoryResult<()> {
    for (position, item) in items.iter().enumerate() {
        let position =
            i32::try_from(position).map_err(|e| RepositoryError::internal(e.to_string()))?;
        let quantity = i32::try_from(item.quantity())
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO quote_items (
                id, quote_id, position, product_id, variant_id,
                quantity, original_price, offer_price, description
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.id().get())
        .bind(item.quote_id().get())
        .bind(position)
        .bind(item.product_id().as_str())
        .bind(item.variant_id().as_str())
        .bind(quantity)
        .bind(item.original_price())
        .bind(item.offer_price())
        .bind(item.description())
        .execute(&mut **tx)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;
    }
    Ok(())
}

async fn update_header(tx: &mut Transaction<'_, Postgres>, quote: &Quote) -> RepositoryResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE quotes SET
            status = $2, po_number = $3, subtotal = $4, expiration_date = $5,
            platform_order_id = $6, updated_at = $7, updated_by = $8, action_by = $9
        WHERE id = $1
        "#,
    )
    .bind(quote.id().get())
    .bind(quote.status().as_str())
    .bind(quote.po_number())
    .bind(quote.subtotal())
    .bind(*quote.expiration_date().as_datetime())
    .bind(quote.platform_order_id())
    .bind(*quote.updated_at().as_datetime())
    .bind(quote.updated_by())
    .bind(quote.action_by())
    .execute(&mut **tx)
    .await
    .map_err(|e| RepositoryError::query(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::not_found("Quote", quote.id().to_string()));
    }
    Ok(())
}

async fn insert_note(tx: &mut Transaction<'_, Postgres>, note: &QuoteNote) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO quote_notes (id, quote_id, note_type, note_content, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(note.id().get())
    .bind(note.quote_id().get())
    .bind(note.note_type().as_str())
    .bind(note.note_content())
    .bind(note.created_by())
    .bind(*note.created_at().as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| RepositoryError::query(e.to_string()))?;
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl QuoteRepository for PostgresQuoteRepository {
    async fn insert(&self, quote: &Quote, items: &[QuoteItem]) -> RepositoryResult<()> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, store_name, status, customer_id, company_location_id,
                currency_code, po_number, subtotal, expiration_date, platform_order_id,
                created_at, updated_at, created_by, updated_by, action_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(quote.id().get())
        .bind(quote.store_name())
        .bind(quote.status().as_str())
        .bind(quote.customer_id().as_str())
        .bind(quote.company_location_id().as_str())
        .bind(quote.currency_code().as_str())
        .bind(quote.po_number())
        .bind(quote.subtotal())
        .bind(*quote.expiration_date().as_datetime())
        .bind(quote.platform_order_id())
        .bind(*quote.created_at().as_datetime())
        .bind(*quote.updated_at().as_datetime())
        .bind(quote.created_by())
        .bind(quote.updated_by())
        .bind(quote.action_by())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::duplicate("Quote", quote.id().to_string())
            } else {
                RepositoryError::query(e.to_string())
            }
        })?;

        insert_items(&mut tx, items).await?;
        commit(tx).await
    }

    async fn get(&self, id: &QuoteId) -> RepositoryResult<Option<Quote>> {
        let row: Option<QuoteRow> =
            sqlx::query_as(&format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::query(e.to_string()))?;

        row.map(QuoteRow::try_into_quote).transpose()
    }

    async fn get_many(&self, ids: &[QuoteId]) -> RepositoryResult<Vec<Quote>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(QuoteId::get).collect();

        let rows: Vec<QuoteRow> = sqlx::query_as(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        rows.into_iter().map(QuoteRow::try_into_quote).collect()
    }

    async fn get_items(&self, id: &QuoteId) -> RepositoryResult<Vec<QuoteItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, quote_id, product_id, variant_id, quantity,
                   original_price, offer_price, description
            FROM quote_items
            WHERE quote_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        rows.into_iter().map(ItemRow::try_into_item).collect()
    }

    async fn get_notes(&self, id: &QuoteId) -> RepositoryResult<Vec<QuoteNote>> {
        let rows: Vec<NoteRow> = sqlx::query_as(
            r#"
            SELECT id, quote_id, note_type, note_content, created_by, created_at
            FROM quote_notes
            WHERE quote_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        rows.into_iter().map(NoteRow::try_into_note).collect()
    }

    async fn find(
        &self,
        filter: &QuoteFilter,
        page: PageRequest,
    ) -> RepositoryResult<(Vec<Quote>, u64)> {
        const WHERE: &str = "WHERE ($1::text IS NULL OR customer_id = $1) \
             AND ($2::text IS NULL OR company_location_id = $2) \
             AND ($3::text IS NULL OR store_name = $3) \
             AND ($4::text IS NULL OR status = $4)";

        let customer = filter.customer_id.as_ref().map(CustomerId::as_str);
        let location = filter
            .company_location_id
            .as_ref()
            .map(CompanyLocationId::as_str);
        let store = filter.store_name.as_deref();
        let status = filter.status.map(|s| s.as_str());

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM quotes {WHERE}"))
            .bind(customer)
            .bind(location)
            .bind(store)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;

        let offset =
            i64::try_from(page.offset()).map_err(|e| RepositoryError::internal(e.to_string()))?;
        let rows: Vec<QuoteRow> = sqlx::query_as(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes {WHERE} \
             ORDER BY created_at DESC, id DESC LIMIT $5 OFFSET $6"
        ))
        .bind(customer)
        .bind(location)
        .bind(store)
        .bind(status)
        .bind(i64::from(page.per_page()))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        let quotes = rows
            .into_iter()
            .map(QuoteRow::try_into_quote)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok((quotes, total.max(0) as u64))
    }

    async fn save_with_items(&self, quote: &Quote, items: &[QuoteItem]) -> RepositoryResult<()> {
        let mut tx = self.begin().await?;
        update_header(&mut tx, quote).await?;

        sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
            .bind(quote.id().get())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;

        insert_items(&mut tx, items).await?;
        commit(tx).await
    }

    async fn record_transition(&self, quote: &Quote, note: &QuoteNote) -> RepositoryResult<()> {
        let mut tx = self.begin().await?;
        update_header(&mut tx, quote).await?;
        insert_note(&mut tx, note).await?;
        commit(tx).await
    }

    async fn find_expiration_candidates(&self, now: Timestamp) -> RepositoryResult<Vec<QuoteId>> {
        let expirable: Vec<&str> = QuoteStatus::EXPIRABLE.iter().map(|s| s.as_str()).collect();

        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM quotes
            WHERE expiration_date < $1
              AND status = ANY($2)
              AND status <> $3
            ORDER BY expiration_date ASC, id ASC
            "#,
        )
        .bind(*now.as_datetime())
        .bind(&expirable)
        .bind(QuoteStatus::Cancelled.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| QuoteId::new(id)).collect())
    }

    async fn expire_batch(&self, ids: &[QuoteId], now: Timestamp) -> RepositoryResult<Vec<QuoteId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(QuoteId::get).collect();
        let expirable: Vec<&str> = QuoteStatus::EXPIRABLE.iter().map(|s| s.as_str()).collect();

        let mut tx = self.begin().await?;

        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE quotes SET
                status = $3, updated_at = $4, updated_by = $5, action_by = $5
            WHERE id = ANY($1) AND status = ANY($2) AND expiration_date < $4
            RETURNING id
            "#,
        )
        .bind(&uuids)
        .bind(&expirable)
        .bind(QuoteStatus::Expired.as_str())
        .bind(*now.as_datetime())
        .bind(SYSTEM_ACTOR)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        let expired: Vec<QuoteId> = rows.into_iter().map(|(id,)| QuoteId::new(id)).collect();
        for id in &expired {
            insert_note(&mut tx, &QuoteNote::system_expiration(*id, now)).await?;
        }

        commit(tx).await?;
        Ok(expired)
    }

    async fn delete_drafts(
        &self,
        customer_id: &CustomerId,
        ids: &[QuoteId],
    ) -> RepositoryResult<u64> {
        let unique: HashSet<Uuid> = ids.iter().map(QuoteId::get).collect();
        if unique.is_empty() {
            return Ok(0);
        }
        let uuids: Vec<Uuid> = unique.into_iter().collect();

        let mut tx = self.begin().await?;
        let result = sqlx::query(
            "DELETE FROM quotes WHERE id = ANY($1) AND customer_id = $2 AND status = $3",
        )
        .bind(&uuids)
        .bind(customer_id.as_str())
        .bind(QuoteStatus::Draft.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        let deleted = result.rows_affected();
        if deleted != uuids.len() as u64 {
            tx.rollback()
                .await
                .map_err(|e| RepositoryError::query(e.to_string()))?;
            return Err(RepositoryError::conflict(format!(
                "only {deleted} of {} quotes are drafts owned by {customer_id}",
                uuids.len()
            )));
        }

        commit(tx).await?;
        Ok(deleted)
    }
}

/// Row type for quote queries.
#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: Uuid,
    store_name: String,
    status: String,
    customer_id: String,
    company_location_id: String,
    currency_code: String,
    po_number: Option<String>,
    subtotal: Decimal,
    expiration_date: DateTime<Utc>,
    platform_order_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: Option<String>,
    updated_by: Option<String>,
    action_by: Option<String>,
}

impl QuoteRow {
    fn try_into_quote(self) -> RepositoryResult<Quote> {
        let status: QuoteStatus = self
            .status
            .parse()
            .map_err(|e: ParseQuoteStatusError| RepositoryError::serialization(e.to_string()))?;
        let currency_code = CurrencyCode::parse(self.currency_code.trim())
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;

        Ok(Quote::from_parts(QuoteParts {
            id: QuoteId::new(self.id),
            store_name: self.store_name,
            status,
            customer_id: CustomerId::new(self.customer_id),
            company_location_id: CompanyLocationId::new(self.company_location_id),
            currency_code,
            po_number: self.po_number,
            subtotal: self.subtotal,
            expiration_date: self.expiration_date.into(),
            platform_order_id: self.platform_order_id,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            created_by: self.created_by,
            updated_by: self.updated_by,
            action_by: self.action_by,
        }))
    }
}

/// Row type for item queries.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    quote_id: Uuid,
    product_id: String,
    variant_id: String,
    quantity: i32,
    original_price: Decimal,
    offer_price: Decimal,
    description: Option<String>,
}

impl ItemRow {
    fn try_into_item(self) -> RepositoryResult<QuoteItem> {
        let quantity = u32::try_from(self.quantity)
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;

        Ok(QuoteItem::from_parts(
            QuoteItemId::new(self.id),
            QuoteId::new(self.quote_id),
            ProductId::new(self.product_id),
            VariantId::new(self.variant_id),
            quantity,
            self.original_price,
            self.offer_price,
            self.description,
        ))
    }
}

/// Row type for note queries.
#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    quote_id: Uuid,
    note_type: String,
    note_content: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl NoteRow {
    fn try_into_note(self) -> RepositoryResult<QuoteNote> {
        let note_type: NoteType = self
            .note_type
            .parse()
            .map_err(RepositoryError::serialization)?;

        Ok(QuoteNote::from_parts(
            QuoteNoteId::new(self.id),
            QuoteId::new(self.quote_id),
            note_type,
            self.note_content,
            self.created_by,
            self.created_at.into(),
        ))
    }
}
