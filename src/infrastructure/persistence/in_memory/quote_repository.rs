//! # In-Memory Quote Repository
//!
//! In-memory implementation of [`QuoteRepository`] for tests and local runs.
//!
//! All three tables live behind one `RwLock`, so every trait method is
//! atomic exactly like a single database transaction.

use crate::domain::entities::{Quote, QuoteItem, QuoteNote, SYSTEM_ACTOR};
use crate::domain::value_objects::{CustomerId, QuoteId, QuoteStatus, Timestamp};
use crate::infrastructure::persistence::traits::{
    PageRequest, QuoteFilter, QuoteRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    quotes: HashMap<QuoteId, Quote>,
    items: HashMap<QuoteId, Vec<QuoteItem>>,
    notes: HashMap<QuoteId, Vec<QuoteNote>>,
}

/// In-memory implementation of [`QuoteRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuoteRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryQuoteRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored quotes.
    pub async fn len(&self) -> usize {
        self.tables.read().await.quotes.len()
    }

    /// Returns true if no quotes are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes everything.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.quotes.clear();
        tables.items.clear();
        tables.notes.clear();
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn insert(&self, quote: &Quote, items: &[QuoteItem]) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if tables.quotes.contains_key(&quote.id()) {
            return Err(RepositoryError::duplicate("Quote", quote.id().to_string()));
        }
        tables.quotes.insert(quote.id(), quote.clone());
        tables.items.insert(quote.id(), items.to_vec());
        tables.notes.insert(quote.id(), Vec::new());
        Ok(())
    }

    async fn get(&self, id: &QuoteId) -> RepositoryResult<Option<Quote>> {
        Ok(self.tables.read().await.quotes.get(id).cloned())
    }

    async fn get_many(&self, ids: &[QuoteId]) -> RepositoryResult<Vec<Quote>> {
        let tables = self.tables.read().await;
        let unique: HashSet<&QuoteId> = ids.iter().collect();
        Ok(unique
            .into_iter()
            .filter_map(|id| tables.quotes.get(id).cloned())
            .collect())
    }

    async fn get_items(&self, id: &QuoteId) -> RepositoryResult<Vec<QuoteItem>> {
        Ok(self
            .tables
            .read()
            .await
            .items
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_notes(&self, id: &QuoteId) -> RepositoryResult<Vec<QuoteNote>> {
        let mut notes = self
            .tables
            .read()
            .await
            .notes
            .get(id)
            .cloned()
            .unwrap_or_default();
        notes.sort_by_key(QuoteNote::created_at);
        Ok(notes)
    }

    async fn find(
        &self,
        filter: &QuoteFilter,
        page: PageRequest,
    ) -> RepositoryResult<(Vec<Quote>, u64)> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Quote> = tables
            .quotes
            .values()
            .filter(|quote| filter.matches(quote))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let quotes = matching
            .into_iter()
            .skip(offset)
            .take(page.per_page() as usize)
            .cloned()
            .collect();
        Ok((quotes, total))
    }

    async fn save_with_items(&self, quote: &Quote, items: &[QuoteItem]) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.quotes.get_mut(&quote.id()) else {
            return Err(RepositoryError::not_found("Quote", quote.id().to_string()));
        };
        *stored = quote.clone();
        tables.items.insert(quote.id(), items.to_vec());
        Ok(())
    }

    async fn record_transition(&self, quote: &Quote, note: &QuoteNote) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.quotes.get_mut(&quote.id()) else {
            return Err(RepositoryError::not_found("Quote", quote.id().to_string()));
        };
        *stored = quote.clone();
        tables
            .notes
            .entry(quote.id())
            .or_default()
            .push(note.clone());
        Ok(())
    }

    async fn find_expiration_candidates(&self, now: Timestamp) -> RepositoryResult<Vec<QuoteId>> {
        let tables = self.tables.read().await;
        let mut candidates: Vec<&Quote> = tables
            .quotes
            .values()
            .filter(|quote| {
                quote.is_expired_at(now)
                    && quote.status() != QuoteStatus::Cancelled
                    && quote.status().is_expirable()
            })
            .collect();
        candidates.sort_by_key(|quote| (quote.expiration_date(), quote.id()));
        Ok(candidates.into_iter().map(Quote::id).collect())
    }

    async fn expire_batch(&self, ids: &[QuoteId], now: Timestamp) -> RepositoryResult<Vec<QuoteId>> {
        let mut tables = self.tables.write().await;
        let mut expired = Vec::new();

        for id in ids {
            let Some(quote) = tables.quotes.get_mut(id) else {
                continue;
            };
            if !quote.status().is_expirable() || !quote.is_expired_at(now) {
                continue;
            }
            if quote
                .transition_to(QuoteStatus::Expired, Some(SYSTEM_ACTOR), now)
                .is_err()
            {
                continue;
            }
            expired.push(*id);
        }

        for id in &expired {
            tables
                .notes
                .entry(*id)
                .or_default()
                .push(QuoteNote::system_expiration(*id, now));
        }

        Ok(expired)
    }

    async fn delete_drafts(
        &self,
        customer_id: &CustomerId,
        ids: &[QuoteId],
    ) -> RepositoryResult<u64> {
        let mut tables = self.tables.write().await;
        let unique: HashSet<QuoteId> = ids.iter().copied().collect();

        let deletable = unique
            .iter()
            .filter(|id| {
                tables.quotes.get(id).is_some_and(|quote| {
                    quote.is_owned_by(customer_id) && quote.status() == QuoteStatus::Draft
                })
            })
            .count();
        if deletable != unique.len() {
            return Err(RepositoryError::conflict(format!(
                "only {deletable} of {} quotes are drafts owned by {customer_id}",
                unique.len()
            )));
        }

        for id in &unique {
            tables.quotes.remove(id);
            tables.items.remove(id);
            tables.notes.remove(id);
        }
        Ok(unique.len() as u64)
    }
}
