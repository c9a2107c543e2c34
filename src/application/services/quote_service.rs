//! # Quote Service
//!
//! Orchestrates the quote use cases: CRUD, status transitions, conversion
//! into a platform order and the expiration scan.
//!
//! Every method follows the same shape: load, check the domain rule, call
//! the platform if needed, then persist through a single repository call.
//! No optimistic concurrency token is used; two concurrent actions on the
//! same quote race and the last write wins.
//!
//! # Examples
//!
//! ```ignore
//! use b2b_quotes::application::services::QuoteService;
//!
//! let service = QuoteService::new(repository, platform);
//! let quote = service.approve(&quote_id, "merchant@acme.test", None).await?;
//! let outcome = service.convert_to_order(&quote_id, "buyer@acme.test").await?;
//! ```

use crate::application::dto::{
    ConversionOutcome, CreateQuote, ExpirationReport, Page, QuoteDetails, UpdateQuote,
};
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::order_payload::{BuyerContext, build_draft_order, build_order};
use crate::domain::entities::{NewQuote, NewQuoteItem, Quote, QuoteItem, QuoteNote, subtotal};
use crate::domain::errors::DomainResult;
use crate::domain::value_objects::{CurrencyCode, CustomerId, NoteType, QuoteId, QuoteStatus, Timestamp};
use crate::infrastructure::persistence::{PageRequest, QuoteFilter, QuoteRepository};
use crate::infrastructure::platform::{PlatformClient, PlatformError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Number of quotes expired per repository call.
pub const EXPIRATION_BATCH_SIZE: usize = 100;

/// Tunables for [`QuoteService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteServiceConfig {
    /// Quotes expired per repository call.
    pub expiration_batch_size: usize,
}

impl Default for QuoteServiceConfig {
    fn default() -> Self {
        Self {
            expiration_batch_size: EXPIRATION_BATCH_SIZE,
        }
    }
}

/// Quote use cases.
#[derive(Debug, Clone)]
pub struct QuoteService {
    repository: Arc<dyn QuoteRepository>,
    platform: Arc<dyn PlatformClient>,
    config: QuoteServiceConfig,
}

impl QuoteService {
    /// Creates a service with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<dyn QuoteRepository>, platform: Arc<dyn PlatformClient>) -> Self {
        Self::with_config(repository, platform, QuoteServiceConfig::default())
    }

    /// Creates a service with an explicit configuration.
    #[must_use]
    pub fn with_config(
        repository: Arc<dyn QuoteRepository>,
        platform: Arc<dyn PlatformClient>,
        config: QuoteServiceConfig,
    ) -> Self {
        Self {
            repository,
            platform,
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &QuoteServiceConfig {
        &self.config
    }

    /// Creates a `Draft` quote, optionally submitting it right away.
    ///
    /// # Errors
    ///
    /// - `Validation` if there are no items or a field is invalid
    /// - `Repository` if the insert fails
    #[instrument(skip_all, fields(store = %input.store_name, customer_id = %input.customer_id))]
    pub async fn create_quote(&self, input: CreateQuote) -> ApplicationResult<QuoteDetails> {
        if input.items.is_empty() {
            return Err(ApplicationError::validation("a quote needs at least one item"));
        }
        let currency_code = CurrencyCode::parse(&input.currency_code)?;
        let actor = input.created_by.clone();
        let now = Timestamp::now();

        let mut quote = Quote::new(
            NewQuote {
                store_name: input.store_name,
                customer_id: input.customer_id,
                company_location_id: input.company_location_id,
                currency_code,
                po_number: input.po_number,
                expiration_date: input.expiration_date,
                created_by: input.created_by,
            },
            now,
        )?;
        let items = build_items(quote.id(), input.items)?;
        quote.set_subtotal(subtotal(&items)?, actor.as_deref(), now);

        self.repository.insert(&quote, &items).await?;
        info!(quote_id = %quote.id(), subtotal = %quote.subtotal(), "quote created");

        let mut notes = Vec::new();
        if input.submit {
            let actor = actor.unwrap_or_else(|| quote.customer_id().to_string());
            let note = self
                .apply_transition(&mut quote, QuoteStatus::Submitted, &actor, None)
                .await?;
            notes.push(note);
        }

        Ok(QuoteDetails {
            quote,
            items,
            notes,
        })
    }

    /// Returns a quote with its items and notes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the quote does not exist.
    pub async fn get_quote(&self, id: &QuoteId) -> ApplicationResult<QuoteDetails> {
        let quote = self.load(id).await?;
        let items = self.repository.get_items(id).await?;
        let notes = self.repository.get_notes(id).await?;
        Ok(QuoteDetails {
            quote,
            items,
            notes,
        })
    }

    /// Lists quotes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if the query fails.
    pub async fn list_quotes(
        &self,
        filter: &QuoteFilter,
        page: PageRequest,
    ) -> ApplicationResult<Page<Quote>> {
        let (quotes, total) = self.repository.find(filter, page).await?;
        debug!(total, page = page.page(), "quotes listed");
        Ok(Page::new(quotes, page, total))
    }

    /// Replaces the items of an editable quote and updates its terms.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the quote does not exist
    /// - `Domain(QuoteNotEditable)` once the quote left `Draft`/`Submitted`
    /// - `Validation` if there are no items or a field is invalid
    #[instrument(skip(self, input), fields(quote_id = %id))]
    pub async fn update_quote(
        &self,
        id: &QuoteId,
        input: UpdateQuote,
    ) -> ApplicationResult<QuoteDetails> {
        let mut quote = self.load(id).await?;
        quote.ensure_editable()?;
        if input.items.is_empty() {
            return Err(ApplicationError::validation("a quote needs at least one item"));
        }

        let now = Timestamp::now();
        let actor = input.updated_by.as_deref();
        let items = build_items(quote.id(), input.items)?;
        if input.po_number.is_some() {
            quote.set_po_number(input.po_number, actor, now)?;
        }
        if let Some(expiration_date) = input.expiration_date {
            quote.set_expiration_date(expiration_date, actor, now)?;
        }
        quote.set_subtotal(subtotal(&items)?, actor, now);

        self.repository.save_with_items(&quote, &items).await?;
        info!(status = %quote.status(), items = items.len(), "quote updated");

        let notes = self.repository.get_notes(id).await?;
        Ok(QuoteDetails {
            quote,
            items,
            notes,
        })
    }

    /// Moves a `Draft` quote to `Submitted`.
    ///
    /// # Errors
    ///
    /// Returns `Domain(InvalidStatusTransition)` unless the quote is `Draft`.
    pub async fn submit(
        &self,
        id: &QuoteId,
        actor: &str,
        note: Option<String>,
    ) -> ApplicationResult<Quote> {
        self.transition(id, QuoteStatus::Submitted, actor, note).await
    }

    /// Approves a `Submitted` quote.
    ///
    /// # Errors
    ///
    /// Returns `Domain(InvalidStatusTransition)` unless the quote is `Submitted`.
    pub async fn approve(
        &self,
        id: &QuoteId,
        actor: &str,
        note: Option<String>,
    ) -> ApplicationResult<Quote> {
        self.transition(id, QuoteStatus::Approved, actor, note).await
    }

    /// Declines a `Submitted` quote.
    ///
    /// # Errors
    ///
    /// Returns `Domain(InvalidStatusTransition)` unless the quote is `Submitted`.
    pub async fn reject(
        &self,
        id: &QuoteId,
        actor: &str,
        note: Option<String>,
    ) -> ApplicationResult<Quote> {
        self.transition(id, QuoteStatus::Declined, actor, note).await
    }

    /// Cancels a `Submitted` quote.
    ///
    /// # Errors
    ///
    /// Returns `Domain(InvalidStatusTransition)` unless the quote is `Submitted`.
    pub async fn cancel(
        &self,
        id: &QuoteId,
        actor: &str,
        note: Option<String>,
    ) -> ApplicationResult<Quote> {
        self.transition(id, QuoteStatus::Cancelled, actor, note).await
    }

    /// Converts an `Approved` quote into a platform draft order or order.
    ///
    /// The company location's `checkoutToDraft` flag picks the path. Platform
    /// mutations already issued are not undone if a later step fails.
    ///
    /// # Errors
    ///
    /// - `Domain(QuoteNotApproved)` before any platform call unless `Approved`
    /// - `DraftNotFound` if the platform returned no draft order
    /// - `OrderConversionFailed` if any platform call fails
    #[instrument(skip(self), fields(quote_id = %id))]
    pub async fn convert_to_order(
        &self,
        id: &QuoteId,
        actor: &str,
    ) -> ApplicationResult<ConversionOutcome> {
        let actor = require_actor(actor)?;
        let mut quote = self.load(id).await?;
        quote.ensure_convertible()?;

        let items = self.repository.get_items(id).await?;
        if items.is_empty() {
            return Err(ApplicationError::validation("quote has no items to order"));
        }

        let store = quote.store_name().to_string();
        let location = quote.company_location_id().clone();
        let failed = conversion_failed(*id);

        let checkout_to_draft = self
            .platform
            .checkout_to_draft(&store, &location)
            .await
            .map_err(&failed)?;
        info!(%store, checkout_to_draft, "converting quote");

        let (order, draft) = if checkout_to_draft {
            let (email, addresses, payment_terms) = futures::try_join!(
                self.platform.customer_email(&store, quote.customer_id()),
                self.platform.company_location_addresses(&store, &location),
                self.platform.payment_terms(&store, &location),
            )
            .map_err(&failed)?;

            let input = build_draft_order(
                &quote,
                &items,
                BuyerContext {
                    email,
                    addresses,
                    payment_terms,
                },
            );
            let draft = self
                .platform
                .create_draft_order(&store, &input)
                .await
                .map_err(&failed)?
                .ok_or_else(|| {
                    warn!(%store, "platform returned no draft order");
                    ApplicationError::draft_not_found(id.to_string())
                })?;
            (draft, true)
        } else {
            let input = build_order(&quote, &items);
            let order = self
                .platform
                .create_order(&store, &input)
                .await
                .map_err(&failed)?;
            (order, false)
        };

        let now = Timestamp::now();
        quote.mark_ordered(order.id.clone(), Some(actor), now)?;
        let kind = if draft { "draft order" } else { "order" };
        let note = QuoteNote::new(
            quote.id(),
            NoteType::Order,
            format!("Converted to {kind} {order}"),
            actor,
            now,
        );
        self.repository.record_transition(&quote, &note).await?;
        info!(platform_order_id = %order.id, draft, "quote converted");

        Ok(ConversionOutcome {
            quote,
            platform_order_id: order.id,
            platform_order_name: order.name,
            draft,
        })
    }

    /// Expires every quote whose expiration date is before `now`.
    ///
    /// Candidates are expired in batches of
    /// [`QuoteServiceConfig::expiration_batch_size`]. Only `Submitted` and
    /// `Approved` quotes change, so a second run finds nothing.
    ///
    /// # Errors
    ///
    /// Returns `Repository` if a query fails. Batches already written stay
    /// expired.
    #[instrument(skip(self))]
    pub async fn expire_quotes(&self, now: Timestamp) -> ApplicationResult<ExpirationReport> {
        let candidates = self.repository.find_expiration_candidates(now).await?;
        let mut report = ExpirationReport::default();
        if candidates.is_empty() {
            debug!("no quotes to expire");
            return Ok(report);
        }

        for batch in candidates.chunks(self.config.expiration_batch_size.max(1)) {
            let expired = self.repository.expire_batch(batch, now).await?;
            report.batches += 1;
            debug!(batch = report.batches, requested = batch.len(), expired = expired.len(), "batch expired");
            report.expired_ids.extend(expired);
        }

        info!(
            candidates = candidates.len(),
            expired = report.count(),
            batches = report.batches,
            "expiration scan finished"
        );
        Ok(report)
    }

    /// Deletes draft quotes of one customer. All or nothing.
    ///
    /// # Errors
    ///
    /// - `Validation` if `ids` is empty
    /// - `NotFound` if any quote does not exist
    /// - `Forbidden` if any quote belongs to another customer
    /// - `Conflict` if any quote is not `Draft`
    #[instrument(skip(self, ids), fields(customer_id = %customer_id, requested = ids.len()))]
    pub async fn bulk_delete_drafts(
        &self,
        customer_id: &CustomerId,
        ids: &[QuoteId],
    ) -> ApplicationResult<u64> {
        if ids.is_empty() {
            return Err(ApplicationError::validation("quoteIds must not be empty"));
        }
        if customer_id.is_blank() {
            return Err(ApplicationError::validation("customerId is required"));
        }

        let mut seen = HashSet::new();
        let unique: Vec<QuoteId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let quotes = self.repository.get_many(&unique).await?;
        let found: HashSet<QuoteId> = quotes.iter().map(Quote::id).collect();
        let missing: Vec<String> = unique
            .iter()
            .filter(|id| !found.contains(id))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ApplicationError::not_found("Quote", missing.join(",")));
        }

        if let Some(foreign) = quotes.iter().find(|q| !q.is_owned_by(customer_id)) {
            warn!(quote_id = %foreign.id(), "bulk delete of foreign quote refused");
            return Err(ApplicationError::forbidden(format!(
                "quote {} does not belong to customer {customer_id}",
                foreign.id()
            )));
        }

        if let Some(locked) = quotes.iter().find(|q| q.status() != QuoteStatus::Draft) {
            return Err(ApplicationError::conflict(format!(
                "quote {} is {}, only Draft quotes can be deleted",
                locked.id(),
                locked.status()
            )));
        }

        let deleted = self.repository.delete_drafts(customer_id, &unique).await?;
        info!(deleted, "draft quotes deleted");
        Ok(deleted)
    }

    async fn load(&self, id: &QuoteId) -> ApplicationResult<Quote> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Quote", id.to_string()))
    }

    #[instrument(skip(self, note), fields(quote_id = %id, to = %target))]
    async fn transition(
        &self,
        id: &QuoteId,
        target: QuoteStatus,
        actor: &str,
        note: Option<String>,
    ) -> ApplicationResult<Quote> {
        let actor = require_actor(actor)?;
        let mut quote = self.load(id).await?;
        self.apply_transition(&mut quote, target, actor, note).await?;
        Ok(quote)
    }

    async fn apply_transition(
        &self,
        quote: &mut Quote,
        target: QuoteStatus,
        actor: &str,
        note: Option<String>,
    ) -> ApplicationResult<QuoteNote> {
        let from = quote.status();
        let note_type = NoteType::for_status(target).ok_or_else(|| {
            ApplicationError::internal(format!("no note type for transition to {target}"))
        })?;

        let now = Timestamp::now();
        quote.transition_to(target, Some(actor), now).inspect_err(|e| {
            warn!(quote_id = %quote.id(), status = %from, error = %e, "transition refused");
        })?;

        let content = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_note(target).to_string());
        let note = QuoteNote::new(quote.id(), note_type, content, actor, now);

        self.repository.record_transition(quote, &note).await?;
        info!(quote_id = %quote.id(), from = %from, status = %target, "quote status changed");
        Ok(note)
    }
}

fn build_items(quote_id: QuoteId, items: Vec<NewQuoteItem>) -> DomainResult<Vec<QuoteItem>> {
    items
        .into_iter()
        .map(|item| QuoteItem::new(quote_id, item))
        .collect()
}

fn require_actor(actor: &str) -> ApplicationResult<&str> {
    let actor = actor.trim();
    if actor.is_empty() {
        Err(ApplicationError::validation("actionBy is required"))
    } else {
        Ok(actor)
    }
}

fn conversion_failed(id: QuoteId) -> impl Fn(PlatformError) -> ApplicationError {
    move |e| {
        warn!(quote_id = %id, kind = e.kind(), error = %e, "order conversion failed");
        ApplicationError::order_conversion_failed(id.to_string(), e.to_string())
    }
}

fn default_note(target: QuoteStatus) -> &'static str {
    match target {
        QuoteStatus::Submitted => "Quote submitted for review",
        QuoteStatus::Approved => "Quote approved",
        QuoteStatus::Declined => "Quote declined",
        QuoteStatus::Cancelled => "Quote cancelled",
        QuoteStatus::Expired => "Quote expired",
        QuoteStatus::Ordered => "Quote converted to order",
        QuoteStatus::Draft => "Quote reopened",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::value_objects::{CompanyLocationId, ProductId, VariantId};
    use crate::infrastructure::persistence::InMemoryQuoteRepository;
    use crate::infrastructure::platform::{
        DraftOrderInput, LocationAddresses, OrderInput, PaymentTermsTemplate, PlatformOrderRef,
        PlatformResult,
    };
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct MockPlatform {
        checkout_to_draft: bool,
        draft_missing: bool,
        fail_orders: bool,
        calls: AtomicUsize,
        drafts: Mutex<Vec<DraftOrderInput>>,
        orders: Mutex<Vec<OrderInput>>,
    }

    impl MockPlatform {
        fn call(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlatformClient for MockPlatform {
        async fn checkout_to_draft(
            &self,
            _store: &str,
            _location: &CompanyLocationId,
        ) -> PlatformResult<bool> {
            self.call();
            Ok(self.checkout_to_draft)
        }

        async fn customer_email(
            &self,
            _store: &str,
            _customer: &CustomerId,
        ) -> PlatformResult<Option<String>> {
            self.call();
            Ok(Some("buyer@acme.test".to_string()))
        }

        async fn company_location_addresses(
            &self,
            _store: &str,
            _location: &CompanyLocationId,
        ) -> PlatformResult<LocationAddresses> {
            self.call();
            Ok(LocationAddresses::default())
        }

        async fn payment_terms(
            &self,
            _store: &str,
            _location: &CompanyLocationId,
        ) -> PlatformResult<Option<PaymentTermsTemplate>> {
            self.call();
            Ok(None)
        }

        async fn create_draft_order(
            &self,
            _store: &str,
            input: &DraftOrderInput,
        ) -> PlatformResult<Option<PlatformOrderRef>> {
            self.call();
            self.drafts.lock().unwrap().push(input.clone());
            if self.draft_missing {
                return Ok(None);
            }
            Ok(Some(PlatformOrderRef {
                id: "gid://shopify/DraftOrder/1".to_string(),
                name: Some("#D1".to_string()),
            }))
        }

        async fn create_order(
            &self,
            _store: &str,
            input: &OrderInput,
        ) -> PlatformResult<PlatformOrderRef> {
            self.call();
            if self.fail_orders {
                return Err(PlatformError::timeout("orderCreate timed out"));
            }
            self.orders.lock().unwrap().push(input.clone());
            Ok(PlatformOrderRef {
                id: "gid://shopify/Order/1".to_string(),
                name: Some("#1001".to_string()),
            })
        }
    }

    fn service(platform: MockPlatform) -> (QuoteService, Arc<InMemoryQuoteRepository>, Arc<MockPlatform>) {
        let repo = Arc::new(InMemoryQuoteRepository::new());
        let platform = Arc::new(platform);
        let service = QuoteService::new(repo.clone(), platform.clone());
        (service, repo, platform)
    }

    fn customer() -> CustomerId {
        CustomerId::new("gid://shopify/Customer/1")
    }

    fn create_input(submit: bool) -> CreateQuote {
        CreateQuote {
            store_name: "acme.myshopify.com".to_string(),
            customer_id: customer(),
            company_location_id: CompanyLocationId::new("gid://shopify/CompanyLocation/2"),
            currency_code: "usd".to_string(),
            po_number: None,
            expiration_date: Timestamp::now().add_days(14),
            created_by: Some("buyer@acme.test".to_string()),
            items: vec![item(2, 1500), item(1, 250)],
            submit,
        }
    }

    fn item(quantity: u32, offer_cents: i64) -> NewQuoteItem {
        NewQuoteItem {
            product_id: ProductId::new("gid://shopify/Product/1"),
            variant_id: VariantId::new("gid://shopify/ProductVariant/1"),
            quantity,
            original_price: Decimal::new(2000, 2),
            offer_price: Decimal::new(offer_cents, 2),
            description: None,
        }
    }

    async fn approved_quote(service: &QuoteService) -> QuoteId {
        let created = service.create_quote(create_input(true)).await.unwrap();
        let id = created.quote.id();
        service.approve(&id, "merchant", None).await.unwrap();
        id
    }

    mod create {
        use super::*;

        #[tokio::test]
        async fn computes_subtotal() {
            let (service, _, _) = service(MockPlatform::default());
            let created = service.create_quote(create_input(false)).await.unwrap();
            assert_eq!(created.quote.status(), QuoteStatus::Draft);
            assert_eq!(created.quote.subtotal(), Decimal::new(3250, 2));
            assert_eq!(created.quote.currency_code().as_str(), "USD");
            assert_eq!(created.items.len(), 2);
            assert!(created.notes.is_empty());
        }

        #[tokio::test]
        async fn submit_flag_adds_submit_note() {
            let (service, _, _) = service(MockPlatform::default());
            let created = service.create_quote(create_input(true)).await.unwrap();
            assert_eq!(created.quote.status(), QuoteStatus::Submitted);
            assert_eq!(created.notes.len(), 1);
            assert_eq!(created.notes[0].note_type(), NoteType::Submit);
        }

        #[tokio::test]
        async fn requires_items() {
            let (service, repo, _) = service(MockPlatform::default());
            let mut input = create_input(false);
            input.items.clear();
            let err = service.create_quote(input).await.unwrap_err();
            assert!(err.is_validation());
            assert!(repo.is_empty().await);
        }

        #[tokio::test]
        async fn rejects_bad_currency() {
            let (service, _, _) = service(MockPlatform::default());
            let mut input = create_input(false);
            input.currency_code = "dollars".to_string();
            let err = service.create_quote(input).await.unwrap_err();
            assert_eq!(err.status_code(), 400);
        }

        #[tokio::test]
        async fn overflowing_price_is_rejected_not_panicking() {
            let (service, repo, _) = service(MockPlatform::default());
            let mut input = create_input(false);
            input.items = vec![NewQuoteItem {
                offer_price: Decimal::MAX,
                ..item(2, 100)
            }];

            let outcome = tokio::spawn(async move { service.create_quote(input).await }).await;
            let err = outcome.unwrap().unwrap_err();
            assert_eq!(err.status_code(), 400);
            assert!(matches!(
                err,
                ApplicationError::Domain(DomainError::InvalidPrice(_))
            ));
            assert!(repo.is_empty().await);
        }
    }

    mod transitions {
        use super::*;

        #[tokio::test]
        async fn approve_submitted_quote() {
            let (service, _, _) = service(MockPlatform::default());
            let id = service.create_quote(create_input(true)).await.unwrap().quote.id();

            let quote = service.approve(&id, "merchant", Some("ok".to_string())).await.unwrap();
            assert_eq!(quote.status(), QuoteStatus::Approved);
            assert_eq!(quote.action_by(), Some("merchant"));

            let details = service.get_quote(&id).await.unwrap();
            assert_eq!(details.notes.len(), 2);
            assert_eq!(details.notes[1].note_type(), NoteType::Approve);
            assert_eq!(details.notes[1].note_content(), "ok");
        }

        #[tokio::test]
        async fn declined_cannot_be_approved() {
            let (service, _, _) = service(MockPlatform::default());
            let id = service.create_quote(create_input(true)).await.unwrap().quote.id();
            service.reject(&id, "merchant", None).await.unwrap();

            let err = service.approve(&id, "merchant", None).await.unwrap_err();
            assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");
            assert!(err.to_string().contains("Declined"));
            assert!(err.to_string().contains("Approved"));

            let details = service.get_quote(&id).await.unwrap();
            assert_eq!(details.quote.status(), QuoteStatus::Declined);
            assert_eq!(details.notes.len(), 2);
        }

        #[tokio::test]
        async fn blank_actor_rejected() {
            let (service, _, _) = service(MockPlatform::default());
            let id = service.create_quote(create_input(true)).await.unwrap().quote.id();
            assert!(service.cancel(&id, "  ", None).await.unwrap_err().is_validation());
        }

        #[tokio::test]
        async fn unknown_quote_not_found() {
            let (service, _, _) = service(MockPlatform::default());
            let err = service.submit(&QuoteId::new_v4(), "buyer", None).await.unwrap_err();
            assert!(err.is_not_found());
        }
    }

    mod update {
        use super::*;

        #[tokio::test]
        async fn replaces_items_and_subtotal() {
            let (service, repo, _) = service(MockPlatform::default());
            let id = service.create_quote(create_input(false)).await.unwrap().quote.id();

            let updated = service
                .update_quote(
                    &id,
                    UpdateQuote {
                        items: vec![item(10, 100)],
                        po_number: Some("PO-9".to_string()),
                        expiration_date: None,
                        updated_by: Some("buyer".to_string()),
                    },
                )
                .await
                .unwrap();
            assert_eq!(updated.quote.subtotal(), Decimal::new(1000, 2));
            assert_eq!(updated.quote.po_number(), Some("PO-9"));
            assert_eq!(repo.get_items(&id).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn sub_cent_price_rejected_and_items_kept() {
            let (service, repo, _) = service(MockPlatform::default());
            let id = service.create_quote(create_input(false)).await.unwrap().quote.id();

            let err = service
                .update_quote(
                    &id,
                    UpdateQuote {
                        items: vec![NewQuoteItem {
                            offer_price: Decimal::new(5, 3),
                            ..item(1, 100)
                        }],
                        po_number: None,
                        expiration_date: None,
                        updated_by: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ApplicationError::Domain(DomainError::InvalidPrice(_))
            ));
            assert_eq!(repo.get_items(&id).await.unwrap().len(), 2);
            let stored = repo.get(&id).await.unwrap().unwrap();
            assert_eq!(stored.subtotal(), Decimal::new(3250, 2));
        }

        #[tokio::test]
        async fn approved_quote_is_locked() {
            let (service, _, _) = service(MockPlatform::default());
            let id = approved_quote(&service).await;
            let err = service
                .update_quote(
                    &id,
                    UpdateQuote {
                        items: vec![item(1, 100)],
                        po_number: None,
                        expiration_date: None,
                        updated_by: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ApplicationError::Domain(DomainError::QuoteNotEditable(QuoteStatus::Approved))
            ));
        }
    }

    mod conversion {
        use super::*;

        #[tokio::test]
        async fn non_approved_quote_never_calls_platform() {
            let (service, _, platform) = service(MockPlatform::default());
            let id = service.create_quote(create_input(true)).await.unwrap().quote.id();

            let err = service.convert_to_order(&id, "buyer").await.unwrap_err();
            assert_eq!(err.code(), "QUOTE_NOT_APPROVED");
            assert_eq!(platform.calls(), 0);
        }

        #[tokio::test]
        async fn direct_order_path() {
            let (service, repo, platform) = service(MockPlatform::default());
            let id = approved_quote(&service).await;

            let outcome = service.convert_to_order(&id, "buyer").await.unwrap();
            assert!(!outcome.draft);
            assert_eq!(outcome.platform_order_id, "gid://shopify/Order/1");
            assert_eq!(outcome.quote.status(), QuoteStatus::Ordered);
            assert_eq!(platform.calls(), 2);
            assert_eq!(platform.orders.lock().unwrap()[0].line_items.len(), 2);

            let stored = repo.get(&id).await.unwrap().unwrap();
            assert_eq!(stored.platform_order_id(), Some("gid://shopify/Order/1"));
            let notes = repo.get_notes(&id).await.unwrap();
            assert_eq!(notes.last().unwrap().note_type(), NoteType::Order);
        }

        #[tokio::test]
        async fn draft_order_path_fetches_buyer_details() {
            let (service, _, platform) = service(MockPlatform {
                checkout_to_draft: true,
                ..MockPlatform::default()
            });
            let id = approved_quote(&service).await;

            let outcome = service.convert_to_order(&id, "buyer").await.unwrap();
            assert!(outcome.draft);
            assert_eq!(outcome.platform_order_name.as_deref(), Some("#D1"));
            assert_eq!(platform.calls(), 5);
            let drafts = platform.drafts.lock().unwrap();
            assert_eq!(drafts[0].email.as_deref(), Some("buyer@acme.test"));
        }

        #[tokio::test]
        async fn missing_draft_leaves_quote_approved() {
            let (service, repo, _) = service(MockPlatform {
                checkout_to_draft: true,
                draft_missing: true,
                ..MockPlatform::default()
            });
            let id = approved_quote(&service).await;

            let err = service.convert_to_order(&id, "buyer").await.unwrap_err();
            assert_eq!(err.code(), "DRAFT_NOT_FOUND");
            let stored = repo.get(&id).await.unwrap().unwrap();
            assert_eq!(stored.status(), QuoteStatus::Approved);
        }

        #[tokio::test]
        async fn platform_failure_is_conversion_error() {
            let (service, repo, _) = service(MockPlatform {
                fail_orders: true,
                ..MockPlatform::default()
            });
            let id = approved_quote(&service).await;

            let err = service.convert_to_order(&id, "buyer").await.unwrap_err();
            assert_eq!(err.code(), "ORDER_CONVERSION_FAILED");
            assert!(err.to_string().contains("timed out"));
            assert_eq!(
                repo.get(&id).await.unwrap().unwrap().status(),
                QuoteStatus::Approved
            );
        }
    }

    mod expiration {
        use super::*;

        #[tokio::test]
        async fn expires_in_batches_and_is_idempotent() {
            let repo = Arc::new(InMemoryQuoteRepository::new());
            let service = QuoteService::with_config(
                repo.clone(),
                Arc::new(MockPlatform::default()),
                QuoteServiceConfig {
                    expiration_batch_size: 2,
                },
            );
            for _ in 0..5 {
                service.create_quote(create_input(true)).await.unwrap();
            }

            let later = Timestamp::now().add_days(30);
            let report = service.expire_quotes(later).await.unwrap();
            assert_eq!(report.count(), 5);
            assert_eq!(report.batches, 3);

            let again = service.expire_quotes(later).await.unwrap();
            assert_eq!(again.count(), 0);
            assert_eq!(again.batches, 0);
        }

        #[tokio::test]
        async fn nothing_expires_before_the_date() {
            let (service, _, _) = service(MockPlatform::default());
            service.create_quote(create_input(true)).await.unwrap();
            let report = service.expire_quotes(Timestamp::now()).await.unwrap();
            assert_eq!(report, ExpirationReport::default());
        }
    }

    mod bulk_delete {
        use super::*;

        #[tokio::test]
        async fn empty_list_rejected() {
            let (service, _, _) = service(MockPlatform::default());
            let err = service.bulk_delete_drafts(&customer(), &[]).await.unwrap_err();
            assert!(err.is_validation());
        }

        #[tokio::test]
        async fn submitted_quote_blocks_batch() {
            let (service, repo, _) = service(MockPlatform::default());
            let draft = service.create_quote(create_input(false)).await.unwrap().quote.id();
            let submitted = service.create_quote(create_input(true)).await.unwrap().quote.id();

            let err = service
                .bulk_delete_drafts(&customer(), &[draft, submitted])
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 409);
            assert_eq!(repo.len().await, 2);
        }

        #[tokio::test]
        async fn missing_quote_not_found() {
            let (service, _, _) = service(MockPlatform::default());
            let draft = service.create_quote(create_input(false)).await.unwrap().quote.id();
            let err = service
                .bulk_delete_drafts(&customer(), &[draft, QuoteId::new_v4()])
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn duplicates_collapse() {
            let (service, repo, _) = service(MockPlatform::default());
            let draft = service.create_quote(create_input(false)).await.unwrap().quote.id();
            let deleted = service
                .bulk_delete_drafts(&customer(), &[draft, draft])
                .await
                .unwrap();
            assert_eq!(deleted, 1);
            assert!(repo.is_empty().await);
        }
    }
}
