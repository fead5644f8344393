//! Store facade consumed by command handlers.
//!
//! # Responsibility
//! - Compose the book, the active view filters and the undo history.
//! - Validate inputs and assign delivery ids before mutating.
//! - Run client edit/delete together with their delivery cascades.
//!
//! # Invariants
//! - Every method either succeeds or leaves book, filters and history as they
//!   were. A failing `record` also leaves history as it was.
//! - Deliveries hold the stored value of their client and keep their id.
//! - Delivery ids come from a high-water mark that only grows, so an id is
//!   never handed out twice in one session, even after delete or undo.
//!
//! # Checkpoint contract
//! - Callers make an operation undoable by calling `checkpoint(label)` (or
//!   `record`) *before* mutating. One checkpoint covers a whole cascade.
//! - Read-only calls (finds, views, filter reads) must never checkpoint.
//! - `set_*_filter` does not checkpoint either; a command that wants filter
//!   changes undoable checkpoints first like any other mutation.

use crate::model::client::Client;
use crate::model::delivery::{Cost, Delivery, DeliveryId, DeliveryStatus};
use crate::model::error::{EntityKind, ModelError, ModelResult};
use crate::model::filter::{filtered_view, ClientFilter, DeliveryFilter, ViewFilters};
use crate::model::food_book::{FoodBook, FoodBookSnapshot};
use crate::model::history::UndoHistory;
use crate::model::tag::Tag;
use chrono::NaiveDateTime;
use std::num::NonZeroUsize;

/// Input for creating a delivery; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDelivery {
    /// Exact name of an existing client.
    pub client_name: String,
    pub scheduled_at: NaiveDateTime,
    pub remarks: String,
    pub cost: Cost,
    pub tag: Option<Tag>,
}

/// What `delete_client` removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedClient {
    pub client: Client,
    pub deliveries: Vec<Delivery>,
}

/// In-process store facade.
#[derive(Debug, Clone, Default)]
pub struct ModelManager {
    food_book: FoodBook,
    filters: ViewFilters,
    history: UndoHistory,
    delivery_id_high_water: DeliveryId,
}

impl ModelManager {
    /// Empty store with unbounded undo history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store keeping at most `limit` checkpoints.
    pub fn with_history_limit(limit: Option<NonZeroUsize>) -> Self {
        Self {
            history: UndoHistory::with_limit(limit),
            ..Self::default()
        }
    }

    /// Store seeded from `snapshot`.
    pub fn from_snapshot(
        snapshot: &FoodBookSnapshot,
        history_limit: Option<NonZeroUsize>,
    ) -> ModelResult<Self> {
        let mut manager = Self::with_history_limit(history_limit);
        manager.reset_data(snapshot)?;
        Ok(manager)
    }

    pub fn food_book(&self) -> &FoodBook {
        &self.food_book
    }

    /// Detached copy for the persistence layer.
    pub fn snapshot(&self) -> FoodBookSnapshot {
        self.food_book.snapshot()
    }

    /// Replaces the whole book. Does not checkpoint or clear history.
    pub fn reset_data(&mut self, snapshot: &FoodBookSnapshot) -> ModelResult<()> {
        self.food_book.reset_data(snapshot)?;
        self.delivery_id_high_water = self
            .delivery_id_high_water
            .max(self.food_book.max_delivery_id());
        Ok(())
    }

    pub fn has_client(&self, client: &Client) -> bool {
        self.food_book.has_client(client)
    }

    pub fn find_client(&self, name: &str) -> Option<&Client> {
        self.food_book.find_client(name)
    }

    pub fn add_client(&mut self, client: Client) -> ModelResult<()> {
        client.validate()?;
        self.food_book.add_client(client)
    }

    /// Replaces `target` with `edited` and refreshes every delivery made for
    /// `target`. Returns the number of deliveries refreshed.
    pub fn edit_client(&mut self, target: &Client, edited: Client) -> ModelResult<usize> {
        edited.validate()?;
        self.food_book.edit_client_cascade(target, edited)
    }

    /// Removes `client` together with its deliveries.
    pub fn delete_client(&mut self, client: &Client) -> ModelResult<DeletedClient> {
        let (client, deliveries) = self.food_book.remove_client_cascade(client)?;
        Ok(DeletedClient { client, deliveries })
    }

    pub fn has_delivery(&self, delivery: &Delivery) -> bool {
        self.food_book.has_delivery(delivery)
    }

    pub fn find_delivery(&self, id: DeliveryId) -> Option<&Delivery> {
        self.food_book.find_delivery(id)
    }

    /// Id the next `add_delivery` will assign.
    ///
    /// # Errors
    /// - `DeliveryIdsExhausted` once `DeliveryId::MAX` has been used.
    pub fn next_delivery_id(&self) -> ModelResult<DeliveryId> {
        self.delivery_id_high_water
            .max(self.food_book.max_delivery_id())
            .checked_add(1)
            .ok_or(ModelError::DeliveryIdsExhausted)
    }

    /// Creates an undelivered delivery for an existing client and returns
    /// its id.
    pub fn add_delivery(&mut self, request: NewDelivery) -> ModelResult<DeliveryId> {
        let client = self
            .food_book
            .find_client(&request.client_name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownClientReference {
                client_name: request.client_name.clone(),
            })?;

        let id = self.next_delivery_id()?;
        let delivery = Delivery::new(
            id,
            client,
            request.scheduled_at,
            request.remarks,
            request.cost,
        )
        .with_tag(request.tag);
        delivery.validate()?;

        self.food_book.add_delivery(delivery)?;
        self.delivery_id_high_water = id;
        Ok(id)
    }

    /// Replaces `target` with `edited`. The id must stay the same and the
    /// client is resolved by name to the stored client value.
    pub fn edit_delivery(&mut self, target: &Delivery, edited: Delivery) -> ModelResult<()> {
        if edited.id != target.id {
            return Err(ModelError::DeliveryIdChanged {
                target: target.id,
                edited: edited.id,
            });
        }
        let edited = self.food_book.link_client(edited)?;
        edited.validate()?;
        self.food_book.set_delivery(target, edited)
    }

    pub fn delete_delivery(&mut self, delivery: &Delivery) -> ModelResult<Delivery> {
        self.food_book.remove_delivery(delivery)
    }

    /// Sets status to delivered; returns the updated delivery.
    pub fn mark_delivered(&mut self, id: DeliveryId) -> ModelResult<Delivery> {
        self.set_delivery_status(id, DeliveryStatus::Delivered)
    }

    /// Sets status to undelivered; returns the updated delivery.
    pub fn unmark_delivered(&mut self, id: DeliveryId) -> ModelResult<Delivery> {
        self.set_delivery_status(id, DeliveryStatus::Undelivered)
    }

    fn set_delivery_status(
        &mut self,
        id: DeliveryId,
        status: DeliveryStatus,
    ) -> ModelResult<Delivery> {
        let target = self
            .food_book
            .find_delivery(id)
            .cloned()
            .ok_or_else(|| ModelError::not_found(EntityKind::Delivery, id))?;
        let updated = target.clone().with_status(status);
        self.food_book.set_delivery(&target, updated.clone())?;
        Ok(updated)
    }

    pub fn client_filter(&self) -> &ClientFilter {
        &self.filters.client
    }

    pub fn delivery_filter(&self) -> &DeliveryFilter {
        &self.filters.delivery
    }

    pub fn view_filters(&self) -> &ViewFilters {
        &self.filters
    }

    pub fn set_client_filter(&mut self, filter: ClientFilter) {
        self.filters.client = filter;
    }

    pub fn set_delivery_filter(&mut self, filter: DeliveryFilter) {
        self.filters.delivery = filter;
    }

    /// Clients visible under the active client filter, recomputed per call.
    pub fn current_client_view(&self) -> Vec<&Client> {
        filtered_view(self.food_book.clients(), &self.filters.client)
    }

    /// Deliveries visible under the active delivery filter, recomputed per call.
    pub fn current_delivery_view(&self) -> Vec<&Delivery> {
        filtered_view(self.food_book.deliveries(), &self.filters.delivery)
    }

    /// Records current content and filters under `label`.
    pub fn checkpoint(&mut self, label: impl Into<String>) {
        self.history
            .checkpoint(label, self.food_book.snapshot(), self.filters.clone());
    }

    /// Checkpoints, then runs `operation`. On failure the checkpoint is
    /// dropped again and older checkpoints are untouched; the history bound
    /// is applied only once `operation` succeeds.
    pub fn record<T>(
        &mut self,
        label: impl Into<String>,
        operation: impl FnOnce(&mut Self) -> ModelResult<T>,
    ) -> ModelResult<T> {
        self.history
            .push_unbounded(label, self.food_book.snapshot(), self.filters.clone());
        let result = operation(self);
        if result.is_ok() {
            self.history.enforce_limit();
        } else {
            self.history.discard_latest();
        }
        result
    }

    /// Restores the most recent checkpoint and returns its label.
    pub fn undo(&mut self) -> ModelResult<String> {
        let checkpoint = self.history.undo()?;
        // A checkpoint that fails to restore goes back on the stack.
        if let Err(err) = self.food_book.reset_data(&checkpoint.data) {
            self.history
                .checkpoint(checkpoint.label, checkpoint.data, checkpoint.filters);
            return Err(err);
        }
        self.filters = checkpoint.filters;
        Ok(checkpoint.label)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }
}
