//! FoodBook aggregate: clients plus the deliveries made for them.
//!
//! # Responsibility
//! - Own both unique collections and the client -> delivery relationship.
//! - Provide whole-book snapshot/reset for persistence and undo.
//! - Provide the client rename/delete cascades as single calls.
//!
//! # Invariants
//! - Every delivery's client name resolves to a client in the book, and the
//!   delivery holds that client's stored value.
//! - A delivery keeps its id for life; edits cannot renumber it.
//! - Every public mutation validates first and mutates only on success, so a
//!   failed call leaves the book unchanged.

use crate::model::client::Client;
use crate::model::delivery::{Delivery, DeliveryId};
use crate::model::error::{ModelError, ModelResult};
use crate::model::unique_list::{ensure_unique, UniqueEntityList};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Plain, detached copy of a book's content.
///
/// Holds no references into a live `FoodBook`; mutating the book afterwards
/// never changes an existing snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodBookSnapshot {
    pub clients: Vec<Client>,
    pub deliveries: Vec<Delivery>,
}

impl FoodBookSnapshot {
    /// Highest delivery id present, or 0 for an empty delivery list.
    pub fn max_delivery_id(&self) -> DeliveryId {
        self.deliveries.iter().map(|d| d.id).max().unwrap_or(0)
    }
}

/// Aggregate root for the single-user store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoodBook {
    clients: UniqueEntityList<Client>,
    deliveries: UniqueEntityList<Delivery>,
}

impl FoodBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from a snapshot, checking all invariants.
    pub fn from_snapshot(snapshot: &FoodBookSnapshot) -> ModelResult<Self> {
        let mut book = Self::new();
        book.reset_data(snapshot)?;
        Ok(book)
    }

    /// Detached copy of the current content.
    pub fn snapshot(&self) -> FoodBookSnapshot {
        FoodBookSnapshot {
            clients: self.clients.to_vec(),
            deliveries: self.deliveries.to_vec(),
        }
    }

    /// Replaces both collections at once.
    ///
    /// Checks client uniqueness, then delivery uniqueness, then that every
    /// delivery id is at least 1 and its client name resolves. Each delivery
    /// is relinked to the snapshot's client value of that name. Nothing is
    /// applied unless all checks pass.
    pub fn reset_data(&mut self, snapshot: &FoodBookSnapshot) -> ModelResult<()> {
        ensure_unique(&snapshot.clients)?;
        ensure_unique(&snapshot.deliveries)?;
        let deliveries = snapshot
            .deliveries
            .iter()
            .map(|delivery| link_client(&snapshot.clients, delivery.clone()))
            .collect::<ModelResult<Vec<_>>>()?;

        self.clients.replace_all(snapshot.clients.clone())?;
        self.deliveries.replace_all(deliveries)?;
        Ok(())
    }

    pub fn clients(&self) -> &[Client] {
        self.clients.as_slice()
    }

    pub fn deliveries(&self) -> &[Delivery] {
        self.deliveries.as_slice()
    }

    pub fn has_client(&self, client: &Client) -> bool {
        self.clients.contains(client)
    }

    /// Exact, case-sensitive name lookup.
    pub fn find_client(&self, name: &str) -> Option<&Client> {
        self.clients.iter().find(|client| client.name == name)
    }

    pub fn add_client(&mut self, client: Client) -> ModelResult<()> {
        self.clients.add(client)
    }

    /// Replaces `target` with `edited` without touching deliveries.
    ///
    /// Callers normally want `edit_client_cascade`.
    pub fn set_client(&mut self, target: &Client, edited: Client) -> ModelResult<()> {
        self.clients.replace(target, edited)
    }

    /// Removes one client without touching deliveries.
    ///
    /// Callers normally want `remove_client_cascade`.
    pub fn remove_client(&mut self, client: &Client) -> ModelResult<Client> {
        self.clients.remove(client)
    }

    /// Replaces `target` with `edited` and re-points every dependent
    /// delivery at the new client value. Returns the number of deliveries
    /// updated.
    pub fn edit_client_cascade(&mut self, target: &Client, edited: Client) -> ModelResult<usize> {
        let dependents: Vec<Delivery> = self
            .deliveries
            .iter()
            .filter(|delivery| delivery.client.is_same_client(target))
            .cloned()
            .collect();

        self.clients.replace(target, edited.clone())?;
        for delivery in &dependents {
            let mut relinked = delivery.clone();
            relinked.client = edited.clone();
            // Same id, so this cannot collide.
            self.deliveries.replace(delivery, relinked)?;
        }
        Ok(dependents.len())
    }

    /// Removes `client` and every delivery made for it. Returns the removed
    /// client and deliveries.
    pub fn remove_client_cascade(
        &mut self,
        client: &Client,
    ) -> ModelResult<(Client, Vec<Delivery>)> {
        let removed_client = self.clients.remove(client)?;
        let removed_deliveries = self
            .deliveries
            .remove_where(|delivery| delivery.client.is_same_client(&removed_client));
        Ok((removed_client, removed_deliveries))
    }

    pub fn has_delivery(&self, delivery: &Delivery) -> bool {
        self.deliveries.contains(delivery)
    }

    pub fn find_delivery(&self, id: DeliveryId) -> Option<&Delivery> {
        self.deliveries.get(&id)
    }

    /// Highest delivery id currently stored, or 0 when there are none.
    pub fn max_delivery_id(&self) -> DeliveryId {
        self.deliveries.iter().map(|d| d.id).max().unwrap_or(0)
    }

    /// Returns `delivery` holding this book's value of its client.
    ///
    /// # Errors
    /// - `UnknownClientReference` when no client has that name.
    /// - `Validation(ZeroDeliveryId)` for id 0.
    pub fn link_client(&self, delivery: Delivery) -> ModelResult<Delivery> {
        link_client(self.clients.as_slice(), delivery)
    }

    /// Adds a delivery whose client must already be in the book.
    pub fn add_delivery(&mut self, delivery: Delivery) -> ModelResult<()> {
        let delivery = self.link_client(delivery)?;
        self.deliveries.add(delivery)
    }

    /// Replaces `target` with `edited`, keeping the id and linking the
    /// stored client value.
    pub fn set_delivery(&mut self, target: &Delivery, edited: Delivery) -> ModelResult<()> {
        if edited.id != target.id {
            return Err(ModelError::DeliveryIdChanged {
                target: target.id,
                edited: edited.id,
            });
        }
        let edited = self.link_client(edited)?;
        self.deliveries.replace(target, edited)
    }

    pub fn remove_delivery(&mut self, delivery: &Delivery) -> ModelResult<Delivery> {
        self.deliveries.remove(delivery)
    }
}

fn link_client(clients: &[Client], mut delivery: Delivery) -> ModelResult<Delivery> {
    if delivery.id == 0 {
        return Err(ValidationError::ZeroDeliveryId.into());
    }
    let client = clients
        .iter()
        .find(|client| client.name == delivery.client.name)
        .ok_or_else(|| ModelError::UnknownClientReference {
            client_name: delivery.client.name.clone(),
        })?;
    delivery.client = client.clone();
    Ok(delivery)
}
