//! JSON file storage.
//!
//! # Responsibility
//! - Map the book to a flat `{ clients, deliveries }` document and back.
//! - Re-validate every field and store invariant on read.
//!
//! # Invariants
//! - Deliveries are persisted with `client_name` only; the full client value
//!   is re-attached from the client list at load time.
//! - A missing file reads as `None`; a malformed file is an error, never an
//!   empty book.

use crate::model::client::Client;
use crate::model::delivery::{Cost, Delivery, DeliveryId, DeliveryStatus};
use crate::model::error::ModelError;
use crate::model::food_book::{FoodBook, FoodBookSnapshot};
use crate::model::tag::Tag;
use crate::storage::{FoodBookStorage, StorageError, StorageResult};
use chrono::NaiveDateTime;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Storage backed by one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFoodBookStorage {
    path: PathBuf,
}

impl JsonFoodBookStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FoodBookStorage for JsonFoodBookStorage {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read_food_book(&self) -> StorageResult<Option<FoodBookSnapshot>> {
        let started_at = Instant::now();
        if !self.path.exists() {
            info!(
                "event=storage_read module=storage status=missing backend=json path={}",
                self.path.display()
            );
            return Ok(None);
        }

        match read_json_file(&self.path) {
            Ok(snapshot) => {
                info!(
                    "event=storage_read module=storage status=ok backend=json clients={} deliveries={} duration_ms={}",
                    snapshot.clients.len(),
                    snapshot.deliveries.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(Some(snapshot))
            }
            Err(err) => {
                error!(
                    "event=storage_read module=storage status=error backend=json duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save_food_book(&self, snapshot: &FoodBookSnapshot) -> StorageResult<()> {
        let started_at = Instant::now();
        match write_json_file(&self.path, snapshot) {
            Ok(()) => {
                info!(
                    "event=storage_save module=storage status=ok backend=json clients={} deliveries={} duration_ms={}",
                    snapshot.clients.len(),
                    snapshot.deliveries.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=storage_save module=storage status=error backend=json duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonFoodBook {
    #[serde(default)]
    clients: Vec<JsonClient>,
    #[serde(default)]
    deliveries: Vec<JsonDelivery>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonClient {
    name: String,
    phone: String,
    email: String,
    address: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonDelivery {
    id: DeliveryId,
    client_name: String,
    scheduled_at: NaiveDateTime,
    remarks: String,
    cost: String,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    status: DeliveryStatus,
}

impl From<&Client> for JsonClient {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            phone: client.phone.clone(),
            email: client.email.clone(),
            address: client.address.clone(),
            tags: client.tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}

impl From<&Delivery> for JsonDelivery {
    fn from(delivery: &Delivery) -> Self {
        Self {
            id: delivery.id,
            client_name: delivery.client.name.clone(),
            scheduled_at: delivery.scheduled_at,
            remarks: delivery.remarks.clone(),
            cost: delivery.cost.to_string(),
            tag: delivery.tag.as_ref().map(|tag| tag.to_string()),
            status: delivery.status,
        }
    }
}

impl JsonClient {
    fn into_model(self) -> StorageResult<Client> {
        let tags = self
            .tags
            .into_iter()
            .map(Tag::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| invalid_field("client", &self.name, &err))?;
        let client = Client::new(self.name, self.phone, self.email, self.address).with_tags(tags);
        client
            .validate()
            .map_err(|err| invalid_field("client", &client.name, &err))?;
        Ok(client)
    }
}

impl JsonDelivery {
    fn into_model(self, clients: &[Client]) -> StorageResult<Delivery> {
        let id = self.id.to_string();
        let client = clients
            .iter()
            .find(|client| client.name == self.client_name)
            .cloned()
            .ok_or(ModelError::UnknownClientReference {
                client_name: self.client_name,
            })?;
        let cost = Cost::parse(&self.cost).map_err(|err| invalid_field("delivery", &id, &err))?;
        let tag = self
            .tag
            .map(Tag::parse)
            .transpose()
            .map_err(|err| invalid_field("delivery", &id, &err))?;

        let delivery = Delivery::new(self.id, client, self.scheduled_at, self.remarks, cost)
            .with_tag(tag)
            .with_status(self.status);
        delivery
            .validate()
            .map_err(|err| invalid_field("delivery", &id, &err))?;
        Ok(delivery)
    }
}

fn invalid_field(kind: &str, identity: &str, err: &dyn std::error::Error) -> StorageError {
    StorageError::InvalidData(format!("{kind} `{identity}`: {err}"))
}

fn read_json_file(path: &Path) -> StorageResult<FoodBookSnapshot> {
    let raw = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: JsonFoodBook =
        serde_json::from_str(&raw).map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let clients = document
        .clients
        .into_iter()
        .map(JsonClient::into_model)
        .collect::<StorageResult<Vec<_>>>()?;
    let deliveries = document
        .deliveries
        .into_iter()
        .map(|delivery| delivery.into_model(&clients))
        .collect::<StorageResult<Vec<_>>>()?;

    let snapshot = FoodBookSnapshot {
        clients,
        deliveries,
    };
    // Duplicate names/ids are only detectable across the whole document.
    FoodBook::from_snapshot(&snapshot)?;
    Ok(snapshot)
}

fn write_json_file(path: &Path, snapshot: &FoodBookSnapshot) -> StorageResult<()> {
    let document = JsonFoodBook {
        clients: snapshot.clients.iter().map(JsonClient::from).collect(),
        deliveries: snapshot.deliveries.iter().map(JsonDelivery::from).collect(),
    };
    let body = serde_json::to_string_pretty(&document).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, body).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}
