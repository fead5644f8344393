//! SQLite storage backend.
//!
//! # Responsibility
//! - Persist the book as `clients`, `client_tags` and `deliveries` tables.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - A save replaces every row inside one transaction.
//! - Row order is carried by the `position` column, not by rowid.
//! - `deliveries.client_name` is a foreign key onto `clients.name`.
//! - A database without a `book_state` row has never been saved and reads as
//!   `None`.

use crate::model::client::Client;
use crate::model::delivery::{Cost, Delivery, DeliveryId, DeliveryStatus};
use crate::model::error::ModelError;
use crate::model::food_book::{FoodBook, FoodBookSnapshot};
use crate::model::tag::Tag;
use crate::storage::{FoodBookStorage, StorageError, StorageResult};
use chrono::NaiveDateTime;
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

const SCHEDULED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                supported,
            } => write!(
                f,
                "database schema version {db_version} is not supported (expected {supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Storage backed by one SQLite database.
pub struct SqliteFoodBookStorage {
    conn: Connection,
    location: String,
}

impl SqliteFoodBookStorage {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let location = path.as_ref().display().to_string();
        let conn = open_db(path)?;
        Ok(Self { conn, location })
    }

    /// Opens a private in-memory database, mostly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self {
            conn,
            location: ":memory:".to_string(),
        })
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn read_rows(&self) -> StorageResult<Option<FoodBookSnapshot>> {
        let saved: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM book_state WHERE id = 1);",
            [],
            |row| row.get(0),
        )?;
        if !saved {
            return Ok(None);
        }

        let clients = self.read_clients()?;
        let mut stmt = self.conn.prepare(
            "SELECT id, client_name, scheduled_at, remarks, cost_cents, tag, status
             FROM deliveries
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut deliveries = Vec::new();
        while let Some(row) = rows.next()? {
            deliveries.push(parse_delivery_row(row, &clients)?);
        }

        let snapshot = FoodBookSnapshot {
            clients,
            deliveries,
        };
        FoodBook::from_snapshot(&snapshot)?;
        Ok(Some(snapshot))
    }

    fn read_clients(&self) -> StorageResult<Vec<Client>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, phone, email, address
             FROM clients
             ORDER BY position ASC;",
        )?;
        let mut tag_stmt = self.conn.prepare(
            "SELECT tag FROM client_tags
             WHERE client_name = ?1
             ORDER BY tag ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get("name")?;
            let mut tags = Vec::new();
            let mut tag_rows = tag_stmt.query(params![name])?;
            while let Some(tag_row) = tag_rows.next()? {
                let value: String = tag_row.get(0)?;
                tags.push(Tag::parse(value).map_err(|err| {
                    StorageError::InvalidData(format!("client `{name}`: {err}"))
                })?);
            }

            let client = Client::new(
                name,
                row.get::<_, String>("phone")?,
                row.get::<_, String>("email")?,
                row.get::<_, String>("address")?,
            )
            .with_tags(tags);
            client.validate().map_err(|err| {
                StorageError::InvalidData(format!("client `{}`: {err}", client.name))
            })?;
            clients.push(client);
        }
        Ok(clients)
    }

    fn write_rows(&self, snapshot: &FoodBookSnapshot) -> StorageResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(
            "DELETE FROM deliveries;
             DELETE FROM client_tags;
             DELETE FROM clients;",
        )?;

        {
            let mut insert_client = tx.prepare(
                "INSERT INTO clients (name, position, phone, email, address)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            let mut insert_tag =
                tx.prepare("INSERT INTO client_tags (client_name, tag) VALUES (?1, ?2);")?;
            for (position, client) in snapshot.clients.iter().enumerate() {
                insert_client.execute(params![
                    client.name,
                    position,
                    client.phone,
                    client.email,
                    client.address,
                ])?;
                for tag in &client.tags {
                    insert_tag.execute(params![client.name, tag.as_str()])?;
                }
            }

            let mut insert_delivery = tx.prepare(
                "INSERT INTO deliveries (
                    id, position, client_name, scheduled_at, remarks, cost_cents, tag, status
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for (position, delivery) in snapshot.deliveries.iter().enumerate() {
                let cost_cents = i64::try_from(delivery.cost.cents()).map_err(|_| {
                    StorageError::InvalidData(format!(
                        "delivery `{}`: cost {} is out of range",
                        delivery.id, delivery.cost
                    ))
                })?;
                insert_delivery.execute(params![
                    delivery.id,
                    position,
                    delivery.client.name,
                    delivery.scheduled_at.format(SCHEDULED_AT_FORMAT).to_string(),
                    delivery.remarks,
                    cost_cents,
                    delivery.tag.as_ref().map(Tag::as_str),
                    delivery.status.as_str(),
                ])?;
            }
        }

        tx.execute(
            "INSERT INTO book_state (id, saved_at) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET saved_at = excluded.saved_at;",
            params![chrono::Utc::now().timestamp_millis()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl FoodBookStorage for SqliteFoodBookStorage {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn read_food_book(&self) -> StorageResult<Option<FoodBookSnapshot>> {
        let started_at = Instant::now();
        match self.read_rows() {
            Ok(snapshot) => {
                info!(
                    "event=storage_read module=storage status={} backend=sqlite duration_ms={}",
                    if snapshot.is_some() { "ok" } else { "missing" },
                    started_at.elapsed().as_millis()
                );
                Ok(snapshot)
            }
            Err(err) => {
                error!(
                    "event=storage_read module=storage status=error backend=sqlite duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save_food_book(&self, snapshot: &FoodBookSnapshot) -> StorageResult<()> {
        let started_at = Instant::now();
        match self.write_rows(snapshot) {
            Ok(()) => {
                info!(
                    "event=storage_save module=storage status=ok backend=sqlite clients={} deliveries={} duration_ms={}",
                    snapshot.clients.len(),
                    snapshot.deliveries.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=storage_save module=storage status=error backend=sqlite duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn parse_delivery_row(row: &Row<'_>, clients: &[Client]) -> StorageResult<Delivery> {
    let id: DeliveryId = row.get("id")?;
    let invalid =
        |message: String| StorageError::InvalidData(format!("delivery `{id}`: {message}"));

    let client_name: String = row.get("client_name")?;
    let client = clients
        .iter()
        .find(|client| client.name == client_name)
        .cloned()
        .ok_or(ModelError::UnknownClientReference { client_name })?;

    let scheduled_text: String = row.get("scheduled_at")?;
    let scheduled_at = NaiveDateTime::parse_from_str(&scheduled_text, SCHEDULED_AT_FORMAT)
        .map_err(|err| invalid(format!("invalid scheduled_at `{scheduled_text}`: {err}")))?;

    let cost_cents: i64 = row.get("cost_cents")?;
    let cost = u64::try_from(cost_cents)
        .map(Cost::from_cents)
        .map_err(|_| invalid(format!("invalid cost_cents `{cost_cents}`")))?;

    let tag = row
        .get::<_, Option<String>>("tag")?
        .map(Tag::parse)
        .transpose()
        .map_err(|err| invalid(err.to_string()))?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text)
        .ok_or_else(|| invalid(format!("invalid status `{status_text}`")))?;

    let delivery = Delivery::new(id, client, scheduled_at, row.get::<_, String>("remarks")?, cost)
        .with_tag(tag)
        .with_status(status);
    delivery.validate().map_err(|err| invalid(err.to_string()))?;
    Ok(delivery)
}

fn parse_status(value: &str) -> Option<DeliveryStatus> {
    match value {
        "undelivered" => Some(DeliveryStatus::Undelivered),
        "delivered" => Some(DeliveryStatus::Delivered),
        _ => None,
    }
}
