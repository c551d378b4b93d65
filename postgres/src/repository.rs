//! `PostgreSQL` implementation of [`EventRepository`].
//!
//! One row per event. The guest list is stored as a JSONB array next to the
//! name, so an event and its guests are always read and written together.
//! Saves are a compare-and-swap on the `version` column.

use crate::config::PostgresConfig;
use rsvp_core::event::{Event, EventId, EventSummary};
use rsvp_core::guest::Guest;
use rsvp_core::repository::{
    EventRepository, RepositoryError, RepositoryFuture, Version, Versioned,
};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

/// `PostgreSQL`-backed event repository.
///
/// # Example
///
/// ```no_run
/// use rsvp_postgres::PostgresEventRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = PostgresEventRepository::new("postgres://localhost/rsvp").await?;
/// repo.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

fn database_error(e: &sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn to_version(raw: i64) -> Result<Version, RepositoryError> {
    u64::try_from(raw)
        .map(Version::new)
        .map_err(|_| RepositoryError::Serialization(format!("Negative version {raw}")))
}

fn to_raw(version: Version) -> Result<i64, RepositoryError> {
    i64::try_from(version.value())
        .map_err(|_| RepositoryError::Serialization(format!("Version {version} out of range")))
}

impl PostgresEventRepository {
    /// Connect with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the connection fails.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let config = PostgresConfig {
            url: database_url.to_string(),
            ..PostgresConfig::default()
        };
        Self::from_config(&config).await
    }

    /// Connect using explicit pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the connection fails.
    pub async fn from_config(config: &PostgresConfig) -> Result<Self, RepositoryError> {
        Ok(Self::from_pool(config.connect().await?))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `rsvp_events` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if migration fails.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Migration failed: {e}")))
    }

    async fn insert_row(&self, name: String) -> Result<Event, RepositoryError> {
        let id: (i64,) = sqlx::query_as("INSERT INTO rsvp_events (name) VALUES ($1) RETURNING id")
            .bind(&name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error(&e))?;

        tracing::debug!(event_id = id.0, "Inserted event row");
        Ok(Event::new(EventId::new(id.0), name))
    }

    async fn load_row(&self, id: EventId) -> Result<Option<Versioned<Event>>, RepositoryError> {
        let row = sqlx::query("SELECT name, guests, version FROM rsvp_events WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(&e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: String = row.try_get("name").map_err(|e| database_error(&e))?;
        let guests: Json<Vec<Guest>> = row
            .try_get("guests")
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let version = to_version(row.try_get("version").map_err(|e| database_error(&e))?)?;

        Ok(Some(Versioned::new(
            Event::with_guests(id, name, guests.0),
            version,
        )))
    }

    async fn save_row(&self, event: Event, expected: Version) -> Result<Version, RepositoryError> {
        let event_id = event.id();
        let updated: Option<(i64,)> = sqlx::query_as(
            r"
            UPDATE rsvp_events
            SET name = $2, guests = $3, version = version + 1, updated_at = now()
            WHERE id = $1 AND version = $4
            RETURNING version
            ",
        )
        .bind(event_id.value())
        .bind(event.name())
        .bind(Json(event.guests()))
        .bind(to_raw(expected)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(&e))?;

        if let Some((version,)) = updated {
            return to_version(version);
        }

        // No row matched: either the event is gone or its version moved on.
        let current: Option<(i64,)> = sqlx::query_as("SELECT version FROM rsvp_events WHERE id = $1")
            .bind(event_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error(&e))?;

        match current {
            Some((actual,)) => {
                let actual = to_version(actual)?;
                tracing::debug!(%event_id, %expected, %actual, "Stale write rejected");
                Err(RepositoryError::Conflict {
                    event_id,
                    expected,
                    actual,
                })
            }
            None => Err(RepositoryError::NotFound(event_id)),
        }
    }

    async fn delete_row(&self, id: EventId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM rsvp_events WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error(&e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn summaries(&self) -> Result<Vec<EventSummary>, RepositoryError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM rsvp_events ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| database_error(&e))?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| EventSummary {
                id: EventId::new(id),
                name,
            })
            .collect())
    }
}

impl EventRepository for PostgresEventRepository {
    fn insert(&self, name: String) -> RepositoryFuture<'_, Event> {
        Box::pin(self.insert_row(name))
    }

    fn load(&self, id: EventId) -> RepositoryFuture<'_, Option<Versioned<Event>>> {
        Box::pin(self.load_row(id))
    }

    fn save(&self, event: Event, expected_version: Version) -> RepositoryFuture<'_, Version> {
        Box::pin(self.save_row(event, expected_version))
    }

    fn delete(&self, id: EventId) -> RepositoryFuture<'_, ()> {
        Box::pin(self.delete_row(id))
    }

    fn list_summaries(&self) -> RepositoryFuture<'_, Vec<EventSummary>> {
        Box::pin(self.summaries())
    }
}
