use chrono::{DateTime, Utc};

use super::{Database, DatabaseError};

/// Internal database row representation for the resolved_content table
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedContentRow {
    pointer: String,
    metadata: String,
    fetched_at: DateTime<Utc>,
}

impl<'r, R> sqlx::FromRow<'r, R> for ResolvedContentRow
where
    R: sqlx::Row,
    &'r str: sqlx::ColumnIndex<R>,
    String: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    i64: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
{
    fn from_row(row: &'r R) -> std::result::Result<Self, sqlx::Error> {
        let pointer: String = row.try_get("pointer")?;
        let metadata: String = row.try_get("metadata")?;
        let fetched_at_i64: i64 = row.try_get("fetched_at")?;

        let fetched_at = DateTime::from_timestamp_millis(fetched_at_i64)
            .ok_or_else(|| DatabaseError::InvalidTimestamp {
                timestamp: fetched_at_i64,
            })
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "fetched_at".to_string(),
                source: Box::new(e),
            })?;

        Ok(ResolvedContentRow {
            pointer,
            metadata,
            fetched_at,
        })
    }
}

/// A locally persisted copy of content-store metadata for one pointer.
///
/// Pointers are content addressed, so a stored record never goes stale;
/// re-saving the same pointer just refreshes the fetch timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedContent {
    pub pointer: String,
    pub metadata: String,
    pub fetched_at: DateTime<Utc>,
}

impl From<ResolvedContentRow> for ResolvedContent {
    fn from(val: ResolvedContentRow) -> Self {
        Self {
            pointer: val.pointer,
            metadata: val.metadata,
            fetched_at: val.fetched_at,
        }
    }
}

impl ResolvedContent {
    /// Finds a cached metadata document by its content pointer
    pub(crate) async fn find_by_pointer(
        database: &Database,
        pointer: &str,
    ) -> Result<Option<Self>, DatabaseError> {
        let row_opt = sqlx::query_as::<_, ResolvedContentRow>(
            "SELECT pointer, metadata, fetched_at FROM resolved_content WHERE pointer = ?",
        )
        .bind(pointer)
        .fetch_optional(&database.pool)
        .await
        .map_err(DatabaseError::Sqlx)?;

        Ok(row_opt.map(Into::into))
    }

    /// Saves a fetched metadata document, replacing any previous copy
    pub(crate) async fn save(
        database: &Database,
        pointer: &str,
        metadata: &str,
    ) -> Result<Self, DatabaseError> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, ResolvedContentRow>(
            "INSERT INTO resolved_content (pointer, metadata, fetched_at)
             VALUES (?, ?, ?)
             ON CONFLICT (pointer)
             DO UPDATE SET metadata = excluded.metadata, fetched_at = excluded.fetched_at
             RETURNING pointer, metadata, fetched_at",
        )
        .bind(pointer)
        .bind(metadata)
        .bind(now_ms)
        .fetch_one(&database.pool)
        .await
        .map_err(DatabaseError::Sqlx)?;

        Ok(row.into())
    }
}
