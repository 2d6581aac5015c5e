//! Insert and lookup operations over record collections.
//!
//! Only three reads exist: everything in insertion order, the latest
//! record, and a count. There is no filtering and no secondary indexing.

use moosicbox_json_utils::database::ToValue as _;
use nephro_coach_report_models::StoredRecord;
use serde::Serialize;
use serde::de::DeserializeOwned;
use switchy_database::{Database, DatabaseValue, Row};

use crate::{Collection, DbError};

/// Inserts `record` into `collection` and returns its assigned ID.
///
/// IDs increase monotonically, so the returned ID is greater than that of
/// any record previously inserted into the same collection.
///
/// # Errors
///
/// Returns [`DbError`] if the record cannot be serialized or the insert
/// fails.
pub async fn insert<T: Serialize>(
    db: &dyn Database,
    collection: Collection,
    record: &T,
) -> Result<i64, DbError> {
    let document = serde_json::to_string(record)?;
    let now = chrono::Utc::now().to_rfc3339();

    let rows = db
        .query_raw_params(
            &format!(
                "INSERT INTO {} (document, created_at) VALUES (?, ?) RETURNING id",
                collection.table()
            ),
            &[DatabaseValue::String(document), DatabaseValue::String(now)],
        )
        .await?;

    let id = rows
        .first()
        .ok_or_else(|| DbError::Conversion {
            message: format!("Insert into {collection} returned no id"),
        })
        .and_then(row_id)?;

    log::debug!("Inserted {collection} record {id}");

    Ok(id)
}

/// Returns every record in `collection`, oldest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored document cannot be
/// deserialized into `T`.
pub async fn find_all<T: DeserializeOwned>(
    db: &dyn Database,
    collection: Collection,
) -> Result<Vec<StoredRecord<T>>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT id, document FROM {} ORDER BY id ASC",
                collection.table()
            ),
            &[],
        )
        .await?;

    rows.iter().map(stored_record::<T>).collect()
}

/// Returns the record with the greatest ID in `collection`, if any.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or the stored document cannot be
/// deserialized into `T`.
pub async fn find_latest<T: DeserializeOwned>(
    db: &dyn Database,
    collection: Collection,
) -> Result<Option<StoredRecord<T>>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT id, document FROM {} ORDER BY id DESC LIMIT 1",
                collection.table()
            ),
            &[],
        )
        .await?;

    rows.first().map(stored_record::<T>).transpose()
}

/// Returns the number of records in `collection`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn count(db: &dyn Database, collection: Collection) -> Result<u64, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT COUNT(*) as cnt FROM {}", collection.table()),
            &[],
        )
        .await?;

    let count: i64 = match rows.first() {
        Some(row) => row.to_value("cnt").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse {collection} count: {e}"),
        })?,
        None => 0,
    };

    non_negative_count(collection, count)
}

fn non_negative_count(collection: Collection, count: i64) -> Result<u64, DbError> {
    u64::try_from(count).map_err(|e| DbError::Conversion {
        message: format!("Invalid {collection} count {count}: {e}"),
    })
}

fn row_id(row: &Row) -> Result<i64, DbError> {
    row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse record id: {e}"),
    })
}

fn stored_record<T: DeserializeOwned>(row: &Row) -> Result<StoredRecord<T>, DbError> {
    let id = row_id(row)?;
    let document: String = row.to_value("document").map_err(|e| DbError::Conversion {
        message: format!("Failed to read document for record {id}: {e}"),
    })?;
    let record = serde_json::from_str(&document)?;

    Ok(StoredRecord { id, record })
}
