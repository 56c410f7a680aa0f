use alloy_primitives::Address;
use chrono::{DateTime, Utc};

use super::DatabaseError;
use crate::friendfi::accounts::Account;
use crate::friendfi::signers::SignerKind;
use crate::{friendfi::FriendFi, FriendFiError};

struct AccountRow {
    // id is the primary key
    id: i64,
    // address is the 0x-prefixed hex EVM address
    address: Address,
    // username is the locally cached on-chain username, if registered
    username: Option<String>,
    // signer_kind records which signer backend holds the key
    signer_kind: SignerKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    // last_synced_at is the timestamp of the last contract state refresh
    last_synced_at: Option<DateTime<Utc>>,
}

impl<'r, R> sqlx::FromRow<'r, R> for AccountRow
where
    R: sqlx::Row,
    &'r str: sqlx::ColumnIndex<R>,
    String: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    i64: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
{
    fn from_row(row: &'r R) -> std::result::Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let address_str: String = row.try_get("address")?;
        let username: Option<String> = row.try_get("username")?;
        let signer_kind_str: String = row.try_get("signer_kind")?;
        let created_at_i64: i64 = row.try_get("created_at")?;
        let updated_at_i64: i64 = row.try_get("updated_at")?;
        let last_synced_at_i64: Option<i64> = row.try_get("last_synced_at")?;

        let address = address_str
            .parse::<Address>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "address".to_string(),
                source: Box::new(e),
            })?;

        let signer_kind =
            signer_kind_str
                .parse::<SignerKind>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "signer_kind".to_string(),
                    source: Box::new(e),
                })?;

        let created_at = DateTime::from_timestamp_millis(created_at_i64)
            .ok_or_else(|| DatabaseError::InvalidTimestamp {
                timestamp: created_at_i64,
            })
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "created_at".to_string(),
                source: Box::new(e),
            })?;

        let updated_at = DateTime::from_timestamp_millis(updated_at_i64)
            .ok_or_else(|| DatabaseError::InvalidTimestamp {
                timestamp: updated_at_i64,
            })
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "updated_at".to_string(),
                source: Box::new(e),
            })?;

        let last_synced_at = match last_synced_at_i64 {
            Some(timestamp) => Some(
                DateTime::from_timestamp_millis(timestamp)
                    .ok_or_else(|| DatabaseError::InvalidTimestamp { timestamp })
                    .map_err(|e| sqlx::Error::ColumnDecode {
                        index: "last_synced_at".to_string(),
                        source: Box::new(e),
                    })?,
            ),
            None => None,
        };

        Ok(AccountRow {
            id,
            address,
            username,
            signer_kind,
            created_at,
            updated_at,
            last_synced_at,
        })
    }
}

impl AccountRow {
    fn into_account(self) -> Account {
        Account {
            id: Some(self.id),
            address: self.address,
            username: self.username,
            signer_kind: self.signer_kind,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_synced_at: self.last_synced_at,
        }
    }
}

impl Account {
    pub(crate) async fn all(friendfi: &FriendFi) -> Result<Vec<Account>, FriendFiError> {
        let account_rows =
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts ORDER BY updated_at DESC")
                .fetch_all(&friendfi.database.pool)
                .await
                .map_err(DatabaseError::Sqlx)?;

        Ok(account_rows
            .into_iter()
            .map(|row| row.into_account())
            .collect())
    }

    pub(crate) async fn find_by_address(
        address: &Address,
        friendfi: &FriendFi,
    ) -> Result<Account, FriendFiError> {
        let account_row =
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE address = ?")
                .bind(format!("{address:#x}"))
                .fetch_one(&friendfi.database.pool)
                .await
                .map_err(|_| FriendFiError::AccountNotFound)?;

        Ok(account_row.into_account())
    }

    /// Insert or refresh the row for this address. Returns the stored row
    /// with its database id populated.
    pub(crate) async fn save(&self, friendfi: &FriendFi) -> Result<Account, FriendFiError> {
        let account_row = sqlx::query_as::<_, AccountRow>(
            "INSERT INTO accounts (address, username, signer_kind, created_at, updated_at, last_synced_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(address) DO UPDATE SET
                username = excluded.username,
                signer_kind = excluded.signer_kind,
                updated_at = excluded.updated_at,
                last_synced_at = excluded.last_synced_at
             RETURNING *",
        )
        .bind(format!("{:#x}", self.address))
        .bind(&self.username)
        .bind(self.signer_kind.to_string())
        .bind(self.created_at.timestamp_millis())
        .bind(self.updated_at.timestamp_millis())
        .bind(self.last_synced_at.map(|ts| ts.timestamp_millis()))
        .fetch_one(&friendfi.database.pool)
        .await
        .map_err(DatabaseError::Sqlx)?;

        Ok(account_row.into_account())
    }

    pub(crate) async fn delete(&self, friendfi: &FriendFi) -> Result<(), FriendFiError> {
        sqlx::query("DELETE FROM accounts WHERE address = ?")
            .bind(format!("{:#x}", self.address))
            .execute(&friendfi.database.pool)
            .await
            .map_err(DatabaseError::Sqlx)?;
        Ok(())
    }

    pub(crate) async fn update_last_synced(
        &self,
        friendfi: &FriendFi,
    ) -> Result<(), FriendFiError> {
        let now = Utc::now();
        sqlx::query("UPDATE accounts SET last_synced_at = ?, updated_at = ? WHERE address = ?")
            .bind(now.timestamp_millis())
            .bind(now.timestamp_millis())
            .bind(format!("{:#x}", self.address))
            .execute(&friendfi.database.pool)
            .await
            .map_err(DatabaseError::Sqlx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqliteRow;
    use sqlx::{FromRow, SqlitePool};

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            "CREATE TABLE accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT NOT NULL UNIQUE,
                username TEXT,
                signer_kind TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                last_synced_at INTEGER
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[tokio::test]
    async fn test_account_row_from_row_valid_data() {
        let pool = setup_test_db().await;
        let test_timestamp = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            "INSERT INTO accounts (address, username, signer_kind, created_at, updated_at, last_synced_at)
             VALUES (?, ?, ?, ?, ?, NULL)",
        )
        .bind("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
        .bind("alice")
        .bind("ephemeral")
        .bind(test_timestamp)
        .bind(test_timestamp)
        .execute(&pool)
        .await
        .unwrap();

        let row: SqliteRow = sqlx::query("SELECT * FROM accounts")
            .fetch_one(&pool)
            .await
            .unwrap();

        let account_row = AccountRow::from_row(&row).unwrap();
        assert_eq!(account_row.address, Address::repeat_byte(0xAA));
        assert_eq!(account_row.username.as_deref(), Some("alice"));
        assert_eq!(account_row.signer_kind, SignerKind::Ephemeral);
        assert_eq!(account_row.created_at.timestamp_millis(), test_timestamp);
        assert!(account_row.last_synced_at.is_none());
    }

    #[tokio::test]
    async fn test_account_row_from_row_invalid_address() {
        let pool = setup_test_db().await;

        sqlx::query(
            "INSERT INTO accounts (address, username, signer_kind, created_at, updated_at)
             VALUES ('not-an-address', NULL, 'local', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let row: SqliteRow = sqlx::query("SELECT * FROM accounts")
            .fetch_one(&pool)
            .await
            .unwrap();

        let result = AccountRow::from_row(&row);
        assert!(matches!(result, Err(sqlx::Error::ColumnDecode { .. })));
    }

    #[tokio::test]
    async fn test_account_row_from_row_unknown_signer_kind() {
        let pool = setup_test_db().await;

        sqlx::query(
            "INSERT INTO accounts (address, username, signer_kind, created_at, updated_at)
             VALUES ('0xcccccccccccccccccccccccccccccccccccccccc', NULL, 'hardware', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let row: SqliteRow = sqlx::query("SELECT * FROM accounts")
            .fetch_one(&pool)
            .await
            .unwrap();

        let result = AccountRow::from_row(&row);
        assert!(matches!(result, Err(sqlx::Error::ColumnDecode { .. })));
    }

    #[tokio::test]
    async fn test_account_row_from_row_invalid_timestamp() {
        let pool = setup_test_db().await;

        sqlx::query(
            "INSERT INTO accounts (address, username, signer_kind, created_at, updated_at)
             VALUES ('0xdddddddddddddddddddddddddddddddddddddddd', NULL, 'ephemeral', ?, 0)",
        )
        .bind(i64::MAX)
        .execute(&pool)
        .await
        .unwrap();

        let row: SqliteRow = sqlx::query("SELECT * FROM accounts")
            .fetch_one(&pool)
            .await
            .unwrap();

        let result = AccountRow::from_row(&row);
        assert!(matches!(result, Err(sqlx::Error::ColumnDecode { .. })));
    }
}
