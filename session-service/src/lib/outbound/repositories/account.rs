use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::RoleName;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn database_error(e: sqlx::Error) -> AccountError {
        AccountError::DatabaseError(e.to_string())
    }

    /// Fold one row per role (LEFT JOIN) into an account.
    fn account_from_rows(rows: Vec<PgRow>) -> Result<Option<Account>, AccountError> {
        let Some(first) = rows.first() else {
            return Ok(None);
        };

        let id: Uuid = first.try_get("id").map_err(Self::database_error)?;
        let username: String = first.try_get("username").map_err(Self::database_error)?;
        let password_hash: String = first.try_get("password_hash").map_err(Self::database_error)?;
        let created_at: DateTime<Utc> = first.try_get("created_at").map_err(Self::database_error)?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in &rows {
            let role_name: Option<String> = row.try_get("role_name").map_err(Self::database_error)?;
            if let Some(name) = role_name {
                roles.push(RoleName::new(name)?);
            }
        }

        Ok(Some(Account {
            id: AccountId(id),
            username: Username::new(username)?,
            password_hash,
            roles,
            created_at,
        }))
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AccountError> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.username, a.password_hash, a.created_at, r.name AS role_name
            FROM accounts a
            LEFT JOIN account_roles ar ON ar.account_id = a.id
            LEFT JOIN roles r ON r.id = ar.role_id
            WHERE a.username = $1
            ORDER BY r.id
            "#,
        )
        .bind(username.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Self::database_error)?;

        Self::account_from_rows(rows)
    }

    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let mut transaction = self.pool.begin().await.map_err(Self::database_error)?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&mut *transaction)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AccountError::UsernameAlreadyExists(
                        account.username.as_str().to_string(),
                    );
                }
            }
            AccountError::DatabaseError(e.to_string())
        })?;

        for role in &account.roles {
            let linked = sqlx::query(
                r#"
                INSERT INTO account_roles (account_id, role_id)
                SELECT $1, id FROM roles WHERE name = $2
                "#,
            )
            .bind(account.id.0)
            .bind(role.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(Self::database_error)?;

            if linked.rows_affected() == 0 {
                transaction.rollback().await.map_err(Self::database_error)?;
                return Err(AccountError::UnknownRole(role.as_str().to_string()));
            }
        }

        transaction.commit().await.map_err(Self::database_error)?;

        tracing::info!(
            account_id = %account.id,
            roles = account.roles.len(),
            "Account created"
        );
        Ok(account)
    }
}
