//! Credential store tests against a real Postgres.
//!
//! Run with a reachable server at `DATABASE_URL`:
//! `cargo test -p session-service --test repository_tests -- --ignored`

mod common;

use chrono::Utc;
use common::TestDb;
use session_service::domain::account::errors::AccountError;
use session_service::domain::account::models::Account;
use session_service::domain::account::models::AccountId;
use session_service::domain::account::models::RoleName;
use session_service::domain::account::models::Username;
use session_service::domain::account::ports::AccountRepository;
use session_service::outbound::repositories::PostgresAccountRepository;

fn account(username: &str, roles: &[&str]) -> Account {
    Account {
        id: AccountId::new(),
        username: Username::new(username.to_string()).unwrap(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        roles: roles
            .iter()
            .map(|role| RoleName::new(role.to_string()).unwrap())
            .collect(),
        created_at: Utc::now(),
    }
}

async fn count(db: &TestDb, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&db.pool)
        .await
        .expect("Failed to count rows")
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn test_create_and_find_with_roles_in_order() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());
    let created = account("nicola", &["ROLE_ADMIN", "ROLE_USER"]);

    repository.create(created.clone()).await.unwrap();
    let found = repository
        .find_by_username(&created.username)
        .await
        .unwrap()
        .expect("Account not found");

    assert_eq!(found.id, created.id);
    assert_eq!(found.password_hash, created.password_hash);
    // One row per role folds into a single account, in role seed order
    assert_eq!(
        found.role_names(),
        vec!["ROLE_USER".to_string(), "ROLE_ADMIN".to_string()]
    );
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn test_find_unknown_username() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());

    let found = repository
        .find_by_username(&Username::new("nobody".to_string()).unwrap())
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn test_account_without_roles() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());
    let created = account("nicola", &[]);

    repository.create(created.clone()).await.unwrap();
    let found = repository
        .find_by_username(&created.username)
        .await
        .unwrap()
        .expect("Account not found");

    assert!(found.roles.is_empty());
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn test_unknown_role_leaves_no_rows() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());
    let rejected = account("nicola", &["ROLE_USER", "ROLE_GHOST"]);

    let result = repository.create(rejected.clone()).await;

    assert!(matches!(result, Err(AccountError::UnknownRole(role)) if role == "ROLE_GHOST"));
    assert_eq!(count(&db, "accounts").await, 0);
    assert_eq!(count(&db, "account_roles").await, 0);
    assert!(repository
        .find_by_username(&rejected.username)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore = "requires Postgres at DATABASE_URL"]
async fn test_duplicate_username() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());
    repository
        .create(account("nicola", &["ROLE_USER"]))
        .await
        .unwrap();

    let result = repository.create(account("nicola", &["ROLE_ADMIN"])).await;

    assert!(matches!(result, Err(AccountError::UsernameAlreadyExists(name)) if name == "nicola"));
    assert_eq!(count(&db, "accounts").await, 1);
    assert_eq!(count(&db, "account_roles").await, 1);
}
