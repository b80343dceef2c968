use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::users::repo_types::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already exists: {0}")]
    DuplicateEmail(String),

    #[error("user not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store poisoned")]
    Poisoned,
}

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<User, StoreError>;
    /// All users, oldest first.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.db.begin().await?;

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING id, username, email, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(u) => u,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::DuplicateEmail(new_user.email));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        debug!(user_id = user.id, "user inserted");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// Process-local store with the same semantics as the Postgres one.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateEmail(new_user.email));
        }
        let user = User {
            id: users.last().map_or(1, |u| u.id + 1),
            username: new_user.username,
            email: new_user.email,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let store = MemoryUserStore::new();
        let a = store.create(new_user("jesus", "jesus@gmail.com")).await.unwrap();
        let b = store.create(new_user("jesus1", "jesus1@gmail.com")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(b.created_at >= a.created_at);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        store.create(new_user("jesus", "jesus@gmail.com")).await.unwrap();
        let err = store
            .create(new_user("other", "jesus@gmail.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(ref e) if e == "jesus@gmail.com"));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_by_id_missing_is_not_found() {
        let store = MemoryUserStore::new();
        let err = store.get_by_id(999).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn list_all_keeps_insertion_order() {
        let store = MemoryUserStore::new();
        store.create(new_user("b", "b@example.com")).await.unwrap();
        store.create(new_user("a", "a@example.com")).await.unwrap();
        let names: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    mod postgres {
        use super::*;

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "needs a Postgres DATABASE_URL"]
        async fn create_returns_stored_row(pool: PgPool) {
            let store = PgUserStore::new(pool);
            let before = OffsetDateTime::now_utc() - time::Duration::minutes(1);
            let user = store.create(new_user("jesus", "jesus@gmail.com")).await.unwrap();
            assert!(user.id > 0);
            assert_eq!(user.username, "jesus");
            assert_eq!(user.email, "jesus@gmail.com");
            assert!(user.created_at > before);

            let fetched = store.get_by_id(user.id).await.unwrap();
            assert_eq!(fetched, user);
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "needs a Postgres DATABASE_URL"]
        async fn create_rejects_duplicate_email(pool: PgPool) {
            let store = PgUserStore::new(pool);
            store.create(new_user("jesus", "jesus@gmail.com")).await.unwrap();
            let err = store
                .create(new_user("other", "jesus@gmail.com"))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::DuplicateEmail(ref e) if e == "jesus@gmail.com"));
            assert_eq!(store.list_all().await.unwrap().len(), 1);
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "needs a Postgres DATABASE_URL"]
        async fn get_by_id_missing_is_not_found(pool: PgPool) {
            let store = PgUserStore::new(pool);
            let err = store.get_by_id(999).await.unwrap_err();
            assert!(matches!(err, StoreError::NotFound));
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "needs a Postgres DATABASE_URL"]
        async fn list_all_keeps_insertion_order(pool: PgPool) {
            let store = PgUserStore::new(pool);
            store.create(new_user("jesus", "jesus@gmail.com")).await.unwrap();
            store.create(new_user("jesus1", "jesus1@gmail.com")).await.unwrap();
            let users = store.list_all().await.unwrap();
            let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
            assert_eq!(names, vec!["jesus", "jesus1"]);
            assert!(users[0].id < users[1].id);
        }
    }
}
