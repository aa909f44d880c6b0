//! User Repository

use super::{BaseRepository, RepoError, RepoResult, new_key, retry_on_conflict};
use crate::db::models::{User, UserCreate};
use serde::Deserialize;
use shared::models::Role;
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const USER_FIELDS: &str = "record::id(id) AS id, name, email, password_hash, role, created_at";

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by key
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query(format!(
                "SELECT {USER_FIELDS} FROM type::thing('user', $id)"
            ))
            .bind(("id", id.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by (normalized) email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query(format!("SELECT {USER_FIELDS} FROM user WHERE email = $email"))
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Load several users in one query; unknown keys are skipped
    pub async fn find_many(&self, ids: &[String]) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let things: Vec<RecordId> = ids
            .iter()
            .map(|id| RecordId::from_table_key("user", id.clone()))
            .collect();

        let mut result = self
            .base
            .db()
            .query(format!("SELECT {USER_FIELDS} FROM $things"))
            .bind(("things", things))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users)
    }

    /// Create a user; a taken email yields `Duplicate`
    ///
    /// A registration that races another one for the same email conflicts
    /// in storage, is retried, and then sees the winner's row.
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        let key = new_key();
        let (key_ref, data_ref) = (&key, &data);
        retry_on_conflict("user_create", move || self.try_create(key_ref, data_ref)).await?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    async fn try_create(&self, key: &str, data: &UserCreate) -> RepoResult<()> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                data.email
            )));
        }

        self.base
            .db()
            .query(
                r#"CREATE type::thing('user', $key) CONTENT {
                    name: $name,
                    email: $email,
                    password_hash: $password_hash,
                    role: $role,
                    created_at: $now
                } RETURN NONE"#,
            )
            .bind(("key", key.to_string()))
            .bind(("name", data.name.clone()))
            .bind(("email", data.email.clone()))
            .bind(("password_hash", data.password_hash.clone()))
            .bind(("role", data.role.as_str()))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Number of users
    pub async fn count(&self) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM user GROUP ALL")
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    /// Number of users holding `role`
    pub async fn count_by_role(&self, role: Role) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM user WHERE role = $role GROUP ALL")
            .bind(("role", role.as_str()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}
