use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user directory storage operations
#[async_trait]
pub trait UserRepository {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn update_user_name(&self, user_id: &str, name: &str) -> Result<(), AppError>;
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is stored in memory and will be lost when the application restarts.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated users
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let mut user_map = HashMap::new();
        for user in users {
            user_map.insert(user.id.clone(), user);
        }

        Self {
            users: Mutex::new(user_map),
        }
    }

    /// Returns the current number of registered users
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        let user = users.get(user_id).cloned();

        match &user {
            Some(u) => debug!(user_id = %user_id, name = %u.name, "User found in memory"),
            None => debug!(user_id = %user_id, "User not found in memory"),
        }

        Ok(user)
    }

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, name = %user.name, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User already exists in memory");
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_user_name(&self, user_id: &str, name: &str) -> Result<(), AppError> {
        debug!(user_id = %user_id, name = %name, "Updating user name in memory");

        let mut users = self.users.lock().unwrap();
        match users.get_mut(user_id) {
            Some(user) => {
                user.name = name.to_string();
                Ok(())
            }
            None => {
                warn!(user_id = %user_id, "User not found for rename in memory");
                Err(AppError::NotFound("User not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().cloned().collect())
    }
}

/// PostgreSQL implementation of the user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self))]
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query("SELECT id, name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to fetch user from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|row| UserModel {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, name = %user.name, "Creating user in database");

        sqlx::query("INSERT INTO users (id, name) VALUES ($1, $2)")
            .bind(&user.id)
            .bind(&user.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create user in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_user_name(&self, user_id: &str, name: &str) -> Result<(), AppError> {
        debug!(user_id = %user_id, "Updating user name in database");

        let result = sqlx::query("UPDATE users SET name = $2 WHERE id = $1")
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to update user name in database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user_id, "User not found for rename");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM users")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list users from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(rows
            .into_iter()
            .map(|row| UserModel {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> UserModel {
        UserModel::new(id.to_string(), name.to_string())
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = InMemoryUserRepository::new();

        repo.create_user(&user("U1", "alice")).await.unwrap();

        let found = repo.find_user("U1").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().name, "alice");
    }

    #[tokio::test]
    async fn test_find_nonexistent_user() {
        let repo = InMemoryUserRepository::new();

        let result = repo.find_user("nobody").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_user() {
        let repo = InMemoryUserRepository::new();

        repo.create_user(&user("U1", "alice")).await.unwrap();

        let result = repo.create_user(&user("U1", "impostor")).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_update_user_name() {
        let repo = InMemoryUserRepository::new();

        repo.create_user(&user("U1", "alice")).await.unwrap();
        repo.update_user_name("U1", "alice2").await.unwrap();

        let found = repo.find_user("U1").await.unwrap().unwrap();
        assert_eq!(found.name, "alice2");
    }

    #[tokio::test]
    async fn test_update_nonexistent_user() {
        let repo = InMemoryUserRepository::new();

        let result = repo.update_user_name("nobody", "name").await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_with_users_preloads_repository() {
        let repo =
            InMemoryUserRepository::with_users(vec![user("U1", "alice"), user("U2", "bob")]);

        assert_eq!(repo.user_count(), 2);
        assert!(repo.find_user("U2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_users() {
        let repo =
            InMemoryUserRepository::with_users(vec![user("U1", "alice"), user("U2", "bob")]);

        let users = repo.list_users().await.unwrap();
        assert_eq!(users.len(), 2);

        let ids: std::collections::HashSet<String> = users.iter().map(|u| u.id.clone()).collect();
        assert!(ids.contains("U1"));
        assert!(ids.contains("U2"));
    }
}
