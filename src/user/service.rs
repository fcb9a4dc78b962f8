use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::UserModel, repository::UserRepository};
use crate::shared::AppError;

/// Result of a registration command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterUserOutcome {
    /// First registration under this identity
    NewUser { name: String },
    /// Identity already known, display name was replaced
    NameChange { name: String, previous: String },
}

/// Service mapping stable user identities to display names
pub struct UserDirectory {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserDirectory {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Registers a user, or renames them when the identity already exists.
    /// Display names are not unique across users.
    #[instrument(skip(self))]
    pub async fn register_or_rename(
        &self,
        user_id: &str,
        requested_name: &str,
    ) -> Result<RegisterUserOutcome, AppError> {
        if let Some(existing) = self.repository.find_user(user_id).await? {
            self.repository.update_user_name(user_id, requested_name).await?;

            info!(
                user_id = %user_id,
                previous = %existing.name,
                name = %requested_name,
                "User renamed"
            );

            return Ok(RegisterUserOutcome::NameChange {
                name: requested_name.to_string(),
                previous: existing.name,
            });
        }

        let user = UserModel::new(user_id.to_string(), requested_name.to_string());
        self.repository.create_user(&user).await?;

        info!(user_id = %user_id, name = %requested_name, "New user registered");

        Ok(RegisterUserOutcome::NewUser {
            name: requested_name.to_string(),
        })
    }

    /// Looks up a user by stable identity
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        self.repository.find_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::repository::InMemoryUserRepository;

    fn directory() -> UserDirectory {
        UserDirectory::new(Arc::new(InMemoryUserRepository::new()))
    }

    #[tokio::test]
    async fn first_registration_creates_new_user() {
        let directory = directory();

        let outcome = directory.register_or_rename("U1", "alice").await.unwrap();

        assert_eq!(
            outcome,
            RegisterUserOutcome::NewUser {
                name: "alice".to_string()
            }
        );
        assert_eq!(directory.get_user("U1").await.unwrap().unwrap().name, "alice");
    }

    #[tokio::test]
    async fn second_registration_renames_and_reports_previous_name() {
        let directory = directory();

        directory.register_or_rename("U1", "alice").await.unwrap();
        let outcome = directory.register_or_rename("U1", "wordle-queen").await.unwrap();

        assert_eq!(
            outcome,
            RegisterUserOutcome::NameChange {
                name: "wordle-queen".to_string(),
                previous: "alice".to_string()
            }
        );
        assert_eq!(
            directory.get_user("U1").await.unwrap().unwrap().name,
            "wordle-queen"
        );
    }

    #[tokio::test]
    async fn duplicate_display_names_are_allowed() {
        let directory = directory();

        directory.register_or_rename("U1", "alice").await.unwrap();
        let outcome = directory.register_or_rename("U2", "alice").await.unwrap();

        assert!(matches!(outcome, RegisterUserOutcome::NewUser { .. }));
    }
}
