use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

/// An authenticated session: the signed token plus who it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    keys: JwtKeys,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: String,
        display_name: Option<String>,
        password: String,
    ) -> Result<User, DomainError> {
        let hash =
            hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(username, display_name, hash);
        self.repo.create(user).await
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session, DomainError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))?;

        Ok(Session {
            token,
            expires_in: self.keys.ttl_seconds(),
            user,
        })
    }

    /// Resolves a session token to the id of a user that still exists.
    pub async fn current_identity(&self, session: &str) -> Result<Uuid, DomainError> {
        let claims = self.keys.verify_token(session).map_err(|err| {
            debug!("rejected session token: {}", err);
            DomainError::Unauthenticated
        })?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthenticated)?;

        match self.repo.find_by_id(user_id).await? {
            Some(user) => Ok(user.id),
            None => Err(DomainError::Unauthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::user_repository::SqliteUserRepository;
    use crate::infrastructure::database::test_pool;
    use chrono::Duration;

    async fn service() -> AuthService<SqliteUserRepository> {
        let repo = Arc::new(SqliteUserRepository::new(test_pool().await));
        AuthService::new(repo, JwtKeys::new("test-secret".into(), Duration::hours(1)))
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let auth = service().await;
        let user = auth
            .register("carol".into(), Some("Carol".into()), "password1".into())
            .await
            .unwrap();
        assert_ne!(user.password_hash, "password1");

        let session = auth.authenticate("carol", "password1").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(session.expires_in, 3600);
        assert_eq!(auth.current_identity(&session.token).await.unwrap(), user.id);
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let auth = service().await;
        auth.register("dave".into(), None, "pw".into()).await.unwrap();
        let err = auth
            .register("dave".into(), None, "pw2".into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserAlreadyExists(_)));
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_user_is_invalid_credentials() {
        let auth = service().await;
        auth.register("erin".into(), None, "right".into()).await.unwrap();

        assert!(matches!(
            auth.authenticate("erin", "wrong").await,
            Err(DomainError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("nobody", "right").await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unknown_or_forged_session_is_unauthenticated() {
        let auth = service().await;
        assert!(matches!(
            auth.current_identity("not-a-token").await,
            Err(DomainError::Unauthenticated)
        ));

        // Valid signature, but the user was never stored.
        let token = auth.keys().generate_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            auth.current_identity(&token).await,
            Err(DomainError::Unauthenticated)
        ));
    }
}
