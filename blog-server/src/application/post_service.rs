use std::sync::Arc;

use crate::data::post_repository::PostRepository;
use crate::domain::error::{DomainError, ensure_owner};
use crate::domain::post::{Post, PostChanges};
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService<R: PostRepository + 'static> {
    repo: Arc<R>,
}

impl<R> PostService<R>
where
    R: PostRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    /// All posts, oldest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.repo.list_posts().await
    }

    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        author: Uuid,
        title: String,
        content: String,
    ) -> Result<Post, DomainError> {
        let post = Post::new(author, title, content);
        self.repo.create(post).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update_post(
        &self,
        id: Uuid,
        actor: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let post = self.get_post(id).await?;
        ensure_owner(post.poster_id, actor)?;

        self.repo
            .update_post(id, actor, changes)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: Uuid, actor: Uuid) -> Result<(), DomainError> {
        let post = self.get_post(id).await?;
        ensure_owner(post.poster_id, actor)?;

        if self.repo.delete_post(id, actor).await? {
            Ok(())
        } else {
            Err(DomainError::PostNotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::post_repository::SqlitePostRepository;
    use crate::data::user_repository::{SqliteUserRepository, UserRepository};
    use crate::domain::user::User;
    use crate::infrastructure::database::test_pool;

    async fn setup() -> (PostService<SqlitePostRepository>, Uuid, Uuid) {
        let pool = test_pool().await;
        let users = SqliteUserRepository::new(pool.clone());
        let alice = users
            .create(User::new("alice".into(), None, "hash".into()))
            .await
            .unwrap();
        let bob = users
            .create(User::new("bob".into(), None, "hash".into()))
            .await
            .unwrap();
        let service = PostService::new(Arc::new(SqlitePostRepository::new(pool)));
        (service, alice.id, bob.id)
    }

    #[tokio::test]
    async fn lists_posts_oldest_first() {
        let (service, alice, bob) = setup().await;
        let first = service
            .create_post(alice, "first".into(), "a".into())
            .await
            .unwrap();
        let second = service
            .create_post(bob, "second".into(), "b".into())
            .await
            .unwrap();
        let third = service
            .create_post(alice, "third".into(), "c".into())
            .await
            .unwrap();

        let ids: Vec<Uuid> = service
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn only_owner_may_update() {
        let (service, alice, bob) = setup().await;
        let post = service
            .create_post(alice, "title".into(), "body".into())
            .await
            .unwrap();

        let err = service
            .update_post(
                post.id,
                bob,
                PostChanges {
                    title: Some("hijacked".into()),
                    content: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
        assert_eq!(service.get_post(post.id).await.unwrap().title, "title");

        let updated = service
            .update_post(
                post.id,
                alice,
                PostChanges {
                    title: Some("new title".into()),
                    content: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "new title");
        assert_eq!(updated.content, "body");
        assert!(updated.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn only_owner_may_delete() {
        let (service, alice, bob) = setup().await;
        let post = service
            .create_post(alice, "title".into(), "body".into())
            .await
            .unwrap();

        assert!(matches!(
            service.delete_post(post.id, bob).await,
            Err(DomainError::Forbidden)
        ));
        service.delete_post(post.id, alice).await.unwrap();
        assert!(matches!(
            service.get_post(post.id).await,
            Err(DomainError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let (service, alice, _) = setup().await;
        let missing = Uuid::new_v4();
        assert!(matches!(
            service.delete_post(missing, alice).await,
            Err(DomainError::PostNotFound(id)) if id == missing
        ));
        assert!(matches!(
            service
                .update_post(missing, alice, PostChanges::default())
                .await,
            Err(DomainError::PostNotFound(_))
        ));
    }
}
