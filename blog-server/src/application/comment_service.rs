use std::sync::Arc;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::Comment;
use crate::domain::error::{DomainError, ensure_owner};
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    comments: Arc<C>,
    posts: Arc<P>,
}

impl<C, P> CommentService<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    pub fn new(comments: Arc<C>, posts: Arc<P>) -> Self {
        Self { comments, posts }
    }

    async fn ensure_post_exists(&self, post_id: Uuid) -> Result<(), DomainError> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::PostNotFound(post_id)),
        }
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or(DomainError::CommentNotFound(id))
    }

    /// Comments of one post, oldest first.
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        self.ensure_post_exists(post_id).await?;
        self.comments.list_for_post(post_id).await
    }

    #[instrument(skip(self, content))]
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        self.ensure_post_exists(post_id).await?;
        self.comments
            .create(Comment::new(post_id, author, content))
            .await
    }

    #[instrument(skip(self, content))]
    pub async fn update_comment(
        &self,
        id: Uuid,
        actor: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        let comment = self.get_comment(id).await?;
        ensure_owner(comment.author_id, actor)?;

        self.comments
            .update_comment(id, actor, content)
            .await?
            .ok_or(DomainError::CommentNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(&self, id: Uuid, actor: Uuid) -> Result<(), DomainError> {
        let comment = self.get_comment(id).await?;
        ensure_owner(comment.author_id, actor)?;

        if self.comments.delete_comment(id, actor).await? {
            Ok(())
        } else {
            Err(DomainError::CommentNotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::comment_repository::SqliteCommentRepository;
    use crate::data::post_repository::SqlitePostRepository;
    use crate::data::user_repository::{SqliteUserRepository, UserRepository};
    use crate::domain::post::Post;
    use crate::domain::user::User;
    use crate::infrastructure::database::test_pool;

    struct Fixture {
        service: CommentService<SqliteCommentRepository, SqlitePostRepository>,
        posts: Arc<SqlitePostRepository>,
        post_id: Uuid,
        alice: Uuid,
        bob: Uuid,
    }

    async fn setup() -> Fixture {
        let pool = test_pool().await;
        let users = SqliteUserRepository::new(pool.clone());
        let alice = users
            .create(User::new("alice".into(), None, "hash".into()))
            .await
            .unwrap()
            .id;
        let bob = users
            .create(User::new("bob".into(), None, "hash".into()))
            .await
            .unwrap()
            .id;

        let posts = Arc::new(SqlitePostRepository::new(pool.clone()));
        let post = posts
            .create(Post::new(alice, "post".into(), "body".into()))
            .await
            .unwrap();
        let comments = Arc::new(SqliteCommentRepository::new(pool));

        Fixture {
            service: CommentService::new(comments, Arc::clone(&posts)),
            posts,
            post_id: post.id,
            alice,
            bob,
        }
    }

    #[tokio::test]
    async fn comments_are_listed_in_timestamp_order() {
        let fx = setup().await;
        let first = fx
            .service
            .add_comment(fx.post_id, fx.bob, "first".into())
            .await
            .unwrap();
        let second = fx
            .service
            .add_comment(fx.post_id, fx.alice, "second".into())
            .await
            .unwrap();

        let listed = fx.service.list_comments(fx.post_id).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn commenting_on_missing_post_is_not_found() {
        let fx = setup().await;
        let missing = Uuid::new_v4();
        assert!(matches!(
            fx.service.add_comment(missing, fx.bob, "hi".into()).await,
            Err(DomainError::PostNotFound(id)) if id == missing
        ));
        assert!(matches!(
            fx.service.list_comments(missing).await,
            Err(DomainError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn only_author_may_edit_or_delete() {
        let fx = setup().await;
        let comment = fx
            .service
            .add_comment(fx.post_id, fx.bob, "original".into())
            .await
            .unwrap();

        // The post owner is not the comment owner.
        assert!(matches!(
            fx.service
                .update_comment(comment.id, fx.alice, "edited".into())
                .await,
            Err(DomainError::Forbidden)
        ));
        assert!(matches!(
            fx.service.delete_comment(comment.id, fx.alice).await,
            Err(DomainError::Forbidden)
        ));

        let edited = fx
            .service
            .update_comment(comment.id, fx.bob, "edited".into())
            .await
            .unwrap();
        assert_eq!(edited.content, "edited");
        assert_eq!(edited.post_id, fx.post_id);

        fx.service.delete_comment(comment.id, fx.bob).await.unwrap();
        assert!(matches!(
            fx.service.delete_comment(comment.id, fx.bob).await,
            Err(DomainError::CommentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn editing_missing_comment_is_not_found() {
        let fx = setup().await;
        let missing = Uuid::new_v4();
        assert!(matches!(
            fx.service.update_comment(missing, fx.bob, "hello".into()).await,
            Err(DomainError::CommentNotFound(id)) if id == missing
        ));
        assert!(matches!(
            fx.service.delete_comment(missing, fx.bob).await,
            Err(DomainError::CommentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_post_removes_its_comments() {
        let fx = setup().await;
        let comment = fx
            .service
            .add_comment(fx.post_id, fx.bob, "bye".into())
            .await
            .unwrap();

        assert!(fx.posts.delete_post(fx.post_id, fx.alice).await.unwrap());
        assert!(matches!(
            fx.service.get_comment(comment.id).await,
            Err(DomainError::CommentNotFound(_))
        ));
    }
}
