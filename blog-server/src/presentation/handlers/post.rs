use crate::domain::error::DomainError;
use crate::domain::post::PostChanges;
use crate::presentation::dto::{CreatePostRequest, ListPostsResponse, PostView};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use crate::{AppCommentService, AppPostService};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use tracing::info;
use uuid::Uuid;

#[get("/posts")]
pub async fn get_posts(
    req: HttpRequest,
    posts: web::Data<AppPostService>,
) -> Result<HttpResponse, DomainError> {
    let posts = posts.list_posts().await?;

    info!(request_id = %request_id(&req), count = posts.len(), "posts retrieved");

    Ok(HttpResponse::Ok().json(ListPostsResponse {
        total: posts.len(),
        posts,
    }))
}

#[get("/posts/{id}")]
pub async fn get_post(
    posts: web::Data<AppPostService>,
    comments: web::Data<AppCommentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let post = posts.get_post(post_id).await?;
    let comments = comments.list_comments(post_id).await?;

    Ok(HttpResponse::Ok().json(PostView { post, comments }))
}

#[post("/posts")]
pub async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<AppPostService>,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let CreatePostRequest { title, content } = payload.into_inner();
    let post = posts.create_post(user.id, title, content).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post.id,
        "post created"
    );

    Ok(HttpResponse::Created().json(post))
}

#[put("/posts/{id}")]
pub async fn update_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<AppPostService>,
    path: web::Path<Uuid>,
    payload: web::Json<PostChanges>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let post = posts
        .update_post(post_id, user.id, payload.into_inner())
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post.id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(post))
}

#[delete("/posts/{id}")]
pub async fn delete_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<AppPostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    posts.delete_post(post_id, user.id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        "post deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
