use crate::AppCommentService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CreateCommentRequest, ListCommentsResponse, UpdateCommentRequest};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use tracing::info;
use uuid::Uuid;

#[get("/posts/{id}/comments")]
pub async fn list_comments(
    comments: web::Data<AppCommentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let comments = comments.list_comments(post_id).await?;

    Ok(HttpResponse::Ok().json(ListCommentsResponse { post_id, comments }))
}

#[post("/posts/{id}/comments")]
pub async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<AppCommentService>,
    path: web::Path<Uuid>,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let comment = comments
        .add_comment(post_id, user.id, payload.into_inner().content)
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        post_id = %post_id,
        comment_id = %comment.id,
        "comment added"
    );

    Ok(HttpResponse::Created().json(comment))
}

#[get("/comments/{id}")]
pub async fn get_comment(
    comments: web::Data<AppCommentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let comment = comments.get_comment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[put("/comments/{id}")]
pub async fn update_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<AppCommentService>,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let comment = comments
        .update_comment(path.into_inner(), user.id, payload.into_inner().content)
        .await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        comment_id = %comment.id,
        "comment updated"
    );

    Ok(HttpResponse::Ok().json(comment))
}

#[delete("/comments/{id}")]
pub async fn delete_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<AppCommentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let comment_id = path.into_inner();
    comments.delete_comment(comment_id, user.id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        comment_id = %comment_id,
        "comment deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
