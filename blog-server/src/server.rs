use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::data::comment_repository::SqliteCommentRepository;
use crate::data::post_repository::SqlitePostRepository;
use crate::data::user_repository::SqliteUserRepository;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{RequestTracing, SessionMiddleware};
use crate::presentation::utils::{json_error_handler, path_error_handler};
use crate::{AppAuthService, AppCommentService, AppPostService};
use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, Error, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// The services every worker shares.
#[derive(Clone)]
pub struct AppState {
    pub auth: AppAuthService,
    pub posts: AppPostService,
    pub comments: AppCommentService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
        let post_repo = Arc::new(SqlitePostRepository::new(pool.clone()));
        let comment_repo = Arc::new(SqliteCommentRepository::new(pool));

        let keys = JwtKeys::new(
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.session_ttl_hours),
        );

        Self {
            auth: AuthService::new(user_repo, keys),
            posts: PostService::new(Arc::clone(&post_repo)),
            comments: CommentService::new(comment_repo, post_repo),
        }
    }
}

pub fn build_app(
    state: AppState,
    config: AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let cors = build_cors(&config);

    App::new()
        .wrap(SessionMiddleware::new(state.auth.clone()))
        .wrap(RequestTracing)
        .wrap(
            DefaultHeaders::new()
                .add(("X-Content-Type-Options", "nosniff"))
                .add(("Referrer-Policy", "no-referrer"))
                .add(("Permissions-Policy", "geolocation=()"))
                .add(("Cross-Origin-Opener-Policy", "same-origin")),
        )
        .wrap(cors)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(state.auth))
        .app_data(web::Data::new(state.posts))
        .app_data(web::Data::new(state.comments))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health))
                .service(handlers::auth::scope())
                .service(handlers::post::get_posts)
                .service(handlers::post::get_post)
                .service(handlers::post::create_post)
                .service(handlers::post::update_post)
                .service(handlers::post::delete_post)
                .service(handlers::comment::list_comments)
                .service(handlers::comment::add_comment)
                .service(handlers::comment::get_comment)
                .service(handlers::comment::update_comment)
                .service(handlers::comment::delete_comment),
        )
}

pub async fn start_rest_server(state: AppState, config: AppConfig) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(host = %bind_address.0, port = bind_address.1, "HTTP server starting");

    HttpServer::new(move || build_app(state.clone(), config.clone()))
        .bind(bind_address)?
        .run()
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
