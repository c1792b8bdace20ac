use crate::AppAuthService;
use crate::application::auth_service::Session;
use crate::domain::error::DomainError;
use crate::infrastructure::config::AppConfig;
use crate::presentation::dto::{AuthResponse, IdentityResponse, LoginRequest, RegisterRequest};
use crate::presentation::utils::{
    AuthenticatedUser, expired_session_cookie, request_id, session_cookie,
};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Scope, get, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(register)
        .service(login)
        .service(logout)
        .service(me)
}

fn session_response(status: StatusCode, session: Session, config: &AppConfig) -> HttpResponse {
    let cookie = session_cookie(
        session.token.clone(),
        session.expires_in,
        config.cookie_secure,
    );
    HttpResponse::build(status).cookie(cookie).json(AuthResponse {
        user: session.user,
        access_token: session.token,
        expires_in: session.expires_in,
        token_type: "Bearer".to_string(),
    })
}

#[post("/register")]
pub async fn register(
    req: HttpRequest,
    service: web::Data<AppAuthService>,
    config: web::Data<AppConfig>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    let RegisterRequest {
        username,
        password,
        display_name,
    } = payload.into_inner();

    let user = service
        .register(username.clone(), display_name, password.clone())
        .await?;
    info!(request_id = %request_id(&req), user_id = %user.id, username = %user.username, "user registered");

    let session = service.authenticate(&username, &password).await?;
    Ok(session_response(StatusCode::CREATED, session, &config))
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    service: web::Data<AppAuthService>,
    config: web::Data<AppConfig>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let session = service
        .authenticate(&payload.username, &payload.password)
        .await?;
    info!(request_id = %request_id(&req), user_id = %session.user.id, "user logged in");

    Ok(session_response(StatusCode::OK, session, &config))
}

#[post("/logout")]
pub async fn logout(config: web::Data<AppConfig>) -> HttpResponse {
    HttpResponse::NoContent()
        .cookie(expired_session_cookie(config.cookie_secure))
        .finish()
}

#[get("/me")]
pub async fn me(
    user: AuthenticatedUser,
    service: web::Data<AppAuthService>,
) -> Result<HttpResponse, DomainError> {
    let user = service.get_user(user.id).await?;
    Ok(HttpResponse::Ok().json(IdentityResponse {
        user_id: user.id,
        username: user.username,
        display_name: user.display_name,
    }))
}
