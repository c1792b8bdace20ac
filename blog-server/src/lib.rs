pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod server;

use application::auth_service::AuthService;
use application::comment_service::CommentService;
use application::post_service::PostService;
use data::comment_repository::SqliteCommentRepository;
use data::post_repository::SqlitePostRepository;
use data::user_repository::SqliteUserRepository;

pub type AppAuthService = AuthService<SqliteUserRepository>;
pub type AppPostService = PostService<SqlitePostRepository>;
pub type AppCommentService = CommentService<SqliteCommentRepository, SqlitePostRepository>;
