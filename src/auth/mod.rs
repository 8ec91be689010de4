use axum::{routing::post, Router};

use crate::state::AppState;

pub mod claims;
pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod services;

/// Public routes: login and applicant self-signup.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/login", post(handlers::login))
        .route("/applicant/signup", post(handlers::signup))
}
