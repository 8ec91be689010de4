use axum::{
    routing::{patch, post},
    Router,
};

use crate::auth::middleware::restrict;
use crate::db::models::Role;
use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod services;

/// Account and company management; every route requires an admin token.
pub fn router(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/admin/create-admin", post(handlers::create_admin))
        .route("/admin/create-recruiter", post(handlers::create_recruiter))
        .route("/admin/company", post(handlers::create_company))
        .route(
            "/admin/company/:id",
            patch(handlers::update_company).delete(handlers::delete_company),
        );
    restrict(routes, state, Role::Admin)
}
