use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::auth::middleware::protect;
use crate::db::models::{Certification, Education, Experience, PhoneNumber, Project};
use crate::state::AppState;

pub mod aggregate;
pub mod dto;
pub mod entries;
pub mod handlers;

use entries::ProfileEntry;
use handlers::{create_entry, delete_entry, list_entries, update_entry};

fn entry_routes<E: ProfileEntry>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router
        .route(path, get(list_entries::<E>).post(create_entry::<E>))
        .route(
            &format!("{path}/:id"),
            put(update_entry::<E>).delete(delete_entry::<E>),
        )
}

/// The caller's own profile. Any authenticated role may use it.
pub fn router(state: &AppState) -> Router<AppState> {
    let mut routes = Router::new().route("/user/profile", get(handlers::get_profile));
    routes = entry_routes::<PhoneNumber>(routes, "/user/profile/phone-numbers");
    routes = entry_routes::<Education>(routes, "/user/profile/education");
    routes = entry_routes::<Experience>(routes, "/user/profile/experience");
    routes = entry_routes::<Certification>(routes, "/user/profile/certifications");
    routes = entry_routes::<Project>(routes, "/user/profile/projects");
    let routes = routes
        .route(
            "/user/profile/skills",
            get(handlers::list_skills).post(handlers::add_skills),
        )
        .route("/user/profile/skills/:skill_id", delete(handlers::remove_skill));
    protect(routes, state)
}
