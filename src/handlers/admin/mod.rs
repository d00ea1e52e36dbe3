mod licenses;

pub use licenses::*;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::db::AppState;
use crate::middleware::admin_auth;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/licenses", post(create_license).get(list_licenses))
        .route("/admin/license/{license_key}", get(get_license))
        .route("/admin/deactivate/{license_key}", post(deactivate_license))
        .layer(middleware::from_fn_with_state(state, admin_auth))
}
