pub mod admin;
pub mod bookings;
pub mod tours;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(tours::routes())
        .merge(bookings::routes())
        .merge(admin::routes())
}
