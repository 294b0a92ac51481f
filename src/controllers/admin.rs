//! admin.rs
//!
//! Админка: вход/выход, сводка, управление турами и бронированиями.
//!
//! Ответы в стиле flash-сообщений: `{"success": true, "message": ...}`
//! плюс данные там, где они нужны. Все маршруты, кроме входа, требуют
//! `AdminSession`.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{ApiResult, AppError},
    middleware::{self, AdminSession},
    models::{booking::PAYMENT_PENDING, Booking, Tour, TourForm},
    store::StoreError,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/login", post(login))
        .route("/admin/logout", post(logout))
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/tours", get(list_tours).post(add_tour))
        .route("/admin/tours/edit/{tour_id}", post(edit_tour))
        .route("/admin/tours/delete/{tour_id}", post(delete_tour))
        .route("/admin/bookings", get(list_bookings))
        .route("/admin/bookings/delete/{booking_id}", post(delete_booking))
        .route("/admin/bookings/update-payment/{booking_id}", post(update_payment_status))
}

fn flash(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": message.into() }))
}

// NotFound из хранилища превращаем в сообщение для админа
fn not_found_as(message: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |e| {
        if e.is_not_found() {
            AppError::NotFound(message.to_string())
        } else {
            AppError::Store(e)
        }
    }
}

/* ---------- Сессия ---------- */

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: Option<String>,
    password: Option<String>,
}

// POST /api/admin/login
async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> ApiResult<impl IntoResponse> {
    let username = form.username.unwrap_or_default();
    let password = form.password.unwrap_or_default();

    if !middleware::verify_credentials(&state.config.admin, &username, &password) {
        warn!("Failed admin login attempt for '{}'", username);
        return Err(AppError::InvalidCredentials);
    }

    let token = middleware::issue_token(&state.config.session, &username)?;
    let secure = !state.config.app.is_development();
    let cookie = middleware::session_cookie(&token, &state.config.session, secure);
    info!("Admin '{}' logged in", username);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true, "message": "Logged in", "token": token })),
    ))
}

// POST /api/admin/logout
async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let secure = !state.config.app.is_development();
    (
        [(header::SET_COOKIE, middleware::clear_session_cookie(secure))],
        flash("Logged out"),
    )
}

/* ---------- Сводка ---------- */

#[derive(Debug, Serialize)]
struct DashboardResponse {
    tours_count: usize,
    bookings_count: usize,
    recent_bookings_count: usize,
    tours: Vec<Tour>,
    bookings: Vec<Booking>,
}

/// Сколько броней создано за последние 7 дней. Нечитаемые даты пропускаем.
pub fn count_recent(bookings: &[Booking], now: chrono::DateTime<Utc>) -> usize {
    let week_ago = now - Duration::days(7);
    bookings
        .iter()
        .filter_map(Booking::booked_at)
        .filter(|ts| *ts >= week_ago)
        .count()
}

// GET /api/admin/dashboard
async fn dashboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> ApiResult<Json<DashboardResponse>> {
    let tours = state.db.tours.list().await?;
    let bookings = state.db.bookings.list().await?;

    Ok(Json(DashboardResponse {
        tours_count: tours.len(),
        bookings_count: bookings.len(),
        recent_bookings_count: count_recent(&bookings, Utc::now()),
        tours,
        bookings,
    }))
}

/* ---------- Туры ---------- */

// GET /api/admin/tours
async fn list_tours(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> ApiResult<Json<Vec<Tour>>> {
    Ok(Json(state.db.tours.list().await?))
}

// POST /api/admin/tours
async fn add_tour(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Form(form): Form<TourForm>,
) -> ApiResult<impl IntoResponse> {
    let tour = form
        .into_new_tour()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.db.tours.append(tour.clone()).await?;
    info!("Admin '{}' added tour {}", admin.username, tour.id);

    Ok(Json(json!({
        "success": true,
        "message": "Tour added successfully!",
        "tour": tour,
    })))
}

// POST /api/admin/tours/edit/{tour_id}
async fn edit_tour(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(tour_id): Path<String>,
    Form(form): Form<TourForm>,
) -> ApiResult<impl IntoResponse> {
    let edit = form
        .into_edit()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let tour = state
        .db
        .tours
        .update(&tour_id, move |tour| edit.apply_to(tour))
        .await
        .map_err(not_found_as("Tour not found"))?;
    info!("Admin '{}' updated tour {}", admin.username, tour_id);

    Ok(Json(json!({
        "success": true,
        "message": "Tour updated successfully!",
        "tour": tour,
    })))
}

// POST /api/admin/tours/delete/{tour_id}
async fn delete_tour(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(tour_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .db
        .tours
        .delete(&tour_id)
        .await
        .map_err(not_found_as("Tour not found"))?;
    info!("Admin '{}' deleted tour {}", admin.username, tour_id);

    Ok(flash("Tour deleted successfully!"))
}

/* ---------- Бронирования ---------- */

// GET /api/admin/bookings
async fn list_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> ApiResult<Json<Vec<Booking>>> {
    Ok(Json(state.db.bookings.list().await?))
}

// POST /api/admin/bookings/delete/{booking_id}
async fn delete_booking(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(booking_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .db
        .bookings
        .delete(&booking_id)
        .await
        .map_err(not_found_as("Booking not found"))?;
    info!("Admin '{}' deleted booking {}", admin.username, booking_id);

    Ok(flash("Booking deleted successfully!"))
}

#[derive(Debug, Deserialize)]
struct PaymentStatusForm {
    payment_status: Option<String>,
}

// POST /api/admin/bookings/update-payment/{booking_id}
async fn update_payment_status(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(booking_id): Path<String>,
    Form(form): Form<PaymentStatusForm>,
) -> ApiResult<impl IntoResponse> {
    let status = match form.payment_status {
        None => PAYMENT_PENDING.to_string(),
        Some(s) if s.trim().is_empty() => {
            return Err(AppError::BadRequest("Payment status must not be empty".to_string()));
        }
        Some(s) => s.trim().to_string(),
    };

    let booking = state
        .db
        .bookings
        .update_payment_status(&booking_id, &status)
        .await
        .map_err(not_found_as("Booking not found"))?;
    info!("Admin '{}' set booking {} payment status to {}", admin.username, booking_id, status);

    Ok(Json(json!({
        "success": true,
        "message": format!("Payment status updated to {}!", status),
        "booking": booking,
    })))
}
