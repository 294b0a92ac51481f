use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::header,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::warn;

use crate::{
    error::{ApiResult, AppError},
    models::{Booking, Tour},
    services::{
        booking::{submit_booking, BookingOutcome},
        validation::BookingSubmission,
    },
    AppState,
};

pub const MSG_BOOKING_OK: &str = "Booking successful! Redirecting to payment...";
pub const MSG_BOOKING_FAILED: &str =
    "Booking failed due to server error. Please try again or contact us directly.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/book", post(create_booking))
        .route("/bookings/{booking_id}", get(get_booking))
}

/* ---------- POST /api/book ---------- */

#[derive(Debug, Serialize)]
pub struct BookingResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
}

impl BookingResult {
    fn failure(message: String) -> Self {
        Self { success: false, message, payment_url: None, booking_id: None }
    }
}

/// Заявка из формы бронирования.
///
/// Принимает и `application/x-www-form-urlencoded`, и `multipart/form-data`
/// (браузерный `FormData`). Тело, которое не удалось разобрать, считается
/// пустой формой: дальше его отвергнет валидация, а клиент получит 200.
pub struct SubmittedBooking(pub BookingSubmission);

impl<S> FromRequest<S> for SubmittedBooking
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"));

        let parsed = if is_multipart {
            read_multipart(req, state).await
        } else {
            Form::<BookingSubmission>::from_request(req, state)
                .await
                .map(|Form(submission)| submission)
                .map_err(|e| e.to_string())
        };

        match parsed {
            Ok(submission) => Ok(SubmittedBooking(submission)),
            Err(reason) => {
                warn!("Unreadable booking submission: {}", reason);
                Ok(SubmittedBooking(BookingSubmission::default()))
            }
        }
    }
}

async fn read_multipart<S>(req: Request, state: &S) -> Result<BookingSubmission, String>
where
    S: Send + Sync,
{
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|e| e.to_string())?;

    let mut submission = BookingSubmission::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field.text().await.map_err(|e| e.to_string())?;
        submission.set_field(&name, value);
    }
    Ok(submission)
}

// Всегда 200: ошибки заявки отдаются флагом success=false
async fn create_booking(
    State(state): State<Arc<AppState>>,
    SubmittedBooking(submission): SubmittedBooking,
) -> Json<BookingResult> {
    let result = match submit_booking(&state, &submission).await {
        BookingOutcome::Created { booking, payment_url } => BookingResult {
            success: true,
            message: MSG_BOOKING_OK.to_string(),
            payment_url: Some(payment_url),
            booking_id: Some(booking.booking_id),
        },
        BookingOutcome::Rejected(errors) => BookingResult::failure(errors.join("; ")),
        BookingOutcome::StorageFailed(_) => BookingResult::failure(MSG_BOOKING_FAILED.to_string()),
    };
    Json(result)
}

/* ---------- GET /api/bookings/{booking_id} ---------- */

#[derive(Debug, Serialize)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub tour: Option<Tour>,
    pub payment_url: String,
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> ApiResult<Json<BookingConfirmation>> {
    let booking = state
        .db
        .bookings
        .find_by_id(&booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    // Тур мог быть удален после бронирования
    let tour = state.db.tours.find(&booking.tour_id).await?;
    let payment_url = Tour::payment_url(tour.as_ref(), &state.config.payment.default_url).to_string();

    Ok(Json(BookingConfirmation { booking, tour, payment_url }))
}
