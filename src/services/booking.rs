//! booking.rs
//!
//! Жизненный цикл новой брони: проверка заявки, сохранение, уведомление
//! администратора и выбор ссылки на оплату.

use chrono::Utc;
use tracing::{error, info, warn};

use super::validation::{validate_submission, BookingSubmission};
use crate::{
    models::{Booking, Tour},
    store::StoreError,
    AppState,
};

#[derive(Debug)]
pub enum BookingOutcome {
    /// Заявка не прошла проверку, ничего не сохранено.
    Rejected(Vec<String>),
    /// Не удалось прочитать туры или записать бронь.
    StorageFailed(StoreError),
    Created { booking: Booking, payment_url: String },
}

pub async fn submit_booking(state: &AppState, submission: &BookingSubmission) -> BookingOutcome {
    let tours = match state.db.tours.list().await {
        Ok(tours) => tours,
        Err(e) => {
            error!("submit_booking: не удалось прочитать туры: {}", e);
            return BookingOutcome::StorageFailed(e);
        }
    };

    let draft = match validate_submission(submission, &tours) {
        Ok(draft) => draft,
        Err(errors) => {
            info!("Booking rejected: {}", errors.join("; "));
            return BookingOutcome::Rejected(errors);
        }
    };

    let booking = Booking::from_draft(draft, Utc::now());
    if let Err(e) = state.db.bookings.append(booking.clone()).await {
        error!("submit_booking: не удалось сохранить бронь: {}", e);
        return BookingOutcome::StorageFailed(e);
    }

    let tour = tours.iter().find(|t| t.id == booking.tour_id);

    // Уведомление не критично
    if let Err(e) = state.notifier.booking_created(&booking, tour).await {
        warn!("Booking {}: {}", booking.booking_id, e);
    }

    let payment_url = Tour::payment_url(tour, &state.config.payment.default_url).to_string();
    info!(
        "Booking {} created for tour {} ({} people)",
        booking.booking_id, booking.tour_id, booking.number_of_people
    );

    BookingOutcome::Created { booking, payment_url }
}
