use std::path::PathBuf;
use tracing::info;

use super::{JsonCollection, StoreError};
use crate::models::Booking;

#[derive(Debug)]
pub struct BookingStore {
    coll: JsonCollection<Booking>,
}

impl BookingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { coll: JsonCollection::new(path) }
    }

    pub async fn list(&self) -> Result<Vec<Booking>, StoreError> {
        self.coll.load().await
    }

    pub async fn append(&self, booking: Booking) -> Result<(), StoreError> {
        let id = booking.booking_id.clone();
        self.coll
            .mutate(move |bookings| {
                bookings.push(booking);
                Ok(())
            })
            .await?;
        info!("Booking {} saved", id);
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, StoreError> {
        Ok(self.list().await?.into_iter().find(|b| b.booking_id == id))
    }

    /// Сменить статус оплаты. Остальные поля и записи не меняются.
    pub async fn update_payment_status(&self, id: &str, status: &str) -> Result<Booking, StoreError> {
        let updated = self
            .coll
            .mutate(|bookings| {
                let booking = bookings
                    .iter_mut()
                    .find(|b| b.booking_id == id)
                    .ok_or_else(|| not_found(id))?;
                booking.payment_status = Some(status.to_string());
                Ok(booking.clone())
            })
            .await?;
        info!("Booking {} payment status -> {}", id, status);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<Booking, StoreError> {
        let removed = self
            .coll
            .mutate(|bookings| {
                let pos = bookings
                    .iter()
                    .position(|b| b.booking_id == id)
                    .ok_or_else(|| not_found(id))?;
                Ok(bookings.remove(pos))
            })
            .await?;
        info!("Booking {} deleted", id);
        Ok(removed)
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound { kind: "Booking", id: id.to_string() }
}
