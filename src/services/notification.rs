//! Уведомления администратора о новых бронированиях.
//!
//! Отправка best-effort: ошибка уведомления логируется и никак не влияет
//! на результат бронирования.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::NotificationConfig;
use crate::models::{Booking, Tour};

#[derive(Debug, thiserror::Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_created(&self, booking: &Booking, tour: Option<&Tour>) -> Result<(), NotifyError>;
}

/// Текст сообщения для администратора.
pub fn render_message(booking: &Booking, tour: Option<&Tour>) -> String {
    let special = if booking.special_requests.is_empty() {
        "None"
    } else {
        booking.special_requests.as_str()
    };

    format!(
        "New Tour Booking!\n\n\
         Tour: {}\n\
         Customer: {}\n\
         Email: {}\n\
         Phone: {}\n\
         People: {}\n\
         Date/Time: {}\n\n\
         Special Requests: {}\n\n\
         Booking ID: {}",
        tour.map(|t| t.title.as_str()).unwrap_or("Unknown"),
        booking.user_name,
        booking.user_email,
        booking.user_phone,
        booking.number_of_people,
        booking.preferred_date_time,
        special,
        booking.booking_id,
    )
}

/// Пишет уведомление в лог для настроенного получателя.
pub struct LogNotifier {
    recipient: String,
}

impl LogNotifier {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self { recipient: recipient.into() }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_created(&self, booking: &Booking, tour: Option<&Tour>) -> Result<(), NotifyError> {
        let message = render_message(booking, tour);
        info!(
            recipient = %self.recipient,
            booking_id = %booking.booking_id,
            "Booking notification:\n{}",
            message
        );
        Ok(())
    }
}

/// Получатель не настроен - молча пропускаем.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn booking_created(&self, booking: &Booking, _tour: Option<&Tour>) -> Result<(), NotifyError> {
        debug!("Notification skipped for booking {}: no recipient configured", booking.booking_id);
        Ok(())
    }
}

pub fn from_config(config: &NotificationConfig) -> Arc<dyn Notifier> {
    match &config.recipient {
        Some(recipient) => Arc::new(LogNotifier::new(recipient.clone())),
        None => Arc::new(DisabledNotifier),
    }
}
