use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Статус оплаты новой брони. Админ может выставить любой другой.
pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_PAID: &str = "paid";

/// Запись в `bookings.json`.
///
/// Старые записи бывают без `booking_time` и `payment_status`: такие поля
/// остаются `None` и не появляются в файле при перезаписи. Незнакомые ключи
/// сохраняются в `extra` и пишутся обратно.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Booking {
    pub booking_id: String,
    pub tour_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub number_of_people: u32,
    pub preferred_date_time: String,
    pub special_requests: String,
    // ISO-8601; старые записи могут быть без таймзоны
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Проверенные и нормализованные данные заявки, еще без id и времени.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub tour_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub number_of_people: u32,
    pub preferred_date_time: String,
    pub special_requests: String,
}

impl Booking {
    pub fn from_draft(draft: BookingDraft, now: DateTime<Utc>) -> Self {
        Booking {
            booking_id: Uuid::new_v4().to_string(),
            tour_id: draft.tour_id,
            user_name: draft.user_name,
            user_email: draft.user_email,
            user_phone: draft.user_phone,
            number_of_people: draft.number_of_people,
            preferred_date_time: draft.preferred_date_time,
            special_requests: draft.special_requests,
            booking_time: Some(now.to_rfc3339()),
            payment_status: Some(PAYMENT_PENDING.to_string()),
            extra: Map::new(),
        }
    }

    /// Статус оплаты; запись без статуса считается неоплаченной.
    pub fn payment_status(&self) -> &str {
        self.payment_status.as_deref().unwrap_or(PAYMENT_PENDING)
    }

    /// Время создания брони. `None`, если строку не удалось разобрать.
    pub fn booked_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.booking_time.as_deref()?.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        // Наивное время считаем UTC
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
