//! Проверка заявки на бронирование.
//!
//! Все правила прогоняются до конца, ошибки копятся в порядке правил:
//! обязательные поля, формат email, число участников, существование тура.

use serde::Deserialize;
use std::num::IntErrorKind;

use crate::models::{BookingDraft, Tour};

pub const MIN_PEOPLE: i64 = 1;
pub const MAX_PEOPLE: i64 = 20;

pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_PEOPLE_RANGE: &str = "Number of people must be between 1 and 20";
pub const MSG_PEOPLE_NOT_NUMBER: &str = "Number of people must be a valid number";
pub const MSG_INVALID_TOUR: &str = "Invalid tour selected";

/// Поля формы бронирования как они пришли от клиента.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingSubmission {
    pub tour_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub preferred_date_time: Option<String>,
    pub number_of_people: Option<String>,
    pub special_requests: Option<String>,
}

impl BookingSubmission {
    /// Записать поле формы по имени. Незнакомые имена игнорируются,
    /// при повторе остается первое значение.
    pub fn set_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "tour_id" => &mut self.tour_id,
            "user_name" => &mut self.user_name,
            "user_email" => &mut self.user_email,
            "user_phone" => &mut self.user_phone,
            "preferred_date_time" => &mut self.preferred_date_time,
            "number_of_people" => &mut self.number_of_people,
            "special_requests" => &mut self.special_requests,
            _ => return,
        };
        slot.get_or_insert(value);
    }

    fn required_fields(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("tour_id", &self.tour_id),
            ("user_name", &self.user_name),
            ("user_email", &self.user_email),
            ("user_phone", &self.user_phone),
            ("preferred_date_time", &self.preferred_date_time),
            ("number_of_people", &self.number_of_people),
        ]
    }
}

pub fn validate_submission(
    submission: &BookingSubmission,
    tours: &[Tour],
) -> Result<BookingDraft, Vec<String>> {
    let mut errors = Vec::new();

    for (field, value) in submission.required_fields() {
        if trimmed(value).is_empty() {
            errors.push(format!("{} is required", field_label(field)));
        }
    }

    let email = trimmed(&submission.user_email);
    if !email.is_empty() && !is_valid_email(email) {
        errors.push(MSG_INVALID_EMAIL.to_string());
    }

    // Отсутствующее поле считаем нулем, чтобы сработала проверка диапазона
    let raw_people = submission.number_of_people.as_deref().unwrap_or("0");
    let number_of_people = match raw_people.trim().parse::<i64>() {
        Ok(n) if (MIN_PEOPLE..=MAX_PEOPLE).contains(&n) => n as u32,
        Ok(n) => {
            errors.push(MSG_PEOPLE_RANGE.to_string());
            n.clamp(MIN_PEOPLE, MAX_PEOPLE) as u32
        }
        // Число, не влезающее в i64, все равно число: это ошибка диапазона
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            errors.push(MSG_PEOPLE_RANGE.to_string());
            MAX_PEOPLE as u32
        }
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => {
            errors.push(MSG_PEOPLE_RANGE.to_string());
            MIN_PEOPLE as u32
        }
        Err(_) => {
            errors.push(MSG_PEOPLE_NOT_NUMBER.to_string());
            MIN_PEOPLE as u32
        }
    };

    let tour_id = trimmed(&submission.tour_id);
    if !tours.iter().any(|t| t.id == tour_id) {
        errors.push(MSG_INVALID_TOUR.to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(BookingDraft {
        tour_id: tour_id.to_string(),
        user_name: trimmed(&submission.user_name).to_string(),
        user_email: email.to_string(),
        user_phone: trimmed(&submission.user_phone).to_string(),
        number_of_people,
        preferred_date_time: trimmed(&submission.preferred_date_time).to_string(),
        special_requests: trimmed(&submission.special_requests).to_string(),
    })
}

/// `local@domain.tld`: без пробелов, ровно одна `@`, в домене есть точка
/// с непустыми частями по обе стороны.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Точка ищется так, чтобы слева и справа оставалось что-то
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

// "number_of_people" -> "Number Of People"
fn field_label(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}
