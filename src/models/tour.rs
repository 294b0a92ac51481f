use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use validator::Validate;

/// Тур в том виде, в каком он хранится в `tours.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tour {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub long_description: String,
    pub price: i64,
    pub duration: String,
    pub starting_point: String,
    pub schedule: Vec<String>,
    pub images: Vec<String>,
    pub highlights: Vec<String>,
    pub included: Vec<String>,
    pub meeting_point_details: String,
    pub languages: Vec<String>,
    // Пустая строка в файле = ссылки нет
    #[serde(
        deserialize_with = "empty_string_as_none",
        serialize_with = "none_as_empty_string"
    )]
    pub paypal_link: Option<String>,
    // Ключи, которых модель не знает; пишутся обратно как были
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tour {
    /// Ссылка на оплату тура, либо ссылка по умолчанию.
    pub fn payment_url<'a>(tour: Option<&'a Tour>, default_url: &'a str) -> &'a str {
        tour.and_then(|t| t.paypal_link.as_deref())
            .unwrap_or(default_url)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn none_as_empty_string<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

/// Форма добавления/редактирования тура из админки.
///
/// Списки приходят одним полем: строки расписания, картинок, highlights и
/// included разделяются переводом строки, языки - запятой.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TourForm {
    pub id: Option<String>,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub price: Option<String>,
    pub duration: Option<String>,
    pub starting_point: Option<String>,
    pub schedule: Option<String>,
    pub images: Option<String>,
    pub highlights: Option<String>,
    pub included: Option<String>,
    pub meeting_point_details: Option<String>,
    pub languages: Option<String>,
    #[validate(url(message = "Payment link must be a valid URL"))]
    pub paypal_link: Option<String>,
}

/// Ошибка разбора формы тура; текст уходит администратору как есть.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct TourFormError(pub String);

impl TourForm {
    /// Новый тур. `id` и `title` обязательны.
    pub fn into_new_tour(self) -> Result<Tour, TourFormError> {
        let form = self.normalized();
        form.check_link()?;

        let id = non_blank(&form.id)
            .ok_or_else(|| TourFormError("Tour id is required".to_string()))?;
        let title = non_blank(&form.title)
            .ok_or_else(|| TourFormError("Tour title is required".to_string()))?;
        let price = parse_price(form.price.as_deref())?.unwrap_or(0);

        Ok(Tour {
            id: id.to_string(),
            title: title.to_string(),
            short_description: form.short_description.clone().unwrap_or_default(),
            long_description: form.long_description.clone().unwrap_or_default(),
            price,
            duration: form.duration.clone().unwrap_or_default(),
            starting_point: form.starting_point.clone().unwrap_or_default(),
            schedule: split_lines(form.schedule.as_deref()),
            images: split_lines(form.images.as_deref()),
            highlights: split_lines(form.highlights.as_deref()),
            included: split_lines(form.included.as_deref()),
            meeting_point_details: form.meeting_point_details.clone().unwrap_or_default(),
            languages: split_languages(form.languages.as_deref()),
            paypal_link: form.paypal_link.clone(),
            extra: Map::new(),
        })
    }

    /// Разобрать форму редактирования. Ошибки формы всплывают здесь,
    /// до того как хранилище будет заблокировано под запись.
    pub fn into_edit(self) -> Result<TourEdit, TourFormError> {
        let form = self.normalized();
        form.check_link()?;
        let price = parse_price(form.price.as_deref())?;
        Ok(TourEdit { form, price })
    }

    // Пустую ссылку считаем отсутствующей, иначе validator ругнется на url
    fn normalized(mut self) -> Self {
        self.paypal_link = self.paypal_link.and_then(|l| {
            let l = l.trim().to_string();
            (!l.is_empty()).then_some(l)
        });
        self
    }

    fn check_link(&self) -> Result<(), TourFormError> {
        self.validate().map_err(|errors| {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .next()
                .unwrap_or_else(|| "Invalid tour form".to_string());
            TourFormError(message)
        })
    }
}

/// Проверенная форма редактирования.
#[derive(Debug, Clone)]
pub struct TourEdit {
    form: TourForm,
    price: Option<i64>,
}

impl TourEdit {
    /// Пустые скалярные поля оставляют прежнее значение, списки и ссылка
    /// на оплату заменяются целиком. `id` тура не меняется.
    pub fn apply_to(self, tour: &mut Tour) {
        let form = self.form;
        keep_or_replace(&mut tour.title, &form.title);
        keep_or_replace(&mut tour.short_description, &form.short_description);
        keep_or_replace(&mut tour.long_description, &form.long_description);
        if let Some(price) = self.price {
            tour.price = price;
        }
        keep_or_replace(&mut tour.duration, &form.duration);
        keep_or_replace(&mut tour.starting_point, &form.starting_point);
        tour.schedule = split_lines(form.schedule.as_deref());
        tour.images = split_lines(form.images.as_deref());
        tour.highlights = split_lines(form.highlights.as_deref());
        tour.included = split_lines(form.included.as_deref());
        keep_or_replace(&mut tour.meeting_point_details, &form.meeting_point_details);
        tour.languages = split_languages(form.languages.as_deref());
        tour.paypal_link = form.paypal_link;
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn keep_or_replace(target: &mut String, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        *target = v.to_string();
    }
}

fn parse_price(raw: Option<&str>) -> Result<Option<i64>, TourFormError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => match v.parse::<i64>() {
            Ok(price) if price >= 0 => Ok(Some(price)),
            _ => Err(TourFormError("Price must be a non-negative whole number".to_string())),
        },
    }
}

// Формы из браузера шлют \r\n
fn split_lines(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

fn split_languages(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}
