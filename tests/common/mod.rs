#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use tour_booking::{
    app,
    config::{
        AdminConfig, AppConfig, Config, LogFormat, NotificationConfig, PaymentConfig,
        SessionConfig, StorageConfig,
    },
    models::{Booking, Tour},
    services::notification::{Notifier, NotifyError},
    AppState,
};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct horse";
pub const DEFAULT_PAYMENT_URL: &str = "https://pay.example.com/default";

pub fn test_config() -> Config {
    let data_dir = std::env::temp_dir().join(format!("tour-booking-it-{}", uuid::Uuid::new_v4()));
    Config {
        app: AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            environment: "test".into(),
            rust_log: "tour_booking=debug".into(),
            log_format: LogFormat::Text,
        },
        storage: StorageConfig {
            data_dir,
            tours_file: "tours.json".into(),
            bookings_file: "bookings.json".into(),
        },
        admin: AdminConfig { username: ADMIN_USER.into(), password: ADMIN_PASS.into() },
        session: SessionConfig { secret: "integration-secret".into(), expires_in_hours: 1 },
        payment: PaymentConfig { default_url: DEFAULT_PAYMENT_URL.into() },
        notification: NotificationConfig { recipient: None },
    }
}

/// Запоминает все уведомления.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, Option<String>)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn booking_created(&self, booking: &Booking, tour: Option<&Tour>) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((booking.booking_id.clone(), tour.map(|t| t.title.clone())));
        Ok(())
    }
}

/// Всегда падает.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn booking_created(&self, _booking: &Booking, _tour: Option<&Tour>) -> Result<(), NotifyError> {
        Err(NotifyError("provider unavailable".into()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub data_dir: PathBuf,
}

impl TestApp {
    pub async fn new(notifier: Arc<dyn Notifier>) -> Self {
        let config = test_config();
        let data_dir = config.storage.data_dir.clone();
        let state = AppState::with_notifier(config, notifier).await.unwrap();
        Self { router: app(state.clone()), state, data_dir }
    }

    /// Приложение поверх файлов, записанных заранее (например, старой версией сайта).
    pub async fn with_files(tours_json: &str, bookings_json: &str) -> Self {
        let config = test_config();
        let data_dir = config.storage.data_dir.clone();
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(config.storage.tours_path(), tours_json).unwrap();
        std::fs::write(config.storage.bookings_path(), bookings_json).unwrap();

        let state = AppState::with_notifier(config, Arc::new(RecordingNotifier::default()))
            .await
            .unwrap();
        Self { router: app(state.clone()), state, data_dir }
    }

    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.data_dir.join(name)).unwrap()
    }

    pub async fn with_tours(tours: &[Tour]) -> Self {
        let app = Self::new(Arc::new(RecordingNotifier::default())).await;
        app.state.db.tours.replace_all(tours).await.unwrap();
        app
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str, auth: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        json_of(self.send(req.body(Body::empty()).unwrap()).await).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        auth: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        json_of(self.send(form_request(uri, fields, auth)).await).await
    }

    /// Войти и вернуть заголовок `Authorization: Bearer ...`.
    pub async fn login(&self) -> String {
        let (status, body) = self
            .post_form("/api/admin/login", &[("username", ADMIN_USER), ("password", ADMIN_PASS)], None)
            .await;
        assert_eq!(status, StatusCode::OK);
        format!("Bearer {}", body["token"].as_str().unwrap())
    }
}

pub fn form_request(uri: &str, fields: &[(&str, &str)], auth: Option<&str>) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).unwrap();
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(auth) = auth {
        req = req.header(header::AUTHORIZATION, auth);
    }
    req.body(Body::from(body)).unwrap()
}

pub const MULTIPART_BOUNDARY: &str = "----tour-booking-boundary";

/// Тело как у браузерного `FormData`.
pub fn multipart_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            MULTIPART_BOUNDARY, name, value
        ));
    }
    body.push_str(&format!("--{}--\r\n", MULTIPART_BOUNDARY));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn json_of(resp: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn tour(id: &str, title: &str, link: Option<&str>) -> Tour {
    Tour {
        id: id.into(),
        title: title.into(),
        short_description: format!("{} in one day", title),
        price: 35,
        duration: "6 hours".into(),
        languages: vec!["English".into(), "Albanian".into()],
        paypal_link: link.map(str::to_string),
        ..Default::default()
    }
}

// Записи в том виде, в каком их пишет json.dump(indent=2) старой версии сайта
pub const LEGACY_TOUR_BERAT: &str = r#"  {
    "id": "berat",
    "title": "Berat Day Trip",
    "short_description": "UNESCO town of a thousand windows",
    "long_description": "",
    "price": 40,
    "duration": "8 hours",
    "starting_point": "Tirana",
    "schedule": [
      "08:00 Departure",
      "10:30 Castle"
    ],
    "images": [],
    "highlights": [],
    "included": [],
    "meeting_point_details": "",
    "languages": [
      "English",
      "Italian"
    ],
    "paypal_link": "",
    "featured": true
  }"#;

pub const LEGACY_TOUR_KRUJA: &str = r#"  {
    "id": "kruja",
    "title": "Kruja Castle",
    "short_description": "",
    "long_description": "",
    "price": 35,
    "duration": "5 hours",
    "starting_point": "Tirana",
    "schedule": [],
    "images": [],
    "highlights": [],
    "included": [],
    "meeting_point_details": "",
    "languages": [
      "English"
    ],
    "paypal_link": "https://pay.example.com/kruja"
  }"#;

// Без payment_status, с наивным временем и лишним полем
pub const LEGACY_BOOKING: &str = r#"  {
    "booking_id": "legacy-0001",
    "tour_id": "berat",
    "user_name": "Old Customer",
    "user_email": "old@example.com",
    "user_phone": "+355 69 000 0001",
    "number_of_people": 4,
    "preferred_date_time": "2024-06-01 10:00",
    "special_requests": "",
    "booking_time": "2024-05-20T09:12:44.120391",
    "notes": "keep me"
  }"#;

pub fn json_array(blocks: &[&str]) -> String {
    format!("[\n{}\n]", blocks.join(",\n"))
}
