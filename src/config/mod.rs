use serde::Deserialize;
use std::env;
use std::path::PathBuf;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub session: SessionConfig,
    pub payment: PaymentConfig,
    pub notification: NotificationConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Локальный запуск: cookie сессии без `Secure`, чтобы работал http://localhost.
    pub fn is_development(&self) -> bool {
        matches!(
            self.environment.trim().to_ascii_lowercase().as_str(),
            "development" | "dev" | "local"
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

// Где лежат JSON-файлы с турами и бронированиями
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub tours_file: String,
    pub bookings_file: String,
}

impl StorageConfig {
    pub fn tours_path(&self) -> PathBuf {
        self.data_dir.join(&self.tours_file)
    }

    pub fn bookings_path(&self) -> PathBuf {
        self.data_dir.join(&self.bookings_file)
    }
}

// Учетные данные администратора
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

// Подпись админской сессии
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub expires_in_hours: i64,
}

// Ссылка на оплату по умолчанию (если у тура нет своей)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub default_url: String,
}

// Получатель уведомлений о новых бронированиях; None - уведомления выключены
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    pub recipient: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "tour_booking=debug,tower_http=debug".to_string()),
                log_format: env::var("LOG_FORMAT")
                    .unwrap_or_else(|_| "text".to_string())
                    .parse()
                    .expect("LOG_FORMAT must be 'text' or 'json'"),
            },
            storage: StorageConfig {
                data_dir: env::var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(".")),
                tours_file: env::var("TOURS_FILE").unwrap_or_else(|_| "tours.json".to_string()),
                bookings_file: env::var("BOOKINGS_FILE")
                    .unwrap_or_else(|_| "bookings.json".to_string()),
            },
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
                password: env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set"),
            },
            session: SessionConfig {
                secret: env::var("SESSION_SECRET").expect("SESSION_SECRET must be set"),
                expires_in_hours: env::var("SESSION_EXPIRES_IN_HOURS")
                    .unwrap_or_else(|_| "12".to_string())
                    .parse()
                    .expect("SESSION_EXPIRES_IN_HOURS must be a valid number"),
            },
            payment: PaymentConfig {
                default_url: env::var("PAYPAL_PAYMENT_URL")
                    .unwrap_or_else(|_| "https://www.paypal.com/ncp/payment".to_string()),
            },
            notification: NotificationConfig {
                recipient: env::var("ADMIN_NOTIFY_RECIPIENT")
                    .ok()
                    .filter(|v| !v.trim().is_empty()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_known_values() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" TEXT ".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn storage_paths_join_data_dir() {
        let storage = StorageConfig {
            data_dir: PathBuf::from("/srv/tours"),
            tours_file: "tours.json".to_string(),
            bookings_file: "bookings.json".to_string(),
        };
        assert_eq!(storage.tours_path(), PathBuf::from("/srv/tours/tours.json"));
        assert_eq!(storage.bookings_path(), PathBuf::from("/srv/tours/bookings.json"));
    }

    #[test]
    fn development_environments_are_recognised() {
        let mut app = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            environment: "development".to_string(),
            rust_log: "info".to_string(),
            log_format: LogFormat::Text,
        };
        assert!(app.is_development());
        app.environment = " Dev ".to_string();
        assert!(app.is_development());
        app.environment = "production".to_string();
        assert!(!app.is_development());
    }
}
