use std::sync::Arc;
use tracing::info;

use crate::config::StorageConfig;
use crate::store::{BookingStore, StoreError, TourStore};

/// Обе коллекции приложения. Клонируется дешево.
#[derive(Clone)]
pub struct Database {
    pub tours: Arc<TourStore>,
    pub bookings: Arc<BookingStore>,
}

impl Database {
    pub async fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .map_err(|source| StoreError::Io { path: config.data_dir.clone(), source })?;

        let db = Database {
            tours: Arc::new(TourStore::new(config.tours_path())),
            bookings: Arc::new(BookingStore::new(config.bookings_path())),
        };

        // Проверяем, что существующие файлы читаются, до старта сервера
        let tours = db.tours.list().await?;
        let bookings = db.bookings.list().await?;
        info!(
            "Storage opened at {}: {} tours, {} bookings",
            config.data_dir.display(),
            tours.len(),
            bookings.len()
        );

        Ok(db)
    }
}
