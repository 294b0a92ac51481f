//! store
//!
//! Хранилище на плоских JSON-файлах. Каждая коллекция - один файл с массивом
//! объектов, который целиком перезаписывается при любом изменении.
//!
//! - Отсутствующий файл читается как пустая коллекция.
//! - Запись идет во временный файл рядом с целевым, затем `rename` поверх него,
//!   поэтому оборванная запись не оставляет полуфайл.
//! - На каждую коллекцию один писатель: `mutate` держит мьютекс на весь цикл
//!   "прочитать - изменить - записать". Чтение мьютекс не берет.

use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

pub mod bookings;
pub mod tours;

pub use bookings::BookingStore;
pub use tours::TourStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Коллекция записей `T` в одном JSON-файле.
#[derive(Debug)]
pub struct JsonCollection<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Прочитать всю коллекцию.
    pub async fn load(&self) -> Result<Vec<T>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io { path: self.path.clone(), source });
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Перезаписать коллекцию целиком.
    pub async fn save(&self, items: &[T]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_all(items).await
    }

    /// Загрузить, изменить и записать обратно под мьютексом коллекции.
    ///
    /// Если `f` вернула ошибку, файл не трогаем.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let result = f(&mut items)?;
        self.write_all(&items).await?;
        Ok(result)
    }

    async fn write_all(&self, items: &[T]) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io { path: self.path.clone(), source };

        let json = serde_json::to_vec_pretty(items).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &json).await.map_err(io_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }

        debug!("Wrote {} records to {}", items.len(), self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
