use std::path::PathBuf;
use tracing::info;

use super::{JsonCollection, StoreError};
use crate::models::Tour;

/// Туры. Уникальность `id` не проверяется: поиск берет первое совпадение,
/// удаление убирает все записи с этим `id`.
#[derive(Debug)]
pub struct TourStore {
    coll: JsonCollection<Tour>,
}

impl TourStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { coll: JsonCollection::new(path) }
    }

    pub async fn list(&self) -> Result<Vec<Tour>, StoreError> {
        self.coll.load().await
    }

    pub async fn find(&self, id: &str) -> Result<Option<Tour>, StoreError> {
        Ok(self.list().await?.into_iter().find(|t| t.id == id))
    }

    pub async fn append(&self, tour: Tour) -> Result<(), StoreError> {
        let id = tour.id.clone();
        self.coll
            .mutate(move |tours| {
                tours.push(tour);
                Ok(())
            })
            .await?;
        info!("Tour {} added", id);
        Ok(())
    }

    pub async fn replace_all(&self, tours: &[Tour]) -> Result<(), StoreError> {
        self.coll.save(tours).await
    }

    /// Изменить первый тур с данным `id`.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<Tour, StoreError>
    where
        F: FnOnce(&mut Tour),
    {
        let updated = self
            .coll
            .mutate(|tours| {
                let tour = tours
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| not_found(id))?;
                f(tour);
                Ok(tour.clone())
            })
            .await?;
        info!("Tour {} updated", id);
        Ok(updated)
    }

    /// Удалить все туры с данным `id`. Бронирования не трогаем.
    pub async fn delete(&self, id: &str) -> Result<usize, StoreError> {
        let removed = self
            .coll
            .mutate(|tours| {
                let before = tours.len();
                tours.retain(|t| t.id != id);
                match before - tours.len() {
                    0 => Err(not_found(id)),
                    n => Ok(n),
                }
            })
            .await?;
        info!("Tour {} deleted ({} records)", id, removed);
        Ok(removed)
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound { kind: "Tour", id: id.to_string() }
}
