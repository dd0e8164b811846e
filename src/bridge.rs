//! Сохранение последнего индекса субтитра
//!
//! Мост записывает текущий индекс в поле `last_subtitle_index` агрегата
//! при завершении сессии. Запись выполняется по принципу «отправил и
//! забыл»: неудача логируется и не показывается пользователю — это
//! вспомогательная функция с низкой ценой потери.

use std::sync::Arc;

use crate::storage::PersistenceGateway;

/// Мост сохранения индекса воспроизведения
pub struct IndexPersistenceBridge {
    /// Шлюз хранилища
    gateway: Arc<dyn PersistenceGateway>,
    /// Идентификатор медиафайла
    video_id: u64,
    /// Индекс менялся с момента открытия сессии
    ///
    /// Защита от записи на первом отображении: пока индекс не менялся,
    /// запись перетерла бы ранее сохраненную позицию значением `-1`.
    dirty: bool,
}

impl IndexPersistenceBridge {
    /// Создает мост для указанного медиафайла
    pub fn new(gateway: Arc<dyn PersistenceGateway>, video_id: u64) -> Self {
        Self {
            gateway,
            video_id,
            dirty: false,
        }
    }

    /// Отмечает, что индекс изменился и его стоит сохранить
    pub fn mark_index_changed(&mut self) {
        self.dirty = true;
    }

    /// Менялся ли индекс с момента открытия сессии
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Записывает индекс в хранилище и дожидается результата
    ///
    /// Без изменений индекса запись не выполняется. Решение о реакции на
    /// ошибку остается за вызывающей стороной; повторных попыток нет.
    pub async fn flush(&mut self, index: i64) -> crate::error::Result<()> {
        if !self.dirty {
            return Ok(());
        }

        self.write_index(index).await?;
        self.dirty = false;
        log::debug!("Индекс субтитра {} сохранен", index);
        Ok(())
    }

    /// Запускает запись индекса в фоне, не дожидаясь результата
    ///
    /// Вне контекста Tokio запись молча пропускается.
    pub fn spawn_flush(&mut self, index: i64) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let gateway = self.gateway.clone();
        let video_id = self.video_id;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = Self::write_index_with(&*gateway, video_id, index).await {
                    log::warn!("Не удалось сохранить индекс субтитра: {}", e);
                }
            });
        } else {
            log::warn!("Нет среды выполнения Tokio, индекс субтитра не сохранен");
        }
    }

    async fn write_index(&self, index: i64) -> crate::error::Result<()> {
        Self::write_index_with(&*self.gateway, self.video_id, index).await
    }

    async fn write_index_with(
        gateway: &dyn PersistenceGateway,
        video_id: u64,
        index: i64,
    ) -> crate::error::Result<()> {
        let mut track = match gateway.get_subtitle_track_by_video(video_id).await? {
            Some(track) => track,
            None => return Ok(()),
        };
        track.last_subtitle_index = index;
        gateway.put_subtitle_track(track).await
    }
}

impl std::fmt::Debug for IndexPersistenceBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexPersistenceBridge")
            .field("video_id", &self.video_id)
            .field("dirty", &self.dirty)
            .finish()
    }
}
