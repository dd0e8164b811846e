//! Основной файл библиотеки shadow-sync
//!
//! Эта библиотека предоставляет ядро плеера для отработки произношения
//! (shadowing) по видео с субтитрами: контроллер режимов воспроизведения,
//! пересчет текущего субтитра по времени, сессию правки временных меток и
//! текста, а также сохранение и восстановление позиции между сеансами.
//!
//! Библиотека не зависит от конкретного интерфейса: медиаэлемент общается
//! с ней дискретными событиями и командами, а интерфейс получает
//! уведомления через наблюдателей.

pub mod bridge;
pub mod config;
pub mod edit;
pub mod error;
pub mod events;
pub mod playback;
pub mod storage;
pub mod subtitle;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::bridge::IndexPersistenceBridge;
use crate::edit::{EditField, EditSession};
use crate::error::{Result, ShadowSyncError};
use crate::events::{ObserverRegistry, SessionEvent, SessionObserver};
use crate::playback::controller::Transition;
use crate::playback::{
    MediaCommand, MediaSourceGuard, PlayMode, PlaybackController, PlayerEvent,
};
use crate::storage::PersistenceGateway;
use crate::subtitle::{MediaRecord, SubtitleTrack};

pub use crate::config::{ClampPolicy, PlayerConfig};
pub use crate::error::ShadowSyncError as Error;

/// Сессия воспроизведения одного медиафайла
///
/// Связывает контроллер режимов, набор субтитров, сессию правки и мост
/// сохранения индекса. Живет от открытия медиафайла до ухода со страницы;
/// источник медиа захватывается при открытии и гарантированно
/// освобождается при завершении, включая ошибочные пути.
pub struct ShadowSession {
    /// Конфигурация плеера
    config: PlayerConfig,
    /// Шлюз хранилища
    gateway: Arc<dyn PersistenceGateway>,
    /// Запись о медиафайле
    media: MediaRecord,
    /// Набор субтитров; правки записываются насквозь через шлюз,
    /// расходящаяся копия не кэшируется
    track: SubtitleTrack,
    /// Контроллер режимов воспроизведения
    controller: PlaybackController,
    /// Открытая сессия правки; не более одной на сессию воспроизведения
    edit: Option<EditSession>,
    /// Мост сохранения последнего индекса
    bridge: IndexPersistenceBridge,
    /// Наблюдатели событий сессии
    observers: ObserverRegistry,
    /// Захваченный источник медиа
    source: Option<MediaSourceGuard>,
}

impl ShadowSession {
    /// Открывает сессию для медиафайла с источником без освобождения
    pub async fn open(
        gateway: Arc<dyn PersistenceGateway>,
        video_id: u64,
        config: PlayerConfig,
    ) -> Result<Self> {
        Self::open_inner(gateway, video_id, config, None).await
    }

    /// Открывает сессию с функцией освобождения источника медиа
    ///
    /// Функция будет вызвана ровно один раз при завершении сессии.
    pub async fn open_with_revoker(
        gateway: Arc<dyn PersistenceGateway>,
        video_id: u64,
        config: PlayerConfig,
        revoke: impl FnOnce(&str) + Send + 'static,
    ) -> Result<Self> {
        Self::open_inner(gateway, video_id, config, Some(Box::new(revoke))).await
    }

    async fn open_inner(
        gateway: Arc<dyn PersistenceGateway>,
        video_id: u64,
        config: PlayerConfig,
        revoke: Option<Box<dyn FnOnce(&str) + Send>>,
    ) -> Result<Self> {
        let media = gateway
            .get_media(video_id)
            .await?
            .ok_or_else(|| ShadowSyncError::NotFound(format!("Медиафайл {}", video_id)))?;

        let track = gateway
            .get_subtitle_track_by_video(video_id)
            .await?
            .ok_or_else(|| {
                ShadowSyncError::NotFound(format!("Набор субтитров для видео {}", video_id))
            })?;

        let source = match revoke {
            Some(revoke) => MediaSourceGuard::new(media.source.clone(), revoke),
            None => MediaSourceGuard::unmanaged(media.source.clone()),
        };

        let mut controller = PlaybackController::new();
        if config.resume_playback && track.last_subtitle_index >= 0 {
            controller.set_resume_pending(track.last_subtitle_index);
        }

        let bridge = IndexPersistenceBridge::new(gateway.clone(), video_id);

        log::info!(
            "Сессия открыта: видео {}, {} субтитров, сохраненный индекс {}",
            video_id,
            track.len(),
            track.last_subtitle_index
        );

        Ok(Self {
            config,
            gateway,
            media,
            track,
            controller,
            edit: None,
            bridge,
            observers: ObserverRegistry::new(),
            source: Some(source),
        })
    }

    /// Запускает сессию: выполняет отложенный переход к сохраненному индексу
    ///
    /// Вызывается, когда медиаэлемент готов принимать команды. Переход к
    /// восстановленному индексу не считается изменением и не приводит к
    /// записи при завершении.
    pub fn start(&mut self) -> Vec<MediaCommand> {
        let transition = self.controller.resume_if_pending(&self.track);
        self.apply(transition, false)
    }

    /// Применяет результат контроллера: уведомляет наблюдателей и
    /// отмечает изменение индекса для сохранения
    fn apply(&mut self, transition: Transition, mark_dirty: bool) -> Vec<MediaCommand> {
        for event in transition.events {
            if mark_dirty && matches!(event, SessionEvent::IndexChanged { .. }) {
                self.bridge.mark_index_changed();
            }
            self.observers.notify(event);
        }
        transition.commands
    }

    /// Обрабатывает событие медиаэлемента
    pub fn handle_event(&mut self, event: PlayerEvent) -> Vec<MediaCommand> {
        let transition = self.controller.handle_event(&self.track, event);
        self.apply(transition, true)
    }

    /// Индекс текущего субтитра; `-1` — субтитра нет
    pub fn current_index(&self) -> i64 {
        self.controller.current_index()
    }

    /// Текущий режим воспроизведения
    pub fn play_mode(&self) -> PlayMode {
        self.controller.mode()
    }

    /// Активна ли сессия правки
    pub fn is_edit_mode(&self) -> bool {
        self.edit.is_some()
    }

    /// Активен ли режим записи
    pub fn is_recording_mode(&self) -> bool {
        self.controller.is_recording_mode()
    }

    /// Набор субтитров текущей сессии
    pub fn track(&self) -> &SubtitleTrack {
        &self.track
    }

    /// Запись о медиафайле текущей сессии
    pub fn media(&self) -> &MediaRecord {
        &self.media
    }

    /// Ссылка на захваченный источник медиа
    pub fn source_url(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.url())
    }

    /// Добавляет наблюдателя событий сессии
    pub fn add_observer(&self, observer: Box<dyn SessionObserver>) -> usize {
        self.observers.add_observer(observer)
    }

    /// Удаляет наблюдателя по идентификатору
    pub fn remove_observer(&self, id: usize) -> Option<Box<dyn SessionObserver>> {
        self.observers.remove_observer(id)
    }

    /// Устанавливает режим воспроизведения
    pub fn set_play_mode(&mut self, mode: PlayMode) {
        if self.controller.mode() != mode {
            self.controller.set_play_mode(mode);
            self.observers.notify(SessionEvent::ModeChanged { mode });
        }
    }

    /// Переключает воспроизведение/паузу
    pub fn toggle_play_pause(&mut self) -> Vec<MediaCommand> {
        let transition = self.controller.toggle_play_pause(&self.track);
        self.apply(transition, true)
    }

    /// Переходит к предыдущему субтитру
    ///
    /// Навигация недоступна, пока открыта сессия правки.
    pub fn previous(&mut self) -> Vec<MediaCommand> {
        if self.edit.is_some() {
            return Vec::new();
        }
        let transition = self.controller.previous(&self.track);
        self.apply(transition, true)
    }

    /// Переходит к следующему субтитру
    pub fn next(&mut self) -> Vec<MediaCommand> {
        if self.edit.is_some() {
            return Vec::new();
        }
        let transition = self.controller.next(&self.track);
        self.apply(transition, true)
    }

    /// Переходит к субтитру с указанным индексом
    pub fn jump_to(&mut self, index: usize) -> Result<Vec<MediaCommand>> {
        if self.edit.is_some() {
            return Err(ShadowSyncError::InvalidState(
                "Навигация недоступна во время правки".to_string(),
            ));
        }
        if index >= self.track.len() {
            return Err(ShadowSyncError::NotFound(format!(
                "Субтитр с индексом {}",
                index
            )));
        }
        let transition = self.controller.jump_to(&self.track, index);
        Ok(self.apply(transition, true))
    }

    /// Входит в режим правки субтитра
    ///
    /// Снимает копию текущих значений реплики в кандидатный буфер,
    /// останавливает воспроизведение и перематывает к началу реплики.
    /// Режимы правки и записи взаимоисключающие.
    pub fn enter_edit_mode(&mut self, index: usize) -> Result<Vec<MediaCommand>> {
        if self.controller.is_recording_mode() {
            return Err(ShadowSyncError::InvalidState(
                "Режим правки недоступен во время записи".to_string(),
            ));
        }
        if self.edit.is_some() {
            return Err(ShadowSyncError::InvalidState(
                "Сессия правки уже открыта".to_string(),
            ));
        }

        let entry = self.track.entry(index).ok_or_else(|| {
            ShadowSyncError::NotFound(format!("Субтитр с индексом {}", index))
        })?;

        let session = EditSession::begin(entry);
        let preview = session.preview_bounds();

        let pause = self.controller.pause();
        let jump = self.controller.jump_to(&self.track, index);
        self.controller.set_edit_mode(true);
        self.controller.set_preview_bounds(Some(preview));
        self.edit = Some(session);

        let mut commands = self.apply(pause, true);
        commands.extend(self.apply(jump, true));
        Ok(commands)
    }

    /// Сдвигает кандидатную временную метку на знаковое смещение (мс)
    pub fn adjust_edited_time(&mut self, field: EditField, delta_ms: i64) -> Result<()> {
        let session = self.edit.as_mut().ok_or_else(|| {
            ShadowSyncError::InvalidState("Сессия правки не открыта".to_string())
        })?;
        session.adjust(field, delta_ms);
        let preview = session.preview_bounds();
        self.controller.set_preview_bounds(Some(preview));
        Ok(())
    }

    /// Сдвигает кандидатную метку на шаг из конфигурации
    pub fn nudge_edited_time(&mut self, field: EditField, forward: bool) -> Result<()> {
        let step = self.config.adjust_step_ms as i64;
        self.adjust_edited_time(field, if forward { step } else { -step })
    }

    /// Заменяет кандидатный текст реплики
    pub fn set_edited_text(&mut self, text: impl Into<String>) -> Result<()> {
        let session = self.edit.as_mut().ok_or_else(|| {
            ShadowSyncError::InvalidState("Сессия правки не открыта".to_string())
        })?;
        session.set_text(text);
        Ok(())
    }

    /// Сохраняет кандидатные значения и закрывает сессию правки
    ///
    /// Временные метки и текст записываются одной операцией; обновленный
    /// набор сразу виден через [`ShadowSession::track`], отдельного
    /// перечитывания не требуется. При ошибке записи состояние в памяти
    /// не меняется и сессия правки остается открытой.
    pub async fn save_edit(&mut self) -> Result<()> {
        let session = self.edit.as_ref().ok_or_else(|| {
            ShadowSyncError::InvalidState("Сессия правки не открыта".to_string())
        })?;

        let updated = session
            .save(&*self.gateway, self.media.id, self.config.clamp_policy)
            .await?;

        let index = session.index();
        self.track = updated;
        self.edit = None;
        self.controller.set_edit_mode(false);
        self.observers.notify(SessionEvent::EditSaved { index });
        Ok(())
    }

    /// Закрывает сессию правки, отбрасывая кандидатный буфер
    pub fn cancel_edit(&mut self) {
        self.edit = None;
        self.controller.set_edit_mode(false);
    }

    /// Выходит из режима правки (синоним отмены)
    pub fn exit_edit_mode(&mut self) {
        self.cancel_edit();
    }

    /// Включает режим записи
    ///
    /// На время записи границы реплики работают как в режиме паузы по
    /// фразе, вне зависимости от выбранного режима воспроизведения.
    pub fn enter_recording_mode(&mut self) -> Result<()> {
        if self.edit.is_some() {
            return Err(ShadowSyncError::InvalidState(
                "Режим записи недоступен во время правки".to_string(),
            ));
        }
        self.controller.set_recording_mode(true);
        Ok(())
    }

    /// Выключает режим записи
    pub fn exit_recording_mode(&mut self) {
        self.controller.set_recording_mode(false);
    }

    /// Завершает сессию: сохраняет индекс и освобождает источник медиа
    ///
    /// Сохранение индекса — необязательная услуга: неудача логируется,
    /// уведомляет наблюдателей и не мешает завершению.
    pub async fn close(&mut self) {
        if self.config.persist_last_index {
            let index = self.controller.current_index();
            if let Err(e) = self.bridge.flush(index).await {
                log::warn!("Не удалось сохранить индекс субтитра: {}", e);
                self.observers.notify(SessionEvent::PersistFailed {
                    details: e.to_string(),
                });
            }
        }

        if let Some(mut source) = self.source.take() {
            source.release();
        }
    }
}

impl Drop for ShadowSession {
    fn drop(&mut self) {
        // Завершение без close(): индекс уходит в фоновую запись,
        // источник освобождает собственный guard
        if self.config.persist_last_index {
            let index = self.controller.current_index();
            self.bridge.spawn_flush(index);
        }
    }
}

impl std::fmt::Debug for ShadowSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowSession")
            .field("video_id", &self.media.id)
            .field("current_index", &self.controller.current_index())
            .field("mode", &self.controller.mode())
            .field("edit_open", &self.edit.is_some())
            .finish()
    }
}
