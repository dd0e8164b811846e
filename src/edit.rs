//! Сессия редактирования субтитра
//!
//! Сессия живет от входа в режим редактирования до сохранения или отмены
//! и буферизует кандидатные значения одной реплики: уточненные временные
//! метки и текст. Хранилище не затрагивается до явного сохранения;
//! сохранение выполняется по схеме «прочитать — изменить собственную
//! копию — записать агрегат целиком» одной операцией.

use crate::config::ClampPolicy;
use crate::error::{Result, ShadowSyncError};
use crate::storage::PersistenceGateway;
use crate::subtitle::{SubtitleEntry, SubtitleTrack};

/// Редактируемое поле временных меток
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    /// Уточненное время начала
    Start,
    /// Уточненное время окончания
    End,
}

/// Сессия редактирования одной реплики
///
/// Кандидатные метки хранятся со знаком: до сохранения им разрешено
/// уходить в минус или пересекать друг друга, политика ограничения
/// применяется только при сохранении.
#[derive(Debug, Clone)]
pub struct EditSession {
    /// Индекс редактируемой реплики
    index: usize,
    /// Снимок реплики на момент входа
    original: SubtitleEntry,
    /// Кандидатное время начала (мс)
    candidate_start_ms: i64,
    /// Кандидатное время окончания (мс)
    candidate_end_ms: i64,
    /// Кандидатный текст
    candidate_text: String,
}

impl EditSession {
    /// Открывает сессию, снимая копию текущих значений реплики
    pub fn begin(entry: &SubtitleEntry) -> Self {
        Self {
            index: entry.index,
            original: entry.clone(),
            candidate_start_ms: entry.precise_start_ms as i64,
            candidate_end_ms: entry.precise_end_ms as i64,
            candidate_text: entry.text.clone(),
        }
    }

    /// Индекс редактируемой реплики
    pub fn index(&self) -> usize {
        self.index
    }

    /// Кандидатное время начала (мс, до применения политики ограничения)
    pub fn candidate_start_ms(&self) -> i64 {
        self.candidate_start_ms
    }

    /// Кандидатное время окончания (мс, до применения политики ограничения)
    pub fn candidate_end_ms(&self) -> i64 {
        self.candidate_end_ms
    }

    /// Кандидатный текст
    pub fn candidate_text(&self) -> &str {
        &self.candidate_text
    }

    /// Сдвигает кандидатную метку на знаковое смещение (мс)
    pub fn adjust(&mut self, field: EditField, delta_ms: i64) {
        match field {
            EditField::Start => self.candidate_start_ms += delta_ms,
            EditField::End => self.candidate_end_ms += delta_ms,
        }
    }

    /// Заменяет кандидатный текст
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.candidate_text = text.into();
    }

    /// Есть ли несохраненные изменения относительно снимка
    pub fn is_dirty(&self) -> bool {
        self.candidate_start_ms != self.original.precise_start_ms as i64
            || self.candidate_end_ms != self.original.precise_end_ms as i64
            || self.candidate_text != self.original.text
    }

    /// Кандидатные границы для предпросмотра воспроизведения (мс)
    ///
    /// Для проверок границ отрицательные значения прижимаются к нулю,
    /// сохраняемые значения при этом не меняются.
    pub fn preview_bounds(&self) -> (u64, u64) {
        let start = self.candidate_start_ms.max(0) as u64;
        let end = self.candidate_end_ms.max(self.candidate_start_ms.max(0)) as u64;
        (start, end)
    }

    /// Применяет политику ограничения к кандидатным меткам
    fn resolved_bounds(&self, policy: ClampPolicy) -> Result<(u64, u64)> {
        match policy {
            ClampPolicy::ClampOnSave => {
                let start = self.candidate_start_ms.max(0) as u64;
                let end = (self.candidate_end_ms.max(0) as u64).max(start);
                Ok((start, end))
            }
            ClampPolicy::Reject => {
                if self.candidate_start_ms < 0 || self.candidate_end_ms < 0 {
                    return Err(ShadowSyncError::EditValidation(
                        "Временная метка не может быть отрицательной".to_string(),
                    ));
                }
                if self.candidate_start_ms > self.candidate_end_ms {
                    return Err(ShadowSyncError::EditValidation(
                        "Время начала не может превышать время окончания".to_string(),
                    ));
                }
                Ok((self.candidate_start_ms as u64, self.candidate_end_ms as u64))
            }
        }
    }

    /// Сохраняет кандидатные значения через шлюз хранилища
    ///
    /// Агрегат перечитывается из хранилища, изменения применяются к
    /// собственной копии и записываются одним upsert — временные метки и
    /// текст атомарно. При ошибке записи копия отбрасывается, состояние в
    /// памяти остается прежним, сессия открыта для повторной попытки.
    pub async fn save(
        &self,
        gateway: &dyn PersistenceGateway,
        video_id: u64,
        policy: ClampPolicy,
    ) -> Result<SubtitleTrack> {
        let (start, end) = self.resolved_bounds(policy)?;

        let mut track = gateway
            .get_subtitle_track_by_video(video_id)
            .await?
            .ok_or_else(|| {
                ShadowSyncError::NotFound(format!("Набор субтитров для видео {}", video_id))
            })?;

        let entry = track.entries.get_mut(self.index).ok_or_else(|| {
            ShadowSyncError::NotFound(format!("Субтитр с индексом {}", self.index))
        })?;

        entry.precise_start_ms = start;
        entry.precise_end_ms = end;
        entry.text = self.candidate_text.clone();

        gateway.put_subtitle_track(track.clone()).await?;
        log::debug!("Правка субтитра {} сохранена", self.index);
        Ok(track)
    }
}
