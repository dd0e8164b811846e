//! Модуль конфигурации библиотеки shadow-sync
//!
//! Этот модуль содержит структуры для настройки поведения плеера.

use serde::{Deserialize, Serialize};

/// Политика ограничения отредактированных временных меток
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClampPolicy {
    /// Ограничивать значения при сохранении: `0 <= start <= end`
    ClampOnSave,
    /// Не ограничивать, а отклонять некорректные значения с ошибкой валидации
    Reject,
}

impl Default for ClampPolicy {
    fn default() -> Self {
        Self::ClampOnSave
    }
}

/// Конфигурация плеера
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Шаг изменения временных меток при редактировании (в миллисекундах)
    pub adjust_step_ms: u64,
    /// Политика ограничения отредактированных временных меток
    pub clamp_policy: ClampPolicy,
    /// Восстанавливать позицию воспроизведения из сохраненного индекса
    pub resume_playback: bool,
    /// Сохранять последний индекс субтитра при завершении сессии
    pub persist_last_index: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            adjust_step_ms: 100,
            clamp_policy: ClampPolicy::default(),
            resume_playback: true,
            persist_last_index: true,
        }
    }
}
