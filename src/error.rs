//! Модуль обработки ошибок библиотеки shadow-sync
//!
//! Этот модуль содержит типы ошибок, которые могут возникнуть при работе библиотеки.

use thiserror::Error;

/// Ошибки библиотеки shadow-sync
#[derive(Debug, Error)]
pub enum ShadowSyncError {
    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ошибка парсинга субтитров
    #[error("Subtitle parsing error: {0}")]
    SubtitleParsing(String),

    /// Ошибка хранилища
    #[error("Storage error: {0}")]
    Storage(String),

    /// Ошибка источника медиа
    #[error("Media source error: {0}")]
    MediaSource(String),

    /// Недопустимое состояние сессии (например, вход в режим редактирования во время записи)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Ошибка валидации редактируемых значений
    #[error("Edit validation error: {0}")]
    EditValidation(String),

    /// Запись не найдена
    #[error("Not found: {0}")]
    NotFound(String),

    /// Неизвестная ошибка
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<&str> for ShadowSyncError {
    fn from(s: &str) -> Self {
        ShadowSyncError::Unknown(s.to_string())
    }
}

impl From<String> for ShadowSyncError {
    fn from(s: String) -> Self {
        ShadowSyncError::Unknown(s)
    }
}

/// Тип Result для библиотеки shadow-sync
pub type Result<T> = std::result::Result<T, ShadowSyncError>;
