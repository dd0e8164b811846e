//! Модуль воспроизведения
//!
//! Содержит контроллер режимов воспроизведения и примитивы взаимодействия
//! с медиаэлементом.

pub mod controller;
pub mod media;
pub mod tracker;

use serde::{Deserialize, Serialize};

pub use controller::{PlaybackController, ResumeState, ScrubState, Transition};
pub use media::{MediaCommand, MediaSourceGuard, PlayerEvent};
pub use tracker::PositionTracker;

/// Режим воспроизведения
///
/// Режимы взаимоисключающие и выбираются пользователем. Режимы
/// редактирования и записи не входят сюда: они накладываются поверх и
/// на время своего действия подменяют семантику границ реплики.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMode {
    /// Обычное воспроизведение
    Off,
    /// Пауза в конце каждой реплики
    SinglePause,
    /// Зацикливание текущей реплики
    SingleLoop,
}

impl Default for PlayMode {
    fn default() -> Self {
        Self::Off
    }
}

impl PlayMode {
    /// Получает название режима в виде строки
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::SinglePause => "single-pause",
            Self::SingleLoop => "single-loop",
        }
    }
}
