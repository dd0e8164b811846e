//! Наблюдение за позицией медиаэлемента
//!
//! Трекер превращает сырые показания медиаэлемента (секунды и флаг
//! воспроизведения) в дискретные события для контроллера: продвижение
//! времени и смену состояния воспроизведения. Повторные показания с тем
//! же состоянием не порождают лишних событий смены состояния.

use super::media::PlayerEvent;

/// Трекер позиции воспроизведения
#[derive(Debug, Default)]
pub struct PositionTracker {
    /// Последнее известное состояние воспроизведения
    playing: bool,
    /// Последняя известная позиция (мс)
    last_ms: f64,
}

impl PositionTracker {
    /// Создает трекер в остановленном состоянии
    pub fn new() -> Self {
        Self::default()
    }

    /// Последняя известная позиция (мс)
    pub fn position_ms(&self) -> f64 {
        self.last_ms
    }

    /// Последнее известное состояние воспроизведения
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Принимает показание медиаэлемента и возвращает события для контроллера
    ///
    /// Секунды переводятся в миллисекунды умножением на 1000 без
    /// округления. Смена состояния воспроизведения доставляется раньше
    /// продвижения времени, чтобы контроллер успел выполнить возврат к
    /// началу реплики до проверки границ.
    pub fn sample(&mut self, secs: f64, playing: bool) -> Vec<PlayerEvent> {
        let mut events = Vec::with_capacity(2);

        if playing != self.playing {
            self.playing = playing;
            events.push(PlayerEvent::PlayStateChanged(playing));
        }

        let t_ms = secs * 1000.0;
        self.last_ms = t_ms;
        events.push(PlayerEvent::TimeAdvanced(t_ms));

        events
    }
}
