//! Примитивы взаимодействия с медиаэлементом
//!
//! Контроллер воспроизведения не вызывает медиаэлемент напрямую: он
//! принимает дискретные события ([`PlayerEvent`]) и возвращает команды
//! ([`MediaCommand`]), которые вызывающая сторона транслирует элементу.
//! Эффекты команд (фактическая смена времени или состояния) приходят
//! позже как новые события.

/// Команда медиаэлементу
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaCommand {
    /// Перемотать на позицию (мс)
    SeekTo(u64),
    /// Запустить воспроизведение
    Play,
    /// Остановить воспроизведение
    Pause,
}

/// Событие от медиаэлемента
///
/// Время передается в миллисекундах как число с плавающей точкой:
/// секунды медиаэлемента умножаются на 1000 без округления. Во время
/// обычного воспроизведения время не убывает, но перемотка может
/// доставить событие с меньшим временем.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// Время воспроизведения продвинулось (мс)
    TimeAdvanced(f64),
    /// Состояние воспроизведения изменилось
    PlayStateChanged(bool),
    /// Пользователь начал перемотку
    ScrubStarted,
    /// Пользователь завершил перемотку на указанной позиции (мс)
    ScrubEnded(f64),
}

impl PlayerEvent {
    /// Создает событие продвижения времени из секунд медиаэлемента
    pub fn time_from_secs(secs: f64) -> Self {
        Self::TimeAdvanced(secs * 1000.0)
    }
}

/// Владение источником медиа с гарантированным освобождением
///
/// Источник (например, object URL) захватывается при открытии сессии и
/// освобождается при ее завершении — на всех путях выхода, включая
/// ошибочные. Повторное освобождение безопасно.
pub struct MediaSourceGuard {
    /// Ссылка на источник
    url: String,
    /// Функция освобождения; `None` после освобождения
    revoke: Option<Box<dyn FnOnce(&str) + Send>>,
}

impl MediaSourceGuard {
    /// Захватывает источник с функцией освобождения
    pub fn new(url: impl Into<String>, revoke: impl FnOnce(&str) + Send + 'static) -> Self {
        Self {
            url: url.into(),
            revoke: Some(Box::new(revoke)),
        }
    }

    /// Захватывает источник, не требующий освобождения
    pub fn unmanaged(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            revoke: None,
        }
    }

    /// Ссылка на источник
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Освобождает источник
    pub fn release(&mut self) {
        if let Some(revoke) = self.revoke.take() {
            log::debug!("Освобождение источника медиа: {}", self.url);
            revoke(&self.url);
        }
    }
}

impl Drop for MediaSourceGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for MediaSourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSourceGuard")
            .field("url", &self.url)
            .field("released", &self.revoke.is_none())
            .finish()
    }
}
