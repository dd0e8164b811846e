//! Модуль уведомлений о событиях сессии
//!
//! Этот модуль предоставляет реализацию паттерна Observer для доставки
//! событий воспроизведения слою интерфейса без зависимости от него:
//! смена текущего субтитра, смена режима, остановка на границе реплики.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::playback::PlayMode;

/// Событие сессии воспроизведения
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    /// Текущий субтитр изменился; `-1` — субтитра нет
    IndexChanged { index: i64 },
    /// Пользователь сменил режим воспроизведения
    ModeChanged { mode: PlayMode },
    /// Воспроизведение остановлено на границе реплики (режим паузы по фразе)
    PausedAtBoundary { index: i64 },
    /// Выполнен повтор реплики (режим зацикливания фразы)
    Looped { index: i64 },
    /// Правка субтитра сохранена в хранилище
    EditSaved { index: usize },
    /// Фоновая запись в хранилище не удалась
    PersistFailed { details: String },
}

/// Трейт для наблюдателя, получающего события сессии
pub trait SessionObserver: Send + Sync {
    /// Метод, вызываемый при каждом событии сессии
    fn on_session_event(&self, event: SessionEvent);
}

/// Реестр наблюдателей сессии
///
/// Идентификатор, возвращаемый при добавлении, используется для удаления
/// наблюдателя в будущем.
#[derive(Default)]
pub struct ObserverRegistry {
    /// Список наблюдателей по идентификатору
    observers: RwLock<HashMap<usize, Box<dyn SessionObserver>>>,
    /// Счетчик для генерации уникальных идентификаторов
    next_id: AtomicUsize,
}

impl ObserverRegistry {
    /// Создает пустой реестр
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет наблюдателя и возвращает его идентификатор
    pub fn add_observer(&self, observer: Box<dyn SessionObserver>) -> usize {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.observers.write().insert(id, observer);
        id
    }

    /// Удаляет наблюдателя по идентификатору
    pub fn remove_observer(&self, id: usize) -> Option<Box<dyn SessionObserver>> {
        self.observers.write().remove(&id)
    }

    /// Уведомляет всех наблюдателей о событии
    pub fn notify(&self, event: SessionEvent) {
        let observers = self.observers.read();
        for observer in observers.values() {
            observer.on_session_event(event.clone());
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.read().len())
            .finish()
    }
}

/// Наблюдатель, сохраняющий историю событий в памяти
///
/// Используется в тестах и для отладки.
#[derive(Clone, Default)]
pub struct MemorySessionObserver {
    /// История событий
    history: Arc<Mutex<Vec<SessionEvent>>>,
}

impl MemorySessionObserver {
    /// Создает новый наблюдатель с пустой историей
    pub fn new() -> Self {
        Self::default()
    }

    /// Получает копию истории событий
    pub fn history(&self) -> Vec<SessionEvent> {
        self.history.lock().clone()
    }

    /// Очищает историю событий
    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

impl SessionObserver for MemorySessionObserver {
    fn on_session_event(&self, event: SessionEvent) {
        self.history.lock().push(event);
    }
}

/// Наблюдатель, вызывающий функцию обратного вызова при каждом событии
pub struct CallbackSessionObserver<F>
where
    F: Fn(SessionEvent) + Send + Sync + 'static,
{
    /// Функция обратного вызова
    callback: F,
}

impl<F> CallbackSessionObserver<F>
where
    F: Fn(SessionEvent) + Send + Sync + 'static,
{
    /// Создает новый наблюдатель с указанной функцией
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> SessionObserver for CallbackSessionObserver<F>
where
    F: Fn(SessionEvent) + Send + Sync + 'static,
{
    fn on_session_event(&self, event: SessionEvent) {
        (self.callback)(event);
    }
}
