//! Типы данных для работы с субтитрами

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Структура для представления одного субтитра
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// Порядковый номер субтитра (присваивается при парсинге)
    pub index: usize,
    /// Время начала для отображения (мс)
    pub start_ms: u64,
    /// Время окончания для отображения (мс)
    pub end_ms: u64,
    /// Уточненное время начала (мс), редактируется пользователем
    pub precise_start_ms: u64,
    /// Уточненное время окончания (мс), редактируется пользователем
    pub precise_end_ms: u64,
    /// Текст субтитра
    pub text: String,
}

impl SubtitleEntry {
    /// Создает новый субтитр; уточненные метки инициализируются метками отображения
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: String) -> Self {
        Self {
            index,
            start_ms,
            end_ms,
            precise_start_ms: start_ms,
            precise_end_ms: end_ms,
            text,
        }
    }

    /// Получает длительность субтитра по меткам отображения (мс)
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Проверяет, покрывает ли субтитр момент времени `t_ms` (метки отображения)
    pub fn covers(&self, t_ms: f64) -> bool {
        t_ms >= self.start_ms as f64 && t_ms < self.end_ms as f64
    }
}

/// Набор субтитров для одного медиафайла
///
/// Порядок в `entries` совпадает с порядком отображения и воспроизведения.
/// Для каждого медиафайла существует не более одного набора (уникальность
/// по `video_id` обеспечивается шлюзом хранилища).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// Ключ хранилища
    pub id: u64,
    /// Идентификатор медиафайла-владельца
    pub video_id: u64,
    /// Список субтитров в порядке воспроизведения
    pub entries: Vec<SubtitleEntry>,
    /// Последний известный индекс воспроизведения; `-1` — позиции еще нет
    pub last_subtitle_index: i64,
}

impl SubtitleTrack {
    /// Создает новый набор субтитров без сохраненной позиции
    pub fn new(id: u64, video_id: u64, entries: Vec<SubtitleEntry>) -> Self {
        Self {
            id,
            video_id,
            entries,
            last_subtitle_index: -1,
        }
    }

    /// Получает субтитр по порядковому номеру
    pub fn entry(&self, index: usize) -> Option<&SubtitleEntry> {
        self.entries.get(index)
    }

    /// Количество субтитров в наборе
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Проверяет, пуст ли набор
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Запись о медиафайле
///
/// Ядро читает только ссылку на источник и поля возобновления; метаданные
/// импорта остаются за пределами библиотеки.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Ключ хранилища
    pub id: u64,
    /// Название медиафайла
    pub title: String,
    /// Ссылка на воспроизводимый источник
    pub source: String,
    /// Последняя позиция воспроизведения (мс)
    pub last_position_ms: u64,
    /// Время последнего обновления записи
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Создает новую запись о медиафайле
    pub fn new(id: u64, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            source: source.into(),
            last_position_ms: 0,
            updated_at: Utc::now(),
        }
    }
}
