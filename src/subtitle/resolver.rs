//! Поиск субтитра по моменту времени
//!
//! Чистая функция без побочных эффектов: отображает момент времени на индекс
//! покрывающего его субтитра. Отсутствие совпадения — нормальный результат
//! (паузы между репликами), а не ошибка.

use super::types::SubtitleEntry;

/// Возвращает индекс первого субтитра, покрывающего момент `t_ms`
///
/// Совпадение определяется по меткам отображения: `start_ms <= t < end_ms`.
/// Линейный проход; на ожидаемых размерах (сотни записей) этого достаточно.
pub fn resolve_index(entries: &[SubtitleEntry], t_ms: f64) -> Option<usize> {
    entries.iter().position(|entry| entry.covers(t_ms))
}
