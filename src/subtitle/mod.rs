//! Модуль для работы с субтитрами
//!
//! Содержит типы данных, парсинг файлов субтитров и поиск субтитра
//! по моменту времени.

pub mod parser;
pub mod resolver;
pub mod types;

pub use parser::{parse_srt, parse_subtitle_file, parse_vtt};
pub use resolver::resolve_index;
pub use types::{MediaRecord, SubtitleEntry, SubtitleTrack};
