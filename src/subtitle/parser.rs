//! Парсинг файлов субтитров (SRT и VTT)
//!
//! Результат парсинга — последовательность [`SubtitleEntry`] с временными
//! метками в миллисекундах; уточненные метки инициализируются равными меткам
//! отображения. Пересечения и паузы между репликами в исходном файле
//! допускаются и сохраняются как есть.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::types::SubtitleEntry;
use crate::error::{Result, ShadowSyncError};

/// Парсит время из строки формата "HH:MM:SS.mmm" или "HH:MM:SS,mmm"
fn parse_timestamp(timestamp: &str) -> Result<u64> {
    let normalized = timestamp.replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() != 3 {
        return Err(ShadowSyncError::SubtitleParsing(format!(
            "Неверный формат времени: {}",
            timestamp
        )));
    }

    let hours: u64 = parts[0].trim().parse().map_err(|_| {
        ShadowSyncError::SubtitleParsing(format!("Неверный формат часов: {}", parts[0]))
    })?;

    let minutes: u64 = parts[1].parse().map_err(|_| {
        ShadowSyncError::SubtitleParsing(format!("Неверный формат минут: {}", parts[1]))
    })?;

    let seconds_parts: Vec<&str> = parts[2].split('.').collect();
    if seconds_parts.len() != 2 {
        return Err(ShadowSyncError::SubtitleParsing(format!(
            "Неверный формат секунд: {}",
            parts[2]
        )));
    }

    let seconds: u64 = seconds_parts[0].parse().map_err(|_| {
        ShadowSyncError::SubtitleParsing(format!("Неверный формат секунд: {}", seconds_parts[0]))
    })?;

    let milliseconds: u64 = seconds_parts[1].parse().map_err(|_| {
        ShadowSyncError::SubtitleParsing(format!(
            "Неверный формат миллисекунд: {}",
            seconds_parts[1]
        ))
    })?;

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + milliseconds)
}

/// Парсит временной интервал из строки формата "start --> end"
fn parse_time_range(line: &str) -> Result<(u64, u64)> {
    let parts: Vec<&str> = line.split("-->").collect();
    if parts.len() != 2 {
        return Err(ShadowSyncError::SubtitleParsing(format!(
            "Неверный формат временного интервала: {}",
            line
        )));
    }

    // В VTT после конечной метки могут идти настройки позиционирования
    let end_part = parts[1].trim().split_whitespace().next().unwrap_or("");

    let start = parse_timestamp(parts[0].trim())?;
    let end = parse_timestamp(end_part)?;

    Ok((start, end))
}

/// Парсит субтитры из построчного источника
///
/// Общая машина для SRT и VTT: блоки разделяются пустыми строками, строка
/// с "-->" задает интервал, остальные строки блока — текст. Номера блоков
/// SRT и идентификаторы реплик VTT игнорируются; порядковый номер
/// присваивается заново.
fn parse_lines<I>(lines: I) -> Result<Vec<SubtitleEntry>>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut entries = Vec::new();
    let mut current_index = 0;
    let mut current_time_range: Option<(u64, u64)> = None;
    let mut current_text = String::new();

    for line in lines {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Пустая строка означает конец текущего субтитра
            if let Some((start, end)) = current_time_range.take() {
                if !current_text.is_empty() {
                    entries.push(SubtitleEntry::new(
                        current_index,
                        start,
                        end,
                        current_text.trim().to_string(),
                    ));
                    current_index += 1;
                }
            }
            current_text.clear();
        } else if trimmed.contains("-->") {
            current_time_range = Some(parse_time_range(trimmed)?);
        } else if current_time_range.is_some() {
            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(trimmed);
        }
    }

    // Обрабатываем последний субтитр
    if let Some((start, end)) = current_time_range {
        if !current_text.is_empty() {
            entries.push(SubtitleEntry::new(
                current_index,
                start,
                end,
                current_text.trim().to_string(),
            ));
        }
    }

    Ok(entries)
}

/// Парсит субтитры в формате SRT из строки
pub fn parse_srt(content: &str) -> Result<Vec<SubtitleEntry>> {
    parse_lines(content.lines().map(|l| Ok(l.to_string())))
}

/// Парсит субтитры в формате VTT из строки
pub fn parse_vtt(content: &str) -> Result<Vec<SubtitleEntry>> {
    let mut lines = content.lines();
    match lines.next() {
        Some(first_line) if first_line.trim_start_matches('\u{feff}').trim().starts_with("WEBVTT") => {}
        _ => {
            return Err(ShadowSyncError::SubtitleParsing(
                "Отсутствует заголовок WEBVTT".to_string(),
            ))
        }
    }
    parse_lines(lines.map(|l| Ok(l.to_string())))
}

/// Парсит файл субтитров, определяя формат по расширению
pub fn parse_subtitle_file<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleEntry>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    match extension.as_str() {
        "srt" => parse_lines(reader.lines()),
        "vtt" => {
            let mut header = String::new();
            reader.read_line(&mut header)?;
            if !header.trim_start_matches('\u{feff}').trim().starts_with("WEBVTT") {
                return Err(ShadowSyncError::SubtitleParsing(
                    "Отсутствует заголовок WEBVTT".to_string(),
                ));
            }
            parse_lines(reader.lines())
        }
        other => Err(ShadowSyncError::SubtitleParsing(format!(
            "Неподдерживаемый формат субтитров: {}",
            other
        ))),
    }
}
