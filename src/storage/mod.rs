//! Шлюз доступа к хранилищу записей
//!
//! Этот модуль определяет асинхронный интерфейс хранилища для записей о
//! медиафайлах и наборов субтитров, а также две его реализации: в памяти и
//! в JSON-файле. Шлюз владеет записями; ядро всегда работает по схеме
//! «прочитать — изменить собственную копию — записать целиком».
//!
//! Семантика записи — полный upsert агрегата, последняя запись побеждает.
//! Набор субтитров уникален по `video_id`.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::subtitle::{MediaRecord, SubtitleTrack};

/// Асинхронный шлюз доступа к хранилищу
///
/// Все вызовы могут быть отложены бэкендом на произвольное время; вызывающая
/// сторона не должна блокировать воспроизведение в ожидании результата.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Получает запись о медиафайле по идентификатору
    async fn get_media(&self, id: u64) -> Result<Option<MediaRecord>>;

    /// Сохраняет запись о медиафайле (полный upsert)
    async fn put_media(&self, record: MediaRecord) -> Result<()>;

    /// Получает набор субтитров по идентификатору медиафайла
    async fn get_subtitle_track_by_video(&self, video_id: u64) -> Result<Option<SubtitleTrack>>;

    /// Сохраняет набор субтитров целиком (полный upsert, уникальность по `video_id`)
    async fn put_subtitle_track(&self, track: SubtitleTrack) -> Result<()>;
}

pub use file::FileGateway;
pub use memory::MemoryGateway;
