//! Хранилище в памяти
//!
//! Простейшая реализация шлюза для тестов и сценариев без постоянного
//! хранения. Записи живут до завершения процесса.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::PersistenceGateway;
use crate::error::Result;
use crate::subtitle::{MediaRecord, SubtitleTrack};

/// Хранилище записей в памяти
#[derive(Debug, Default)]
pub struct MemoryGateway {
    /// Записи о медиафайлах по идентификатору
    media: RwLock<HashMap<u64, MediaRecord>>,
    /// Наборы субтитров по идентификатору медиафайла
    tracks: RwLock<HashMap<u64, SubtitleTrack>>,
}

impl MemoryGateway {
    /// Создает пустое хранилище
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn get_media(&self, id: u64) -> Result<Option<MediaRecord>> {
        let media = self.media.read().await;
        Ok(media.get(&id).cloned())
    }

    async fn put_media(&self, mut record: MediaRecord) -> Result<()> {
        record.updated_at = Utc::now();
        let mut media = self.media.write().await;
        media.insert(record.id, record);
        Ok(())
    }

    async fn get_subtitle_track_by_video(&self, video_id: u64) -> Result<Option<SubtitleTrack>> {
        let tracks = self.tracks.read().await;
        Ok(tracks.get(&video_id).cloned())
    }

    async fn put_subtitle_track(&self, track: SubtitleTrack) -> Result<()> {
        let mut tracks = self.tracks.write().await;
        tracks.insert(track.video_id, track);
        Ok(())
    }
}
