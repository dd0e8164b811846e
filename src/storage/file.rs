//! Хранилище в JSON-файле
//!
//! Реализация шлюза поверх одного JSON-файла. Файл перечитывается при
//! создании шлюза и перезаписывается целиком после каждого изменения;
//! запись выполняется через временный файл с переименованием, чтобы не
//! оставить хранилище в полузаписанном состоянии.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::PersistenceGateway;
use crate::error::{Result, ShadowSyncError};
use crate::subtitle::{MediaRecord, SubtitleTrack};

/// Содержимое файла хранилища
#[derive(Debug, Default, Serialize, Deserialize)]
struct Store {
    /// Записи о медиафайлах по идентификатору
    media: HashMap<u64, MediaRecord>,
    /// Наборы субтитров по идентификатору медиафайла
    tracks: HashMap<u64, SubtitleTrack>,
}

/// Хранилище записей в JSON-файле
#[derive(Debug)]
pub struct FileGateway {
    /// Путь к файлу хранилища
    path: PathBuf,
    /// Текущее содержимое; файл — источник истины, поле — его копия
    store: Mutex<Store>,
}

impl FileGateway {
    /// Открывает хранилище; отсутствующий файл означает пустое хранилище
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let store = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Store::default()
        };

        Ok(Self {
            path,
            store: Mutex::new(store),
        })
    }

    /// Записывает содержимое на диск через временный файл
    fn persist(&self, store: &Store) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut temp, store)?;
        temp.persist(&self.path)
            .map_err(|e| ShadowSyncError::Storage(format!("Не удалось сохранить файл: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for FileGateway {
    async fn get_media(&self, id: u64) -> Result<Option<MediaRecord>> {
        let store = self.store.lock().await;
        Ok(store.media.get(&id).cloned())
    }

    async fn put_media(&self, mut record: MediaRecord) -> Result<()> {
        record.updated_at = Utc::now();
        let mut store = self.store.lock().await;
        store.media.insert(record.id, record);
        self.persist(&store)
    }

    async fn get_subtitle_track_by_video(&self, video_id: u64) -> Result<Option<SubtitleTrack>> {
        let store = self.store.lock().await;
        Ok(store.tracks.get(&video_id).cloned())
    }

    async fn put_subtitle_track(&self, track: SubtitleTrack) -> Result<()> {
        let mut store = self.store.lock().await;
        store.tracks.insert(track.video_id, track);
        self.persist(&store)
    }
}
