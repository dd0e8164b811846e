//! Сквозные тесты сессии воспроизведения

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ClampPolicy, PlayerConfig};
use crate::edit::EditField;
use crate::error::{Result, ShadowSyncError};
use crate::events::{MemorySessionObserver, SessionEvent};
use crate::playback::{MediaCommand, PlayMode, PlayerEvent};
use crate::storage::{MemoryGateway, PersistenceGateway};
use crate::subtitle::{MediaRecord, SubtitleEntry, SubtitleTrack};
use crate::ShadowSession;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Шлюз с управляемым отказом записи для проверки ошибочных путей
struct FailingGateway {
    inner: MemoryGateway,
    fail_puts: AtomicBool,
}

impl FailingGateway {
    fn new() -> Self {
        Self {
            inner: MemoryGateway::new(),
            fail_puts: AtomicBool::new(false),
        }
    }

    fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistenceGateway for FailingGateway {
    async fn get_media(&self, id: u64) -> Result<Option<MediaRecord>> {
        self.inner.get_media(id).await
    }

    async fn put_media(&self, record: MediaRecord) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(ShadowSyncError::Storage("Запись отклонена".to_string()));
        }
        self.inner.put_media(record).await
    }

    async fn get_subtitle_track_by_video(&self, video_id: u64) -> Result<Option<SubtitleTrack>> {
        self.inner.get_subtitle_track_by_video(video_id).await
    }

    async fn put_subtitle_track(&self, track: SubtitleTrack) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(ShadowSyncError::Storage("Запись отклонена".to_string()));
        }
        self.inner.put_subtitle_track(track).await
    }
}

fn sample_entries() -> Vec<SubtitleEntry> {
    vec![
        SubtitleEntry::new(0, 0, 2000, "A".to_string()),
        SubtitleEntry::new(1, 2000, 4000, "B".to_string()),
        SubtitleEntry::new(2, 5000, 7000, "C".to_string()),
        SubtitleEntry::new(3, 7000, 9000, "D".to_string()),
    ]
}

async fn seeded_gateway(saved_index: i64) -> Arc<MemoryGateway> {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .put_media(MediaRecord::new(1, "Урок 1", "blob:lesson-1"))
        .await
        .unwrap();
    let mut track = SubtitleTrack::new(1, 1, sample_entries());
    track.last_subtitle_index = saved_index;
    gateway.put_subtitle_track(track).await.unwrap();
    gateway
}

async fn open_session(gateway: Arc<MemoryGateway>) -> ShadowSession {
    ShadowSession::open(gateway, 1, PlayerConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_open_missing_media_fails() {
    let gateway = Arc::new(MemoryGateway::new());
    let result = ShadowSession::open(gateway, 42, PlayerConfig::default()).await;
    assert!(matches!(result, Err(ShadowSyncError::NotFound(_))));
}

#[tokio::test]
async fn test_index_follows_time_and_survives_gap() {
    init_logging();
    let gateway = seeded_gateway(-1).await;
    let mut session = open_session(gateway).await;
    let observer = MemorySessionObserver::new();
    session.add_observer(Box::new(observer.clone()));

    session.handle_event(PlayerEvent::TimeAdvanced(1500.0));
    assert_eq!(session.current_index(), 0);

    session.handle_event(PlayerEvent::TimeAdvanced(2500.0));
    assert_eq!(session.current_index(), 1);

    // Пауза между репликами: индекс не сбрасывается
    session.handle_event(PlayerEvent::TimeAdvanced(4500.0));
    assert_eq!(session.current_index(), 1);

    let history = observer.history();
    assert_eq!(
        history,
        vec![
            SessionEvent::IndexChanged { index: 0 },
            SessionEvent::IndexChanged { index: 1 },
        ]
    );
}

#[tokio::test]
async fn test_single_pause_flow() {
    let gateway = seeded_gateway(-1).await;
    let mut session = open_session(gateway).await;
    session.set_play_mode(PlayMode::SinglePause);

    session.handle_event(PlayerEvent::PlayStateChanged(true));
    session.handle_event(PlayerEvent::TimeAdvanced(1500.0));

    let commands = session.handle_event(PlayerEvent::TimeAdvanced(2100.0));
    assert_eq!(commands, vec![MediaCommand::Pause]);
    assert_eq!(session.current_index(), 0);

    // Возобновление возвращает к началу реплики
    let commands = session.toggle_play_pause();
    assert_eq!(commands, vec![MediaCommand::SeekTo(0), MediaCommand::Play]);
}

#[tokio::test]
async fn test_edit_save_round_trip() {
    let gateway = seeded_gateway(-1).await;
    let mut session = open_session(gateway.clone()).await;
    let observer = MemorySessionObserver::new();
    session.add_observer(Box::new(observer.clone()));

    let commands = session.enter_edit_mode(1).unwrap();
    assert_eq!(
        commands,
        vec![MediaCommand::Pause, MediaCommand::SeekTo(2000)]
    );
    assert!(session.is_edit_mode());
    assert_eq!(session.current_index(), 1);

    session.adjust_edited_time(EditField::Start, 200).unwrap();
    session.set_edited_text("Исправленная строка").unwrap();
    session.save_edit().await.unwrap();

    // Изменения видны сразу, без перечитывания
    assert!(!session.is_edit_mode());
    let entry = &session.track().entries[1];
    assert_eq!(entry.precise_start_ms, 2200);
    assert_eq!(entry.precise_end_ms, 4000);
    assert_eq!(entry.text, "Исправленная строка");

    // И отражены в хранилище
    let stored = gateway.get_subtitle_track_by_video(1).await.unwrap().unwrap();
    assert_eq!(stored.entries[1].precise_start_ms, 2200);
    assert_eq!(stored.entries[1].text, "Исправленная строка");

    assert!(observer
        .history()
        .contains(&SessionEvent::EditSaved { index: 1 }));
}

#[tokio::test]
async fn test_edit_cancel_leaves_entry_unchanged() {
    let gateway = seeded_gateway(-1).await;
    let mut session = open_session(gateway.clone()).await;

    let before = session.track().entries[0].clone();
    session.enter_edit_mode(0).unwrap();
    session.adjust_edited_time(EditField::End, 700).unwrap();
    session.set_edited_text("Черновик").unwrap();
    session.cancel_edit();

    assert_eq!(session.track().entries[0], before);
    let stored = gateway.get_subtitle_track_by_video(1).await.unwrap().unwrap();
    assert_eq!(stored.entries[0], before);
}

#[tokio::test]
async fn test_edit_save_failure_keeps_session_open() {
    let gateway = Arc::new(FailingGateway::new());
    gateway
        .put_media(MediaRecord::new(1, "Урок 1", "blob:lesson-1"))
        .await
        .unwrap();
    gateway
        .put_subtitle_track(SubtitleTrack::new(1, 1, sample_entries()))
        .await
        .unwrap();

    let mut session = ShadowSession::open(gateway.clone(), 1, PlayerConfig::default())
        .await
        .unwrap();
    session.enter_edit_mode(0).unwrap();
    session.adjust_edited_time(EditField::Start, 300).unwrap();

    gateway.set_fail_puts(true);
    let result = session.save_edit().await;
    assert!(matches!(result, Err(ShadowSyncError::Storage(_))));

    // Состояние в памяти не пострадало, сессия открыта для повтора
    assert!(session.is_edit_mode());
    assert_eq!(session.track().entries[0].precise_start_ms, 0);

    gateway.set_fail_puts(false);
    session.save_edit().await.unwrap();
    assert_eq!(session.track().entries[0].precise_start_ms, 300);
}

#[tokio::test]
async fn test_edit_and_recording_are_mutually_exclusive() {
    let gateway = seeded_gateway(-1).await;
    let mut session = open_session(gateway).await;

    session.enter_edit_mode(0).unwrap();
    assert!(matches!(
        session.enter_recording_mode(),
        Err(ShadowSyncError::InvalidState(_))
    ));
    session.cancel_edit();

    session.enter_recording_mode().unwrap();
    assert!(matches!(
        session.enter_edit_mode(0),
        Err(ShadowSyncError::InvalidState(_))
    ));
    session.exit_recording_mode();
    assert!(session.enter_edit_mode(0).is_ok());
}

#[tokio::test]
async fn test_recording_overrides_loop_mode() {
    let gateway = seeded_gateway(-1).await;
    let mut session = open_session(gateway).await;
    session.set_play_mode(PlayMode::SingleLoop);
    session.handle_event(PlayerEvent::TimeAdvanced(1500.0));

    session.enter_recording_mode().unwrap();
    let commands = session.handle_event(PlayerEvent::TimeAdvanced(2100.0));
    assert_eq!(commands, vec![MediaCommand::Pause]);

    // После выхода из записи зацикливание возвращается
    session.exit_recording_mode();
    session.handle_event(PlayerEvent::TimeAdvanced(1000.0));
    let commands = session.handle_event(PlayerEvent::TimeAdvanced(2100.0));
    assert_eq!(commands, vec![MediaCommand::SeekTo(0)]);
}

#[tokio::test]
async fn test_close_persists_index_after_navigation() {
    let gateway = seeded_gateway(-1).await;
    let mut session = open_session(gateway.clone()).await;

    session.jump_to(3).unwrap();
    session.close().await;

    let stored = gateway.get_subtitle_track_by_video(1).await.unwrap().unwrap();
    assert_eq!(stored.last_subtitle_index, 3);
}

#[tokio::test]
async fn test_close_without_changes_does_not_write() {
    // Сохраненная позиция не затирается сессией, в которой индекс не менялся
    let gateway = seeded_gateway(2).await;
    let mut session = open_session(gateway.clone()).await;

    let commands = session.start();
    assert_eq!(commands, vec![MediaCommand::SeekTo(5000)]);
    assert_eq!(session.current_index(), 2);

    session.close().await;

    let stored = gateway.get_subtitle_track_by_video(1).await.unwrap().unwrap();
    assert_eq!(stored.last_subtitle_index, 2);
}

#[tokio::test]
async fn test_resume_disabled_by_config() {
    let gateway = seeded_gateway(2).await;
    let config = PlayerConfig {
        resume_playback: false,
        ..PlayerConfig::default()
    };
    let mut session = ShadowSession::open(gateway, 1, config).await.unwrap();
    assert!(session.start().is_empty());
    assert_eq!(session.current_index(), -1);
}

#[tokio::test]
async fn test_source_guard_released_on_close() {
    let gateway = seeded_gateway(-1).await;
    let released = Arc::new(AtomicBool::new(false));
    let released_clone = released.clone();

    let mut session = ShadowSession::open_with_revoker(
        gateway,
        1,
        PlayerConfig::default(),
        move |url| {
            assert_eq!(url, "blob:lesson-1");
            released_clone.store(true, Ordering::SeqCst);
        },
    )
    .await
    .unwrap();

    assert_eq!(session.source_url(), Some("blob:lesson-1"));
    session.close().await;
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_source_guard_released_on_drop() {
    let gateway = seeded_gateway(-1).await;
    let released = Arc::new(AtomicBool::new(false));
    let released_clone = released.clone();

    let session = ShadowSession::open_with_revoker(
        gateway,
        1,
        PlayerConfig::default(),
        move |_| {
            released_clone.store(true, Ordering::SeqCst);
        },
    )
    .await
    .unwrap();

    drop(session);
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_clamp_policy_reject_surfaces_validation_error() {
    let gateway = seeded_gateway(-1).await;
    let config = PlayerConfig {
        clamp_policy: ClampPolicy::Reject,
        ..PlayerConfig::default()
    };
    let mut session = ShadowSession::open(gateway, 1, config).await.unwrap();

    session.enter_edit_mode(0).unwrap();
    session.adjust_edited_time(EditField::Start, 5000).unwrap();

    let result = session.save_edit().await;
    assert!(matches!(result, Err(ShadowSyncError::EditValidation(_))));
    assert!(session.is_edit_mode());
}

#[tokio::test]
async fn test_navigation_blocked_during_edit() {
    let gateway = seeded_gateway(-1).await;
    let mut session = open_session(gateway).await;

    session.enter_edit_mode(1).unwrap();
    assert!(session.next().is_empty());
    assert!(session.previous().is_empty());
    assert!(matches!(
        session.jump_to(2),
        Err(ShadowSyncError::InvalidState(_))
    ));
}
