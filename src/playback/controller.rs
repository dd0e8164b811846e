//! Контроллер режимов воспроизведения
//!
//! Единственная точка принятия решений, переводящая «время продвинулось»
//! в одно из действий: ничего не делать, обновить текущий индекс,
//! перемотать или остановить воспроизведение. Контроллер не хранит
//! замыканий и не подписывается на события сам: он получает дискретные
//! входы ([`PlayerEvent`]) и на каждом вызове перечитывает собственное
//! состояние, возвращая команды медиаэлементу и события для интерфейса.
//!
//! Все сравнения выполняются в миллисекундах; время медиаэлемента
//! приходит уже умноженным на 1000 и не округляется. Граница реплики
//! проверяется как `now >= precise_end`, поэтому перемотка точно на
//! конец реплики считается ее завершением. Время не обязано расти
//! монотонно: перемотка назад — нормальный вход.

use super::media::{MediaCommand, PlayerEvent};
use super::PlayMode;
use crate::events::SessionEvent;
use crate::subtitle::{resolve_index, SubtitleTrack};

/// Фаза пользовательской перемотки
///
/// Пока пользователь тянет ползунок, события времени не должны менять
/// индекс и запускать логику границ: программные перемотки циклов и пауз
/// конфликтовали бы с жестом пользователя.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubState {
    /// Перемотки нет, события обрабатываются обычным образом
    Idle,
    /// Идет пользовательская перемотка
    Scrubbing,
}

/// Фаза восстановления сохраненной позиции
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeState {
    /// Ожидается переход к сохраненному индексу
    Pending(i64),
    /// Восстановление выполнено или не требуется
    Done,
}

/// Результат обработки одного входа контроллером
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Transition {
    /// Команды медиаэлементу, в порядке выполнения
    pub commands: Vec<MediaCommand>,
    /// События для слоя интерфейса
    pub events: Vec<SessionEvent>,
}

impl Transition {
    /// Пустой результат: ни команд, ни событий
    pub fn none() -> Self {
        Self::default()
    }
}

/// Контроллер режимов воспроизведения
#[derive(Debug)]
pub struct PlaybackController {
    /// Текущий режим воспроизведения
    mode: PlayMode,
    /// Индекс текущего субтитра; `-1` — субтитра нет
    current_index: i64,
    /// Последняя известная позиция (мс)
    position_ms: f64,
    /// Предполагаемое состояние воспроизведения
    playing: bool,
    /// Активен ли режим редактирования
    edit_mode: bool,
    /// Активен ли режим записи
    recording_mode: bool,
    /// Кандидатные границы из сессии редактирования (мс)
    preview_bounds: Option<(u64, u64)>,
    /// Фаза пользовательской перемотки
    scrub: ScrubState,
    /// Фаза восстановления сохраненной позиции
    resume: ResumeState,
    /// Граница текущей реплики уже сработала; защелка гарантирует
    /// ровно одну паузу на одно пересечение границы
    boundary_latched: bool,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    /// Создает контроллер в обычном режиме без текущего субтитра
    pub fn new() -> Self {
        Self {
            mode: PlayMode::Off,
            current_index: -1,
            position_ms: 0.0,
            playing: false,
            edit_mode: false,
            recording_mode: false,
            preview_bounds: None,
            scrub: ScrubState::Idle,
            resume: ResumeState::Done,
            boundary_latched: false,
        }
    }

    /// Индекс текущего субтитра; `-1` — субтитра нет
    pub fn current_index(&self) -> i64 {
        self.current_index
    }

    /// Текущий режим воспроизведения
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Предполагаемое состояние воспроизведения
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Последняя известная позиция (мс)
    pub fn position_ms(&self) -> f64 {
        self.position_ms
    }

    /// Активен ли режим редактирования
    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Активен ли режим записи
    pub fn is_recording_mode(&self) -> bool {
        self.recording_mode
    }

    /// Устанавливает режим воспроизведения
    pub fn set_play_mode(&mut self, mode: PlayMode) {
        if self.mode != mode {
            log::debug!("Смена режима воспроизведения: {}", mode.as_str());
            self.mode = mode;
            self.boundary_latched = false;
        }
    }

    /// Включает или выключает режим редактирования
    ///
    /// Взаимное исключение с режимом записи обеспечивает сессия.
    pub fn set_edit_mode(&mut self, active: bool) {
        self.edit_mode = active;
        self.boundary_latched = false;
        if !active {
            self.preview_bounds = None;
        }
    }

    /// Включает или выключает режим записи
    pub fn set_recording_mode(&mut self, active: bool) {
        self.recording_mode = active;
        self.boundary_latched = false;
    }

    /// Задает кандидатные границы предпросмотра из сессии редактирования
    pub fn set_preview_bounds(&mut self, bounds: Option<(u64, u64)>) {
        self.preview_bounds = bounds;
        self.boundary_latched = false;
    }

    /// Откладывает переход к сохраненному индексу до запуска сессии
    pub fn set_resume_pending(&mut self, index: i64) {
        self.resume = ResumeState::Pending(index);
    }

    /// Выполняет отложенный переход к сохраненному индексу, если он есть
    ///
    /// Переход выполняется не более одного раза за сессию.
    pub fn resume_if_pending(&mut self, track: &SubtitleTrack) -> Transition {
        if let ResumeState::Pending(index) = self.resume {
            self.resume = ResumeState::Done;
            if index >= 0 && (index as usize) < track.len() {
                return self.jump_to(track, index as usize);
            }
        }
        Transition::none()
    }

    /// Режимы редактирования/записи подменяют семантику границ
    fn overlay_active(&self) -> bool {
        self.edit_mode || self.recording_mode
    }

    /// Действует ли семантика «пауза на границе»
    fn pause_semantics(&self) -> bool {
        self.overlay_active() || self.mode == PlayMode::SinglePause
    }

    /// Границы текущей реплики для проверок (мс)
    ///
    /// В режимах редактирования/записи используются кандидатные границы,
    /// если они заданы; иначе — уточненные метки самой реплики.
    fn boundary_bounds(&self, track: &SubtitleTrack) -> Option<(u64, u64)> {
        if self.current_index < 0 {
            return None;
        }
        let entry = track.entry(self.current_index as usize)?;
        if self.overlay_active() {
            if let Some(bounds) = self.preview_bounds {
                return Some(bounds);
            }
        }
        Some((entry.precise_start_ms, entry.precise_end_ms))
    }

    /// Обновляет индекс по резолверу; промах оставляет индекс без изменений
    fn update_index(&mut self, track: &SubtitleTrack, t_ms: f64, events: &mut Vec<SessionEvent>) {
        if let Some(found) = resolve_index(&track.entries, t_ms) {
            if found as i64 != self.current_index {
                self.current_index = found as i64;
                self.boundary_latched = false;
                events.push(SessionEvent::IndexChanged {
                    index: self.current_index,
                });
            }
        }
    }

    /// Обрабатывает одно событие медиаэлемента
    pub fn handle_event(&mut self, track: &SubtitleTrack, event: PlayerEvent) -> Transition {
        match event {
            PlayerEvent::TimeAdvanced(t_ms) => self.on_time_advanced(track, t_ms),
            PlayerEvent::PlayStateChanged(playing) => self.on_play_state_changed(track, playing),
            PlayerEvent::ScrubStarted => {
                self.scrub = ScrubState::Scrubbing;
                Transition::none()
            }
            PlayerEvent::ScrubEnded(t_ms) => self.on_scrub_ended(track, t_ms),
        }
    }

    fn on_time_advanced(&mut self, track: &SubtitleTrack, t_ms: f64) -> Transition {
        // Во время пользовательской перемотки границы и индекс не трогаем
        if self.scrub == ScrubState::Scrubbing {
            return Transition::none();
        }

        self.position_ms = t_ms;
        let mut transition = Transition::none();

        if self.pause_semantics() {
            if let Some((_, end)) = self.boundary_bounds(track) {
                if t_ms >= end as f64 {
                    if !self.boundary_latched {
                        self.boundary_latched = true;
                        self.playing = false;
                        transition.commands.push(MediaCommand::Pause);
                        transition.events.push(SessionEvent::PausedAtBoundary {
                            index: self.current_index,
                        });
                    }
                    return transition;
                }
            }
            // Режим редактирования/записи привязан к одной реплике,
            // индекс меняется только навигацией
            if !self.overlay_active() {
                self.update_index(track, t_ms, &mut transition.events);
            }
        } else if self.mode == PlayMode::SingleLoop {
            if let Some((start, end)) = self.boundary_bounds(track) {
                if t_ms >= end as f64 {
                    self.position_ms = start as f64;
                    transition.commands.push(MediaCommand::SeekTo(start));
                    transition.events.push(SessionEvent::Looped {
                        index: self.current_index,
                    });
                    return transition;
                }
            }
            self.update_index(track, t_ms, &mut transition.events);
        } else {
            self.update_index(track, t_ms, &mut transition.events);
        }

        transition
    }

    fn on_play_state_changed(&mut self, track: &SubtitleTrack, playing: bool) -> Transition {
        self.playing = playing;
        let mut transition = Transition::none();

        if playing {
            // При старте воспроизведения за границей реплики возвращаемся
            // к ее началу
            if self.pause_semantics() {
                if let Some((start, end)) = self.boundary_bounds(track) {
                    if self.position_ms >= end as f64 {
                        self.position_ms = start as f64;
                        transition.commands.push(MediaCommand::SeekTo(start));
                    }
                }
            }
            self.boundary_latched = false;
        }

        transition
    }

    fn on_scrub_ended(&mut self, track: &SubtitleTrack, t_ms: f64) -> Transition {
        self.scrub = ScrubState::Idle;
        self.position_ms = t_ms;
        self.boundary_latched = false;

        // Единственный пересчет индекса после завершения жеста;
        // промах оставляет индекс прежним
        let mut transition = Transition::none();
        self.update_index(track, t_ms, &mut transition.events);
        transition
    }

    /// Переключает воспроизведение/паузу
    ///
    /// При возобновлении в режимах с семантикой паузы за границей реплики
    /// сначала выполняется перемотка к ее началу, затем запуск.
    pub fn toggle_play_pause(&mut self, track: &SubtitleTrack) -> Transition {
        let mut transition = Transition::none();

        if self.playing {
            self.playing = false;
            transition.commands.push(MediaCommand::Pause);
            return transition;
        }

        if self.pause_semantics() {
            if let Some((start, end)) = self.boundary_bounds(track) {
                if self.position_ms >= end as f64 {
                    self.position_ms = start as f64;
                    transition.commands.push(MediaCommand::SeekTo(start));
                }
            }
        }

        self.boundary_latched = false;
        self.playing = true;
        transition.commands.push(MediaCommand::Play);
        transition
    }

    /// Безусловно останавливает воспроизведение
    pub fn pause(&mut self) -> Transition {
        let mut transition = Transition::none();
        self.playing = false;
        transition.commands.push(MediaCommand::Pause);
        transition
    }

    /// Переходит к субтитру с указанным индексом
    ///
    /// Навигация — единственный способ установить индекс, не покрытый
    /// текущей позицией. Перемотка выполняется к метке отображения.
    pub fn jump_to(&mut self, track: &SubtitleTrack, index: usize) -> Transition {
        let entry = match track.entry(index) {
            Some(entry) => entry,
            None => return Transition::none(),
        };

        let mut transition = Transition::none();
        self.boundary_latched = false;
        self.position_ms = entry.start_ms as f64;
        transition.commands.push(MediaCommand::SeekTo(entry.start_ms));

        if self.current_index != index as i64 {
            self.current_index = index as i64;
            transition.events.push(SessionEvent::IndexChanged {
                index: self.current_index,
            });
        }

        transition
    }

    /// Переходит к следующему субтитру
    pub fn next(&mut self, track: &SubtitleTrack) -> Transition {
        if track.is_empty() {
            return Transition::none();
        }
        let target = if self.current_index < 0 {
            0
        } else {
            ((self.current_index + 1) as usize).min(track.len() - 1)
        };
        self.jump_to(track, target)
    }

    /// Переходит к предыдущему субтитру
    pub fn previous(&mut self, track: &SubtitleTrack) -> Transition {
        if track.is_empty() {
            return Transition::none();
        }
        let target = if self.current_index <= 0 {
            0
        } else {
            (self.current_index - 1) as usize
        };
        self.jump_to(track, target)
    }
}
