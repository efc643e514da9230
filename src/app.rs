use std::sync::mpsc::Sender;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::clock::Clock;
use crate::config::{Config, ConfigStore};
use crate::input::Keystroke;
use crate::metrics::MetricsSnapshot;
use crate::reference::ReferenceText;
use crate::runtime::{AppEvent, MetricsTimer};
use crate::session::{KeyOutcome, Phase, SessionController, SessionResult};
use crate::store::{LeaderboardEntry, NewEntry, Repository, SortBy, Submission};
use crate::time_series::WpmTimeline;

/// Row limits the leaderboard screen cycles through
pub const LEADERBOARD_LIMITS: [usize; 4] = [10, 25, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Where the finished result stands with the store
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    /// No finished session yet.
    Idle,
    /// Finished, but no username to submit under.
    NeedsUsername,
    /// The user passed on submitting; `s` brings the name prompt back.
    Skipped,
    Submitted(Submission),
    /// The result is kept and can be submitted again.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct LeaderboardView {
    pub sort_by: SortBy,
    pub limit: usize,
    /// Only show entries for the passage currently loaded.
    pub current_content_only: bool,
    pub scroll_offset: usize,
    pub entries: Vec<LeaderboardEntry>,
    pub error: Option<String>,
}

impl LeaderboardView {
    fn new(sort_by: SortBy, limit: usize) -> Self {
        Self {
            sort_by,
            limit,
            current_content_only: false,
            scroll_offset: 0,
            entries: Vec::new(),
            error: None,
        }
    }

    /// Last row the view may start at; the renderer clamps to the same bound.
    pub fn max_scroll(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn visible_offset(&self) -> usize {
        self.scroll_offset.min(self.max_scroll())
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = self
            .visible_offset()
            .saturating_add_signed(delta)
            .min(self.max_scroll());
    }

    fn next_limit(&self) -> usize {
        LEADERBOARD_LIMITS
            .iter()
            .copied()
            .find(|&l| l > self.limit)
            .unwrap_or(LEADERBOARD_LIMITS[0])
    }
}

pub struct App<R: Repository, C: Clock> {
    pub session: SessionController<C>,
    pub state: AppState,
    pub live: MetricsSnapshot,
    pub timeline: WpmTimeline,
    pub submission: SubmissionState,
    /// Username being typed on the results screen.
    pub username_input: String,
    pub leaderboard: LeaderboardView,
    pub status: Option<String>,
    pub config: Config,
    store: R,
    config_store: Option<Box<dyn ConfigStore>>,
    tick_tx: Option<Sender<AppEvent>>,
    timer: Option<MetricsTimer>,
    return_state: AppState,
}

impl<R: Repository, C: Clock> App<R, C> {
    pub fn new(store: R, clock: C, reference: ReferenceText, config: Config) -> Self {
        let leaderboard = LeaderboardView::new(config.leaderboard_sort, config.leaderboard_limit);
        Self {
            session: SessionController::with_clock(reference, clock),
            state: AppState::Typing,
            live: MetricsSnapshot::default(),
            timeline: WpmTimeline::new(),
            submission: SubmissionState::Idle,
            username_input: String::new(),
            leaderboard,
            status: None,
            config,
            store,
            config_store: None,
            tick_tx: None,
            timer: None,
            return_state: AppState::Typing,
        }
    }

    /// Live metrics ticks are posted to `tx` while a session runs.
    pub fn with_tick_sender(mut self, tx: Sender<AppEvent>) -> Self {
        self.tick_tx = Some(tx);
        self
    }

    /// Lets a username typed on the results screen be remembered.
    pub fn with_config_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.as_ref().is_some_and(MetricsTimer::is_active)
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Tick => {
                self.on_tick();
                Control::Continue
            }
            AppEvent::Resize => Control::Continue,
            AppEvent::Key(key) => self.on_key(key),
        }
    }

    fn on_tick(&mut self) {
        if self.session.phase() != Phase::Running {
            return;
        }
        self.live = self.session.live_metrics();
        self.timeline.record(self.live.elapsed_secs, self.live.wpm);
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        // Ctrl+Alt is AltGr on some layouts and still types text
        let ctrl_only = key.modifiers.contains(KeyModifiers::CONTROL)
            && !key.modifiers.contains(KeyModifiers::ALT);
        if ctrl_only && key.code == KeyCode::Char('c') {
            return self.quit();
        }

        match self.state {
            AppState::Typing => self.on_typing_key(key),
            AppState::Results => self.on_results_key(key),
            AppState::Leaderboard => self.on_leaderboard_key(key),
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc => return self.quit(),
            KeyCode::Left => {
                self.restart();
                return Control::Continue;
            }
            KeyCode::Right => {
                self.new_passage();
                return Control::Continue;
            }
            _ => {}
        }

        let Some(keystroke) = Keystroke::from_key_event(&key) else {
            log::debug!("ignoring key {:?}", key.code);
            return Control::Continue;
        };

        match self.session.on_keystroke(keystroke) {
            KeyOutcome::Ignored => {}
            KeyOutcome::Started => {
                self.start_timer();
                self.live = self.session.live_metrics();
            }
            KeyOutcome::Applied => self.live = self.session.live_metrics(),
            KeyOutcome::Finished(result) => self.finish(result),
        }
        Control::Continue
    }

    fn on_results_key(&mut self, key: KeyEvent) -> Control {
        if self.submission == SubmissionState::NeedsUsername {
            return self.on_username_key(key);
        }

        match key.code {
            KeyCode::Esc => return self.quit(),
            KeyCode::Char('r') | KeyCode::Left => self.restart(),
            KeyCode::Char('n') | KeyCode::Right => self.new_passage(),
            KeyCode::Char('l') => self.open_leaderboard(),
            KeyCode::Char('s') => match self.submission {
                SubmissionState::Failed(_) => self.submit_result(),
                SubmissionState::Skipped => self.submission = SubmissionState::NeedsUsername,
                _ => {}
            },
            _ => {}
        }
        Control::Continue
    }

    /// Letters go to the name field, so only non-text keys navigate here.
    fn on_username_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc => return self.quit(),
            KeyCode::Enter => self.submit_with_typed_username(),
            KeyCode::Tab => {
                self.submission = SubmissionState::Skipped;
                self.status = None;
            }
            KeyCode::Left => self.restart(),
            KeyCode::Right => self.new_passage(),
            KeyCode::Backspace => {
                self.username_input.pop();
            }
            _ => {
                if let Some(Keystroke::Char(c)) = Keystroke::from_key_event(&key) {
                    self.username_input.push(c);
                }
            }
        }
        Control::Continue
    }

    fn on_leaderboard_key(&mut self, key: KeyEvent) -> Control {
        let view = &mut self.leaderboard;
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                self.state = self.return_state;
                return Control::Continue;
            }
            KeyCode::Char('r') => {
                self.restart();
                return Control::Continue;
            }
            KeyCode::Char('n') => {
                self.new_passage();
                return Control::Continue;
            }
            KeyCode::Up => view.scroll_by(-1),
            KeyCode::Down => view.scroll_by(1),
            KeyCode::PageUp => view.scroll_by(-10),
            KeyCode::PageDown => view.scroll_by(10),
            KeyCode::Home => view.scroll_offset = 0,
            KeyCode::Char('1') => view.sort_by = SortBy::Wpm,
            KeyCode::Char('2') => view.sort_by = SortBy::Accuracy,
            KeyCode::Char('s') => view.sort_by = view.sort_by.toggled(),
            KeyCode::Char('m') => view.limit = view.next_limit(),
            KeyCode::Char('c') => view.current_content_only = !view.current_content_only,
            _ => return Control::Continue,
        }

        let scrolled = matches!(
            key.code,
            KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown | KeyCode::Home
        );
        if !scrolled {
            self.refresh_leaderboard();
        }
        Control::Continue
    }

    fn finish(&mut self, result: SessionResult) {
        self.stop_timer();
        self.live = self.session.live_metrics();
        self.timeline.record(self.live.elapsed_secs, result.wpm);
        self.state = AppState::Results;

        match self.config.username.clone() {
            Some(name) if !name.trim().is_empty() => {
                self.username_input = name;
                self.submit_result();
            }
            _ => self.submission = SubmissionState::NeedsUsername,
        }
    }

    fn submit_with_typed_username(&mut self) {
        let name = self.username_input.trim().to_string();
        if name.is_empty() {
            self.status = Some("enter a name to submit your score".into());
            return;
        }

        self.config.username = Some(name);
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&self.config) {
                log::warn!("could not save username to config: {e}");
            }
        }
        self.submit_result();
    }

    /// Sends the frozen result to the store. A stored result is never sent
    /// twice; a failed one may be sent again.
    pub fn submit_result(&mut self) {
        if matches!(self.submission, SubmissionState::Submitted(_)) {
            return;
        }
        let Some(result) = self.session.result() else {
            return;
        };

        let outcome = NewEntry::from_result(&self.username_input, result)
            .and_then(|entry| self.store.submit(&entry));

        self.submission = match outcome {
            Ok(submission) => {
                self.status = Some(format!("score submitted, rank #{}", submission.rank));
                SubmissionState::Submitted(submission)
            }
            Err(e) => {
                log::warn!("submission failed: {e}");
                self.status = Some(format!("{e} (press s to retry)"));
                SubmissionState::Failed(e.to_string())
            }
        };
    }

    pub fn restart(&mut self) {
        self.stop_timer();
        self.session.restart();
        self.reset_view();
    }

    /// Loads another passage from the library and starts over on it.
    pub fn new_passage(&mut self) {
        let next = self
            .store
            .random_content()
            .and_then(|content| content.reference_text());

        match next {
            Ok(reference) => {
                self.stop_timer();
                self.session.restart_with(reference);
                self.reset_view();
            }
            Err(e) => {
                log::warn!("could not load a new passage: {e}");
                self.status = Some(format!("could not load a new passage: {e}"));
            }
        }
    }

    pub fn open_leaderboard(&mut self) {
        if self.state != AppState::Leaderboard {
            self.return_state = self.state;
        }
        self.state = AppState::Leaderboard;
        self.refresh_leaderboard();
    }

    pub fn refresh_leaderboard(&mut self) {
        let view = &mut self.leaderboard;
        let loaded = if view.current_content_only {
            self.store
                .leaderboard_for_content(self.session.reference().content_id(), view.limit)
        } else {
            self.store.leaderboard(view.sort_by, view.limit)
        };

        match loaded {
            Ok(entries) => {
                view.entries = entries;
                view.scroll_offset = view.visible_offset();
                view.error = None;
            }
            Err(e) => {
                log::warn!("could not load leaderboard: {e}");
                view.entries.clear();
                view.error = Some(e.to_string());
            }
        }
    }

    /// Stops the metrics timer; call before leaving the event loop.
    pub fn shutdown(&mut self) {
        self.stop_timer();
    }

    fn quit(&mut self) -> Control {
        self.shutdown();
        Control::Quit
    }

    fn reset_view(&mut self) {
        self.state = AppState::Typing;
        self.live = MetricsSnapshot::default();
        self.timeline.clear();
        self.submission = SubmissionState::Idle;
        self.status = None;
    }

    fn start_timer(&mut self) {
        if let Some(tx) = &self.tick_tx {
            let interval = Duration::from_millis(self.config.tick_rate_ms);
            self.timer = Some(MetricsTimer::start(tx.clone(), interval));
        }
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{ContentSource, LeaderboardQuery, NewContent, ResultSink, SourceType, Store};
    use assert_matches::assert_matches;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app_with(text: &str, username: Option<&str>) -> (App<Store, ManualClock>, ManualClock) {
        let store = Store::open_in_memory().unwrap();
        let content = store
            .create_content(&NewContent::new("Test", text, SourceType::Paste).unwrap())
            .unwrap();
        let clock = ManualClock::new();
        let config = Config {
            username: username.map(str::to_string),
            ..Config::default()
        };
        let app = App::new(store, clock.clone(), content.reference_text().unwrap(), config);
        (app, clock)
    }

    fn type_str<R: Repository, C: Clock>(app: &mut App<R, C>, s: &str) {
        for c in s.chars() {
            app.handle_event(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_finish_auto_submits_with_known_username() {
        let (mut app, clock) = app_with("cat", Some("ada"));
        app.handle_event(key(KeyCode::Char('c')));
        clock.advance_secs(6);
        type_str(&mut app, "at");

        assert_eq!(app.state, AppState::Results);
        let submission = assert_matches!(&app.submission, SubmissionState::Submitted(s) => s);
        assert_eq!(submission.rank, 1);
        assert_eq!(submission.entry.username, "ada");
        assert_eq!(submission.entry.wpm, 6.0);
    }

    #[test]
    fn test_finish_without_username_prompts() {
        let (mut app, _) = app_with("hi", None);
        type_str(&mut app, "hi");
        assert_eq!(app.submission, SubmissionState::NeedsUsername);

        // empty name is refused
        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.submission, SubmissionState::NeedsUsername);

        type_str(&mut app, "bob");
        app.handle_event(key(KeyCode::Enter));
        assert_matches!(
            &app.submission,
            SubmissionState::Submitted(s) if s.entry.username == "bob"
        );
        assert_eq!(app.config.username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_name_prompt_arrows_leave_results() {
        let (mut app, _) = app_with("hi", None);
        type_str(&mut app, "hi");
        type_str(&mut app, "al");
        app.handle_event(key(KeyCode::Left));

        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(app.submission, SubmissionState::Idle);
        assert_eq!(app.username_input, "al");

        type_str(&mut app, "hi");
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.track().cursor(), 0);
        assert!(app.store().leaderboard(SortBy::Wpm, 10).unwrap().is_empty());
    }

    #[test]
    fn test_name_prompt_tab_skips_submission() {
        let (mut app, _) = app_with("hi", None);
        type_str(&mut app, "hi");
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.submission, SubmissionState::Skipped);

        // results keys work again once skipped
        app.handle_event(key(KeyCode::Char('l')));
        assert_eq!(app.state, AppState::Leaderboard);
        assert!(app.leaderboard.entries.is_empty());
        app.handle_event(key(KeyCode::Esc));

        app.handle_event(key(KeyCode::Char('s')));
        assert_eq!(app.submission, SubmissionState::NeedsUsername);
        type_str(&mut app, "eve");
        app.handle_event(key(KeyCode::Enter));
        assert_matches!(
            &app.submission,
            SubmissionState::Submitted(s) if s.entry.username == "eve"
        );
    }

    #[test]
    fn test_name_prompt_accepts_altgr_characters() {
        let (mut app, _) = app_with("hi", None);
        type_str(&mut app, "hi");
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        type_str(&mut app, "jo");
        app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Char('@'), altgr)));
        app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)));

        assert_eq!(app.username_input, "jo@");
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_result_submitted_once() {
        let (mut app, _) = app_with("hi", Some("ada"));
        type_str(&mut app, "hi");
        app.submit_result();
        app.submit_result();

        let entries = app.store().leaderboard(SortBy::Wpm, 10).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_ignored_keys_while_typing() {
        let (mut app, _) = app_with("cat", None);
        app.handle_event(key(KeyCode::Tab));
        app.handle_event(key(KeyCode::Up));
        app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT)));

        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(app.session.track().cursor(), 0);
    }

    #[test]
    fn test_ticks_update_live_metrics() {
        let (mut app, clock) = app_with("hello world", None);
        type_str(&mut app, "hello");
        clock.advance_secs(6);
        app.handle_event(AppEvent::Tick);

        assert_eq!(app.live.wpm, 10.0);
        assert_eq!(app.timeline.samples().len(), 1);
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let (mut app, _) = app_with("hello", None);
        app.handle_event(AppEvent::Tick);
        assert_eq!(app.live, MetricsSnapshot::default());
        assert!(app.timeline.samples().is_empty());
    }

    #[test]
    fn test_restart_from_results() {
        let (mut app, _) = app_with("hi", Some("ada"));
        type_str(&mut app, "hi");
        app.handle_event(key(KeyCode::Char('r')));

        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.phase(), Phase::Idle);
        assert_eq!(app.submission, SubmissionState::Idle);
        assert!(app.session.result().is_none());
    }

    #[test]
    fn test_altgr_characters_are_typed() {
        let (mut app, _) = app_with("a@c", None);
        app.handle_event(key(KeyCode::Char('a')));
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Char('@'), altgr)));

        assert_eq!(app.session.track().cursor(), 2);
        assert_eq!(app.session.track().correct_count(), 2);

        let quit = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.handle_event(quit), Control::Quit);
    }

    #[test]
    fn test_esc_quits() {
        let (mut app, _) = app_with("hi", None);
        assert_eq!(app.handle_event(key(KeyCode::Esc)), Control::Quit);
    }

    #[test]
    fn test_leaderboard_navigation() {
        let (mut app, _) = app_with("hi", Some("ada"));
        type_str(&mut app, "hi");
        app.handle_event(key(KeyCode::Char('l')));

        assert_eq!(app.state, AppState::Leaderboard);
        assert_eq!(app.leaderboard.entries.len(), 1);

        app.handle_event(key(KeyCode::Char('2')));
        assert_eq!(app.leaderboard.sort_by, SortBy::Accuracy);

        app.handle_event(key(KeyCode::Char('m')));
        assert_eq!(app.leaderboard.limit, 100);
        app.handle_event(key(KeyCode::Char('m')));
        assert_eq!(app.leaderboard.limit, 10);

        app.handle_event(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_leaderboard_scroll_stops_at_last_row() {
        let (mut app, _) = app_with("hi", Some("ada"));
        let content_id = app.session.reference().content_id().to_string();
        for (i, wpm) in [50.0, 40.0, 30.0].into_iter().enumerate() {
            let entry = NewEntry {
                username: format!("user{i}"),
                content_id: content_id.clone(),
                wpm,
                accuracy: 100.0,
                duration_seconds: 10,
                error_count: 0,
                correct_chars: 2,
                total_chars: 2,
            };
            app.store().submit(&entry).unwrap();
        }
        app.open_leaderboard();
        assert_eq!(app.leaderboard.entries.len(), 3);

        for _ in 0..10 {
            app.handle_event(key(KeyCode::Down));
        }
        assert_eq!(app.leaderboard.scroll_offset, 2);
        app.handle_event(key(KeyCode::PageDown));
        assert_eq!(app.leaderboard.scroll_offset, 2);

        // one step up moves the view right away
        app.handle_event(key(KeyCode::Up));
        assert_eq!(app.leaderboard.scroll_offset, 1);
        assert_eq!(app.leaderboard.visible_offset(), 1);
    }

    #[test]
    fn test_timer_lifecycle() {
        let (tx, _rx) = std::sync::mpsc::channel();
        let (app, _) = app_with("abc", None);
        let mut app = app.with_tick_sender(tx);

        assert!(!app.is_timer_active());
        app.handle_event(key(KeyCode::Char('a')));
        assert!(app.is_timer_active());

        app.handle_event(key(KeyCode::Left));
        assert!(!app.is_timer_active());

        type_str(&mut app, "abc");
        assert_eq!(app.state, AppState::Results);
        assert!(!app.is_timer_active());
    }
}
