use crossterm::event::KeyCode;
use farm_atlas::{
    BoundarySelectionController, Clock, ConfiguredLocation, GeoPoint, LocationProvider,
    MapSurface, Navigator, PointOutcome, SessionResult, SessionStatus, Settings, SystemClock,
    data::INDIA_CENTER, export::write_boundary, splash::Preloader,
};
use std::{cell::RefCell, path::PathBuf, rc::Rc};

use crate::map_draw::MapView;

/// Hands the finished session from the controller to the screen.
#[derive(Clone, Default)]
pub struct Handoff(Rc<RefCell<Option<SessionResult>>>);

impl Handoff {
    fn take(&self) -> Option<SessionResult> {
        self.0.borrow_mut().take()
    }
}

impl Navigator for Handoff {
    fn on_analysis_complete(&mut self, result: &SessionResult) {
        *self.0.borrow_mut() = Some(result.clone());
    }
}

pub enum Screen {
    Splash(Preloader),
    /// Location resolved, waiting before the camera pans.
    Locating { center: GeoPoint, pan_at: u64 },
    /// Camera panning; instructions show at `message_at`.
    Centering { message_at: u64 },
    Map,
    Results(SessionResult),
}

pub const HELP_TEXT: &str = "\
←↑↓→: move cursor
s: start selecting
Enter / Space: tap point
Esc: cancel session
q: quit";

pub struct AppState<C: Clock + Clone = SystemClock> {
    pub settings: Settings,
    data_dir: PathBuf,
    clock: C,
    location: ConfiguredLocation,
    pub controller: BoundarySelectionController<C, Handoff>,
    handoff: Handoff,
    pub map: MapView,
    pub screen: Screen,
    /// One-line status shown under the help text.
    pub notice: Option<String>,
}

impl AppState<SystemClock> {
    pub fn new(data_dir: &str) -> anyhow::Result<Self> {
        Self::with_clock(data_dir, SystemClock::new())
    }
}

impl<C: Clock + Clone> AppState<C> {
    pub fn with_clock(data_dir: &str, clock: C) -> anyhow::Result<Self> {
        let data_dir = PathBuf::from(data_dir);
        let settings = Settings::load(&data_dir)?;
        let handoff = Handoff::default();
        let controller =
            BoundarySelectionController::from_settings(clock.clone(), handoff.clone(), &settings)?;
        let location = ConfiguredLocation::new(settings.initial_center);
        let now = clock.now_ms();

        Ok(Self {
            settings,
            data_dir,
            clock,
            location,
            controller,
            handoff,
            map: MapView::new(INDIA_CENTER),
            screen: Screen::Splash(Preloader::new(now)),
            notice: None,
        })
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Runs once per frame: screen timers, camera, controller timers.
    pub fn update(&mut self) {
        let now = self.clock.now_ms();
        self.map.update(now);

        match &self.screen {
            Screen::Splash(preloader) => {
                if preloader.is_done(now) {
                    let (center, fallback) = self.location.initial_center(self.settings.fallback_center);
                    if fallback {
                        self.notice = Some("Location permission denied, using default location".into());
                    }
                    self.screen = Screen::Locating {
                        center,
                        pan_at: now.saturating_add(self.settings.location_settle_ms),
                    };
                }
            }
            Screen::Locating { center, pan_at } => {
                if now >= *pan_at {
                    self.map.animate_to(*center, self.settings.map_zoom_ms);
                    self.screen = Screen::Centering {
                        message_at: now.saturating_add(self.settings.centering_delay_ms()),
                    };
                }
            }
            Screen::Centering { message_at } => {
                if now >= *message_at {
                    if let Err(e) = self.controller.map_centered() {
                        log::warn!("{}", e);
                    }
                    self.screen = Screen::Map;
                }
            }
            Screen::Map => {
                if !self.controller.tick().is_empty() {
                    self.map.show_selection(self.controller.state().selection());
                }
                if let Some(result) = self.handoff.take() {
                    self.finish(result);
                }
            }
            Screen::Results(_) => {}
        }
    }

    fn finish(&mut self, result: SessionResult) {
        let path = self.settings.export_path(&self.data_dir);
        match write_boundary(&result, &path) {
            Ok(()) => self.notice = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("export failed: {}", e);
                self.notice = Some(format!("Export failed: {}", e));
            }
        }
        self.screen = Screen::Results(result);
    }

    /// Back to AwaitingStart with a fresh session.
    fn restart(&mut self) {
        self.controller.teardown();
        if let Err(e) = self.controller.map_centered() {
            log::warn!("{}", e);
        }
        self.map.show_selection(self.controller.state().selection());
    }

    /// Returns true when the app should exit.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        use KeyCode::*;
        if key == Char('q') {
            self.controller.teardown();
            return true;
        }
        match self.screen {
            Screen::Map => match key {
                Up => self.map.move_cursor(1, 0),
                Down => self.map.move_cursor(-1, 0),
                Left => self.map.move_cursor(0, -1),
                Right => self.map.move_cursor(0, 1),
                Char('s') => match self.controller.begin_selection() {
                    Ok(()) => {
                        self.notice = None;
                        self.map.show_selection(self.controller.state().selection());
                    }
                    Err(e) => log::debug!("{}", e),
                },
                Enter | Char(' ') => {
                    let outcome = self.controller.add_point(self.map.cursor());
                    if let PointOutcome::BoundaryReady { area_acres } = outcome {
                        self.notice = Some(format!("Farm area: {:.3} acres", area_acres));
                    }
                    self.map.show_selection(self.controller.state().selection());
                }
                Esc | Backspace => {
                    if self.controller.status() != SessionStatus::AwaitingStart {
                        self.notice = Some("Session cancelled".into());
                        self.restart();
                    }
                }
                _ => {}
            },
            Screen::Results(_) => {
                if matches!(key, Enter | Esc | Char('r')) {
                    self.notice = None;
                    self.restart();
                    self.screen = Screen::Map;
                }
            }
            _ => {}
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_atlas::{ManualClock, data::MUMBAI_FALLBACK};
    use std::fs;

    fn app(dir: &std::path::Path) -> (AppState<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let app = AppState::with_clock(dir.to_str().unwrap(), clock.clone()).unwrap();
        (app, clock)
    }

    /// Runs the splash, location and centering phases with default timings.
    fn reach_map(app: &mut AppState<ManualClock>, clock: &ManualClock) {
        clock.set(Preloader::duration_ms());
        app.update();
        clock.advance(300);
        app.update();
        clock.advance(2200);
        app.update();
        assert!(matches!(app.screen, Screen::Map));
    }

    #[test]
    fn test_handoff_takes_result_once() {
        let mut handoff = Handoff::default();
        let result = SessionResult { area_acres: 1.5, boundary: Vec::new() };
        handoff.on_analysis_complete(&result);
        assert_eq!(handoff.take(), Some(result));
        assert_eq!(handoff.take(), None);
    }

    #[test]
    fn test_splash_ignores_map_keys() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app(dir.path());
        app.handle_input(KeyCode::Char('s'));
        assert_eq!(app.controller.status(), SessionStatus::Idle);
        assert!(app.handle_input(KeyCode::Char('q')));
    }

    #[test]
    fn test_screen_timing_chain_with_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, clock) = app(dir.path());

        clock.set(Preloader::duration_ms() - 1);
        app.update();
        assert!(matches!(app.screen, Screen::Splash(_)));
        assert!(app.notice.is_none());

        clock.set(Preloader::duration_ms());
        app.update();
        let pan_at = Preloader::duration_ms() + 300;
        assert!(matches!(
            app.screen,
            Screen::Locating { center, pan_at: at } if center == MUMBAI_FALLBACK && at == pan_at
        ));
        assert!(app.notice.as_deref().unwrap().contains("permission denied"));

        clock.set(pan_at - 1);
        app.update();
        assert!(matches!(app.screen, Screen::Locating { .. }));
        clock.set(pan_at);
        app.update();
        let message_at = pan_at + 1800 + 400;
        assert!(matches!(app.screen, Screen::Centering { message_at: at } if at == message_at));
        assert_eq!(app.controller.status(), SessionStatus::Idle);

        clock.set(message_at - 1);
        app.update();
        assert!(matches!(app.screen, Screen::Centering { .. }));
        clock.set(message_at);
        app.update();
        assert!(matches!(app.screen, Screen::Map));
        assert_eq!(app.controller.status(), SessionStatus::AwaitingStart);

        // camera finishes its pan onto the fallback center
        clock.advance(1800);
        app.update();
        assert_eq!(app.map.cursor(), MUMBAI_FALLBACK);
    }

    #[test]
    fn test_configured_location_has_no_notice() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{ "initial_center": { "latitude": 18.52, "longitude": 73.85 } }"#,
        )
        .unwrap();
        let (mut app, clock) = app(dir.path());
        clock.set(Preloader::duration_ms());
        app.update();
        assert!(app.notice.is_none());
        assert!(matches!(
            app.screen,
            Screen::Locating { center, .. } if center == GeoPoint::new(18.52, 73.85)
        ));
    }

    #[test]
    fn test_session_hands_off_to_results_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, clock) = app(dir.path());
        reach_map(&mut app, &clock);
        clock.advance(2000);
        app.update();

        app.handle_input(KeyCode::Char('s'));
        assert_eq!(app.controller.status(), SessionStatus::Selecting);
        for key in [KeyCode::Up, KeyCode::Right, KeyCode::Down] {
            app.handle_input(KeyCode::Enter);
            app.handle_input(key);
        }
        app.handle_input(KeyCode::Enter);
        assert_eq!(app.controller.status(), SessionStatus::BoundaryReady);
        assert!(app.notice.as_deref().unwrap().starts_with("Farm area"));

        clock.advance(2500 + 5 * 1800 + 1500 - 1);
        app.update();
        assert!(matches!(app.screen, Screen::Map));
        assert_eq!(app.controller.status(), SessionStatus::Analyzing);

        clock.advance(1);
        app.update();
        let Screen::Results(result) = &app.screen else {
            panic!("expected results screen");
        };
        assert_eq!(result.boundary.len(), 4);
        assert!(result.area_acres > 0.0);
        assert!(dir.path().join("boundary.geojson").exists());
        assert!(app.notice.as_deref().unwrap().starts_with("Saved"));

        app.handle_input(KeyCode::Enter);
        assert!(matches!(app.screen, Screen::Map));
        assert_eq!(app.controller.status(), SessionStatus::AwaitingStart);
    }

    #[test]
    fn test_escape_cancels_pending_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, clock) = app(dir.path());
        reach_map(&mut app, &clock);

        app.handle_input(KeyCode::Char('s'));
        for _ in 0..4 {
            app.handle_input(KeyCode::Enter);
            app.handle_input(KeyCode::Up);
            app.handle_input(KeyCode::Right);
        }
        assert_eq!(app.controller.status(), SessionStatus::BoundaryReady);

        app.handle_input(KeyCode::Esc);
        assert_eq!(app.controller.status(), SessionStatus::AwaitingStart);
        assert!(app.controller.pending_timer().is_none());
        clock.advance(60_000);
        app.update();
        assert!(matches!(app.screen, Screen::Map));
        assert!(!dir.path().join("boundary.geojson").exists());
    }
}
