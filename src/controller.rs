//! Boundary selection and analysis state machine
//!
//! ```text
//! Idle --map_centered--> AwaitingStart --begin_selection--> Selecting
//! Selecting --4th add_point--> BoundaryReady --delay--> Analyzing
//! Analyzing --step interval x N, settle delay--> Complete
//! ```
//!
//! All mutation goes through the entry points below and runs on the host's
//! event loop. Timed transitions are held in a single [`TimerSlot`]; the
//! host drives them by calling [`BoundarySelectionController::tick`] from
//! its loop, or by handing a timer back through
//! [`BoundarySelectionController::fire`] if it runs its own timers.

use crate::area::quad_area_acres;
use crate::clock::Clock;
use crate::collaborators::Navigator;
use crate::config::Settings;
use crate::data::{AnalysisStep, BOUNDARY_POINTS, BoundarySelection, GeoPoint};
use crate::error::{BoundaryError, Result};
use crate::timer::{PendingTimer, SessionId, TimerSlot, Transition};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Screen mounted, map not yet centered
    #[default]
    Idle,
    /// Map centered, waiting for the user to start
    AwaitingStart,
    /// Collecting taps
    Selecting,
    /// Four points held, area known, analysis pending
    BoundaryReady,
    /// Stepping through the analysis catalog
    Analyzing,
    /// Navigator notified; terminal for the session
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub delay_before_analysis_ms: u64,
    pub step_interval_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            delay_before_analysis_ms: 2500,
            step_interval_ms: 1800,
            settle_delay_ms: 1500,
        }
    }
}

/// The one mutable aggregate of a session. Read-only outside this module.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    status: SessionStatus,
    selection: BoundarySelection,
    area_acres: Option<f64>,
    current_step_index: Option<usize>,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn selection(&self) -> &BoundarySelection {
        &self.selection
    }

    pub fn area_acres(&self) -> Option<f64> {
        self.area_acres
    }

    pub fn current_step_index(&self) -> Option<usize> {
        self.current_step_index
    }
}

/// What the host reads before navigating away.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionResult {
    pub area_acres: f64,
    /// Tap order.
    pub boundary: Vec<GeoPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointOutcome {
    Accepted { sequence_index: usize },
    /// The fourth point closed the boundary.
    BoundaryReady { area_acres: f64 },
    Ignored(IgnoreReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    NotSelecting(SessionStatus),
    BoundaryFull,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    Applied(Transition),
    /// Timer not yet due; still pending.
    NotDue,
    /// Timer belongs to a superseded or torn down session, or was replaced.
    Stale,
}

pub struct BoundarySelectionController<C: Clock, N: Navigator> {
    clock: C,
    navigator: N,
    steps: Vec<AnalysisStep>,
    timings: Timings,
    session: SessionId,
    state: SessionState,
    timer: TimerSlot,
    notified: bool,
}

impl<C: Clock, N: Navigator> BoundarySelectionController<C, N> {
    pub fn new(clock: C, navigator: N, steps: Vec<AnalysisStep>, timings: Timings) -> Result<Self> {
        if steps.is_empty() {
            return Err(BoundaryError::Config("analysis step catalog is empty".into()));
        }
        if timings.step_interval_ms == 0 {
            return Err(BoundaryError::Config("step interval must be positive".into()));
        }
        Ok(Self {
            clock,
            navigator,
            steps,
            timings,
            session: SessionId(0),
            state: SessionState::default(),
            timer: TimerSlot::new(),
            notified: false,
        })
    }

    pub fn from_settings(clock: C, navigator: N, settings: &Settings) -> Result<Self> {
        Self::new(clock, navigator, settings.analysis_steps.clone(), settings.timings())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn steps(&self) -> &[AnalysisStep] {
        &self.steps
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn current_step(&self) -> Option<&AnalysisStep> {
        self.state.current_step_index.and_then(|i| self.steps.get(i))
    }

    pub fn pending_timer(&self) -> Option<PendingTimer> {
        self.timer.pending().copied()
    }

    /// Area and boundary once the boundary has been closed.
    pub fn result(&self) -> Option<SessionResult> {
        let area_acres = self.state.area_acres?;
        Some(SessionResult {
            area_acres,
            boundary: self.state.selection.coordinates(),
        })
    }

    /// Idle -> AwaitingStart, signalled once the map is centered on the user.
    pub fn map_centered(&mut self) -> Result<()> {
        self.expect_status("signal map centered", SessionStatus::Idle)?;
        self.state.status = SessionStatus::AwaitingStart;
        log::info!("session {}: awaiting start", self.session.0);
        Ok(())
    }

    /// AwaitingStart -> Selecting. Starts a fresh session.
    pub fn begin_selection(&mut self) -> Result<()> {
        self.expect_status("begin selection", SessionStatus::AwaitingStart)?;
        self.new_session();
        self.state.status = SessionStatus::Selecting;
        log::info!("session {}: selecting points", self.session.0);
        Ok(())
    }

    /// Records a tap. Outside `Selecting` or past four points the tap is dropped.
    pub fn add_point(&mut self, point: GeoPoint) -> PointOutcome {
        if self.state.status != SessionStatus::Selecting {
            log::debug!("ignoring tap while {:?}", self.state.status);
            return PointOutcome::Ignored(IgnoreReason::NotSelecting(self.state.status));
        }
        let Some(sequence_index) = self.state.selection.push(point) else {
            log::debug!("ignoring tap, boundary already full");
            return PointOutcome::Ignored(IgnoreReason::BoundaryFull);
        };
        log::debug!(
            "point {} at ({:.6}, {:.6})",
            sequence_index,
            point.latitude,
            point.longitude
        );
        match self.state.selection.corners() {
            Some(corners) => self.close_boundary(corners),
            None => PointOutcome::Accepted { sequence_index },
        }
    }

    /// Fires every due timer, in order. Returns the transitions applied.
    pub fn tick(&mut self) -> Vec<Transition> {
        let now = self.clock.now_ms();
        let mut applied = Vec::new();
        while let Some(timer) = self.timer.take_due(now) {
            self.apply(timer);
            applied.push(timer.transition);
        }
        applied
    }

    /// Delivers one timer from an externally run event loop.
    pub fn fire(&mut self, timer: PendingTimer) -> FireOutcome {
        if timer.session != self.session || !self.timer.is_current(&timer) {
            log::debug!(
                "stale {:?} timer for session {} ignored (current {})",
                timer.transition,
                timer.session.0,
                self.session.0
            );
            return FireOutcome::Stale;
        }
        if !timer.is_due(self.clock.now_ms()) {
            return FireOutcome::NotDue;
        }
        self.timer.cancel();
        self.apply(timer);
        FireOutcome::Applied(timer.transition)
    }

    /// Unmount or back out: cancels the pending timer and returns to Idle.
    pub fn teardown(&mut self) {
        if let Some(timer) = self.timer.cancel() {
            log::info!(
                "session {}: cancelled pending {:?}",
                self.session.0,
                timer.transition
            );
        }
        self.new_session();
        self.state.status = SessionStatus::Idle;
    }

    fn expect_status(&self, action: &'static str, expected: SessionStatus) -> Result<()> {
        if self.state.status == expected {
            Ok(())
        } else {
            Err(BoundaryError::InvalidTransition {
                action,
                status: self.state.status,
            })
        }
    }

    fn new_session(&mut self) {
        self.timer.cancel();
        self.session = SessionId(self.session.0 + 1);
        self.state = SessionState::default();
        self.notified = false;
    }

    fn close_boundary(&mut self, corners: [GeoPoint; BOUNDARY_POINTS]) -> PointOutcome {
        let area_acres = quad_area_acres(&corners);
        self.state.area_acres = Some(area_acres);
        self.state.status = SessionStatus::BoundaryReady;
        log::info!(
            "session {}: boundary closed, {:.3} acres",
            self.session.0,
            area_acres
        );

        let due = self.clock.now_ms().saturating_add(self.timings.delay_before_analysis_ms);
        self.timer.schedule(self.session, due, Transition::StartAnalysis);
        PointOutcome::BoundaryReady { area_acres }
    }

    fn apply(&mut self, timer: PendingTimer) {
        match (timer.transition, self.state.status) {
            (Transition::StartAnalysis, SessionStatus::BoundaryReady) => {
                self.state.status = SessionStatus::Analyzing;
                self.state.current_step_index = Some(0);
                self.log_step(0);
                self.timer.schedule(
                    self.session,
                    timer.due_ms.saturating_add(self.timings.step_interval_ms),
                    Transition::AdvanceStep { from_step: 0 },
                );
            }
            (Transition::AdvanceStep { from_step }, SessionStatus::Analyzing)
                if self.state.current_step_index == Some(from_step) =>
            {
                let next = from_step + 1;
                if next < self.steps.len() {
                    self.state.current_step_index = Some(next);
                    self.log_step(next);
                    self.timer.schedule(
                        self.session,
                        timer.due_ms.saturating_add(self.timings.step_interval_ms),
                        Transition::AdvanceStep { from_step: next },
                    );
                } else {
                    self.timer.schedule(
                        self.session,
                        timer.due_ms.saturating_add(self.timings.settle_delay_ms),
                        Transition::Finish,
                    );
                }
            }
            (Transition::Finish, SessionStatus::Analyzing) => {
                self.state.status = SessionStatus::Complete;
                log::info!("session {}: analysis complete", self.session.0);
                if !self.notified {
                    self.notified = true;
                    if let Some(result) = self.result() {
                        self.navigator.on_analysis_complete(&result);
                    }
                }
            }
            (transition, status) => {
                log::warn!("dropping {:?} timer while {:?}", transition, status);
            }
        }
    }

    fn log_step(&self, index: usize) {
        if let Some(step) = self.steps.get(index) {
            log::info!(
                "session {}: step {}/{} {}",
                self.session.0,
                index + 1,
                self.steps.len(),
                step.title
            );
        }
    }
}
