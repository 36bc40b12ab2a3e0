//! Single-slot cancellable timer
//!
//! A session has at most one outstanding transition. Each scheduled timer
//! carries the session it belongs to and a unique handle, so a timer that
//! outlives its session can be recognised and dropped when it fires.

/// Identifies one session. Bumped on every new session and on teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

/// Unique per scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// BoundaryReady -> Analyzing
    StartAnalysis,
    /// Step interval elapsed while showing `from_step`.
    AdvanceStep { from_step: usize },
    /// Analyzing -> Complete
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTimer {
    pub handle: TimerHandle,
    pub session: SessionId,
    pub due_ms: u64,
    pub transition: Transition,
}

impl PendingTimer {
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.due_ms
    }
}

/// Holds the one outstanding timer.
#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<PendingTimer>,
    next_handle: u64,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `transition`, replacing whatever was pending.
    pub fn schedule(&mut self, session: SessionId, due_ms: u64, transition: Transition) -> PendingTimer {
        self.next_handle += 1;
        let timer = PendingTimer {
            handle: TimerHandle(self.next_handle),
            session,
            due_ms,
            transition,
        };
        if let Some(old) = self.pending.replace(timer) {
            log::debug!("replacing pending {:?} timer", old.transition);
        }
        timer
    }

    /// Drops the pending timer, returning it if there was one.
    pub fn cancel(&mut self) -> Option<PendingTimer> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&PendingTimer> {
        self.pending.as_ref()
    }

    /// True if `timer` is exactly the one currently pending.
    pub fn is_current(&self, timer: &PendingTimer) -> bool {
        self.pending.as_ref() == Some(timer)
    }

    /// Removes and returns the pending timer if it is due.
    pub fn take_due(&mut self, now_ms: u64) -> Option<PendingTimer> {
        match self.pending {
            Some(t) if t.is_due(now_ms) => self.pending.take(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_replaces_pending() {
        let mut slot = TimerSlot::new();
        let first = slot.schedule(SessionId(1), 100, Transition::StartAnalysis);
        let second = slot.schedule(SessionId(1), 200, Transition::Finish);
        assert_ne!(first.handle, second.handle);
        assert!(!slot.is_current(&first));
        assert!(slot.is_current(&second));
    }

    #[test]
    fn test_take_due_only_when_elapsed() {
        let mut slot = TimerSlot::new();
        slot.schedule(SessionId(1), 2500, Transition::StartAnalysis);
        assert!(slot.take_due(2499).is_none());
        assert!(slot.pending().is_some());
        let fired = slot.take_due(2500).unwrap();
        assert_eq!(fired.transition, Transition::StartAnalysis);
        assert!(slot.pending().is_none());
    }

    #[test]
    fn test_cancel_clears_slot() {
        let mut slot = TimerSlot::new();
        let timer = slot.schedule(SessionId(3), 10, Transition::Finish);
        assert_eq!(slot.cancel(), Some(timer));
        assert!(slot.cancel().is_none());
        assert!(slot.take_due(u64::MAX).is_none());
    }
}
