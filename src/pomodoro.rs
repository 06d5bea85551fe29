use std::time::Duration;

pub const FOCUS: Duration = Duration::from_secs(25 * 60);
pub const SHORT_BREAK: Duration = Duration::from_secs(5 * 60);
pub const LONG_BREAK: Duration = Duration::from_secs(15 * 60);
/// Focus sessions completed before a long break.
pub const SESSIONS_PER_CYCLE: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn length(self) -> Duration {
        match self {
            Phase::Focus => FOCUS,
            Phase::ShortBreak => SHORT_BREAK,
            Phase::LongBreak => LONG_BREAK,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub finished: Phase,
    pub next: Phase,
}

#[derive(Clone, Debug)]
pub struct Pomodoro {
    phase: Phase,
    remaining: Duration,
    running: bool,
    completed_focus: u32,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Pomodoro::new()
    }
}

impl Pomodoro {
    pub fn new() -> Self {
        Pomodoro {
            phase: Phase::Focus,
            remaining: FOCUS,
            running: false,
            completed_focus: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_focus(&self) -> u32 {
        self.completed_focus
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Restarts the current phase from its full length, paused.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.phase.length();
    }

    /// Ends the current phase early without counting it.
    pub fn skip(&mut self) -> PhaseChange {
        let finished = self.phase;
        let next = match finished {
            Phase::Focus => Phase::ShortBreak,
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };
        self.enter(next);
        PhaseChange { finished, next }
    }

    /// Counts down by `elapsed` while running. Time left over when a phase
    /// ends is dropped; the next phase starts paused.
    pub fn tick(&mut self, elapsed: Duration) -> Option<PhaseChange> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if !self.remaining.is_zero() {
            return None;
        }

        let finished = self.phase;
        let next = match finished {
            Phase::Focus => {
                self.completed_focus += 1;
                if self.completed_focus % SESSIONS_PER_CYCLE == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };
        self.enter(next);
        Some(PhaseChange { finished, next })
    }

    /// Share of the current phase already spent, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let total = self.phase.length().as_secs_f64();
        (1.0 - self.remaining.as_secs_f64() / total).clamp(0.0, 1.0)
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.remaining = phase.length();
        self.running = false;
    }
}

/// `mm:ss`, rounding partial seconds up so `00:00` only shows at the end.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_timer_does_not_move() {
        let mut timer = Pomodoro::new();
        assert_eq!(timer.tick(Duration::from_secs(60)), None);
        assert_eq!(timer.remaining(), FOCUS);
    }

    #[test]
    fn test_focus_then_short_break() {
        let mut timer = Pomodoro::new();
        timer.start();
        assert_eq!(timer.tick(FOCUS - Duration::from_secs(1)), None);
        assert_eq!(
            timer.tick(Duration::from_secs(5)),
            Some(PhaseChange {
                finished: Phase::Focus,
                next: Phase::ShortBreak
            })
        );
        assert_eq!(timer.phase(), Phase::ShortBreak);
        assert_eq!(timer.remaining(), SHORT_BREAK);
        assert!(!timer.is_running());
        assert_eq!(timer.completed_focus(), 1);
    }

    #[test]
    fn test_fourth_focus_earns_long_break() {
        let mut timer = Pomodoro::new();
        let mut breaks = Vec::new();
        for _ in 0..SESSIONS_PER_CYCLE {
            timer.start();
            let change = timer.tick(FOCUS).unwrap();
            breaks.push(change.next);
            timer.start();
            timer.tick(change.next.length());
        }
        assert_eq!(
            breaks,
            vec![
                Phase::ShortBreak,
                Phase::ShortBreak,
                Phase::ShortBreak,
                Phase::LongBreak
            ]
        );
        assert_eq!(timer.phase(), Phase::Focus);
    }

    #[test]
    fn test_skip_does_not_count_session() {
        let mut timer = Pomodoro::new();
        timer.start();
        let change = timer.skip();
        assert_eq!(change.next, Phase::ShortBreak);
        assert_eq!(timer.completed_focus(), 0);
        assert_eq!(timer.skip().next, Phase::Focus);
    }

    #[test]
    fn test_reset_restores_phase_length() {
        let mut timer = Pomodoro::new();
        timer.start();
        timer.tick(Duration::from_secs(90));
        assert!(timer.progress() > 0.0);
        timer.reset();
        assert_eq!(timer.remaining(), FOCUS);
        assert!(!timer.is_running());
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(FOCUS), "25:00");
        assert_eq!(format_remaining(Duration::from_millis(59_001)), "01:00");
        assert_eq!(format_remaining(Duration::ZERO), "00:00");
    }
}
