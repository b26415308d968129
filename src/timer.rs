use strum_macros::Display;

/// Default session length when no config or CLI override is present.
pub const DEFAULT_DURATION_SECS: u32 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Emitted exactly once when the countdown reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Seconds actually meditated (requested duration minus time left).
    pub elapsed: u32,
}

/// Countdown state for one timer screen instance.
///
/// The engine is driven externally: the event loop delivers one `tick()` per
/// elapsed second while the phase is `Running`. Ticks arriving in any other
/// phase are ignored, which is what makes a stale scheduled tick harmless.
#[derive(Debug)]
pub struct Timer {
    pub duration: u32,
    pub time_left: u32,
    /// Percent of the configured duration already elapsed, 0..=100.
    pub progress: f64,
    phase: TimerPhase,
}

impl Timer {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            time_left: duration,
            progress: 0.0,
            phase: TimerPhase::Idle,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn elapsed(&self) -> u32 {
        self.duration - self.time_left
    }

    /// Start or resume the countdown. No-op outside `Idle`/`Paused`.
    pub fn start(&mut self) {
        if matches!(self.phase, TimerPhase::Idle | TimerPhase::Paused) {
            self.phase = TimerPhase::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.phase == TimerPhase::Running {
            self.phase = TimerPhase::Paused;
        }
    }

    pub fn toggle(&mut self) {
        if self.is_active() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Back to `Idle` with the full duration restored. Valid from any phase.
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.time_left = self.duration;
        self.progress = 0.0;
    }

    /// Apply an edited duration. Minutes and seconds are each clamped to
    /// 0..=59; `time_left` restarts at the new duration. Editing does not
    /// stop a running countdown; a completed timer returns to `Idle`.
    pub fn set_duration(&mut self, minutes: u32, seconds: u32) {
        self.duration = minutes.min(59) * 60 + seconds.min(59);
        self.time_left = self.duration;
        self.progress = 0.0;
        if self.phase == TimerPhase::Completed {
            self.phase = TimerPhase::Idle;
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns the completion exactly once, on the tick that empties the
    /// countdown. A zero-length timer completes immediately with
    /// `elapsed == 0`; the caller is responsible for not persisting that.
    pub fn tick(&mut self) -> Option<Completion> {
        if self.phase != TimerPhase::Running {
            return None;
        }

        if self.time_left > 0 {
            self.time_left -= 1;
            self.progress = (self.elapsed() as f64 / self.duration as f64) * 100.0;
        }

        if self.time_left == 0 {
            self.phase = TimerPhase::Completed;
            return Some(Completion {
                elapsed: self.elapsed(),
            });
        }

        None
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

/// Render a second count as zero-padded `MM:SS`.
pub fn format_mm_ss(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion(timer: &mut Timer) -> Vec<Completion> {
        let mut completions = vec![];
        for _ in 0..timer.duration + 5 {
            if let Some(c) = timer.tick() {
                completions.push(c);
            }
        }
        completions
    }

    #[test]
    fn countdown_runs_to_zero_with_one_completion() {
        let mut timer = Timer::new(5);
        timer.start();

        let completions = run_to_completion(&mut timer);

        assert_eq!(timer.time_left, 0);
        assert_eq!(timer.progress, 100.0);
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert_eq!(completions, vec![Completion { elapsed: 5 }]);
    }

    #[test]
    fn ticks_are_ignored_unless_running() {
        let mut timer = Timer::new(10);

        assert_eq!(timer.tick(), None);
        assert_eq!(timer.time_left, 10);

        timer.start();
        timer.tick();
        timer.pause();

        assert_eq!(timer.tick(), None);
        assert_eq!(timer.time_left, 9);
    }

    #[test]
    fn pause_resume_without_ticks_changes_nothing() {
        let mut timer = Timer::new(60);
        timer.start();
        timer.tick();
        timer.tick();

        let time_left = timer.time_left;
        let progress = timer.progress;

        timer.pause();
        timer.start();

        assert_eq!(timer.time_left, time_left);
        assert_eq!(timer.progress, progress);
        assert!(timer.is_active());
    }

    #[test]
    fn reset_restores_idle_from_any_phase() {
        let mut timer = Timer::new(3);
        timer.start();
        timer.tick();

        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.time_left, 3);
        assert_eq!(timer.progress, 0.0);
        assert!(!timer.is_active());

        timer.start();
        run_to_completion(&mut timer);
        assert_eq!(timer.phase(), TimerPhase::Completed);

        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.time_left, 3);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut timer = Timer::new(4);
        timer.start();

        timer.tick();
        assert_eq!(timer.progress, 25.0);
        timer.tick();
        assert_eq!(timer.progress, 50.0);
        timer.tick();
        assert_eq!(timer.progress, 75.0);
    }

    #[test]
    fn zero_length_timer_completes_with_zero_elapsed() {
        let mut timer = Timer::new(0);
        timer.start();

        assert_eq!(timer.tick(), Some(Completion { elapsed: 0 }));
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert_eq!(timer.progress, 0.0);
    }

    #[test]
    fn completion_fires_only_once() {
        let mut timer = Timer::new(1);
        timer.start();

        assert!(timer.tick().is_some());
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn start_is_a_noop_after_completion() {
        let mut timer = Timer::new(1);
        timer.start();
        timer.tick();

        timer.start();
        assert_eq!(timer.phase(), TimerPhase::Completed);
    }

    #[test]
    fn set_duration_clamps_and_resets_time_left() {
        let mut timer = Timer::new(300);

        timer.set_duration(2, 30);
        assert_eq!(timer.duration, 150);
        assert_eq!(timer.time_left, 150);
        assert_eq!(timer.progress, 0.0);

        // Values beyond the editable range are clamped, not rejected
        timer.set_duration(99, 99);
        assert_eq!(timer.duration, 59 * 60 + 59);
    }

    #[test]
    fn set_duration_leaves_a_running_countdown_running() {
        let mut timer = Timer::new(10);
        timer.start();
        timer.tick();

        timer.set_duration(0, 5);
        assert!(timer.is_active());
        assert_eq!(timer.time_left, 5);

        let completions = run_to_completion(&mut timer);
        assert_eq!(completions, vec![Completion { elapsed: 5 }]);
    }

    #[test]
    fn set_duration_returns_completed_timer_to_idle() {
        let mut timer = Timer::new(1);
        timer.start();
        timer.tick();
        assert_eq!(timer.phase(), TimerPhase::Completed);

        timer.set_duration(1, 0);
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.time_left, 60);
    }

    #[test]
    fn format_mm_ss_zero_pads() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(5), "00:05");
        assert_eq!(format_mm_ss(90), "01:30");
        assert_eq!(format_mm_ss(600), "10:00");
        // minutes are unbounded above 59 in display
        assert_eq!(format_mm_ss(3661), "61:01");
    }

    #[test]
    fn timer_phase_display() {
        assert_eq!(TimerPhase::Idle.to_string(), "Idle");
        assert_eq!(TimerPhase::Running.to_string(), "Running");
        assert_eq!(TimerPhase::Paused.to_string(), "Paused");
        assert_eq!(TimerPhase::Completed.to_string(), "Completed");
    }
}
