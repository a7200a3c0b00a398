use std::time::{Duration, Instant};

/// Two-state stopwatch with lap tracking.
///
/// All mutation happens on the GTK main thread via `app::apply_command`;
/// background threads only submit intents through the backend event channel.
#[derive(Debug, Default)]
pub struct Stopwatch {
    /// Anchor instant while running: elapsed time is `now - anchor`.
    /// `None` means stopped.
    anchor: Option<Instant>,
    /// Frozen elapsed time while stopped.
    frozen: Duration,
    laps: Vec<f64>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Start or resume. No-op while already running.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    fn start_at(&mut self, now: Instant) {
        if self.anchor.is_none() {
            // Back-date the anchor so previously accumulated time carries over.
            self.anchor = Some(now - self.frozen);
        }
    }

    /// Stop, freezing the elapsed time. No-op while already stopped.
    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    fn stop_at(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor.take() {
            self.frozen = now.duration_since(anchor);
        }
    }

    /// Stop, zero the elapsed time, and clear all laps.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.frozen = Duration::ZERO;
        self.laps.clear();
    }

    /// Total running time since the last reset, accounting for pause/resume.
    /// Side-effect free.
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    fn elapsed_at(&self, now: Instant) -> Duration {
        match self.anchor {
            Some(anchor) => now.duration_since(anchor),
            None => self.frozen,
        }
    }

    /// Record the time since the previous lap (or since start, for the first
    /// lap). Returns the lap duration, or `None` while stopped.
    pub fn record_lap(&mut self) -> Option<f64> {
        self.record_lap_at(Instant::now())
    }

    fn record_lap_at(&mut self, now: Instant) -> Option<f64> {
        if self.anchor.is_none() {
            return None;
        }
        let total = self.elapsed_at(now).as_secs_f64();
        let lap = total - self.laps.iter().sum::<f64>();
        // A negative lap means the caller sampled a non-monotonic clock;
        // that is a logic fault, not something to clamp away.
        debug_assert!(lap >= 0.0, "negative lap duration: {lap}");
        self.laps.push(lap);
        Some(lap)
    }

    /// Recorded lap durations in seconds, oldest first.
    pub fn laps(&self) -> &[f64] {
        &self.laps
    }
}

/// Format an elapsed duration as `HH:MM:SS` for the dashboard time label.
pub fn format_hms(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn starts_stopped_at_zero() {
        let sw = Stopwatch::new();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(), Duration::ZERO);
        assert!(sw.laps().is_empty());
    }

    #[test]
    fn stop_freezes_elapsed() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        sw.start_at(t0);
        sw.stop_at(t0 + secs(2.5));
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed_at(t0 + secs(100.0)), secs(2.5));
    }

    #[test]
    fn resume_carries_accumulated_time() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        sw.start_at(t0);
        sw.stop_at(t0 + secs(3.0));
        sw.start_at(t0 + secs(10.0));
        assert_eq!(sw.elapsed_at(t0 + secs(12.0)), secs(5.0));
    }

    #[test]
    fn start_while_running_is_a_noop() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        sw.start_at(t0);
        sw.start_at(t0 + secs(4.0));
        assert_eq!(sw.elapsed_at(t0 + secs(6.0)), secs(6.0));
    }

    #[test]
    fn stop_while_stopped_is_a_noop() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        sw.start_at(t0);
        sw.stop_at(t0 + secs(1.0));
        sw.stop_at(t0 + secs(9.0));
        assert_eq!(sw.elapsed_at(t0 + secs(9.0)), secs(1.0));
    }

    #[test]
    fn elapsed_is_monotone_across_start_stop_sequences() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        let mut previous = Duration::ZERO;
        let checkpoints = [
            (0.0, true),  // start
            (1.0, false), // stop
            (2.0, true),  // resume
            (5.0, false),
            (5.5, true),
        ];
        for &(at, start) in &checkpoints {
            let now = t0 + secs(at);
            if start {
                sw.start_at(now);
            } else {
                sw.stop_at(now);
            }
            let elapsed = sw.elapsed_at(now);
            assert!(elapsed >= previous, "elapsed went backwards at t={at}");
            previous = elapsed;
        }
    }

    #[test]
    fn reset_zeroes_elapsed_and_clears_laps() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        sw.start_at(t0);
        sw.record_lap_at(t0 + secs(1.0));
        sw.record_lap_at(t0 + secs(2.0));
        sw.reset();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed_at(t0 + secs(50.0)), Duration::ZERO);
        assert!(sw.laps().is_empty());
    }

    #[test]
    fn lap_while_stopped_is_rejected() {
        let mut sw = Stopwatch::new();
        assert_eq!(sw.record_lap(), None);
        assert!(sw.laps().is_empty());
    }

    #[test]
    fn laps_sum_to_elapsed_at_last_lap() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        sw.start_at(t0);
        sw.record_lap_at(t0 + secs(1.25));
        sw.record_lap_at(t0 + secs(3.5));
        sw.record_lap_at(t0 + secs(7.75));
        let sum: f64 = sw.laps().iter().sum();
        let elapsed_at_last = sw.elapsed_at(t0 + secs(7.75)).as_secs_f64();
        assert!((sum - elapsed_at_last).abs() < 1e-9);
    }

    #[test]
    fn laps_survive_pause_and_resume() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::new();
        sw.start_at(t0);
        sw.record_lap_at(t0 + secs(2.0));
        sw.stop_at(t0 + secs(3.0));
        sw.start_at(t0 + secs(10.0));
        let lap = sw.record_lap_at(t0 + secs(11.0)).unwrap();
        // 4 seconds of running time total, 2 already accounted for.
        assert!((lap - 2.0).abs() < 1e-9);
        assert_eq!(sw.laps().len(), 2);
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_hms(Duration::ZERO), "00:00:00");
        assert_eq!(format_hms(secs(59.9)), "00:00:59");
        assert_eq!(format_hms(secs(61.0)), "00:01:01");
        assert_eq!(format_hms(secs(3723.0)), "01:02:03");
    }
}
