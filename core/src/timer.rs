use core::time::Duration;
use web_time::Instant;

/// Elapsed-time counter for a session, frozen once stopped.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Stopwatch {
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) counting from now.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        log::debug!("stopwatch started");
        self.started_at = Some(now);
        self.stopped_at = None;
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    pub fn stop_at(&mut self, now: Instant) {
        if self.is_running() {
            self.stopped_at = Some(now);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    /// Elapsed time as seen at `now`, zero if never started
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started_at) => self
                .stopped_at
                .unwrap_or(now)
                .saturating_duration_since(started_at),
            None => Duration::ZERO,
        }
    }

    pub fn elapsed_secs(&self) -> u32 {
        round_secs(self.elapsed())
    }

    pub fn elapsed_secs_at(&self, now: Instant) -> u32 {
        round_secs(self.elapsed_at(now))
    }
}

fn round_secs(duration: Duration) -> u32 {
    ((duration.as_millis() + 500) / 1000)
        .try_into()
        .unwrap_or(u32::MAX)
}

/// Formats seconds as `MM:SS`, minutes keep growing past 99.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
