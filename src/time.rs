use lazy_static::lazy_static;

use std::time::Instant;

lazy_static! {
    // Timestamp since the start of the program.
    pub static ref TIMESTAMP: Instant = Instant::now();
}

pub fn timestamp_as_usecs() -> u64 {
    Instant::now().duration_since(*TIMESTAMP).as_micros() as u64
}

/// Stopwatch over the program timestamp, with pause support.
#[derive(Copy, Clone, Debug, Default)]
pub struct Timer {
    start_ts: u64,
    paused_usecs: u64,
    started: bool,
    paused: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started = true;
        self.paused = false;
        self.start_ts = timestamp_as_usecs();
        self.paused_usecs = 0;
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }

    pub fn pause(&mut self) {
        if self.started && !self.paused {
            self.paused = true;
            self.paused_usecs = timestamp_as_usecs() - self.start_ts;
            self.start_ts = 0;
        }
    }

    pub fn unpause(&mut self) {
        if self.started && self.paused {
            self.paused = false;
            self.start_ts = timestamp_as_usecs().saturating_sub(self.paused_usecs);
            self.paused_usecs = 0;
        }
    }

    /// Elapsed running time. Zero if the timer was never started.
    pub fn usecs(&self) -> u64 {
        match (self.started, self.paused) {
            (false, _) => 0,
            (true, true) => self.paused_usecs,
            (true, false) => timestamp_as_usecs() - self.start_ts,
        }
    }

    pub fn secs(&self) -> f32 {
        self.usecs() as f32 * 0.000_001
    }

    pub fn is_paused(&self) -> bool {
        self.paused && self.started
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn unstarted_timer_reads_zero() {
        let timer = Timer::new();
        assert!(!timer.is_paused());
        assert_eq!(timer.usecs(), 0);
    }

    #[test]
    fn running_timer_advances() {
        let mut timer = Timer::new();
        timer.start();
        sleep(Duration::from_millis(5));
        assert!(timer.usecs() >= 5_000);
        assert!(timer.secs() >= 0.005);
    }

    #[test]
    fn paused_timer_is_frozen() {
        let mut timer = Timer::new();
        timer.start();
        sleep(Duration::from_millis(2));
        timer.pause();
        assert!(timer.is_paused());
        let frozen = timer.usecs();
        sleep(Duration::from_millis(5));
        assert_eq!(timer.usecs(), frozen);

        // Unpausing resumes from the frozen value, not from wall time.
        timer.unpause();
        assert!(!timer.is_paused());
        let resumed = timer.usecs();
        assert!(resumed >= frozen);
        assert!(resumed < frozen + 5_000);
    }

    #[test]
    fn pause_requires_start() {
        let mut timer = Timer::new();
        timer.pause();
        assert!(!timer.is_paused());
        timer.unpause();
        assert_eq!(timer.usecs(), 0);
    }

    #[test]
    fn stop_resets() {
        let mut timer = Timer::new();
        timer.start();
        timer.pause();
        timer.stop();
        assert!(!timer.is_paused());
        assert_eq!(timer.usecs(), 0);

        // Unpausing a stopped timer does nothing.
        timer.unpause();
        assert_eq!(timer.usecs(), 0);
    }

    #[test]
    fn restart_resets_elapsed() {
        let mut timer = Timer::new();
        timer.start();
        sleep(Duration::from_millis(5));
        timer.start();
        assert!(timer.usecs() < 5_000);
    }
}
