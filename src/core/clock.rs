//! # Time source for the lot.
//!
//! Every core operation receives the time explicitly; only the scheduler asks a
//! [`Clock`], once per tick. A clock answers two questions:
//!
//! - [`Clock::now`]: wall time ([`Timestamp`]) for entry/exit times and fees;
//! - [`Clock::instant`]: monotonic time (`tokio::time::Instant`) for the gate
//!   and settle deadlines, so stepping the wall clock never stalls a timer.
//!
//! Production uses [`SystemClock`]; tests and replays use [`ManualClock`] and
//! move it by hand.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use lotkeeper::{Clock, ManualClock};
//!
//! let clock = ManualClock::epoch();
//! let (t0, i0) = (clock.now(), clock.instant());
//! clock.advance(Duration::from_secs(90));
//! assert_eq!((clock.now() - t0).num_seconds(), 90);
//! assert_eq!(clock.instant() - i0, Duration::from_secs(90));
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use tokio::time::Instant;

/// Wall-clock instant used for entry/exit times and fee durations.
pub type Timestamp = DateTime<Utc>;

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current wall-clock instant.
    fn now(&self) -> Timestamp;

    /// Returns the current monotonic instant used for timer deadlines.
    fn instant(&self) -> Instant {
        Instant::now()
    }
}

/// Reads the system wall clock and the tokio monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

#[derive(Debug)]
struct ManualTime {
    wall: Timestamp,
    mono: Instant,
}

/// Manually advanced clock.
///
/// [`advance`](Self::advance) moves wall and monotonic time together;
/// [`set`](Self::set) steps only the wall clock, the way an NTP correction
/// would. Clones share the same time, so a test can keep one handle while the
/// scheduler owns another.
#[derive(Clone, Debug)]
pub struct ManualClock {
    time: Arc<Mutex<ManualTime>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            time: Arc::new(Mutex::new(ManualTime {
                wall: start,
                mono: Instant::now(),
            })),
        }
    }

    /// Creates a clock frozen at the Unix epoch.
    pub fn epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Moves wall and monotonic time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut t = self.lock();
        t.wall = wall_after(t.wall, by);
        t.mono = deadline(t.mono, by);
    }

    /// Steps the wall clock to `at`; monotonic time is unaffected.
    pub fn set(&self, at: Timestamp) {
        self.lock().wall = at;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualTime> {
        self.time.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.lock().wall
    }

    fn instant(&self) -> Instant {
        self.lock().mono
    }
}

/// Returns `now + after`, saturating roughly thirty years out.
pub fn deadline(now: Instant, after: Duration) -> Instant {
    const FAR: Duration = Duration::from_secs(86_400 * 365 * 30);
    now.checked_add(after.min(FAR)).unwrap_or(now)
}

fn wall_after(now: Timestamp, after: Duration) -> Timestamp {
    TimeDelta::from_std(after)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Seconds elapsed from `from` to `to` (negative if `to` is earlier).
pub fn elapsed_secs(from: Timestamp, to: Timestamp) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Formats a timestamp as local `HH:MM:SS`.
pub fn clock_time(at: Timestamp) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
