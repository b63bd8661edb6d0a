use std::fmt;
use std::ops::Add;

use serde::Serialize;

/// Playback clock rate of Blu-ray timestamps.
pub const TICKS_PER_SECOND: u64 = 90_000;

/// A duration or position in 90 kHz ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Ticks(pub u64);

impl Ticks {
    pub fn as_secs(&self) -> u64 {
        self.0 / TICKS_PER_SECOND
    }

    /// `HH:MM:SS.mmm`, milliseconds truncated. Hours are not wrapped.
    pub fn fancy(&self) -> String {
        let total_secs = self.as_secs();
        let millis = (self.0 % TICKS_PER_SECOND) * 1000 / TICKS_PER_SECOND;

        let secs = total_secs % 60;
        let mins = (total_secs / 60) % 60;
        let hours = total_secs / 3600;

        format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
    }
}

impl Add for Ticks {
    type Output = Ticks;

    fn add(self, rhs: Ticks) -> Ticks {
        Ticks(self.0 + rhs.0)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fancy())
    }
}
