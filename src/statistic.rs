//! Wall-clock timing for the evolution loop, grounded directly on the
//! teacher's `statistic::{ProcessingTime, timed}` (spec §1 "the evaluation
//! loop is performance-critical" motivates tracking it per generation).

use std::fmt::{self, Debug, Display, Formatter};

use chrono::{Duration, Local};

/// How long one generation (or one run) took to process.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessingTime(Duration);

impl ProcessingTime {
    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn zero() -> Self {
        ProcessingTime(Duration::zero())
    }
}

impl std::ops::Add for ProcessingTime {
    type Output = ProcessingTime;
    fn add(self, other: Self) -> Self::Output {
        ProcessingTime(self.0 + other.0)
    }
}

impl std::ops::AddAssign for ProcessingTime {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Debug for ProcessingTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for ProcessingTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The result of timing a closure with [`timed`]: the closure's own return
/// value plus how long it took to run.
pub struct TimedResult<U> {
    pub result: U,
    pub time: ProcessingTime,
}

/// Runs `op`, measuring wall-clock time with the environment's local clock
/// (matching the teacher's own `Local::now()`-based timer rather than a
/// monotonic clock, since these durations are only ever reported, never used
/// for scheduling decisions).
pub fn timed<F, U>(op: F) -> TimedResult<U>
where
    F: FnOnce() -> U,
{
    let started_at = Local::now();
    let result = op();
    let time = Local::now().signed_duration_since(started_at);
    TimedResult {
        result,
        time: ProcessingTime(time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_returns_the_closures_result() {
        let outcome = timed(|| 2 + 2);
        assert_eq!(outcome.result, 4);
    }

    #[test]
    fn processing_time_add_assign_accumulates() {
        let mut total = ProcessingTime::zero();
        total += timed(|| ()).time;
        total += timed(|| ()).time;
        assert!(total.duration() >= Duration::zero());
    }
}
