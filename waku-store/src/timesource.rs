use std::time::{SystemTime, UNIX_EPOCH};

/// Clock used to stamp and window messages, in nanoseconds since the Unix epoch.
pub trait Timesource: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WallClockTimesource;

impl Timesource for WallClockTimesource {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or_default()
    }
}
