use crate::ports::outbound::TimeSource;
use chrono::{DateTime, Utc};

/// Default time source using system time.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time source pinned to one instant, for tests.
pub struct FixedTimeSource(pub DateTime<Utc>);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
