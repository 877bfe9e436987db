//! Sources of "now".

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Something that can tell the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

static STD_CLOCK: LazyLock<RwLock<Arc<dyn Clock>>> =
    LazyLock::new(|| RwLock::new(Arc::new(SystemClock)));

/// The process-wide clock handed to newly built parsers.
pub fn std_clock() -> Arc<dyn Clock> {
    Arc::clone(&STD_CLOCK.read())
}

/// Replace the process-wide clock.
///
/// Parsers capture the clock when they are built, so this only affects
/// parsers constructed afterwards. Callers that swap the clock while other
/// threads are building parsers have to order those operations themselves.
pub fn set_std_clock(clock: Arc<dyn Clock>) {
    *STD_CLOCK.write() = clock;
}

/// Go back to the system wall clock.
pub fn reset_std_clock() {
    set_std_clock(Arc::new(SystemClock));
}
