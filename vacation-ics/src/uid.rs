use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Source of event UIDs for one export.
pub trait UidGenerator {
    /// UID of the `index`-th event of the calendar of `slug`.
    fn next_uid(&mut self, slug: &str, index: usize) -> String;
}

static LAST_STAMP: AtomicI64 = AtomicI64::new(i64::MIN);

/// Returns `now_millis`, or one more than the last stamp handed out if the
/// clock has not moved since. Strictly increasing for the life of the process.
fn next_stamp(now_millis: i64) -> i64 {
    let bump = |last: i64| now_millis.max(last.saturating_add(1));
    match LAST_STAMP.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last))) {
        Ok(last) | Err(last) => bump(last),
    }
}

/// `<slug>-<index>-<stamp>@<domain>` UIDs sharing one millisecond stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampedUids {
    stamp: i64,
    domain: String,
}

impl StampedUids {
    /// Fixed stamp, for reproducible output.
    pub fn seeded<S: Into<String>>(stamp: i64, domain: S) -> Self {
        Self {
            stamp,
            domain: domain.into(),
        }
    }

    /// Stamp taken from the wall clock, distinct from every earlier call.
    pub fn from_clock<S: Into<String>>(domain: S) -> Self {
        Self::seeded(next_stamp(Utc::now().timestamp_millis()), domain)
    }

    pub fn stamp(&self) -> i64 {
        self.stamp
    }
}

impl UidGenerator for StampedUids {
    fn next_uid(&mut self, slug: &str, index: usize) -> String {
        format!("{slug}-{index}-{}@{}", self.stamp, self.domain)
    }
}
