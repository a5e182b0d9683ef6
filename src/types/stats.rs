use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The single persisted usage aggregate.
///
/// Serialized in camelCase so the stored JSON matches what the viewer
/// page reads and writes. Missing fields fall back to their defaults,
/// which lets an older or partial record load cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsRecord {
    pub total_viewed: u64,
    pub total_skipped: u64,
    pub current_streak: u64,
    pub best_streak: u64,
    pub today_viewed: u64,
    pub today_skipped: u64,
    /// Calendar day the `today_*` counters belong to.
    #[serde(deserialize_with = "lenient_date")]
    pub last_date: NaiveDate,
    pub satisfied_count: u64,
    pub unsatisfied_count: u64,
}

impl StatsRecord {
    /// Fresh all-zero record dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            total_viewed: 0,
            total_skipped: 0,
            current_streak: 0,
            best_streak: 0,
            today_viewed: 0,
            today_skipped: 0,
            last_date: today,
            satisfied_count: 0,
            unsatisfied_count: 0,
        }
    }

    /// Resets the daily counters if the record belongs to another day.
    /// Returns whether a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_date == today {
            return false;
        }
        self.today_viewed = 0;
        self.today_skipped = 0;
        self.last_date = today;
        true
    }

    /// A status was opened in the viewer. Breaks the skip streak.
    pub fn record_view(&mut self, today: NaiveDate) {
        self.roll_over(today);
        self.total_viewed += 1;
        self.today_viewed += 1;
        self.current_streak = 0;
    }

    /// A status was skipped. Extends the streak and lifts the best streak
    /// along with it.
    pub fn record_skip(&mut self, today: NaiveDate) {
        self.roll_over(today);
        self.total_skipped += 1;
        self.today_skipped += 1;
        self.current_streak += 1;
        if self.current_streak > self.best_streak {
            self.best_streak = self.current_streak;
        }
    }

    pub fn record_satisfaction(&mut self, satisfied: bool) {
        if satisfied {
            self.satisfied_count += 1;
        } else {
            self.unsatisfied_count += 1;
        }
    }

    /// Share of satisfied votes, or `None` before the first vote.
    pub fn satisfaction_rate(&self) -> Option<f64> {
        let total = self.satisfied_count + self.unsatisfied_count;
        if total == 0 {
            return None;
        }
        Some(self.satisfied_count as f64 / total as f64)
    }
}

/// Reads `lastDate` without failing the whole record. A null or
/// unreadable date becomes [`NaiveDate::MIN`], which the next rollover
/// replaces, so only the daily counters are lost.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or(NaiveDate::MIN))
}

impl Default for StatsRecord {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}
