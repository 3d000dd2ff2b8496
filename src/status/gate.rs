//! Change-gated publication
//!
//! One gate instance owns the "last published" baseline for a set of
//! status categories and decides, per tick, whether a record goes out.
//! A record publishes when it differs from its baseline by value (any
//! field counts) or when a manual refresh forces it, subject to the
//! category's rate ceiling. A changed-but-throttled value is dropped,
//! not queued: the next tick re-evaluates whatever is current then.

use crate::messages::BusMessage;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Status category identifiers, one per outbound record topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    IrisHealth,
    Battery,
    Camera,
    Wheel,
    ControllerLink,
    Gps,
    Compute,
    Misc,
}

struct PublishedSnapshot {
    value: BusMessage,
    published_at: Option<Instant>,
}

#[derive(Default)]
pub struct ChangeGate {
    snapshots: HashMap<Category, PublishedSnapshot>,
    min_intervals: HashMap<Category, Duration>,
}

impl ChangeGate {
    pub fn new() -> Self {
        ChangeGate::default()
    }

    /// Apply a publish rate ceiling to one category
    ///
    /// `max_hz <= 0` leaves the category ungated (publish on any change).
    pub fn set_ceiling(&mut self, category: Category, max_hz: f64) {
        if max_hz > 0.0 {
            self.min_intervals
                .insert(category, Duration::from_secs_f64(1.0 / max_hz));
        }
    }

    /// Seed the baseline with a record's startup value
    ///
    /// A seeded category first publishes only on an observed change or a
    /// manual refresh; an unseeded category publishes on first sight.
    pub fn seed(&mut self, category: Category, value: BusMessage) {
        self.snapshots.insert(
            category,
            PublishedSnapshot {
                value,
                published_at: None,
            },
        );
    }

    /// Should this record go out now?
    pub fn should_publish(
        &self,
        category: Category,
        current: &BusMessage,
        manual_override: bool,
        now: Instant,
    ) -> bool {
        let snapshot = self.snapshots.get(&category);
        let changed = snapshot.map_or(true, |s| s.value != *current);
        if !changed && !manual_override {
            return false;
        }
        if let Some(min_interval) = self.min_intervals.get(&category) {
            if let Some(published_at) = snapshot.and_then(|s| s.published_at) {
                if now.saturating_duration_since(published_at) < *min_interval {
                    return false;
                }
            }
        }
        true
    }

    /// Record a completed publish as the new baseline
    ///
    /// Baseline value and publish time move together; no caller can see
    /// one updated without the other.
    pub fn record_published(&mut self, category: Category, current: BusMessage, now: Instant) {
        self.snapshots.insert(
            category,
            PublishedSnapshot {
                value: current,
                published_at: Some(now),
            },
        );
    }
}
