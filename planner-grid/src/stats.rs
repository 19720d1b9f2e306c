use crate::{Event, EventStatus};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-status counters over an event list, shown next to the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Statistics {
    pub total: usize,
    pub published: usize,
    pub scheduled: usize,
    pub draft: usize,
}

pub fn statistics(events: &[Event]) -> Statistics {
    let mut stats = Statistics {
        total: events.len(),
        ..Statistics::default()
    };

    for event in events {
        match event.status {
            EventStatus::Published => stats.published += 1,
            EventStatus::Scheduled => stats.scheduled += 1,
            EventStatus::Draft => stats.draft += 1,
        }
    }

    stats
}
