use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Canonical status vocabulary. The dashboard historically mixed `draft`
/// and `drafted`; both spellings deserialize to [`EventStatus::Draft`],
/// serialization always emits the canonical lowercase form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EventStatus {
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "drafted"))]
    Draft,
    Scheduled,
    Published,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Scheduled => "scheduled",
            EventStatus::Published => "published",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status `{}`", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" | "drafted" => Ok(EventStatus::Draft),
            "scheduled" => Ok(EventStatus::Scheduled),
            "published" => Ok(EventStatus::Published),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A scheduled content item, owned by the external store. Placement on the
/// grid only considers the calendar date; status and duration are carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub status: EventStatus,
    pub duration: u32,
}

/// One cell of the 42-cell month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub events: Vec<Event>,
}
