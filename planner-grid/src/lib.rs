mod grid;
mod stats;
mod structs;

pub use grid::{month_grid, month_span, GRID_CELLS};
pub use stats::{statistics, Statistics};
pub use structs::{DayCell, Event, EventStatus, UnknownStatus};
