use chrono::{Datelike, Days, NaiveDate};

use crate::{DayCell, Event};

/// Six full weeks, the fixed size of every month view.
pub const GRID_CELLS: usize = 42;

/// Builds the 42-cell month grid for the month containing `reference`.
///
/// The grid starts on the Sunday on or before the first of the month and
/// covers six contiguous weeks, so it may include tail days of the previous
/// month and head days of the next one. Events are attached to the cell
/// whose date matches theirs exactly, preserving input order; padding cells
/// never carry events, even when an event's date falls on one.
pub fn month_grid(reference: NaiveDate, events: &[Event]) -> Vec<DayCell> {
    let first_of_month = reference - Days::new(u64::from(reference.day0()));
    let leading = u64::from(first_of_month.weekday().num_days_from_sunday());
    let start = first_of_month - Days::new(leading);

    start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| {
            let is_current_month =
                date.year() == reference.year() && date.month() == reference.month();

            let events = if is_current_month {
                events
                    .iter()
                    .filter(|event| event.date == date)
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            };

            DayCell {
                date,
                is_current_month,
                events,
            }
        })
        .collect()
}

/// First and last calendar day of a month, leap-aware. `None` for an
/// out-of-range year/month pair.
pub fn month_span(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    Some((first, next_first - Days::new(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventStatus;

    fn event(id: &str, date: NaiveDate) -> Event {
        Event {
            id: id.to_string(),
            title: format!("event {id}"),
            date,
            status: EventStatus::Scheduled,
            duration: 60,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn always_six_full_weeks() {
        for (year, month) in [(2025, 7), (2024, 2), (2025, 2), (2023, 12), (2026, 1)] {
            let grid = month_grid(date(year, month, 15), &[]);
            assert_eq!(grid.len(), GRID_CELLS, "{year}-{month}");
        }
    }

    #[test]
    fn dates_are_contiguous_and_strictly_ascending() {
        let grid = month_grid(date(2025, 7, 9), &[]);
        for pair in grid.windows(2) {
            assert_eq!(pair[1].date, pair[0].date + Days::new(1));
        }
    }

    #[test]
    fn current_month_flag_matches_reference_month() {
        let grid = month_grid(date(2024, 2, 1), &[]);
        for cell in &grid {
            let expected = cell.date.year() == 2024 && cell.date.month() == 2;
            assert_eq!(cell.is_current_month, expected, "{}", cell.date);
        }
    }

    #[test]
    fn july_2025_layout() {
        // July 1st 2025 is a Tuesday: two leading cells, 31 in-month cells,
        // nine trailing cells.
        let grid = month_grid(date(2025, 7, 20), &[]);

        assert_eq!(grid[0].date, date(2025, 6, 29));
        assert!(!grid[0].is_current_month);
        assert!(!grid[1].is_current_month);
        assert_eq!(grid[2].date, date(2025, 7, 1));

        let in_month = grid.iter().filter(|cell| cell.is_current_month).count();
        assert_eq!(in_month, 31);
        assert!(grid[33..].iter().all(|cell| !cell.is_current_month));
        assert_eq!(grid[41].date, date(2025, 8, 9));
    }

    #[test]
    fn leap_february_has_29_in_month_cells() {
        let grid = month_grid(date(2024, 2, 10), &[]);
        let in_month = grid.iter().filter(|cell| cell.is_current_month).count();
        assert_eq!(in_month, 29);

        let grid = month_grid(date(2025, 2, 10), &[]);
        let in_month = grid.iter().filter(|cell| cell.is_current_month).count();
        assert_eq!(in_month, 28);
    }

    #[test]
    fn events_land_on_exactly_their_day() {
        let events = vec![
            event("a", date(2025, 7, 2)),
            event("b", date(2025, 7, 15)),
        ];
        let grid = month_grid(date(2025, 7, 1), &events);

        let carrying: Vec<_> = grid.iter().filter(|cell| !cell.events.is_empty()).collect();
        assert_eq!(carrying.len(), 2);
        assert_eq!(carrying[0].date, date(2025, 7, 2));
        assert_eq!(carrying[0].events[0].id, "a");
        assert_eq!(carrying[1].date, date(2025, 7, 15));
        assert_eq!(carrying[1].events[0].id, "b");
    }

    #[test]
    fn same_day_events_keep_input_order() {
        let events = vec![
            event("first", date(2025, 7, 2)),
            event("second", date(2025, 7, 2)),
        ];
        let grid = month_grid(date(2025, 7, 2), &events);

        let cell = grid.iter().find(|cell| cell.date == date(2025, 7, 2)).unwrap();
        assert_eq!(cell.events.len(), 2);
        assert_eq!(cell.events[0].id, "first");
        assert_eq!(cell.events[1].id, "second");

        for other in grid.iter().filter(|c| c.date != date(2025, 7, 2)) {
            assert!(other.events.is_empty());
        }
    }

    #[test]
    fn padding_cells_never_carry_events() {
        // June 30th 2025 is rendered as a padding cell of the July grid,
        // but the event dated there must not be attached to it.
        let events = vec![event("prior", date(2025, 6, 30))];
        let grid = month_grid(date(2025, 7, 1), &events);

        let padding = grid.iter().find(|cell| cell.date == date(2025, 6, 30)).unwrap();
        assert!(!padding.is_current_month);
        assert!(padding.events.is_empty());
        assert!(grid.iter().all(|cell| cell.events.is_empty()));
    }

    #[test]
    fn empty_input_yields_empty_cells() {
        let grid = month_grid(date(2025, 7, 31), &[]);
        assert_eq!(grid.len(), GRID_CELLS);
        assert!(grid.iter().all(|cell| cell.events.is_empty()));
    }

    #[test]
    fn input_events_are_not_mutated() {
        let events = vec![event("a", date(2025, 7, 2))];
        let before = events.clone();
        let _ = month_grid(date(2025, 7, 1), &events);
        assert_eq!(events, before);
    }

    #[test]
    fn month_span_covers_whole_month() {
        assert_eq!(
            month_span(2025, 7),
            Some((date(2025, 7, 1), date(2025, 7, 31)))
        );
        assert_eq!(
            month_span(2024, 2),
            Some((date(2024, 2, 1), date(2024, 2, 29)))
        );
        assert_eq!(
            month_span(2025, 12),
            Some((date(2025, 12, 1), date(2025, 12, 31)))
        );
        assert_eq!(month_span(2025, 13), None);
    }
}
