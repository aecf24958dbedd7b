//! Pixel geometry of occurrences on the week grid
//!
//! The grid draws hour rows between an opening and a closing hour; an occurrence becomes a
//! card with a top offset and a height. Mapping never fails: degenerate time ranges are
//! stretched to a minimum duration, and ends past the closing hour are clamped so a card
//! never spills below the grid.

use crate::expand::Occurrence;

/// Height of one hour row, in pixels
pub const HOUR_HEIGHT: f32 = 64.0;
/// Pixels per minute at the default row height
pub const PX_PER_MINUTE: f32 = HOUR_HEIGHT / 60.0;
/// The grid's opening hour
pub const GRID_START_HOUR: u32 = 8;
/// The grid's closing hour
pub const GRID_END_HOUR: u32 = 19;
/// Cards never shrink below this, so their edit and delete controls stay usable
pub const MIN_CARD_HEIGHT: f32 = 24.0;
/// An occurrence whose end does not exceed its start is stretched to this duration
pub const MIN_DURATION_MINUTES: u32 = 30;

/// Where an occurrence's card sits in a day column
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CardGeometry {
    /// Offset from the grid's opening hour, in pixels
    pub top: f32,
    /// Card height in pixels, at least [`MIN_CARD_HEIGHT`]
    pub height: f32,
}

/// Maps a resolved time range onto the grid.
///
/// Starts before the opening hour pin the card to the top edge; ends past the closing
/// hour are clamped to it. A range whose end does not exceed its start is first stretched
/// to [`MIN_DURATION_MINUTES`].
pub fn layout(
    start_minutes: u32,
    end_minutes: u32,
    px_per_minute: f32,
    grid_start_hour: u32,
    grid_end_hour: u32,
) -> CardGeometry {
    let grid_end = grid_end_hour * 60;

    let mut end = end_minutes;
    if end <= start_minutes {
        end = start_minutes + MIN_DURATION_MINUTES;
    }
    if end > grid_end {
        end = grid_end;
    }

    let top = start_minutes.saturating_sub(grid_start_hour * 60) as f32 * px_per_minute;
    let height = end.saturating_sub(start_minutes) as f32 * px_per_minute;

    CardGeometry {
        top,
        height: height.max(MIN_CARD_HEIGHT),
    }
}

/// [`layout`] with the default grid parameters, reading the times off the occurrence's task
pub fn layout_occurrence(occurrence: &Occurrence) -> CardGeometry {
    layout(
        occurrence.task().start_minutes(),
        occurrence.task().end_minutes(),
        PX_PER_MINUTE,
        GRID_START_HOUR,
        GRID_END_HOUR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_regular_slot_maps_to_its_rows() {
        // 10:00-12:00 on the default grid: two hour rows below the 08:00 line
        let geometry = layout(10 * 60, 12 * 60, PX_PER_MINUTE, GRID_START_HOUR, GRID_END_HOUR);
        assert_eq!(geometry.top, 2.0 * HOUR_HEIGHT);
        assert_eq!(geometry.height, 2.0 * HOUR_HEIGHT);
    }

    #[test]
    fn degenerate_ranges_get_the_minimum_duration() {
        let geometry = layout(10 * 60, 10 * 60, PX_PER_MINUTE, GRID_START_HOUR, GRID_END_HOUR);
        assert_eq!(geometry.height, MIN_DURATION_MINUTES as f32 * PX_PER_MINUTE);

        // End before start behaves the same way
        let inverted = layout(10 * 60, 9 * 60, PX_PER_MINUTE, GRID_START_HOUR, GRID_END_HOUR);
        assert_eq!(inverted.height, geometry.height);
    }

    #[test]
    fn height_never_drops_below_the_minimum_card_height() {
        for (start, end) in [(600, 600), (600, 601), (600, 500), (1130, 1135)] {
            let geometry = layout(start, end, PX_PER_MINUTE, GRID_START_HOUR, GRID_END_HOUR);
            assert!(geometry.height >= MIN_CARD_HEIGHT, "{}..{}", start, end);
        }
    }

    #[test]
    fn ends_past_the_closing_hour_are_clamped() {
        // 18:00-23:00 on a grid closing at 19:00 renders as a single row
        let geometry = layout(18 * 60, 23 * 60, PX_PER_MINUTE, GRID_START_HOUR, GRID_END_HOUR);
        assert_eq!(geometry.height, HOUR_HEIGHT);
    }

    #[test]
    fn starts_before_the_opening_hour_pin_to_the_top() {
        let geometry = layout(6 * 60, 9 * 60, PX_PER_MINUTE, GRID_START_HOUR, GRID_END_HOUR);
        assert_eq!(geometry.top, 0.0);
    }

    #[test]
    fn starts_past_the_closing_hour_still_yield_a_visible_card() {
        let geometry = layout(20 * 60, 21 * 60, PX_PER_MINUTE, GRID_START_HOUR, GRID_END_HOUR);
        assert_eq!(geometry.height, MIN_CARD_HEIGHT);
    }
}
