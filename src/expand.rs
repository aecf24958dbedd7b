//! Expanding tasks into the dated occurrences of a displayed week
//!
//! Occurrences are ephemeral: they are recomputed for every rendered week and never stored.
//! Expansion is a pure function of the task record and the week start it is handed;
//! nothing here reads navigation state or "today".

use chrono::{Datelike, NaiveDate};

use crate::task::{Periodicity, Task};
use crate::week;

/// One concrete dated instance of a (possibly recurring) task, valid only for the week
/// it was computed for.
///
/// Several occurrences of one recurring task share the task's id within a week,
/// so rendering keys must combine the id with the date ([`Occurrence::key`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Occurrence<'t> {
    task: &'t Task,
    date: NaiveDate,
    day: usize,
}

impl<'t> Occurrence<'t> {
    fn on(task: &'t Task, date: NaiveDate) -> Self {
        Self { task, date, day: week::day_index(date) }
    }

    pub fn task(&self) -> &'t Task { self.task }
    pub fn date(&self) -> NaiveDate { self.date }

    /// The grid column this occurrence lands in, 0 = Monday .. 6 = Sunday,
    /// recomputed from the concrete date
    pub fn day(&self) -> usize { self.day }

    /// A rendering key that stays unique within a week
    pub fn key(&self) -> String {
        format!("{}@{}", self.task.id(), week::to_iso_date(self.date))
    }
}

/// The weekday column a legacy record (no anchor date) is pinned to.
/// Stored indices may be out of range; clamp instead of indexing out of bounds.
fn legacy_day(task: &Task) -> usize {
    (task.day() as usize).min(6)
}

/// Expands one task into its occurrences within the week starting at `week_start`.
///
/// `week_start` is normalized to its Monday first, so any date within the
/// intended week selects the same window.
pub fn occurrences_in_week<'t>(task: &'t Task, week_start: NaiveDate) -> Vec<Occurrence<'t>> {
    let week_start = week::start_of_week(week_start);
    let days = week::days_of_week(week_start);
    let anchor = task.date();

    match task.periodicity() {
        Periodicity::None => match anchor {
            Some(anchor) => {
                if anchor >= week_start && anchor <= days[6] {
                    vec![Occurrence::on(task, anchor)]
                } else {
                    Vec::new()
                }
            }
            None => vec![Occurrence::on(task, days[legacy_day(task)])],
        },

        // One occurrence per day, but never before the task's own start date
        Periodicity::Daily => days
            .iter()
            .filter(|day| anchor.map_or(true, |a| **day >= a))
            .map(|day| Occurrence::on(task, *day))
            .collect(),

        Periodicity::Weekly => match anchor {
            Some(anchor) => {
                if week::week_index(week::start_of_week(anchor), week_start) >= 0 {
                    vec![Occurrence::on(task, days[week::day_index(anchor)])]
                } else {
                    Vec::new()
                }
            }
            None => vec![Occurrence::on(task, days[legacy_day(task)])],
        },

        Periodicity::Biweekly => match anchor {
            Some(anchor) => {
                let index = week::week_index(week::start_of_week(anchor), week_start);
                if index >= 0 && index % 2 == 0 {
                    vec![Occurrence::on(task, days[week::day_index(anchor)])]
                } else {
                    Vec::new()
                }
            }
            // Without an anchor there is nothing to alternate against, so these
            // show up every week, like weekly ones
            None => vec![Occurrence::on(task, days[legacy_day(task)])],
        },

        // Same day-of-month as the anchor; months without that day yield nothing
        Periodicity::Monthly => match anchor {
            Some(anchor) => days
                .iter()
                .filter(|day| day.day() == anchor.day() && **day >= anchor)
                .map(|day| Occurrence::on(task, *day))
                .collect(),
            None => Vec::new(),
        },
    }
}

/// Expands a whole task list for the displayed week, in list order
pub fn week_occurrences<'t>(tasks: &'t [Task], week_start: NaiveDate) -> Vec<Occurrence<'t>> {
    tasks
        .iter()
        .flat_map(|task| occurrences_in_week(task, week_start))
        .collect()
}
