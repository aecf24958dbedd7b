//! Schedule tasks
//!
//! A task is the stored record; what the week view renders are the occurrences the
//! [`expand`](crate::expand) module derives from it.

use chrono::NaiveDate;
use csscolorparser::Color;
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::TimeOfDay;
use crate::week;

/// How often a task repeats, relative to its anchor date
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    None,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Default for Periodicity {
    fn default() -> Self {
        Periodicity::None
    }
}

/// Display priority. Used for sorting and filtering only, never for scheduling
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Sort key: high sorts first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

/// The card colors tasks get assigned at creation
static COLOR_PALETTE: Lazy<Vec<Color>> = Lazy::new(|| {
    ["#93c5fd", "#86efac", "#fde047", "#d8b4fe", "#f9a8d4", "#fdba74", "#fca5a5"]
        .iter()
        .map(|hex| hex.parse().unwrap(/* these literals are valid CSS colors */))
        .collect()
});

/// Picks a card color at random. Colors are assigned once, at creation, and never recomputed
pub fn random_color() -> Color {
    let index = rand::thread_rng().gen_range(0..COLOR_PALETTE.len());
    COLOR_PALETTE[index].clone()
}

/// A schedule task
///
/// Older records only carry a `day` weekday index and integer `start`/`end` hours;
/// newer ones carry an anchor `date` and `"HH:MM"` times. Both representations are kept
/// consistent here: reads resolve through [`TimeOfDay`], and patches rewrite the legacy
/// fields whenever the explicit ones change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier, immutable after creation
    id: String,

    /// The display title
    title: String,

    /// Anchor date the recurrence pattern is computed relative to.
    /// Absent on legacy records, which anchor on `day` instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,

    /// Legacy weekday column, 0 = Monday .. 6 = Sunday
    #[serde(default)]
    day: u32,

    /// Start of day as "HH:MM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    /// End of day as "HH:MM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,

    /// Legacy integer start hour, kept consistent with `start_time`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<u32>,
    /// Legacy integer end hour, kept consistent with `end_time`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<u32>,

    #[serde(default)]
    periodicity: Periodicity,

    #[serde(default)]
    priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<String>,

    /// The display color, picked at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
}

impl Task {
    /// Create a brand new task that is not in any store yet.
    /// This picks a new (random) id and a random display color.
    pub fn new(
        title: String,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
        periodicity: Periodicity,
        priority: Priority,
    ) -> Self {
        let id = Uuid::new_v4().to_hyphenated().to_string();
        Self::new_with_parameters(
            id,
            title,
            Some(date),
            week::day_index(date) as u32,
            Some(start.to_string()),
            Some(end.to_string()),
            Some(start.hour_floor()),
            Some(end.hour_ceil()),
            periodicity,
            priority,
            Some(random_color()),
        )
    }

    /// Create a task instance from stored fields, legacy ones included
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_parameters(
        id: String,
        title: String,
        date: Option<NaiveDate>,
        day: u32,
        start_time: Option<String>,
        end_time: Option<String>,
        start: Option<u32>,
        end: Option<u32>,
        periodicity: Periodicity,
        priority: Priority,
        color: Option<Color>,
    ) -> Self {
        Self {
            id,
            title,
            date,
            day,
            start_time,
            end_time,
            start,
            end,
            periodicity,
            priority,
            project: None,
            description: None,
            organization_id: None,
            color,
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn title(&self) -> &str { &self.title }
    pub fn date(&self) -> Option<NaiveDate> { self.date }
    pub fn day(&self) -> u32 { self.day }
    pub fn start_time(&self) -> Option<&str> { self.start_time.as_deref() }
    pub fn end_time(&self) -> Option<&str> { self.end_time.as_deref() }
    pub fn start_hour(&self) -> Option<u32> { self.start }
    pub fn end_hour(&self) -> Option<u32> { self.end }
    pub fn periodicity(&self) -> Periodicity { self.periodicity }
    pub fn priority(&self) -> Priority { self.priority }
    pub fn project(&self) -> Option<&str> { self.project.as_deref() }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn organization_id(&self) -> Option<&str> { self.organization_id.as_deref() }
    pub fn color(&self) -> Option<&Color> { self.color.as_ref() }

    pub fn set_project(&mut self, project: Option<String>) { self.project = project; }
    pub fn set_description(&mut self, description: Option<String>) { self.description = description; }
    pub fn set_organization_id(&mut self, organization_id: Option<String>) { self.organization_id = organization_id; }

    /// Resolved start of day, in minutes from midnight.
    /// The `"HH:MM"` field wins over the legacy hour; records with neither start at midnight
    pub fn start_minutes(&self) -> u32 {
        TimeOfDay::resolve(self.start_time.as_deref(), self.start).minutes()
    }

    /// Resolved end of day, in minutes from midnight. May not exceed [`Self::start_minutes`]
    /// on malformed records; expansion and layout clamp rather than reject
    pub fn end_minutes(&self) -> u32 {
        TimeOfDay::resolve(self.end_time.as_deref(), self.end).minutes()
    }

    /// Applies a partial update in place.
    ///
    /// Derived fields stay consistent: a patched `"HH:MM"` time rewrites the matching legacy
    /// hour (floor for start, ceiling for end), and a patched date rewrites the weekday column.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
            self.day = week::day_index(date) as u32;
        }
        if let Some(start_time) = &patch.start_time {
            self.start_time = Some(start_time.clone());
            if let Some(time) = TimeOfDay::from_hhmm(start_time) {
                self.start = Some(time.hour_floor());
            }
        }
        if let Some(end_time) = &patch.end_time {
            self.end_time = Some(end_time.clone());
            if let Some(time) = TimeOfDay::from_hhmm(end_time) {
                self.end = Some(time.hour_ceil());
            }
        }
        if let Some(periodicity) = patch.periodicity {
            self.periodicity = periodicity;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(project) = &patch.project {
            self.project = Some(project.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(organization_id) = &patch.organization_id {
            self.organization_id = Some(organization_id.clone());
        }
    }

    /// Returns a patched copy, leaving `self` untouched
    pub fn patched(&self, patch: &TaskPatch) -> Self {
        let mut copy = self.clone();
        copy.apply_patch(patch);
        copy
    }
}

/// A partial update to a task. Unset fields are left as they are;
/// on the wire, only the set fields are serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodicity: Option<Periodicity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &TaskPatch::default()
    }
}

/// The orderings the task list can be sorted by
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Weekday column, then start time, then title
    DayStart,
    /// Anchor date; dated records sort before legacy ones
    Date,
    /// Project name
    Project,
    /// High before medium before low
    Priority,
}

/// Sorts a task list in place. All orderings are stable.
pub fn sort_tasks(tasks: &mut [Task], order: SortOrder) {
    match order {
        SortOrder::DayStart => tasks.sort_by(|a, b| {
            a.day()
                .cmp(&b.day())
                .then(a.start_minutes().cmp(&b.start_minutes()))
                .then_with(|| a.title().cmp(b.title()))
        }),
        SortOrder::Date => tasks.sort_by(|a, b| match (a.date(), b.date()) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
        SortOrder::Project => tasks.sort_by(|a, b| {
            a.project().unwrap_or("").cmp(b.project().unwrap_or(""))
        }),
        SortOrder::Priority => tasks.sort_by_key(|t| t.priority().rank()),
    }
}
