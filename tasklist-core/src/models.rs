use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::errors::ClientError;

/// Task id used by the detail screen to mean "no task yet".
pub const NEW_TASK_ID: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Zero asks the store to assign the next id on insert.
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl Task {
    /// Builds a task that the store will assign an id to.
    pub fn new(title: impl Into<String>, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: description.into(),
            priority,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

/// Urgency tag. Declaration order is the ordinal order used for sorting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
    None,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::None,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
            Priority::None => 3,
        }
    }

    /// Decodes a stored literal name (`"HIGH"`, `"LOW"`, ...).
    pub fn from_name(name: &str) -> Result<Self, ClientError> {
        Priority::from_str(name).map_err(|_| ClientError::UnknownPriority(name.to_string()))
    }
}

/// Direction of a priority sort, expressed over ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// LOW, MEDIUM, HIGH, with NONE last.
    LowFirst,
    /// Ascending ordinal: HIGH, MEDIUM, LOW, NONE.
    HighFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchBarState {
    #[default]
    Closed,
    Opened,
    Triggered,
}

/// What the detail screen asks the list to do once it navigates back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Add,
    Update,
    Delete,
    DeleteAll,
    Undo,
    #[default]
    NoAction,
}

impl Action {
    /// Parses the `{action}` navigation argument. Anything unrecognised is `NoAction`.
    pub fn from_route_arg(arg: &str) -> Self {
        Action::from_str(arg).unwrap_or_default()
    }
}

/// Which list the list screen presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    All,
    Search,
    LowFirst,
    HighFirst,
}

impl ListView {
    pub fn resolve(search_bar: SearchBarState, sort: Option<Priority>) -> Self {
        if search_bar == SearchBarState::Triggered {
            return ListView::Search;
        }
        match sort {
            Some(Priority::Low) => ListView::LowFirst,
            Some(Priority::High) => ListView::HighFirst,
            // MEDIUM has no dedicated sorted view
            Some(Priority::Medium) | Some(Priority::None) | None => ListView::All,
        }
    }
}
