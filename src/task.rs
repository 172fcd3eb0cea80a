//! Analysis task types and canonical coordinate payloads.
//!
//! Only some analysis tasks ask the model for object locations. For those,
//! the coordinates are pulled out of the model reply once and stored as a
//! compact JSON string that later decodes without any fragment scanning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coords::{RawPayload, normalize};
use crate::error::Error;

/// Kind of analysis requested for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Free-form description of the image
    Description,
    /// Locate and label objects
    #[default]
    Detection,
    /// Land-cover segmentation
    Segmentation,
    /// Mark user-requested objects
    MarkObject,
    /// Anything else
    Custom,
}

impl TaskType {
    /// Wire name of the task type.
    pub fn name(&self) -> &'static str {
        match self {
            TaskType::Description => "description",
            TaskType::Detection => "detection",
            TaskType::Segmentation => "segmentation",
            TaskType::MarkObject => "mark_object",
            TaskType::Custom => "custom",
        }
    }

    /// All task types.
    pub fn all() -> &'static [TaskType] {
        &[
            TaskType::Description,
            TaskType::Detection,
            TaskType::Segmentation,
            TaskType::MarkObject,
            TaskType::Custom,
        ]
    }

    /// Whether replies to this task are expected to hold object coordinates.
    pub fn carries_coordinates(&self) -> bool {
        matches!(self, TaskType::Detection | TaskType::MarkObject)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TaskType::all()
            .iter()
            .copied()
            .find(|task| task.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::unknown_task_type(wanted))
    }
}

/// Recover the JSON inside a payload and serialize it compactly.
pub fn canonical_payload(raw: &RawPayload) -> Option<String> {
    let value = normalize(raw)?;
    match serde_json::to_string(value.as_ref()) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("Failed to serialize recovered coordinates: {}", e);
            None
        }
    }
}

/// Canonical coordinates from a model reply, for tasks that produce them.
pub fn extract_object_coordinates(content: &str, task: TaskType) -> Option<String> {
    if !task.carries_coordinates() {
        log::debug!("Task '{}' carries no coordinates", task);
        return None;
    }
    canonical_payload(&RawPayload::from(content))
}
