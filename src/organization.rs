//! Organizations a task can be associated with
//!
//! Purely descriptive: the association has no effect on scheduling.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    id: String,
    name: String,
}

impl Organization {
    /// Create a brand new organization with a random id
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_hyphenated().to_string(),
            name,
        }
    }

    /// Create an organization instance from stored fields
    pub fn new_with_parameters(id: String, name: String) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
}
