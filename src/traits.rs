use std::error::Error;

use async_trait::async_trait;

use crate::organization::Organization;
use crate::task::{Task, TaskPatch};

/// A store of schedule tasks.
///
/// Every operation has exactly one canonical form here. Stores that must tolerate several
/// remote route shapes (see [`RemoteStore`](crate::client::RemoteStore)) keep that juggling
/// internal; callers like the [`Controller`](crate::controller::Controller) never see it.
#[async_trait(?Send)]
pub trait TaskRepository {
    /// Returns every task this store currently holds
    async fn list_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>>;

    /// Stores a new task, and returns it as the store recorded it
    async fn create_task(&mut self, task: Task) -> Result<Task, Box<dyn Error>>;

    /// Applies a partial update to the task with this id
    async fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), Box<dyn Error>>;

    /// Removes the task with this id
    async fn delete_task(&mut self, id: &str) -> Result<(), Box<dyn Error>>;
}

/// A store of organizations
#[async_trait(?Send)]
pub trait OrganizationRepository {
    /// Returns every organization this store currently holds
    async fn list_organizations(&self) -> Result<Vec<Organization>, Box<dyn Error>>;

    /// Stores a new organization, and returns it as the store recorded it
    async fn create_organization(&mut self, organization: Organization) -> Result<Organization, Box<dyn Error>>;

    /// Removes the organization with this id
    async fn delete_organization(&mut self, id: &str) -> Result<(), Box<dyn Error>>;
}
