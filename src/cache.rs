//! This module provides a local store for schedule data
//!
//! When no remote store is configured, the task list lives here: a JSON file loaded once at
//! startup and written back on every mutation. A [`Controller`](crate::controller::Controller)
//! backed by a remote store can also attach one of these as its shared read mirror, so a UI
//! reading the file sees optimistic changes without refetching.

use std::error::Error;
use std::path::{Path, PathBuf};
#[cfg(feature = "local_store_mocks_remote_store")]
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config;
#[cfg(feature = "local_store_mocks_remote_store")]
use crate::mock_behaviour::MockBehaviour;
use crate::organization::Organization;
use crate::task::{sort_tasks, SortOrder, Task, TaskPatch};
use crate::traits::{OrganizationRepository, TaskRepository};

/// A store that keeps its data in a local file
#[derive(Debug)]
pub struct LocalStore {
    backing_file: PathBuf,
    data: StoredData,

    /// In tests, this allows the store to (pretend to) malfunction like a flaky remote
    #[cfg(feature = "local_store_mocks_remote_store")]
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

#[derive(Default, Debug, PartialEq, Serialize, Deserialize)]
struct StoredData {
    tasks: Vec<Task>,
    organizations: Vec<Organization>,
}

impl LocalStore {
    /// The default path of the backing file, derived from the configured storage key
    pub fn storage_file() -> PathBuf {
        let key = config::STORAGE_KEY.lock().unwrap(/* never poisoned, it only holds a String */).clone();
        PathBuf::from(format!("~/.config/horario/{}.json", sanitize_filename::sanitize(key)))
    }

    /// Initialize a store from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self {
            backing_file: PathBuf::from(path),
            data,
            #[cfg(feature = "local_store_mocks_remote_store")]
            mock_behaviour: None,
        })
    }

    /// Initialize an empty store
    pub fn new(path: &Path) -> Self {
        Self {
            backing_file: PathBuf::from(path),
            data: StoredData::default(),
            #[cfg(feature = "local_store_mocks_remote_store")]
            mock_behaviour: None,
        }
    }

    #[cfg(feature = "local_store_mocks_remote_store")]
    pub fn set_mock_behaviour(&mut self, mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = mock_behaviour;
    }

    /// Write the current contents to the backing file
    fn save_to_file(&mut self) {
        let path = &self.backing_file;
        let file = match std::fs::File::create(path) {
            Err(err) => {
                log::warn!("Unable to save file {:?}: {}", path, err);
                return;
            },
            Ok(f) => f,
        };

        if let Err(err) = serde_json::to_writer(file, &self.data) {
            log::warn!("Unable to serialize: {}", err);
            return;
        };
    }

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.data.organizations
    }

    /// Replaces the whole task list and persists it.
    /// This is what a controller calls to mirror its optimistic state here.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.data.tasks = tasks;
        self.save_to_file();
    }

    /// Empties the task list
    pub fn clear_tasks(&mut self) {
        self.data.tasks.clear();
        self.save_to_file();
    }

    /// Reorders the stored task list
    pub fn sort_tasks(&mut self, order: SortOrder) {
        sort_tasks(&mut self.data.tasks, order);
        self.save_to_file();
    }
}

impl PartialEq for LocalStore {
    fn eq(&self, other: &Self) -> bool {
        self.backing_file == other.backing_file && self.data == other.data
    }
}

#[async_trait(?Send)]
impl TaskRepository for LocalStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>> {
        #[cfg(feature = "local_store_mocks_remote_store")]
        self.mock_behaviour.as_ref().map_or(Ok(()), |b| b.lock().unwrap().can_list_tasks())?;

        Ok(self.data.tasks.clone())
    }

    async fn create_task(&mut self, task: Task) -> Result<Task, Box<dyn Error>> {
        #[cfg(feature = "local_store_mocks_remote_store")]
        self.mock_behaviour.as_ref().map_or(Ok(()), |b| b.lock().unwrap().can_create_task())?;

        self.data.tasks.push(task.clone());
        self.save_to_file();
        Ok(task)
    }

    async fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), Box<dyn Error>> {
        #[cfg(feature = "local_store_mocks_remote_store")]
        self.mock_behaviour.as_ref().map_or(Ok(()), |b| b.lock().unwrap().can_update_task())?;

        match self.data.tasks.iter_mut().find(|task| task.id() == id) {
            None => Err("This key does not exist.".into()),
            Some(task) => {
                task.apply_patch(patch);
                self.save_to_file();
                Ok(())
            }
        }
    }

    async fn delete_task(&mut self, id: &str) -> Result<(), Box<dyn Error>> {
        #[cfg(feature = "local_store_mocks_remote_store")]
        self.mock_behaviour.as_ref().map_or(Ok(()), |b| b.lock().unwrap().can_delete_task())?;

        let count_before = self.data.tasks.len();
        self.data.tasks.retain(|task| task.id() != id);
        if self.data.tasks.len() == count_before {
            return Err("This key does not exist.".into());
        }
        self.save_to_file();
        Ok(())
    }
}

#[async_trait(?Send)]
impl OrganizationRepository for LocalStore {
    async fn list_organizations(&self) -> Result<Vec<Organization>, Box<dyn Error>> {
        #[cfg(feature = "local_store_mocks_remote_store")]
        self.mock_behaviour.as_ref().map_or(Ok(()), |b| b.lock().unwrap().can_list_organizations())?;

        Ok(self.data.organizations.clone())
    }

    async fn create_organization(&mut self, organization: Organization) -> Result<Organization, Box<dyn Error>> {
        #[cfg(feature = "local_store_mocks_remote_store")]
        self.mock_behaviour.as_ref().map_or(Ok(()), |b| b.lock().unwrap().can_create_organization())?;

        self.data.organizations.push(organization.clone());
        self.save_to_file();
        Ok(organization)
    }

    async fn delete_organization(&mut self, id: &str) -> Result<(), Box<dyn Error>> {
        #[cfg(feature = "local_store_mocks_remote_store")]
        self.mock_behaviour.as_ref().map_or(Ok(()), |b| b.lock().unwrap().can_delete_organization())?;

        let count_before = self.data.organizations.len();
        self.data.organizations.retain(|org| org.id() != id);
        if self.data.organizations.len() == count_before {
            return Err("This key does not exist.".into());
        }
        self.save_to_file();
        Ok(())
    }
}
