//! The in-memory task list and its reconciliation with a backing store
//!
//! The controller owns the canonical task list of a session. Edits and deletions apply
//! to that list immediately (and to an attached shared read mirror), then the backing
//! store is asked to agree; if it refuses, the pre-mutation snapshot comes back verbatim
//! and the failure surfaces as a user-visible message. Nothing here ever panics or
//! propagates an error past the controller: the UI only reads state.
//!
//! Known gap: mutations are not locked per item. Two overlapping edits of the same task
//! from one session can race each other; the last confirmed write wins.

use std::error::Error;
use std::sync::{Arc, Mutex};

use crate::cache::LocalStore;
use crate::task::{sort_tasks, SortOrder, Task, TaskPatch};
use crate::time::TimeOfDay;
use crate::traits::TaskRepository;

/// Where a mutation ended up once its handler returned
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backing store accepted the write
    Confirmed,
    /// The store refused; the pre-mutation list was restored
    RolledBack,
    /// The mutation was invalid and was never applied
    Rejected,
}

/// Keeps an in-memory task list consistent with a backing store through
/// optimistic mutations
pub struct Controller<R: TaskRepository> {
    store: R,
    tasks: Vec<Task>,

    /// A shared read cache (e.g. the local file a UI also displays) that mirrors
    /// optimistic changes, so readers see them without refetching
    mirror: Option<Arc<Mutex<LocalStore>>>,

    /// Id of the task whose edit surface is open, if any
    editing: Option<String>,
    /// True between the optimistic application and the store's verdict
    saving: bool,
    /// The message the UI should show for the last failed mutation
    last_error: Option<String>,
}

impl<R: TaskRepository> Controller<R> {
    pub fn new(store: R) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            mirror: None,
            editing: None,
            saving: false,
            last_error: None,
        }
    }

    /// Attaches a shared read cache that will follow this controller's list
    pub fn with_mirror(store: R, mirror: Arc<Mutex<LocalStore>>) -> Self {
        let mut controller = Self::new(store);
        controller.mirror = Some(mirror);
        controller
    }

    /// The current task list. During an in-flight mutation this already shows
    /// the optimistic state
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True while a mutation awaits the store's verdict. UIs should render the
    /// affected item as "saving" and are advised to hold conflicting actions on it
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Id of the task whose edit surface is open
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn open_editor(&mut self, id: &str) {
        self.editing = Some(id.to_string());
    }

    pub fn close_editor(&mut self) {
        self.editing = None;
    }

    /// Replaces the list with whatever the store currently holds
    pub async fn refresh(&mut self) -> Result<(), Box<dyn Error>> {
        let tasks = self.store.list_tasks().await?;
        self.tasks = tasks;
        self.mirror_tasks();
        Ok(())
    }

    /// Reorders the in-memory list (and its mirror)
    pub fn sort(&mut self, order: SortOrder) {
        sort_tasks(&mut self.tasks, order);
        self.mirror_tasks();
    }

    /// Creates a task in the backing store, then adopts the stored version.
    ///
    /// Creation is not optimistic: the task only joins the list once the store
    /// confirmed it, so there is nothing to roll back on failure.
    pub async fn create(&mut self, task: Task) -> MutationOutcome {
        self.saving = true;
        let result = self.store.create_task(task).await;
        self.saving = false;

        match result {
            Ok(created) => {
                self.tasks.push(created);
                self.mirror_tasks();
                self.last_error = None;
                self.background_refresh().await;
                MutationOutcome::Confirmed
            }
            Err(err) => {
                log::warn!("Unable to create task: {}", err);
                self.last_error = Some("No se pudo crear la tarea".to_string());
                MutationOutcome::RolledBack
            }
        }
    }

    /// Deletes a task: it leaves the list immediately, and comes back (with an
    /// error message) if the store refuses.
    pub async fn delete(&mut self, id: &str) -> MutationOutcome {
        if self.tasks.iter().all(|task| task.id() != id) {
            self.last_error = Some("La tarea no existe".to_string());
            return MutationOutcome::Rejected;
        }

        let snapshot = self.tasks.clone();
        self.tasks.retain(|task| task.id() != id);
        self.mirror_tasks();

        self.saving = true;
        let result = self.store.delete_task(id).await;
        self.saving = false;

        match result {
            Ok(()) => {
                self.last_error = None;
                self.background_refresh().await;
                MutationOutcome::Confirmed
            }
            Err(err) => {
                log::warn!("Unable to delete task {}: {}", id, err);
                self.tasks = snapshot;
                self.mirror_tasks();
                self.last_error = Some("No se pudo eliminar la tarea".to_string());
                MutationOutcome::RolledBack
            }
        }
    }

    /// Applies a partial update: the patched copy swaps into the list immediately,
    /// and the snapshot comes back if the store refuses.
    ///
    /// On confirmation the edit surface closes; on rollback it stays open so the
    /// user can retry.
    pub async fn update(&mut self, id: &str, patch: TaskPatch) -> MutationOutcome {
        // Validation happens before anything is touched
        let target = match self.tasks.iter().find(|task| task.id() == id) {
            None => {
                self.last_error = Some("La tarea no existe".to_string());
                return MutationOutcome::Rejected;
            }
            Some(task) => task,
        };
        if let Err(err) = validate_times(target, &patch) {
            self.last_error = Some(err.to_string());
            return MutationOutcome::Rejected;
        }

        let snapshot = self.tasks.clone();
        for task in self.tasks.iter_mut() {
            if task.id() == id {
                task.apply_patch(&patch);
            }
        }
        self.mirror_tasks();

        self.saving = true;
        let result = self.store.update_task(id, &patch).await;
        self.saving = false;

        match result {
            Ok(()) => {
                self.last_error = None;
                self.close_editor();
                self.background_refresh().await;
                MutationOutcome::Confirmed
            }
            Err(err) => {
                log::warn!("Unable to save task {}: {}", id, err);
                self.tasks = snapshot;
                self.mirror_tasks();
                self.last_error = Some("No se pudo guardar la tarea".to_string());
                MutationOutcome::RolledBack
            }
        }
    }

    /// Reconciles with the store after a confirmed write. The optimistic list is
    /// already displayable, so a failed refresh is only logged, never surfaced
    async fn background_refresh(&mut self) {
        if let Err(err) = self.refresh().await {
            log::warn!("Unable to refresh the task list: {}", err);
        }
    }

    fn mirror_tasks(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.lock().unwrap(/* no task list reader panics while holding this */).set_tasks(self.tasks.clone());
        }
    }
}

/// Refuses a patch whose resolved times would end at or before their start.
/// Patches that leave both times alone are not re-validated against old records.
fn validate_times(task: &Task, patch: &TaskPatch) -> Result<(), Box<dyn Error>> {
    if patch.start_time.is_none() && patch.end_time.is_none() {
        return Ok(());
    }

    let start = match &patch.start_time {
        Some(text) => TimeOfDay::from_hhmm(text).ok_or("La hora de inicio no es válida")?,
        None => TimeOfDay::from_minutes(task.start_minutes()),
    };
    let end = match &patch.end_time {
        Some(text) => TimeOfDay::from_hhmm(text).ok_or("La hora de fin no es válida")?,
        None => TimeOfDay::from_minutes(task.end_minutes()),
    };

    if end <= start {
        return Err("La hora de fin debe ser posterior a la de inicio".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::path::PathBuf;

    use crate::task::{Periodicity, Priority};
    use crate::week::parse_iso_date;

    /// A store whose operations can be told to fail, standing in for a flaky remote
    #[derive(Default)]
    struct ScriptedStore {
        tasks: Vec<Task>,
        fail_updates: bool,
        fail_deletes: bool,
        update_calls: u32,
        delete_calls: u32,
    }

    #[async_trait(?Send)]
    impl TaskRepository for ScriptedStore {
        async fn list_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>> {
            Ok(self.tasks.clone())
        }

        async fn create_task(&mut self, task: Task) -> Result<Task, Box<dyn Error>> {
            self.tasks.push(task.clone());
            Ok(task)
        }

        async fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), Box<dyn Error>> {
            self.update_calls += 1;
            if self.fail_updates {
                return Err("scripted failure".into());
            }
            match self.tasks.iter_mut().find(|task| task.id() == id) {
                None => Err("This key does not exist.".into()),
                Some(task) => {
                    task.apply_patch(patch);
                    Ok(())
                }
            }
        }

        async fn delete_task(&mut self, id: &str) -> Result<(), Box<dyn Error>> {
            self.delete_calls += 1;
            if self.fail_deletes {
                return Err("scripted failure".into());
            }
            self.tasks.retain(|task| task.id() != id);
            Ok(())
        }
    }

    fn sample_task(title: &str) -> Task {
        Task::new(
            title.to_string(),
            parse_iso_date("2024-03-04").unwrap(),
            TimeOfDay::from_hhmm("12:00").unwrap(),
            TimeOfDay::from_hhmm("13:00").unwrap(),
            Periodicity::Weekly,
            Priority::Low,
        )
    }

    fn controller_with(tasks: Vec<Task>) -> Controller<ScriptedStore> {
        Controller::new(ScriptedStore { tasks, ..ScriptedStore::default() })
    }

    fn mirror_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    #[tokio::test]
    async fn confirmed_delete_removes_the_task() {
        let task = sample_task("Estudiar");
        let id = task.id().to_string();
        let mut controller = controller_with(vec![task]);
        controller.refresh().await.unwrap();

        let outcome = controller.delete(&id).await;

        assert_eq!(outcome, MutationOutcome::Confirmed);
        assert!(controller.tasks().is_empty());
        assert_eq!(controller.last_error(), None);
        assert!(!controller.is_saving());
    }

    #[tokio::test]
    async fn rejected_delete_rolls_the_list_back_verbatim() {
        let task = sample_task("Estudiar");
        let id = task.id().to_string();
        let mut controller = controller_with(vec![task]);
        controller.store.fail_deletes = true;
        controller.refresh().await.unwrap();
        let before = controller.tasks().to_vec();

        let outcome = controller.delete(&id).await;

        assert_eq!(outcome, MutationOutcome::RolledBack);
        assert_eq!(controller.tasks(), before.as_slice());
        assert!(!controller.last_error().unwrap_or("").is_empty());
        assert!(!controller.is_saving());
    }

    #[tokio::test]
    async fn rejected_delete_restores_the_mirror_too() {
        let _ = env_logger::builder().is_test(true).try_init();

        let task = sample_task("Estudiar");
        let id = task.id().to_string();
        let mirror = Arc::new(Mutex::new(LocalStore::new(&mirror_file("horario-mirror-rollback.json"))));

        let store = ScriptedStore { tasks: vec![task], fail_deletes: true, ..ScriptedStore::default() };
        let mut controller = Controller::with_mirror(store, mirror.clone());
        controller.refresh().await.unwrap();
        let before = mirror.lock().unwrap().tasks().to_vec();

        controller.delete(&id).await;

        assert_eq!(mirror.lock().unwrap().tasks(), before.as_slice());
    }

    #[tokio::test]
    async fn confirmed_update_closes_the_editor() {
        let task = sample_task("Estudiar");
        let id = task.id().to_string();
        let mut controller = controller_with(vec![task]);
        controller.refresh().await.unwrap();
        controller.open_editor(&id);

        let patch = TaskPatch {
            start_time: Some("09:30".to_string()),
            end_time: Some("10:45".to_string()),
            ..TaskPatch::default()
        };
        let outcome = controller.update(&id, patch).await;

        assert_eq!(outcome, MutationOutcome::Confirmed);
        assert_eq!(controller.editing(), None);

        // The refreshed record kept both time representations consistent
        let updated = &controller.tasks()[0];
        assert_eq!(updated.start_hour(), Some(9));
        assert_eq!(updated.end_hour(), Some(11));
    }

    #[tokio::test]
    async fn rejected_update_keeps_the_editor_open_and_restores_the_snapshot() {
        let task = sample_task("Estudiar");
        let id = task.id().to_string();
        let mut controller = controller_with(vec![task]);
        controller.store.fail_updates = true;
        controller.refresh().await.unwrap();
        controller.open_editor(&id);
        let before = controller.tasks().to_vec();

        let patch = TaskPatch {
            title: Some("Repasar".to_string()),
            ..TaskPatch::default()
        };
        let outcome = controller.update(&id, patch).await;

        assert_eq!(outcome, MutationOutcome::RolledBack);
        assert_eq!(controller.tasks(), before.as_slice());
        assert_eq!(controller.editing(), Some(id.as_str()));
        assert!(!controller.last_error().unwrap_or("").is_empty());
        assert!(!controller.is_saving());
    }

    #[tokio::test]
    async fn invalid_times_are_rejected_before_any_mutation() {
        let task = sample_task("Estudiar");
        let id = task.id().to_string();
        let mut controller = controller_with(vec![task]);
        controller.refresh().await.unwrap();
        let before = controller.tasks().to_vec();

        let patch = TaskPatch {
            start_time: Some("10:00".to_string()),
            end_time: Some("10:00".to_string()),
            ..TaskPatch::default()
        };
        let outcome = controller.update(&id, patch).await;

        assert_eq!(outcome, MutationOutcome::Rejected);
        assert_eq!(controller.tasks(), before.as_slice());
        // The store never saw the invalid write
        assert_eq!(controller.store.update_calls, 0);
        assert!(controller.last_error().is_some());
    }

    #[tokio::test]
    async fn deleting_an_unknown_id_is_rejected_without_a_store_call() {
        let mut controller = controller_with(vec![sample_task("Estudiar")]);
        controller.refresh().await.unwrap();

        let outcome = controller.delete("missing").await;

        assert_eq!(outcome, MutationOutcome::Rejected);
        assert_eq!(controller.store.delete_calls, 0);
    }

    #[tokio::test]
    async fn create_adopts_the_stored_version() {
        let mut controller = controller_with(Vec::new());

        let outcome = controller.create(sample_task("Nueva")).await;

        assert_eq!(outcome, MutationOutcome::Confirmed);
        assert_eq!(controller.tasks().len(), 1);
        assert_eq!(controller.tasks()[0].title(), "Nueva");
    }

    #[tokio::test]
    async fn local_mode_collapses_optimistic_and_confirmed() {
        // Backed directly by a local store, a mutation confirms in the same step
        let mut store = LocalStore::new(&mirror_file("horario-local-mode.json"));
        let task = sample_task("Estudiar");
        let id = task.id().to_string();
        store.set_tasks(vec![task]);

        let mut controller = Controller::new(store);
        controller.refresh().await.unwrap();

        assert_eq!(controller.delete(&id).await, MutationOutcome::Confirmed);
        assert!(controller.tasks().is_empty());
    }

    #[tokio::test]
    async fn sort_reorders_the_controller_list() {
        let mut low = sample_task("baja");
        low.apply_patch(&TaskPatch { priority: Some(Priority::Low), ..TaskPatch::default() });
        let mut high = sample_task("alta");
        high.apply_patch(&TaskPatch { priority: Some(Priority::High), ..TaskPatch::default() });

        let mut controller = controller_with(vec![low, high]);
        controller.refresh().await.unwrap();
        controller.sort(SortOrder::Priority);

        assert_eq!(controller.tasks()[0].title(), "alta");
    }
}
