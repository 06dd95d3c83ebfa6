//! Task store and persistence.
//!
//! The store owns the in-memory task collection plus a storage backend. The
//! whole collection is the unit of persistence: every mutation rewrites the
//! full task list through the backend, so the persisted copy always matches
//! what the UI last showed.

use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, warn};

use crate::clock::now_ms;
use crate::task::Task;

/// Backend that can load and rewrite the full task collection.
pub trait Storage {
    fn load(&self) -> Result<Vec<Task>>;
    fn store(&self, tasks: &[Task]) -> Result<()>;
}

/// JSON file backend. A missing file loads as an empty list.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut buf = String::new();
        File::open(&self.path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&buf).with_context(|| format!("parsing {}", self.path.display()))
    }

    /// Atomic-ish write via temp + rename.
    fn store(&self, tasks: &[Task]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(tasks)?;
        let mut f =
            File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory task collection bound to a storage backend.
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Box<dyn Storage>,
}

impl TaskStore {
    /// Load the collection from storage. An unreadable or corrupt backend is
    /// logged and the store starts empty rather than failing.
    pub fn open(storage: Box<dyn Storage>) -> Self {
        let tasks = match storage.load() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!("could not read task store, starting empty: {e:#}");
                Vec::new()
            }
        };
        Self { tasks, storage }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Next available task ID.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Append a new, incomplete task and persist. Rejects empty titles.
    pub fn add(&mut self, title: &str, start_time: i64, due_time: i64) -> Result<u64> {
        let title = title.trim();
        if title.is_empty() {
            bail!("task title must not be empty");
        }
        let id = self.next_id();
        self.tasks.push(Task {
            id,
            title: title.to_string(),
            start_time,
            due_time,
            completion_time: None,
        });
        self.persist()?;
        debug!("added task #{id}");
        Ok(id)
    }

    /// Flip a task between complete ("now") and incomplete. Unknown ids are
    /// logged and ignored; returns whether a task was changed.
    pub fn toggle(&mut self, id: u64) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            warn!("toggle requested for unknown task #{id}");
            return Ok(false);
        };
        task.completion_time = match task.completion_time {
            Some(_) => None,
            None => Some(now_ms()),
        };
        self.persist()?;
        Ok(true)
    }

    /// Overwrite title, start, and due in place, leaving `completion_time`
    /// untouched. Unknown ids are logged and ignored.
    pub fn update(
        &mut self,
        id: u64,
        title: &str,
        start_time: i64,
        due_time: i64,
    ) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            bail!("task title must not be empty");
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            warn!("edit requested for unknown task #{id}");
            return Ok(false);
        };
        task.title = title.to_string();
        task.start_time = start_time;
        task.due_time = due_time;
        self.persist()?;
        Ok(true)
    }

    /// Remove a task by id; a no-op when absent.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            debug!("delete requested for unknown task #{id}");
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Main list view: incomplete tasks first (most recently started on
    /// top), then completed tasks (most recently completed on top).
    pub fn main_list(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        tasks.sort_by(|a, b| main_list_order(a, b));
        tasks
    }

    /// Best Times leaderboard: completed tasks only, fastest first.
    pub fn best_times(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| t.is_completed()).collect();
        tasks.sort_by_key(|t| t.completion_duration_ms());
        tasks
    }

    fn persist(&self) -> Result<()> {
        self.storage.store(&self.tasks)
    }
}

/// Three-way comparator for the main list.
pub fn main_list_order(a: &Task, b: &Task) -> Ordering {
    match (a.completion_time, b.completion_time) {
        (Some(done_a), Some(done_b)) => done_b.cmp(&done_a),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => b.start_time.cmp(&a.start_time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Storage double that records every persisted snapshot.
    #[derive(Default)]
    struct MemStorage {
        saved: RefCell<Vec<Vec<Task>>>,
    }

    impl Storage for Rc<MemStorage> {
        fn load(&self) -> Result<Vec<Task>> {
            Ok(Vec::new())
        }

        fn store(&self, tasks: &[Task]) -> Result<()> {
            self.saved.borrow_mut().push(tasks.to_vec());
            Ok(())
        }
    }

    fn empty_store() -> TaskStore {
        struct Null;
        impl Storage for Null {
            fn load(&self) -> Result<Vec<Task>> {
                Ok(Vec::new())
            }
            fn store(&self, _tasks: &[Task]) -> Result<()> {
                Ok(())
            }
        }
        TaskStore::open(Box::new(Null))
    }

    #[test]
    fn add_assigns_monotonic_ids() {
        let mut store = empty_store();
        let a = store.add("first", 0, 10).unwrap();
        let b = store.add("second", 5, 15).unwrap();
        assert_eq!(b, a + 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn add_rejects_empty_title() {
        let mut store = empty_store();
        assert!(store.add("", 0, 10).is_err());
        assert!(store.add("   ", 0, 10).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn toggle_twice_clears_completion() {
        let mut store = empty_store();
        let id = store.add("task", 0, 10).unwrap();
        assert!(store.toggle(id).unwrap());
        assert!(store.get(id).unwrap().is_completed());
        assert!(store.toggle(id).unwrap());
        assert_eq!(store.get(id).unwrap().completion_time, None);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut store = empty_store();
        store.add("task", 0, 10).unwrap();
        assert!(!store.toggle(999).unwrap());
        assert_eq!(store.get(1).unwrap().completion_time, None);
    }

    #[test]
    fn update_preserves_completion_time() {
        let mut store = empty_store();
        let id = store.add("task", 0, 10).unwrap();
        store.toggle(id).unwrap();
        let done = store.get(id).unwrap().completion_time;
        assert!(store.update(id, "renamed", 100, 200).unwrap());
        let task = store.get(id).unwrap();
        assert_eq!(task.title, "renamed");
        assert_eq!(task.start_time, 100);
        assert_eq!(task.due_time, 200);
        assert_eq!(task.completion_time, done);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut store = empty_store();
        store.add("task", 0, 10).unwrap();
        assert!(!store.update(42, "renamed", 0, 0).unwrap());
        assert_eq!(store.get(1).unwrap().title, "task");
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let mut store = empty_store();
        store.add("task", 0, 10).unwrap();
        assert!(!store.remove(999).unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.remove(1).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn main_list_orders_incomplete_by_start_descending() {
        let mut store = empty_store();
        let a = store.add("a", 100, 500).unwrap();
        let b = store.add("b", 200, 500).unwrap();
        let order: Vec<u64> = store.main_list().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![b, a]);

        // Completing b pushes it below the still-running a.
        store.toggle(b).unwrap();
        let order: Vec<u64> = store.main_list().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn main_list_orders_completed_by_completion_descending() {
        let mut store = empty_store();
        let a = store.add("a", 0, 10).unwrap();
        let b = store.add("b", 0, 10).unwrap();
        store.toggle(a).unwrap();
        store.toggle(b).unwrap();
        // Force distinct, known completion times.
        let mut tasks = store.tasks.clone();
        tasks.iter_mut().find(|t| t.id == a).unwrap().completion_time = Some(1000);
        tasks.iter_mut().find(|t| t.id == b).unwrap().completion_time = Some(2000);
        store.tasks = tasks;
        let order: Vec<u64> = store.main_list().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn best_times_excludes_incomplete_and_sorts_ascending() {
        let mut store = empty_store();
        store.tasks = vec![
            Task {
                id: 1,
                title: "slow".into(),
                start_time: 0,
                due_time: 10,
                completion_time: Some(5000),
            },
            Task {
                id: 2,
                title: "running".into(),
                start_time: 0,
                due_time: 10,
                completion_time: None,
            },
            Task {
                id: 3,
                title: "fast".into(),
                start_time: 0,
                due_time: 10,
                completion_time: Some(1000),
            },
        ];
        let best: Vec<u64> = store.best_times().iter().map(|t| t.id).collect();
        assert_eq!(best, vec![3, 1]);
    }

    #[test]
    fn every_mutation_persists_the_full_collection() {
        let storage = Rc::new(MemStorage::default());
        let mut store = TaskStore::open(Box::new(Rc::clone(&storage)));
        let id = store.add("task", 0, 10).unwrap();
        store.toggle(id).unwrap();
        store.remove(id).unwrap();
        let saved = storage.saved.borrow();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[0].len(), 1);
        assert!(saved[1][0].is_completed());
        assert!(saved[2].is_empty());
    }

    #[test]
    fn json_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let storage = JsonFileStorage::new(&path);
        assert!(storage.load().unwrap().is_empty());

        let mut store = TaskStore::open(Box::new(JsonFileStorage::new(&path)));
        let id = store.add("persisted", 100, 200).unwrap();
        store.toggle(id).unwrap();

        let reopened = TaskStore::open(Box::new(JsonFileStorage::new(&path)));
        assert_eq!(reopened.len(), 1);
        let task = reopened.get(id).unwrap();
        assert_eq!(task.title, "persisted");
        assert!(task.is_completed());
    }

    #[test]
    fn corrupt_file_loads_as_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "not json").unwrap();
        let store = TaskStore::open(Box::new(JsonFileStorage::new(&path)));
        assert!(store.is_empty());
    }
}
