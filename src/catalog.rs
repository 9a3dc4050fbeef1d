//! Job capability catalog
//!
//! Job definitions live outside this core; vehicles only ever ask one
//! question of them, whether a task may be issued under a given job.

use std::collections::{HashMap, HashSet};

use terralink_shared::Task;

/// Answers whether a task is valid under a job
pub trait JobCatalog: Send + Sync {
    fn permits(&self, job: &str, task: &Task) -> bool;
}

/// Map-backed catalog: job name to the task kinds it accepts
#[derive(Debug)]
pub struct StaticJobCatalog {
    jobs: HashMap<String, HashSet<String>>,
}

impl StaticJobCatalog {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    /// Register a job and the task kinds it accepts
    pub fn insert<I, S>(&mut self, job: impl Into<String>, tasks: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.jobs
            .insert(job.into(), tasks.into_iter().map(Into::into).collect());
    }
}

impl Default for StaticJobCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl JobCatalog for StaticJobCatalog {
    fn permits(&self, job: &str, task: &Task) -> bool {
        self.jobs
            .get(job)
            .is_some_and(|kinds| kinds.contains(&task.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> StaticJobCatalog {
        let mut catalog = StaticJobCatalog::new();
        catalog.insert("survey", ["takeoff", "loiter", "land"]);
        catalog.insert("delivery", ["takeoff", "payloadDrop", "land"]);
        catalog
    }

    #[test]
    fn test_permits_registered_task() {
        let catalog = catalog();
        assert!(catalog.permits("survey", &Task::new("loiter", json!({}))));
        assert!(catalog.permits("delivery", &Task::new("payloadDrop", json!({}))));
    }

    #[test]
    fn test_rejects_task_from_another_job() {
        let catalog = catalog();
        assert!(!catalog.permits("survey", &Task::new("payloadDrop", json!({}))));
    }

    #[test]
    fn test_rejects_unknown_job() {
        let catalog = catalog();
        assert!(!catalog.permits("tour", &Task::new("takeoff", json!({}))));
    }
}
