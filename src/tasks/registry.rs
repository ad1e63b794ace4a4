//! Name-keyed task registry.
//!
//! Built once at process start from the static catalog and read-only
//! thereafter. Lookups never panic; enumeration order is stable across calls.

use std::collections::BTreeMap;

use tracing::warn;

use super::catalog;
use super::TaskDescriptor;

/// Registry mapping task names to descriptors.
pub struct TaskRegistry {
    tasks: BTreeMap<String, TaskDescriptor>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
        }
    }

    /// Creates a registry populated with the shipped task catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for task in catalog::builtin_tasks() {
            registry.register(task);
        }
        registry
    }

    /// Registers a descriptor. A descriptor missing required fields, or one
    /// whose name is already taken, is skipped with a warning rather than
    /// failing the registry.
    pub fn register(&mut self, task: TaskDescriptor) {
        if !task.is_well_formed() {
            warn!(name = %task.name, "Skipping malformed task descriptor");
            return;
        }
        if self.tasks.contains_key(&task.name) {
            warn!(name = %task.name, "Skipping duplicate task descriptor");
            return;
        }
        self.tasks.insert(task.name.clone(), task);
    }

    /// Looks up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&TaskDescriptor> {
        self.tasks.get(name)
    }

    /// Returns true if a task with the given name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Returns a snapshot of all registered task names, stable across calls.
    pub fn names(&self) -> Vec<String> {
        self.tasks.keys().cloned().collect()
    }

    /// Iterates all registered descriptors.
    pub fn iter(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.values()
    }

    /// Returns the number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CameraView;
    use crate::tasks::{InteractionMode, OutputSpec};

    #[test]
    fn test_builtin_registry_laws() {
        let registry = TaskRegistry::builtin();
        assert!(!registry.is_empty());

        for name in registry.names() {
            assert!(registry.has(&name));
            let task = registry.get(&name).expect("registered task resolves");
            assert_eq!(task.name, name);
        }
    }

    #[test]
    fn test_missing_task_signals_absence_without_panic() {
        let registry = TaskRegistry::builtin();
        assert!(!registry.has("no-such-task"));
        assert!(registry.get("no-such-task").is_none());
    }

    #[test]
    fn test_names_snapshot_is_stable() {
        let registry = TaskRegistry::builtin();
        assert_eq!(registry.names(), registry.names());
    }

    #[test]
    fn test_malformed_descriptor_is_skipped() {
        let mut registry = TaskRegistry::new();
        registry.register(TaskDescriptor::new(
            "broken",
            "has no prompt",
            "",
            InteractionMode::SingleExchange,
            OutputSpec::new("broken.scad", vec![CameraView::named("default")]),
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_descriptor_is_skipped() {
        let mut registry = TaskRegistry::new();
        let make = |description: &str| {
            TaskDescriptor::new(
                "dup",
                description,
                "Model something",
                InteractionMode::SingleExchange,
                OutputSpec::new("dup.scad", vec![CameraView::named("default")]),
            )
        };
        registry.register(make("first"));
        registry.register(make("second"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("dup").unwrap().description, "first");
    }
}
