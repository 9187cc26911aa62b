use std::collections::{BTreeMap, BTreeSet};
use time::Date;

/// One content line attributed to a (project, task, date) triple. The content
/// is the raw line, bullet prefix included.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub date: Date,
    pub content: String,
}

/// Entries accumulate in file-scan order; readers re-sort by date.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Task {
    pub entries: Vec<Entry>,
}

impl Task {
    /// Entries newest-first. The sort is stable, so entries sharing a date
    /// keep their append order.
    pub fn entries_by_date_desc(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Project {
    pub tasks: BTreeMap<String, Task>,
}

impl Project {
    pub fn entry_count(&self) -> usize {
        self.tasks.values().map(|task| task.entries.len()).sum()
    }
}

/// Root of the model: project name to project. Built once per scan, then
/// read-only. BTreeMap keys give every consumer name-ascending iteration
/// without re-sorting.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Journal {
    pub projects: BTreeMap<String, Project>,
}

impl Journal {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn task(&self, project: &str, task: &str) -> Option<&Task> {
        self.projects.get(project)?.tasks.get(task)
    }

    /// Flat `(project, task)` pairs across the journal, name-ascending on
    /// both levels.
    pub fn task_labels(&self) -> Vec<(String, String)> {
        let mut labels = Vec::new();
        for (project_name, project) in &self.projects {
            for task_name in project.tasks.keys() {
                labels.push((project_name.clone(), task_name.clone()));
            }
        }
        labels
    }

    /// Every date carried by at least one entry, newest first.
    pub fn distinct_dates_desc(&self) -> Vec<Date> {
        let mut dates: BTreeSet<Date> = BTreeSet::new();
        for project in self.projects.values() {
            for task in project.tasks.values() {
                for entry in &task.entries {
                    dates.insert(entry.date);
                }
            }
        }
        dates.into_iter().rev().collect()
    }
}
