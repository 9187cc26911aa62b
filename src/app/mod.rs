use crate::domain::{Journal, format_date};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use thiserror::Error;
use time::Date;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Scan(#[from] crate::infra::ScanError),
}

/// The four top-level screens, cycled with Tab / BackTab.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Screen {
    Projects,
    Tasks,
    Days,
    Recent,
}

impl Screen {
    pub const ALL: [Screen; 4] = [Screen::Projects, Screen::Tasks, Screen::Days, Screen::Recent];

    pub fn label(self) -> &'static str {
        match self {
            Self::Projects => "Projects",
            Self::Tasks => "Tasks",
            Self::Days => "Days",
            Self::Recent => "Recent",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Projects => Self::Tasks,
            Self::Tasks => Self::Days,
            Self::Days => Self::Recent,
            Self::Recent => Self::Projects,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Projects => Self::Recent,
            Self::Tasks => Self::Projects,
            Self::Days => Self::Tasks,
            Self::Recent => Self::Days,
        }
    }
}

/// Projects screen: project list, then the project's tasks, then one task's
/// entries. `open_project`/`open_task` record how deep the drill-in goes.
#[derive(Clone, Debug, Default)]
pub struct ProjectsScreen {
    pub filter: String,
    pub filter_focused: bool,
    pub selected: usize,
    pub open_project: Option<String>,
    pub task_selected: usize,
    pub open_task: Option<String>,
    pub entry_scroll: u16,
}

/// Tasks screen: one flat `project/task` list across the whole journal.
#[derive(Clone, Debug, Default)]
pub struct TasksScreen {
    pub filter: String,
    pub filter_focused: bool,
    pub selected: usize,
    pub open: Option<(String, String)>,
    pub entry_scroll: u16,
}

#[derive(Clone, Debug, Default)]
pub struct DaysScreen {
    pub filter: String,
    pub filter_focused: bool,
    pub selected: usize,
    pub open_date: Option<Date>,
    pub detail_scroll: u16,
}

#[derive(Clone, Debug)]
pub struct RecentScreen {
    pub days_input: String,
    pub input_focused: bool,
    pub scroll: u16,
}

impl Default for RecentScreen {
    fn default() -> Self {
        Self {
            days_input: "28".to_string(),
            input_focused: false,
            scroll: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub journal_dir: PathBuf,
    pub journal: Journal,
    pub screen: Screen,
    pub projects: ProjectsScreen,
    pub tasks: TasksScreen,
    pub days: DaysScreen,
    pub recent: RecentScreen,
    pub notice: Option<String>,
    pub rescan_requested: bool,
    pub should_quit: bool,
}

impl AppModel {
    pub fn new(journal_dir: PathBuf, journal: Journal) -> Self {
        Self {
            journal_dir,
            journal,
            screen: Screen::Projects,
            projects: ProjectsScreen::default(),
            tasks: TasksScreen::default(),
            days: DaysScreen::default(),
            recent: RecentScreen::default(),
            notice: None,
            rescan_requested: false,
            should_quit: false,
        }
    }

    /// Day count currently typed into the Recent screen; unparseable input
    /// reads as 0, which renders as an empty summary.
    pub fn recent_days(&self) -> i64 {
        self.recent.days_input.parse().unwrap_or(0)
    }
}

/// Projects whose name contains `filter`, name-ascending. An empty filter
/// matches everything.
pub fn filtered_project_names(journal: &Journal, filter: &str) -> Vec<String> {
    journal
        .projects
        .keys()
        .filter(|name| filter.is_empty() || name.contains(filter))
        .cloned()
        .collect()
}

/// `(project, task)` pairs whose `project/task` label contains `filter`.
pub fn filtered_task_labels(journal: &Journal, filter: &str) -> Vec<(String, String)> {
    journal
        .task_labels()
        .into_iter()
        .filter(|(project, task)| {
            filter.is_empty() || format!("{project}/{task}").contains(filter)
        })
        .collect()
}

/// Task names inside one project whose name contains `filter`.
pub fn filtered_task_names(journal: &Journal, project: &str, filter: &str) -> Vec<String> {
    let Some(project) = journal.projects.get(project) else {
        return Vec::new();
    };
    project
        .tasks
        .keys()
        .filter(|name| filter.is_empty() || name.contains(filter))
        .cloned()
        .collect()
}

/// Distinct entry dates, newest first, filtered on their `YYYY-MM-DD` form.
pub fn filtered_dates(journal: &Journal, filter: &str) -> Vec<Date> {
    journal
        .distinct_dates_desc()
        .into_iter()
        .filter(|date| filter.is_empty() || format_date(*date).contains(filter))
        .collect()
}

pub fn handle_key(model: &mut AppModel, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        model.should_quit = true;
        return;
    }

    if filter_focused(model) {
        handle_filter_key(model, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => model.should_quit = true,
        KeyCode::Tab => model.screen = model.screen.next(),
        KeyCode::BackTab => model.screen = model.screen.prev(),
        KeyCode::Char('/') => focus_filter(model),
        KeyCode::Char('r') => model.rescan_requested = true,
        KeyCode::Esc => step_back(model),
        KeyCode::Char('j') | KeyCode::Down => move_down(model),
        KeyCode::Char('k') | KeyCode::Up => move_up(model),
        KeyCode::Enter => select(model),
        _ => {}
    }
}

fn filter_focused(model: &AppModel) -> bool {
    match model.screen {
        Screen::Projects => model.projects.filter_focused,
        Screen::Tasks => model.tasks.filter_focused,
        Screen::Days => model.days.filter_focused,
        Screen::Recent => model.recent.input_focused,
    }
}

fn focus_filter(model: &mut AppModel) {
    match model.screen {
        Screen::Projects => model.projects.filter_focused = true,
        Screen::Tasks => model.tasks.filter_focused = true,
        Screen::Days => model.days.filter_focused = true,
        Screen::Recent => model.recent.input_focused = true,
    }
}

fn handle_filter_key(model: &mut AppModel, key: KeyEvent) {
    match model.screen {
        Screen::Projects => match key.code {
            KeyCode::Enter | KeyCode::Esc => model.projects.filter_focused = false,
            KeyCode::Backspace => {
                model.projects.filter.pop();
                model.projects.selected = 0;
            }
            KeyCode::Char(c) => {
                model.projects.filter.push(c);
                model.projects.selected = 0;
            }
            _ => {}
        },
        Screen::Tasks => match key.code {
            KeyCode::Enter | KeyCode::Esc => model.tasks.filter_focused = false,
            KeyCode::Backspace => {
                model.tasks.filter.pop();
                model.tasks.selected = 0;
            }
            KeyCode::Char(c) => {
                model.tasks.filter.push(c);
                model.tasks.selected = 0;
            }
            _ => {}
        },
        Screen::Days => match key.code {
            KeyCode::Enter | KeyCode::Esc => model.days.filter_focused = false,
            KeyCode::Backspace => {
                model.days.filter.pop();
                model.days.selected = 0;
            }
            KeyCode::Char(c) => {
                model.days.filter.push(c);
                model.days.selected = 0;
            }
            _ => {}
        },
        Screen::Recent => match key.code {
            KeyCode::Enter | KeyCode::Esc => model.recent.input_focused = false,
            KeyCode::Backspace => {
                model.recent.days_input.pop();
                model.recent.scroll = 0;
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                model.recent.days_input.push(c);
                model.recent.scroll = 0;
            }
            _ => {}
        },
    }
}

fn step_back(model: &mut AppModel) {
    match model.screen {
        Screen::Projects => {
            if model.projects.open_task.is_some() {
                model.projects.open_task = None;
                model.projects.entry_scroll = 0;
            } else if model.projects.open_project.is_some() {
                model.projects.open_project = None;
                model.projects.task_selected = 0;
            }
        }
        Screen::Tasks => {
            if model.tasks.open.is_some() {
                model.tasks.open = None;
                model.tasks.entry_scroll = 0;
            }
        }
        Screen::Days => {
            if model.days.open_date.is_some() {
                model.days.open_date = None;
                model.days.detail_scroll = 0;
            }
        }
        Screen::Recent => {}
    }
}

fn move_down(model: &mut AppModel) {
    match model.screen {
        Screen::Projects => {
            if model.projects.open_task.is_some() {
                model.projects.entry_scroll = model.projects.entry_scroll.saturating_add(1);
            } else if let Some(project) = &model.projects.open_project {
                let len = filtered_task_names(&model.journal, project, "").len();
                model.projects.task_selected = step_selection(model.projects.task_selected, 1, len);
            } else {
                let len = filtered_project_names(&model.journal, &model.projects.filter).len();
                model.projects.selected = step_selection(model.projects.selected, 1, len);
            }
        }
        Screen::Tasks => {
            if model.tasks.open.is_some() {
                model.tasks.entry_scroll = model.tasks.entry_scroll.saturating_add(1);
            } else {
                let len = filtered_task_labels(&model.journal, &model.tasks.filter).len();
                model.tasks.selected = step_selection(model.tasks.selected, 1, len);
            }
        }
        Screen::Days => {
            if model.days.open_date.is_some() {
                model.days.detail_scroll = model.days.detail_scroll.saturating_add(1);
            } else {
                let len = filtered_dates(&model.journal, &model.days.filter).len();
                model.days.selected = step_selection(model.days.selected, 1, len);
            }
        }
        Screen::Recent => model.recent.scroll = model.recent.scroll.saturating_add(1),
    }
}

fn move_up(model: &mut AppModel) {
    match model.screen {
        Screen::Projects => {
            if model.projects.open_task.is_some() {
                model.projects.entry_scroll = model.projects.entry_scroll.saturating_sub(1);
            } else if model.projects.open_project.is_some() {
                model.projects.task_selected = model.projects.task_selected.saturating_sub(1);
            } else {
                model.projects.selected = model.projects.selected.saturating_sub(1);
            }
        }
        Screen::Tasks => {
            if model.tasks.open.is_some() {
                model.tasks.entry_scroll = model.tasks.entry_scroll.saturating_sub(1);
            } else {
                model.tasks.selected = model.tasks.selected.saturating_sub(1);
            }
        }
        Screen::Days => {
            if model.days.open_date.is_some() {
                model.days.detail_scroll = model.days.detail_scroll.saturating_sub(1);
            } else {
                model.days.selected = model.days.selected.saturating_sub(1);
            }
        }
        Screen::Recent => model.recent.scroll = model.recent.scroll.saturating_sub(1),
    }
}

fn step_selection(current: usize, delta: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current + delta).min(len - 1)
}

fn select(model: &mut AppModel) {
    match model.screen {
        Screen::Projects => {
            if model.projects.open_task.is_some() {
                return;
            }
            if let Some(project) = model.projects.open_project.clone() {
                let names = filtered_task_names(&model.journal, &project, "");
                if let Some(name) = names.get(model.projects.task_selected) {
                    model.projects.open_task = Some(name.clone());
                    model.projects.entry_scroll = 0;
                }
            } else {
                let names = filtered_project_names(&model.journal, &model.projects.filter);
                if let Some(name) = names.get(model.projects.selected) {
                    model.projects.open_project = Some(name.clone());
                    model.projects.task_selected = 0;
                }
            }
        }
        Screen::Tasks => {
            if model.tasks.open.is_some() {
                return;
            }
            let labels = filtered_task_labels(&model.journal, &model.tasks.filter);
            if let Some(label) = labels.get(model.tasks.selected) {
                model.tasks.open = Some(label.clone());
                model.tasks.entry_scroll = 0;
            }
        }
        Screen::Days => {
            if model.days.open_date.is_some() {
                return;
            }
            let dates = filtered_dates(&model.journal, &model.days.filter);
            if let Some(date) = dates.get(model.days.selected) {
                model.days.open_date = Some(*date);
                model.days.detail_scroll = 0;
            }
        }
        Screen::Recent => {}
    }
}

/// Called after a rescan: the lists may have shrunk under the cursor, and
/// drilled-into projects/tasks may be gone entirely.
pub fn clamp_after_rescan(model: &mut AppModel) {
    let project_len = filtered_project_names(&model.journal, &model.projects.filter).len();
    model.projects.selected = model.projects.selected.min(project_len.saturating_sub(1));

    if let Some(project) = &model.projects.open_project {
        if !model.journal.projects.contains_key(project) {
            model.projects.open_project = None;
            model.projects.open_task = None;
            model.projects.task_selected = 0;
        } else if let Some(task) = &model.projects.open_task {
            let exists = model.journal.task(project, task).is_some();
            if !exists {
                model.projects.open_task = None;
            }
        }
    }
    if let Some(project) = &model.projects.open_project {
        let task_len = filtered_task_names(&model.journal, project, "").len();
        model.projects.task_selected = model.projects.task_selected.min(task_len.saturating_sub(1));
    }

    let label_len = filtered_task_labels(&model.journal, &model.tasks.filter).len();
    model.tasks.selected = model.tasks.selected.min(label_len.saturating_sub(1));
    if let Some((project, task)) = &model.tasks.open {
        if model.journal.task(project, task).is_none() {
            model.tasks.open = None;
        }
    }

    let date_len = filtered_dates(&model.journal, &model.days.filter).len();
    model.days.selected = model.days.selected.min(date_len.saturating_sub(1));
}
