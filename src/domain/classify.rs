use regex::Regex;
use std::sync::LazyLock;

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:\*|-|\s)").unwrap());
static PROJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)@([A-Za-z0-9_.-]+)").unwrap());
static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)\+([A-Za-z0-9_.-]+)").unwrap());

/// Classification of a single journal line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineClass<'a> {
    /// Starts with `*`, `-`, or whitespace; belongs to the active context.
    Entry,
    /// Carries both an `@project` and a `+task` marker.
    Header { project: &'a str, task: &'a str },
    /// Neither an entry nor a complete header. Clears the active context.
    Neither,
}

/// Two-stage classifier. The entry pattern is checked FIRST; marker matching
/// only runs on lines that fail it. A line opening with whitespace is an
/// entry even if `@x +y` appears later on it.
pub fn classify_line(line: &str) -> LineClass<'_> {
    if ENTRY_RE.is_match(line) {
        return LineClass::Entry;
    }

    let Some(project) = PROJECT_RE.captures(line) else {
        return LineClass::Neither;
    };
    let Some(task) = TASK_RE.captures(line) else {
        return LineClass::Neither;
    };

    LineClass::Header {
        project: project.get(1).map_or("", |m| m.as_str()),
        task: task.get(1).map_or("", |m| m.as_str()),
    }
}
