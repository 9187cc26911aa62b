use crate::domain::{Entry, Journal, LineClass, classify_line};
use regex::Regex;
use std::sync::LazyLock;
use time::{Date, Month};

static FILE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d\d)-(\d\d)-(\d\d)").unwrap());

/// Derives the date for a file's entries from its base name: the first
/// `YY-MM-DD` substring, with two-digit years read as 2000+YY. Later
/// substrings are not tried if the first is not a valid calendar date.
pub fn resolve_file_date(file_name: &str) -> Option<Date> {
    let caps = FILE_DATE_RE.captures(file_name)?;
    let year = 2000 + caps[1].parse::<i32>().ok()?;
    let month = Month::try_from(caps[2].parse::<u8>().ok()?).ok()?;
    let day = caps[3].parse::<u8>().ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Scans `content` line by line and merges what it finds into `journal`.
/// Projects and tasks are created on first header reference; entries land
/// under the active (project, task) pair, all dated from the file name.
/// Repeated calls accumulate: the same (project, task) seen in several files
/// collects entries from each.
pub fn ingest_text(content: &str, file_name: &str, journal: &mut Journal) {
    let file_date = resolve_file_date(file_name);
    if file_date.is_none() {
        log::warn!("no YY-MM-DD date in file name {file_name:?}, entry lines will be skipped");
    }

    let mut context: Option<(String, String)> = None;

    for line in content.lines() {
        let class = classify_line(line);

        // Any non-entry line clears the context, valid header or not. A
        // malformed header must not leave the previous section's context
        // alive for the lines under it.
        if !matches!(class, LineClass::Entry) {
            context = None;
        }

        match class {
            LineClass::Entry => {
                let Some((project, task)) = &context else {
                    continue;
                };
                let Some(date) = file_date else {
                    continue;
                };
                if let Some(task) = journal
                    .projects
                    .get_mut(project)
                    .and_then(|p| p.tasks.get_mut(task))
                {
                    task.entries.push(Entry {
                        date,
                        content: line.to_string(),
                    });
                }
            }
            LineClass::Header { project, task } => {
                journal
                    .projects
                    .entry(project.to_string())
                    .or_default()
                    .tasks
                    .entry(task.to_string())
                    .or_default();
                context = Some((project.to_string(), task.to_string()));
            }
            LineClass::Neither => {}
        }
    }
}
