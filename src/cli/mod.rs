use crate::domain::{Journal, day_summary, format_date, recent_summary, recent_window};
use crate::infra::build_journal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const DEFAULT_RECENT_DAYS: i64 = 28;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui {
        dir: Option<PathBuf>,
    },
    Command {
        dir: Option<PathBuf>,
        command: CliCommand,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    Projects,
    Tasks {
        project: Option<String>,
    },
    Day {
        date: Option<Date>,
        json: bool,
    },
    Recent {
        days: i64,
        json: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },

    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut iter = args.iter().skip(1).peekable();
    let mut dir: Option<PathBuf> = None;
    while let Some(arg) = iter.peek() {
        match arg.as_str() {
            "--dir" | "-d" => {
                let _ = iter.next();
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--dir".to_string()))?;
                dir = Some(PathBuf::from(value));
            }
            "--" => {
                let _ = iter.next();
                break;
            }
            _ => break,
        }
    }

    let Some(subcommand) = iter.next() else {
        return Ok(CliInvocation::Tui { dir });
    };

    match subcommand.as_str() {
        "projects" => {
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--dir" | "-d" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--dir".to_string()))?;
                        dir = Some(PathBuf::from(value));
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                    }
                }
            }

            Ok(CliInvocation::Command {
                dir,
                command: CliCommand::Projects,
            })
        }
        "tasks" => {
            let mut project: Option<String> = None;

            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--dir" | "-d" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--dir".to_string()))?;
                        dir = Some(PathBuf::from(value));
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        if project.is_some() {
                            return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                        }
                        project = Some(arg.to_string());
                    }
                }
            }

            Ok(CliInvocation::Command {
                dir,
                command: CliCommand::Tasks { project },
            })
        }
        "day" => {
            let mut date: Option<Date> = None;
            let mut json = false;

            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--dir" | "-d" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--dir".to_string()))?;
                        dir = Some(PathBuf::from(value));
                    }
                    "--json" => {
                        json = true;
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        if date.is_some() {
                            return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                        }
                        date = Some(parse_date_arg(arg)?);
                    }
                }
            }

            Ok(CliInvocation::Command {
                dir,
                command: CliCommand::Day { date, json },
            })
        }
        "recent" => {
            let mut days = DEFAULT_RECENT_DAYS;
            let mut json = false;

            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--dir" | "-d" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--dir".to_string()))?;
                        dir = Some(PathBuf::from(value));
                    }
                    "--days" | "-n" => {
                        let value = iter
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--days".to_string()))?;
                        days = parse_days_flag("--days", value)?;
                    }
                    "--json" => {
                        json = true;
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                    }
                }
            }

            Ok(CliInvocation::Command {
                dir,
                command: CliCommand::Recent { days, json },
            })
        }
        other => Err(CliParseError::UnknownSubcommand(other.to_string())),
    }
}

fn parse_date_arg(value: &str) -> Result<Date, CliParseError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|_| CliParseError::InvalidDate(value.to_string()))
}

fn parse_days_flag(flag: &str, value: &str) -> Result<i64, CliParseError> {
    value
        .parse::<i64>()
        .map_err(|_| CliParseError::InvalidFlagValue {
            flag: flag.to_string(),
            value: value.to_string(),
        })
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Scan(#[from] crate::infra::ScanError),

    #[error("project not found: {0}\nHint: run `trail projects` to list project names.")]
    ProjectNotFound(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    WriteOutput(#[from] io::Error),
}

pub fn run(command: CliCommand, dir: &Path) -> Result<(), CliRunError> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let journal = build_journal(dir)?;

    match command {
        CliCommand::Projects => {
            for (name, project) in &journal.projects {
                let line = format!(
                    "{}\t{}\t{}",
                    name,
                    project.tasks.len(),
                    project.entry_count()
                );
                if !write_line(&mut out, &line)? {
                    return Ok(());
                }
            }
            out.flush()?;
            Ok(())
        }
        CliCommand::Tasks { project } => {
            if let Some(project) = &project {
                if !journal.projects.contains_key(project) {
                    return Err(CliRunError::ProjectNotFound(project.clone()));
                }
            }

            for (project_name, task_name) in journal.task_labels() {
                if project.as_ref().is_some_and(|name| *name != project_name) {
                    continue;
                }
                let count = journal
                    .task(&project_name, &task_name)
                    .map_or(0, |task| task.entries.len());
                let line = format!("{project_name}/{task_name}\t{count}");
                if !write_line(&mut out, &line)? {
                    return Ok(());
                }
            }
            out.flush()?;
            Ok(())
        }
        CliCommand::Day { date, json } => {
            let date = date.unwrap_or_else(today_utc);
            if json {
                let report = build_day_report(date, &journal);
                let rendered = serde_json::to_string_pretty(&report)?;
                if !write_line(&mut out, &rendered)? {
                    return Ok(());
                }
            } else if !write_block(&mut out, &day_summary(date, &journal))? {
                return Ok(());
            }
            out.flush()?;
            Ok(())
        }
        CliCommand::Recent { days, json } => {
            if json {
                let report = build_recent_report(days, today_utc(), &journal);
                let rendered = serde_json::to_string_pretty(&report)?;
                if !write_line(&mut out, &rendered)? {
                    return Ok(());
                }
            } else if !write_block(&mut out, &recent_summary(days, today_utc(), &journal))? {
                return Ok(());
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

#[derive(Debug, Serialize)]
struct DayReport<'a> {
    date: String,
    projects: Vec<DayProjectReport<'a>>,
}

#[derive(Debug, Serialize)]
struct DayProjectReport<'a> {
    project: &'a str,
    tasks: Vec<DayTaskReport<'a>>,
}

#[derive(Debug, Serialize)]
struct DayTaskReport<'a> {
    task: &'a str,
    entries: Vec<&'a str>,
}

fn build_day_report(date: Date, journal: &Journal) -> DayReport<'_> {
    let mut projects = Vec::new();
    for (project_name, project) in &journal.projects {
        let mut tasks = Vec::new();
        for (task_name, task) in &project.tasks {
            let entries: Vec<&str> = task
                .entries
                .iter()
                .filter(|entry| entry.date == date)
                .map(|entry| entry.content.as_str())
                .collect();
            if !entries.is_empty() {
                tasks.push(DayTaskReport {
                    task: task_name,
                    entries,
                });
            }
        }
        if !tasks.is_empty() {
            projects.push(DayProjectReport {
                project: project_name,
                tasks,
            });
        }
    }

    DayReport {
        date: format_date(date),
        projects,
    }
}

#[derive(Debug, Serialize)]
struct RecentReport<'a> {
    days: i64,
    from: Option<String>,
    to: Option<String>,
    projects: Vec<RecentProjectReport<'a>>,
}

#[derive(Debug, Serialize)]
struct RecentProjectReport<'a> {
    project: &'a str,
    tasks: Vec<RecentTaskReport<'a>>,
}

#[derive(Debug, Serialize)]
struct RecentTaskReport<'a> {
    task: &'a str,
    dates: Vec<RecentDateReport<'a>>,
}

#[derive(Debug, Serialize)]
struct RecentDateReport<'a> {
    date: String,
    entries: Vec<&'a str>,
}

fn build_recent_report(days: i64, today: Date, journal: &Journal) -> RecentReport<'_> {
    let Some((cutoff, today)) = recent_window(days, today) else {
        return RecentReport {
            days,
            from: None,
            to: None,
            projects: Vec::new(),
        };
    };

    let mut projects = Vec::new();
    for (project_name, project) in &journal.projects {
        let mut tasks = Vec::new();
        for (task_name, task) in &project.tasks {
            let mut by_date: BTreeMap<Date, Vec<&str>> = BTreeMap::new();
            for entry in &task.entries {
                if entry.date >= cutoff && entry.date <= today {
                    by_date
                        .entry(entry.date)
                        .or_default()
                        .push(entry.content.as_str());
                }
            }
            if by_date.is_empty() {
                continue;
            }
            let dates = by_date
                .into_iter()
                .rev()
                .map(|(date, entries)| RecentDateReport {
                    date: format_date(date),
                    entries,
                })
                .collect();
            tasks.push(RecentTaskReport {
                task: task_name,
                dates,
            });
        }
        if !tasks.is_empty() {
            projects.push(RecentProjectReport {
                project: project_name,
                tasks,
            });
        }
    }

    RecentReport {
        days,
        from: Some(format_date(cutoff)),
        to: Some(format_date(today)),
        projects,
    }
}

fn write_line(out: &mut impl Write, line: &str) -> io::Result<bool> {
    match writeln!(out, "{line}") {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(error) => Err(error),
    }
}

fn write_block(out: &mut impl Write, text: &str) -> io::Result<bool> {
    if text.is_empty() {
        return Ok(true);
    }
    let result = if text.ends_with('\n') {
        write!(out, "{text}")
    } else {
        writeln!(out, "{text}")
    };
    match result {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingest_text;
    use time::macros::date;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn parse_defaults_to_tui_when_no_args() {
        let parsed = parse_invocation(&args(&["trail"])).expect("parse");
        assert_eq!(parsed, CliInvocation::Tui { dir: None });
    }

    #[test]
    fn parse_help_flag_wins() {
        let parsed = parse_invocation(&args(&["trail", "recent", "--help"])).expect("parse");
        assert_eq!(parsed, CliInvocation::PrintHelp);
    }

    #[test]
    fn parse_dir_flag_before_subcommand_applies_to_tui() {
        let parsed = parse_invocation(&args(&["trail", "--dir", "/tmp/journal"])).expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Tui {
                dir: Some(PathBuf::from("/tmp/journal"))
            }
        );
    }

    #[test]
    fn parse_dir_flag_before_subcommand_applies_to_command() {
        let parsed =
            parse_invocation(&args(&["trail", "--dir", "/tmp/journal", "projects"])).expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Command {
                dir: Some(PathBuf::from("/tmp/journal")),
                command: CliCommand::Projects,
            }
        );
    }

    #[test]
    fn parse_tasks_command_with_project_filter() {
        let parsed = parse_invocation(&args(&["trail", "tasks", "proj"])).expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Command {
                dir: None,
                command: CliCommand::Tasks {
                    project: Some("proj".to_string())
                },
            }
        );
    }

    #[test]
    fn parse_day_command_with_date() {
        let parsed = parse_invocation(&args(&["trail", "day", "2025-06-01"])).expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Command {
                dir: None,
                command: CliCommand::Day {
                    date: Some(date!(2025 - 06 - 01)),
                    json: false
                },
            }
        );
    }

    #[test]
    fn parse_day_command_defaults_to_today() {
        let parsed = parse_invocation(&args(&["trail", "day", "--json"])).expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Command {
                dir: None,
                command: CliCommand::Day {
                    date: None,
                    json: true
                },
            }
        );
    }

    #[test]
    fn parse_day_rejects_malformed_dates() {
        let error = parse_invocation(&args(&["trail", "day", "junk"])).expect_err("must fail");
        assert!(matches!(error, CliParseError::InvalidDate(_)));
    }

    #[test]
    fn parse_recent_command_supports_days_flag() {
        let parsed =
            parse_invocation(&args(&["trail", "recent", "--days", "7", "--json"])).expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Command {
                dir: None,
                command: CliCommand::Recent {
                    days: 7,
                    json: true
                },
            }
        );
    }

    #[test]
    fn parse_recent_defaults_to_28_days() {
        let parsed = parse_invocation(&args(&["trail", "recent"])).expect("parse");
        assert_eq!(
            parsed,
            CliInvocation::Command {
                dir: None,
                command: CliCommand::Recent {
                    days: DEFAULT_RECENT_DAYS,
                    json: false
                },
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_subcommand_and_flags() {
        assert!(matches!(
            parse_invocation(&args(&["trail", "frobnicate"])),
            Err(CliParseError::UnknownSubcommand(_))
        ));
        assert!(matches!(
            parse_invocation(&args(&["trail", "projects", "--wat"])),
            Err(CliParseError::UnknownFlag(_))
        ));
        assert!(matches!(
            parse_invocation(&args(&["trail", "recent", "--days"])),
            Err(CliParseError::MissingFlagValue(_))
        ));
    }

    fn sample_journal() -> Journal {
        let mut journal = Journal::default();
        ingest_text(
            "@proj +ui\n* did the thing\n@proj +api\n* wired it up\n",
            "25-06-01.md",
            &mut journal,
        );
        ingest_text("@proj +ui\n* polish\n", "25-06-03.md", &mut journal);
        journal
    }

    #[test]
    fn day_report_contains_only_matching_tasks() {
        let journal = sample_journal();
        let report = build_day_report(date!(2025 - 06 - 03), &journal);

        assert_eq!(report.date, "2025-06-03");
        assert_eq!(report.projects.len(), 1);
        assert_eq!(report.projects[0].tasks.len(), 1);
        assert_eq!(report.projects[0].tasks[0].task, "ui");
        assert_eq!(report.projects[0].tasks[0].entries, vec!["* polish"]);
    }

    #[test]
    fn day_report_for_empty_day_has_no_projects() {
        let journal = sample_journal();
        let report = build_day_report(date!(2025 - 07 - 01), &journal);
        assert!(report.projects.is_empty());
    }

    #[test]
    fn recent_report_groups_dates_newest_first() {
        let journal = sample_journal();
        let report = build_recent_report(7, date!(2025 - 06 - 04), &journal);

        assert_eq!(report.from.as_deref(), Some("2025-05-29"));
        assert_eq!(report.to.as_deref(), Some("2025-06-04"));
        let ui = &report.projects[0].tasks[1];
        assert_eq!(ui.task, "ui");
        assert_eq!(ui.dates[0].date, "2025-06-03");
        assert_eq!(ui.dates[1].date, "2025-06-01");
    }

    #[test]
    fn recent_report_with_nonpositive_days_is_empty() {
        let journal = sample_journal();
        let report = build_recent_report(0, date!(2025 - 06 - 04), &journal);
        assert!(report.projects.is_empty());
        assert_eq!(report.from, None);
    }
}
