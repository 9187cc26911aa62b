use crate::domain::{Journal, Task};
use std::collections::BTreeMap;
use time::macros::format_description;
use time::{Date, Duration};

/// Formats a date the way summaries print it: `2025-06-01`.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Short form used by entry listings: `25-06-01`.
pub fn format_date_short(date: Date) -> String {
    date.format(format_description!("[year repr:last_two]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Inclusive `[cutoff, today]` window covering the last `days` days, or None
/// when `days` is zero or negative.
pub fn recent_window(days: i64, today: Date) -> Option<(Date, Date)> {
    if days <= 0 {
        return None;
    }
    // Clamped so Duration::days cannot overflow; 1M days is already far
    // outside the representable Date range.
    let span = (days - 1).min(1_000_000);
    let cutoff = today.checked_sub(Duration::days(span)).unwrap_or(Date::MIN);
    Some((cutoff, today))
}

/// Everything entered on exactly `date`, projects and tasks name-ascending,
/// entries indented two levels under their task. Projects and tasks with no
/// entry on that date are omitted.
pub fn day_summary(date: Date, journal: &Journal) -> String {
    let mut out = String::new();

    for (project_name, project) in &journal.projects {
        let mut project_block = String::new();
        for (task_name, task) in &project.tasks {
            let mut task_block = String::new();
            for entry in &task.entries {
                if entry.date == date {
                    task_block.push_str("    ");
                    task_block.push_str(&entry.content);
                    task_block.push('\n');
                }
            }
            if !task_block.is_empty() {
                project_block.push_str("  +");
                project_block.push_str(task_name);
                project_block.push('\n');
                project_block.push_str(&task_block);
            }
        }
        if !project_block.is_empty() {
            out.push('@');
            out.push_str(project_name);
            out.push('\n');
            out.push_str(&project_block);
        }
    }

    if out.is_empty() {
        return "(no entries for this day)".to_string();
    }
    out
}

/// Rolling window over the last `days` days ending at `today`. Within each
/// task, entries group by date, newest date first; within a date they keep
/// append order. Each project block ends with a blank separator line.
/// `today` is a parameter rather than a clock read so the function stays a
/// pure view of the journal; callers pass the current UTC date.
pub fn recent_summary(days: i64, today: Date, journal: &Journal) -> String {
    let Some((cutoff, today)) = recent_window(days, today) else {
        return String::new();
    };

    let mut out = String::new();

    for (project_name, project) in &journal.projects {
        let mut project_block = String::new();
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

            project_block.push_str("  +");
            project_block.push_str(task_name);
            project_block.push('\n');
            for (date, contents) in by_date.iter().rev() {
                project_block.push_str("    ");
                project_block.push_str(&format_date(*date));
                project_block.push('\n');
                for content in contents {
                    project_block.push_str("      ");
                    project_block.push_str(content);
                    project_block.push('\n');
                }
            }
        }

        if !project_block.is_empty() {
            out.push('@');
            out.push_str(project_name);
            out.push('\n');
            out.push_str(&project_block);
            out.push('\n');
        }
    }

    out
}

/// A task's entries as the listing views show them: newest date first, each
/// date a `YY-MM-DD` heading with its entries on the lines below.
pub fn task_entry_listing(task: &Task) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current: Option<Date> = None;

    for entry in task.entries_by_date_desc() {
        if current != Some(entry.date) {
            current = Some(entry.date);
            lines.push(format_date_short(entry.date));
        }
        lines.push(entry.content.clone());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingest_text;
    use time::macros::date;

    fn journal_from(files: &[(&str, &str)]) -> Journal {
        let mut journal = Journal::default();
        for (name, content) in files {
            ingest_text(content, name, &mut journal);
        }
        journal
    }

    #[test]
    fn day_summary_matches_expected_shape() {
        let journal = journal_from(&[("25-06-01.md", "@proj +ui\n* did the thing\n")]);
        assert_eq!(
            day_summary(date!(2025 - 06 - 01), &journal),
            "@proj\n  +ui\n    * did the thing\n"
        );
    }

    #[test]
    fn day_summary_without_matches_returns_placeholder_text() {
        let journal = journal_from(&[("25-06-01.md", "@proj +ui\n* did the thing\n")]);
        let summary = day_summary(date!(2025 - 06 - 02), &journal);
        assert_eq!(summary, "(no entries for this day)");
        assert!(!summary.is_empty());
    }

    #[test]
    fn day_summary_omits_projects_without_matching_entries() {
        let journal = journal_from(&[
            ("25-06-01.md", "@active +work\n* present\n"),
            ("25-05-20.md", "@stale +old\n* past\n"),
        ]);
        let summary = day_summary(date!(2025 - 06 - 01), &journal);
        assert!(summary.contains("@active"));
        assert!(!summary.contains("@stale"));
    }

    #[test]
    fn summaries_order_projects_and_tasks_by_name() {
        // Ingestion order is deliberately backwards.
        let journal = journal_from(&[(
            "25-06-01.md",
            "@zeta +z\n* zz\n@alpha +b\n* ab\n@alpha +a\n* aa\n",
        )]);
        assert_eq!(
            day_summary(date!(2025 - 06 - 01), &journal),
            "@alpha\n  +a\n    * aa\n  +b\n    * ab\n@zeta\n  +z\n    * zz\n"
        );
    }

    #[test]
    fn recent_summary_zero_or_negative_days_is_empty() {
        let journal = journal_from(&[("25-06-01.md", "@proj +ui\n* did the thing\n")]);
        assert_eq!(recent_summary(0, date!(2025 - 06 - 01), &journal), "");
        assert_eq!(recent_summary(-3, date!(2025 - 06 - 01), &journal), "");
    }

    #[test]
    fn recent_summary_one_day_covers_today_only() {
        let journal = journal_from(&[
            ("25-06-01.md", "@proj +ui\n* today\n"),
            ("25-05-31.md", "@proj +ui\n* yesterday\n"),
        ]);
        let summary = recent_summary(1, date!(2025 - 06 - 01), &journal);
        assert!(summary.contains("* today"));
        assert!(!summary.contains("* yesterday"));
    }

    #[test]
    fn recent_summary_lists_dates_newest_first() {
        let journal = journal_from(&[
            ("25-06-01.md", "@proj +ui\n* older\n"),
            ("25-06-03.md", "@proj +ui\n* newer\n"),
        ]);
        let summary = recent_summary(7, date!(2025 - 06 - 04), &journal);
        assert_eq!(
            summary,
            "@proj\n  +ui\n    2025-06-03\n      * newer\n    2025-06-01\n      * older\n\n"
        );
    }

    #[test]
    fn recent_summary_window_is_inclusive_at_the_cutoff() {
        let journal = journal_from(&[("25-06-01.md", "@proj +ui\n* boundary\n")]);
        // days=3 ending 06-03 covers 06-01..=06-03.
        let summary = recent_summary(3, date!(2025 - 06 - 03), &journal);
        assert!(summary.contains("* boundary"));
        // days=2 ending 06-03 starts at 06-02 and misses it.
        let summary = recent_summary(2, date!(2025 - 06 - 03), &journal);
        assert_eq!(summary, "");
    }

    #[test]
    fn recent_summary_keeps_append_order_within_a_date() {
        let journal = journal_from(&[("25-06-01.md", "@proj +ui\n* first\n* second\n")]);
        let summary = recent_summary(7, date!(2025 - 06 - 01), &journal);
        let first = summary.find("* first").expect("first present");
        let second = summary.find("* second").expect("second present");
        assert!(first < second);
    }

    #[test]
    fn task_entry_listing_groups_under_short_date_headings() {
        let journal = journal_from(&[
            ("25-06-01.md", "@proj +ui\n* a\n* b\n"),
            ("25-06-02.md", "@proj +ui\n* c\n"),
        ]);
        let task = journal.task("proj", "ui").expect("task exists");
        assert_eq!(task_entry_listing(task), "25-06-02\n* c\n25-06-01\n* a\n* b");
    }

    #[test]
    fn task_entry_listing_of_empty_task_is_empty() {
        let journal = journal_from(&[("scratch.md", "@proj +ui\n")]);
        let task = journal.task("proj", "ui").expect("task exists");
        assert_eq!(task_entry_listing(task), "");
    }

    #[test]
    fn recent_window_saturates_on_huge_spans() {
        let (cutoff, today) = recent_window(i64::MAX, date!(2025 - 06 - 01)).expect("window");
        assert_eq!(today, date!(2025 - 06 - 01));
        assert!(cutoff <= date!(2000 - 01 - 01));
    }
}
