use crate::app::{
    AppModel, Screen, filtered_dates, filtered_project_names, filtered_task_labels,
    filtered_task_names,
};
use crate::domain::{day_summary, format_date, recent_summary, task_entry_listing};
use ratatui::prelude::*;
use ratatui::widgets::*;
use time::OffsetDateTime;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn render(frame: &mut Frame, model: &AppModel) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    let [tabs_area, input_area, content_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(full_area);

    render_tab_bar(frame, tabs_area, model);
    render_input_line(frame, input_area, model);
    match model.screen {
        Screen::Projects => render_projects(frame, content_area, model),
        Screen::Tasks => render_tasks(frame, content_area, model),
        Screen::Days => render_days(frame, content_area, model),
        Screen::Recent => render_recent(frame, content_area, model),
    }
    render_footer(frame, footer_area, model);
}

fn render_tab_bar(frame: &mut Frame, area: Rect, model: &AppModel) {
    let bg = Color::DarkGray;
    let mut spans: Vec<Span> = Vec::new();
    let mut used = 0usize;
    for screen in Screen::ALL {
        let label = format!(" {} ", screen.label());
        used += UnicodeWidthStr::width(label.as_str());
        let style = if screen == model.screen {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).bg(bg)
        };
        spans.push(Span::styled(label, style));
    }

    let dir = model.journal_dir.display().to_string();
    let remaining = (area.width as usize).saturating_sub(used);
    if remaining > 1 {
        let dir = truncate_to_width(&dir, remaining.saturating_sub(1));
        let pad = remaining.saturating_sub(UnicodeWidthStr::width(dir.as_str()));
        spans.push(Span::styled(
            " ".repeat(pad),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(dir, Style::default().fg(Color::Gray).bg(bg)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input_line(frame: &mut Frame, area: Rect, model: &AppModel) {
    let (label, value, focused) = match model.screen {
        Screen::Projects => (
            "Filter projects: ",
            model.projects.filter.clone(),
            model.projects.filter_focused,
        ),
        Screen::Tasks => (
            "Filter tasks: ",
            model.tasks.filter.clone(),
            model.tasks.filter_focused,
        ),
        Screen::Days => (
            "Filter dates: ",
            model.days.filter.clone(),
            model.days.filter_focused,
        ),
        Screen::Recent => (
            "Last N days: ",
            model.recent.days_input.clone(),
            model.recent.input_focused,
        ),
    };

    let value_style = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(value, value_style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_projects(frame: &mut Frame, area: Rect, model: &AppModel) {
    let screen = &model.projects;

    if let (Some(project), Some(task)) = (&screen.open_project, &screen.open_task) {
        let text = model
            .journal
            .task(project, task)
            .map(task_entry_listing)
            .unwrap_or_default();
        render_text_view(
            frame,
            area,
            &format!("@{project} +{task}"),
            &text,
            screen.entry_scroll,
        );
        return;
    }

    if let Some(project) = &screen.open_project {
        let names = filtered_task_names(&model.journal, project, "");
        let items: Vec<String> = names.iter().map(|name| format!("+{name}")).collect();
        render_list(
            frame,
            area,
            Some(&format!("@{project}")),
            &items,
            screen.task_selected,
        );
        return;
    }

    let names = filtered_project_names(&model.journal, &screen.filter);
    let items: Vec<String> = names
        .iter()
        .map(|name| {
            let count = model
                .journal
                .projects
                .get(name)
                .map_or(0, |project| project.tasks.len());
            format!("@{name}  ({count})")
        })
        .collect();
    render_list(frame, area, None, &items, screen.selected);
}

fn render_tasks(frame: &mut Frame, area: Rect, model: &AppModel) {
    let screen = &model.tasks;

    if let Some((project, task)) = &screen.open {
        let text = model
            .journal
            .task(project, task)
            .map(task_entry_listing)
            .unwrap_or_default();
        render_text_view(
            frame,
            area,
            &format!("{project}/{task}"),
            &text,
            screen.entry_scroll,
        );
        return;
    }

    let labels = filtered_task_labels(&model.journal, &screen.filter);
    let items: Vec<String> = labels
        .iter()
        .map(|(project, task)| {
            let count = model
                .journal
                .task(project, task)
                .map_or(0, |found| found.entries.len());
            format!("{project}/{task}  ({count})")
        })
        .collect();
    render_list(frame, area, None, &items, screen.selected);
}

fn render_days(frame: &mut Frame, area: Rect, model: &AppModel) {
    let screen = &model.days;

    if let Some(date) = screen.open_date {
        let text = day_summary(date, &model.journal);
        render_text_view(frame, area, &format_date(date), &text, screen.detail_scroll);
        return;
    }

    let dates = filtered_dates(&model.journal, &screen.filter);
    let items: Vec<String> = dates.iter().map(|date| format_date(*date)).collect();
    render_list(frame, area, None, &items, screen.selected);
}

fn render_recent(frame: &mut Frame, area: Rect, model: &AppModel) {
    let today = OffsetDateTime::now_utc().date();
    let text = recent_summary(model.recent_days(), today, &model.journal);
    let title = format!("Last {} day(s)", model.recent_days());
    render_text_view(frame, area, &title, &text, model.recent.scroll);
}

fn render_list(frame: &mut Frame, area: Rect, title: Option<&str>, items: &[String], selected: usize) {
    let list_items: Vec<ListItem> = items.iter().map(|item| ListItem::new(item.clone())).collect();
    let mut list = List::new(list_items).highlight_style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    if let Some(title) = title {
        list = list.block(
            Block::default()
                .borders(Borders::TOP)
                .title(title.to_string()),
        );
    }

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(selected.min(items.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_text_view(frame: &mut Frame, area: Rect, title: &str, text: &str, scroll: u16) {
    let paragraph = Paragraph::new(text.to_string())
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(title.to_string()),
        )
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, model: &AppModel) {
    let hints = match model.screen {
        Screen::Recent => "Tab screens · / edit days · j/k scroll · r rescan · q quit",
        _ => "Tab screens · / filter · j/k move · Enter open · Esc back · r rescan · q quit",
    };

    let mut spans = vec![Span::styled(hints, Style::default().fg(Color::DarkGray))];
    if let Some(notice) = &model.notice {
        let used = UnicodeWidthStr::width(hints);
        let remaining = (area.width as usize).saturating_sub(used);
        if remaining > 1 {
            let notice = truncate_to_width(notice, remaining.saturating_sub(1));
            let pad = remaining.saturating_sub(UnicodeWidthStr::width(notice.as_str()));
            spans.push(Span::raw(" ".repeat(pad)));
            spans.push(Span::styled(notice, Style::default().fg(Color::Yellow)));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
