use crate::app::{
    ActiveInput, App, AuthMode, Focus, Form, InputMode, SettingsEntry, ToastLevel, View,
};
use crate::dashboard::{greeting, DashboardSummary};
use crate::models::Task;
use crate::modal::CONFIRM;
use crate::pomodoro::format_remaining;
use crate::pricing::{Plan, PLANS, UPGRADE_URL};
use crate::reorder::Placement;
use crate::theme::Palette;
use ansi_parser::{AnsiParser, Output};
use chrono::{Local, Timelike};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const SIDEBAR_WIDTH: u16 = 20;
const MAX_TOASTS: usize = 3;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

/// Drops escape sequences from html2text output, keeping the text runs.
pub fn ansi_to_text(ansi_str: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for ansi_line in ansi_str.lines() {
        let mut spans = Vec::new();
        for item in ansi_line.ansi_parse() {
            match item {
                Output::TextBlock(text) => spans.push(Span::raw(text.to_string())),
                Output::Escape(_escape) => {}
            }
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn calculate_wrapped_lines(text: &str, max_width: u16) -> usize {
    let max_width = usize::from(max_width.max(1));
    text.lines()
        .map(|line| line.chars().count().div_ceil(max_width).max(1))
        .sum::<usize>()
        .max(1)
}

/// Wrapped line count clamped to what a terminal row index can hold.
fn wrapped_height(text: &str, max_width: u16) -> u16 {
    u16::try_from(calculate_wrapped_lines(text, max_width)).unwrap_or(u16::MAX)
}

/// Outer width and height of the edit form popup, borders included.
fn form_popup_size(title: &str, description: Option<&str>, size: Rect) -> (u16, u16) {
    let inner_width = (size.width.saturating_mul(60) / 100).saturating_sub(2).max(20);
    let title_lines = wrapped_height(title, inner_width);
    let description_lines = description
        .map(|text| wrapped_height(text, inner_width).saturating_add(1))
        .unwrap_or(0);
    let height = title_lines
        .saturating_add(description_lines)
        .saturating_add(2)
        .min(size.height.saturating_sub(2));
    (inner_width.saturating_add(2), height)
}

fn legend_line(palette: &Palette, entries: &[(&'static str, &'static str)]) -> Text<'static> {
    let mut spans = Vec::new();
    for (key, label) in entries {
        spans.push(Span::styled(format!(" {key} "), palette.key()));
        spans.push(Span::raw(format!(": {label} ")));
    }
    Text::from(Line::from(spans))
}

fn get_legend(app: &App, palette: &Palette) -> Text<'static> {
    let entries: &[(&str, &str)] = match app.input_mode() {
        InputMode::SignedOut => &[
            ("Tab", "Next field"),
            ("Enter", "Submit"),
            ("F2", "Switch mode"),
            ("Esc", "Quit"),
        ],
        InputMode::Editing => &[("Enter", "Submit"), ("Tab", "Switch field"), ("Esc", "Cancel")],
        InputMode::Modal => &[("Tab", "Switch button"), ("Enter", "Choose"), ("Esc", "Cancel")],
        InputMode::Grabbing => &[("j/k", "Move item"), ("m", "Drop")],
        InputMode::Normal if app.focus == Focus::Sidebar => &[
            ("j/k", "Navigate"),
            ("Enter", "Open"),
            ("Tab", "Content"),
            ("b", "Collapse"),
            ("q", "Quit"),
        ],
        InputMode::Normal => match app.view {
            View::Dashboard => &[("1-6", "Views"), ("r", "Refresh"), ("b", "Sidebar"), ("q", "Quit")],
            View::Tasks => &[
                ("a", "Add"),
                ("x", "Done"),
                ("e", "Edit"),
                ("A", "Archive"),
                ("d", "Delete"),
                ("s", "Sort"),
                ("v", "Archived"),
                ("Enter", "Details"),
            ],
            View::Lists if app.open_list.is_some() => &[
                ("a", "Add"),
                ("x", "Done"),
                ("e", "Edit"),
                ("d", "Delete"),
                ("m", "Grab"),
                ("J/K", "Move"),
                ("Esc", "Back"),
            ],
            View::Lists => &[
                ("a", "New list"),
                ("Enter", "Open"),
                ("r", "Rename"),
                ("d", "Delete"),
            ],
            View::Pomodoro => &[("Space", "Start/Pause"), ("r", "Reset"), ("n", "Skip")],
            View::Settings => &[("j/k", "Navigate"), ("Enter", "Change")],
            View::Pricing => &[("j/k", "Navigate"), ("Enter", "Choose plan")],
        },
    };
    legend_line(palette, entries)
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        // the optimistic frame is on screen before the write goes out
        app.flush_pending().await;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_input(key).await {
                        return Ok(());
                    }
                }
                CEvent::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        let now = Instant::now();
        app.tick(now.duration_since(last_tick));
        last_tick = now;
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let palette = app.prefs.theme.palette();
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(size);
    let body_chunk = chunks[0];
    let footer_chunk = chunks[1];

    app.item_area = None;
    if app.session.is_none() {
        draw_auth(f, app, body_chunk, &palette);
    } else {
        let content = if app.prefs.sidebar_collapsed {
            body_chunk
        } else {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)].as_ref())
                .split(body_chunk);
            draw_sidebar(f, app, columns[0], &palette);
            columns[1]
        };
        match app.view {
            View::Dashboard => draw_dashboard(f, app, content, &palette),
            View::Tasks => draw_tasks(f, app, content, &palette),
            View::Lists => draw_lists(f, app, content, &palette),
            View::Pomodoro => draw_pomodoro(f, app, content, &palette),
            View::Settings => draw_settings(f, app, content, &palette),
            View::Pricing => draw_pricing(f, app, content, &palette),
        }
    }

    if let Some(form) = &app.form {
        draw_form(f, form, size, &palette);
    }
    draw_modal(f, app, size, &palette);
    draw_toasts(f, app, body_chunk, &palette);

    let legend = Paragraph::new(get_legend(app, &palette))
        .style(palette.text())
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(legend, footer_chunk);
}

fn panel(title: impl Into<String>, palette: &Palette, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(palette.accent)
    } else {
        palette.border()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(title.into(), palette.heading()))
}

fn draw_sidebar(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let items: Vec<ListItem> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let style = if *view == app.view {
                palette.heading()
            } else {
                palette.text()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", i + 1), palette.muted()),
                Span::styled(view.title(), style),
            ]))
        })
        .collect();

    let title = app
        .user
        .as_ref()
        .map(|u| format!("{} {}", u.avatar_name(), u.name))
        .unwrap_or_else(|| "Noted".to_string());
    let list = List::new(items)
        .block(panel(title, palette, app.focus == Focus::Sidebar))
        .highlight_style(palette.highlight())
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.sidebar);
}

fn schedule_label(task: &Task) -> String {
    let mut parts = Vec::new();
    if let Some(date) = task.date {
        parts.push(date.format("%a %d %b").to_string());
    }
    if let Some(time) = task.time {
        parts.push(time.format("%H:%M").to_string());
    }
    if let Some(minutes) = task.duration_minutes {
        if minutes >= 60 && minutes % 60 == 0 {
            parts.push(format!("{}h", minutes / 60));
        } else {
            parts.push(format!("{minutes}m"));
        }
    }
    parts.join(" ")
}

fn task_line(task: &Task, palette: &Palette) -> Line<'static> {
    let check = if task.completed { "[x] " } else { "[ ] " };
    let title_style = if task.completed {
        palette.muted().add_modifier(Modifier::CROSSED_OUT)
    } else {
        palette.text()
    };
    let mut spans = vec![
        Span::styled(check, Style::default().fg(palette.accent)),
        Span::styled(task.title.clone(), title_style),
    ];
    let schedule = schedule_label(task);
    if !schedule.is_empty() {
        spans.push(Span::styled(format!("  {schedule}"), palette.muted()));
    }
    Line::from(spans)
}

fn draw_dashboard(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let now = Local::now();
    let summary = DashboardSummary::compute(&app.tasks, &app.lists, now.date_naive());
    let name = app.user.as_ref().map(|u| u.name.clone()).unwrap_or_default();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let mut header = vec![Line::from(Span::styled(
        format!("{}, {}!", greeting(now.hour()), name),
        palette.heading(),
    ))];
    header.push(Line::from(Span::styled(
        format!(
            "{} active, {} done, {} lists",
            summary.active, summary.completed, summary.list_count
        ),
        palette.text(),
    )));
    if app.demo {
        header.push(Line::from(Span::styled(
            "Demo mode: data lives in memory only",
            Style::default().fg(palette.warning),
        )));
    }
    f.render_widget(Paragraph::new(header).block(panel("Dashboard", palette, true)), rows[0]);

    let gauge = Gauge::default()
        .block(panel("Completed", palette, false))
        .gauge_style(Style::default().fg(palette.accent))
        .percent(summary.completion_percent.min(100));
    f.render_widget(gauge, rows[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ]
            .as_ref(),
        )
        .split(rows[2]);
    let buckets = [
        ("Today", &summary.due_today),
        ("Overdue", &summary.overdue),
        ("Upcoming", &summary.upcoming),
    ];
    for ((title, tasks), column) in buckets.into_iter().zip(columns.iter()) {
        let items: Vec<ListItem> = if tasks.is_empty() {
            vec![ListItem::new(Span::styled("Nothing here", palette.muted()))]
        } else {
            tasks
                .iter()
                .map(|t| ListItem::new(task_line(t, palette)))
                .collect()
        };
        let title = format!("{title} ({})", tasks.len());
        f.render_widget(List::new(items).block(panel(title, palette, false)), *column);
    }
}

fn draw_tasks(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(area);

    let title = format!(
        "{} (by {})",
        if app.show_archived { "Archived" } else { "Tasks" },
        app.prefs.sort_order.as_str()
    );
    let items: Vec<ListItem> = app
        .visible_tasks()
        .into_iter()
        .map(|task| ListItem::new(task_line(task, palette)))
        .collect();
    let focused = app.focus == Focus::Content;
    let tasks_widget = if items.is_empty() {
        List::new(vec![ListItem::new(Span::styled(
            "No tasks yet. Press a to add one.",
            palette.muted(),
        ))])
        .block(panel(title, palette, focused))
    } else {
        List::new(items)
            .block(panel(title, palette, focused))
            .highlight_style(palette.highlight())
            .highlight_symbol(">> ")
    };
    f.render_stateful_widget(tasks_widget, chunks[0], &mut app.task_state);

    let detail_block = panel("Task Details", palette, false);
    let Some(detail) = &app.task_detail else {
        let paragraph = Paragraph::new("Press Enter to view task details")
            .style(palette.muted())
            .block(detail_block)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, chunks[1]);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(detail.title.clone(), palette.heading())),
        Line::from(vec![
            Span::styled("Status: ", bold),
            Span::raw(match (detail.completed, detail.archived) {
                (_, true) => "Archived",
                (true, false) => "Done",
                (false, false) => "Open",
            }),
        ]),
    ];
    let schedule = schedule_label(detail);
    lines.push(Line::from(vec![
        Span::styled("When: ", bold),
        Span::raw(if schedule.is_empty() {
            "Unscheduled".to_string()
        } else {
            schedule
        }),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Created: ", bold),
        Span::raw(
            detail
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        ),
    ]));
    lines.push(Line::from(Span::styled("Description: ", bold)));
    let desc = detail.description.trim();
    if desc.is_empty() || desc == "<p></p>" {
        lines.push(Line::from(Span::styled("No description", palette.muted())));
    } else {
        let width = usize::from(chunks[1].width.saturating_sub(2).max(10));
        let rendered = html2text::from_read(desc.as_bytes(), width);
        lines.append(&mut ansi_to_text(&rendered));
    }

    let paragraph = Paragraph::new(lines)
        .block(detail_block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, chunks[1]);
}

fn draw_lists(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let focused = app.focus == Focus::Content;
    let drag = app.drag;
    let hover = app.drag_hover;

    let Some(open) = app.open_list.as_mut() else {
        let items: Vec<ListItem> = app
            .lists
            .iter()
            .map(|list| {
                ListItem::new(Line::from(vec![
                    Span::styled(list.name.clone(), palette.text()),
                    Span::styled(format!("  {} items", list.item_order.len()), palette.muted()),
                ]))
            })
            .collect();
        let widget = if items.is_empty() {
            List::new(vec![ListItem::new(Span::styled(
                "No lists yet. Press a to create one.",
                palette.muted(),
            ))])
            .block(panel("Lists", palette, focused))
        } else {
            List::new(items)
                .block(panel("Lists", palette, focused))
                .highlight_style(palette.highlight())
                .highlight_symbol(">> ")
        };
        f.render_stateful_widget(widget, area, &mut app.list_state);
        return;
    };

    let grabbed = open.grabbed;
    let items: Vec<ListItem> = open
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let check = if item.completed { "[x] " } else { "[ ] " };
            let mut style = if item.completed {
                palette.muted().add_modifier(Modifier::CROSSED_OUT)
            } else {
                palette.text()
            };
            if grabbed == Some(i) || drag == Some(i) {
                style = style.fg(palette.warning).add_modifier(Modifier::BOLD);
            }
            let marker = match hover {
                Some((target, Placement::Before)) if target == i && drag != Some(i) => "above",
                Some((target, Placement::After)) if target == i && drag != Some(i) => "below",
                _ => "",
            };
            let mut second = Line::from(Span::raw(""));
            if !marker.is_empty() {
                second = Line::from(Span::styled(
                    format!("    drop {marker}"),
                    Style::default().fg(palette.warning),
                ));
            }
            let text = Text::from(vec![
                Line::from(vec![
                    Span::styled(check, Style::default().fg(palette.accent)),
                    Span::styled(item.text.clone(), style),
                ]),
                second,
            ]);
            ListItem::new(text)
        })
        .collect();

    let title = format!("{} ({})", open.list.name, open.items.len());
    let block = panel(title, palette, focused);
    app.item_area = Some(block.inner(area));
    let widget = if items.is_empty() {
        List::new(vec![ListItem::new(Span::styled(
            "Empty list. Press a to add an item.",
            palette.muted(),
        ))])
        .block(block)
    } else {
        List::new(items)
            .block(block)
            .highlight_style(palette.highlight())
    };
    f.render_stateful_widget(widget, area, &mut open.state);
}

fn draw_pomodoro(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let timer = &app.pomodoro;
    let block = panel("Pomodoro", palette, true);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let box_area = centered_rect_absolute(40, 9, inner);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(box_area);

    let state = if timer.is_running() { "running" } else { "paused" };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(timer.phase().label(), palette.heading()),
            Span::styled(format!("  ({state})"), palette.muted()),
        ]))
        .alignment(Alignment::Center),
        rows[0],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            format_remaining(timer.remaining()),
            palette.text().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        rows[1],
    );
    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_style(palette.border()))
            .gauge_style(Style::default().fg(palette.accent))
            .ratio(timer.progress()),
        rows[2],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            format!("Focus sessions completed: {}", timer.completed_focus()),
            palette.muted(),
        ))
        .alignment(Alignment::Center),
        rows[3],
    );
}

fn settings_label(entry: SettingsEntry) -> &'static str {
    match entry {
        SettingsEntry::Name => "Display name",
        SettingsEntry::Avatar => "Avatar",
        SettingsEntry::Theme => "Theme",
        SettingsEntry::Notifications => "Notifications",
        SettingsEntry::ResetPassword => "Send password reset",
        SettingsEntry::SignOut => "Sign out",
        SettingsEntry::DeleteAccount => "Delete account",
    }
}

fn draw_settings(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let items: Vec<ListItem> = SettingsEntry::ALL
        .iter()
        .map(|entry| {
            let label_style = if *entry == SettingsEntry::DeleteAccount {
                Style::default().fg(palette.error)
            } else {
                palette.text()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<22}", settings_label(*entry)), label_style),
                Span::styled(app.setting_value(*entry), palette.muted()),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(panel("Settings", palette, app.focus == Focus::Content))
        .highlight_style(palette.highlight())
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, area, &mut app.settings_state);
}

fn draw_pricing(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(area);

    let items: Vec<ListItem> = PLANS
        .iter()
        .map(|plan| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<6}", plan.name), palette.text()),
                Span::styled(plan.price_label(), palette.muted()),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(panel("Plans", palette, app.focus == Focus::Content))
        .highlight_style(palette.highlight())
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, chunks[0], &mut app.pricing_state);

    let plan = PLANS[app.pricing_state.selected().unwrap_or(0).min(PLANS.len() - 1)];
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}  {}", plan.name, plan.price_label()),
            palette.heading(),
        )),
        Line::from(""),
    ];
    lines.extend(
        plan.features
            .iter()
            .map(|feature| Line::from(Span::styled(format!("  * {feature}"), palette.text()))),
    );
    let savings = Plan::yearly_savings_percent(&PLANS[1], &PLANS[2]);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Save {savings}% with yearly billing."),
        Style::default().fg(palette.warning),
    )));
    lines.push(Line::from(Span::styled(UPGRADE_URL, palette.muted())));
    f.render_widget(
        Paragraph::new(lines)
            .block(panel("Details", palette, false))
            .wrap(Wrap { trim: true }),
        chunks[1],
    );
}

fn draw_auth(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let form = &app.auth_form;
    let mut fields: Vec<(&str, String)> = vec![("Email", form.email.clone())];
    if form.mode != AuthMode::ResetPassword {
        fields.push(("Password", "*".repeat(form.password.chars().count())));
    }
    if form.mode == AuthMode::SignUp {
        fields.push(("Confirm", "*".repeat(form.confirm.chars().count())));
    }

    let mut lines = Vec::new();
    for (i, (label, value)) in fields.into_iter().enumerate() {
        let focused = i == form.focus.index();
        let style = if focused { palette.highlight() } else { palette.text() };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{label:>9}: "), palette.muted()),
            Span::styled(format!("{value}{cursor}"), style),
        ]));
        lines.push(Line::from(""));
    }
    if app.demo {
        lines.push(Line::from(Span::styled(
            "Demo: demo@noted.app / password",
            Style::default().fg(palette.warning),
        )));
    }

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let popup = centered_rect_absolute(56, height, area);
    let block = panel(format!("Noted - {}", form.mode.title()), palette, true);
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn draw_form(f: &mut Frame, form: &Form, size: Rect, palette: &Palette) {
    let description = form.has_description().then_some(form.description.as_str());
    let (popup_width, popup_height) = form_popup_size(&form.title, description, size);
    let popup_area = centered_rect_absolute(popup_width, popup_height, size);

    let field_style = |field: ActiveInput| {
        if form.active == field {
            palette.text().add_modifier(Modifier::BOLD)
        } else {
            palette.muted()
        }
    };
    let mut lines: Vec<Line> = form
        .title
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), field_style(ActiveInput::Title))))
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    if form.has_description() {
        lines.push(Line::from(Span::styled("Description:", palette.muted())));
        lines.push(Line::from(Span::styled(
            form.description.clone(),
            field_style(ActiveInput::Description),
        )));
    }

    let popup_block = Block::default()
        .title(form.heading())
        .borders(Borders::ALL)
        .style(Style::default().fg(palette.accent));
    let input = Paragraph::new(lines)
        .block(popup_block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

fn draw_modal(f: &mut Frame, app: &App, size: Rect, palette: &Palette) {
    let Some(modal) = &app.modal else {
        return;
    };
    let button = |label: &'static str, focused: bool| {
        if focused {
            Span::styled(format!("[ {label} ]"), palette.highlight())
        } else {
            Span::styled(format!("  {label}  "), palette.text())
        }
    };
    let confirm_focused = modal.focused() == CONFIRM;
    let lines = vec![
        Line::from(Span::styled(modal.message.clone(), palette.text())),
        Line::from(""),
        Line::from(vec![
            button("Cancel", !confirm_focused),
            Span::raw("   "),
            button("Confirm", confirm_focused),
        ])
        .alignment(Alignment::Center),
    ];
    let width = 56;
    let height = wrapped_height(&modal.message, width - 2).saturating_add(4);
    let area = centered_rect_absolute(width, height, size);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.error))
        .title(Span::styled(modal.title.clone(), palette.heading()));
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_toasts(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let shown: Vec<_> = app.toasts.iter().rev().take(MAX_TOASTS).collect();
    let mut bottom = area.y + area.height;
    for toast in shown {
        let width = (toast.message.chars().count() as u16 + 4).min(area.width);
        if bottom < area.y + 3 || width < 5 {
            break;
        }
        let rect = Rect::new(area.x + area.width - width, bottom - 3, width, 3);
        let color = match toast.level {
            ToastLevel::Info => palette.accent,
            ToastLevel::Error => palette.error,
        };
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(toast.message.clone())
                .style(palette.text())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color)),
                ),
            rect,
        );
        bottom -= 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 80, 24);
        let inner = centered_rect_absolute(40, 10, outer);
        assert_eq!(inner, Rect::new(20, 7, 40, 10));
        let clamped = centered_rect_absolute(200, 50, outer);
        assert_eq!(clamped, outer);
    }

    #[test]
    fn test_ansi_to_text_strips_escapes() {
        let lines = ansi_to_text("\x1b[1mBold\x1b[0m text\nsecond");
        assert_eq!(lines.len(), 2);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "Bold text");
    }

    #[test]
    fn test_calculate_wrapped_lines() {
        assert_eq!(calculate_wrapped_lines("", 10), 1);
        assert_eq!(calculate_wrapped_lines("abcdefghij", 10), 1);
        assert_eq!(calculate_wrapped_lines("abcdefghijk", 10), 2);
        assert_eq!(calculate_wrapped_lines("a\nb", 0), 2);
    }

    #[test]
    fn test_form_popup_size_grows_with_text() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(form_popup_size("Buy milk", None, area), (60, 3));
        let (_, with_notes) = form_popup_size("Buy milk", Some("two\nlines"), area);
        assert_eq!(with_notes, 6);
    }

    #[test]
    fn test_form_popup_size_saturates_on_huge_input() {
        let huge = "x\n".repeat(200_000);
        let area = Rect::new(0, 0, 120, 40);
        let (width, height) = form_popup_size(&huge, Some(&huge), area);
        assert_eq!(width, 72);
        assert_eq!(height, 38);

        let wide = Rect::new(0, 0, u16::MAX, u16::MAX);
        let (width, height) = form_popup_size(&huge, Some(&huge), wide);
        assert!(width >= 20);
        assert_eq!(height, u16::MAX - 2);
        assert_eq!(wrapped_height(&huge, 10), u16::MAX);
    }
}
