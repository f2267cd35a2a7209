use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use dayplan_core::{format_elapsed, Priority, ScheduleResult};

use crate::tui::app::{App, AuthTab, InputMode, LoginField, Notice, Screen, TextInput};
use crate::tui::theme::Theme;

const PLANNER_HELP: &str =
    "a:add m:modify space:done s:timer d:delete +/-:est r:reset g:schedule t:theme L:sign out q:quit";
const LOGIN_HELP: &str = "Tab: sign in/up | Up/Down: field | Enter: submit | Ctrl+G: guest | Esc: quit";

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Login => draw_login(f, app),
        Screen::Planner => draw_planner(f, app),
    }
}

fn rounded(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.muted))
}

/// Cuts `text` to `max_width` terminal columns, ending with `…` when cut.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width - 1 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

// --- login ---

fn draw_login(f: &mut Frame, app: &App) {
    let theme = app.theme;
    let form = &app.login;
    let area = centered_rect(64, 20, f.area());

    let mut constraints = vec![
        Constraint::Length(3), // Title
        Constraint::Length(2), // Tabs
        Constraint::Length(3), // Email
        Constraint::Length(3), // Password
    ];
    if form.tab == AuthTab::SignUp {
        constraints.push(Constraint::Length(3)); // Confirm
    }
    constraints.push(Constraint::Min(2)); // Error / progress
    constraints.push(Constraint::Length(1)); // Help

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let title = Paragraph::new("DAYPLAN")
        .style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(theme.muted)));
    f.render_widget(title, chunks[0]);

    let selected_tab = match form.tab {
        AuthTab::SignIn => 0,
        AuthTab::SignUp => 1,
    };
    let tabs = Tabs::new(vec!["Sign in", "Sign up"])
        .select(selected_tab)
        .style(Style::default().fg(theme.muted))
        .highlight_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[1]);

    let mut fields = vec![
        (LoginField::Email, "Email", form.email.value().to_string(), &form.email),
        (LoginField::Password, "Password", form.password.masked(), &form.password),
    ];
    if form.tab == AuthTab::SignUp {
        fields.push((LoginField::Confirm, "Confirm password", form.confirm.masked(), &form.confirm));
    }

    for (i, (field, label, shown, input)) in fields.into_iter().enumerate() {
        let chunk = chunks[2 + i];
        let active = field == form.field;
        let border = if active { theme.primary } else { theme.muted };
        let widget = Paragraph::new(shown)
            .style(Style::default().fg(theme.text))
            .block(rounded(label, theme).border_style(Style::default().fg(border)));
        f.render_widget(widget, chunk);
        if active && !app.is_signing_in() {
            set_input_cursor(f, chunk.x + 1, chunk.y + 1, input);
        }
    }

    let status_chunk = chunks[chunks.len() - 2];
    let status = if app.is_signing_in() {
        Paragraph::new(Span::styled("Signing in...", Style::default().fg(theme.muted)))
    } else if let Some((title, description)) = &form.error {
        Paragraph::new(vec![
            Line::from(Span::styled(
                title.as_str(),
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(description.as_str(), Style::default().fg(theme.error))),
        ])
        .wrap(Wrap { trim: true })
    } else {
        Paragraph::new("")
    };
    f.render_widget(status, status_chunk);

    let help = Paragraph::new(LOGIN_HELP)
        .style(Style::default().fg(theme.muted))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[chunks.len() - 1]);
}

fn set_input_cursor(f: &mut Frame, x: u16, y: u16, input: &TextInput) {
    let before: String = input.value().chars().take(input.cursor()).collect();
    f.set_cursor_position((x + before.width() as u16, y));
}

// --- planner ---

fn draw_planner(f: &mut Frame, app: &mut App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(2), // Status + help
        ])
        .split(f.area());

    draw_header(f, app, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[1]);

    draw_task_list(f, app, content_chunks[0]);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(content_chunks[1]);

    draw_progress(f, app, side_chunks[0]);
    draw_schedule(f, app, side_chunks[1]);
    draw_footer(f, app, main_chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let user = app.session.as_ref().map(|s| s.display_name()).unwrap_or("");
    let running = app.planner.as_ref().map(|p| p.running_count()).unwrap_or(0);

    let mut spans = vec![
        Span::styled("DAYPLAN", Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}  {}", Local::now().format("%A, %-d %B"), user),
            Style::default().fg(theme.muted),
        ),
    ];
    if running > 0 {
        spans.push(Span::styled(
            format!("  ▶ {} running", running),
            Style::default().fg(theme.running),
        ));
    }
    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, area);
}

fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "H",
        Priority::Medium => "M",
        Priority::Low => "L",
    }
}

fn draw_task_list(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = app.theme;
    let block = rounded("Tasks", theme);
    let Some(planner) = app.planner.as_ref() else {
        f.render_widget(block, area);
        return;
    };

    if planner.tasks().is_empty() {
        let placeholder = Paragraph::new("No tasks yet. Press 'a' to add one.")
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    // Borders, highlight symbol, fixed columns and column spacing.
    let name_width = area.width.saturating_sub(2 + 3 + 3 + 3 + 6 + 10 + 4) as usize;

    let rows: Vec<Row> = planner
        .tasks()
        .iter()
        .map(|task| {
            let check = if task.is_complete { "[x]" } else { "[ ]" };
            let elapsed = format_elapsed(planner.elapsed(&task.id));
            let timer = if task.is_running {
                Span::styled(format!("▶ {}", elapsed), Style::default().fg(theme.running))
            } else {
                Span::raw(format!("  {}", elapsed))
            };
            let name_style = if task.is_complete {
                Style::default().fg(theme.muted).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
            };

            Row::new(vec![
                Span::styled(check, Style::default().fg(theme.done)),
                Span::styled(
                    priority_badge(task.priority),
                    Style::default().fg(theme.priority(task.priority)),
                ),
                Span::styled(truncate(&task.name, name_width), name_style),
                Span::raw(format!("{}m", task.estimated_duration)),
                timer,
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),  // Done
            Constraint::Length(3),  // Priority
            Constraint::Min(10),    // Name
            Constraint::Length(6),  // Estimate
            Constraint::Length(10), // Timer
        ],
    )
    .header(Row::new(vec!["", "Pr", "Task", "Est", "Time"]).style(Style::default().fg(theme.primary)))
    .block(block)
    .row_highlight_style(Style::default().bg(theme.selection).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_progress(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let block = rounded("Progress", theme);
    let progress = app.planner.as_ref().map(|p| p.progress()).unwrap_or_default();

    if progress.is_empty() {
        let placeholder = Paragraph::new("No data")
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let ratio = progress.completed as f64 / progress.total as f64;
    let label = format!(
        "{}/{} ({}%)",
        progress.completed,
        progress.total,
        progress.percentage()
    );
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(theme.done))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn draw_schedule(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let Some(planner) = app.planner.as_ref() else {
        return;
    };

    let (title, body, style) = if planner.is_generating() {
        (
            "Schedule".to_string(),
            "Generating your schedule...".to_string(),
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        )
    } else if let Some(schedule) = planner.schedule() {
        (
            format!("Schedule · {}", schedule.received_at.format("%H:%M")),
            schedule.result.message().to_string(),
            schedule_style(&schedule.result, theme),
        )
    } else {
        (
            "Schedule".to_string(),
            "Press 'g' to generate a schedule from your pending tasks.".to_string(),
            Style::default().fg(theme.muted),
        )
    };

    let paragraph = Paragraph::new(body)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(rounded(&title, theme));
    f.render_widget(paragraph, area);
}

/// Fallback and no-task messages are not a schedule.
fn schedule_style(result: &ScheduleResult, theme: &Theme) -> Style {
    if result.is_generated() {
        Style::default().fg(theme.text)
    } else {
        Style::default().fg(theme.error)
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let prompt = match app.input_mode {
        InputMode::Adding => Some("Add: "),
        InputMode::Modifying => Some("Modify: "),
        InputMode::Normal => None,
    };

    if let Some(prompt) = prompt {
        let line = Line::from(vec![
            Span::styled(prompt, Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)),
            Span::styled(app.input.value(), Style::default().fg(theme.text)),
        ]);
        f.render_widget(Paragraph::new(line), chunks[0]);
        set_input_cursor(f, chunks[0].x + prompt.width() as u16, chunks[0].y, &app.input);
    }

    // The notice shares the first line with the prompt; the prompt wins
    // unless there is an error to show.
    let notice = match (&app.notice, prompt) {
        (Some(Notice::Error(text)), _) => Some(Span::styled(text.as_str(), Style::default().fg(theme.error))),
        (Some(Notice::Info(text)), None) => Some(Span::styled(text.as_str(), Style::default().fg(theme.primary))),
        _ => None,
    };

    let help = match (notice, prompt) {
        (Some(notice), Some(_)) => notice,
        (Some(notice), None) => {
            f.render_widget(Paragraph::new(notice), chunks[0]);
            Span::styled(PLANNER_HELP, Style::default().fg(theme.muted))
        }
        (None, Some(_)) => Span::styled(
            "Enter: save | Esc: cancel | name est:1h30m pri:high",
            Style::default().fg(theme.muted),
        ),
        (None, None) => Span::styled(PLANNER_HELP, Style::default().fg(theme.muted)),
    };
    f.render_widget(Paragraph::new(help).alignment(Alignment::Center), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use dayplan_core::auth::OfflineAuthProvider;
    use dayplan_core::schedule::{GenerationError, ScheduleGenerator};
    use dayplan_core::{ScheduleFailure, ScheduleRequester};
    use ratatui::{backend::TestBackend, Terminal};

    use crate::config::ThemeName;

    struct NeverCalled;

    #[async_trait]
    impl ScheduleGenerator for NeverCalled {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::NotConfigured("test".to_string()))
        }
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_key(KeyEvent::new(code, modifiers));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Write report", 20), "Write report");
        assert_eq!(truncate("Write report", 6), "Write…");
        assert_eq!(truncate("日本語のタスク", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_schedule_style() {
        let theme = Theme::get(ThemeName::Dark);
        let generated = ScheduleResult::Generated("09:00 Write report".to_string());
        assert_eq!(schedule_style(&generated, theme).fg, Some(theme.text));
        assert_eq!(
            schedule_style(&ScheduleResult::Failed(ScheduleFailure::Timeout), theme).fg,
            Some(theme.error)
        );
        assert_eq!(schedule_style(&ScheduleResult::NoTasks, theme).fg, Some(theme.error));
    }

    #[tokio::test]
    async fn test_render_login_and_planner() {
        let mut app = App::new(
            Arc::new(OfflineAuthProvider),
            ScheduleRequester::new(Arc::new(NeverCalled)),
            Theme::get(ThemeName::Dark),
        );
        let login = render(&mut app);
        assert!(login.contains("Sign in"));
        assert!(login.contains("Email"));

        press(&mut app, KeyCode::Char('g'), KeyModifiers::CONTROL);
        for _ in 0..100 {
            tokio::task::yield_now().await;
            app.on_tick();
            if !app.is_signing_in() {
                break;
            }
        }

        let empty = render(&mut app);
        assert!(empty.contains("No tasks yet"));
        assert!(empty.contains("No data"));
        assert!(empty.contains("Press 'g'"));

        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        for c in "Write report est:45".chars() {
            press(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        let planner = render(&mut app);
        assert!(planner.contains("Write report"));
        assert!(planner.contains("45m"));
        assert!(planner.contains("00:00"));
        assert!(planner.contains("0/1 (0%)"));
    }
}
