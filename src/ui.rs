use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::timer::{format_mm_ss, TimerPhase};
use crate::{App, AppState, EditField};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn ui(app: &mut App, f: &mut Frame) {
    match app.state {
        AppState::Welcome => render_welcome(app, f),
        AppState::Timer => render_timer(app, f),
    }
}

/// "3 minutes ago" for a past completion time.
fn relative_time(date: DateTime<Utc>) -> String {
    let elapsed = (Utc::now() - date).to_std().unwrap_or_default();
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}

fn render_welcome(app: &mut App, f: &mut Frame) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Gray);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(1),    // session history
            Constraint::Length(2), // key hints
        ])
        .split(f.area());

    let title = Paragraph::new(Span::styled("zazen", bold_style.fg(Color::Cyan)))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if app.history.is_empty() {
        let empty = Paragraph::new(Span::styled("No previous sessions", dim_style))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Previous Sessions"),
            )
            .alignment(Alignment::Center);
        f.render_widget(empty, chunks[1]);
    } else {
        let lines: Vec<Line> = app
            .history
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let text = format!(
                    "{}  {}",
                    format_mm_ss(record.duration as u32),
                    relative_time(record.date)
                );
                if idx == app.selected {
                    Line::from(Span::styled(
                        format!("> {}", text),
                        bold_style.fg(Color::Green),
                    ))
                } else {
                    Line::from(Span::styled(format!("  {}", text), dim_style))
                }
            })
            .collect();

        let list = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Previous Sessions"),
        );
        f.render_widget(list, chunks[1]);
    }

    let hints = Paragraph::new(Span::styled(
        "(n)ew session  (enter) repeat selected  (d)elete  (↑/↓) select  (q)uit",
        dim_style.add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(hints, chunks[2]);
}

fn render_timer(app: &mut App, f: &mut Frame) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Gray);

    let area = f.area();
    let top_filler = area.height.saturating_sub(12) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(top_filler),
            Constraint::Length(1), // remaining time
            Constraint::Length(1), // phase
            Constraint::Length(1), // padding
            Constraint::Length(3), // progress gauge
            Constraint::Length(1), // padding
            Constraint::Length(1), // notice
            Constraint::Length(2), // edit form / key hints
            Constraint::Min(0),
        ])
        .split(area);

    let remaining = Paragraph::new(Span::styled(
        format_mm_ss(app.timer.time_left),
        bold_style.fg(Color::Cyan),
    ))
    .alignment(Alignment::Center);
    f.render_widget(remaining, chunks[1]);

    let phase_style = match app.timer.phase() {
        TimerPhase::Running => Style::default().fg(Color::Green),
        TimerPhase::Completed => Style::default().fg(Color::Yellow),
        _ => dim_style,
    };
    let phase = Paragraph::new(Span::styled(
        app.timer.phase().to_string(),
        phase_style.add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(phase, chunks[2]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .label(format!("{:.0}%", app.timer.progress))
        .ratio((app.timer.progress / 100.0).clamp(0.0, 1.0));
    f.render_widget(gauge, chunks[4]);

    if let Some(notice) = &app.notice {
        let line = Paragraph::new(Span::styled(
            format!("{} — {}", notice.title, notice.body),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        f.render_widget(line, chunks[6]);
    }

    if let Some(form) = &app.edit {
        let field_style = |field: EditField| {
            if form.field == field {
                bold_style.fg(Color::Green)
            } else {
                dim_style
            }
        };
        let form_line = Line::from(vec![
            Span::styled("minutes: ", dim_style),
            Span::styled(format!("[{:>2}]", form.minutes), field_style(EditField::Minutes)),
            Span::raw("  "),
            Span::styled("seconds: ", dim_style),
            Span::styled(format!("[{:>2}]", form.seconds), field_style(EditField::Seconds)),
        ]);
        let hint_line = Line::from(Span::styled(
            "(tab) switch field  (enter) apply  (esc) cancel",
            dim_style.add_modifier(Modifier::ITALIC),
        ));
        let form_widget =
            Paragraph::new(vec![form_line, hint_line]).alignment(Alignment::Center);
        f.render_widget(form_widget, chunks[7]);
    } else {
        let hints = Paragraph::new(Span::styled(
            "(space) start/pause  (r)eset  (e)dit duration  (esc) back",
            dim_style.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        f.render_widget(hints, chunks[7]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::{MemorySessionStore, SessionStore};
    use chrono::Duration;
    use ratatui::{backend::TestBackend, Terminal};

    fn test_app() -> App {
        App::new(Config::default(), Box::new(MemorySessionStore::new()))
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn welcome_screen_renders_empty_history() {
        let mut app = test_app();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("zazen"));
        assert!(content.contains("No previous sessions"));
    }

    #[test]
    fn welcome_screen_lists_sessions_with_selection_marker() {
        let mut app = test_app();
        app.sessions
            .append(90, Utc::now() - Duration::minutes(3))
            .unwrap();
        app.refresh_history();

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("> 01:30"));
        assert!(content.contains("ago"));
    }

    #[test]
    fn timer_screen_shows_remaining_time_and_phase() {
        let mut app = test_app();
        app.enter_timer();

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("05:00"));
        assert!(content.contains("Idle"));
    }

    #[test]
    fn timer_screen_renders_edit_form() {
        let mut app = test_app();
        app.enter_timer();
        app.open_edit();

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("minutes:"));
        assert!(content.contains("seconds:"));
    }

    #[test]
    fn timer_screen_renders_completion_notice() {
        let mut app = test_app();
        app.enter_timer();
        app.notice = Some(crate::Notice::completion());

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&mut app, f)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Session completed"));
    }

    #[test]
    fn relative_time_reads_as_past() {
        let s = relative_time(Utc::now() - Duration::minutes(10));
        assert!(s.contains("ago"), "got: {s}");
    }
}
