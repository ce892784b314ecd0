use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppAction, SetupField};
use crate::history::HistoryEntry;
use crate::quiz::Command;
use crate::ui::screen::Screen;
use crate::ui::{
    bold_style, dim_style, legend_style, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};

pub const EMPTY_HISTORY: &str = "No history saved on this device yet.";

/// Mode/round/count/timer selection plus the saved history.
pub struct SetupScreen;

/// `left` and `right` on one line of `width` cells, `right` flush to the edge.
fn spread(left: &str, right: &str, width: usize) -> String {
    let gap = width
        .saturating_sub(left.width() + right.width())
        .max(2);
    format!("{left}{}{right}", " ".repeat(gap))
}

fn history_lines(entries: &[HistoryEntry], width: usize) -> Vec<Line<'static>> {
    if entries.is_empty() {
        return vec![Line::from(Span::styled(EMPTY_HISTORY, dim_style()))];
    }
    entries
        .iter()
        .map(|e| Line::from(spread(&e.summary(), &e.ended_at_local(), width)))
        .collect()
}

impl Screen for SetupScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(SetupField::ALL.len() as u16 + 2),
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let setup = &app.setup;
        let fields: Vec<Line> = SetupField::ALL
            .iter()
            .map(|field| {
                let focused = *field == setup.focused();
                let marker = if focused { "> " } else { "  " };
                let value_style = if focused {
                    bold_style().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{:<18}", field.label()), bold_style()),
                    Span::styled(format!("< {} >", setup.value_label(*field)), value_style),
                ])
            })
            .collect();
        Paragraph::new(fields)
            .block(Block::default().borders(Borders::ALL).title("Spelling practice"))
            .render(chunks[0], buf);

        Paragraph::new(Span::styled(app.quiz.status().to_string(), bold_style()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        let inner_width = chunks[2].width.saturating_sub(2) as usize;
        Paragraph::new(history_lines(&app.quiz.history(), inner_width))
            .block(Block::default().borders(Borders::ALL).title("History"))
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            "(↑/↓) field (←/→) change (enter) start (c) clear history (esc) quit",
            legend_style(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    fn on_key(&self, key: KeyEvent, app: &mut App) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Up => app.setup.move_focus(false),
            KeyCode::Down | KeyCode::Tab => app.setup.move_focus(true),
            KeyCode::Left => app.setup.change(false),
            KeyCode::Right | KeyCode::Char(' ') => app.setup.change(true),
            KeyCode::Enter => app.start_session(),
            KeyCode::Char('c') if app.quiz.is_enabled(Command::ClearHistory) => {
                app.quiz.clear_history()
            }
            _ => {}
        }
        AppAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FileConfigStore};
    use crate::history::{MemoryHistoryStore, Score};
    use crate::quiz::Quiz;
    use crate::session::Mode;
    use crate::speech::Speaker;
    use crate::words::WordList;
    use chrono::Utc;

    fn render_to_string(app: &App) -> String {
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn spread_pushes_right_text_to_edge() {
        assert_eq!(spread("ab", "cd", 8), "ab    cd");
        assert_eq!(spread("abcdef", "gh", 4), "abcdef  gh");
    }

    #[test]
    fn renders_fields_and_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let quiz = Quiz::new(
            WordList::new(vec![("Animals".into(), vec!["owl".into()])]),
            Speaker::disabled(),
            Box::new(MemoryHistoryStore::default()),
        );
        let app = App::new(
            quiz,
            Box::new(FileConfigStore::with_path(dir.path().join("c.json"))),
            Config::default(),
        );

        let screen = render_to_string(&app);
        assert!(screen.contains("Animals"));
        assert!(screen.contains("practice"));
        assert!(screen.contains(EMPTY_HISTORY));
        assert!(screen.contains("Select a mode and round, then press Start."));
    }

    #[test]
    fn history_rows_show_summary() {
        let entry = HistoryEntry {
            mode: Mode::Test,
            round: "Animals".into(),
            score: Score { correct: 3, total: 5 },
            ended_at: Utc::now(),
        };
        let lines = history_lines(&[entry], 60);
        assert_eq!(lines.len(), 1);
        let text = lines[0].to_string();
        assert!(text.starts_with("test | Animals | 3/5"));
        assert_eq!(text.width(), 60);
    }
}
