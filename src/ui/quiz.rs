use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::{App, AppAction};
use crate::quiz::{Command, Feedback, Phase};
use crate::ui::screen::Screen;
use crate::ui::{
    bad_style, bold_style, dim_style, good_style, legend_style, HORIZONTAL_MARGIN,
    VERTICAL_MARGIN,
};

/// The active question: status, score, answer box and feedback.
pub struct QuizScreen;

fn key_label(command: Command) -> Option<&'static str> {
    match command {
        Command::Say => Some("(ctrl-s) say"),
        Command::Repeat => Some("(ctrl-r) repeat"),
        Command::Hint => Some("(tab) hint"),
        Command::Submit => Some("(enter) submit"),
        Command::Next => Some("(enter/ctrl-n) next"),
        Command::End => Some("(esc) end"),
        Command::Start | Command::ClearHistory => None,
    }
}

pub fn legend(commands: &[Command]) -> String {
    commands.iter().filter_map(|c| key_label(*c)).join("  ")
}

fn feedback_lines(feedback: &Feedback) -> Vec<Line<'static>> {
    match feedback {
        Feedback::None => vec![],
        Feedback::Retry => vec![
            Line::from(Span::styled("Not correct.", bad_style())),
            Line::from(Span::styled("Try once more. Use Repeat or Hint.", dim_style())),
        ],
        Feedback::Correct { word } => vec![
            Line::from(Span::styled("Correct.", good_style())),
            Line::from(Span::styled(word.clone(), dim_style())),
        ],
        Feedback::Wrong { word, reason } => {
            let mut lines = vec![Line::from(Span::styled("Wrong.", bad_style()))];
            if let Some(reason) = reason {
                lines.push(Line::from(Span::styled(reason.clone(), dim_style())));
            }
            lines.push(Line::from(Span::styled(
                format!("Correct spelling: {word}"),
                dim_style(),
            )));
            lines
        }
        Feedback::Hint(hint) => vec![Line::from(Span::styled(hint.clone(), dim_style()))],
    }
}

impl Screen for QuizScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let Some(session) = app.quiz.session() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // status
                Constraint::Length(1), // timer
                Constraint::Length(1), // score
                Constraint::Length(3), // answer
                Constraint::Min(3),    // feedback
                Constraint::Length(2), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(app.quiz.status().to_string(), bold_style()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        if let Some(left) = app.quiz.remaining_secs() {
            let style = if left <= 3 {
                bad_style()
            } else {
                bold_style().add_modifier(Modifier::DIM)
            };
            Paragraph::new(Span::styled(format!("{left}s"), style))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
        }

        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} correct", session.correct), good_style()),
            Span::raw("   "),
            Span::styled(format!("{} wrong", session.wrong), bad_style()),
            Span::raw("   "),
            Span::styled(session.progress(), bold_style()),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        let answering = app.quiz.phase() == Phase::Answering;
        let mut answer = vec![Span::styled(app.answer.clone(), bold_style())];
        if answering {
            answer.push(Span::styled(
                "_",
                Style::default().add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        let strict = if app.setup.strict { " (strict)" } else { "" };
        Paragraph::new(Line::from(answer))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(if answering {
                        Style::default().fg(Color::Cyan)
                    } else {
                        dim_style()
                    })
                    .title(format!("Your spelling{strict}")),
            )
            .render(chunks[3], buf);

        Paragraph::new(feedback_lines(app.quiz.feedback()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);

        Paragraph::new(Span::styled(
            legend(&app.quiz.available_commands()),
            legend_style(),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);
    }

    fn on_key(&self, key: KeyEvent, app: &mut App) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') | KeyCode::Char('r') => {
                    app.quiz.say();
                }
                KeyCode::Char('n') => app.next(),
                _ => {}
            }
            return AppAction::Continue;
        }

        match key.code {
            KeyCode::Esc => app.end_session(),
            KeyCode::Enter => app.confirm(),
            KeyCode::Tab => {
                app.quiz.request_hint();
            }
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) => app.type_char(c),
            _ => {}
        }
        AppAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FileConfigStore};
    use crate::history::MemoryHistoryStore;
    use crate::quiz::Quiz;
    use crate::session::Mode;
    use crate::speech::Speaker;
    use crate::words::WordList;

    fn render_to_string(app: &App) -> String {
        let area = Rect::new(0, 0, 100, 24);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn legend_lists_only_labelled_commands() {
        assert_eq!(
            legend(&[Command::Start, Command::Hint, Command::End]),
            "(tab) hint  (esc) end"
        );
    }

    #[test]
    fn wrong_feedback_reveals_word_and_reason() {
        let lines = feedback_lines(&Feedback::Wrong {
            word: "owl".into(),
            reason: Some("Time up.".into()),
        });
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["Wrong.", "Time up.", "Correct spelling: owl"]);
    }

    #[test]
    fn renders_timed_question() {
        let dir = tempfile::tempdir().unwrap();
        let quiz = Quiz::new(
            WordList::new(vec![("Birds".into(), vec!["owl".into(), "wren".into()])]),
            Speaker::disabled(),
            Box::new(MemoryHistoryStore::default()),
        );
        let mut app = App::new(
            quiz,
            Box::new(FileConfigStore::with_path(dir.path().join("c.json"))),
            Config {
                mode: Mode::Test,
                seconds: 10,
                ..Config::default()
            },
        );
        app.start_session();
        app.type_char('o');

        let screen = render_to_string(&app);
        assert!(screen.contains("Time left: 10s | Round: Birds | Q 1/2"));
        assert!(screen.contains("0 correct"));
        assert!(screen.contains("1/2"));
        assert!(screen.contains("(enter) submit"));
        assert!(!screen.contains("next"));
    }
}
