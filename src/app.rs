use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::config::{Config, ConfigStore};
use crate::quiz::{Command, Quiz, SubmitResult};
use crate::session::{Mode, SessionParams};
use crate::ui::screen::current_screen;

/// Offered item counts; `usize::MAX` means the whole round.
pub const COUNT_CHOICES: [usize; 6] = [5, 10, 15, 20, 30, usize::MAX];
/// Offered seconds per item; 0 means untimed.
pub const SECONDS_CHOICES: [u32; 6] = [0, 5, 10, 15, 20, 30];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Setup,
    Quiz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Mode,
    Round,
    Count,
    Seconds,
    Strict,
}

impl SetupField {
    pub const ALL: [SetupField; 5] = [
        SetupField::Mode,
        SetupField::Round,
        SetupField::Count,
        SetupField::Seconds,
        SetupField::Strict,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SetupField::Mode => "Mode",
            SetupField::Round => "Round",
            SetupField::Count => "Words",
            SetupField::Seconds => "Seconds per word",
            SetupField::Strict => "Strict spelling",
        }
    }
}

/// Choices on the setup screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupState {
    pub focus: usize,
    pub mode: Mode,
    pub rounds: Vec<String>,
    pub round_idx: usize,
    pub counts: Vec<usize>,
    pub count_idx: usize,
    pub seconds: Vec<u32>,
    pub seconds_idx: usize,
    pub strict: bool,
}

/// Index of `value` in `choices`, inserting it in order if it is not offered yet.
fn choice_index<T: Ord + Copy>(choices: &mut Vec<T>, value: T) -> usize {
    match choices.binary_search(&value) {
        Ok(idx) => idx,
        Err(idx) => {
            choices.insert(idx, value);
            idx
        }
    }
}

fn cycle(idx: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    }
}

impl SetupState {
    pub fn from_config(cfg: &Config, rounds: Vec<String>) -> Self {
        let round_idx = cfg
            .round
            .as_ref()
            .and_then(|r| rounds.iter().position(|name| name == r))
            .unwrap_or(0);
        let mut counts = COUNT_CHOICES.to_vec();
        let count_idx = choice_index(&mut counts, cfg.count);
        let mut seconds = SECONDS_CHOICES.to_vec();
        let seconds_idx = choice_index(&mut seconds, cfg.seconds);

        Self {
            focus: 0,
            mode: cfg.mode,
            rounds,
            round_idx,
            counts,
            count_idx,
            seconds,
            seconds_idx,
            strict: cfg.strict,
        }
    }

    pub fn focused(&self) -> SetupField {
        SetupField::ALL[self.focus]
    }

    pub fn move_focus(&mut self, down: bool) {
        self.focus = cycle(self.focus, SetupField::ALL.len(), down);
    }

    pub fn change(&mut self, forward: bool) {
        match self.focused() {
            SetupField::Mode => {
                self.mode = match self.mode {
                    Mode::Practice => Mode::Test,
                    Mode::Test => Mode::Practice,
                }
            }
            SetupField::Round => self.round_idx = cycle(self.round_idx, self.rounds.len(), forward),
            SetupField::Count => self.count_idx = cycle(self.count_idx, self.counts.len(), forward),
            SetupField::Seconds => {
                self.seconds_idx = cycle(self.seconds_idx, self.seconds.len(), forward)
            }
            SetupField::Strict => self.strict = !self.strict,
        }
    }

    pub fn round(&self) -> Option<&str> {
        self.rounds.get(self.round_idx).map(String::as_str)
    }

    pub fn count(&self) -> usize {
        self.counts[self.count_idx]
    }

    pub fn seconds(&self) -> u32 {
        self.seconds[self.seconds_idx]
    }

    /// Display text for a field's current value.
    pub fn value_label(&self, field: SetupField) -> String {
        match field {
            SetupField::Mode => self.mode.to_string(),
            SetupField::Round => self.round().unwrap_or("(no rounds)").to_string(),
            SetupField::Count => match self.count() {
                usize::MAX => "all".to_string(),
                n => n.to_string(),
            },
            SetupField::Seconds => match self.seconds() {
                0 => "off".to_string(),
                n if self.mode == Mode::Practice => format!("{n} (test mode only)"),
                n => n.to_string(),
            },
            SetupField::Strict => if self.strict { "ON" } else { "OFF" }.to_string(),
        }
    }

    pub fn params(&self) -> SessionParams {
        SessionParams {
            mode: self.mode,
            round: self.round().unwrap_or_default().to_string(),
            count: self.count(),
            per_word_secs: self.seconds(),
        }
    }

    pub fn to_config(&self) -> Config {
        Config {
            mode: self.mode,
            round: self.round().map(str::to_string),
            count: self.count(),
            seconds: self.seconds(),
            strict: self.strict,
        }
    }
}

/// The control surface: owns the quiz plus setup choices and the answer being typed.
pub struct App {
    pub quiz: Quiz,
    pub setup: SetupState,
    pub answer: String,
    config_store: Box<dyn ConfigStore>,
}

impl App {
    pub fn new(quiz: Quiz, config_store: Box<dyn ConfigStore>, config: Config) -> Self {
        let rounds = quiz
            .words()
            .round_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let setup = SetupState::from_config(&config, rounds);
        Self {
            quiz,
            setup,
            answer: String::new(),
            config_store,
        }
    }

    pub fn screen(&self) -> ScreenKind {
        if self.quiz.session().is_some() {
            ScreenKind::Quiz
        } else {
            ScreenKind::Setup
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }
        current_screen(self.screen()).on_key(key, self)
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        self.quiz.tick(elapsed);
    }

    pub fn start_session(&mut self) {
        if !self.quiz.is_enabled(Command::Start) {
            return;
        }
        if let Err(e) = self.config_store.save(&self.setup.to_config()) {
            tracing::warn!("could not save preferences: {e}");
        }
        // Voices may have been installed or removed since the last session.
        self.quiz.speaker_mut().refresh_voices();
        if self.quiz.start(self.setup.params()).is_ok() {
            self.answer.clear();
        }
    }

    /// Enter on the quiz screen: submit while answering, move on once resolved.
    pub fn confirm(&mut self) {
        if self.quiz.is_enabled(Command::Submit) {
            let result = self.quiz.submit(&self.answer, self.setup.strict);
            tracing::debug!("submit: {result:?}");
            if result == SubmitResult::Retry {
                self.answer.clear();
            }
        } else if self.quiz.is_enabled(Command::Next) {
            self.next();
        }
    }

    pub fn next(&mut self) {
        if self.quiz.next() {
            self.answer.clear();
        }
    }

    pub fn end_session(&mut self) {
        if self.quiz.is_enabled(Command::End) {
            self.quiz.end();
            self.answer.clear();
        }
    }

    pub fn type_char(&mut self, c: char) {
        if self.quiz.is_enabled(Command::Submit) {
            self.answer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.quiz.is_enabled(Command::Submit) {
            self.answer.pop();
        }
    }
}
