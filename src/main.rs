use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use spelldrill::{
    app::AppAction,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    error::WordListError,
    history::{FileHistoryStore, HistoryStore},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    session::Mode,
    speech::Speaker,
    ui::setup::EMPTY_HISTORY,
    words::{WordList, DEFAULT_BUNDLED},
    App, Quiz,
};

const TICK_RATE_MS: u64 = 100;

/// hear a word, spell it, get scored
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A spelling practice TUI: words are read aloud, you type them, and each session's score is kept in a local history."
)]
pub struct Cli {
    /// word-list JSON file: {"rounds": {"<round>": ["word", ...]}}
    #[clap(long)]
    words: Option<PathBuf>,

    /// bundled word list to use when --words is not given
    #[clap(long, default_value = DEFAULT_BUNDLED)]
    list: String,

    /// practice allows one retry per word, test scores the first answer
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// round to preselect
    #[clap(short = 'r', long)]
    round: Option<String>,

    /// number of words per session
    #[clap(short = 'n', long)]
    count: Option<usize>,

    /// seconds allowed per word in test mode (0 = untimed)
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// require exact case, spacing and hyphens
    #[clap(long)]
    strict: bool,

    /// do not speak words aloud
    #[clap(long)]
    no_speech: bool,

    /// history file location
    #[clap(long)]
    history: Option<PathBuf>,

    /// preferences file location
    #[clap(long)]
    config: Option<PathBuf>,

    /// print saved history and exit
    #[clap(long)]
    print_history: bool,

    /// delete saved history and exit
    #[clap(long)]
    clear_history: bool,
}

impl Cli {
    /// Command-line choices take precedence over saved preferences.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(round) = &self.round {
            cfg.round = Some(round.clone());
        }
        if let Some(count) = self.count {
            cfg.count = count;
        }
        if let Some(seconds) = self.seconds {
            cfg.seconds = seconds;
        }
        if self.strict {
            cfg.strict = true;
        }
        cfg
    }

    fn history_store(&self) -> FileHistoryStore {
        match &self.history {
            Some(path) => FileHistoryStore::with_path(path),
            None => FileHistoryStore::new(),
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    fn load_words(&self) -> Result<WordList, WordListError> {
        let words = match &self.words {
            Some(path) => WordList::load(path)?,
            None => WordList::bundled(&self.list)?,
        };
        if words.is_empty() {
            return Err(WordListError::Malformed("word list has no rounds".into()));
        }
        Ok(words)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut history = cli.history_store();
    if cli.clear_history {
        history.clear()?;
        println!("History cleared.");
        return Ok(());
    }
    if cli.print_history {
        let entries = history.list();
        if entries.is_empty() {
            println!("{EMPTY_HISTORY}");
        }
        for entry in entries {
            println!("{}  {}", entry.summary(), entry.ended_at_local());
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // Without a log file the app still runs, just silently.
    let _ = logging::init_file_logging(&AppDirs::log_path());
    tracing::info!("starting spelldrill v{}", env!("CARGO_PKG_VERSION"));

    let words = match cli.load_words() {
        Ok(words) => words,
        Err(e) => {
            tracing::error!("{e}");
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::Io, e).exit();
        }
    };

    let speaker = if cli.no_speech {
        Speaker::disabled()
    } else {
        Speaker::detect()
    };
    let config_store = cli.config_store();
    let config = cli.apply(config_store.load());
    let quiz = Quiz::new(words, speaker, Box::new(history));
    let mut app = App::new(quiz, Box::new(config_store), config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    loop {
        let (event, elapsed) = runner.step_timed();
        app.on_tick(elapsed);

        let redraw = match event {
            QuizEvent::Key(key) => {
                if app.on_key(key) == AppAction::Quit {
                    break;
                }
                true
            }
            QuizEvent::Resize => true,
            // Only the countdown changes between key presses.
            QuizEvent::Tick => app.quiz.session().is_some(),
        };
        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["spelldrill"]);

        assert_eq!(cli.words, None);
        assert_eq!(cli.list, DEFAULT_BUNDLED);
        assert_eq!(cli.mode, None);
        assert_eq!(cli.count, None);
        assert!(!cli.strict);
        assert!(!cli.no_speech);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_overrides_saved_preferences() {
        let cli = Cli::parse_from([
            "spelldrill",
            "--mode",
            "test",
            "-r",
            "Round 2 - Home",
            "-n",
            "15",
            "-s",
            "10",
            "--strict",
        ]);
        let saved = Config {
            round: Some("Round 1 - Animals".into()),
            count: 5,
            ..Config::default()
        };

        let cfg = cli.apply(saved);
        assert_eq!(cfg.mode, Mode::Test);
        assert_eq!(cfg.round.as_deref(), Some("Round 2 - Home"));
        assert_eq!(cfg.count, 15);
        assert_eq!(cfg.seconds, 10);
        assert!(cfg.strict);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["spelldrill", "--mode", "exam"]).is_err());
    }

    #[test]
    fn test_load_bundled_and_file_words() {
        let cli = Cli::parse_from(["spelldrill"]);
        assert!(!cli.load_words().unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, r#"{"rounds": {}}"#).unwrap();
        let cli = Cli::parse_from(["spelldrill", "--words", path.to_str().unwrap()]);
        assert!(cli.load_words().is_err());

        std::fs::write(&path, r#"{"rounds": {"Mine": ["word"]}}"#).unwrap();
        let cli = Cli::parse_from(["spelldrill", "--words", path.to_str().unwrap()]);
        assert_eq!(cli.load_words().unwrap().round_names(), vec!["Mine"]);
    }
}
