// Library surface for headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod normalize;
pub mod quiz;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod timer;
pub mod ui;
pub mod words;

pub use app::App;
pub use quiz::Quiz;
