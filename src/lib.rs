// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod reference;
pub mod runtime;
pub mod session;
pub mod store;
pub mod time_series;
pub mod track;
pub mod ui;

pub use error::{Error, Result};
