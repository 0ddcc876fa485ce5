mod app;
mod control;
mod logging;
mod options;
mod persistence;

pub use app::{run_app, AppError};
