pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod state;
pub mod store;
pub mod tasks;
pub mod users;

pub use app::{build_app, serve};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;
