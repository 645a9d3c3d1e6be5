pub mod commands;
pub mod console;
pub mod sitemap;
pub mod state;

pub use commands::{Cli, Command};
pub use state::AppState;
