pub mod setting;
pub mod config;

pub use setting::Settings;
pub use config::{Config, MatchPolicy};
