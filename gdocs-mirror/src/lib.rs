pub mod cli;
pub mod credentials;
pub mod drive;
pub mod load_config;
pub mod oauth;

pub use cli::{run, Cli, Commands};
