pub mod cli;
pub mod credentials;
pub mod firestore;
pub mod load_config;
pub mod rtdb;

pub use cli::{run, Cli, Commands};
