pub mod builtin;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod redirect;
pub mod tokenize;
pub mod wildcard;

pub use builtin::{Flow, ShellState};
pub use config::Config;
pub use engine::Shell;
pub use error::ShellError;
