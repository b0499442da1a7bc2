pub mod commands;

pub use commands::{Cli, OutputFormat, execute, run};
