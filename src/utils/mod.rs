pub mod input;

pub use input::{describe_input, open_input};
