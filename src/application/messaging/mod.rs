//! Message handling - Recognizing commands in user input

pub mod parser;

pub use parser::{CommandParser, ParsedCommand};
