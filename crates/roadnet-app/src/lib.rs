//! RoadNet Application
//!
//! A console shell around the editing session: commands stand in for
//! pointer gestures, prompts read the next input line, and the list view
//! is printed on request.

mod commands;
mod shell;
mod view;

pub use commands::{Command, CommandError, CommandHelp, CommandRegistry};
pub use shell::Shell;
pub use view::{write_lists, write_selection};
