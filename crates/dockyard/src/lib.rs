// ABOUTME: Shell layer of dockyard composing layout, docking, theming and messaging
// ABOUTME: Hosts the shell controller, shell commands, built-in factories, config loading and CLI

pub mod builtin;
pub mod cli;
pub mod commands;
pub mod config;
pub mod shell;


pub use commands::{COMMAND_MESSAGE, ParseCommandError, ShellCommand};
pub use shell::{ShellController, ShellExtension, ShellServices};
