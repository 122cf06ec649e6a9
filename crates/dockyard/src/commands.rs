// ABOUTME: Shell commands invokable from the presentation layer or over the message bus
// ABOUTME: Commands parse from and display as short kebab-case lines, e.g. "change-layout FourPane"

use std::fmt;
use std::str::FromStr;

/// Message kind name for commands sent to the shell over the bus
pub const COMMAND_MESSAGE: &str = "command";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    ChangeLayout(String),
    ResetLayout,
    SaveLayout,
    LoadLayout,
    OpenWindow(String),
    PopulateCategory(String),
    ToggleTheme,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'")]
    Unknown(String),

    #[error("Command '{0}' requires an argument")]
    MissingArgument(&'static str),
}

impl FromStr for ShellCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, char::is_whitespace);
        let name = parts.next().filter(|n| !n.is_empty()).ok_or(ParseCommandError::Empty)?;
        let argument = parts.next().map(str::trim).filter(|a| !a.is_empty());

        let required = |command: &'static str| {
            argument
                .map(str::to_string)
                .ok_or(ParseCommandError::MissingArgument(command))
        };

        match name {
            "change-layout" => Ok(Self::ChangeLayout(required("change-layout")?)),
            "reset-layout" => Ok(Self::ResetLayout),
            "save-layout" => Ok(Self::SaveLayout),
            "load-layout" => Ok(Self::LoadLayout),
            "open-window" => Ok(Self::OpenWindow(required("open-window")?)),
            "populate" => Ok(Self::PopulateCategory(required("populate")?)),
            "toggle-theme" => Ok(Self::ToggleTheme),
            "exit" | "quit" => Ok(Self::Exit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChangeLayout(kind) => write!(f, "change-layout {kind}"),
            Self::ResetLayout => f.write_str("reset-layout"),
            Self::SaveLayout => f.write_str("save-layout"),
            Self::LoadLayout => f.write_str("load-layout"),
            Self::OpenWindow(id) => write!(f, "open-window {id}"),
            Self::PopulateCategory(category) => write!(f, "populate {category}"),
            Self::ToggleTheme => f.write_str("toggle-theme"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "change-layout FourPane".parse(),
            Ok(ShellCommand::ChangeLayout("FourPane".into()))
        );
        assert_eq!("  exit ".parse(), Ok(ShellCommand::Exit));
        assert_eq!("quit".parse(), Ok(ShellCommand::Exit));
        assert_eq!(
            "populate Developer Tools".parse(),
            Ok(ShellCommand::PopulateCategory("Developer Tools".into()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<ShellCommand>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "change-layout".parse::<ShellCommand>(),
            Err(ParseCommandError::MissingArgument("change-layout"))
        );
        assert_eq!(
            "fly".parse::<ShellCommand>(),
            Err(ParseCommandError::Unknown("fly".into()))
        );
    }

    #[test]
    fn test_display_parses_back() {
        let commands = [
            ShellCommand::ChangeLayout("Full".into()),
            ShellCommand::ResetLayout,
            ShellCommand::SaveLayout,
            ShellCommand::LoadLayout,
            ShellCommand::OpenWindow("output".into()),
            ShellCommand::PopulateCategory("Tools".into()),
            ShellCommand::ToggleTheme,
            ShellCommand::Exit,
        ];
        for command in commands {
            assert_eq!(command.to_string().parse(), Ok(command));
        }
    }
}
