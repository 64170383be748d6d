//! User intents parsed from terminal input lines.

use shared::{domain::ProfileField, error::EditError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    Edit { field: ProfileField, value: String },
    Sync,
    Submit,
    Back,
    Show,
    Status,
    Help,
    Quit,
}

impl UserIntent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Edit { .. } => "edit",
            Self::Sync => "sync",
            Self::Submit => "submit",
            Self::Back => "back",
            Self::Show => "show",
            Self::Status => "status",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}`; type `help` for the list")]
    UnknownCommand(String),
    #[error("`set` needs a field name, e.g. `set age 45`")]
    MissingField,
    #[error(transparent)]
    Field(#[from] EditError),
}

pub const HELP: &str = "\
Commands:
  set <field> [value]   edit age, bmi, bp, sugar or lifestyle (no value clears it)
  sync                  read the profile from the wearable
  submit                run the clinical analysis
  back                  return to the input form
  show                  print the current view
  status                probe the analysis service
  help                  show this list
  quit                  exit";

pub fn parse(line: &str) -> Result<UserIntent, CommandError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "set" | "edit" => {
            let (name, value) = match rest.split_once(char::is_whitespace) {
                Some((name, value)) => (name, value.trim()),
                None => (rest, ""),
            };
            if name.is_empty() {
                return Err(CommandError::MissingField);
            }
            Ok(UserIntent::Edit {
                field: name.parse()?,
                value: value.to_string(),
            })
        }
        "sync" => Ok(UserIntent::Sync),
        "submit" | "analyze" | "run" => Ok(UserIntent::Submit),
        "back" | "refine" => Ok(UserIntent::Back),
        "show" => Ok(UserIntent::Show),
        "status" | "health" => Ok(UserIntent::Status),
        "help" | "?" => Ok(UserIntent::Help),
        "quit" | "exit" => Ok(UserIntent::Quit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}
