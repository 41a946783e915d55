//! Error kinds raised while building and running parsers.

use thiserror::Error;

/// The schema itself is inconsistent. Raised while a parser is constructed,
/// never while scanning input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },

    #[error("short name '{short}' of '{name}' must be one character other than a digit or '-'")]
    InvalidShort { name: String, short: String },

    #[error("option '{name}' is declared more than once")]
    DuplicateOption { name: String },

    #[error("flag conflict: {flag} maps to both option '{existing}' and option '{option}'")]
    DuplicateOptionFlag {
        flag: String,
        existing: String,
        option: String,
    },

    #[error("command '{name}' is declared more than once")]
    DuplicateCommand { name: String },

    #[error("command conflict: '{token}' maps to both command '{existing}' and command '{command}'")]
    DuplicateCommandToken {
        token: String,
        existing: String,
        command: String,
    },

    #[error("token conflict: '{token}' is both a flag of option '{option}' and a token of command '{command}'")]
    FlagCommandConflict {
        token: String,
        option: String,
        command: String,
    },
}

/// The input tokens do not fit the registered schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("'{token}' is not a valid sub-command of '{parent}'")]
    InvalidSubcommand { token: String, parent: String },

    #[error("invalid option '{flag}' for '{command}'")]
    InvalidOption { flag: String, command: String },
}

/// The caller used the parser API out of order or with the wrong types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("parser '{parser}' has not completed a scan yet")]
    NotParsed { parser: String },

    #[error("value of '{name}' is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    /// The failure was already printed (error text followed by help output).
    /// Carries no message; top-level handlers must print nothing for it.
    #[error("")]
    Reported,

    #[error(transparent)]
    Handler(anyhow::Error),
}

impl Error {
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Reported)
    }

    /// Convert a handler failure back into a library error.
    ///
    /// Handlers that bubble up a `cmdflow::Error` (for example the marker
    /// from a nested `run`) keep its kind; anything else becomes `Handler`.
    pub fn from_handler(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(inner) => inner,
            Err(other) => Self::Handler(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
