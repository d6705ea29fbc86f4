//! Texpack error handling.
//!
//! Every failure produced by the crate is a [`ConfigError`]. Selecting an
//! unknown package or re-registering a name are not errors at all. What
//! remains is structural validation of package definitions, dynamic requests
//! that cannot be honored, user option overrides that name nothing and
//! settings-file loading.
//!
//! Errors render through `miette`, with a stable `texpack::<suffix>` code and a
//! help line where one is useful.
//!
//! # Construction
//!
//! - Use the struct variants directly for selection and option errors.
//! - Use [`malformed!`](crate::malformed) for structural problems found while
//!   building a package definition.
//!
//! ```rust
//! use texpack::malformed;
//! let err = malformed!("ams", "parser target must not be empty");
//! assert_eq!(err.category(), texpack::errors::ErrorCategory::Validation);
//! ```

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// The single error type for package registration, selection and merging.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A name that must identify something was empty or blank.
    #[error("empty {what} name")]
    EmptyName { what: &'static str },

    /// A package definition failed structural validation.
    #[error("malformed package '{entry}': {reason}")]
    MalformedEntry { entry: String, reason: String },

    /// A dynamic extension asked for a package the registry does not hold.
    #[error("unknown package '{name}'")]
    UnknownPackage { name: String },

    /// A selected package extends a different parser.
    #[error("package '{name}' targets parser '{target}', expected one of {accepted:?}")]
    WrongParser {
        name: String,
        target: String,
        accepted: Vec<String>,
    },

    /// A user override named an option that has no declared default.
    #[error("invalid option '{path}'")]
    UnknownOption { path: String },

    /// A settings file could not be read.
    #[error("failed to read settings file '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings file was read but could not be decoded.
    #[error("invalid settings file '{}': {message}", .path.display())]
    Settings { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Package definitions rejected at construction time.
    Validation,
    /// Package selection or dynamic extension failures.
    Selection,
    /// User option overrides.
    Options,
    /// Settings-file access and decoding.
    Io,
}

impl ConfigError {
    /// Get the error category for test assertions and exit codes
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyName { .. } | Self::MalformedEntry { .. } => ErrorCategory::Validation,
            Self::UnknownPackage { .. } | Self::WrongParser { .. } => ErrorCategory::Selection,
            Self::UnknownOption { .. } => ErrorCategory::Options,
            Self::Io { .. } | Self::Settings { .. } => ErrorCategory::Io,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::EmptyName { .. } => "empty_name",
            Self::MalformedEntry { .. } => "malformed_entry",
            Self::UnknownPackage { .. } => "unknown_package",
            Self::WrongParser { .. } => "wrong_parser",
            Self::UnknownOption { .. } => "unknown_option",
            Self::Io { .. } => "io",
            Self::Settings { .. } => "settings",
        }
    }

    fn help_text(&self) -> Option<String> {
        match self {
            Self::EmptyName { what } => Some(format!("give the {what} a non-empty name")),
            Self::MalformedEntry { .. } => {
                Some("fix the package definition; it cannot be merged as written".into())
            }
            Self::UnknownPackage { .. } => {
                Some("register the package before requiring it dynamically".into())
            }
            Self::WrongParser { accepted, .. } => Some(format!(
                "select packages written for {}",
                accepted.join(", ")
            )),
            Self::UnknownOption { .. } => {
                Some("only options declared by a selected package can be overridden".into())
            }
            Self::Io { .. } => None,
            Self::Settings { .. } => {
                Some("settings files are YAML (.yaml, .yml) or JSON (.json)".into())
            }
        }
    }
}

impl Diagnostic for ConfigError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("texpack::{}", self.code_suffix())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_text()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}

/// Constructs a [`ConfigError::MalformedEntry`] with a formatted reason.
#[macro_export]
macro_rules! malformed {
    ($entry:expr, $($fmt:tt)+) => {
        $crate::errors::ConfigError::MalformedEntry {
            entry: ($entry).to_string(),
            reason: format!($($fmt)+),
        }
    };
}

/// Rejects empty or whitespace-only names.
pub(crate) fn require_name(name: &str, what: &'static str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyName { what });
    }
    Ok(())
}

/// Prints a ConfigError with full miette diagnostics
pub fn print_error(error: ConfigError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
