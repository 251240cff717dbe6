use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// The step of a recipe invocation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolution,
    Configure,
    Build,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution => write!(f, "resolution"),
            Self::Configure => write!(f, "configure"),
            Self::Build => write!(f, "build"),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum RcpError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("TOML Parsing Error: {0}")]
    Toml(#[from] Arc<toml::de::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Cache Error: {0}")]
    Cache(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("Parsing Error in {0}: {1}")]
    ParseError(&'static str, String),

    #[error("Generic Error: {0}")]
    Generic(String),

    #[error("Unknown package '{0}': not present in the package index")]
    UnknownPackage(String),

    #[error("Unknown version '{version}' of package '{name}' (available: {})", .available.join(", "))]
    UnknownVersion {
        name: String,
        version: String,
        available: Vec<String>,
    },

    #[error("Unknown option '{option}' for package '{package}' (known: {})", .known.join(", "))]
    UnknownOption {
        package: String,
        option: String,
        known: Vec<String>,
    },

    #[error("Invalid value '{value}' for option '{package}:{option}' (allowed: {})", .allowed.join(", "))]
    InvalidOptionValue {
        package: String,
        option: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Option override '{0}' targets a package that is not part of the dependency graph")]
    OptionTargetNotRequired(String),

    #[error("Dependency Error: {0}")]
    DependencyError(String),

    #[error("Package '{0}' is not installed in the local package store")]
    PackageMissing(String),

    #[error("Build environment setup failed: {0}")]
    BuildEnvError(String),

    #[error("Configure step failed{}: {detail}", exit_suffix(.status))]
    ConfigureFailed { status: Option<i32>, detail: String },

    #[error("Build step failed{}: {detail}", exit_suffix(.status))]
    BuildFailed { status: Option<i32>, detail: String },
}

/// `EX_DATAERR`. make and ninja report compile failures as 1 or 2, so this
/// never collides with a passed-through build status.
pub const RESOLUTION_EXIT_CODE: i32 = 65;

fn exit_suffix(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" (exit code {code})"),
        None => String::new(),
    }
}

impl RcpError {
    /// Which step of the recipe produced this error, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::UnknownPackage(_)
            | Self::UnknownVersion { .. }
            | Self::UnknownOption { .. }
            | Self::InvalidOptionValue { .. }
            | Self::OptionTargetNotRequired(_)
            | Self::DependencyError(_)
            | Self::PackageMissing(_) => Some(Phase::Resolution),
            Self::BuildEnvError(_) | Self::ConfigureFailed { .. } => Some(Phase::Configure),
            Self::BuildFailed { .. } => Some(Phase::Build),
            _ => None,
        }
    }

    /// Process exit code for this error. External tool exit codes pass through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigureFailed { status, .. } | Self::BuildFailed { status, .. } => {
                status.filter(|code| *code != 0).unwrap_or(1)
            }
            _ if self.phase() == Some(Phase::Resolution) => RESOLUTION_EXIT_CODE,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for RcpError {
    fn from(err: std::io::Error) -> Self {
        RcpError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for RcpError {
    fn from(err: reqwest::Error) -> Self {
        RcpError::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for RcpError {
    fn from(err: serde_json::Error) -> Self {
        RcpError::Json(Arc::new(err))
    }
}

impl From<toml::de::Error> for RcpError {
    fn from(err: toml::de::Error) -> Self {
        RcpError::Toml(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RcpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors_are_distinguishable_from_build_errors() {
        let unknown = RcpError::UnknownOption {
            package: "gsl-lite".to_string(),
            option: "shared".to_string(),
            known: vec![],
        };
        assert_eq!(unknown.phase(), Some(Phase::Resolution));
        assert_eq!(unknown.exit_code(), RESOLUTION_EXIT_CODE);

        // make exits 2 on a compile error
        let build = RcpError::BuildFailed {
            status: Some(2),
            detail: "undefined reference to `fftw_plan_dft_1d'".to_string(),
        };
        assert_eq!(build.phase(), Some(Phase::Build));
        assert_eq!(build.exit_code(), 2);
        assert_ne!(build.exit_code(), unknown.exit_code());
    }

    #[test]
    fn tool_failures_without_exit_code_map_to_one() {
        let err = RcpError::ConfigureFailed {
            status: None,
            detail: "terminated by signal".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "Configure step failed: terminated by signal");
    }

    #[test]
    fn unknown_version_lists_available() {
        let err = RcpError::UnknownVersion {
            name: "fftw".to_string(),
            version: "9.9.9".to_string(),
            available: vec!["3.3.9".to_string(), "3.3.10".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown version '9.9.9' of package 'fftw' (available: 3.3.9, 3.3.10)"
        );
    }
}
