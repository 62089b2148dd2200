//! src/error.rs
//! Failure taxonomy and the exit codes scripts depend on.

use std::path::PathBuf;
use thiserror::Error;

pub const EXIT_OK: i32 = 0;
pub const EXIT_UNEXPECTED: i32 = 1;
pub const EXIT_TOOL_ACQUISITION: i32 = 2;
pub const EXIT_NO_INPUT: i32 = 3;
pub const EXIT_ARCH: i32 = 4;
pub const EXIT_MISSING_DEPS: i32 = 5;
pub const EXIT_TOOL_FAILED: i32 = 6;

/// Exit codes that signal a handled outcome. Anything else is a fault.
pub const KNOWN_EXIT_CODES: [i32; 6] = [
    EXIT_OK,
    EXIT_TOOL_ACQUISITION,
    EXIT_NO_INPUT,
    EXIT_ARCH,
    EXIT_MISSING_DEPS,
    EXIT_TOOL_FAILED,
];

/// A required host command and the distro package that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub command: String,
    pub package: String,
}

#[derive(Debug, Error)]
pub enum Failure {
    /// The user answered "no" to the initial confirmation.
    #[error("no image was built")]
    Declined,

    #[error("missing required tools: {}", display_commands(.0))]
    MissingDependencies(Vec<MissingTool>),

    #[error("no file matching 'stacher*.deb' in {}", .0.display())]
    NoInput(PathBuf),

    #[error("more than one file matches 'stacher*.deb': {}", display_paths(.0))]
    AmbiguousInput(Vec<PathBuf>),

    #[error("host architecture '{0}' is not supported")]
    UnsupportedHost(String),

    #[error("package is built for '{declared}' but this host is '{host}'")]
    ArchMismatch { declared: String, host: String },

    #[error("{reason}")]
    ToolAcquisition { reason: String, declined: bool },

    #[error("packaging tool failed: {0}")]
    ToolFailed(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Failure {
    pub fn acquisition(reason: impl Into<String>) -> Self {
        Failure::ToolAcquisition { reason: reason.into(), declined: false }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Failure::Declined => EXIT_OK,
            Failure::ToolAcquisition { .. } => EXIT_TOOL_ACQUISITION,
            Failure::NoInput(_) | Failure::AmbiguousInput(_) => EXIT_NO_INPUT,
            Failure::UnsupportedHost(_) | Failure::ArchMismatch { .. } => EXIT_ARCH,
            Failure::MissingDependencies(_) => EXIT_MISSING_DEPS,
            Failure::ToolFailed(_) => EXIT_TOOL_FAILED,
            Failure::Unexpected(_) => EXIT_UNEXPECTED,
        }
    }

    /// Expected aborts are reported without error framing.
    pub fn is_user_abort(&self) -> bool {
        matches!(
            self,
            Failure::Declined | Failure::ToolAcquisition { declined: true, .. }
        )
    }
}

impl From<std::io::Error> for Failure {
    fn from(e: std::io::Error) -> Self {
        Failure::Unexpected(e.into())
    }
}

pub fn is_known_exit_code(code: i32) -> bool {
    KNOWN_EXIT_CODES.contains(&code)
}

fn display_commands(tools: &[MissingTool]) -> String {
    tools
        .iter()
        .map(|t| t.command.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
