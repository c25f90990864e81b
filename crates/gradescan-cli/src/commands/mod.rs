//! CLI command definitions and handlers.

pub mod check;
pub mod crop;
pub mod rectify;

use clap::{Parser, Subcommand};

/// gradescan - scanned-page quality checks and region cropping
#[derive(Parser)]
#[command(name = "gradescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, thresholds, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Score pages for blur
    Check(check::CheckArgs),
    /// Crop regions out of a page into separate JPEGs
    Crop(crop::CropArgs),
    /// Straighten a photographed page from its corners
    Rectify(rectify::RectifyArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every page is usable.
    Success,
    /// At least one page scored `poor`.
    IssuesFound,
    /// The command failed.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::SUCCESS,
            ExitCode::IssuesFound => Self::from(1),
            ExitCode::Error => Self::from(2),
        }
    }
}
