//! Clap CLI definition: root struct and the `merge` subcommand.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`]. This avoids stringly-typed handling of the stdin
/// sentinel throughout the codebase.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Queue order controlling which twig a merge run dequeues first.
///
/// Mirrors [`twigmerge_core::QueueOrder`]; kept as a separate `clap`-facing
/// type so the core crate stays free of a CLI-argument-parsing dependency.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum QueueOrderArg {
    /// Process the smallest twig first (default).
    SmallestFirst,
    /// Process the largest twig first.
    LargestFirst,
}

impl From<QueueOrderArg> for twigmerge_core::QueueOrder {
    fn from(arg: QueueOrderArg) -> Self {
        match arg {
            QueueOrderArg::SmallestFirst => twigmerge_core::QueueOrder::SmallestFirst,
            QueueOrderArg::LargestFirst => twigmerge_core::QueueOrder::LargestFirst,
        }
    }
}

/// The `twigmerge` command-line tool: deduplicate and reconcile genealogical
/// twig fragments.
#[derive(Parser)]
#[command(name = "twigmerge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Maximum accepted size, in bytes, for any input file or stdin stream.
    #[arg(long, global = true, default_value_t = 64 * 1024 * 1024)]
    pub max_file_size: u64,

    /// Emit verbose diagnostics to stderr via the `log` crate.
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// All top-level subcommands exposed by the `twigmerge` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Run the Twig Merger over a graph and write the reconciled result.
    Merge {
        /// Path to a twig graph JSON file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        input: PathOrStdin,

        /// Path to write the merged graph JSON to. Defaults to stdout if
        /// omitted.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Minimum size of a structural match for two twigs to be merged.
        #[arg(long, default_value_t = 5)]
        minimum_match_size: usize,

        /// Which twig a run dequeues first: the smallest (default) or the
        /// largest.
        #[arg(long, value_enum, default_value = "smallest-first")]
        queue_order: QueueOrderArg,
    },
}
