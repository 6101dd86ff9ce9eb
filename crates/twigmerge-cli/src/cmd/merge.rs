//! Implementation of `twigmerge merge <file>`.
//!
//! Reads a twig graph JSON file, runs the Twig Merger over it, and writes the
//! reconciled graph to the requested output (or stdout). Skipped-pair and
//! candidate warnings are logged at `warn` level via the `log` crate; the
//! core library itself never depends on a logging framework.
use std::io::Write as _;

use twigmerge_core::{MergerConfig, TwigFile, TwigMerger};

use crate::cli::{PathOrStdin, QueueOrderArg};
use crate::error::CliError;
use crate::io::read_input;

/// Runs the `merge` command.
///
/// # Errors
///
/// - Exit code 2 — the input could not be read or parsed as a `TwigFile`.
/// - Exit code 1 — the input or merged graph violated a structural
///   invariant ([`twigmerge_core::GraphError`]).
pub fn run(
    input: &PathOrStdin,
    output: Option<&std::path::Path>,
    minimum_match_size: usize,
    queue_order: QueueOrderArg,
    max_file_size: u64,
) -> Result<(), CliError> {
    let raw = read_input(input, max_file_size)?;
    let mut graph = TwigFile::load_graph(&raw)?;

    let config = MergerConfig {
        minimum_match_size,
        queue_order: queue_order.into(),
    };
    let mut merger = TwigMerger::new(config);
    let warnings = merger.run(&mut graph);

    for warning in &warnings {
        log::warn!("{warning}");
    }

    let merged = TwigFile::from_graph(&graph);
    let json = merged.to_json()?;

    write_output(output, &json)
}

fn write_output(output: Option<&std::path::Path>, json: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, json.as_bytes()).map_err(|e| CliError::OutputWriteError {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }),
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(json.as_bytes())
                .and_then(|()| out.write_all(b"\n"))
                .map_err(|e| CliError::IoError {
                    source: "stdout".to_owned(),
                    detail: e.to_string(),
                })
        }
    }
}
