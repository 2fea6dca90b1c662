// dix-cli: shared utilities for the command-line tools.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;

use clap::ValueEnum;
use dix_fst::{BasicTransducer, FstError};
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "dixcomp=info,dix_compiler=warn";

/// Filter used with `--verbose` when `RUST_LOG` is not set.
const VERBOSE_FILTER: &str = "debug";

/// Output format of a compiled transducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Weighted VFST binary
    #[default]
    Vfst,
    /// AT&T tab-separated text
    Att,
}

/// Error while writing a transducer.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Fst(#[from] FstError),
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Serialize `t` in `format` into `out`.
pub fn write_transducer<W: Write>(
    t: &BasicTransducer,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), WriteError> {
    match format {
        OutputFormat::Vfst => out.write_all(&dix_fst::vfst::write_weighted(t)?)?,
        OutputFormat::Att => dix_fst::att::write_att(t, out)?,
    }
    out.flush()?;
    Ok(())
}

/// Write `t` to `path`, or to stdout when `path` is `None`.
pub fn write_output(
    t: &BasicTransducer,
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<(), WriteError> {
    match path {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_transducer(t, format, &mut out)
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write_transducer(t, format, &mut out)
        }
    }
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}
