// dixcomp: Compile an lttoolbox XML dictionary into a weighted transducer.
//
// Usage:
//   dixcomp [OPTIONS] <DIRECTION> <INPUT>
//
// DIRECTION is `lr` or `rl`. The transducer is written in weighted VFST
// format (or AT&T text with `-f att`) to the file given by `-o`, or to stdout.
// Set RUST_LOG to control diagnostics on stderr.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use dix_cli::{OutputFormat, fatal, init_logging, write_output};
use dix_compiler::{CompilerOptions, Direction, DixCompiler};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "dixcomp")]
#[command(about = "Compile lttoolbox XML dictionaries into weighted transducers")]
struct Args {
    /// Compilation direction: lr or rl
    direction: Direction,

    /// Dictionary file (.dix)
    input: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Vfst)]
    format: OutputFormat,

    /// Keep only entries of this alternative (alt attribute)
    #[arg(short, long)]
    alt: Option<String>,

    /// Keep only entries of this variant (v attribute)
    #[arg(long)]
    var: Option<String>,

    /// Keep only entries of this left variant (vl attribute)
    #[arg(short = 'l', long)]
    var_left: Option<String>,

    /// Keep only entries of this right variant (vr attribute)
    #[arg(short = 'r', long)]
    var_right: Option<String>,

    /// Keep morpheme boundaries (<m/>) as `>` symbols
    #[arg(short = 'm', long)]
    keep_boundaries: bool,

    /// Write the transducer as built, without state reduction
    #[arg(long)]
    no_minimize: bool,

    /// Debug logging when RUST_LOG is not set
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            direction: self.direction,
            alt: self.alt.clone(),
            var: self.var.clone(),
            var_left: self.var_left.clone(),
            var_right: self.var_right.clone(),
            keep_boundaries: self.keep_boundaries,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let started = Instant::now();
    let mut compiler = DixCompiler::new(args.compiler_options());
    compiler
        .compile_file(&args.input)
        .unwrap_or_else(|e| fatal(&e.to_string()));
    debug!(
        paradigms = compiler.registry().len(),
        states = compiler.root().state_count(),
        arcs = compiler.root().transition_count(),
        "compiled {}",
        args.input.display()
    );

    let fst = if args.no_minimize {
        compiler.root().clone()
    } else {
        compiler.transducer()
    };
    info!(
        states = fst.state_count(),
        arcs = fst.transition_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "compiled {} ({})",
        args.input.display(),
        args.direction
    );

    write_output(&fst, args.format, args.output.as_deref())
        .unwrap_or_else(|e| fatal(&format!("failed to write transducer: {e}")));
}
