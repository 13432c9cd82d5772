// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use log::LevelFilter;
use structopt::StructOpt;

use noh::RunError;

#[derive(StructOpt)]
#[structopt(
    name = "noh",
    about = "Parse and run a Noh script.",
    version = env!("CARGO_PKG_VERSION")
)]
struct Opt {
    /// Source file to run. Must have a `.noh` extension.
    #[structopt(name = "FILE", parse(from_os_str))]
    input: PathBuf,

    /// Print trace-level diagnostics while parsing and evaluating.
    #[structopt(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let opt = Opt::from_args();

    let level = if opt.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Warn
    };
    simple_logger::init_with_level(level.to_level().unwrap_or(log::Level::Warn))
        .expect("logger can only be initialized once");

    if opt.input.extension().and_then(|ext| ext.to_str()) != Some("noh") {
        eprintln!("error: expected a `.noh` file, got {:?}", opt.input);
        return ExitCode::FAILURE;
    }

    let source = match fs::read_to_string(&opt.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: could not read {:?}: {}", opt.input, err);
            return ExitCode::FAILURE;
        }
    };

    match noh::run_source_with_stdio(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Parse(err)) => {
            eprintln!("parse failed: {}", err);
            ExitCode::FAILURE
        }
        Err(RunError::Eval(err)) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
