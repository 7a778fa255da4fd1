use anyhow::anyhow;
use log::{debug, info};
use mysh::Interpreter;
use mysh::config::{Args, Mode};
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mode = args.mode().ok_or_else(|| anyhow!("Usage: mysh [batch-file]"))?;
    info!("starting mysh v{} in {:?} mode", env!("CARGO_PKG_VERSION"), mode);

    let mut sh = Interpreter::new(args.config());
    match mode {
        Mode::Interactive => sh.repl()?,
        Mode::Batch(path) => {
            let file = File::open(&path)
                .map_err(|_| anyhow!("Error: Cannot open file {}.", path.display()))?;
            sh.run_batch(BufReader::new(file))?;
        }
    }
    debug!("input finished");
    Ok(())
}
