use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use tmsim::{Description, ProgramLoader, ProgramManager, TuringMachine, ValidationMode};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Runs a single-tape Turing machine on a bi-infinite tape and prints the visited tape.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli machine.tm
  tmsim-cli --builtin 'Unary increment' --input 111
  cat machine.tm | tmsim-cli --json")]
struct Cli {
    /// Path to a machine description file (.tm).
    /// If not provided, the description is read from stdin.
    program_file: Option<PathBuf>,

    /// Run one of the embedded sample programs instead of a file
    #[clap(short, long, conflicts_with = "program_file")]
    builtin: Option<String>,

    /// List the embedded sample programs and exit
    #[clap(short, long)]
    list: bool,

    /// Replace the input line of the description
    #[clap(short, long)]
    input: Option<String>,

    /// Accept the Stay direction, duplicate rows and non-digit input
    #[clap(long)]
    permissive: bool,

    /// Stop with an error if the machine has not halted after this many steps
    #[clap(short, long)]
    max_steps: Option<u64>,

    /// Print a JSON report instead of the bare tape content
    #[clap(long)]
    json: bool,
}

/// The result of a successful run, printed with `--json`.
#[derive(Debug, Serialize)]
struct RunReport {
    output: String,
    steps: u64,
    final_state: usize,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout only ever carries the tape content.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    if cli.list {
        for (index, name) in ProgramManager::list_names().iter().enumerate() {
            println!("{index}: {name}");
        }
        return Ok(());
    }

    let mut description = load_description(cli)?;
    if let Some(input) = &cli.input {
        description.input = input.trim().to_string();
    }

    let mode = if cli.permissive {
        ValidationMode::Permissive
    } else {
        ValidationMode::Strict
    };
    debug!(?mode, states = description.num_states, "building machine");

    let mut machine = TuringMachine::from_description(&description, mode)
        .context("invalid machine description")?;

    let output = match cli.max_steps {
        Some(limit) => run_bounded(&mut machine, limit)?,
        None => machine.run()?,
    };
    info!(steps = machine.step_count(), state = machine.state(), "machine halted");

    if cli.json {
        let report = RunReport {
            output,
            steps: machine.step_count(),
            final_state: machine.state(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{output}");
    }

    Ok(())
}

fn load_description(cli: &Cli) -> Result<Description> {
    if let Some(name) = &cli.builtin {
        return Ok(ProgramManager::get_by_name(name)?.description.clone());
    }

    if let Some(path) = &cli.program_file {
        return ProgramLoader::load_program(path)
            .with_context(|| format!("failed to load {}", path.display()));
    }

    if atty::is(atty::Stream::Stdin) {
        bail!("no description given: pass a file, use --builtin NAME, or pipe one via stdin");
    }

    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("failed to read description from stdin")?;

    ProgramLoader::load_program_from_string(&content).context("failed to parse description")
}

/// Runs `machine` from a fresh tape, giving up after `limit` steps.
fn run_bounded(machine: &mut TuringMachine, limit: u64) -> Result<String> {
    machine.reset();

    while !machine.is_halted() {
        if machine.step_count() >= limit {
            bail!(
                "machine did not halt within {limit} steps (state {})",
                machine.state()
            );
        }
        machine.step()?;
    }

    Ok(machine.output()?)
}
