//! Educational assembly simulator CLI.
//!
//! This binary is the terminal front end for the simulator core. It
//! performs:
//! 1. **Run:** assemble and execute a program file, echoing each executed
//!    instruction, the phase outcome, and the run statistics.
//! 2. **Check:** assemble a program without executing it.
//! 3. **Phases:** list the builtin curriculum.
//!
//! Set `RUST_LOG=tiersim_core=debug` to see the core's tracing output.

use std::path::PathBuf;
use std::{fs, process};

use clap::{Parser, Subcommand, ValueEnum};
use tiersim_core::phase::builtin_curriculum;
use tiersim_core::{
    Config, Engine, InstructionEvent, Observer, PhaseEvent, PhaseOutcome, RunOutcome,
};

#[derive(Parser, Debug)]
#[command(
    name = "tiersim",
    version,
    about = "Educational assembly simulator with a tiered memory hierarchy",
    long_about = "Assemble and run tiny assembly programs against registers, a cache, RAM, \
a disk, and I/O ports.\n\nExamples:\n  tiersim run program.asm\n  tiersim run program.asm --input 7 --stats json\n  tiersim check program.asm\n  tiersim phases"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble and execute a program file.
    Run {
        /// Program text file.
        file: PathBuf,

        /// Value to queue on input port IN0 (repeatable, consumed in order).
        #[arg(short, long = "input", value_name = "VALUE", allow_negative_numbers = true)]
        inputs: Vec<i64>,

        /// Override the configured step limit.
        #[arg(long)]
        limit: Option<u64>,

        /// Machine configuration as a JSON file.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Statistics output format.
        #[arg(long, value_enum, default_value = "text")]
        stats: StatsFormat,

        /// Suppress the per-instruction execution log.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Assemble a program file without executing it.
    Check {
        /// Program text file.
        file: PathBuf,
    },

    /// List the builtin phase curriculum.
    Phases,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatsFormat {
    /// Sectioned text report.
    Text,
    /// JSON snapshot of the counters.
    Json,
    /// No statistics output.
    None,
}

/// Observer that echoes engine activity to stdout, standing in for the
/// original 3D scene and log panel.
#[derive(Debug, Default)]
struct PrintObserver;

impl Observer for PrintObserver {
    fn instruction_executed(&mut self, event: &InstructionEvent) {
        println!(
            "[line {:>3}] {} {:<18} | {}",
            event.line,
            event.opcode,
            event.args.join(", "),
            event.effect
        );
    }

    fn phase_completed(&mut self, event: &PhaseEvent) {
        println!(
            "phase {} complete: +{} points in {} cycles",
            event.phase, event.score_delta, event.cycles
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Commands::Run {
            file,
            inputs,
            limit,
            config,
            stats,
            quiet,
        } => cmd_run(&file, &inputs, limit, config.as_deref(), stats, quiet),
        Commands::Check { file } => cmd_check(&file),
        Commands::Phases => cmd_phases(),
    }
}

fn read_source(file: &std::path::Path) -> String {
    match fs::read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: cannot read {}: {err}", file.display());
            process::exit(1);
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    let text = read_source(path);
    match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: bad config {}: {err}", path.display());
            process::exit(1);
        }
    }
}

fn cmd_run(
    file: &std::path::Path,
    inputs: &[i64],
    limit: Option<u64>,
    config_path: Option<&std::path::Path>,
    stats: StatsFormat,
    quiet: bool,
) {
    let mut config = load_config(config_path);
    if let Some(limit) = limit {
        config.step_limit = Some(limit);
    }

    let observer: Box<dyn Observer> = if quiet {
        Box::new(tiersim_core::NoopObserver)
    } else {
        Box::new(PrintObserver)
    };
    let mut engine = Engine::with_observer(config, observer);

    let source = read_source(file);
    if let Err(err) = engine.load_program(&source) {
        eprintln!("assembly error: {err}");
        process::exit(1);
    }
    for &value in inputs {
        let _ = engine.push_input(0, value);
    }

    match engine.run() {
        RunOutcome::Completed => {
            println!("run completed in {} cycles", engine.stats().cycles);
            report_phase(&engine);
        }
        RunOutcome::Faulted => {
            if let Some(fault) = engine.last_fault() {
                eprintln!("run faulted: {fault}");
            }
            print_stats(&engine, stats);
            process::exit(1);
        }
        RunOutcome::StepLimitReached => {
            eprintln!(
                "stopped: step limit reached after {} cycles (raise with --limit)",
                engine.stats().cycles
            );
        }
        RunOutcome::Idle => {
            eprintln!("nothing to run");
        }
    }

    print_stats(&engine, stats);
}

fn report_phase(engine: &Engine) {
    let Some(outcome) = engine.last_phase_outcome() else {
        return;
    };
    match outcome {
        PhaseOutcome::Completed { reward, bonus } => {
            println!(
                "phase cleared: reward {reward}, efficiency bonus {bonus}, total score {}",
                engine.score()
            );
        }
        PhaseOutcome::MissingInstructions(missing) => {
            let names: Vec<&str> = missing.iter().map(|op| op.mnemonic()).collect();
            println!(
                "phase not cleared: required instructions missing: {}",
                names.join(", ")
            );
        }
        PhaseOutcome::NotYetComplete => {
            if let Some(phase) = engine.current_phase() {
                println!("phase not yet complete: {}", phase.objective);
            }
        }
        PhaseOutcome::AlreadyCleared => println!("phase already cleared"),
        PhaseOutcome::CurriculumComplete => println!("all phases complete"),
    }
}

fn print_stats(engine: &Engine, format: StatsFormat) {
    match format {
        StatsFormat::Text => engine.stats().print(),
        StatsFormat::Json => match serde_json::to_string_pretty(&engine.stats()) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("error: cannot serialize stats: {err}"),
        },
        StatsFormat::None => {}
    }
}

fn cmd_check(file: &std::path::Path) {
    let source = read_source(file);
    match tiersim_core::assemble(&source) {
        Ok(program) => println!(
            "ok: {} instructions over {} source lines",
            program.instruction_count(),
            program.line_count()
        ),
        Err(err) => {
            eprintln!("assembly error: {err}");
            process::exit(1);
        }
    }
}

fn cmd_phases() {
    for phase in builtin_curriculum() {
        let required: Vec<&str> = phase.required.iter().map(|op| op.mnemonic()).collect();
        println!("{:>2}. {} ({} pts)", phase.id, phase.title, phase.reward);
        println!("    objective: {}", phase.objective);
        if !required.is_empty() {
            println!("    requires:  {}", required.join(", "));
        }
    }
}
