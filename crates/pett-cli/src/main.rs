// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

mod fetch;

use clap::{Args, Parser, Subcommand};
use pett_model::prelude::*;
use pett_solver::prelude::{SolveConfig, run};
use rand::RngCore;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const EXIT_IO: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "pett",
    version,
    about = "A hierarchical parallel genetic algorithm for post-enrolment course timetabling"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for a timetable for the given instance.
    Solve(SolveArgs),
    /// Evaluate a solution file against its instance.
    Check {
        instance: PathBuf,
        solution: PathBuf,
    },
    /// Download the ITC-2007 track-2 benchmark instances.
    Fetch { directory: Option<PathBuf> },
}

#[derive(Debug, Args)]
struct SolveArgs {
    instance: PathBuf,

    /// Number of islands.
    #[arg(long, default_value_t = 2)]
    islands: usize,

    /// Number of slaves per island.
    #[arg(long, default_value_t = 2)]
    slaves: usize,

    /// Minimum sub-population size.
    #[arg(long, default_value_t = 50)]
    minpop: usize,

    /// Maximum sub-population size; must exceed --minpop.
    #[arg(long, default_value_t = 75)]
    maxpop: usize,

    /// Cap on worker threads; clamped to the number of CPUs.
    #[arg(long)]
    maxprocs: Option<usize>,

    /// Time budget in minutes; 0 runs until a valid solution appears.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Stop only on an ideal (0, 0) solution instead of any valid one.
    #[arg(long)]
    ideal: bool,

    /// Seed for the random number generators.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the solution here instead of next to the instance.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Collect CPU profiling information in the given file.
    #[arg(long)]
    profile: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Solve(args) => solve(args),
        Command::Check { instance, solution } => check(&instance, &solution),
        Command::Fetch { directory } => fetch::fetch(directory.as_deref()),
    }
}

fn solve(args: SolveArgs) -> ExitCode {
    if args.islands < 2 {
        eprintln!("invalid value for --islands ({}): must be at least 2", args.islands);
        return ExitCode::from(EXIT_CONFIG);
    }
    if args.slaves < 2 {
        eprintln!("invalid value for --slaves ({}): must be at least 2", args.slaves);
        return ExitCode::from(EXIT_CONFIG);
    }
    if args.minpop < 2 {
        eprintln!("invalid value for --minpop ({}): must be at least 2", args.minpop);
        return ExitCode::from(EXIT_CONFIG);
    }
    if args.maxpop <= args.minpop {
        eprintln!(
            "value for --maxpop ({}) must exceed value for --minpop ({})",
            args.maxpop, args.minpop
        );
        return ExitCode::from(EXIT_CONFIG);
    }

    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    if let Some(maxprocs) = args.maxprocs {
        let clamped = maxprocs.min(cpus);
        let workers = args.islands * (args.slaves + 1) + 2;
        if workers > clamped {
            tracing::warn!(
                workers,
                maxprocs = clamped,
                "worker tasks exceed --maxprocs; the scheduler will oversubscribe"
            );
        }
    }
    if let Some(profile) = &args.profile {
        tracing::warn!(
            file = %profile.display(),
            "CPU profiling is handled by external tooling; --profile is recorded but unused"
        );
    }

    let seed = args.seed.unwrap_or_else(|| rand::rng().next_u64());
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.instance));

    let inst = match InstanceLoader::new().from_path(&args.instance) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("could not load {}: {}", args.instance.display(), e);
            return ExitCode::from(EXIT_IO);
        }
    };
    tracing::info!(
        instance = %args.instance.display(),
        events = inst.n_events(),
        rooms = inst.n_rooms(),
        students = inst.n_students(),
        seed,
        "instance loaded"
    );

    let config = SolveConfig {
        islands: args.islands,
        slaves: args.slaves,
        min_pop: args.minpop,
        max_pop: args.maxpop,
        timeout: match args.timeout {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        },
        ideal: args.ideal,
        seed,
    };

    let t0 = Instant::now();
    let (soln, value) = run(&inst, &config, interrupt_channel());
    tracing::info!(best = %value, runtime = ?t0.elapsed(), "search finished");

    let file = match File::create(&output) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("could not create {}: {}", output.display(), e);
            return ExitCode::from(EXIT_IO);
        }
    };
    if let Err(e) = soln.write(&mut BufWriter::new(file)) {
        eprintln!("could not write {}: {}", output.display(), e);
        return ExitCode::from(EXIT_IO);
    }
    tracing::info!(
        output = %output.display(),
        distance = soln.distance(),
        fitness = soln.fitness(),
        "solution written"
    );
    ExitCode::SUCCESS
}

fn check(instance: &Path, solution: &Path) -> ExitCode {
    let inst = match InstanceLoader::new().from_path(instance) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("could not load {}: {}", instance.display(), e);
            return ExitCode::from(EXIT_IO);
        }
    };

    let file = match File::open(solution) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("could not open {}: {}", solution.display(), e);
            return ExitCode::from(EXIT_IO);
        }
    };
    let soln = match inst.parse_solution(BufReader::new(file)) {
        Ok(soln) => soln,
        Err(e) => {
            eprintln!("could not parse {}: {}", solution.display(), e);
            return ExitCode::from(EXIT_IO);
        }
    };

    println!(
        "Distance to feasibility: {}\nSoft Constraint Violations: {}",
        soln.distance(),
        soln.fitness()
    );
    ExitCode::SUCCESS
}

/// `foo.tim` becomes `foo.sln`; anything else gets `.sln` appended.
fn default_output(instance: &Path) -> PathBuf {
    if instance.extension().is_some_and(|ext| ext == "tim") {
        instance.with_extension("sln")
    } else {
        let mut name = instance.as_os_str().to_owned();
        name.push(".sln");
        PathBuf::from(name)
    }
}

/// SIGINT/SIGTERM forwarded into the controller's select loop.
fn interrupt_channel() -> crossbeam_channel::Receiver<()> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let mut signals =
        signal_hook::iterator::Signals::new([signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM])
            .expect("failed to register signal listener");
    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            let _ = tx.try_send(());
        }
    });
    rx
}
