//! CXL memory simulator benchmarking CLI.
//!
//! This binary connects to the memory server and runs one workload per invocation:
//! 1. **Chase (default):** Initialize every line with the stride pattern, then measure
//!    pointer-chasing latency.
//! 2. **Exchange:** One WRITE and one READ at a fixed address (protocol smoke test).
//! 3. **Sweep / Bandwidth:** Sequential READ latency and write/read bandwidth.
//! 4. **Replay:** Replay an address trace file.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cxlbench_core::client::MemClient;
use cxlbench_core::common::BenchError;
use cxlbench_core::config::BenchConfig;
use cxlbench_core::stats::Report;
use cxlbench_core::workload::{self, ChaseReport, InitReport, PointerChase};
use cxlbench_core::{AddressSpace, Session};

#[derive(Parser, Debug)]
#[command(
    name = "cxlbench",
    author,
    version,
    about = "Latency and bandwidth benchmarks against a CXL memory simulator",
    long_about = "Drive READ/WRITE traffic against a remote CXL memory simulator.\n\nWithout a subcommand, initializes the whole address space and runs the pointer-chase latency test.\n\nExamples:\n  cxlbench\n  cxlbench --port 9999 chase --iterations 100000\n  cxlbench exchange --addr 0x1000\n  cxlbench --json replay traces/llm.trace"
)]
struct Cli {
    /// Memory server host (overrides the config file).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Memory server port (overrides the config file).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// JSON config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize memory with the stride pattern, then measure pointer-chasing latency.
    Chase {
        /// Number of dependent READs.
        #[arg(long)]
        iterations: Option<u64>,

        /// Skip the initialization pass (the space must already be initialized).
        #[arg(long)]
        skip_init: bool,
    },

    /// Write an ascending pattern to one line and read it back.
    Exchange {
        /// Line address (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_addr)]
        addr: Option<u64>,
    },

    /// Sequential READ latency sweep.
    Sweep {
        /// Number of READs.
        #[arg(long)]
        ops: Option<u64>,
    },

    /// Write then read the whole address space and report bandwidth.
    Bandwidth,

    /// Replay an address trace (`timestamp addr size op` per line).
    Replay {
        /// Trace file path.
        trace: PathBuf,
    },
}

/// Combined result of the default run, for JSON output.
#[derive(Serialize)]
struct ChaseRun<'a> {
    config: &'a BenchConfig,
    init: Option<&'a InitReport>,
    chase: &'a ChaseReport,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Installs the stderr log subscriber; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_addr(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn load_config(cli: &Cli) -> Result<BenchConfig, BenchError> {
    let mut config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    if let Some(host) = &cli.host {
        config.connection.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }
    match &cli.command {
        Some(Commands::Chase {
            iterations: Some(n),
            ..
        }) => config.workload.iterations = *n,
        Some(Commands::Exchange { addr: Some(addr) }) => config.workload.probe_addr = *addr,
        Some(Commands::Sweep { ops: Some(n) }) => config.workload.sweep_ops = *n,
        _ => {}
    }
    config.validate()?;
    Ok(config)
}

fn connect(config: &BenchConfig) -> Result<Session<TcpStream>, BenchError> {
    let conn = &config.connection;
    let session = Session::connect(&conn.host, conn.port, conn.nodelay)?;
    Ok(session)
}

fn run(cli: Cli) -> Result<(), BenchError> {
    let config = load_config(&cli)?;
    let space = config.address_space()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        None => cmd_chase(&config, &space, false, cli.json, &mut out),
        Some(Commands::Chase { skip_init, .. }) => {
            cmd_chase(&config, &space, skip_init, cli.json, &mut out)
        }
        Some(Commands::Exchange { .. }) => {
            let mut session = connect(&config)?;
            if !cli.json {
                writeln!(out, "Connected to CXL Memory Server")?;
            }
            let report = workload::single_exchange(
                &mut session,
                config.workload.probe_addr,
                space.line_size(),
            )?;
            emit(&report, cli.json, &mut out)
        }
        Some(Commands::Sweep { .. }) => {
            let mut client = MemClient::new(connect(&config)?, space.line_size());
            let report = workload::latency_sweep(&mut client, &space, config.workload.sweep_ops)?;
            emit(&report, cli.json, &mut out)
        }
        Some(Commands::Bandwidth) => {
            let mut client = MemClient::new(connect(&config)?, space.line_size());
            let report = workload::bandwidth(&mut client, &space)?;
            emit(&report, cli.json, &mut out)
        }
        Some(Commands::Replay { trace }) => {
            let file = File::open(&trace).map_err(|source| BenchError::Trace {
                path: trace.clone(),
                source,
            })?;
            let mut client = MemClient::new(connect(&config)?, space.line_size());
            if !cli.json {
                writeln!(out, "Replaying trace from {}", trace.display())?;
            }
            let report = workload::replay(&mut client, &space, BufReader::new(file));
            emit(&report, cli.json, &mut out)
        }
    }
}

/// Initializes the space (unless skipped) and runs the pointer-chase test.
///
/// An early-stopped chase still prints its partial results and is not an error.
fn cmd_chase(
    config: &BenchConfig,
    space: &AddressSpace,
    skip_init: bool,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), BenchError> {
    let mut session = connect(config)?;

    if !json {
        writeln!(out, "Connected to CXL Memory Server")?;
        writeln!(out, "Testing memory latency with pointer chasing pattern:")?;
        writeln!(out, "- Array size: {} bytes", space.size())?;
        writeln!(out, "- Stride: {} cache lines", config.memory.stride)?;
        writeln!(out, "- Iterations: {}", config.workload.iterations)?;
    }

    let init = if skip_init {
        None
    } else {
        if !json {
            writeln!(out, "\nInitializing memory with stride pattern...")?;
            out.flush()?;
        }
        Some(workload::initialize(&mut session, space, config.memory.stride)?)
    };

    if !json {
        writeln!(out, "Starting pointer chasing test...")?;
        out.flush()?;
    }
    let chase = PointerChase::new(*space, config.workload.iterations)
        .starting_at(config.workload.start_position)
        .run(&mut session);
    drop(session);

    if !chase.is_complete() {
        warn!(
            completed = chase.completed_iterations,
            requested = chase.requested_iterations,
            "pointer chase stopped early; reporting partial results"
        );
    }

    if json {
        let run = ChaseRun {
            config,
            init: init.as_ref(),
            chase: &chase,
        };
        serde_json::to_writer_pretty(&mut *out, &run).map_err(io::Error::other)?;
        writeln!(out)?;
        Ok(())
    } else {
        if let Some(init) = &init {
            init.write_text(out)?;
        }
        chase.write_text(out)?;
        Ok(())
    }
}

fn emit<R: Report>(report: &R, json: bool, out: &mut dyn Write) -> Result<(), BenchError> {
    if json {
        report.write_json(out)?;
    } else {
        report.write_text(out)?;
    }
    Ok(())
}
