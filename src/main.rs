//! Driver loop: clap CLI, tracing setup, SIGINT handling, and the
//! per-benchmark `DiffEngine` run — grounded on `diff-main.cpp`'s
//! `main()`/`run_func`/`run_perf`/`run_boot`/`run_kernel` dispatch, collapsed
//! here into one loop parameterized by `ImageCode` since the SoC variant and
//! terminal PC are the only things that actually differ between them.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hitd::cli::{wave_dir, Cli};
use hitd::cpu::Interpreter;
use hitd::diff::{DiffEngine, SimStatus};
use hitd::dut::ShadowDut;
use hitd::error::HarnessError;
use hitd::ftrace::Ftracer;
use hitd::loader;
use hitd::soc::DualSoc;

/// Process-wide SIGINT flag, the one piece of global mutable state the
/// source's `sim_status` equivalent needs: the handler itself must not do
/// anything beyond a relaxed store, per §5's "no interrupt-unsafe work in
/// the handler".
static SIM_INT: AtomicBool = AtomicBool::new(false);

/// Installs the SIGINT handler via `ctrlc`, the source's single
/// process-wide handler registered once at startup, re-expressed with a
/// well-known signal-registration crate instead of a hand-rolled
/// `libc::signal` call (§5).
fn install_sigint_handler() -> Result<(), HarnessError> {
    ctrlc::set_handler(|| SIM_INT.store(true, Ordering::SeqCst))
        .map_err(|e| HarnessError::Other(e.to_string()))
}

fn init_tracing(level: hitd::cli::LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true)
        .with_target(true)
        .init();
}

/// Setup and the per-benchmark loop, returning the exit code rather than
/// calling `std::process::exit` directly so the `?`-propagated
/// `HarnessError`s stay testable and `main` is the only place that touches
/// the process boundary.
fn run(cli: &Cli) -> Result<i32, HarnessError> {
    let wave_dir = wave_dir(cli);
    tracing::debug!(target: "ref", dir = %wave_dir.display(), "wave output directory resolved");

    let image = loader::load_image(&cli.image)?;
    let symbols = match &cli.symbols {
        Some(path) => loader::load_symbols(path)?,
        None => Vec::new(),
    };

    let mut soc = DualSoc::new(cli.image_code.soc_variant(), &image);
    let mut engine = DiffEngine::new(
        ShadowDut::new(),
        Interpreter::new(),
        Ftracer::new(symbols),
        cli.image_code.terminal_pc(),
    );

    install_sigint_handler()?;

    let mut ticks: u64 = 0;
    let exit_code = loop {
        if SIM_INT.load(Ordering::SeqCst) {
            tracing::warn!(target: "ref", "SIGINT received, stopping");
            break 130;
        }
        if let Some(limit) = cli.max_ticks {
            if ticks >= limit {
                tracing::info!(target: "ref", ticks, "max-ticks budget reached, stopping");
                break 0;
            }
        }

        // No real external interrupt source is wired into this harness; the
        // timer line alone (driven by CP0's own count/compare) is exercised.
        if !engine.step(&mut soc.dut, &mut soc.reference, 0) {
            break match &engine.status {
                SimStatus::End => 0,
                SimStatus::Abort(reason) => {
                    tracing::error!(target: "ref", reason = %reason, "run aborted");
                    1
                }
                SimStatus::Running => unreachable!("step() only returns false once status leaves Running"),
            };
        }

        soc.tick();
        if let Err((dut_tx, ref_tx)) = soc.check_uart_tx() {
            tracing::error!(target: "dut", dut_bytes = ?dut_tx, ref_bytes = ?ref_tx, "UART TX divergence");
            break 1;
        }

        ticks += 1;
    };

    Ok(exit_code)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let exit_code = run(&cli).context("running the differential harness")?;
    std::process::exit(exit_code);
}
