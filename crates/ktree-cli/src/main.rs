//! `ktree` — command-line interface for the KT-100 dispatch scheduler.
//!
//! ```text
//! USAGE:
//!   ktree run [--cycles N] [--seed S] [--period-ms MS]
//!                                    Drive the scheduling loop from
//!                                    simulated interrupts
//!   ktree dispatch <selector>        Fire one dispatch cycle
//!   ktree profiles                   List the selector-to-task table
//!   ktree geometry                   Print KT-100 geometry and fabric
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use ktree_chip::geometry::{FabricShape, KernelTreeGeometry};
use ktree_chip::layout::{self, DATA_SIZE, LINE_SIZE};
use ktree_sched::{
    Clock, DispatchOutcome, DispatchScheduler, ProfileTable, SchedulerConfig, SystemClock,
    TriggerSource,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ktree", about = "KT-100 dispatch scheduler CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the continuous scheduling loop with simulated interrupts.
    Run {
        /// Number of trigger cycles to run.
        #[arg(long, default_value_t = 20)]
        cycles: u64,
        /// Seed for the simulated interrupt source.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Delay between interrupts in milliseconds.
        #[arg(long, default_value_t = 0)]
        period_ms: u64,
    },
    /// Fire one dispatch cycle for an explicit selector.
    Dispatch {
        /// Trigger selector value (baseline table maps 1–4).
        selector: u32,
    },
    /// List the selector-to-task profile table.
    Profiles,
    /// Print KT-100 geometry and fabric shapes.
    Geometry,
}

/// Simulated interrupt source: waits one period, then yields a random
/// selector in the mapped range.
struct SimulatedInterrupts {
    rng: StdRng,
    clock: SystemClock,
    period_ms: u64,
    remaining: u64,
}

impl SimulatedInterrupts {
    fn new(seed: u64, period_ms: u64, cycles: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock: SystemClock,
            period_ms,
            remaining: cycles,
        }
    }
}

impl TriggerSource for SimulatedInterrupts {
    fn next_trigger(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.clock.sleep_ms(self.period_ms);
        Some(self.rng.gen_range(layout::selector::MIN..=layout::selector::MAX))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Run { cycles, seed, period_ms } => cmd_run(cycles, seed, period_ms)?,
        Cmd::Dispatch { selector } => cmd_dispatch(selector)?,
        Cmd::Profiles => cmd_profiles(),
        Cmd::Geometry => cmd_geometry(),
    }

    Ok(())
}

/// System buffer with the reference `(i % 256)` fill pattern.
fn pattern_buffer(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

fn build_scheduler() -> DispatchScheduler {
    DispatchScheduler::new(
        SchedulerConfig::default(),
        ProfileTable::kt100_default(),
        pattern_buffer(DATA_SIZE),
        Box::new(SystemClock),
    )
}

fn cmd_run(cycles: u64, seed: u64, period_ms: u64) -> Result<()> {
    let mut sched = build_scheduler();
    let mut interrupts = SimulatedInterrupts::new(seed, period_ms, cycles);

    println!("Running {cycles} trigger cycles (seed {seed}, period {period_ms} ms) ...");
    let stats = sched.run(&mut interrupts)?;

    println!();
    println!("Completed    : {}", stats.completed);
    println!("Rejected     : {}", stats.rejected);
    println!("Unrecognized : {}", stats.unrecognized);
    println!("Pools busy   : {}", sched.pools().busy_count());
    Ok(())
}

fn cmd_dispatch(selector: u32) -> Result<()> {
    let mut sched = build_scheduler();

    match sched.dispatch(selector)? {
        DispatchOutcome::Completed(report) => {
            println!("Dispatch complete");
            println!("  Task      : tree {} stage {} branch {}",
                report.task.tree, report.task.stage, report.task.branch);
            println!("  HW address: {}", report.hw_addr);
            println!("  Payload   : {}", report.payload);
            println!("  Moved     : {} lines / {} bytes", report.lines, report.bytes);
            println!("  Elapsed   : {:?}", report.elapsed);
        }
        DispatchOutcome::Rejected { selector, request } => {
            println!(
                "Dispatch rejected: selector {selector} needs PE ({},{}) and it is busy",
                request.pe.row, request.pe.col
            );
        }
        DispatchOutcome::Unrecognized { selector } => {
            println!("Unknown trigger selector: {selector}");
        }
    }
    Ok(())
}

fn cmd_profiles() {
    let table = ProfileTable::kt100_default();
    println!("Mapped selectors: {}", table.len());
    println!();
    for (selector, p) in table.iter() {
        println!(
            "[{}] task ({},{},{})  PE ({},{})  switch ({},{},{})  DMA {}  {} lines",
            selector,
            p.task.tree, p.task.stage, p.task.branch,
            p.pe.row, p.pe.col,
            p.switch.row, p.switch.col, p.switch.port,
            p.dma.0, p.lines,
        );
    }
}

fn cmd_geometry() {
    let geom = KernelTreeGeometry::KT100;
    let fabric = FabricShape::KT100;

    println!("KT-100 kernel-tree accelerator");
    println!("  Trees        : {}", geom.trees);
    println!("  Stages/tree  : {}", geom.stages);
    println!("  Branches     : {}", geom.branches);
    println!("  Kernel lines : {}", geom.total_kernels());
    println!("  HW mirror    : {} words (kernel region from {})",
        layout::hw_mem_words(&geom), layout::HW_OFFSET);
    println!();
    println!("  PE array     : {}x{} ({} slots)", fabric.pe_rows, fabric.pe_cols, fabric.pe_slots());
    println!("  Switch fabric: {}x{}x{} ({} ports)",
        fabric.switch_rows, fabric.switch_cols, fabric.switch_ports, fabric.switch_slots());
    println!("  DMA channels : {}", fabric.dma_channels);
    println!("  Line size    : {} bytes", LINE_SIZE);
    println!("  System buffer: {} bytes ({} lines)", DATA_SIZE, layout::NUM_LINES);
}
