//! Dispatch scheduler: trigger in, admitted transfer out.
//!
//! One dispatch cycle walks the phases
//! `Idle → Selecting → Admitting → Transferring → Complete` and returns
//! to `Idle`. Admission rejection and unrecognised selectors bounce the
//! cycle back to `Idle` without side effects; only validation faults
//! (`OutOfRange`, `InvalidTaskAddress`, `BufferOverrun`) surface as
//! errors, after releasing anything already reserved.
//!
//! The model is single-threaded and synchronous: one request is fully
//! processed before the next begins, matching a single accelerator
//! sharing one MMIO window.

use crate::clock::Clock;
use crate::error::Result;
use crate::pools::{DmaChannel, PeCoord, ResourcePools, SwitchCoord};
use crate::profiles::{ProfileTable, TaskProfile};
use crate::resolver::{TaskAddress, TaskTable};
use crate::transfer::{LineEngine, MmioWindow};
use crate::trigger::TriggerSource;
use bytes::Bytes;
use ktree_chip::geometry::{FabricShape, KernelTreeGeometry};
use ktree_chip::layout::{self, LINE_SIZE};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Observable phase of the dispatch state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    /// Waiting for a trigger.
    Idle,
    /// Mapping the selector to a task profile.
    Selecting,
    /// Reserving fabric resources.
    Admitting,
    /// Moving lines into the MMIO window.
    Transferring,
    /// Dispatch finished, resources released.
    Complete,
}

/// Resources and work one trigger asks for. Built per cycle, discarded
/// after completion or rejection.
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest {
    /// Logical task being offloaded.
    pub task: TaskAddress,
    /// Requested PE.
    pub pe: PeCoord,
    /// Requested switch port.
    pub switch: SwitchCoord,
    /// Requested DMA channel.
    pub dma: DmaChannel,
    /// Lines to move.
    pub lines: usize,
}

impl DispatchRequest {
    fn from_profile(profile: &TaskProfile) -> Self {
        Self {
            task: profile.task,
            pe: profile.pe,
            switch: profile.switch,
            dma: profile.dma,
            lines: profile.lines,
        }
    }
}

/// Metrics from one completed dispatch.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Selector that triggered the dispatch.
    pub selector: u32,
    /// Task that was offloaded.
    pub task: TaskAddress,
    /// Hardware mirror address the payload was latched to.
    pub hw_addr: usize,
    /// Payload value written to the mirror.
    pub payload: u16,
    /// Lines moved through the MMIO window.
    pub lines: usize,
    /// Bytes moved in total.
    pub bytes: usize,
    /// Final MMIO window contents (the last line written).
    pub window: Bytes,
    /// Wall time for the transfer and latch.
    pub elapsed: Duration,
}

/// Outcome of one dispatch cycle.
///
/// Rejection and unrecognised selectors are expected steady-state
/// conditions, not errors — callers branch on the variant and decide
/// their own retry policy.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Transfer completed and resources were released.
    Completed(DispatchReport),
    /// Admission denied: at least one requested resource was busy.
    Rejected {
        /// Selector that was denied.
        selector: u32,
        /// The request that could not be admitted.
        request: DispatchRequest,
    },
    /// No profile is mapped to the selector; nothing was touched.
    Unrecognized {
        /// The unmapped selector value.
        selector: u32,
    },
}

/// Running counters over dispatch outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Completed dispatches.
    pub completed: u64,
    /// Admission rejections.
    pub rejected: u64,
    /// Unrecognised selectors.
    pub unrecognized: u64,
}

impl DispatchStats {
    /// Total triggers observed.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.completed + self.rejected + self.unrecognized
    }
}

/// Construction-time configuration for a scheduler instance.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Kernel-tree geometry of the target device.
    pub geometry: KernelTreeGeometry,
    /// Fabric shape of the target device.
    pub fabric: FabricShape,
    /// Settle delay after each transfer, in milliseconds.
    pub settle_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            geometry: KernelTreeGeometry::KT100,
            fabric: FabricShape::KT100,
            settle_ms: 0,
        }
    }
}

/// The orchestrator: selects, admits, transfers, releases.
///
/// Owns all mutable state explicitly — pools, task table, MMIO window,
/// hardware mirror — so every test gets a fresh, isolated instance.
#[derive(Debug)]
pub struct DispatchScheduler {
    pools: ResourcePools,
    tasks: TaskTable,
    profiles: ProfileTable,
    engine: LineEngine,
    window: MmioWindow,
    hw_mem: Vec<u64>,
    memory: Vec<u8>,
    clock: Box<dyn Clock>,
    settle_ms: u64,
    phase: DispatchPhase,
    stats: DispatchStats,
}

impl DispatchScheduler {
    /// Build a scheduler over an externally initialised system buffer.
    ///
    /// The buffer is read-only from the scheduler's perspective.
    #[must_use]
    pub fn new(
        config: SchedulerConfig,
        profiles: ProfileTable,
        memory: Vec<u8>,
        clock: Box<dyn Clock>,
    ) -> Self {
        info!(
            trees = config.geometry.trees,
            stages = config.geometry.stages,
            branches = config.geometry.branches,
            buffer_bytes = memory.len(),
            "scheduler initialised"
        );
        Self {
            pools: ResourcePools::new(config.fabric),
            tasks: TaskTable::generate(config.geometry),
            profiles,
            engine: LineEngine,
            window: MmioWindow::new(),
            hw_mem: vec![0; layout::hw_mem_words(&config.geometry)],
            memory,
            clock,
            settle_ms: config.settle_ms,
            phase: DispatchPhase::Idle,
            stats: DispatchStats::default(),
        }
    }

    /// Current state-machine phase.
    #[must_use]
    pub const fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// Outcome counters so far.
    #[must_use]
    pub const fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Resource pool registry (read access).
    #[must_use]
    pub const fn pools(&self) -> &ResourcePools {
        &self.pools
    }

    /// Resource pool registry (for operator seeding, e.g. marking a PE
    /// held by firmware). Mutation still goes through the registry's
    /// reserve/release contract.
    pub fn pools_mut(&mut self) -> &mut ResourcePools {
        &mut self.pools
    }

    /// MMIO window (read access).
    #[must_use]
    pub const fn window(&self) -> &MmioWindow {
        &self.window
    }

    /// Hardware mirror word at `addr`, if in range.
    #[must_use]
    pub fn hw_word(&self, addr: usize) -> Option<u64> {
        self.hw_mem.get(addr).copied()
    }

    /// Full hardware mirror (read access).
    #[must_use]
    pub fn hw_mem(&self) -> &[u64] {
        &self.hw_mem
    }

    /// Run one dispatch cycle for `selector`.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::SchedulerError`] on validation faults. Any
    /// resources reserved for the failing request are released first;
    /// the scheduler is back in `Idle` and usable afterwards.
    pub fn dispatch(&mut self, selector: u32) -> Result<DispatchOutcome> {
        self.phase = DispatchPhase::Selecting;
        debug!(selector, "trigger received");

        let Some(profile) = self.profiles.lookup(selector).copied() else {
            warn!(selector, "unrecognized trigger selector");
            self.stats.unrecognized += 1;
            self.phase = DispatchPhase::Idle;
            return Ok(DispatchOutcome::Unrecognized { selector });
        };

        let resolved = match self.tasks.resolve(profile.task) {
            Ok(r) => r,
            Err(e) => {
                self.phase = DispatchPhase::Idle;
                return Err(e);
            }
        };
        let request = DispatchRequest::from_profile(&profile);

        self.phase = DispatchPhase::Admitting;
        let admitted = match self.pools.try_reserve(request.pe, request.switch, request.dma) {
            Ok(a) => a,
            Err(e) => {
                self.phase = DispatchPhase::Idle;
                return Err(e);
            }
        };
        if !admitted {
            debug!(selector, pe = ?request.pe, "dispatch rejected: resources busy");
            self.stats.rejected += 1;
            self.phase = DispatchPhase::Idle;
            return Ok(DispatchOutcome::Rejected { selector, request });
        }

        self.phase = DispatchPhase::Transferring;
        let start = Instant::now();
        let lines = match self
            .engine
            .transfer_task(&self.memory, 0, request.lines, &mut self.window)
        {
            Ok(n) => n,
            Err(e) => {
                // Abort path: give back what this request held.
                self.pools.release(request.pe, request.switch, request.dma)?;
                self.phase = DispatchPhase::Idle;
                return Err(e);
            }
        };

        // Latch the branch payload into the task's hardware result line.
        // All branches of a stage share the line: last write wins.
        self.hw_mem[resolved.hw_addr] = u64::from(resolved.payload);

        self.clock.sleep_ms(self.settle_ms);
        self.pools.release(request.pe, request.switch, request.dma)?;
        self.phase = DispatchPhase::Complete;

        let report = DispatchReport {
            selector,
            task: request.task,
            hw_addr: resolved.hw_addr,
            payload: resolved.payload,
            lines,
            bytes: lines * LINE_SIZE,
            window: self.window.snapshot(),
            elapsed: start.elapsed(),
        };
        info!(
            selector,
            hw_addr = report.hw_addr,
            payload = report.payload,
            lines = report.lines,
            "dispatch complete"
        );
        self.stats.completed += 1;
        self.phase = DispatchPhase::Idle;
        Ok(DispatchOutcome::Completed(report))
    }

    /// Drive the scheduler from a trigger source until it drains.
    ///
    /// Contention and unrecognised selectors are counted and skipped;
    /// validation faults abort the loop.
    ///
    /// # Errors
    ///
    /// Propagates the first validation fault from [`Self::dispatch`].
    pub fn run(&mut self, source: &mut dyn TriggerSource) -> Result<DispatchStats> {
        while let Some(selector) = source.next_trigger() {
            self.dispatch(selector)?;
        }
        Ok(self.stats)
    }
}
