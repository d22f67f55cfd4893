//! Interrupt-driven task-dispatch scheduler for the KT-100.
//!
//! Maps logical kernel-tree tasks to physical accelerator resources and
//! moves their data under admission control. One dispatch cycle:
//!
//! ```text
//! trigger ─→ select profile ─→ resolve task address
//!         ─→ reserve PE + switch + DMA (all-or-nothing)
//!         ─→ stream lines through the MMIO window
//!         ─→ latch payload into the hardware mirror ─→ release
//! ```
//!
//! # Quick start
//!
//! ```
//! use ktree_sched::{
//!     DispatchOutcome, DispatchScheduler, NoopClock, ProfileTable, SchedulerConfig,
//! };
//!
//! # fn main() -> ktree_sched::Result<()> {
//! let memory = vec![0u8; ktree_chip::layout::DATA_SIZE];
//! let mut sched = DispatchScheduler::new(
//!     SchedulerConfig::default(),
//!     ProfileTable::kt100_default(),
//!     memory,
//!     Box::new(NoopClock),
//! );
//!
//! match sched.dispatch(2)? {
//!     DispatchOutcome::Completed(report) => {
//!         println!("payload {} at hw {}", report.payload, report.hw_addr);
//!     }
//!     DispatchOutcome::Rejected { selector, .. } => println!("{selector}: busy"),
//!     DispatchOutcome::Unrecognized { selector } => println!("{selector}: unmapped"),
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod clock;
mod error;
mod pools;
mod profiles;
mod resolver;
mod scheduler;
mod transfer;
mod trigger;

pub use clock::{Clock, NoopClock, SystemClock};
pub use error::{Result, SchedulerError};
pub use pools::{DmaChannel, PeCoord, ResourcePools, SwitchCoord};
pub use profiles::{ProfileTable, TaskProfile};
pub use resolver::{ResolvedTask, TaskAddress, TaskTable};
pub use scheduler::{
    DispatchOutcome, DispatchPhase, DispatchReport, DispatchRequest, DispatchScheduler,
    DispatchStats, SchedulerConfig,
};
pub use transfer::{LineEngine, MmioWindow};
pub use trigger::{SequenceTrigger, TriggerSource};
