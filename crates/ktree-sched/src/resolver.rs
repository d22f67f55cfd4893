//! Task address resolution for the kernel-tree hierarchy.
//!
//! Maps a logical `(tree, stage, branch)` tuple to the hardware mirror
//! address of its result line plus the 16-bit payload the branch carries.
//! Resolution is a pure function of the tuple and the immutable task
//! table — no hidden state, safe to call from concurrent dispatch
//! attempts.

use crate::error::{Result, SchedulerError};
use ktree_chip::geometry::KernelTreeGeometry;
use ktree_chip::layout;

/// Logical task identifier inside the kernel-tree hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskAddress {
    /// Kernel tree index.
    pub tree: usize,
    /// Stage within the tree.
    pub stage: usize,
    /// Branch within the stage.
    pub branch: usize,
}

impl TaskAddress {
    /// Create a task address.
    #[must_use]
    pub const fn new(tree: usize, stage: usize, branch: usize) -> Self {
        Self { tree, stage, branch }
    }
}

/// Result of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTask {
    /// Hardware mirror word address of the task's result line.
    pub hw_addr: usize,
    /// Payload carried by the addressed branch.
    pub payload: u16,
}

/// Immutable payload table, one 16-bit value per branch.
///
/// Built once at initialisation and never mutated afterwards.
#[derive(Debug)]
pub struct TaskTable {
    geometry: KernelTreeGeometry,
    payloads: Vec<u16>,
}

impl TaskTable {
    /// Generate the table with the reference payload pattern
    /// `tree*100 + stage*10 + branch`.
    #[must_use]
    pub fn generate(geometry: KernelTreeGeometry) -> Self {
        let mut payloads = Vec::with_capacity(geometry.total_kernels() * geometry.branches);
        for tree in 0..geometry.trees {
            for stage in 0..geometry.stages {
                for branch in 0..geometry.branches {
                    #[allow(clippy::cast_possible_truncation)]
                    payloads.push((tree * 100 + stage * 10 + branch) as u16);
                }
            }
        }
        Self { geometry, payloads }
    }

    /// Geometry this table was generated for.
    #[must_use]
    pub const fn geometry(&self) -> &KernelTreeGeometry {
        &self.geometry
    }

    /// Resolve a task address to its hardware line and payload.
    ///
    /// All four branches of a stage share one hardware line; the branch
    /// selects which payload is returned but does not change the address.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidTaskAddress`] if any index lies
    /// outside the geometry. No side effect occurs on failure.
    pub fn resolve(&self, task: TaskAddress) -> Result<ResolvedTask> {
        if !self.geometry.contains(task.tree, task.stage, task.branch) {
            return Err(SchedulerError::invalid_task_address(
                task.tree, task.stage, task.branch,
            ));
        }

        let kernel = self.geometry.kernel_index(task.tree, task.stage);
        let payload = self.payloads[kernel * self.geometry.branches + task.branch];
        let hw_addr = layout::hw_address(&self.geometry, task.tree, task.stage);
        Ok(ResolvedTask { hw_addr, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktree_chip::layout::HW_OFFSET;

    fn table() -> TaskTable {
        TaskTable::generate(KernelTreeGeometry::KT100)
    }

    #[test]
    fn reference_payload_pattern() {
        let t = table();
        let r = t.resolve(TaskAddress::new(1, 5, 2)).unwrap();
        assert_eq!(r.payload, 152);
        assert_eq!(r.hw_addr, HW_OFFSET + 15);
    }

    #[test]
    fn resolution_is_deterministic() {
        let t = table();
        let a = t.resolve(TaskAddress::new(7, 3, 1)).unwrap();
        let b = t.resolve(TaskAddress::new(7, 3, 1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn all_addresses_land_in_kernel_region() {
        let t = table();
        let geom = *t.geometry();
        for tree in 0..geom.trees {
            for stage in 0..geom.stages {
                for branch in 0..geom.branches {
                    let r = t.resolve(TaskAddress::new(tree, stage, branch)).unwrap();
                    assert!(r.hw_addr >= HW_OFFSET);
                    assert!(r.hw_addr < HW_OFFSET + geom.total_kernels());
                }
            }
        }
    }

    #[test]
    fn branch_shares_stage_line() {
        let t = table();
        let base = t.resolve(TaskAddress::new(4, 2, 0)).unwrap();
        for branch in 1..4 {
            let r = t.resolve(TaskAddress::new(4, 2, branch)).unwrap();
            assert_eq!(r.hw_addr, base.hw_addr);
            assert_ne!(r.payload, base.payload);
        }
    }

    #[test]
    fn out_of_bounds_tuple_rejected() {
        let t = table();
        for bad in [
            TaskAddress::new(10, 0, 0),
            TaskAddress::new(0, 10, 0),
            TaskAddress::new(0, 0, 4),
        ] {
            let err = t.resolve(bad).unwrap_err();
            assert_eq!(
                err,
                SchedulerError::invalid_task_address(bad.tree, bad.stage, bad.branch)
            );
        }
    }
}
