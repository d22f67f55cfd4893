//! Kernel-tree hierarchy and compute-fabric shapes.
//!
//! Two independent shapes describe the KT-100:
//!
//! - [`KernelTreeGeometry`] — the logical task hierarchy (trees → stages →
//!   branches). One hardware result line exists per (tree, stage) pair;
//!   the branch selects a payload within the line, not a separate line.
//! - [`FabricShape`] — the physical resources a dispatch must reserve:
//!   PE array, switch fabric and DMA channel set.

/// Logical task hierarchy: trees × stages × branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelTreeGeometry {
    /// Number of kernel trees.
    pub trees: usize,
    /// Pipeline stages per tree.
    pub stages: usize,
    /// Branches per stage (share one hardware line).
    pub branches: usize,
}

impl KernelTreeGeometry {
    /// KT-100 reference geometry: 10 trees × 10 stages × 4 branches.
    pub const KT100: Self = Self { trees: 10, stages: 10, branches: 4 };

    /// Total kernel lines in the device (one per tree/stage pair).
    #[must_use]
    pub const fn total_kernels(&self) -> usize {
        self.trees * self.stages
    }

    /// Linear kernel index for a tree/stage pair.
    ///
    /// The hardware decodes addresses tree-major: all stages of tree 0,
    /// then all stages of tree 1, and so on.
    #[must_use]
    pub const fn kernel_index(&self, tree: usize, stage: usize) -> usize {
        tree * self.stages + stage
    }

    /// True if the tuple addresses a kernel branch inside this geometry.
    #[must_use]
    pub const fn contains(&self, tree: usize, stage: usize, branch: usize) -> bool {
        tree < self.trees && stage < self.stages && branch < self.branches
    }
}

/// Physical resource shapes: PE array, switch fabric, DMA channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FabricShape {
    /// PE array rows.
    pub pe_rows: usize,
    /// PE array columns.
    pub pe_cols: usize,
    /// Switch fabric rows.
    pub switch_rows: usize,
    /// Switch fabric columns.
    pub switch_cols: usize,
    /// Ports per switch.
    pub switch_ports: usize,
    /// DMA channel count.
    pub dma_channels: usize,
}

impl FabricShape {
    /// KT-100 reference fabric: 8×8 PEs, 8×8×8 switch ports, 8 DMA channels.
    pub const KT100: Self = Self {
        pe_rows: 8,
        pe_cols: 8,
        switch_rows: 8,
        switch_cols: 8,
        switch_ports: 8,
        dma_channels: 8,
    };

    /// Total PE slots.
    #[must_use]
    pub const fn pe_slots(&self) -> usize {
        self.pe_rows * self.pe_cols
    }

    /// Total switch port slots.
    #[must_use]
    pub const fn switch_slots(&self) -> usize {
        self.switch_rows * self.switch_cols * self.switch_ports
    }

    /// Total reservable cells across all three pools.
    #[must_use]
    pub const fn total_slots(&self) -> usize {
        self.pe_slots() + self.switch_slots() + self.dma_channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kt100_tree_geometry() {
        let geom = KernelTreeGeometry::KT100;
        assert_eq!(geom.total_kernels(), 100);
        assert!(geom.contains(9, 9, 3));
        assert!(!geom.contains(10, 0, 0));
        assert!(!geom.contains(0, 10, 0));
        assert!(!geom.contains(0, 0, 4));
    }

    #[test]
    fn kernel_index_is_tree_major() {
        let geom = KernelTreeGeometry::KT100;
        assert_eq!(geom.kernel_index(0, 0), 0);
        assert_eq!(geom.kernel_index(0, 9), 9);
        assert_eq!(geom.kernel_index(1, 0), 10);
        assert_eq!(geom.kernel_index(1, 5), 15);
        assert_eq!(geom.kernel_index(9, 9), 99);
    }

    #[test]
    fn kt100_fabric_slots() {
        let fabric = FabricShape::KT100;
        assert_eq!(fabric.pe_slots(), 64);
        assert_eq!(fabric.switch_slots(), 512);
        assert_eq!(fabric.total_slots(), 64 + 512 + 8);
    }
}
