//! Flat hardware memory layout and transfer unit sizes.
//!
//! The KT-100 exposes three windows to the host:
//!
//! ```text
//! Window            Size        Purpose
//! ───────────────── ─────────── ─────────────────────────────────────────
//! MMIO line window  1 KiB       Data entry point, one line at a time
//! Hardware mirror   600 words   Kernel result lines, 64-bit each
//! System buffer     100 KiB     Host-side source data (100 lines)
//! ```
//!
//! Kernel result lines start at word [`HW_OFFSET`]; the first 500 words of
//! the mirror belong to device firmware and are never addressed by the
//! dispatch path.

use crate::geometry::KernelTreeGeometry;

/// Bytes per transfer line — one MMIO window fill.
pub const LINE_SIZE: usize = 1024;

/// Default host-side system buffer size in bytes (100 lines).
pub const DATA_SIZE: usize = 102_400;

/// Lines held by the default system buffer.
pub const NUM_LINES: usize = DATA_SIZE / LINE_SIZE;

/// First hardware mirror word that belongs to the kernel result region.
pub const HW_OFFSET: usize = 500;

/// Hardware mirror size in 64-bit words for a given geometry.
#[must_use]
pub const fn hw_mem_words(geometry: &KernelTreeGeometry) -> usize {
    HW_OFFSET + geometry.total_kernels()
}

/// Hardware mirror address of the result line for a tree/stage pair.
///
/// The encoding is a direct linear map: `HW_OFFSET + tree*stages + stage`.
/// All branches of the stage share this one line. The result is always in
/// `[HW_OFFSET, HW_OFFSET + total_kernels)` when the pair is in bounds.
#[must_use]
pub const fn hw_address(geometry: &KernelTreeGeometry, tree: usize, stage: usize) -> usize {
    HW_OFFSET + geometry.kernel_index(tree, stage)
}

/// Trigger selector range recognised by the baseline profile table.
pub mod selector {
    /// Lowest mapped selector value.
    pub const MIN: u32 = 1;
    /// Highest mapped selector value.
    pub const MAX: u32 = 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_whole_lines() {
        assert_eq!(DATA_SIZE % LINE_SIZE, 0);
        assert_eq!(NUM_LINES, 100);
    }

    #[test]
    fn kt100_mirror_size() {
        assert_eq!(hw_mem_words(&KernelTreeGeometry::KT100), 600);
    }

    #[test]
    fn addresses_stay_in_kernel_region() {
        let geom = KernelTreeGeometry::KT100;
        let lo = hw_address(&geom, 0, 0);
        let hi = hw_address(&geom, geom.trees - 1, geom.stages - 1);
        assert_eq!(lo, HW_OFFSET);
        assert_eq!(hi, HW_OFFSET + geom.total_kernels() - 1);
    }
}
