//! Selector-to-profile mapping.
//!
//! Each trigger selector names a [`TaskProfile`]: the logical task to
//! resolve, the fabric resources it needs and how many lines it moves.
//! The table replaces per-selector branching — adding a profile is a data
//! change, not a code change.

use crate::pools::{DmaChannel, PeCoord, SwitchCoord};
use crate::resolver::TaskAddress;

/// Everything one trigger selector asks the scheduler to do.
#[derive(Debug, Clone, Copy)]
pub struct TaskProfile {
    /// Logical task to resolve and offload.
    pub task: TaskAddress,
    /// PE the task executes on.
    pub pe: PeCoord,
    /// Switch port routing data to the PE.
    pub switch: SwitchCoord,
    /// DMA channel moving the data.
    pub dma: DmaChannel,
    /// Lines to transfer from the system buffer.
    pub lines: usize,
}

/// Lookup table from trigger selector to task profile.
#[derive(Debug)]
pub struct ProfileTable {
    entries: Vec<(u32, TaskProfile)>,
}

impl ProfileTable {
    /// Build a table from explicit entries.
    #[must_use]
    pub fn new(entries: Vec<(u32, TaskProfile)>) -> Self {
        Self { entries }
    }

    /// Baseline KT-100 table: selectors 1–4.
    #[must_use]
    pub fn kt100_default() -> Self {
        Self::new(vec![
            (1, TaskProfile {
                task: TaskAddress::new(0, 0, 0),
                pe: PeCoord::new(0, 0),
                switch: SwitchCoord::new(0, 0, 0),
                dma: DmaChannel(0),
                lines: 10,
            }),
            (2, TaskProfile {
                task: TaskAddress::new(1, 5, 2),
                pe: PeCoord::new(2, 1),
                switch: SwitchCoord::new(2, 2, 2),
                dma: DmaChannel(5),
                lines: 20,
            }),
            (3, TaskProfile {
                task: TaskAddress::new(3, 7, 1),
                pe: PeCoord::new(4, 4),
                switch: SwitchCoord::new(4, 4, 1),
                dma: DmaChannel(2),
                lines: 70,
            }),
            (4, TaskProfile {
                task: TaskAddress::new(9, 9, 3),
                pe: PeCoord::new(7, 7),
                switch: SwitchCoord::new(7, 7, 7),
                dma: DmaChannel(7),
                lines: 100,
            }),
        ])
    }

    /// Profile mapped to a selector, if any.
    #[must_use]
    pub fn lookup(&self, selector: u32) -> Option<&TaskProfile> {
        self.entries
            .iter()
            .find(|(s, _)| *s == selector)
            .map(|(_, p)| p)
    }

    /// Iterate over `(selector, profile)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &TaskProfile)> {
        self.entries.iter().map(|(s, p)| (*s, p))
    }

    /// Number of mapped selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no selector is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktree_chip::layout::{selector, NUM_LINES};

    #[test]
    fn baseline_covers_selector_range() {
        let table = ProfileTable::kt100_default();
        for s in selector::MIN..=selector::MAX {
            assert!(table.lookup(s).is_some(), "selector {s} unmapped");
        }
        assert!(table.lookup(0).is_none());
        assert!(table.lookup(9).is_none());
    }

    #[test]
    fn baseline_fits_system_buffer() {
        let table = ProfileTable::kt100_default();
        for (_, profile) in table.iter() {
            assert!(profile.lines > 0);
            assert!(profile.lines <= NUM_LINES);
        }
    }

    #[test]
    fn selector_two_is_the_reference_task() {
        let table = ProfileTable::kt100_default();
        let p = table.lookup(2).unwrap();
        assert_eq!(p.task, TaskAddress::new(1, 5, 2));
        assert_eq!(p.pe, PeCoord::new(2, 1));
    }
}
