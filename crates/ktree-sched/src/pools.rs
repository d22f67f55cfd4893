//! Resource pool registry for the KT-100 fabric.
//!
//! Tracks busy/free state for the three pools a dispatch must hold
//! simultaneously: one PE, one switch port and one DMA channel. The
//! registry is the only owner of pool state — callers reserve and release
//! through it, never by touching cells directly.
//!
//! Admission failure is a normal outcome, not an error: `try_reserve`
//! returns `Ok(false)` on contention and reserves nothing. Only a
//! coordinate outside the fabric shape is an error.

use crate::error::{Result, SchedulerError};
use ktree_chip::geometry::FabricShape;
use tracing::debug;

/// PE array coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeCoord {
    /// PE row.
    pub row: usize,
    /// PE column.
    pub col: usize,
}

impl PeCoord {
    /// Create a PE coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Switch fabric coordinate: one port on one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchCoord {
    /// Switch row.
    pub row: usize,
    /// Switch column.
    pub col: usize,
    /// Port on the switch.
    pub port: usize,
}

impl SwitchCoord {
    /// Create a switch coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize, port: usize) -> Self {
        Self { row, col, port }
    }
}

/// DMA channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaChannel(pub usize);

/// Busy/free registry for PEs, switch ports and DMA channels.
#[derive(Debug)]
pub struct ResourcePools {
    shape: FabricShape,
    pe: Vec<bool>,
    switches: Vec<bool>,
    dma: Vec<bool>,
}

impl ResourcePools {
    /// Create a registry with every cell free.
    #[must_use]
    pub fn new(shape: FabricShape) -> Self {
        Self {
            pe: vec![false; shape.pe_slots()],
            switches: vec![false; shape.switch_slots()],
            dma: vec![false; shape.dma_channels],
            shape,
        }
    }

    /// Fabric shape this registry was built for.
    #[must_use]
    pub const fn shape(&self) -> &FabricShape {
        &self.shape
    }

    fn pe_index(&self, pe: PeCoord) -> Result<usize> {
        if pe.row >= self.shape.pe_rows {
            return Err(SchedulerError::out_of_range("PE row", pe.row, self.shape.pe_rows));
        }
        if pe.col >= self.shape.pe_cols {
            return Err(SchedulerError::out_of_range("PE column", pe.col, self.shape.pe_cols));
        }
        Ok(pe.row * self.shape.pe_cols + pe.col)
    }

    fn switch_index(&self, sw: SwitchCoord) -> Result<usize> {
        if sw.row >= self.shape.switch_rows {
            return Err(SchedulerError::out_of_range("switch row", sw.row, self.shape.switch_rows));
        }
        if sw.col >= self.shape.switch_cols {
            return Err(SchedulerError::out_of_range("switch column", sw.col, self.shape.switch_cols));
        }
        if sw.port >= self.shape.switch_ports {
            return Err(SchedulerError::out_of_range("switch port", sw.port, self.shape.switch_ports));
        }
        Ok((sw.row * self.shape.switch_cols + sw.col) * self.shape.switch_ports + sw.port)
    }

    fn dma_index(&self, dma: DmaChannel) -> Result<usize> {
        if dma.0 >= self.shape.dma_channels {
            return Err(SchedulerError::out_of_range("DMA channel", dma.0, self.shape.dma_channels));
        }
        Ok(dma.0)
    }

    /// Atomically reserve a PE, a switch port and a DMA channel.
    ///
    /// All three cells must be free; otherwise nothing is reserved and
    /// `Ok(false)` is returned. Partial reservation never occurs.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::OutOfRange`] if any coordinate lies
    /// outside the fabric shape; pool state is unchanged in that case.
    pub fn try_reserve(&mut self, pe: PeCoord, sw: SwitchCoord, dma: DmaChannel) -> Result<bool> {
        let pi = self.pe_index(pe)?;
        let si = self.switch_index(sw)?;
        let di = self.dma_index(dma)?;

        if self.pe[pi] || self.switches[si] || self.dma[di] {
            debug!(?pe, ?sw, ?dma, "admission denied: resource busy");
            return Ok(false);
        }

        self.pe[pi] = true;
        self.switches[si] = true;
        self.dma[di] = true;
        debug!(?pe, ?sw, ?dma, "resources reserved");
        Ok(true)
    }

    /// Release a PE, a switch port and a DMA channel.
    ///
    /// Idempotent: releasing an already-free cell is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::OutOfRange`] if any coordinate lies
    /// outside the fabric shape.
    pub fn release(&mut self, pe: PeCoord, sw: SwitchCoord, dma: DmaChannel) -> Result<()> {
        let pi = self.pe_index(pe)?;
        let si = self.switch_index(sw)?;
        let di = self.dma_index(dma)?;

        self.pe[pi] = false;
        self.switches[si] = false;
        self.dma[di] = false;
        debug!(?pe, ?sw, ?dma, "resources released");
        Ok(())
    }

    /// Query whether a PE cell is busy.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::OutOfRange`] for coordinates outside the shape.
    pub fn pe_busy(&self, pe: PeCoord) -> Result<bool> {
        Ok(self.pe[self.pe_index(pe)?])
    }

    /// Query whether a switch port is busy.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::OutOfRange`] for coordinates outside the shape.
    pub fn switch_busy(&self, sw: SwitchCoord) -> Result<bool> {
        Ok(self.switches[self.switch_index(sw)?])
    }

    /// Query whether a DMA channel is busy.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::OutOfRange`] for channels outside the shape.
    pub fn dma_busy(&self, dma: DmaChannel) -> Result<bool> {
        Ok(self.dma[self.dma_index(dma)?])
    }

    /// Mark a single PE busy without a full reservation.
    ///
    /// Operator/test seeding of contention (e.g. a PE held by firmware).
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::OutOfRange`] for coordinates outside the shape.
    pub fn mark_pe_busy(&mut self, pe: PeCoord) -> Result<()> {
        let pi = self.pe_index(pe)?;
        self.pe[pi] = true;
        Ok(())
    }

    /// Number of busy cells across all three pools.
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.pe.iter().filter(|&&b| b).count()
            + self.switches.iter().filter(|&&b| b).count()
            + self.dma.iter().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pools() -> ResourcePools {
        ResourcePools::new(FabricShape::KT100)
    }

    const PE: PeCoord = PeCoord::new(2, 1);
    const SW: SwitchCoord = SwitchCoord::new(2, 2, 2);
    const DMA: DmaChannel = DmaChannel(5);

    #[test]
    fn reserve_release_roundtrip() {
        let mut p = pools();
        assert!(p.try_reserve(PE, SW, DMA).unwrap());
        assert_eq!(p.busy_count(), 3);
        p.release(PE, SW, DMA).unwrap();
        assert_eq!(p.busy_count(), 0);
    }

    #[test]
    fn busy_cell_denies_whole_reservation() {
        let mut p = pools();
        p.mark_pe_busy(PE).unwrap();
        assert!(!p.try_reserve(PE, SW, DMA).unwrap());
        // No partial reservation: switch and DMA still free.
        assert!(!p.switch_busy(SW).unwrap());
        assert!(!p.dma_busy(DMA).unwrap());
        assert_eq!(p.busy_count(), 1);
    }

    #[test]
    fn double_reserve_fails() {
        let mut p = pools();
        assert!(p.try_reserve(PE, SW, DMA).unwrap());
        assert!(!p.try_reserve(PE, SW, DMA).unwrap());
    }

    #[test]
    fn release_is_idempotent() {
        let mut p = pools();
        p.release(PE, SW, DMA).unwrap();
        p.release(PE, SW, DMA).unwrap();
        assert_eq!(p.busy_count(), 0);
    }

    #[test]
    fn out_of_range_coordinate_rejected() {
        let mut p = pools();
        let err = p
            .try_reserve(PeCoord::new(8, 0), SW, DMA)
            .unwrap_err();
        assert_eq!(
            err,
            SchedulerError::out_of_range("PE row", 8, 8)
        );
        // Failed bounds check must not reserve anything.
        assert_eq!(p.busy_count(), 0);

        assert!(p.try_reserve(PE, SwitchCoord::new(0, 0, 8), DMA).is_err());
        assert!(p.try_reserve(PE, SW, DmaChannel(8)).is_err());
        assert_eq!(p.busy_count(), 0);
    }

    #[test]
    fn distinct_triples_coexist() {
        let mut p = pools();
        assert!(p.try_reserve(PE, SW, DMA).unwrap());
        assert!(p
            .try_reserve(PeCoord::new(0, 0), SwitchCoord::new(0, 0, 0), DmaChannel(0))
            .unwrap());
        assert_eq!(p.busy_count(), 6);
    }
}
