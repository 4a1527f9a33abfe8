//! Boundary with the execution engine that owns the emulated CPU state.
//!
//! The architecture layer never stores register or memory contents itself; every read goes
//! through an [`Engine`] so repeated reads always observe the engine's current state.

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Raw register/memory access exposed by an execution engine.
///
/// Register numbers are the engine's own per-architecture numbering. Errors are surfaced to
/// callers of the architecture layer exactly as returned here.
pub trait Engine {
    type Error: std::error::Error;

    fn reg_read(&self, reg: u32) -> Result<u64, Self::Error>;
    fn reg_write(&mut self, reg: u32, value: u64) -> Result<(), Self::Error>;
    fn mem_read(&self, address: u64, len: usize) -> Result<Vec<u8>, Self::Error>;
    fn mem_write(&mut self, address: u64, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<E: Engine + ?Sized> Engine for &mut E {
    type Error = E::Error;

    fn reg_read(&self, reg: u32) -> Result<u64, Self::Error> {
        (**self).reg_read(reg)
    }

    fn reg_write(&mut self, reg: u32, value: u64) -> Result<(), Self::Error> {
        (**self).reg_write(reg, value)
    }

    fn mem_read(&self, address: u64, len: usize) -> Result<Vec<u8>, Self::Error> {
        (**self).mem_read(address, len)
    }

    fn mem_write(&mut self, address: u64, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).mem_write(address, bytes)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unmapped memory access at 0x{address:X} ({len} bytes)")]
    Unmapped { address: u64, len: usize },
    #[error("invalid mapping at 0x{address:X} (size 0x{size:X})")]
    InvalidMapping { address: u64, size: u64 },
}

/// Software CPU state store: a flat register file plus sparse memory over mapped regions.
///
/// Unwritten registers and unwritten bytes inside a mapped region read as zero. Any access
/// that touches an unmapped byte fails with [`EngineError::Unmapped`].
#[derive(Debug, Default, Clone)]
pub struct MemoryEngine {
    regs: HashMap<u32, u64>,
    // start -> last (inclusive)
    regions: BTreeMap<u64, u64>,
    mem: HashMap<u64, u8>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `size` bytes at `address`. Regions may touch but not overlap.
    pub fn map(&mut self, address: u64, size: u64) -> Result<(), EngineError> {
        let invalid = EngineError::InvalidMapping { address, size };
        if size == 0 {
            return Err(invalid);
        }
        let last = address.checked_add(size - 1).ok_or(invalid.clone())?;
        let overlaps = self
            .regions
            .range(..=last)
            .next_back()
            .is_some_and(|(_, region_last)| *region_last >= address);
        if overlaps {
            return Err(invalid);
        }
        self.regions.insert(address, last);
        Ok(())
    }

    /// Remove a region previously created with the same `address`/`size`.
    pub fn unmap(&mut self, address: u64, size: u64) -> Result<(), EngineError> {
        let matches = size > 0
            && self
                .regions
                .get(&address)
                .is_some_and(|last| address.checked_add(size - 1) == Some(*last));
        if !matches {
            return Err(EngineError::InvalidMapping { address, size });
        }
        let last = self.regions.remove(&address).unwrap_or(address);
        self.mem.retain(|addr, _| *addr < address || *addr > last);
        Ok(())
    }

    pub fn regions(&self) -> Vec<(u64, u64)> {
        self.regions
            .iter()
            .map(|(start, last)| (*start, last - start + 1))
            .collect()
    }

    pub fn is_mapped(&self, address: u64, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        let Some(last) = address.checked_add(len as u64 - 1) else {
            return false;
        };
        let mut cursor = address;
        loop {
            let covering = self
                .regions
                .range(..=cursor)
                .next_back()
                .filter(|(_, region_last)| **region_last >= cursor);
            match covering {
                Some((_, region_last)) if *region_last >= last => return true,
                Some((_, region_last)) => cursor = region_last + 1,
                None => return false,
            }
        }
    }

    fn check(&self, address: u64, len: usize) -> Result<(), EngineError> {
        if self.is_mapped(address, len) {
            Ok(())
        } else {
            Err(EngineError::Unmapped { address, len })
        }
    }
}

impl Engine for MemoryEngine {
    type Error = EngineError;

    fn reg_read(&self, reg: u32) -> Result<u64, EngineError> {
        Ok(self.regs.get(&reg).copied().unwrap_or(0))
    }

    fn reg_write(&mut self, reg: u32, value: u64) -> Result<(), EngineError> {
        self.regs.insert(reg, value);
        Ok(())
    }

    fn mem_read(&self, address: u64, len: usize) -> Result<Vec<u8>, EngineError> {
        self.check(address, len)?;
        Ok((0..len as u64)
            .map(|i| self.mem.get(&(address + i)).copied().unwrap_or(0))
            .collect())
    }

    fn mem_write(&mut self, address: u64, bytes: &[u8]) -> Result<(), EngineError> {
        self.check(address, bytes.len())?;
        for (i, byte) in bytes.iter().enumerate() {
            self.mem.insert(address + i as u64, *byte);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_default_to_zero() {
        let mut engine = MemoryEngine::new();
        assert_eq!(engine.reg_read(7).unwrap(), 0);
        engine.reg_write(7, 0xDEAD).unwrap();
        assert_eq!(engine.reg_read(7).unwrap(), 0xDEAD);
    }

    #[test]
    fn mapped_memory_round_trips() {
        let mut engine = MemoryEngine::new();
        engine.map(0x1000, 0x1000).unwrap();
        assert_eq!(engine.mem_read(0x1800, 4).unwrap(), vec![0; 4]);
        engine.mem_write(0x1800, &[1, 2, 3]).unwrap();
        assert_eq!(engine.mem_read(0x17FF, 5).unwrap(), vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn unmapped_access_faults() {
        let mut engine = MemoryEngine::new();
        engine.map(0x1000, 0x100).unwrap();
        assert_eq!(
            engine.mem_read(0x10FE, 4),
            Err(EngineError::Unmapped { address: 0x10FE, len: 4 })
        );
        assert_eq!(
            engine.mem_write(0x0FFF, &[0xAA]),
            Err(EngineError::Unmapped { address: 0x0FFF, len: 1 })
        );
        assert!(engine.mem_read(u64::MAX, 2).is_err());
    }

    #[test]
    fn adjacent_regions_form_one_range() {
        let mut engine = MemoryEngine::new();
        engine.map(0x1000, 0x100).unwrap();
        engine.map(0x1100, 0x100).unwrap();
        engine.mem_write(0x10FE, &[1, 2, 3, 4]).unwrap();
        assert_eq!(engine.mem_read(0x10FE, 4).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn overlapping_and_empty_maps_are_rejected() {
        let mut engine = MemoryEngine::new();
        engine.map(0x1000, 0x100).unwrap();
        assert!(engine.map(0x10FF, 0x10).is_err());
        assert!(engine.map(0x0F00, 0x101).is_err());
        assert!(engine.map(0x2000, 0).is_err());
        assert!(engine.map(u64::MAX, 2).is_err());
        engine.map(u64::MAX - 0xFFF, 0x1000).unwrap();
    }

    #[test]
    fn unmap_drops_region_and_contents() {
        let mut engine = MemoryEngine::new();
        engine.map(0x1000, 0x100).unwrap();
        engine.mem_write(0x1000, &[9]).unwrap();
        assert!(engine.unmap(0x1000, 0x80).is_err());
        engine.unmap(0x1000, 0x100).unwrap();
        assert!(engine.mem_read(0x1000, 1).is_err());
        engine.map(0x1000, 0x100).unwrap();
        assert_eq!(engine.mem_read(0x1000, 1).unwrap(), vec![0]);
        assert_eq!(engine.regions(), vec![(0x1000, 0x100)]);
    }

    #[test]
    fn borrowed_engine_forwards() {
        fn poke<E: Engine>(mut engine: E) {
            engine.reg_write(1, 5).unwrap();
        }

        let mut engine = MemoryEngine::new();
        poke(&mut engine);
        assert_eq!(engine.reg_read(1).unwrap(), 5);
    }
}
