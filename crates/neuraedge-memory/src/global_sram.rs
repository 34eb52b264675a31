// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared on-chip SRAM with a bump allocator over named regions.

use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MemoryError, Result};

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// A contiguous allocation inside the SRAM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub address: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SramStats {
    pub capacity_bytes: usize,
    pub allocated_bytes: usize,
    pub read_count: u64,
    pub write_count: u64,
    pub utilization: f64,
}

#[derive(Debug, Clone)]
pub struct GlobalSram {
    memory: Vec<u8>,
    regions: AHashMap<String, Region>,
    next_address: usize,
    read_count: u64,
    write_count: u64,
}

impl GlobalSram {
    pub fn new(size_kb: usize) -> Self {
        Self::with_capacity(size_kb * 1024)
    }

    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            memory: vec![0; capacity_bytes],
            regions: AHashMap::new(),
            next_address: 0,
            read_count: 0,
            write_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    /// Reserve `size` bytes under `name`, returning the base address.
    pub fn allocate(&mut self, name: &str, size: usize) -> Result<usize> {
        if self.regions.contains_key(name) {
            return Err(MemoryError::RegionExists(name.to_string()));
        }
        let available = self.capacity() - self.next_address;
        if size > available {
            warn!(
                "SRAM exhausted allocating '{}': {} bytes requested, {} available",
                name, size, available
            );
            return Err(MemoryError::OutOfMemory {
                name: name.to_string(),
                requested: size,
                available,
            });
        }

        let address = self.next_address;
        self.regions
            .insert(name.to_string(), Region { address, size });
        self.next_address += size;
        debug!("allocated SRAM region '{}' at {} ({} bytes)", name, address, size);
        Ok(address)
    }

    pub fn region(&self, name: &str) -> Result<Region> {
        self.regions
            .get(name)
            .copied()
            .ok_or_else(|| MemoryError::UnknownRegion(name.to_string()))
    }

    fn check_bounds(&self, address: usize, len: usize) -> Result<()> {
        match address.checked_add(len) {
            Some(end) if end <= self.capacity() => Ok(()),
            _ => Err(MemoryError::OutOfBounds {
                address,
                len,
                capacity: self.capacity(),
            }),
        }
    }

    pub fn write_f32(&mut self, address: usize, data: &[f32]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.check_bounds(address, bytes.len())?;
        self.memory[address..address + bytes.len()].copy_from_slice(bytes);
        self.write_count += 1;
        Ok(())
    }

    pub fn read_f32(&mut self, address: usize, count: usize) -> Result<Vec<f32>> {
        let len = count * F32_BYTES;
        self.check_bounds(address, len)?;
        self.read_count += 1;
        Ok(self.memory[address..address + len]
            .chunks_exact(F32_BYTES)
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect())
    }

    /// Write into a named region, rejecting data larger than the region.
    pub fn write_region(&mut self, name: &str, data: &[f32]) -> Result<()> {
        let region = self.region(name)?;
        let len = data.len() * F32_BYTES;
        if len > region.size {
            return Err(MemoryError::OutOfBounds {
                address: region.address,
                len,
                capacity: region.size,
            });
        }
        self.write_f32(region.address, data)
    }

    /// Read the whole named region as f32 values.
    pub fn read_region(&mut self, name: &str) -> Result<Vec<f32>> {
        let region = self.region(name)?;
        self.read_f32(region.address, region.size / F32_BYTES)
    }

    pub fn allocated_bytes(&self) -> usize {
        self.next_address
    }

    pub fn utilization(&self) -> f64 {
        if self.memory.is_empty() {
            return 0.0;
        }
        self.next_address as f64 / self.memory.len() as f64
    }

    pub fn stats(&self) -> SramStats {
        SramStats {
            capacity_bytes: self.capacity(),
            allocated_bytes: self.next_address,
            read_count: self.read_count,
            write_count: self.write_count,
            utilization: self.utilization(),
        }
    }

    /// Drop every region and zero the access counters.
    pub fn reset(&mut self) {
        self.memory.fill(0);
        self.regions.clear();
        self.next_address = 0;
        self.read_count = 0;
        self.write_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_allocation() {
        let mut sram = GlobalSram::with_capacity(64);
        assert_eq!(sram.allocate("a", 16).unwrap(), 0);
        assert_eq!(sram.allocate("b", 32).unwrap(), 16);
        assert_eq!(sram.region("b").unwrap(), Region { address: 16, size: 32 });
        assert!((sram.utilization() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_memory_and_duplicates() {
        let mut sram = GlobalSram::with_capacity(32);
        sram.allocate("a", 24).unwrap();
        assert!(matches!(
            sram.allocate("b", 16),
            Err(MemoryError::OutOfMemory { available: 8, .. })
        ));
        assert_eq!(
            sram.allocate("a", 4),
            Err(MemoryError::RegionExists("a".to_string()))
        );
        assert_eq!(sram.allocated_bytes(), 24);
    }

    #[test]
    fn test_f32_read_write_counts_accesses() {
        let mut sram = GlobalSram::new(1);
        let addr = sram.allocate("acts", 16).unwrap();
        sram.write_f32(addr, &[1.5, -2.0, 0.25, 8.0]).unwrap();
        assert_eq!(sram.read_f32(addr, 4).unwrap(), vec![1.5, -2.0, 0.25, 8.0]);

        let stats = sram.stats();
        assert_eq!(stats.read_count, 1);
        assert_eq!(stats.write_count, 1);
    }

    #[test]
    fn test_unaligned_address_round_trips() {
        let mut sram = GlobalSram::with_capacity(32);
        sram.write_f32(3, &[3.25]).unwrap();
        assert_eq!(sram.read_f32(3, 1).unwrap(), vec![3.25]);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut sram = GlobalSram::with_capacity(8);
        assert!(matches!(
            sram.write_f32(4, &[1.0, 2.0]),
            Err(MemoryError::OutOfBounds { .. })
        ));
        assert!(sram.read_f32(usize::MAX, 1).is_err());
        assert_eq!(sram.stats().write_count, 0);
    }

    #[test]
    fn test_named_regions() {
        let mut sram = GlobalSram::with_capacity(64);
        sram.allocate("layer0", 8).unwrap();
        sram.write_region("layer0", &[4.0, 5.0]).unwrap();
        assert_eq!(sram.read_region("layer0").unwrap(), vec![4.0, 5.0]);
        assert!(sram.write_region("layer0", &[1.0, 2.0, 3.0]).is_err());
        assert_eq!(
            sram.read_region("missing"),
            Err(MemoryError::UnknownRegion("missing".to_string()))
        );

        sram.reset();
        assert_eq!(sram.allocated_bytes(), 0);
        assert!(sram.region("layer0").is_err());
    }
}
