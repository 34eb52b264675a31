// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tile-local ring buffer.
//!
//! Writes that do not fit fail with `BufferOverflow` and leave the buffer
//! untouched. Reads return at most the bytes currently held.

use tracing::warn;

use crate::error::{MemoryError, Result};

#[derive(Debug, Clone)]
pub struct TileBuffer {
    tile_id: usize,
    buffer: Vec<u8>,
    write_ptr: usize,
    read_ptr: usize,
    occupancy: usize,
}

impl TileBuffer {
    pub fn new(tile_id: usize, size_kb: usize) -> Self {
        Self::with_capacity(tile_id, size_kb * 1024)
    }

    pub fn with_capacity(tile_id: usize, capacity_bytes: usize) -> Self {
        Self {
            tile_id,
            buffer: vec![0; capacity_bytes],
            write_ptr: 0,
            read_ptr: 0,
            occupancy: 0,
        }
    }

    pub fn tile_id(&self) -> usize {
        self.tile_id
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes currently held
    pub fn len(&self) -> usize {
        self.occupancy
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy == 0
    }

    pub fn available(&self) -> usize {
        self.capacity() - self.occupancy
    }

    /// Fill level in [0, 1]
    pub fn occupancy(&self) -> f64 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        self.occupancy as f64 / self.buffer.len() as f64
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.available() {
            warn!(
                "tile {} buffer overflow: {} bytes requested, {} available",
                self.tile_id,
                data.len(),
                self.available()
            );
            return Err(MemoryError::BufferOverflow {
                requested: data.len(),
                available: self.available(),
            });
        }
        let cap = self.capacity();
        let first = data.len().min(cap - self.write_ptr);
        self.buffer[self.write_ptr..self.write_ptr + first].copy_from_slice(&data[..first]);
        self.buffer[..data.len() - first].copy_from_slice(&data[first..]);

        if cap > 0 {
            self.write_ptr = (self.write_ptr + data.len()) % cap;
        }
        self.occupancy += data.len();
        Ok(())
    }

    /// Write fixed-size words (e.g. encoded spike packets).
    pub fn write_words(&mut self, words: &[u64]) -> Result<()> {
        self.write(bytemuck::cast_slice(words))
    }

    /// Remove and return up to `num_bytes` bytes.
    pub fn read(&mut self, num_bytes: usize) -> Vec<u8> {
        let n = num_bytes.min(self.occupancy);
        let cap = self.capacity();
        let mut out = Vec::with_capacity(n);
        let first = n.min(cap - self.read_ptr);
        out.extend_from_slice(&self.buffer[self.read_ptr..self.read_ptr + first]);
        out.extend_from_slice(&self.buffer[..n - first]);

        if cap > 0 {
            self.read_ptr = (self.read_ptr + n) % cap;
        }
        self.occupancy -= n;
        out
    }

    /// Drain every complete 8-byte word.
    pub fn read_words(&mut self) -> Vec<u64> {
        let bytes = self.read(self.occupancy - self.occupancy % 8);
        bytes
            .chunks_exact(8)
            .map(bytemuck::pod_read_unaligned::<u64>)
            .collect()
    }

    pub fn clear(&mut self) {
        self.write_ptr = 0;
        self.read_ptr = 0;
        self.occupancy = 0;
    }
}
