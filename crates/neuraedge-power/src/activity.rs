// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-tile switching-activity counters for power analysis.

use serde::{Deserialize, Serialize};

use crate::error::{PowerError, Result};

/// Counters for one tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileActivity {
    pub tile_id: usize,
    pub dac_switches: u64,
    pub adc_switches: u64,
    pub crossbar_reads: u64,
    pub spike_events: u64,
    pub router_packets: u64,
}

/// System-wide totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalActivity {
    pub total_dac_switches: u64,
    pub total_adc_switches: u64,
    pub total_crossbar_reads: u64,
    pub total_spikes: u64,
    pub total_router_packets: u64,
    pub cycle_count: u64,
}

#[derive(Debug, Clone)]
pub struct ActivityTracker {
    tiles: Vec<TileActivity>,
    cycle_count: u64,
}

impl ActivityTracker {
    pub fn new(num_tiles: usize) -> Self {
        Self {
            tiles: (0..num_tiles)
                .map(|tile_id| TileActivity {
                    tile_id,
                    ..Default::default()
                })
                .collect(),
            cycle_count: 0,
        }
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    fn tile_mut(&mut self, tile_id: usize) -> Result<&mut TileActivity> {
        let num_tiles = self.tiles.len();
        self.tiles
            .get_mut(tile_id)
            .ok_or(PowerError::InvalidTile { tile_id, num_tiles })
    }

    pub fn log_dac_activity(&mut self, tile_id: usize, count: u64) -> Result<()> {
        self.tile_mut(tile_id)?.dac_switches += count;
        Ok(())
    }

    pub fn log_adc_activity(&mut self, tile_id: usize, count: u64) -> Result<()> {
        self.tile_mut(tile_id)?.adc_switches += count;
        Ok(())
    }

    pub fn log_crossbar_activity(&mut self, tile_id: usize, reads: u64) -> Result<()> {
        self.tile_mut(tile_id)?.crossbar_reads += reads;
        Ok(())
    }

    pub fn log_spike_events(&mut self, tile_id: usize, spikes: u64) -> Result<()> {
        self.tile_mut(tile_id)?.spike_events += spikes;
        Ok(())
    }

    pub fn log_router_activity(&mut self, tile_id: usize, packets: u64) -> Result<()> {
        self.tile_mut(tile_id)?.router_packets += packets;
        Ok(())
    }

    pub fn advance_cycle(&mut self) {
        self.cycle_count += 1;
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn activity_report(&self, tile_id: usize) -> Result<TileActivity> {
        self.tiles.get(tile_id).copied().ok_or(PowerError::InvalidTile {
            tile_id,
            num_tiles: self.tiles.len(),
        })
    }

    pub fn global_activity(&self) -> GlobalActivity {
        self.tiles.iter().fold(
            GlobalActivity {
                cycle_count: self.cycle_count,
                ..Default::default()
            },
            |mut acc, t| {
                acc.total_dac_switches += t.dac_switches;
                acc.total_adc_switches += t.adc_switches;
                acc.total_crossbar_reads += t.crossbar_reads;
                acc.total_spikes += t.spike_events;
                acc.total_router_packets += t.router_packets;
                acc
            },
        )
    }

    pub fn reset(&mut self) {
        for (tile_id, t) in self.tiles.iter_mut().enumerate() {
            *t = TileActivity {
                tile_id,
                ..Default::default()
            };
        }
        self.cycle_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_tile_and_global_counts() {
        let mut tracker = ActivityTracker::new(3);
        tracker.log_dac_activity(0, 4).unwrap();
        tracker.log_adc_activity(0, 4).unwrap();
        tracker.log_crossbar_activity(1, 16).unwrap();
        tracker.log_spike_events(2, 3).unwrap();
        tracker.log_router_activity(2, 6).unwrap();
        tracker.advance_cycle();

        let t0 = tracker.activity_report(0).unwrap();
        assert_eq!(t0.dac_switches, 4);
        assert_eq!(t0.adc_switches, 4);

        let global = tracker.global_activity();
        assert_eq!(global.total_crossbar_reads, 16);
        assert_eq!(global.total_spikes, 3);
        assert_eq!(global.total_router_packets, 6);
        assert_eq!(global.cycle_count, 1);
    }

    #[test]
    fn test_invalid_tile() {
        let mut tracker = ActivityTracker::new(2);
        assert_eq!(
            tracker.log_spike_events(2, 1),
            Err(PowerError::InvalidTile {
                tile_id: 2,
                num_tiles: 2
            })
        );
        assert!(tracker.activity_report(5).is_err());
    }

    #[test]
    fn test_reset() {
        let mut tracker = ActivityTracker::new(2);
        tracker.log_spike_events(1, 10).unwrap();
        tracker.advance_cycle();
        tracker.reset();
        assert_eq!(tracker.global_activity(), GlobalActivity::default());
        assert_eq!(tracker.activity_report(1).unwrap().tile_id, 1);
    }

    #[test]
    fn test_report_serializes() {
        let tracker = ActivityTracker::new(1);
        let json = serde_json::to_value(tracker.activity_report(0).unwrap()).unwrap();
        assert_eq!(json["tile_id"], 0);
        assert_eq!(json["spike_events"], 0);
    }
}
