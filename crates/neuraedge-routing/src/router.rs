// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-destination spike packet queues.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{trace, warn};

use crate::error::{Result, RoutingError};
use crate::mesh::MeshNetwork;
use crate::packet::SpikePacket;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouterStatistics {
    pub total_packets_routed: u64,
    pub buffered_packets: usize,
    pub rejected_packets: u64,
    /// Mesh links traversed by all routed packets
    pub total_hops: u64,
}

#[derive(Debug, Clone)]
pub struct SpikeRouter {
    mesh: MeshNetwork,
    queues: Vec<VecDeque<SpikePacket>>,
    /// 0 means unbounded
    max_queue_depth: usize,
    total_routed: u64,
    rejected: u64,
    total_hops: u64,
}

impl SpikeRouter {
    pub fn new(num_tiles: usize) -> Result<Self> {
        Ok(Self::with_mesh(MeshNetwork::for_tiles(num_tiles)?))
    }

    pub fn with_mesh(mesh: MeshNetwork) -> Self {
        Self {
            queues: vec![VecDeque::new(); mesh.num_tiles()],
            mesh,
            max_queue_depth: 0,
            total_routed: 0,
            rejected: 0,
            total_hops: 0,
        }
    }

    pub fn with_max_queue_depth(mut self, depth: usize) -> Self {
        self.max_queue_depth = depth;
        self
    }

    pub fn num_tiles(&self) -> usize {
        self.queues.len()
    }

    pub fn mesh(&self) -> &MeshNetwork {
        &self.mesh
    }

    /// Enqueue a packet for its destination tile.
    ///
    /// Out-of-range destinations and full queues are rejected and leave every
    /// queue unchanged.
    pub fn route_spike(&mut self, packet: SpikePacket) -> Result<()> {
        let dest = packet.destination();
        let num_tiles = self.num_tiles();
        let Some(queue) = self.queues.get_mut(dest) else {
            self.rejected += 1;
            warn!("rejected packet to tile {} (num_tiles={})", dest, num_tiles);
            return Err(RoutingError::InvalidDestination {
                tile_id: dest,
                num_tiles,
            });
        };
        if self.max_queue_depth > 0 && queue.len() >= self.max_queue_depth {
            self.rejected += 1;
            warn!("queue for tile {} full, dropping packet", dest);
            return Err(RoutingError::QueueFull {
                tile_id: dest,
                capacity: self.max_queue_depth,
            });
        }
        queue.push_back(packet);
        self.total_routed += 1;

        let source = packet.source();
        if self.mesh.contains(source) {
            self.total_hops += self.mesh.manhattan_distance(source, dest) as u64;
        }
        trace!("routed {} -> {} neuron {}", source, dest, packet.neuron_id);
        Ok(())
    }

    /// Drain every packet queued for `tile_id`, oldest first.
    pub fn get_packets(&mut self, tile_id: usize) -> Result<Vec<SpikePacket>> {
        let num_tiles = self.num_tiles();
        self.queues
            .get_mut(tile_id)
            .map(|q| q.drain(..).collect())
            .ok_or(RoutingError::InvalidTile { tile_id, num_tiles })
    }

    pub fn queue_len(&self, tile_id: usize) -> usize {
        self.queues.get(tile_id).map_or(0, VecDeque::len)
    }

    pub fn statistics(&self) -> RouterStatistics {
        RouterStatistics {
            total_packets_routed: self.total_routed,
            buffered_packets: self.queues.iter().map(VecDeque::len).sum(),
            rejected_packets: self.rejected,
            total_hops: self.total_hops,
        }
    }

    /// Clear all queues and counters.
    pub fn reset(&mut self) {
        self.queues.iter_mut().for_each(VecDeque::clear);
        self.total_routed = 0;
        self.rejected = 0;
        self.total_hops = 0;
    }
}
