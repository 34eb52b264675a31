// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! # NeuraEdge Routing
//!
//! Inter-tile spike transport:
//! - **packet**: the 64-bit spike packet wire format
//! - **mesh**: 2D mesh addressing, neighbours and dimension-order paths
//! - **arbitration**: ordering of competing sources
//! - **router**: per-destination packet queues with statistics
//!
//! The packet layout is the only bit-exact format in the simulator; anything
//! persisted or transmitted as a spike event uses it unchanged.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod arbitration;
pub mod error;
pub mod mesh;
pub mod packet;
pub mod router;

pub use arbitration::{ArbitrationPolicy, Arbiter};
pub use error::{Result, RoutingError};
pub use mesh::MeshNetwork;
pub use packet::{create_packet, wrapping_timestamp, PacketFormat, SpikePacket};
pub use router::{RouterStatistics, SpikeRouter};
