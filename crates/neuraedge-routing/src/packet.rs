// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! 64-bit spike packet layout.
//!
//! ```text
//!  63      56 55      48 47             32 31             16 15    8 7       0
//! +----------+----------+-----------------+-----------------+-------+---------+
//! |  source  |   dest   |     neuron      |    timestamp    | (zero)| payload |
//! +----------+----------+-----------------+-----------------+-------+---------+
//! ```
//!
//! Bits 8..16 are reserved and always zero.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

pub struct PacketFormat;

impl PacketFormat {
    pub const SOURCE_BITS: u32 = 8;
    pub const DEST_BITS: u32 = 8;
    pub const NEURON_BITS: u32 = 16;
    pub const TIMESTAMP_BITS: u32 = 16;
    pub const PAYLOAD_BITS: u32 = 8;
    /// Distinct timestamp values before the field wraps
    pub const TIMESTAMP_PERIOD: u64 = 1 << Self::TIMESTAMP_BITS;

    const SOURCE_SHIFT: u32 = 56;
    const DEST_SHIFT: u32 = 48;
    const NEURON_SHIFT: u32 = 32;
    const TIMESTAMP_SHIFT: u32 = 16;

    /// Pack fields, masking each to its width.
    pub fn encode(source: u64, dest: u64, neuron_id: u64, timestamp: u64, payload: u64) -> u64 {
        ((source & 0xFF) << Self::SOURCE_SHIFT)
            | ((dest & 0xFF) << Self::DEST_SHIFT)
            | ((neuron_id & 0xFFFF) << Self::NEURON_SHIFT)
            | ((timestamp & 0xFFFF) << Self::TIMESTAMP_SHIFT)
            | (payload & 0xFF)
    }

    /// Pack fields, rejecting any value wider than its field.
    pub fn encode_checked(
        source: u64,
        dest: u64,
        neuron_id: u64,
        timestamp: u64,
        payload: u64,
    ) -> Result<u64> {
        for (field, value, bits) in [
            ("source", source, Self::SOURCE_BITS),
            ("dest", dest, Self::DEST_BITS),
            ("neuron_id", neuron_id, Self::NEURON_BITS),
            ("timestamp", timestamp, Self::TIMESTAMP_BITS),
            ("payload", payload, Self::PAYLOAD_BITS),
        ] {
            if value >> bits != 0 {
                return Err(RoutingError::FieldOverflow { field, value, bits });
            }
        }
        Ok(Self::encode(source, dest, neuron_id, timestamp, payload))
    }

    /// Unpack `(source, dest, neuron_id, timestamp, payload)`.
    pub fn decode(packet: u64) -> (u64, u64, u64, u64, u64) {
        (
            (packet >> Self::SOURCE_SHIFT) & 0xFF,
            (packet >> Self::DEST_SHIFT) & 0xFF,
            (packet >> Self::NEURON_SHIFT) & 0xFFFF,
            (packet >> Self::TIMESTAMP_SHIFT) & 0xFFFF,
            packet & 0xFF,
        )
    }

    pub const fn packet_size_bits() -> u32 {
        Self::SOURCE_BITS
            + Self::DEST_BITS
            + Self::NEURON_BITS
            + Self::TIMESTAMP_BITS
            + Self::PAYLOAD_BITS
    }
}

/// One spike event addressed from a source tile to a destination tile.
///
/// Field widths match the wire format, so every packet encodes losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpikePacket {
    pub source_tile_id: u8,
    pub dest_tile_id: u8,
    pub neuron_id: u16,
    /// Emitting step modulo [`PacketFormat::TIMESTAMP_PERIOD`]
    pub timestamp: u16,
    pub payload: u8,
}

fn narrow<T: TryFrom<usize>>(field: &'static str, value: usize, bits: u32) -> Result<T> {
    T::try_from(value).map_err(|_| RoutingError::FieldOverflow {
        field,
        value: value as u64,
        bits,
    })
}

impl SpikePacket {
    /// Build a packet from platform-sized ids, rejecting ids that do not fit.
    pub fn new(
        source_tile_id: usize,
        dest_tile_id: usize,
        neuron_id: usize,
        timestamp: u16,
        payload: u8,
    ) -> Result<Self> {
        Ok(Self {
            source_tile_id: narrow("source", source_tile_id, PacketFormat::SOURCE_BITS)?,
            dest_tile_id: narrow("dest", dest_tile_id, PacketFormat::DEST_BITS)?,
            neuron_id: narrow("neuron_id", neuron_id, PacketFormat::NEURON_BITS)?,
            timestamp,
            payload,
        })
    }

    pub fn source(&self) -> usize {
        usize::from(self.source_tile_id)
    }

    pub fn destination(&self) -> usize {
        usize::from(self.dest_tile_id)
    }

    pub fn neuron(&self) -> usize {
        usize::from(self.neuron_id)
    }

    pub fn encode(&self) -> u64 {
        PacketFormat::encode(
            u64::from(self.source_tile_id),
            u64::from(self.dest_tile_id),
            u64::from(self.neuron_id),
            u64::from(self.timestamp),
            u64::from(self.payload),
        )
    }

    pub fn decode(packet: u64) -> Self {
        let (source, dest, neuron, timestamp, payload) = PacketFormat::decode(packet);
        Self {
            source_tile_id: source as u8,
            dest_tile_id: dest as u8,
            neuron_id: neuron as u16,
            timestamp: timestamp as u16,
            payload: payload as u8,
        }
    }
}

/// Timestamp field for `step`. Steps that differ by a multiple of
/// [`PacketFormat::TIMESTAMP_PERIOD`] share a timestamp.
pub fn wrapping_timestamp(step: u64) -> u16 {
    (step % PacketFormat::TIMESTAMP_PERIOD) as u16
}

/// Unit-payload spike packet.
pub fn create_packet(
    source_tile: usize,
    dest_tile: usize,
    neuron_id: usize,
    timestamp: u16,
) -> Result<SpikePacket> {
    SpikePacket::new(source_tile, dest_tile, neuron_id, timestamp, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let word = PacketFormat::encode(0xAB, 0xCD, 0x1234, 0x5678, 0x9A);
        assert_eq!(word, 0xABCD_1234_5678_009A);
        assert_eq!(PacketFormat::decode(word), (0xAB, 0xCD, 0x1234, 0x5678, 0x9A));
        assert_eq!(PacketFormat::packet_size_bits(), 56);
    }

    #[test]
    fn test_encode_masks_oversized_fields() {
        let word = PacketFormat::encode(0x1FF, 0, 0, 0, 0x100);
        assert_eq!(PacketFormat::decode(word), (0xFF, 0, 0, 0, 0));
    }

    #[test]
    fn test_encode_checked_rejects_overflow() {
        assert_eq!(
            PacketFormat::encode_checked(0, 0, 70_000, 0, 1),
            Err(RoutingError::FieldOverflow {
                field: "neuron_id",
                value: 70_000,
                bits: 16
            })
        );
        assert!(PacketFormat::encode_checked(255, 255, 65_535, 65_535, 255).is_ok());
    }

    #[test]
    fn test_timestamp_wraps_at_sixteen_bits() {
        assert_eq!(wrapping_timestamp(65_535), 65_535);
        assert_eq!(wrapping_timestamp(65_536), 0);
        assert_eq!(wrapping_timestamp(65_537), 1);
        assert_eq!(wrapping_timestamp(3 * PacketFormat::TIMESTAMP_PERIOD + 9), 9);

        let p = create_packet(0, 1, 2, wrapping_timestamp(70_000)).unwrap();
        assert_eq!(u64::from(SpikePacket::decode(p.encode()).timestamp), 70_000 - 65_536);
    }

    #[test]
    fn test_spike_packet_construction() {
        let p = create_packet(3, 7, 1000, 42).unwrap();
        assert_eq!(p.payload, 1);
        assert_eq!(SpikePacket::decode(p.encode()), p);
        assert!(SpikePacket::new(256, 0, 0, 0, 1).is_err());
    }
}
