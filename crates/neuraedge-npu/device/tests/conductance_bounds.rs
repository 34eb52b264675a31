// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conductance stays inside its bounds under arbitrary program/drift sequences.

use neuraedge_npu_device::{Device, DeviceKind, DeviceModel};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn kind_strategy() -> impl Strategy<Value = DeviceKind> {
    prop_oneof![
        Just(DeviceKind::ReRam),
        Just(DeviceKind::Pcm),
        Just(DeviceKind::Sram),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Program(f64),
    Drift(f64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-1e-3f64..1e-3).prop_map(Op::Program),
        (0.0f64..1e7).prop_map(Op::Drift),
    ]
}

proptest! {
    #[test]
    fn conductance_within_bounds(
        kind in kind_strategy(),
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..64),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut device = Device::new(kind, 1e-6, 1e-4).unwrap();
        for op in ops {
            match op {
                Op::Program(target) => {
                    let g = device.program(target, &mut rng);
                    prop_assert_eq!(g, device.conductance());
                }
                Op::Drift(t) => device.update_drift(t),
            }
            prop_assert!(device.conductance() >= device.min_conductance());
            prop_assert!(device.conductance() <= device.max_conductance());
        }
    }
}
