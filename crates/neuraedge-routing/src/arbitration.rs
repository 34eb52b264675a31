// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Arbitration between tiles competing for the same destination port.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationPolicy {
    #[default]
    RoundRobin,
    Priority,
    Fifo,
}

impl FromStr for ArbitrationPolicy {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "priority" => Ok(Self::Priority),
            "fifo" => Ok(Self::Fifo),
            other => Err(RoutingError::UnknownPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Arbiter {
    policy: ArbitrationPolicy,
    last_winner: Option<usize>,
    priority_table: HashMap<usize, i32>,
}

impl Arbiter {
    pub fn new(policy: ArbitrationPolicy) -> Self {
        Self {
            policy,
            last_winner: None,
            priority_table: HashMap::new(),
        }
    }

    pub fn policy(&self) -> ArbitrationPolicy {
        self.policy
    }

    /// Tiles without an entry have priority 0.
    pub fn set_priority(&mut self, tile_id: usize, priority: i32) {
        self.priority_table.insert(tile_id, priority);
    }

    pub fn priority(&self, tile_id: usize) -> i32 {
        self.priority_table.get(&tile_id).copied().unwrap_or(0)
    }

    /// Pick one winner among `requests` (tile ids). `None` when empty.
    pub fn arbitrate(&mut self, requests: &[usize]) -> Option<usize> {
        let winner = match self.policy {
            ArbitrationPolicy::Fifo => requests.first().copied(),
            ArbitrationPolicy::Priority => requests
                .iter()
                .copied()
                .max_by_key(|&id| (self.priority(id), id)),
            ArbitrationPolicy::RoundRobin => {
                // Next id after the previous winner, wrapping to the smallest.
                let after_last = |id: &usize| self.last_winner.map_or(true, |last| *id > last);
                requests
                    .iter()
                    .copied()
                    .filter(after_last)
                    .min()
                    .or_else(|| requests.iter().copied().min())
            }
        };
        if winner.is_some() {
            self.last_winner = winner;
        }
        winner
    }

    /// Full service order: repeated arbitration over the remaining requests.
    pub fn order(&mut self, requests: &[usize]) -> Vec<usize> {
        let mut remaining = requests.to_vec();
        let mut out = Vec::with_capacity(remaining.len());
        while let Some(winner) = self.arbitrate(&remaining) {
            if let Some(pos) = remaining.iter().position(|&id| id == winner) {
                remaining.remove(pos);
            }
            out.push(winner);
        }
        out
    }

    pub fn reset(&mut self) {
        self.last_winner = None;
    }
}
