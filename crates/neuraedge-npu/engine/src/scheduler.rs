// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Task queue assigning layer work to tiles.
//!
//! `Fifo` returns the oldest queued task for a tile and ignores the stored
//! priority. `Priority` returns the highest-priority task for the tile, oldest
//! first among equals.

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: usize,
    pub tile_id: usize,
    pub layer_id: usize,
    pub priority: i32,
}

impl Task {
    pub fn new(task_id: usize, tile_id: usize, layer_id: usize) -> Self {
        Self {
            task_id,
            tile_id,
            layer_id,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingPolicy {
    #[default]
    Fifo,
    Priority,
}

impl FromStr for SchedulingPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "priority" => Ok(Self::Priority),
            other => Err(EngineError::UnknownPolicy {
                kind: "scheduling",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TileScheduler {
    num_tiles: usize,
    policy: SchedulingPolicy,
    queue: VecDeque<Task>,
    completed: Vec<Task>,
    current_cycle: u64,
}

impl TileScheduler {
    pub fn new(num_tiles: usize) -> Self {
        Self::with_policy(num_tiles, SchedulingPolicy::default())
    }

    pub fn with_policy(num_tiles: usize, policy: SchedulingPolicy) -> Self {
        Self {
            num_tiles,
            policy,
            queue: VecDeque::new(),
            completed: Vec::new(),
            current_cycle: 0,
        }
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    pub fn num_tiles(&self) -> usize {
        self.num_tiles
    }

    pub fn enqueue_task(&mut self, task: Task) {
        trace!("enqueue task {} for tile {}", task.task_id, task.tile_id);
        self.queue.push_back(task);
    }

    /// Remove and return the next task for `tile_id`, if any.
    pub fn get_next_task(&mut self, tile_id: usize) -> Option<Task> {
        let mut candidates = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, t)| t.tile_id == tile_id);
        let index = match self.policy {
            SchedulingPolicy::Fifo => candidates.next().map(|(i, _)| i),
            // max_by_key keeps the last maximum, so reverse to prefer the oldest
            SchedulingPolicy::Priority => candidates
                .rev()
                .max_by_key(|(_, t)| t.priority)
                .map(|(i, _)| i),
        }?;
        self.queue.remove(index)
    }

    pub fn mark_task_complete(&mut self, task: Task) {
        self.completed.push(task);
    }

    pub fn completed_tasks(&self) -> &[Task] {
        &self.completed
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    pub fn advance_cycle(&mut self) {
        self.current_cycle += 1;
    }

    pub fn current_cycle(&self) -> u64 {
        self.current_cycle
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn reset(&mut self) {
        self.queue.clear();
        self.completed.clear();
        self.current_cycle = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(policy: SchedulingPolicy) -> TileScheduler {
        let mut s = TileScheduler::with_policy(2, policy);
        s.enqueue_task(Task::new(0, 1, 0).with_priority(1));
        s.enqueue_task(Task::new(1, 0, 0));
        s.enqueue_task(Task::new(2, 1, 1).with_priority(5));
        s.enqueue_task(Task::new(3, 1, 2).with_priority(5));
        s
    }

    #[test]
    fn test_fifo_is_first_match() {
        let mut s = queue(SchedulingPolicy::Fifo);
        assert_eq!(s.get_next_task(1).map(|t| t.task_id), Some(0));
        assert_eq!(s.get_next_task(1).map(|t| t.task_id), Some(2));
        assert_eq!(s.pending_tasks(), 2);
    }

    #[test]
    fn test_priority_prefers_highest_then_oldest() {
        let mut s = queue(SchedulingPolicy::Priority);
        assert_eq!(s.get_next_task(1).map(|t| t.task_id), Some(2));
        assert_eq!(s.get_next_task(1).map(|t| t.task_id), Some(3));
        assert_eq!(s.get_next_task(1).map(|t| t.task_id), Some(0));
        assert_eq!(s.get_next_task(1), None);
    }

    #[test]
    fn test_none_for_idle_tile_and_completion() {
        let mut s = TileScheduler::new(4);
        assert!(s.is_idle());
        assert_eq!(s.get_next_task(3), None);

        s.enqueue_task(Task::new(7, 3, 0));
        let task = s.get_next_task(3).unwrap();
        s.mark_task_complete(task);
        s.advance_cycle();
        assert!(s.is_idle());
        assert_eq!(s.completed_tasks(), &[task]);
        assert_eq!(s.current_cycle(), 1);

        s.reset();
        assert!(s.completed_tasks().is_empty());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Priority".parse::<SchedulingPolicy>().unwrap(), SchedulingPolicy::Priority);
        assert!("lifo".parse::<SchedulingPolicy>().is_err());
    }
}
