// Copyright 2025 NeuraEdge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Task bookkeeping around a caller-supplied executor.
//!
//! Executor failures are recorded on the task rather than propagated, so one
//! failed task never aborts a batch.

use std::fmt::Display;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::layer::LayerConfig;

pub const MIN_POWER_SCALING: f64 = 0.1;
pub const MAX_POWER_SCALING: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TaskRecord<C> {
    pub id: usize,
    pub config: C,
    pub status: TaskStatus,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionStats {
    pub current_time: f64,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
    pub power_states: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct RuntimeManager<C = LayerConfig> {
    num_tiles: usize,
    tasks: Vec<TaskRecord<C>>,
    current_time: f64,
    power_state: Vec<f64>,
}

impl<C> RuntimeManager<C> {
    pub fn new(num_tiles: usize) -> Self {
        Self {
            num_tiles,
            tasks: Vec::new(),
            current_time: 0.0,
            power_state: vec![MAX_POWER_SCALING; num_tiles],
        }
    }

    /// Queue a task and return its id.
    pub fn submit_task(&mut self, config: C) -> usize {
        let id = self.tasks.len();
        self.tasks.push(TaskRecord {
            id,
            config,
            status: TaskStatus::Pending,
            start_time: None,
            end_time: None,
            error: None,
        });
        id
    }

    pub fn task(&self, task_id: usize) -> Option<&TaskRecord<C>> {
        self.tasks.get(task_id)
    }

    /// Run a task through `executor`. Returns `Ok(None)` when the executor
    /// failed; the error text is kept on the task record.
    pub fn execute_task<R, E, F>(&mut self, task_id: usize, executor: F) -> Result<Option<R>>
    where
        E: Display,
        F: FnOnce(&C) -> std::result::Result<R, E>,
    {
        let now = self.current_time;
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or(EngineError::TaskNotFound(task_id))?;
        task.status = TaskStatus::Running;
        task.start_time = Some(now);

        let outcome = match executor(&task.config) {
            Ok(result) => {
                task.status = TaskStatus::Completed;
                Some(result)
            }
            Err(e) => {
                warn!("task {} failed: {}", task_id, e);
                task.status = TaskStatus::Failed;
                task.error = Some(e.to_string());
                None
            }
        };
        task.end_time = Some(now);
        Ok(outcome)
    }

    /// Set a tile's power scaling, clamped to [0.1, 1.0].
    pub fn set_power_state(&mut self, tile_id: usize, power_scaling: f64) -> Result<()> {
        let num_tiles = self.num_tiles;
        let slot = self
            .power_state
            .get_mut(tile_id)
            .ok_or(EngineError::Power(neuraedge_power::PowerError::InvalidTile {
                tile_id,
                num_tiles,
            }))?;
        *slot = power_scaling.clamp(MIN_POWER_SCALING, MAX_POWER_SCALING);
        Ok(())
    }

    pub fn power_state(&self, tile_id: usize) -> Option<f64> {
        self.power_state.get(tile_id).copied()
    }

    pub fn advance_time(&mut self, delta_t: f64) {
        self.current_time += delta_t;
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn stats(&self) -> ExecutionStats {
        let count = |status| self.tasks.iter().filter(|t| t.status == status).count();
        ExecutionStats {
            current_time: self.current_time,
            tasks_completed: count(TaskStatus::Completed),
            tasks_failed: count(TaskStatus::Failed),
            power_states: self.power_state.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.tasks.clear();
        self.current_time = 0.0;
        self.power_state = vec![MAX_POWER_SCALING; self.num_tiles];
        info!("runtime manager reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_failure_are_recorded() {
        let mut rt: RuntimeManager<u32> = RuntimeManager::new(2);
        let ok = rt.submit_task(4);
        let bad = rt.submit_task(0);
        let divide = |x: &u32| 100u32.checked_div(*x).ok_or("division by zero");

        rt.advance_time(2.5);
        assert_eq!(rt.execute_task(ok, divide).unwrap(), Some(25));
        assert_eq!(rt.execute_task(bad, divide).unwrap(), None);

        let failed = rt.task(bad).unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("division by zero"));
        assert_eq!(rt.task(ok).unwrap().start_time, Some(2.5));

        let stats = rt.stats();
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.tasks_failed, 1);
        assert!((stats.current_time - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_task() {
        let mut rt: RuntimeManager<u32> = RuntimeManager::new(1);
        let result = rt.execute_task(3, |_| Ok::<_, String>(()));
        assert_eq!(result, Err(EngineError::TaskNotFound(3)));
    }

    #[test]
    fn test_power_state_clamped() {
        let mut rt: RuntimeManager<()> = RuntimeManager::new(2);
        rt.set_power_state(0, 0.01).unwrap();
        rt.set_power_state(1, 3.0).unwrap();
        assert_eq!(rt.power_state(0), Some(0.1));
        assert_eq!(rt.power_state(1), Some(1.0));
        assert!(rt.set_power_state(2, 0.5).is_err());

        rt.reset();
        assert_eq!(rt.stats().power_states, vec![1.0, 1.0]);
    }
}
