//! Run Execution
//!
//! Turns an [`ExecutionPlan`] into a configured [`Scheduler`] and runs it.
//!
//! ## Data Flow
//!
//! ```text
//! gauntlet.toml + CLI flags + Suite defaults
//!        │
//!        ▼
//!   SchedulerConfig
//!        │
//!        ▼
//! ┌──────────────────┐
//! │    Scheduler     │  iterations × (tests × params), one barrier per iteration
//! └────────┬─────────┘
//!          │
//!          ▼
//!     RunOutcome (ResultSet, timings)
//! ```

use crate::planner::ExecutionPlan;
use gauntlet_core::{RunOutcome, Scheduler, SchedulerConfig, SchedulerError};
use std::time::Instant;

/// Runs a plan on a fresh scheduler
pub struct Executor {
    config: SchedulerConfig,
}

impl Executor {
    /// Executor that runs every plan with `config`
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Configuration handed to each scheduler
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Register every planned test and run all iterations
    pub fn execute(&self, plan: &ExecutionPlan) -> Result<RunOutcome, SchedulerError> {
        let mut scheduler = Scheduler::new(self.config.clone());
        for test in &plan.tests {
            scheduler.add_shared_test(test.clone());
        }

        let started = Instant::now();
        let total = self.config.iterations;
        scheduler.add_listener(move |index: usize| {
            tracing::trace!(
                iteration = index + 1,
                total,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "iteration complete"
            );
        });

        scheduler.run()
    }
}
