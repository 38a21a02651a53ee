//! Iteration Scheduler
//!
//! Runs every (test, parameter) pair once per iteration on a bounded worker
//! pool and collects the outcomes into a [`ResultSet`].
//!
//! ## Per-iteration flow
//!
//! ```text
//! for i in 0..iterations
//!     ├─ one fresh Test instance per registered TestSpec
//!     ├─ one task per (instance, param) ──► rayon::ThreadPool (unbounded queue)
//!     ├─ scope join: every task of iteration i has finished   ◄── barrier
//!     ├─ progress update
//!     └─ listeners.on_iteration_complete(i), in registration order
//! ```
//!
//! A failing test (error or panic) is logged and skipped: the barrier still
//! completes and that key's bucket ends up one measurement short. A test that
//! never returns stalls its iteration indefinitely; there is no per-task
//! timeout.

use crate::measure::Timer;
use crate::progress::ProgressReporter;
use crate::results::{Bucket, Measurement, MeasurementKey, ResultSet, SpecId};
use crate::traits::{Test, TestSpec};
use rayon::ThreadPoolBuilder;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that abort a whole run
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),
}

/// Worker-pool size used when none is configured: all cores but two, at least one
pub fn default_parallelism() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cores.saturating_sub(2).max(1)
}

/// Configuration for a scheduler run
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Number of iterations (at least 1)
    pub iterations: usize,
    /// Parameter values; an empty list runs with the single value `0.0`
    pub param_values: Vec<f64>,
    /// Worker-pool size (at least 1)
    pub parallelism: usize,
    /// Draw a terminal progress bar
    pub show_progress: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            param_values: vec![0.0],
            parallelism: default_parallelism(),
            show_progress: false,
        }
    }
}

impl SchedulerConfig {
    /// Check the numeric bounds
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.iterations == 0 {
            return Err(SchedulerError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(SchedulerError::InvalidConfig(
                "parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parameter values to run, falling back to `[0.0]` when unset
    pub fn effective_params(&self) -> Vec<f64> {
        if self.param_values.is_empty() {
            vec![0.0]
        } else {
            self.param_values.clone()
        }
    }
}

/// Callback invoked on the scheduling thread after each iteration barrier
pub trait IterationListener {
    /// Iteration `index` (0-based) has fully completed
    fn on_iteration_complete(&mut self, index: usize);
}

impl<F> IterationListener for F
where
    F: FnMut(usize),
{
    fn on_iteration_complete(&mut self, index: usize) {
        self(index)
    }
}

/// Everything a finished run hands to reporting
#[derive(Debug)]
pub struct RunOutcome {
    /// Measurements grouped by key
    pub results: ResultSet,
    /// Wall-clock time of the whole run
    pub total_runtime: Duration,
    /// Iterations executed
    pub iterations: usize,
    /// Worker-pool size used
    pub parallelism: usize,
    /// Parameter values used
    pub param_values: Vec<f64>,
}

struct Registered {
    id: SpecId,
    name: Arc<str>,
    spec: Arc<dyn TestSpec>,
}

/// The orchestrator: owns registered tests, listeners and the run loop
pub struct Scheduler {
    config: SchedulerConfig,
    specs: Vec<Registered>,
    listeners: Vec<Box<dyn IterationListener>>,
}

impl Scheduler {
    /// Create a scheduler with no tests registered
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            specs: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Register a test factory; each registration gets a distinct identity
    pub fn add_test<S>(&mut self, spec: S) -> SpecId
    where
        S: TestSpec + 'static,
    {
        self.add_shared_test(Arc::new(spec))
    }

    /// Register an already shared test factory.
    ///
    /// Registering the same `Arc` twice yields two distinct identities.
    pub fn add_shared_test(&mut self, spec: Arc<dyn TestSpec>) -> SpecId {
        let id = SpecId(self.specs.len());
        let name: Arc<str> = Arc::from(spec.display_name());
        debug!(id = id.index(), test = %name, "registered test");
        self.specs.push(Registered { id, name, spec });
        id
    }

    /// Register a listener, called after every iteration barrier
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: IterationListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Current configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Display names of the registered tests, indexed by [`SpecId`]
    pub fn test_names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name.to_string()).collect()
    }

    /// Execute all iterations and return the collected results
    pub fn run(&mut self) -> Result<RunOutcome, SchedulerError> {
        self.config.validate()?;
        if self.specs.is_empty() {
            return Err(SchedulerError::InvalidConfig(
                "no tests registered".to_string(),
            ));
        }

        let iterations = self.config.iterations;
        let parallelism = self.config.parallelism;
        let params = self.config.effective_params();

        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|i| format!("gauntlet-worker-{}", i))
            .build()
            .map_err(|e| SchedulerError::PoolBuild(e.to_string()))?;

        info!(
            tests = self.specs.len(),
            params = params.len(),
            iterations,
            parallelism,
            "starting run"
        );

        let start = Instant::now();
        let mut results = ResultSet::new(self.test_names());
        let progress = ProgressReporter::new(iterations, self.config.show_progress);

        for iteration in 0..iterations {
            let tasks = self.plan_iteration(iteration, &params, &mut results);
            let submitted = tasks.len();

            // scope() returns only once every spawned task has finished
            pool.scope(move |scope| {
                for task in tasks {
                    scope.spawn(move |_| task.execute());
                }
            });

            debug!(iteration, tasks = submitted, "iteration barrier reached");
            progress.update(iteration + 1);

            for listener in &mut self.listeners {
                listener.on_iteration_complete(iteration);
            }
        }

        // Nothing is queued after the final barrier; dropping joins the workers
        drop(pool);
        progress.finish();

        let total_runtime = start.elapsed();
        report_shortfalls(&results);
        info!(
            measurements = results.total_measurements(),
            keys = results.len(),
            elapsed_ms = total_runtime.as_millis() as u64,
            "run complete"
        );

        Ok(RunOutcome {
            results,
            total_runtime,
            iterations,
            parallelism,
            param_values: params,
        })
    }

    fn plan_iteration(
        &self,
        iteration: usize,
        params: &[f64],
        results: &mut ResultSet,
    ) -> Vec<Task> {
        let mut tasks = Vec::with_capacity(self.specs.len() * params.len());
        for registered in &self.specs {
            let instance: Arc<dyn Test> = Arc::from(registered.spec.new_instance());
            for &param in params {
                tasks.push(Task {
                    test: Arc::clone(&instance),
                    name: Arc::clone(&registered.name),
                    param,
                    iteration,
                    bucket: results.bucket_for(MeasurementKey::new(registered.id, param)),
                });
            }
        }
        tasks
    }
}

/// One (instance, parameter) invocation, executed on a pool thread
struct Task {
    test: Arc<dyn Test>,
    name: Arc<str>,
    param: f64,
    iteration: usize,
    bucket: Arc<Bucket>,
}

impl Task {
    fn execute(self) {
        self.bucket.record_attempt();
        let timer = Timer::start();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.test.run(self.param)));
        let elapsed = timer.stop();

        let failure = match outcome {
            Ok(Ok(outputs)) => {
                self.bucket
                    .push(Measurement::new(self.bucket.key(), outputs, elapsed));
                return;
            }
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        self.bucket.record_failure();
        error!(
            test = %self.name,
            param = self.param,
            iteration = self.iteration,
            error = %failure,
            "test run failed; measurement skipped"
        );
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked: unknown payload".to_string()
    }
}

fn report_shortfalls(results: &ResultSet) {
    for key in results.keys() {
        if let Some(attempts) = results.attempts(&key).filter(|a| a.is_short()) {
            warn!(
                test = results.spec_name(key.spec()).unwrap_or("<unknown>"),
                param = key.param(),
                attempted = attempts.attempted,
                succeeded = attempts.succeeded,
                "fewer measurements than attempts"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{FnSpec, TestOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn config(iterations: usize, params: Vec<f64>, parallelism: usize) -> SchedulerConfig {
        SchedulerConfig {
            iterations,
            param_values: params,
            parallelism,
            show_progress: false,
        }
    }

    fn echo() -> FnSpec<impl Fn(f64) -> TestOutput + Clone + Send + Sync + 'static> {
        FnSpec::new("echo", |p: f64| -> TestOutput { Ok(vec![p]) })
    }

    #[test]
    fn test_default_parallelism_is_positive() {
        assert!(default_parallelism() >= 1);
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut scheduler = Scheduler::new(config(0, vec![1.0], 2));
        scheduler.add_test(echo());
        assert!(matches!(scheduler.run(), Err(SchedulerError::InvalidConfig(_))));

        let mut scheduler = Scheduler::new(config(1, vec![1.0], 0));
        scheduler.add_test(echo());
        assert!(matches!(scheduler.run(), Err(SchedulerError::InvalidConfig(_))));

        let mut scheduler = Scheduler::new(config(1, vec![1.0], 1));
        assert!(matches!(scheduler.run(), Err(SchedulerError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_params_default_to_zero() {
        assert!(config(3, vec![], 2).validate().is_ok());

        let mut scheduler = Scheduler::new(config(3, vec![], 2));
        let id = scheduler.add_test(echo());
        let outcome = scheduler.run().unwrap();

        assert_eq!(outcome.param_values, vec![0.0]);
        let key = MeasurementKey::new(id, 0.0);
        assert_eq!(outcome.results.measurements(&key).unwrap().len(), 3);
    }

    #[test]
    fn test_exact_counts() {
        let mut scheduler = Scheduler::new(config(7, vec![1.0, 2.0, 3.0], 3));
        scheduler.add_test(echo());
        let outcome = scheduler.run().unwrap();

        assert_eq!(outcome.results.len(), 3);
        for key in outcome.results.keys() {
            let measurements = outcome.results.measurements(&key).unwrap();
            assert_eq!(measurements.len(), 7);
            assert!(measurements.iter().all(|m| m.outputs() == [key.param()]));
        }
    }

    #[test]
    fn test_one_instance_per_spec_per_iteration() {
        struct Counting(Arc<AtomicUsize>);
        impl TestSpec for Counting {
            fn new_instance(&self) -> Box<dyn Test> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Box::new(|p: f64| -> TestOutput { Ok(vec![p]) })
            }
            fn display_name(&self) -> String {
                "counting".to_string()
            }
        }

        let created = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new(config(4, vec![1.0, 2.0, 3.0], 2));
        scheduler.add_test(Counting(Arc::clone(&created)));
        scheduler.run().unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let flaky = FnSpec::new("flaky", move |_p: f64| -> TestOutput {
            if counter.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
                Err("odd call".into())
            } else {
                Ok(vec![1.0])
            }
        });

        let mut scheduler = Scheduler::new(config(6, vec![0.0], 1));
        let id = scheduler.add_test(flaky);
        let outcome = scheduler.run().unwrap();

        let attempts = outcome
            .results
            .attempts(&MeasurementKey::new(id, 0.0))
            .unwrap();
        assert_eq!(attempts.attempted, 6);
        assert_eq!(attempts.succeeded, 3);
        assert_eq!(attempts.failed, 3);
    }

    #[test]
    fn test_panics_are_swallowed() {
        let panicking = FnSpec::new("panicking", |p: f64| -> TestOutput {
            if p > 1.5 {
                panic!("parameter too large");
            }
            Ok(vec![p])
        });

        let mut scheduler = Scheduler::new(config(3, vec![1.0, 2.0], 2));
        let id = scheduler.add_test(panicking);
        let outcome = scheduler.run().unwrap();

        let ok = MeasurementKey::new(id, 1.0);
        let bad = MeasurementKey::new(id, 2.0);
        assert_eq!(outcome.results.measurements(&ok).unwrap().len(), 3);
        assert_eq!(outcome.results.measurements(&bad).unwrap().len(), 0);
        assert_eq!(outcome.results.attempts(&bad).unwrap().failed, 3);
    }

    #[test]
    fn test_listeners_called_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut scheduler = Scheduler::new(config(3, vec![1.0], 2));
        scheduler.add_test(echo());
        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            scheduler.add_listener(move |i: usize| log.lock().unwrap().push((tag, i)));
        }
        scheduler.run().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("first", 0),
                ("second", 0),
                ("first", 1),
                ("second", 1),
                ("first", 2),
                ("second", 2),
            ]
        );
    }

    #[test]
    fn test_same_spec_registered_twice_is_two_keys() {
        let shared: Arc<dyn TestSpec> = Arc::new(echo());
        let mut scheduler = Scheduler::new(config(2, vec![1.0], 2));
        let a = scheduler.add_shared_test(Arc::clone(&shared));
        let b = scheduler.add_shared_test(shared);
        let outcome = scheduler.run().unwrap();

        assert_ne!(a, b);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results.total_measurements(), 4);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "panicked: boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "panicked: bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(3u8);
        assert_eq!(panic_message(payload.as_ref()), "panicked: unknown payload");
    }
}
