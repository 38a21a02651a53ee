//! Measurements and Result Sets
//!
//! Results are bucketed by [`MeasurementKey`]: the identity of the registered
//! test factory plus the bit pattern of the parameter value. Two factories
//! are distinct keys even if they are structurally identical, and parameters
//! compare bit-exactly (`0.1 + 0.2` and `0.3` land in different buckets).
//!
//! ## Sharing model
//!
//! ```text
//!  scheduling thread                    worker threads
//!  ─────────────────                    ──────────────
//!  ResultSet::bucket_for(key) ──┐
//!    (only place the key map    │  Arc<Bucket>
//!     is mutated)               └──────────────►  Bucket::push(measurement)
//!                                                   (Mutex<Vec<_>> append)
//! ```
//!
//! Append order inside a bucket follows task completion, not iteration order.

use crate::measure::as_millis_f64;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Identity assigned to a test factory when it is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecId(pub(crate) usize);

impl SpecId {
    /// Registration index of the factory
    pub fn index(self) -> usize {
        self.0
    }
}

/// Bucket identity: (factory, bit-exact parameter value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasurementKey {
    spec: SpecId,
    param_bits: u64,
}

impl MeasurementKey {
    /// Build a key for a factory and parameter value
    pub fn new(spec: SpecId, param: f64) -> Self {
        Self {
            spec,
            param_bits: param.to_bits(),
        }
    }

    /// The factory this key belongs to
    pub fn spec(&self) -> SpecId {
        self.spec
    }

    /// The parameter value
    pub fn param(&self) -> f64 {
        f64::from_bits(self.param_bits)
    }
}

/// One timed outcome of a single test invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    key: MeasurementKey,
    outputs: Vec<f64>,
    elapsed: Duration,
}

impl Measurement {
    /// Record the outputs and elapsed time of one invocation
    pub fn new(key: MeasurementKey, outputs: Vec<f64>, elapsed: Duration) -> Self {
        Self {
            key,
            outputs,
            elapsed,
        }
    }

    /// Key this measurement was recorded under
    pub fn key(&self) -> MeasurementKey {
        self.key
    }

    /// Factory that produced the test instance
    pub fn spec(&self) -> SpecId {
        self.key.spec
    }

    /// Parameter value the test ran with
    pub fn param(&self) -> f64 {
        self.key.param()
    }

    /// Output vector reported by the test
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    /// One output dimension, if present
    pub fn output(&self, dimension: usize) -> Option<f64> {
        self.outputs.get(dimension).copied()
    }

    /// Wall-clock duration of the invocation
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whole elapsed milliseconds
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// Fractional elapsed milliseconds, the unit runtime statistics use
    pub fn runtime_millis(&self) -> f64 {
        as_millis_f64(self.elapsed)
    }
}

/// Attempted versus recorded invocations for one key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempts {
    /// Invocations started
    pub attempted: usize,
    /// Invocations that produced a measurement
    pub succeeded: usize,
    /// Invocations that returned an error or panicked
    pub failed: usize,
}

impl Attempts {
    /// Whether any invocation was lost to a failure
    pub fn is_short(&self) -> bool {
        self.succeeded < self.attempted
    }
}

/// Append-only, internally synchronized sequence of measurements for one key
#[derive(Debug)]
pub struct Bucket {
    key: MeasurementKey,
    measurements: Mutex<Vec<Measurement>>,
    attempted: AtomicUsize,
    failed: AtomicUsize,
}

impl Bucket {
    fn new(key: MeasurementKey) -> Self {
        Self {
            key,
            measurements: Mutex::new(Vec::new()),
            attempted: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Key of this bucket
    pub fn key(&self) -> MeasurementKey {
        self.key
    }

    /// Note that an invocation for this key has started
    pub fn record_attempt(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// Note that an invocation for this key failed without a measurement
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Append a measurement; safe to call from many threads at once
    pub fn push(&self, measurement: Measurement) {
        self.lock().push(measurement);
    }

    /// Number of recorded measurements
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the measurements recorded so far
    pub fn snapshot(&self) -> Vec<Measurement> {
        self.lock().clone()
    }

    /// Attempt accounting for this key
    pub fn attempts(&self) -> Attempts {
        let succeeded = self.len();
        Attempts {
            attempted: self.attempted.load(Ordering::Relaxed),
            succeeded,
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Measurement>> {
        // A panic while holding the lock cannot leave a half-pushed Vec
        self.measurements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Flat, serializable view of one measurement for tabular export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Display name of the test
    pub test: String,
    /// Parameter value
    pub param: f64,
    /// Whole elapsed milliseconds
    pub elapsed_ms: u64,
    /// Output vector
    pub outputs: Vec<f64>,
}

/// All measurements of a run, grouped by key in first-seen order
#[derive(Debug, Default)]
pub struct ResultSet {
    names: Vec<String>,
    index: FxHashMap<MeasurementKey, usize>,
    buckets: Vec<Arc<Bucket>>,
}

impl ResultSet {
    /// Create an empty result set for factories with the given display names,
    /// indexed by [`SpecId`]
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            index: FxHashMap::default(),
            buckets: Vec::new(),
        }
    }

    /// Look up or lazily create the bucket for a key.
    ///
    /// Takes `&mut self`: keys are only ever created by the scheduling thread.
    pub fn bucket_for(&mut self, key: MeasurementKey) -> Arc<Bucket> {
        if let Some(&idx) = self.index.get(&key) {
            return Arc::clone(&self.buckets[idx]);
        }
        let bucket = Arc::new(Bucket::new(key));
        self.index.insert(key, self.buckets.len());
        self.buckets.push(Arc::clone(&bucket));
        bucket
    }

    /// Bucket for an existing key
    pub fn bucket(&self, key: &MeasurementKey) -> Option<&Bucket> {
        self.index.get(key).map(|&idx| self.buckets[idx].as_ref())
    }

    /// Measurements recorded for a key
    pub fn measurements(&self, key: &MeasurementKey) -> Option<Vec<Measurement>> {
        self.bucket(key).map(Bucket::snapshot)
    }

    /// Attempt accounting for a key
    pub fn attempts(&self, key: &MeasurementKey) -> Option<Attempts> {
        self.bucket(key).map(Bucket::attempts)
    }

    /// Keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = MeasurementKey> + '_ {
        self.buckets.iter().map(|b| b.key())
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no key has been created
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total measurements across all keys
    pub fn total_measurements(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }

    /// Display name of a registered factory
    pub fn spec_name(&self, spec: SpecId) -> Option<&str> {
        self.names.get(spec.0).map(String::as_str)
    }

    /// Display names indexed by [`SpecId`]
    pub fn spec_names(&self) -> &[String] {
        &self.names
    }

    /// Ids of all registered factories
    pub fn specs(&self) -> impl Iterator<Item = SpecId> + '_ {
        (0..self.names.len()).map(SpecId)
    }

    /// Sorted, de-duplicated parameter values that have a bucket
    pub fn params(&self) -> Vec<f64> {
        let mut params: Vec<f64> = self.keys().map(|k| k.param()).collect();
        params.sort_by(f64::total_cmp);
        params.dedup_by(|a, b| a.to_bits() == b.to_bits());
        params
    }

    /// One flat record per measurement
    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.snapshot())
            .map(|m| MeasurementRecord {
                test: self.spec_name(m.spec()).unwrap_or("<unknown>").to_string(),
                param: m.param(),
                elapsed_ms: m.elapsed_millis(),
                outputs: m.outputs,
            })
            .collect()
    }
}
