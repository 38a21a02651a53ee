//! Test Capabilities
//!
//! A [`TestSpec`] is a factory registered with the scheduler; every iteration
//! it produces one fresh [`Test`] instance, which is then run once per
//! parameter value. Runs for different parameter values of the same iteration
//! share that instance and may execute concurrently, hence `Send + Sync`.

use std::error::Error;
use std::fmt;

/// Error returned by a test run to signal the invocation should be skipped
pub type TestError = Box<dyn Error + Send + Sync + 'static>;

/// Outcome of one test invocation: one value per output dimension
pub type TestOutput = Result<Vec<f64>, TestError>;

/// An algorithm implementation under measurement
pub trait Test: Send + Sync {
    /// Execute once with the given parameter and report the measured outputs
    fn run(&self, param: f64) -> TestOutput;
}

/// Factory producing independent [`Test`] instances
pub trait TestSpec: Send + Sync {
    /// Create a fresh instance for one iteration
    fn new_instance(&self) -> Box<dyn Test>;

    /// Name used in logs and reports
    fn display_name(&self) -> String;
}

impl<F> Test for F
where
    F: Fn(f64) -> TestOutput + Send + Sync,
{
    fn run(&self, param: f64) -> TestOutput {
        self(param)
    }
}

/// A stateless test built from a closure.
///
/// Every instance is a clone of the same closure, so any state it captures
/// through `Arc` is shared across iterations.
#[derive(Clone)]
pub struct FnSpec<F> {
    name: String,
    run: F,
}

impl<F> FnSpec<F>
where
    F: Fn(f64) -> TestOutput + Clone + Send + Sync + 'static,
{
    /// Wrap a closure under the given display name
    pub fn new(name: impl Into<String>, run: F) -> Self {
        Self {
            name: name.into(),
            run,
        }
    }
}

impl<F> TestSpec for FnSpec<F>
where
    F: Fn(f64) -> TestOutput + Clone + Send + Sync + 'static,
{
    fn new_instance(&self) -> Box<dyn Test> {
        Box::new(self.run.clone())
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl<F> fmt::Debug for FnSpec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSpec").field("name", &self.name).finish()
    }
}
