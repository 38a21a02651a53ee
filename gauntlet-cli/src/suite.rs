//! Test Suite
//!
//! The set of tests a benchmark binary hands to [`run`](crate::run), plus
//! the iteration count and parameter values its author considers sensible.
//! Configuration files and command-line flags override both.

use gauntlet_core::TestSpec;
use std::sync::Arc;

/// Named collection of registered tests
#[derive(Clone)]
pub struct Suite {
    title: String,
    tests: Vec<Arc<dyn TestSpec>>,
    iterations: Option<usize>,
    params: Option<Vec<f64>>,
}

impl Suite {
    /// Empty suite with a title used in reports
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tests: Vec::new(),
            iterations: None,
            params: None,
        }
    }

    /// Add a test factory
    pub fn test<S>(mut self, spec: S) -> Self
    where
        S: TestSpec + 'static,
    {
        self.tests.push(Arc::new(spec));
        self
    }

    /// Add an already shared test factory
    pub fn shared_test(mut self, spec: Arc<dyn TestSpec>) -> Self {
        self.tests.push(spec);
        self
    }

    /// Suggested iteration count
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Suggested parameter values
    pub fn params(mut self, params: impl Into<Vec<f64>>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Title used in reports
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Registered tests, in registration order
    pub fn tests(&self) -> &[Arc<dyn TestSpec>] {
        &self.tests
    }

    /// Iteration count set with [`iterations`](Self::iterations)
    pub fn suggested_iterations(&self) -> Option<usize> {
        self.iterations
    }

    /// Parameter values set with [`params`](Self::params)
    pub fn suggested_params(&self) -> Option<&[f64]> {
        self.params.as_deref()
    }

    /// Number of registered tests
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether no test has been registered
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.tests.iter().map(|t| t.display_name()).collect();
        f.debug_struct("Suite")
            .field("title", &self.title)
            .field("tests", &names)
            .field("iterations", &self.iterations)
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::FnSpec;

    #[test]
    fn test_builder() {
        let suite = Suite::new("sorting")
            .test(FnSpec::new("a", |_| Ok(vec![])))
            .test(FnSpec::new("b", |_| Ok(vec![])))
            .iterations(4)
            .params([1.0, 2.0]);

        assert_eq!(suite.title(), "sorting");
        assert_eq!(suite.len(), 2);
        assert_eq!(suite.suggested_iterations(), Some(4));
        assert_eq!(suite.suggested_params(), Some(&[1.0, 2.0][..]));
        assert!(format!("{:?}", suite).contains("\"b\""));
    }
}
