//! Test Planner
//!
//! Builds the execution plan by filtering the suite's tests with a regex
//! on their display names.
//!
//! Ordering: registration order is kept, so test identities in the report
//! follow the order in which the suite declared them.

use gauntlet_core::TestSpec;
use regex::Regex;
use std::sync::Arc;

/// Execution plan for a run
pub struct ExecutionPlan {
    /// Selected tests, in registration order
    pub tests: Vec<Arc<dyn TestSpec>>,
}

impl ExecutionPlan {
    /// Display names of the selected tests
    pub fn names(&self) -> Vec<String> {
        self.tests.iter().map(|t| t.display_name()).collect()
    }

    /// Whether the filter left no test
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// Build execution plan from registered tests
pub fn build_plan<'a>(
    tests: impl IntoIterator<Item = &'a Arc<dyn TestSpec>>,
    filter: Option<&Regex>,
) -> ExecutionPlan {
    let selected = tests
        .into_iter()
        .filter(|t| match filter {
            Some(re) => re.is_match(&t.display_name()),
            None => true,
        })
        .cloned()
        .collect();

    ExecutionPlan { tests: selected }
}
