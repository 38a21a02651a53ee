//! Integration tests for Gauntlet
//!
//! These tests verify the end-to-end behavior of the scheduler and the
//! statistics built on top of its results.

use gauntlet::{
    FnSpec, Metric, Scheduler, SchedulerConfig, SummaryStatistic, Test, TestOutput, TestSpec,
    build_report, welch_t_test,
};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn config(iterations: usize, params: Vec<f64>, parallelism: usize) -> SchedulerConfig {
    SchedulerConfig {
        iterations,
        param_values: params,
        parallelism,
        show_progress: false,
    }
}

/// Test factory that knows which iteration each of its instances belongs to
struct IterationAware<F> {
    name: String,
    created: Arc<AtomicUsize>,
    body: F,
}

impl<F> IterationAware<F>
where
    F: Fn(usize, f64) -> TestOutput + Clone + Send + Sync + 'static,
{
    fn new(name: &str, body: F) -> Self {
        Self {
            name: name.to_string(),
            created: Arc::new(AtomicUsize::new(0)),
            body,
        }
    }
}

struct IterationInstance<F> {
    iteration: usize,
    body: F,
}

impl<F> Test for IterationInstance<F>
where
    F: Fn(usize, f64) -> TestOutput + Send + Sync,
{
    fn run(&self, param: f64) -> TestOutput {
        (self.body)(self.iteration, param)
    }
}

impl<F> TestSpec for IterationAware<F>
where
    F: Fn(usize, f64) -> TestOutput + Clone + Send + Sync + 'static,
{
    fn new_instance(&self) -> Box<dyn Test> {
        Box::new(IterationInstance {
            iteration: self.created.fetch_add(1, Ordering::SeqCst),
            body: self.body.clone(),
        })
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

/// Every key holds exactly `iterations` measurements when nothing fails
#[test]
fn test_exact_counts_without_failures() {
    for iterations in [1, 4, 9] {
        let mut scheduler = Scheduler::new(config(iterations, vec![0.5, 1.5, 2.5], 3));
        scheduler.add_test(FnSpec::new("noop", |p| Ok(vec![p])));
        let outcome = scheduler.run().unwrap();

        assert_eq!(outcome.results.len(), 3);
        for key in outcome.results.keys() {
            assert_eq!(
                outcome.results.measurements(&key).unwrap().len(),
                iterations
            );
        }
    }
}

/// Failing on odd iterations (0-based) leaves ceil(n / 2) measurements
#[test]
fn test_odd_iteration_failures_are_skipped() {
    let spec = IterationAware::new("odd-fails", |iteration: usize, _: f64| -> TestOutput {
        if iteration % 2 == 1 {
            Err(format!("iteration {} rejected", iteration).into())
        } else {
            Ok(vec![iteration as f64])
        }
    });

    let mut scheduler = Scheduler::new(config(7, vec![1.0, 2.0], 2));
    scheduler.add_test(spec);
    let outcome = scheduler.run().unwrap();

    for key in outcome.results.keys() {
        let measurements = outcome.results.measurements(&key).unwrap();
        assert_eq!(measurements.len(), 4);

        let attempts = outcome.results.attempts(&key).unwrap();
        assert_eq!(attempts.attempted, 7);
        assert_eq!(attempts.succeeded, 4);
        assert_eq!(attempts.failed, 3);
        assert!(attempts.is_short());
    }
}

/// Welford accumulation agrees with a two-pass computation
#[test]
fn test_online_statistics_match_two_pass() {
    let stat: SummaryStatistic = [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().collect();
    assert_eq!(stat.mean(), Some(3.0));
    assert!((stat.variance().unwrap() - 2.5).abs() < 1e-12);

    let mut rng = rand::thread_rng();
    let data: Vec<f64> = (0..10_000).map(|_| 1e6 + rng.gen_range(-5.0..5.0)).collect();
    let stat: SummaryStatistic = data.iter().copied().collect();

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

    assert!((stat.mean().unwrap() - mean).abs() < 1e-6);
    assert!((stat.variance().unwrap() - variance).abs() / variance < 1e-6);
}

#[test]
fn test_significance_extremes() {
    let same = welch_t_test(&[5.0; 10], &[5.0; 10]).unwrap();
    assert!((same.p_value - 1.0).abs() < 1e-9);
    assert!(!same.is_significant(0.05));

    let apart = welch_t_test(&[1.0; 5], &[100.0; 5]).unwrap();
    assert!(apart.p_value < 1e-6);
    assert!(apart.is_significant(0.05));

    let noisy_apart =
        welch_t_test(&[1.0, 1.1, 0.9, 1.05, 0.95], &[100.0, 100.2, 99.8, 100.1, 99.9]).unwrap();
    assert!(noisy_apart.p_value < 1e-6);
}

#[derive(Debug, Clone, Copy)]
struct Span {
    iteration: usize,
    start: Instant,
    end: Instant,
}

/// No run of iteration i + 1 starts before the barrier of iteration i
#[test]
fn test_iteration_barrier_ordering() {
    let spans = Arc::new(Mutex::new(Vec::<Span>::new()));
    let barriers = Arc::new(Mutex::new(Vec::<(usize, Instant)>::new()));

    let mut scheduler = Scheduler::new(config(5, vec![1.0, 2.0, 3.0, 4.0], 4));
    for name in ["slow", "fast"] {
        let spans = spans.clone();
        scheduler.add_test(IterationAware::new(name, move |iteration: usize, param: f64| -> TestOutput {
            let start = Instant::now();
            // Stagger runs so the last one of each iteration finishes well after the first
            std::thread::sleep(Duration::from_millis(param as u64 * 2));
            spans.lock().unwrap().push(Span {
                iteration,
                start,
                end: Instant::now(),
            });
            Ok(vec![param])
        }));
    }

    let recorded = barriers.clone();
    scheduler.add_listener(move |index: usize| {
        recorded.lock().unwrap().push((index, Instant::now()));
    });

    let outcome = scheduler.run().unwrap();
    assert_eq!(outcome.results.total_measurements(), 5 * 2 * 4);

    let barriers = barriers.lock().unwrap();
    assert_eq!(
        barriers.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );

    let spans = spans.lock().unwrap();
    assert_eq!(spans.len(), 40);
    for span in spans.iter() {
        let (_, done) = barriers[span.iteration];
        assert!(span.end <= done, "run finished after its own barrier");
        if span.iteration > 0 {
            let (_, previous) = barriers[span.iteration - 1];
            assert!(span.start >= previous, "run started before the previous barrier");
        }
    }
}

/// Many concurrent appends across keys lose and duplicate nothing
#[test]
fn test_concurrent_append_stress() {
    let parallelism = 16;
    let iterations = 12;
    let params: Vec<f64> = (1..=6).map(f64::from).collect();
    let succeeded = Arc::new(AtomicUsize::new(0));

    let mut scheduler = Scheduler::new(config(iterations, params.clone(), parallelism));
    for name in ["spin", "sleep", "flaky"] {
        let succeeded = succeeded.clone();
        scheduler.add_test(FnSpec::new(name, move |param: f64| -> TestOutput {
            let mut rng = rand::thread_rng();
            match rng.gen_range(0..3) {
                0 => std::thread::sleep(Duration::from_micros(rng.gen_range(100..1_500))),
                1 => {
                    let mut acc = 0u64;
                    for i in 0..rng.gen_range(1_000..20_000u64) {
                        acc = acc.wrapping_add(i * i);
                    }
                    std::hint::black_box(acc);
                }
                _ => {}
            }
            if name == "flaky" && rng.gen_bool(0.3) {
                return Err("flaky run".into());
            }
            succeeded.fetch_add(1, Ordering::SeqCst);
            Ok(vec![param])
        }));
    }

    let outcome = scheduler.run().unwrap();
    let results = &outcome.results;
    let total_tasks = iterations * 3 * params.len();

    assert_eq!(results.len(), 3 * params.len());
    assert_eq!(results.total_measurements(), succeeded.load(Ordering::SeqCst));

    let attempted: usize = results
        .keys()
        .map(|k| results.attempts(&k).unwrap().attempted)
        .sum();
    assert_eq!(attempted, total_tasks);

    // Each measurement sits in the bucket of the key it was produced for
    for key in results.keys() {
        for m in results.measurements(&key).unwrap() {
            assert_eq!(m.key(), key);
            assert_eq!(m.outputs(), &[key.param()]);
        }
    }
}

/// Two tests, two params, five iterations
#[test]
fn test_end_to_end_scenario() {
    let mut scheduler = Scheduler::new(config(5, vec![1.0, 2.0], 2));
    let linear = scheduler.add_test(FnSpec::new("linear", |p| Ok(vec![p, p * 10.0])));
    let quadratic = scheduler.add_test(FnSpec::new("quadratic", |p| Ok(vec![p * p, 0.0])));

    let outcome = scheduler.run().unwrap();
    let results = &outcome.results;

    assert_eq!(results.len(), 4);
    for key in results.keys() {
        assert_eq!(results.measurements(&key).unwrap().len(), 5);
    }

    let intervals = results.intervals();
    assert_eq!(intervals.len(), 4);
    for interval in &intervals {
        assert_eq!(interval.runtime().count(), 5);
        assert_eq!(interval.dimensions(), 2);
    }

    // At param 1.0 both tests output exactly 1.0 in dimension 0
    let same = results
        .compare(linear, quadratic, 1.0, Metric::Output(0))
        .unwrap();
    assert!((same.p_value - 1.0).abs() < 1e-12);

    let differ = results
        .compare(linear, quadratic, 2.0, Metric::Output(1))
        .unwrap();
    assert!(differ.p_value < 1e-6);

    let report = build_report(&outcome, "end-to-end", 0.05);
    assert_eq!(report.summary.measurements, 20);
    assert_eq!(report.attempts.len(), 4);
    assert!(report.attempts.iter().all(|a| a.attempted == 5 && a.failed == 0));
}

/// Panicking runs are contained like returned errors
#[test]
fn test_panics_do_not_abort_the_run() {
    let mut scheduler = Scheduler::new(config(4, vec![1.0], 2));
    scheduler.add_test(IterationAware::new("panics-first", |iteration: usize, p: f64| -> TestOutput {
        if iteration == 0 {
            panic!("boom on first iteration");
        }
        Ok(vec![p])
    }));
    scheduler.add_test(FnSpec::new("steady", |p| Ok(vec![p])));

    let outcome = scheduler.run().unwrap();
    let counts: Vec<usize> = outcome
        .results
        .keys()
        .map(|k| outcome.results.measurements(&k).unwrap().len())
        .collect();
    assert_eq!(counts, vec![3, 4]);
}
