//! Gauntlet Example Suite
//!
//! Pits three sorting algorithms against each other on random input of
//! growing size. Each test reports the number of comparisons it made as its
//! single output dimension, next to the runtime gauntlet measures itself.
//!
//! Run with:
//!   cargo run --example sorting                          # Run the suite
//!   cargo run --example sorting -- --help                # Show all options
//!   cargo run --example sorting -- list                  # List tests
//!   cargo run --example sorting -- --filter sort$ -n 20  # Subset, 20 iterations
//!   cargo run --example sorting -- --format json -o out.json

use gauntlet::prelude::*;
use rand::Rng;
use std::hint::black_box;

/// Fresh random input, one vector per iteration and size
fn random_input(len: usize) -> Vec<u32> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen()).collect()
}

fn insertion_sort(data: &mut [u32]) -> u64 {
    let mut comparisons = 0;
    for i in 1..data.len() {
        let mut j = i;
        while j > 0 {
            comparisons += 1;
            if data[j - 1] <= data[j] {
                break;
            }
            data.swap(j - 1, j);
            j -= 1;
        }
    }
    comparisons
}

fn merge_sort(data: &mut [u32]) -> u64 {
    if data.len() < 2 {
        return 0;
    }
    let mid = data.len() / 2;
    let mut comparisons = merge_sort(&mut data[..mid]) + merge_sort(&mut data[mid..]);

    let mut merged = Vec::with_capacity(data.len());
    let (mut i, mut j) = (0, mid);
    while i < mid && j < data.len() {
        comparisons += 1;
        if data[i] <= data[j] {
            merged.push(data[i]);
            i += 1;
        } else {
            merged.push(data[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&data[i..mid]);
    merged.extend_from_slice(&data[j..]);
    data.copy_from_slice(&merged);
    comparisons
}

fn std_sort(data: &mut [u32]) -> u64 {
    let mut comparisons = 0;
    data.sort_unstable_by(|a, b| {
        comparisons += 1;
        a.cmp(b)
    });
    comparisons
}

fn sorting_test(name: &str, sort: fn(&mut [u32]) -> u64) -> impl TestSpec {
    FnSpec::new(name, move |size: f64| -> TestOutput {
        if size < 0.0 {
            return Err(format!("negative input size {}", size).into());
        }
        let mut data = random_input(size as usize);
        let comparisons = sort(black_box(&mut data));
        debug_assert!(data.windows(2).all(|w| w[0] <= w[1]));
        Ok(vec![comparisons as f64])
    })
}

fn main() -> anyhow::Result<()> {
    let suite = Suite::new("sorting")
        .test(sorting_test("insertion_sort", insertion_sort))
        .test(sorting_test("merge_sort", merge_sort))
        .test(sorting_test("std_sort", std_sort))
        .iterations(10)
        .params([100.0, 1_000.0, 5_000.0]);

    gauntlet::run(suite)
}
