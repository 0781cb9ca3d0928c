//! Randomized checks of the window, trim and aggregation invariants.

use pronghorn_bench::{
    find_window, percentiles, throughput, trim, ExperimentSample, WarmupFraction,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const ROUNDS: usize = 200;

/// Workers with random start skew, random operation spacing and random
/// teardown, all overlapping in the middle.
fn random_sample(rng: &mut StdRng) -> ExperimentSample {
    let workers = rng.gen_range(1..=8);
    let series = (0..workers)
        .map(|_| {
            let mut t = rng.gen_range(0..1_000u64);
            let ops = rng.gen_range(2..200);
            let mut values = Vec::with_capacity(ops);
            for _ in 0..ops {
                values.push(t);
                t += rng.gen_range(1..50);
            }
            // everyone is still running at 10_000
            values.push(10_000 + rng.gen_range(0..1_000));
            values.shuffle(rng);
            values
        })
        .collect();
    ExperimentSample::new(series).unwrap()
}

#[test]
fn window_without_warmup_is_the_overlap() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..ROUNDS {
        let sample = random_sample(&mut rng);
        let last_start = sample.series().iter().filter_map(|s| s.first()).max().unwrap();
        let first_end = sample.series().iter().filter_map(|s| s.last()).min().unwrap();

        let window = find_window(&sample, WarmupFraction::NONE).unwrap();
        assert_eq!(window.start(), last_start);
        assert_eq!(window.end(), first_end);
    }
}

#[test]
fn warmup_moves_start_forward_and_keeps_end() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..ROUNDS {
        let sample = random_sample(&mut rng);
        let base = find_window(&sample, WarmupFraction::NONE).unwrap();

        let mut previous = base;
        for w in [0.1, 0.3, 0.5, 0.7, 0.9] {
            let window = find_window(&sample, WarmupFraction::new(w).unwrap()).unwrap();
            assert_eq!(window.end(), base.end());
            // windows here span thousands of ns, so each 0.2 step moves start
            assert!(window.start() > previous.start());
            previous = window;
        }
    }
}

#[test]
fn trim_is_idempotent_and_stays_inside_the_window() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..ROUNDS {
        let sample = random_sample(&mut rng);
        let warmup = WarmupFraction::new(rng.gen_range(0.0..0.95)).unwrap();
        let window = find_window(&sample, warmup).unwrap();

        let once = trim(&sample, &window);
        assert_eq!(trim(&once, &window), once);
        assert!(once
            .series()
            .iter()
            .flat_map(|s| s.as_slice())
            .all(|&v| window.contains(v)));

        let expected: usize = sample
            .series()
            .iter()
            .map(|s| s.as_slice().iter().filter(|&&v| window.contains(v)).count())
            .sum();
        assert_eq!(once.total_ops(), expected);
    }
}

#[test]
fn time_dilation_scales_throughput_inversely() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..ROUNDS {
        let sample = random_sample(&mut rng);
        let k = rng.gen_range(2..1_000u64);

        let base = throughput(&sample, WarmupFraction::NONE).unwrap();
        let dilated = throughput(&sample.dilated(k).unwrap(), WarmupFraction::NONE).unwrap();
        let expected = base / k as f64;
        assert!(((dilated - expected) / expected).abs() < 1e-9);
    }
}

#[test]
fn percentiles_are_monotone_in_rank() {
    let mut rng = StdRng::seed_from_u64(19);
    let ranks: Vec<f64> = (1..100).map(|r| r as f64).collect();
    for _ in 0..ROUNDS {
        let len = rng.gen_range(1..500);
        let values: Vec<u64> = (0..len).map(|_| rng.gen_range(0..1_000_000)).collect();

        let report = percentiles(&values, &ranks).unwrap();
        let picked: Vec<u64> = report.iter().map(|p| p.value).collect();
        assert!(picked.windows(2).all(|w| w[0] <= w[1]));
        assert!(values.contains(&picked[0]));
    }
}
