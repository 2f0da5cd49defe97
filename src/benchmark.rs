//! Benchmarking and experimentation module.
//!
//! Runs both DP strategies, and the brute-force baseline where it is still
//! affordable, over a set of instances, checks that they agree, and collects
//! timing statistics per solver and instance size.

use crate::distance::DistanceTable;
use crate::exact::{brute_force, HeldKarpSolver, SolverConfig, Strategy, BRUTE_FORCE_LIMIT};
use crate::error::Result;
use crate::instance::Instance;

use indicatif::{ProgressBar, ProgressStyle};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

/// Name recorded for the exhaustive baseline
pub const BRUTE_FORCE_NAME: &str = "BruteForce";

/// Result of running a single solver on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Solver name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Number of points
    pub dimension: usize,
    /// Tour length
    pub cost: f64,
    /// Computation time in seconds
    pub time: f64,
    /// DP state evaluations (if applicable)
    pub evaluations: Option<u64>,
    /// Whether the cost agrees with the bottom-up reference within tolerance
    pub matches_reference: bool,
}

/// Aggregated statistics for one solver at one instance size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    pub dimension: usize,
    pub runs: usize,
    pub avg_time: f64,
    pub std_time: f64,
    pub max_time: f64,
    pub avg_evaluations: Option<f64>,
    pub mismatches: usize,
}

/// Instance refused before any solver ran
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedInstance {
    pub instance: String,
    pub dimension: usize,
    pub reason: String,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Smallest generated instance
    pub min_points: usize,
    /// Largest generated instance
    pub max_points: usize,
    /// Instances (seeds) per size
    pub num_runs: usize,
    /// Run brute force up to this size
    pub brute_force_limit: usize,
    /// Largest instance handed to the DP; bigger ones are skipped
    pub solver_max_points: usize,
    /// Coordinate range of generated instances
    pub width: i32,
    pub height: i32,
    /// Solve instances in parallel (each solve stays single-threaded)
    pub parallel: bool,
    /// Show a progress bar
    pub progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            min_points: 4,
            max_points: 14,
            num_runs: 5,
            brute_force_limit: 9,
            solver_max_points: SolverConfig::default().max_points,
            width: 64,
            height: 40,
            parallel: true,
            progress: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    skipped: Vec<SkippedInstance>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Seeded random instances covering the configured size range
    pub fn generate_instances(&self) -> Vec<Instance> {
        let mut instances = Vec::new();
        for n in self.config.min_points.max(2)..=self.config.max_points {
            for seed in 0..self.config.num_runs as u64 {
                instances.push(Instance::random(n, seed, self.config.width, self.config.height));
            }
        }
        instances
    }

    /// Run every solver on every accepted instance. Instances the solver
    /// would refuse (too few or too many points) are recorded as skipped.
    pub fn run_on_instances(&mut self, instances: &[Instance]) -> Result<()> {
        let gate = HeldKarpSolver::new(solver_config(&self.config, Strategy::BottomUp));
        let mut accepted = Vec::with_capacity(instances.len());
        let mut skipped = Vec::new();
        for instance in instances {
            match gate.validate(instance.dimension()) {
                Ok(()) => accepted.push(instance),
                Err(e) => {
                    log::warn!("skipping {}: {}", instance.name, e);
                    skipped.push(SkippedInstance {
                        instance: instance.name.clone(),
                        dimension: instance.dimension(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let progress = if self.config.progress {
            let bar = ProgressBar::new(accepted.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} instances [{elapsed_precise}]")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let config = &self.config;
        let run = |instance: &&Instance| {
            let out = run_instance(config, instance);
            progress.inc(1);
            out
        };

        let batches: Vec<Result<Vec<AlgorithmResult>>> = if self.config.parallel {
            accepted.par_iter().map(run).collect()
        } else {
            accepted.iter().map(run).collect()
        };
        progress.finish_and_clear();

        // nothing is recorded unless every batch succeeded
        let batches = batches.into_iter().collect::<Result<Vec<_>>>()?;
        self.results.extend(batches.into_iter().flatten());
        self.skipped.extend(skipped);
        Ok(())
    }

    /// Compute statistics per solver and size
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut groups: BTreeMap<(String, usize), Vec<&AlgorithmResult>> = BTreeMap::new();
        for result in &self.results {
            groups
                .entry((result.algorithm.clone(), result.dimension))
                .or_default()
                .push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = groups
            .into_iter()
            .map(|((algorithm, dimension), results)| {
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();
                let evaluations: Vec<f64> = results
                    .iter()
                    .filter_map(|r| r.evaluations.map(|e| e as f64))
                    .collect();

                let std_time = if times.len() > 1 { times.iter().std_dev() } else { 0.0 };

                AlgorithmStatistics {
                    algorithm,
                    dimension,
                    runs: results.len(),
                    avg_time: times.iter().mean(),
                    std_time,
                    max_time: times.iter().cloned().fold(0.0, f64::max),
                    avg_evaluations: if evaluations.is_empty() {
                        None
                    } else {
                        Some(evaluations.iter().mean())
                    },
                    mismatches: results.iter().filter(|r| !r.matches_reference).count(),
                }
            })
            .collect();

        statistics.sort_by_key(|s| (s.dimension, OrderedFloat(s.avg_time)));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("      Held-Karp TSP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        report.push_str(&format!(
            "{:<20} {:>4} {:>5} {:>12} {:>12} {:>14} {:>10}\n",
            "Algorithm", "n", "Runs", "Avg Time", "Std Time", "Avg Evals", "Mismatch"
        ));
        report.push_str("-".repeat(83).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            let evals = stat
                .avg_evaluations
                .map(|e| format!("{:.0}", e))
                .unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "{:<20} {:>4} {:>5} {:>12.6} {:>12.6} {:>14} {:>10}\n",
                stat.algorithm, stat.dimension, stat.runs, stat.avg_time, stat.std_time, evals, stat.mismatches
            ));
        }

        report.push_str("-".repeat(83).as_str());
        report.push('\n');

        let mismatches = self.results.iter().filter(|r| !r.matches_reference).count();
        if mismatches == 0 {
            report.push_str("All solvers agree on every instance.\n");
        } else {
            report.push_str(&format!("{} runs disagree with the reference optimum!\n", mismatches));
        }

        if !self.skipped.is_empty() {
            report.push_str(&format!("\nSkipped {} instances:\n", self.skipped.len()));
            for skip in &self.skipped {
                report.push_str(&format!("  {} (n={}): {}\n", skip.instance, skip.dimension, skip.reason));
            }
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    /// Instances refused before solving
    pub fn skipped(&self) -> &[SkippedInstance] {
        &self.skipped
    }
}

fn solver_config(config: &BenchmarkConfig, strategy: Strategy) -> SolverConfig {
    SolverConfig {
        max_points: config.solver_max_points,
        strategy,
        ..Default::default()
    }
}

/// Solve one instance with every applicable solver. The bottom-up DP is the reference.
fn run_instance(config: &BenchmarkConfig, instance: &Instance) -> Result<Vec<AlgorithmResult>> {
    let n = instance.dimension();
    let dist = DistanceTable::from_points(&instance.points)?;
    let mut results = Vec::with_capacity(3);

    let mut reference = None;
    for strategy in [Strategy::BottomUp, Strategy::TopDown] {
        let solver = HeldKarpSolver::new(solver_config(config, strategy));
        let exact = solver.solve_table(&dist)?;
        let cost = exact.solution.cost;
        let reference_cost = *reference.get_or_insert(cost);

        results.push(AlgorithmResult {
            algorithm: strategy.name().to_string(),
            instance: instance.name.clone(),
            dimension: n,
            cost,
            time: exact.solution.computation_time,
            evaluations: Some(exact.evaluations),
            matches_reference: agrees(cost, reference_cost, &instance.name, strategy.name()),
        });
    }

    if n <= config.brute_force_limit.min(BRUTE_FORCE_LIMIT) {
        let start = Instant::now();
        let (cost, _) = brute_force(&dist)?;
        let time = start.elapsed().as_secs_f64();
        let reference_cost = reference.unwrap_or(cost);

        results.push(AlgorithmResult {
            algorithm: BRUTE_FORCE_NAME.to_string(),
            instance: instance.name.clone(),
            dimension: n,
            cost,
            time,
            evaluations: None,
            matches_reference: agrees(cost, reference_cost, &instance.name, BRUTE_FORCE_NAME),
        });
    }

    Ok(results)
}

fn agrees(cost: f64, reference: f64, instance: &str, algorithm: &str) -> bool {
    let ok = (cost - reference).abs() <= 1e-9 * reference.abs().max(1.0);
    if !ok {
        log::warn!(
            "{} on {}: cost {:.9} differs from reference {:.9}",
            algorithm,
            instance,
            cost,
            reference
        );
    }
    ok
}

/// Helper function to load binary point files from a directory
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Vec<Instance> {
    let mut instances = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "bin").unwrap_or(false) {
                match Instance::from_file(&path) {
                    Ok(instance) => instances.push(instance),
                    Err(e) => log::warn!("skipping {}: {}", path.display(), e),
                }
            }
        }
    }

    // Sort by dimension
    instances.sort_by_key(|i| i.dimension());

    instances
}
