//! Held-Karp TSP Solver - Command Line Interface
//!
//! Exact shortest tours for small point sets stored in binary point files.

use clap::{Parser, Subcommand, ValueEnum};
use held_karp_tsp::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use held_karp_tsp::distance::DistanceTable;
use held_karp_tsp::error::Result;
use held_karp_tsp::exact::{brute_force, HeldKarpSolver, SolverConfig, BRUTE_FORCE_LIMIT};
use held_karp_tsp::instance::Instance;
use held_karp_tsp::visualization::{AsciiMap, Visualizer};

use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "held-karp-tsp")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Exact TSP solver for small point sets (Held-Karp bit DP)")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a binary point file exactly
    Solve {
        /// Path to the point file
        #[arg(short, long)]
        input: PathBuf,

        /// Order in which the DP tables are filled
        #[arg(short, long, value_enum, default_value = "bottom-up")]
        strategy: Strategy,

        /// Refuse instances with more points than this
        #[arg(long, default_value = "20")]
        max_points: usize,

        /// Abandon the solve after this many seconds
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Abandon the solve after this many state evaluations
        #[arg(long)]
        max_evaluations: Option<u64>,

        /// Do not draw the character map
        #[arg(long)]
        no_map: bool,

        /// Character map width
        #[arg(long, default_value = "70")]
        map_width: usize,

        /// Character map height
        #[arg(long, default_value = "40")]
        map_height: usize,

        /// Output solution to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write an SVG drawing of the tour
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Write points and tour as plain text for external plotting
        #[arg(long)]
        plot_data: Option<PathBuf>,
    },

    /// Write a random binary point file
    Generate {
        /// Number of points
        #[arg(short = 'n', long)]
        count: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Coordinates are drawn from [0, width)
        #[arg(long, default_value = "64")]
        width: i32,

        /// Coordinates are drawn from [0, height)
        #[arg(long, default_value = "40")]
        height: i32,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Time both DP strategies against the brute-force baseline
    Benchmark {
        /// Directory of .bin point files (random instances when omitted)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Smallest random instance
        #[arg(long, default_value = "4")]
        min_points: usize,

        /// Largest random instance
        #[arg(long, default_value = "14")]
        max_points: usize,

        /// Random instances per size
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Run brute force up to this size
        #[arg(long, default_value = "9")]
        brute_force_limit: usize,

        /// Solve one instance at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Analyze a point file
    Analyze {
        /// Path to the point file
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Strategy {
    /// Fill every state by descending mask size
    BottomUp,
    /// Memoized recursion over reachable states
    TopDown,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let outcome = match cli.command {
        Commands::Solve {
            input,
            strategy,
            max_points,
            time_limit,
            max_evaluations,
            no_map,
            map_width,
            map_height,
            output,
            svg,
            plot_data,
        } => {
            let config = SolverConfig {
                max_points,
                strategy: match strategy {
                    Strategy::BottomUp => held_karp_tsp::exact::Strategy::BottomUp,
                    Strategy::TopDown => held_karp_tsp::exact::Strategy::TopDown,
                },
                time_limit,
                max_evaluations,
            };
            let map = (!no_map).then(|| AsciiMap::new(map_width, map_height));
            solve_instance(&input, config, map, output, svg, plot_data)
        }

        Commands::Generate { count, seed, width, height, output } => {
            generate_instance(count, seed, width, height, &output)
        }

        Commands::Benchmark {
            dir,
            output,
            min_points,
            max_points,
            runs,
            brute_force_limit,
            sequential,
        } => {
            let config = BenchmarkConfig {
                min_points,
                max_points,
                num_runs: runs,
                brute_force_limit,
                parallel: !sequential,
                ..Default::default()
            };
            run_benchmark(dir.as_deref(), &output, config)
        }

        Commands::Analyze { input } => analyze_instance(&input),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve_instance(
    path: &Path,
    config: SolverConfig,
    map: Option<AsciiMap>,
    output: Option<PathBuf>,
    svg: Option<PathBuf>,
    plot_data: Option<PathBuf>,
) -> Result<()> {
    println!("Loading instance from {:?}...", path);
    let instance = Instance::from_file(path)?;

    let solver = HeldKarpSolver::new(config);
    solver.validate(instance.dimension())?;

    if let Some(map) = &map {
        print!("{}", map.render(&instance.points, None));
    }

    println!("Solving {} points with {}...", instance.dimension(), solver.config.strategy);
    let start = Instant::now();
    let result = solver.solve(&instance.points)?;
    let elapsed = start.elapsed();
    let solution = result.solution;

    if let Some(map) = &map {
        print!("{}", map.render(&instance.points, Some(&solution.tour)));
    }

    println!("\n========== Results ==========");
    println!("Algorithm: {}", solution.algorithm);
    println!("total distance = {:.6}", solution.cost);
    println!("{}", solution.route_string());
    println!("Evaluations: {} of {} states", result.evaluations, result.states);
    println!("Time: {:.4}s", elapsed.as_secs_f64());

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(&out_path, json)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if let Some(svg_path) = svg {
        let viz = Visualizer::new();
        let drawing = viz.generate_svg(&instance, &solution);
        viz.save_svg(&drawing, &svg_path)?;
        println!("Visualization saved to {:?}", svg_path);
    }

    if let Some(data_path) = plot_data {
        let data = Visualizer::new().export_plot_data(&instance, &solution);
        std::fs::write(&data_path, data)?;
        println!("Plot data saved to {:?}", data_path);
    }

    Ok(())
}

fn generate_instance(count: usize, seed: u64, width: i32, height: i32, output: &Path) -> Result<()> {
    let instance = Instance::random(count, seed, width, height);
    instance.save(output)?;
    println!("Wrote {} points to {:?}", count, output);
    Ok(())
}

fn run_benchmark(dir: Option<&Path>, output: &Path, config: BenchmarkConfig) -> Result<()> {
    let mut benchmark = Benchmark::new(config);

    let instances = match dir {
        Some(dir) => {
            println!("Loading instances from {:?}...", dir);
            load_instances_from_dir(dir)
        }
        None => benchmark.generate_instances(),
    };

    println!("Found {} instances", instances.len());
    if instances.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    std::fs::create_dir_all(output)?;
    benchmark.run_on_instances(&instances)?;
    if !benchmark.skipped().is_empty() {
        eprintln!("Skipped {} instances the solver refuses", benchmark.skipped().len());
    }

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn analyze_instance(path: &Path) -> Result<()> {
    let mut instance = Instance::from_file(path)?;
    if instance.name.is_empty() {
        instance.name = path.display().to_string();
    }

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    if instance.dimension() < 2 {
        println!("Too few points to form a tour.");
        return Ok(());
    }

    let dist = DistanceTable::from_points(&instance.points)?;
    let solver = HeldKarpSolver::default();
    match solver.validate(instance.dimension()) {
        Ok(()) => {
            let exact = solver.solve_table(&dist)?;
            println!("Exact optimum: {:.6} ({:.4}s)", exact.solution.cost, exact.solution.computation_time);
        }
        Err(e) => println!("Exact solve skipped: {}", e),
    }

    if instance.dimension() <= BRUTE_FORCE_LIMIT {
        let start = Instant::now();
        let (cost, _) = brute_force(&dist)?;
        println!("Brute force: {:.6} ({:.4}s)", cost, start.elapsed().as_secs_f64());
    }

    Ok(())
}
