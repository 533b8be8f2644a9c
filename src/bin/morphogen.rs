//! Morphogen CLI — developmental genetic programming demos
//!
//! Commands:
//!   morphogen demo    [seed]  — seed, grow, extract and score a network
//!   morphogen formula [seed]  — print the grown programs' formulas
//!   morphogen config          — print the default growth config as JSON

use morphogen_core::growth::{GrowthConfig, SimulationBuilder, SimulationMutator};
use morphogen_core::problem::Problem;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;

fn print_usage() {
    println!(
        r#"
Morphogen — developmental genetic programming

Usage: morphogen <command> [options]

Commands:
  demo    [seed] [trials]  Seed a simulation, grow it, extract a network
                           and score it on a synthetic two-class task;
                           then run mutated trials and report the best
  formula [seed]           Print the formulas of freshly seeded programs
  config                   Print the default growth config as JSON

Examples:
  morphogen demo 42 8
  morphogen formula 7
"#
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "demo" => cmd_demo(&args[2..]),
        "formula" => cmd_formula(&args[2..]),
        "config" => cmd_config(),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
        }
    }
}

/// Two-class task over the unit square: class is the sign of x * y.
struct QuadrantProblem {
    training: (DMatrix<f64>, Vec<usize>),
    validation: (DMatrix<f64>, Vec<usize>),
}

impl QuadrantProblem {
    fn new(rng: &mut impl Rng) -> Self {
        Self { training: Self::batch(rng, 64), validation: Self::batch(rng, 32) }
    }

    fn batch(rng: &mut impl Rng, n: usize) -> (DMatrix<f64>, Vec<usize>) {
        let mut rows = Vec::with_capacity(n * 2);
        let mut classes = Vec::with_capacity(n);
        for _ in 0..n {
            let x = rng.gen::<f64>() * 2.0 - 1.0;
            let y = rng.gen::<f64>() * 2.0 - 1.0;
            rows.push(x);
            rows.push(y);
            classes.push(if x * y > 0.0 { 0 } else { 1 });
        }
        (DMatrix::from_row_slice(n, 2, &rows), classes)
    }
}

impl Problem for QuadrantProblem {
    fn num_inputs(&self) -> usize {
        2
    }

    fn num_outputs(&self) -> usize {
        2
    }

    fn training_set(&self) -> (DMatrix<f64>, Vec<usize>) {
        self.training.clone()
    }

    fn validation_set(&self) -> (DMatrix<f64>, Vec<usize>) {
        self.validation.clone()
    }
}

fn demo_config() -> GrowthConfig {
    GrowthConfig { problem_inputs: vec![2], problem_outputs: vec![2], ..GrowthConfig::default() }
}

fn cmd_demo(args: &[String]) {
    let seed: u64 = args.first().and_then(|s| s.parse().ok()).unwrap_or(42);
    let trials: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(4);
    let mut rng = StdRng::seed_from_u64(seed);

    let problem = QuadrantProblem::new(&mut rng);
    let (validation, expected) = problem.validation_set();

    let builder = SimulationBuilder::new(demo_config());
    let mutator = SimulationMutator::default();
    let mut current = builder.build(&mut rng);
    let mut best_fitness = f64::INFINITY;

    for trial in 0..=trials {
        let result = current
            .grow(&mut rng)
            .and_then(|grown| grown.extract_ann(0))
            .and_then(|ann| ann.forward(&validation));
        match result {
            Ok(outputs) => {
                let fitness = problem.measure_fitness(&expected, &outputs);
                let marker = if fitness < best_fitness { " *" } else { "" };
                best_fitness = best_fitness.min(fitness);
                println!("  trial {:>2}: cross-entropy {:.4}{}", trial, fitness, marker);
            }
            Err(e) => eprintln!("  trial {:>2} failed: {}", trial, e),
        }
        if trial < trials {
            current = match mutator.mutate(&current, &mut rng) {
                Ok(next) => next,
                Err(e) => {
                    eprintln!("  mutation failed: {}", e);
                    return;
                }
            };
        }
    }
    println!("\n  Best cross-entropy over {} trials: {:.4}", trials + 1, best_fitness);
}

fn cmd_formula(args: &[String]) {
    let seed: u64 = args.first().and_then(|s| s.parse().ok()).unwrap_or(42);
    let mut rng = StdRng::seed_from_u64(seed);

    let sim = SimulationBuilder::new(demo_config()).with_middle_nodes(12).build(&mut rng);
    for (name, program) in [("soma", &sim.soma_program), ("dendrite", &sim.dendrite_program)] {
        match program.formula() {
            Ok(formulas) => {
                println!("\n  {} program:", name);
                for (i, formula) in formulas.iter().enumerate() {
                    println!("    out{}: {}", i, formula);
                }
            }
            Err(e) => eprintln!("  {} program is corrupt: {}", name, e),
        }
    }
}

fn cmd_config() {
    match serde_json::to_string_pretty(&GrowthConfig::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize config: {}", e),
    }
}
