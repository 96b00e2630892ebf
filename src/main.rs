use clap::Parser;

use grid_astar::config::Config;
use grid_astar::simulation;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = Config::parse();

    if !config.quiet {
        println!("Starting A* search...");
        match &config.map {
            Some(path) => println!("Map: {}", path.display()),
            None => println!(
                "Grid size: {0}x{0}, barriers: {1}",
                config.grid_size, config.num_barriers
            ),
        }
        if config.no_visualization {
            println!("Visualization disabled - running in fast mode");
        } else {
            println!("Visualization enabled with {}ms delay", config.delay_ms);
        }
        println!();
    }

    let report = match simulation::run(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("=== FINAL RESULTS ===");
    println!("{}", report);

    if !report.found && !report.cancelled {
        process::exit(2);
    }
}
