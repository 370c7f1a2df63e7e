//! Standalone benchmark runner.

use std::fs;
use std::path::PathBuf;

use rg_bench::{BenchmarkSuite, default_benchmarks, run_scenario};

const RUNS: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let crate_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = crate_path
        .parent()
        .and_then(|p| p.parent())
        .ok_or("Could not determine repo root")?
        .to_path_buf();

    println!("resgrid benchmark suite");
    println!("=======================\n");

    let benchmarks = default_benchmarks();
    println!("Running {} benchmarks, {RUNS} runs each...\n", benchmarks.len());

    let mut results = Vec::new();
    for (idx, scenario) in benchmarks.iter().enumerate() {
        print!("[{}/{}] {} ... ", idx + 1, benchmarks.len(), scenario.name);
        std::io::Write::flush(&mut std::io::stdout())?;

        match run_scenario(scenario, RUNS) {
            Ok(result) => {
                println!("OK ({:.3}s median)", result.aggregate.total_time_median_s);
                results.push(result);
            }
            Err(e) => {
                println!("FAILED");
                eprintln!("  Error: {e}");
            }
        }
    }

    println!();
    for result in &results {
        let agg = &result.aggregate;
        println!("{}", result.scenario.name);
        println!(
            "  Total:      {:.4}s (median), min: {:.4}s, max: {:.4}s",
            agg.total_time_median_s, agg.total_time_min_s, agg.total_time_max_s
        );
        println!("  Faults:     {:.4}s (median)", agg.fault_time_median_s);
        println!("  Statistics: {:.4}s (median)", agg.statistics_time_median_s);
        println!("  Condense:   {:.4}s (median)", agg.condense_time_median_s);
        if let Some(run) = result.runs.first() {
            println!(
                "  Cells: {} ({} active), fault faces: {}, condensed pairs: {}",
                run.cell_count, run.active_cell_count, run.fault_faces, run.condensed_pairs
            );
        }
        println!();
    }

    let suite = BenchmarkSuite {
        timestamp: chrono::Utc::now().to_rfc3339(),
        results,
    };
    let baseline_dir = repo_root.join("benchmarks");
    fs::create_dir_all(&baseline_dir)?;
    let baseline_path = baseline_dir.join("baseline.json");
    fs::write(&baseline_path, serde_json::to_string_pretty(&suite)?)?;
    println!("Baseline saved to: {}", baseline_path.display());

    Ok(())
}
