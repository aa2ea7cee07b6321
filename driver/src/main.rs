use anyhow::bail;
use clap::Parser;
use generator::profile::build_scenarios;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;
use workflow::source::{load_workbook, save_workbook, WORKBOOK_LAYOUT};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Renders three-phase phasor diagrams for scenario workbooks")]
struct Args {
    /// Scenario workbook (.json, .yaml, .yml, .xlsx, .xlsm, .xls or .ods)
    #[arg(long, conflicts_with = "generate")]
    workbook: Option<PathBuf>,
    /// Synthesize this many unbalanced scenarios instead of reading a workbook
    #[arg(long)]
    generate: Option<usize>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the scenarios back out as a workbook
    #[arg(long)]
    export_workbook: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 50.0)]
    triangle_amplitude: f64,
    #[arg(long, default_value_t = 1.5)]
    current_scale: f64,
    #[arg(long, default_value_t = 12.0)]
    label_fontsize: f64,
    #[arg(long, default_value_t = 10.0)]
    overview_label_fontsize: f64,
    #[arg(long, default_value_t = 4)]
    overview_columns: usize,
    #[arg(long, default_value = "out")]
    output: PathBuf,
    #[arg(long, default_value_t = false)]
    no_overview: bool,
    /// Render only this scenario (numbered from 1)
    #[arg(long)]
    scenario: Option<usize>,
    /// Print the expected workbook layout and exit
    #[arg(long, default_value_t = false)]
    describe_workbook: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.describe_workbook {
        println!("{WORKBOOK_LAYOUT}");
        return Ok(());
    }

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.triangle_amplitude,
            args.current_scale,
            args.label_fontsize,
            args.overview_label_fontsize,
            args.overview_columns,
        )
    };

    let scenarios = match (&args.workbook, args.generate) {
        (Some(path), _) => load_workbook(path)?,
        (None, Some(count)) => build_scenarios(count, args.seed)?,
        (None, None) => bail!("pass --workbook <path> or --generate <n>"),
    };
    if let Some(path) = &args.export_workbook {
        save_workbook(path, &scenarios)?;
        println!("Workbook written to {}", path.display());
    }

    let selection = match args.scenario {
        Some(0) => bail!("scenarios are numbered from 1"),
        Some(number) => Some(number - 1),
        None => None,
    };

    let runner = Runner::new(workflow_config)?;
    let result = runner.execute(&scenarios, selection, &args.output, !args.no_overview)?;

    for (index, reason) in &result.failures {
        eprintln!("Scenario {} skipped: {}", index + 1, reason);
    }
    for index in &result.fallbacks {
        println!(
            "Scenario {}: optimization unsuccessful, N' set to the triangle centroid",
            index + 1
        );
    }
    if let Some(path) = &result.overview_file {
        println!("Overview -> {}", path.display());
    }
    println!(
        "Rendered {} of {} scenarios into {} (fallbacks {}, clipped arrows {}, failed {})",
        result.metrics.rendered,
        scenarios.len(),
        args.output.display(),
        result.metrics.solver_fallbacks,
        result.metrics.clipped_arrows,
        result.metrics.failed
    );

    Ok(())
}
