use crate::config::Config;
use crate::input::*;
use charts::{process_radar_grid_data, PerformanceRecord};
use clap::{ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("radar")
        .about("Score drive pools per host on normalized radar axes")
        .arg(input_arg("Performance records as a JSON array"))
        .args(sorting_args())
        .args(record_args())
        .arg(pretty_arg())
}

pub fn run(args: &ArgMatches, mut config: Config) -> anyhow::Result<()> {
    apply_sorting(args, config.chart_mut());

    let records: Vec<PerformanceRecord> = read_json(input_path(args))?;
    let records = prepare_records(args, records)?;

    let grid =
        process_radar_grid_data(&records, config.chart().colors(), &config.chart().sorting());

    info!(
        "radar grid: {} hosts, {} pools",
        grid.len(),
        grid.iter().map(|e| e.pools.len()).sum::<usize>()
    );

    write_json(&grid, args.get_flag("PRETTY"))
}
