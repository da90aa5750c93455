use crate::config::Config;
use crate::input::*;
use charts::timeseries::{generate_series_datasets, MetricType, ServerSeries, SeriesCache};
use clap::{value_parser, Arg, ArgMatches, Command};
use tracing::{debug, info};

pub fn command() -> Command {
    Command::new("series")
        .about("Assemble time-series datasets from per-server points")
        .arg(input_arg(
            "Server series as a JSON array of {label, color, points}",
        ))
        .arg(
            Arg::new("METRICS")
                .long("metrics")
                .short('m')
                .help("Comma separated metrics to chart, overrides the config file")
                .value_parser(value_parser!(MetricType))
                .value_delimiter(',')
                .action(clap::ArgAction::Append),
        )
        .arg(pretty_arg())
}

pub fn run(args: &ArgMatches, mut config: Config) -> anyhow::Result<()> {
    if let Some(metrics) = args.get_many::<MetricType>("METRICS") {
        config.series_mut().set_metrics(metrics.copied().collect());
    }

    let series: Vec<ServerSeries> = read_json(input_path(args))?;

    let cache = SeriesCache::new(config.series().cache_capacity());
    let datasets = generate_series_datasets(&cache, &series, config.series().metrics());

    debug!("series cache: {:?}", cache.stats());
    info!(
        "{} servers -> {} datasets",
        series.len(),
        datasets.len()
    );

    write_json(&datasets, args.get_flag("PRETTY"))
}
