use crate::config::Config;
use crate::input::*;
use charts::metric_unit;
use charts::timeseries::{analyze_trend, TrendSample};
use clap::{Arg, ArgMatches, Command};

pub fn command() -> Command {
    Command::new("trend")
        .about("Analyze the trend of one metric over time")
        .arg(input_arg("Historical samples as a JSON array"))
        .arg(
            Arg::new("METRIC")
                .long("metric")
                .help("Metric the samples carry, used for the unit")
                .default_value("iops")
                .action(clap::ArgAction::Set),
        )
        .arg(pretty_arg())
}

pub fn run(args: &ArgMatches, _config: Config) -> anyhow::Result<()> {
    let metric = args
        .get_one::<String>("METRIC")
        .map(String::as_str)
        .unwrap_or("iops");

    let samples: Vec<TrendSample> = read_json(input_path(args))?;
    let report = analyze_trend(&samples, metric_unit(metric));

    write_json(&report, args.get_flag("PRETTY"))
}
