use crate::config::Config;
use crate::input::*;
use charts::{process_data_for_template, PerformanceRecord, Template};
use clap::{value_parser, Arg, ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("chart")
        .about("Build the dataset of a chart template from performance records")
        .arg(input_arg("Performance records as a JSON array"))
        .arg(
            Arg::new("TEMPLATE")
                .long("template")
                .short('t')
                .help("Chart template")
                .value_parser(value_parser!(Template))
                .default_value("performance-overview")
                .action(clap::ArgAction::Set),
        )
        .args(sorting_args())
        .args(record_args())
        .arg(pretty_arg())
}

pub fn run(args: &ArgMatches, mut config: Config) -> anyhow::Result<()> {
    apply_sorting(args, config.chart_mut());

    let template = args
        .get_one::<Template>("TEMPLATE")
        .copied()
        .unwrap_or(Template::Overview);

    let records: Vec<PerformanceRecord> = read_json(input_path(args))?;
    let records = prepare_records(args, records)?;

    let chart = process_data_for_template(
        template,
        &records,
        config.chart().colors(),
        &config.chart().sorting(),
    );

    info!(
        "{}: {} labels, {} datasets",
        template.name(),
        chart.labels.len(),
        chart.datasets.len()
    );

    write_json(&chart, args.get_flag("PRETTY"))
}
