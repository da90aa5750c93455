use crate::config::Config;
use crate::input::*;
use charts::{
    apply_filters, compute_availability, filter_options, Dimension, FilterAvailability,
    FilterSelection, PerformanceRecord,
};
use clap::{ArgMatches, Command};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

pub fn command() -> Command {
    Command::new("filters")
        .about("Show filter options and which of them remain selectable")
        .arg(input_arg("Performance records as a JSON array"))
        .args(record_args())
        .arg(pretty_arg())
}

#[derive(Serialize)]
struct Report {
    selection: FilterSelection,
    matching: usize,
    options: BTreeMap<Dimension, Vec<String>>,
    availability: FilterAvailability,
}

pub fn run(args: &ArgMatches, _config: Config) -> anyhow::Result<()> {
    let records: Vec<PerformanceRecord> = read_json(input_path(args))?;

    // only --dedup applies here; the selection is what is being evaluated
    let records = if args.get_flag("DEDUP") {
        charts::dedup_records(&records)
    } else {
        records
    };

    let selection = selection(args)?;
    let matching = apply_filters(&records, &selection).len();

    info!("{matching} of {} records match the selection", records.len());

    let report = Report {
        options: filter_options(&records),
        availability: compute_availability(&records, &selection),
        selection,
        matching,
    };

    write_json(&report, args.get_flag("PRETTY"))
}
