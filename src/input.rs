use crate::config::Chart;
use anyhow::{bail, Context};
use charts::{
    apply_filters, dedup_records, Dimension, FilterSelection, GroupBy, PerformanceRecord, SortBy,
    SortOrder,
};
use clap::{value_parser, Arg, ArgMatches};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn input_arg(help: &'static str) -> Arg {
    Arg::new("INPUT")
        .help(help)
        .long_help(format!("{help}. Use - to read from stdin."))
        .value_parser(value_parser!(PathBuf))
        .action(clap::ArgAction::Set)
        .required(true)
        .index(1)
}

pub fn pretty_arg() -> Arg {
    Arg::new("PRETTY")
        .long("pretty")
        .help("Pretty-print the JSON output")
        .action(clap::ArgAction::SetTrue)
}

pub fn sorting_args() -> [Arg; 3] {
    [
        Arg::new("SORT_BY")
            .long("sort-by")
            .help("Sort key, overrides the config file")
            .value_parser(value_parser!(SortBy))
            .action(clap::ArgAction::Set),
        Arg::new("SORT_ORDER")
            .long("sort-order")
            .help("asc or desc, overrides the config file")
            .value_parser(value_parser!(SortOrder))
            .action(clap::ArgAction::Set),
        Arg::new("GROUP_BY")
            .long("group-by")
            .help("Grouping, overrides the config file")
            .value_parser(value_parser!(GroupBy))
            .action(clap::ArgAction::Set),
    ]
}

pub fn record_args() -> [Arg; 2] {
    [
        Arg::new("FILTER")
            .long("filter")
            .short('f')
            .help("Keep records matching DIMENSION=VALUE (repeatable)")
            .action(clap::ArgAction::Append),
        Arg::new("DEDUP")
            .long("dedup")
            .help("Drop records sharing an identity, keeping the first")
            .action(clap::ArgAction::SetTrue),
    ]
}

pub fn apply_sorting(args: &ArgMatches, chart: &mut Chart) {
    if let Some(sort_by) = args.get_one::<SortBy>("SORT_BY") {
        chart.set_sort_by(*sort_by);
    }
    if let Some(sort_order) = args.get_one::<SortOrder>("SORT_ORDER") {
        chart.set_sort_order(*sort_order);
    }
    if let Some(group_by) = args.get_one::<GroupBy>("GROUP_BY") {
        chart.set_group_by(*group_by);
    }
}

pub fn parse_filter(filter: &str) -> anyhow::Result<(Dimension, String)> {
    let Some((dimension, value)) = filter.split_once('=') else {
        bail!("filter must look like DIMENSION=VALUE: {filter}");
    };

    let dimension: Dimension = dimension.parse()?;

    Ok((dimension, value.trim().to_string()))
}

pub fn selection(args: &ArgMatches) -> anyhow::Result<FilterSelection> {
    let mut selection = FilterSelection::new();

    for filter in args.get_many::<String>("FILTER").into_iter().flatten() {
        let (dimension, value) = parse_filter(filter)?;
        selection = selection.select(dimension, value);
    }

    Ok(selection)
}

/// Applies `--dedup` and `--filter` to decoded records.
pub fn prepare_records(
    args: &ArgMatches,
    records: Vec<PerformanceRecord>,
) -> anyhow::Result<Vec<PerformanceRecord>> {
    let total = records.len();

    let records = if args.get_flag("DEDUP") {
        dedup_records(&records)
    } else {
        records
    };

    let selection = selection(args)?;
    if selection.is_empty() {
        return Ok(records);
    }

    let kept: Vec<PerformanceRecord> = apply_filters(&records, &selection)
        .into_iter()
        .cloned()
        .collect();

    debug!("kept {} of {total} records", kept.len());

    Ok(kept)
}

pub fn input_path(args: &ArgMatches) -> &Path {
    args.get_one::<PathBuf>("INPUT")
        .map(|p| p.as_path())
        .unwrap_or(Path::new("-"))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        content
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?
    };

    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

pub fn write_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }

    writeln!(out)?;
    Ok(())
}
