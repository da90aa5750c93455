use clap::{value_parser, Arg, Command};
use std::path::PathBuf;
use tracing::{debug, Level};

mod chart;
mod config;
mod filters;
mod input;
mod radar;
mod series;
mod servers;
mod trend;

use config::Config;

fn main() {
    // parse command line options
    let matches = Command::new(env!("CARGO_BIN_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_about(
            "fioviz turns FIO benchmark records into chart-ready JSON: template \
            datasets, radar scores, time series and filter availability.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("CONFIG")
                .long("config")
                .short('c')
                .help("Configuration file")
                .value_parser(value_parser!(PathBuf))
                .action(clap::ArgAction::Set)
                .global(true),
        )
        .arg(
            Arg::new("VERBOSE")
                .long("verbose")
                .short('v')
                .help("Increase the verbosity")
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .subcommand(chart::command())
        .subcommand(radar::command())
        .subcommand(series::command())
        .subcommand(servers::command())
        .subcommand(trend::command())
        .subcommand(filters::command())
        .get_matches();

    let Some((name, args)) = matches.subcommand() else {
        unreachable!("clap should ensure we don't get here");
    };

    // load config from file
    let config = match args.get_one::<PathBuf>("CONFIG") {
        Some(file) => match Config::load(file) {
            Ok(c) => c,
            Err(error) => {
                eprintln!("error loading config file: {}\n{error}", file.display());
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    // configure logging
    let level = match args.get_count("VERBOSE") {
        0 => config.log().level(),
        1 => config.log().level().max(Level::DEBUG),
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    debug!("running {name}");

    let result = match name {
        "chart" => chart::run(args, config),
        "radar" => radar::run(args, config),
        "series" => series::run(args, config),
        "servers" => servers::run(args, config),
        "trend" => trend::run(args, config),
        "filters" => filters::run(args, config),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
