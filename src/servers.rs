use crate::config::Config;
use crate::input::*;
use charts::timeseries::{group_servers, ServerInfo};
use clap::{ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("servers")
        .about("Merge server listings by hostname and protocol")
        .arg(input_arg("Server listing as a JSON array"))
        .arg(pretty_arg())
}

pub fn run(args: &ArgMatches, _config: Config) -> anyhow::Result<()> {
    let servers: Vec<ServerInfo> = read_json(input_path(args))?;
    let groups = group_servers(&servers);

    info!("{} servers -> {} groups", servers.len(), groups.len());

    write_json(&groups, args.get_flag("PRETTY"))
}
