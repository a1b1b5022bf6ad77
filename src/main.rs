use clap::{Arg, ArgAction, Command};
use std::error::Error;
use std::path::PathBuf;

use remsync::logging;
use remsync::{client, server, ClientConfig, ServerConfig};

fn dir_args(matches: &clap::ArgMatches) -> Vec<PathBuf> {
	matches
		.get_many::<String>("dir")
		.map(|dirs| dirs.map(PathBuf::from).collect())
		.unwrap_or_default()
}

fn exclude_args(matches: &clap::ArgMatches) -> Vec<String> {
	matches
		.get_many::<String>("exclude")
		.map(|patterns| patterns.cloned().collect())
		.unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let matches = Command::new("remsync")
		.version("0.1.0")
		.about("Continuous one-way remote directory synchroniser")
		.subcommand_required(true)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.action(ArgAction::Count)
				.global(true)
				.help("Increase log verbosity (repeatable)"),
		)
		.subcommand(
			Command::new("remote")
				.about("Receiving mode: listen for a local agent and materialise uploads")
				.arg(
					Arg::new("port")
						.short('p')
						.long("port")
						.value_parser(clap::value_parser!(u16))
						.default_value("8082")
						.help("Listen port"),
				)
				.arg(
					Arg::new("exclude")
						.short('x')
						.long("exclude")
						.action(ArgAction::Append)
						.help("Exclusion pattern (prefix-anchored regex, repeatable)"),
				)
				.arg(Arg::new("dir").required(true).action(ArgAction::Append).num_args(1..)),
		)
		.subcommand(
			Command::new("local")
				.about("Sending mode: watch local roots and push changes to the remote agent")
				.arg(
					Arg::new("host")
						.short('H')
						.long("host")
						.default_value("127.0.0.1")
						.help("Remote host"),
				)
				.arg(
					Arg::new("port")
						.short('p')
						.long("port")
						.value_parser(clap::value_parser!(u16))
						.default_value("8082")
						.help("Remote port"),
				)
				.arg(
					Arg::new("exclude")
						.short('x')
						.long("exclude")
						.action(ArgAction::Append)
						.help("Exclusion pattern (prefix-anchored regex, repeatable)"),
				)
				.arg(Arg::new("dir").required(true).action(ArgAction::Append).num_args(1..)),
		)
		.get_matches();

	logging::init_tracing(matches.get_count("verbose"));

	if let Some(sub) = matches.subcommand_matches("remote") {
		let config = ServerConfig {
			port: *sub.get_one::<u16>("port").expect("port has a default"),
			roots: dir_args(sub),
			exclude_patterns: exclude_args(sub),
			..Default::default()
		};
		server::serve(config).await?;
	} else if let Some(sub) = matches.subcommand_matches("local") {
		let config = ClientConfig {
			host: sub.get_one::<String>("host").expect("host has a default").clone(),
			port: *sub.get_one::<u16>("port").expect("port has a default"),
			roots: dir_args(sub),
			exclude_patterns: exclude_args(sub),
			..Default::default()
		};
		client::run(config).await?;
	}

	Ok(())
}

// vim: ts=4
