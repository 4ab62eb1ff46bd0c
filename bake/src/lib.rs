//! Connects to a MySQL database and generates a Rust model struct for every table
//!
//! The pipeline reads table metadata from `INFORMATION_SCHEMA` ([`connection`]), maps column types ([`type_map`]) and
//! names ([`case`]) into a [`render::TemplateData`] per table, renders it with a [`template::Template`] and writes one
//! `<table>.gen.rs` per table plus a `mod.rs` tying them together ([`writer`]).

use std::path::PathBuf;
use structopt::StructOpt;

pub mod case;

pub mod config;

pub mod connection;

pub mod error;

pub mod generate;

pub mod info_schema;

pub mod render;

pub mod sql_tree;

pub mod template;

pub mod type_map;

pub mod writer;

pub use error::BakeError;
pub use generate::{
	generate,
	run,
	Summary,
};

/// Generate Rust models from a MySQL database
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "bake")]
pub struct Opt {
	/// Load configuration from FILE
	#[structopt(short = "c", long, default_value = "config.yaml", parse(from_os_str))]
	pub config: PathBuf,
	/// MySQL host
	#[structopt(short = "H", long, env = "MYSQL_HOST")]
	pub host: Option<String>,
	/// MySQL port
	#[structopt(short = "P", long, env = "MYSQL_PORT")]
	pub port: Option<u16>,
	/// MySQL user
	#[structopt(short = "u", long, env = "MYSQL_USER")]
	pub user: Option<String>,
	/// MySQL password
	#[structopt(short = "p", long, env = "MYSQL_PASSWORD", hide_env_values = true)]
	pub password: Option<String>,
	/// MySQL database name
	#[structopt(short = "d", long, env = "MYSQL_DATABASE")]
	pub database: Option<String>,
	/// Output directory for generated models
	#[structopt(short = "o", long, parse(from_os_str))]
	pub output: Option<PathBuf>,
	/// Package name for generated models
	#[structopt(long, visible_alias = "pkg")]
	pub package: Option<String>,
	/// Specific tables to generate (default: all tables)
	#[structopt(short = "t", long = "tables", use_delimiter = true)]
	pub tables: Vec<String>,
	/// Template file used instead of the built-in one
	#[structopt(long, parse(from_os_str))]
	pub template: Option<PathBuf>,
	/// Verbose output
	#[structopt(short = "v", long)]
	pub verbose: bool,
	/// Write a default config file to the --config path and exit
	#[structopt(long)]
	pub init: bool,
}

/// Formats Rust source with rustfmt, returning the input unchanged if rustfmt is missing or fails
pub fn format_rust(value: &str) -> String {
	use std::{
		io::Write,
		process::{
			Command,
			Stdio,
		},
	};
	use tracing::{
		debug,
		warn,
	};

	let mut proc = match Command::new("rustfmt")
		.arg("--emit=stdout")
		.arg("--edition=2021")
		.args(&["--config", "hard_tabs=true"])
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
	{
		Ok(proc) => proc,
		Err(e) => {
			debug!("failed to spawn rustfmt: {}", e);
			return value.to_owned();
		},
	};
	if let Some(stdin) = proc.stdin.as_mut() {
		if let Err(e) = stdin.write_all(value.as_bytes()) {
			warn!("failed to pass source to rustfmt: {}", e);
		}
	}
	match proc.wait_with_output() {
		Ok(output) if output.status.success() => match String::from_utf8(output.stdout) {
			Ok(formatted) => formatted,
			Err(_) => value.to_owned(),
		},
		Ok(output) => {
			warn!(
				"rustfmt exited with {:?}: {}",
				output.status.code(),
				String::from_utf8_lossy(&output.stderr)
			);
			value.to_owned()
		},
		Err(e) => {
			warn!("rustfmt failed: {}", e);
			value.to_owned()
		},
	}
}
