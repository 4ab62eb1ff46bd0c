use std::process;
use bake::{
	config::Config,
	run,
	Opt,
};
use structopt::StructOpt;
use tracing::{
	error,
	info,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let opt = Opt::from_args();

	let default_level = if opt.verbose { "debug" } else { "info" };
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
		.with_target(false)
		.init();

	if opt.init {
		match Config::example().write(&opt.config) {
			Ok(()) => info!("wrote default config to {}", opt.config.display()),
			Err(e) => {
				error!("{}", e);
				process::exit(1);
			},
		}
		return;
	}

	let config = Config::merge(Config::load_or_warn(&opt), &opt);
	match run(&config).await {
		Ok(summary) => {
			if !summary.failed.is_empty() {
				info!("skipped {} tables: {}", summary.failed.len(), summary.failed.join(", "));
			}
		},
		Err(e) => {
			error!("{}", e);
			process::exit(1);
		},
	}
}
