//! Settings from the YAML config file merged with the command line
use std::{
	fs,
	io,
	path::{
		Path,
		PathBuf,
	},
};
use serde::{
	Deserialize,
	Serialize,
};
use tracing::{
	debug,
	warn,
};

use super::{
	error::ConfigError,
	Opt,
};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	pub host: String,
	pub port: u16,
	pub user: String,
	pub password: String,
	pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub database: DatabaseConfig,
	pub output_dir: PathBuf,
	pub package_name: String,
	pub tables: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub template: Option<PathBuf>,
}

impl Config {
	/// Reads a config file, `Ok(None)` if there is no file at `path`
	pub fn load(path: &Path) -> Result<Option<Config>, ConfigError> {
		let text = match fs::read_to_string(path) {
			Ok(text) => text,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
			Err(source) => {
				return Err(ConfigError::Read {
					path: path.to_owned(),
					source,
				})
			},
		};
		serde_yaml::from_str(&text).map(Some).map_err(|source| ConfigError::Parse {
			path: path.to_owned(),
			source,
		})
	}

	/// Loads the config file for `opt`, logging and ignoring a file that can't be used
	pub fn load_or_warn(opt: &Opt) -> Option<Config> {
		let path = find_config_file(&opt.config).unwrap_or_else(|| opt.config.clone());
		match Config::load(&path) {
			Ok(Some(config)) => {
				debug!("loaded config file {}", path.display());
				Some(config)
			},
			Ok(None) => {
				debug!("no config file at {}", path.display());
				None
			},
			Err(e) => {
				warn!("could not load config file: {}", e);
				None
			},
		}
	}

	/// Combines the file config with the command line, which wins wherever it is set, and fills in defaults
	pub fn merge(file: Option<Config>, opt: &Opt) -> Config {
		let file = file.unwrap_or_default();
		Config {
			database: DatabaseConfig {
				host: merge_string(file.database.host, opt.host.as_deref(), "localhost"),
				port: opt
					.port
					.filter(|v| *v != 0)
					.or_else(|| Some(file.database.port).filter(|v| *v != 0))
					.unwrap_or(3306),
				user: merge_string(file.database.user, opt.user.as_deref(), "root"),
				password: merge_string(file.database.password, opt.password.as_deref(), ""),
				name: merge_string(file.database.name, opt.database.as_deref(), ""),
			},
			output_dir: opt
				.output
				.clone()
				.filter(|v| !v.as_os_str().is_empty())
				.or_else(|| Some(file.output_dir).filter(|v| !v.as_os_str().is_empty()))
				.unwrap_or_else(|| PathBuf::from("./models")),
			package_name: merge_string(file.package_name, opt.package.as_deref(), "models"),
			tables: if opt.tables.is_empty() { file.tables } else { opt.tables.clone() },
			template: opt.template.clone().or(file.template),
		}
	}

	/// Checks that every required setting is present
	pub fn validate(&self) -> Result<(), ConfigError> {
		let db = &self.database;
		if db.name.is_empty() {
			return Err(ConfigError::MissingDatabase);
		}
		if db.host.is_empty() {
			return Err(ConfigError::MissingHost);
		}
		if db.port == 0 {
			return Err(ConfigError::InvalidPort(db.port));
		}
		if db.user.is_empty() {
			return Err(ConfigError::MissingUser);
		}
		if self.output_dir.as_os_str().is_empty() {
			return Err(ConfigError::MissingOutputDir);
		}
		if self.package_name.is_empty() {
			return Err(ConfigError::MissingPackage);
		}
		Ok(())
	}

	/// Config written by `--init`, with placeholders for the settings that have no sensible default
	pub fn example() -> Config {
		Config {
			database: DatabaseConfig {
				host: "localhost".to_owned(),
				port: 3306,
				user: "root".to_owned(),
				password: "your_password".to_owned(),
				name: "your_database".to_owned(),
			},
			output_dir: PathBuf::from("./models"),
			package_name: "models".to_owned(),
			tables: Vec::new(),
			template: None,
		}
	}

	pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
		let text = serde_yaml::to_string(self).map_err(ConfigError::Encode)?;
		fs::write(path, text).map_err(|source| ConfigError::Write {
			path: path.to_owned(),
			source,
		})
	}
}

fn merge_string(file: String, cli: Option<&str>, default: &str) -> String {
	match cli {
		Some(v) if !v.is_empty() => v.to_owned(),
		_ if !file.is_empty() => file,
		_ => default.to_owned(),
	}
}

/// Looks for a config file: `preferred` if it exists, then `./config.yaml`, then `config.yaml` next to the executable
pub fn find_config_file(preferred: &Path) -> Option<PathBuf> {
	if !preferred.as_os_str().is_empty() && preferred.is_file() {
		return Some(preferred.to_owned());
	}
	let local = Path::new(DEFAULT_CONFIG_FILE);
	if local.is_file() {
		return Some(local.to_owned());
	}
	let exe = std::env::current_exe().ok()?;
	let beside_exe = exe.parent()?.join(DEFAULT_CONFIG_FILE);
	if beside_exe.is_file() {
		Some(beside_exe)
	} else {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use structopt::StructOpt;

	fn opt(args: &[&str]) -> Opt {
		let mut full = vec!["bake"];
		full.extend_from_slice(args);
		Opt::from_iter_safe(full).unwrap()
	}

	fn file_config() -> Config {
		Config {
			database: DatabaseConfig {
				host: "db.internal".to_owned(),
				port: 3307,
				user: "reader".to_owned(),
				password: "secret".to_owned(),
				name: "shop".to_owned(),
			},
			output_dir: PathBuf::from("gen"),
			package_name: "shop_models".to_owned(),
			tables: vec!["orders".to_owned()],
			template: Some(PathBuf::from("model.tmpl")),
		}
	}

	#[test]
	fn defaults_without_file_or_flags() {
		let config = Config::merge(None, &opt(&[]));
		assert_eq!(config.database.host, "localhost");
		assert_eq!(config.database.port, 3306);
		assert_eq!(config.database.user, "root");
		assert_eq!(config.database.password, "");
		assert_eq!(config.database.name, "");
		assert_eq!(config.output_dir, PathBuf::from("./models"));
		assert_eq!(config.package_name, "models");
		assert!(config.tables.is_empty());
		assert_eq!(config.template, None);
		assert!(matches!(config.validate(), Err(ConfigError::MissingDatabase)));
	}

	#[test]
	fn file_values_used_when_no_flags() {
		let config = Config::merge(Some(file_config()), &opt(&[]));
		assert_eq!(config, file_config());
		assert!(config.validate().is_ok());
	}

	#[test]
	fn flags_override_file() {
		let config = Config::merge(
			Some(file_config()),
			&opt(&["-H", "127.0.0.1", "-P", "3308", "-d", "other", "-o", "out", "--pkg", "m", "-t", "a,b", "-t", "c"]),
		);
		assert_eq!(config.database.host, "127.0.0.1");
		assert_eq!(config.database.port, 3308);
		assert_eq!(config.database.user, "reader");
		assert_eq!(config.database.name, "other");
		assert_eq!(config.output_dir, PathBuf::from("out"));
		assert_eq!(config.package_name, "m");
		assert_eq!(config.tables, ["a", "b", "c"]);
		assert_eq!(config.template, Some(PathBuf::from("model.tmpl")));
	}

	#[test]
	fn validation_errors() {
		let mut config = file_config();
		config.database.host.clear();
		assert!(matches!(config.validate(), Err(ConfigError::MissingHost)));

		let mut config = file_config();
		config.database.port = 0;
		assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(0))));

		let mut config = file_config();
		config.database.user.clear();
		assert!(matches!(config.validate(), Err(ConfigError::MissingUser)));

		let mut config = file_config();
		config.output_dir = PathBuf::new();
		assert!(matches!(config.validate(), Err(ConfigError::MissingOutputDir)));

		let mut config = file_config();
		config.package_name.clear();
		assert!(matches!(config.validate(), Err(ConfigError::MissingPackage)));
	}

	#[test]
	fn loads_partial_yaml() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.yaml");
		fs::write(&path, "database:\n  name: shop\n  port: 3310\npackage_name: entities\ntables: [users, orders]\n").unwrap();

		let config = Config::load(&path).unwrap().unwrap();
		assert_eq!(config.database.name, "shop");
		assert_eq!(config.database.port, 3310);
		assert_eq!(config.database.host, "");
		assert_eq!(config.package_name, "entities");
		assert_eq!(config.tables, ["users", "orders"]);

		let merged = Config::merge(Some(config), &opt(&[]));
		assert_eq!(merged.database.host, "localhost");
		assert_eq!(merged.database.port, 3310);
		assert_eq!(merged.output_dir, PathBuf::from("./models"));
	}

	#[test]
	fn missing_file_is_none() {
		let dir = tempfile::tempdir().unwrap();
		assert_eq!(Config::load(&dir.path().join("absent.yaml")).unwrap(), None);
	}

	#[test]
	fn malformed_file_is_parse_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.yaml");
		fs::write(&path, "database: [not, a, map]\n").unwrap();
		assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
	}

	#[test]
	fn example_round_trips() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.yaml");
		Config::example().write(&path).unwrap();
		assert_eq!(Config::load(&path).unwrap(), Some(Config::example()));
	}

	#[test]
	fn finds_preferred_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("custom.yaml");
		fs::write(&path, "package_name: x\n").unwrap();
		assert_eq!(find_config_file(&path), Some(path));
	}
}
