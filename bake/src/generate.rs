//! A full generation run: read the schema, write one model file per table, then the package file
use std::path::PathBuf;
use tracing::{
	debug,
	info,
	warn,
};

use super::{
	config::Config,
	connection::{
		connect,
		read_tables,
		Catalog,
		SchemaClient,
	},
	error::{
		BakeError,
		SchemaError,
		TemplateLoadError,
		WriteError,
	},
	sql_tree::Table,
	template::Template,
	writer::{
		create_output_dir,
		name_collisions,
		write_model_file,
		write_package_file,
	},
};

/// Outcome of a run that got as far as writing files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
	/// Model files written, in table order
	pub written: Vec<PathBuf>,
	/// Tables whose model could not be written
	pub failed: Vec<String>,
	pub package_file: PathBuf,
}

/// The configured template, or the built-in one when none is configured or the configured file doesn't exist
pub fn load_template(config: &Config) -> Result<Template, TemplateLoadError> {
	match &config.template {
		Some(path) if path.exists() => Template::load(path),
		Some(path) => {
			warn!("template {} not found, using the built-in template", path.display());
			Template::builtin()
		},
		None => Template::builtin(),
	}
}

/// Validates `config`, connects to the database and generates every selected table
///
/// The connection is closed before returning, whether generation succeeded or not.
pub async fn run(config: &Config) -> Result<Summary, BakeError> {
	config.validate()?;
	let template = load_template(config)?;

	let mut client = SchemaClient::new(connect(&config.database).await?);
	let result = generate(&mut client, config, &template).await;
	if let Err(e) = client.close().await {
		warn!("error closing database connection: {}", e);
	}
	result
}

/// Reads the selected tables from `catalog` and writes their models
///
/// Any schema error aborts before a file is written. Failing to write a single model only skips that table.
pub async fn generate<C: Catalog>(catalog: &mut C, config: &Config, template: &Template) -> Result<Summary, BakeError> {
	let tables = read_tables(catalog, &config.tables).await?;
	if tables.is_empty() {
		return Err(SchemaError::NoTables {
			database: config.database.name.clone(),
		}
		.into());
	}
	Ok(write_models(&tables, config, template)?)
}

/// Writes the model files and the package file listing the ones that succeeded
pub fn write_models(tables: &[Table], config: &Config, template: &Template) -> Result<Summary, WriteError> {
	let dir = &config.output_dir;
	create_output_dir(dir)?;

	let names: Vec<&str> = tables.iter().map(|v| v.name.as_str()).collect();
	for (first, second, item) in name_collisions(&names) {
		warn!("tables {} and {} both generate `{}`", first, second, item);
	}

	let mut written = Vec::with_capacity(tables.len());
	let mut generated = Vec::with_capacity(tables.len());
	let mut failed = Vec::new();
	for table in tables {
		match write_model_file(template, dir, &config.package_name, table) {
			Ok(path) => {
				debug!("generated model for table: {}", table.name);
				written.push(path);
				generated.push(table.name.as_str());
			},
			Err(e) => {
				warn!("error generating model for table {}: {}", table.name, e);
				failed.push(table.name.clone());
			},
		}
	}

	let package_file = write_package_file(dir, &config.package_name, &generated)?;
	info!("Successfully generated {} model files in {}", written.len(), dir.display());
	Ok(Summary {
		written,
		failed,
		package_file,
	})
}

#[cfg(test)]
mod tests {
	use std::{
		fs,
		path::Path,
	};

	use super::*;
	use crate::{
		config::DatabaseConfig,
		connection::memory::MemoryCatalog,
		writer::PACKAGE_FILE,
	};

	fn config(out: &Path, tables: &[&str]) -> Config {
		Config {
			database: DatabaseConfig {
				host: "localhost".to_owned(),
				port: 3306,
				user: "root".to_owned(),
				password: String::new(),
				name: "shop".to_owned(),
			},
			output_dir: out.to_owned(),
			package_name: "models".to_owned(),
			tables: tables.iter().map(|v| v.to_string()).collect(),
			template: None,
		}
	}

	fn catalog() -> MemoryCatalog {
		MemoryCatalog::default()
			.with_table("user_profile", &[("id", "int", false), ("created_at", "datetime", true), ("bio", "text", true)])
			.with_table("Orders", &[("id", "bigint", false), ("total", "decimal", false)])
	}

	fn dir_entries(dir: &Path) -> Vec<String> {
		let mut names: Vec<_> = fs::read_dir(dir)
			.unwrap()
			.map(|v| v.unwrap().file_name().to_string_lossy().into_owned())
			.collect();
		names.sort();
		names
	}

	#[tokio::test]
	async fn generates_every_table() {
		let tmp = tempfile::tempdir().unwrap();
		let out = tmp.path().join("models");
		let config = config(&out, &[]);

		let summary = generate(&mut catalog(), &config, &Template::builtin().unwrap()).await.unwrap();
		assert_eq!(summary.written, [out.join("user_profile.gen.rs"), out.join("orders.gen.rs")]);
		assert!(summary.failed.is_empty());
		assert_eq!(summary.package_file, out.join(PACKAGE_FILE));
		assert_eq!(dir_entries(&out), ["mod.rs", "orders.gen.rs", "user_profile.gen.rs"]);

		let model = fs::read_to_string(out.join("user_profile.gen.rs")).unwrap();
		assert!(model.contains("use chrono::NaiveDateTime;"));
		assert!(model.contains("pub struct UserProfile {"));
		assert!(model.contains("pub Id: i32,"));
		assert!(model.contains("pub CreatedAt: Option<NaiveDateTime>,"));
		assert!(model.contains("pub Bio: String,"));

		let package: String = fs::read_to_string(out.join(PACKAGE_FILE)).unwrap().split_whitespace().collect();
		let profile = package.find("moduser_profile;").unwrap();
		let orders = package.find("modorders;").unwrap();
		assert!(profile < orders);
	}

	#[tokio::test]
	async fn unknown_table_writes_nothing() {
		let tmp = tempfile::tempdir().unwrap();
		let out = tmp.path().join("models");
		let config = config(&out, &["user_profile", "missing"]);

		let err = generate(&mut catalog(), &config, &Template::builtin().unwrap()).await.unwrap_err();
		assert!(matches!(err, BakeError::Schema(SchemaError::TableNotFound { ref table }) if table == "missing"));
		assert!(!out.exists());
	}

	#[tokio::test]
	async fn empty_database_is_an_error() {
		let tmp = tempfile::tempdir().unwrap();
		let config = config(tmp.path(), &[]);
		let err = generate(&mut MemoryCatalog::default(), &config, &Template::builtin().unwrap()).await.unwrap_err();
		assert!(matches!(err, BakeError::Schema(SchemaError::NoTables { .. })));
	}

	#[tokio::test]
	async fn repeated_runs_are_identical() {
		let tmp = tempfile::tempdir().unwrap();
		let out = tmp.path().join("models");
		let config = config(&out, &[]);
		let template = Template::builtin().unwrap();

		generate(&mut catalog(), &config, &template).await.unwrap();
		let first: Vec<_> = dir_entries(&out).into_iter().map(|v| fs::read(out.join(v)).unwrap()).collect();
		generate(&mut catalog(), &config, &template).await.unwrap();
		let second: Vec<_> = dir_entries(&out).into_iter().map(|v| fs::read(out.join(v)).unwrap()).collect();
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn failed_table_does_not_stop_the_rest() {
		let tmp = tempfile::tempdir().unwrap();
		let out = tmp.path().join("models");
		// a directory where the first model file should go makes that write fail
		fs::create_dir_all(out.join("user_profile.gen.rs")).unwrap();
		let config = config(&out, &[]);

		let summary = generate(&mut catalog(), &config, &Template::builtin().unwrap()).await.unwrap();
		assert_eq!(summary.failed, ["user_profile"]);
		assert_eq!(summary.written, [out.join("orders.gen.rs")]);

		let package = fs::read_to_string(&summary.package_file).unwrap();
		assert!(package.contains("orders"));
		assert!(!package.contains("user_profile"));
	}

	#[test]
	fn template_selection() {
		let tmp = tempfile::tempdir().unwrap();
		let mut config = config(tmp.path(), &[]);

		config.template = Some(tmp.path().join("absent.tmpl"));
		assert_eq!(load_template(&config).unwrap().name(), "builtin");

		let custom = tmp.path().join("model.tmpl");
		fs::write(&custom, "struct {{struct_name}};").unwrap();
		config.template = Some(custom.clone());
		assert_eq!(load_template(&config).unwrap().name(), "model.tmpl");

		fs::write(&custom, "{{#columns}} never closed").unwrap();
		assert!(matches!(load_template(&config), Err(TemplateLoadError::Unterminated { .. })));
	}

	#[tokio::test]
	async fn run_rejects_invalid_config_before_connecting() {
		let tmp = tempfile::tempdir().unwrap();
		let mut config = config(tmp.path(), &[]);
		config.database.name.clear();
		assert!(matches!(run(&config).await, Err(BakeError::Config(_))));
	}
}
