//! Error types for each stage of a generation run
use std::{
	io,
	path::PathBuf,
};
use thiserror::Error;

/// Everything that can stop a run
#[derive(Debug, Error)]
pub enum BakeError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("error connecting to database: {0}")]
	Connection(#[source] sqlx::Error),
	#[error(transparent)]
	Schema(#[from] SchemaError),
	#[error(transparent)]
	TemplateLoad(#[from] TemplateLoadError),
	#[error(transparent)]
	Write(#[from] WriteError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file {}: {source}", .path.display())]
	Read {
		path: PathBuf,
		source: io::Error,
	},
	#[error("failed to decode config file {}: {source}", .path.display())]
	Parse {
		path: PathBuf,
		source: serde_yaml::Error,
	},
	#[error("failed to write config file {}: {source}", .path.display())]
	Write {
		path: PathBuf,
		source: io::Error,
	},
	#[error("failed to encode config: {0}")]
	Encode(#[source] serde_yaml::Error),
	#[error("database name is required")]
	MissingDatabase,
	#[error("database host is required")]
	MissingHost,
	#[error("invalid database port: {0}")]
	InvalidPort(u16),
	#[error("database user is required")]
	MissingUser,
	#[error("output directory is required")]
	MissingOutputDir,
	#[error("package name is required")]
	MissingPackage,
}

#[derive(Debug, Error)]
pub enum SchemaError {
	#[error("error listing tables: {0}")]
	ListTables(#[source] sqlx::Error),
	#[error("error reading columns of table {table}: {source}")]
	Columns {
		table: String,
		source: sqlx::Error,
	},
	#[error("table {table} not found in database")]
	TableNotFound {
		table: String,
	},
	#[error("no tables found in database {database}")]
	NoTables {
		database: String,
	},
}

/// A template that could not be read or parsed
#[derive(Debug, Error)]
pub enum TemplateLoadError {
	#[error("failed to read template {}: {source}", .path.display())]
	Read {
		path: PathBuf,
		source: io::Error,
	},
	#[error("{name}:{line}: unclosed tag")]
	Unclosed {
		name: String,
		line: usize,
	},
	#[error("{name}:{line}: invalid tag {{{{{tag}}}}}")]
	BadTag {
		name: String,
		tag: String,
		line: usize,
	},
	#[error("{name}:{line}: {{{{/{found}}}}} closes no open section")]
	UnexpectedClose {
		name: String,
		found: String,
		line: usize,
	},
	#[error("{name}:{line}: expected {{{{/{expected}}}}}, found {{{{/{found}}}}}")]
	MismatchedClose {
		name: String,
		expected: String,
		found: String,
		line: usize,
	},
	#[error("{name}:{line}: section {section} is never closed")]
	Unterminated {
		name: String,
		section: String,
		line: usize,
	},
}

/// Failure while executing a template against its data
#[derive(Debug, Error)]
pub enum RenderError {
	#[error("failed to bind template data: {0}")]
	Bind(#[from] serde_json::Error),
	#[error("{template}: can't evaluate {field}, no such field")]
	UnknownField {
		template: String,
		field: String,
	},
	#[error("{template}: {field} is a list or object and can't be printed")]
	NotScalar {
		template: String,
		field: String,
	},
}

/// Failure producing one output file
#[derive(Debug, Error)]
pub enum WriteError {
	#[error("error creating output directory {}: {source}", .path.display())]
	CreateDir {
		path: PathBuf,
		source: io::Error,
	},
	#[error("error rendering table {table}: {source}")]
	Render {
		table: String,
		source: RenderError,
	},
	#[error("error writing {}: {source}", .path.display())]
	File {
		path: PathBuf,
		source: io::Error,
	},
}
