//! Writes generated sources into the output directory
use std::{
	collections::{
		hash_map::Entry,
		HashMap,
	},
	fs,
	io::Write,
	path::{
		Path,
		PathBuf,
	},
};
use heck::ToSnakeCase;
use proc_macro2::{
	Ident,
	Span,
	TokenStream,
};
use quote::quote;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{
	case::to_identifier,
	error::WriteError,
	format_rust,
	render::{
		render_table,
		struct_ident,
	},
	sql_tree::Table,
	template::Template,
};

/// Name of the package file listing every generated module
pub const PACKAGE_FILE: &str = "mod.rs";

/// `<lowercased table name>.gen.rs`
pub fn model_file_name(table_name: &str) -> String {
	format!("{}.gen.rs", table_name.to_lowercase())
}

pub fn create_output_dir(dir: &Path) -> Result<(), WriteError> {
	fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
		path: dir.to_owned(),
		source,
	})
}

/// Renders one table and writes it to `dir`, replacing any previous file
pub fn write_model_file(template: &Template, dir: &Path, package_name: &str, table: &Table) -> Result<PathBuf, WriteError> {
	let source = render_table(template, table, package_name).map_err(|source| WriteError::Render {
		table: table.name.clone(),
		source,
	})?;
	let path = dir.join(model_file_name(&table.name));
	write_atomic(&path, &source)?;
	debug!("wrote {} ({} bytes)", path.display(), source.len());
	Ok(path)
}

/// Writes `mod.rs` declaring one module per generated table file
pub fn write_package_file(dir: &Path, package_name: &str, table_names: &[&str]) -> Result<PathBuf, WriteError> {
	let path = dir.join(PACKAGE_FILE);
	write_atomic(&path, &package_source(package_name, table_names))?;
	Ok(path)
}

/// Source of the package file: a doc naming the package then a `#[path]` module and glob re-export per table
pub fn package_source(package_name: &str, table_names: &[&str]) -> String {
	let doc = format!(" Models of package `{}`, generated by bake.", package_name);
	let modules: TokenStream = table_names
		.iter()
		.map(|table| {
			let file = model_file_name(table);
			let module = module_ident(table);
			quote! {
				#[path = #file]
				mod #module;
				pub use #module::*;
			}
		})
		.collect();
	let tokens = quote! {
		#![doc = #doc]
		#modules
	};
	format!("// Code generated by bake. DO NOT EDIT.\n{}", format_rust(&tokens.to_string()))
}

/// Module name for a table: snake_case, made into a valid identifier when needed
fn module_ident(table_name: &str) -> Ident {
	let name = to_identifier(&table_name.to_snake_case(), "table_");
	match name.strip_prefix("r#") {
		Some(raw) => Ident::new_raw(raw, Span::call_site()),
		None => Ident::new(&name, Span::call_site()),
	}
}

/// Tables that would generate the same file, module or struct as an earlier table
///
/// Each entry is the earlier table, the later table and the item they share, like `mod user_profile`.
pub fn name_collisions<'a>(table_names: &[&'a str]) -> Vec<(&'a str, &'a str, String)> {
	let mut seen: HashMap<String, &str> = HashMap::new();
	let mut ret = Vec::new();
	for &table in table_names {
		let items = [
			format!("file {}", model_file_name(table)),
			format!("mod {}", module_ident(table)),
			format!("struct {}", struct_ident(table)),
		];
		for item in items {
			match seen.entry(item) {
				Entry::Occupied(e) => ret.push((*e.get(), table, e.key().clone())),
				Entry::Vacant(e) => {
					e.insert(table);
				},
			}
		}
	}
	ret
}

/// Writes through a temporary file in the same directory then renames it over `path`
fn write_atomic(path: &Path, contents: &str) -> Result<(), WriteError> {
	let file_error = |source| WriteError::File {
		path: path.to_owned(),
		source,
	};
	let dir = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	let mut tmp = NamedTempFile::new_in(dir).map_err(file_error)?;
	tmp.write_all(contents.as_bytes()).map_err(file_error)?;
	tmp.persist(path).map_err(|e| file_error(e.error))?;
	Ok(())
}
