//! Turns the tables read from the database into the data bound to a template
use std::collections::BTreeSet;
use heck::ToSnakeCase;
use proc_macro2::Literal;
use serde::Serialize;

use super::{
	case::{
		to_exported_case,
		to_identifier,
	},
	error::RenderError,
	sql_tree::*,
	template::Template,
	type_map::map_sql_type,
};

/// Everything a template can refer to when rendering one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateData {
	pub package_name: String,
	pub struct_name: String,
	/// `struct_name` made into a valid identifier
	pub struct_ident: String,
	pub table_name: String,
	/// `table_name` as a quoted, escaped string literal
	pub table_name_lit: String,
	/// Set if any column maps to a timestamp
	pub has_time: bool,
	pub columns: Vec<TemplateColumn>,
	/// Paths that need a `use`, sorted so output is stable between runs
	pub imports: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateColumn {
	/// Column name as in the database
	pub db_name: String,
	/// `db_name` as a quoted, escaped string literal
	pub db_name_lit: String,
	/// Exported name, `created_at` -> `CreatedAt`
	pub name: String,
	/// `name` made into a valid identifier: `self` -> `Self_`, `1st` -> `Column1st`
	pub ident: String,
	/// snake_case identifier, for templates that want conventional Rust field names
	pub field_name: String,
	pub rust_type: String,
	pub comment: String,
	/// `comment` split into lines, empty when there is no comment
	pub comment_lines: Vec<String>,
}

impl TemplateColumn {
	pub fn from_column(column: &Column) -> TemplateColumn {
		let name = to_exported_case(&column.name);
		TemplateColumn {
			db_name: column.name.clone(),
			db_name_lit: string_literal(&column.name),
			ident: to_identifier(&name, "Column"),
			name,
			field_name: column.name.to_snake_case(),
			rust_type: map_sql_type(&column.sql_type, column.nullable).to_string(),
			comment: column.comment.clone(),
			comment_lines: column.comment.lines().map(|v| v.replace('\r', "")).collect(),
		}
	}
}

/// Identifier of the struct generated for a table
pub fn struct_ident(table_name: &str) -> String {
	to_identifier(&to_exported_case(table_name), "Table")
}

fn string_literal(value: &str) -> String {
	Literal::string(value).to_string()
}

impl TemplateData {
	pub fn new(table: &Table, package_name: &str) -> TemplateData {
		let mut imports = BTreeSet::new();
		let mut has_time = false;
		let columns = table
			.columns
			.iter()
			.map(|col| {
				let mapped = map_sql_type(&col.sql_type, col.nullable);
				has_time |= mapped.is_time();
				if let Some(import) = mapped.import() {
					imports.insert(import.to_owned());
				}
				TemplateColumn::from_column(col)
			})
			.collect();

		TemplateData {
			package_name: package_name.to_owned(),
			struct_name: to_exported_case(&table.name),
			struct_ident: struct_ident(&table.name),
			table_name: table.name.clone(),
			table_name_lit: string_literal(&table.name),
			has_time,
			columns,
			imports,
		}
	}
}

/// Renders the source of one model file
pub fn render_table(template: &Template, table: &Table, package_name: &str) -> Result<String, RenderError> {
	template.render(&TemplateData::new(table, package_name))
}
