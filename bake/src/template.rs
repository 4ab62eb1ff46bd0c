//! A small logic-less template language for the generated model files
//!
//! * `{{name}}` prints a value, `{{a.b}}` descends into objects and `{{.}}` is the current item
//! * `{{#name}}...{{/name}}` renders once per list item, or once if the value is a non-empty string, `true`, a number or an object
//! * `{{^name}}...{{/name}}` renders only if the value is `false`, null, empty string or empty list
//! * `{{! text }}` is dropped
//!
//! A section or comment tag standing alone on its line removes the whole line from the output.
//! Names are looked up from the innermost section outwards and a name that can't be found is an error.
//!
//! Data is bound by serializing it with serde, so any `Serialize` struct can be passed to [`Template::render`].
use std::{
	fs,
	path::Path,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::error::{
	RenderError,
	TemplateLoadError,
};

/// Template used when no external template is configured
///
/// Renders a struct with one field per column, each tagged with the column's name for serde, and a `table_name()` accessor.
pub const DEFAULT_TEMPLATE: &str = r#"// Code generated by bake. DO NOT EDIT.
// Package: {{package_name}}, table: {{table_name_lit}}
#![allow(non_snake_case, non_camel_case_types)]

use serde::{Deserialize, Serialize};
{{#imports}}
use {{.}};
{{/imports}}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct {{struct_ident}} {
{{#columns}}
{{#comment_lines}}
	/// {{.}}
{{/comment_lines}}
	#[serde(rename = {{db_name_lit}})]
	pub {{ident}}: {{rust_type}},
{{/columns}}
}

impl {{struct_ident}} {
	/// Name of the table this struct was generated from
	pub fn table_name() -> &'static str {
		{{table_name_lit}}
	}
}
"#;

#[derive(Debug, Clone, PartialEq)]
enum Node {
	Text(String),
	Var(String),
	Section {
		name: String,
		inverted: bool,
		body: Vec<Node>,
	},
}

#[derive(Debug, Clone, Copy)]
enum Tag<'a> {
	Var(&'a str),
	Open(&'a str),
	Inverted(&'a str),
	Close(&'a str),
	Comment,
}

/// A parsed template, reusable for any number of renders
#[derive(Debug, Clone)]
pub struct Template {
	name: String,
	nodes: Vec<Node>,
}

impl Template {
	/// Parses the template source, `name` is only used in error messages
	pub fn parse(name: impl Into<String>, source: &str) -> Result<Template, TemplateLoadError> {
		let name = name.into();
		// sections that are still open, with the nodes collected before each of them
		let mut open: Vec<(String, bool, usize, Vec<Node>)> = Vec::new();
		let mut nodes = Vec::new();
		let mut pos = 0;

		while let Some(offset) = source[pos..].find("{{") {
			let start = pos + offset;
			let line = line_of(source, start);
			let inner_start = start + 2;
			let inner_len = source[inner_start..]
				.find("}}")
				.ok_or_else(|| TemplateLoadError::Unclosed { name: name.clone(), line })?;
			let inner = &source[inner_start..inner_start + inner_len];
			let end = inner_start + inner_len + 2;

			let tag = parse_tag(inner).ok_or_else(|| TemplateLoadError::BadTag {
				name: name.clone(),
				tag: inner.trim().to_owned(),
				line,
			})?;

			let (text_end, next) = match tag {
				Tag::Var(_) => (start, end),
				_ => standalone_bounds(source, start, end).unwrap_or((start, end)),
			};
			let text_end = text_end.max(pos);
			if text_end > pos {
				nodes.push(Node::Text(source[pos..text_end].to_owned()));
			}
			pos = next;

			match tag {
				Tag::Var(var) => nodes.push(Node::Var(var.to_owned())),
				Tag::Comment => {},
				Tag::Open(section) => open.push((section.to_owned(), false, line, std::mem::take(&mut nodes))),
				Tag::Inverted(section) => open.push((section.to_owned(), true, line, std::mem::take(&mut nodes))),
				Tag::Close(found) => {
					let (section, inverted, _, parent) = open.pop().ok_or_else(|| TemplateLoadError::UnexpectedClose {
						name: name.clone(),
						found: found.to_owned(),
						line,
					})?;
					if section != found {
						return Err(TemplateLoadError::MismatchedClose {
							name,
							expected: section,
							found: found.to_owned(),
							line,
						});
					}
					let body = std::mem::replace(&mut nodes, parent);
					nodes.push(Node::Section { name: section, inverted, body });
				},
			}
		}
		if pos < source.len() {
			nodes.push(Node::Text(source[pos..].to_owned()));
		}

		if let Some((section, _, line, _)) = open.pop() {
			return Err(TemplateLoadError::Unterminated { name, section, line });
		}
		Ok(Template { name, nodes })
	}

	/// Reads and parses a template file
	pub fn load(path: &Path) -> Result<Template, TemplateLoadError> {
		let source = fs::read_to_string(path).map_err(|source| TemplateLoadError::Read {
			path: path.to_owned(),
			source,
		})?;
		let name = path
			.file_name()
			.map(|v| v.to_string_lossy().into_owned())
			.unwrap_or_else(|| path.display().to_string());
		debug!("loaded template {} ({} bytes)", path.display(), source.len());
		Template::parse(name, &source)
	}

	/// The template compiled from [`DEFAULT_TEMPLATE`]
	pub fn builtin() -> Result<Template, TemplateLoadError> {
		Template::parse("builtin", DEFAULT_TEMPLATE)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Renders the template with `data` as the outermost scope
	pub fn render<T: Serialize>(&self, data: &T) -> Result<String, RenderError> {
		let root = serde_json::to_value(data)?;
		let mut out = String::new();
		let mut scope = vec![&root];
		self.render_nodes(&self.nodes, &mut scope, &mut out)?;
		Ok(out)
	}

	fn render_nodes<'v>(&self, nodes: &[Node], scope: &mut Vec<&'v Value>, out: &mut String) -> Result<(), RenderError> {
		for node in nodes {
			match node {
				Node::Text(text) => out.push_str(text),
				Node::Var(name) => match self.lookup(scope, name)? {
					Value::Null => {},
					Value::String(s) => out.push_str(s),
					Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
					Value::Number(n) => out.push_str(&n.to_string()),
					Value::Array(_) | Value::Object(_) => {
						return Err(RenderError::NotScalar {
							template: self.name.clone(),
							field: name.clone(),
						})
					},
				},
				Node::Section { name, inverted, body } => {
					let value = self.lookup(scope, name)?;
					if *inverted {
						if !truthy(value) {
							self.render_nodes(body, scope, out)?;
						}
					} else if let Value::Array(items) = value {
						for item in items {
							scope.push(item);
							self.render_nodes(body, scope, out)?;
							scope.pop();
						}
					} else if truthy(value) {
						scope.push(value);
						self.render_nodes(body, scope, out)?;
						scope.pop();
					}
				},
			}
		}
		Ok(())
	}

	fn lookup<'v>(&self, scope: &[&'v Value], path: &str) -> Result<&'v Value, RenderError> {
		let unknown = || RenderError::UnknownField {
			template: self.name.clone(),
			field: path.to_owned(),
		};
		if path == "." {
			return scope.last().copied().ok_or_else(unknown);
		}

		let mut segments = path.split('.');
		let first = segments.next().ok_or_else(unknown)?;
		let mut value = scope
			.iter()
			.rev()
			.find_map(|&frame| frame.get(first))
			.ok_or_else(unknown)?;
		for segment in segments {
			value = value.get(segment).ok_or_else(unknown)?;
		}
		Ok(value)
	}
}

fn truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::String(s) => !s.is_empty(),
		Value::Array(items) => !items.is_empty(),
		Value::Number(_) | Value::Object(_) => true,
	}
}

fn parse_tag(inner: &str) -> Option<Tag<'_>> {
	let inner = inner.trim();
	if inner.starts_with('!') {
		return Some(Tag::Comment);
	}
	let (tag, name) = if let Some(name) = inner.strip_prefix('#') {
		(Tag::Open(name.trim()), name.trim())
	} else if let Some(name) = inner.strip_prefix('^') {
		(Tag::Inverted(name.trim()), name.trim())
	} else if let Some(name) = inner.strip_prefix('/') {
		(Tag::Close(name.trim()), name.trim())
	} else {
		(Tag::Var(inner), inner)
	};
	if is_valid_name(name) {
		Some(tag)
	} else {
		None
	}
}

fn is_valid_name(name: &str) -> bool {
	name == "."
		|| name
			.split('.')
			.all(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_alphanumeric() || c == '_'))
}

/// If the tag at `start..end` is the only thing on its line, the span of the whole line including its newline
fn standalone_bounds(source: &str, start: usize, end: usize) -> Option<(usize, usize)> {
	let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
	let line_end = source[end..].find('\n').map_or(source.len(), |i| end + i + 1);
	let blank = |s: &str| s.chars().all(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n');
	if blank(&source[line_start..start]) && blank(&source[end..line_end]) {
		Some((line_start, line_end))
	} else {
		None
	}
}

fn line_of(source: &str, index: usize) -> usize {
	source[..index].matches('\n').count() + 1
}
