//! Identifier casing for generated type and field names

/// Turns a snake_case name into an exported identifier (`user_id` -> `UserId`)
///
/// Only the first character of each `_` separated segment is uppercased, the rest of the segment is kept as is
/// (`userID_x` -> `UserIDX`). Empty segments from leading, trailing or doubled underscores are dropped.
pub fn to_exported_case(name: &str) -> String {
	let mut ret = String::with_capacity(name.len());
	for segment in name.split('_') {
		let mut chars = segment.chars();
		if let Some(first) = chars.next() {
			ret.extend(first.to_uppercase());
			ret.push_str(chars.as_str());
		}
	}
	ret
}

const RUST_KEYWORDS: [&str; 49] = [
	"as",
	"async",
	"await",
	"break",
	"const",
	"continue",
	"crate",
	"dyn",
	"else",
	"enum",
	"extern",
	"false",
	"fn",
	"for",
	"if",
	"impl",
	"in",
	"let",
	"loop",
	"match",
	"mod",
	"move",
	"mut",
	"pub",
	"ref",
	"return",
	"self",
	"static",
	"struct",
	"super",
	"trait",
	"true",
	"type",
	"unsafe",
	"use",
	"where",
	"while",
	"abstract",
	"become",
	"box",
	"do",
	"final",
	"macro",
	"override",
	"priv",
	"try",
	"typeof",
	"unsized",
	"yield",
];

/// Makes `name` usable as a Rust identifier
///
/// Anything but ASCII letters, digits and `_` becomes `_`. A name that is empty, `_` or starts with a digit gets
/// `prefix`. Keywords become raw identifiers (`r#type`), except `self`, `Self`, `super` and `crate` which can't be raw
/// and get a trailing `_`.
pub fn to_identifier(name: &str, prefix: &str) -> String {
	let mut ret: String = name
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
		.collect();
	if ret.is_empty() || ret == "_" || ret.starts_with(|c: char| c.is_ascii_digit()) {
		ret.insert_str(0, prefix);
	}
	match ret.as_str() {
		"self" | "Self" | "super" | "crate" => {
			ret.push('_');
			ret
		},
		n if RUST_KEYWORDS.contains(&n) => format!("r#{}", n),
		_ => ret,
	}
}
