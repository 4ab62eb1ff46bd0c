//! Mapping of MySQL column types onto Rust types
use std::fmt;

/// Rust type family a MySQL column type maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
	/// tinyint, smallint, mediumint, int, integer
	Int,
	/// bigint
	BigInt,
	/// float, double, decimal
	Float,
	/// char, varchar, the text types and json
	String,
	/// date, datetime, timestamp, time
	Timestamp,
	/// binary, varbinary and the blob types
	Bytes,
	/// bit, bool, boolean
	Bool,
	/// Any type not listed above, rendered as a `serde_json::Value`
	Any,
}

impl BaseType {
	/// Classifies a raw `DATA_TYPE` as reported by `INFORMATION_SCHEMA.COLUMNS`, ignoring case
	pub fn from_sql(raw: &str) -> BaseType {
		use BaseType::*;
		match raw.to_ascii_lowercase().as_str() {
			"tinyint" | "smallint" | "mediumint" | "int" | "integer" => Int,
			"bigint" => BigInt,
			"float" | "double" | "decimal" => Float,
			"char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext" | "json" => String,
			"date" | "datetime" | "timestamp" | "time" => Timestamp,
			"binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => Bytes,
			"bit" | "bool" | "boolean" => Bool,
			_ => Any,
		}
	}

	/// The Rust type as written in generated code
	pub fn rust_name(self) -> &'static str {
		use BaseType::*;
		match self {
			Int => "i32",
			BigInt => "i64",
			Float => "f64",
			String => "String",
			Timestamp => "NaiveDateTime",
			Bytes => "Vec<u8>",
			Bool => "bool",
			Any => "Value",
		}
	}

	/// Path that has to be imported for [`rust_name`](BaseType::rust_name) to resolve
	pub fn import(self) -> Option<&'static str> {
		match self {
			BaseType::Timestamp => Some("chrono::NaiveDateTime"),
			BaseType::Any => Some("serde_json::Value"),
			_ => None,
		}
	}

	/// Whether a NULL column of this type gets wrapped in an `Option`
	///
	/// Strings and bytes already have an empty value and `Value` has its own null, so they stay unwrapped.
	pub fn wraps_null(self) -> bool {
		!matches!(self, BaseType::String | BaseType::Bytes | BaseType::Any)
	}
}

/// Result of mapping a column: the base type and whether it is wrapped in an `Option`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappedType {
	pub base: BaseType,
	pub optional: bool,
}

impl MappedType {
	pub fn is_time(&self) -> bool {
		self.base == BaseType::Timestamp
	}

	pub fn import(&self) -> Option<&'static str> {
		self.base.import()
	}
}

impl fmt::Display for MappedType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.optional {
			write!(f, "Option<{}>", self.base.rust_name())
		} else {
			f.write_str(self.base.rust_name())
		}
	}
}

/// Maps a raw column type and its nullability to the Rust type used in the generated struct
///
/// Never fails, unknown types become [`BaseType::Any`].
pub fn map_sql_type(raw: &str, nullable: bool) -> MappedType {
	let base = BaseType::from_sql(raw);
	MappedType {
		base,
		optional: nullable && base.wraps_null(),
	}
}
