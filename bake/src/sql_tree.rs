//! A simple tree of the tables selected for generation

/// A table and its columns in ordinal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
	pub name: String,
	pub columns: Vec<Column>,
}

/// One column as reported by `INFORMATION_SCHEMA.COLUMNS`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
	pub name: String,
	/// `DATA_TYPE`, e.g. `varchar` or `datetime`
	pub sql_type: String,
	pub nullable: bool,
	/// Empty when the column has no comment
	pub comment: String,
}

impl Column {
	pub fn new(name: impl Into<String>, sql_type: impl Into<String>, nullable: bool) -> Column {
		Column {
			name: name.into(),
			sql_type: sql_type.into(),
			nullable,
			comment: String::new(),
		}
	}

	pub fn with_comment(mut self, comment: impl Into<String>) -> Column {
		self.comment = comment.into();
		self
	}
}
