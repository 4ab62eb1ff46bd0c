//! Select statements into INFORMATION_SCHEMA and corresponding return types
//!
//! Text columns are cast to CHAR since MySQL 8 reports several of them with a binary collation
use sqlx::FromRow;

use super::sql_tree::Column;

pub const GET_TABLES: &str = "SELECT CAST(TABLE_NAME AS CHAR) AS table_name
FROM INFORMATION_SCHEMA.TABLES
WHERE TABLE_SCHEMA = DATABASE() AND
	TABLE_TYPE = 'BASE TABLE'
ORDER BY TABLE_NAME ASC";
#[derive(Debug, Clone, FromRow)]
pub struct GetTables {
	pub table_name: String,
}

pub const GET_COLUMNS: &str = "SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
	CAST(DATA_TYPE AS CHAR) AS data_type,
	CAST(IS_NULLABLE AS CHAR) AS is_nullable,
	CAST(COLUMN_COMMENT AS CHAR) AS column_comment,
	CAST(ORDINAL_POSITION AS UNSIGNED) AS ordinal_position
FROM INFORMATION_SCHEMA.COLUMNS
WHERE TABLE_NAME = ? AND
	TABLE_SCHEMA = DATABASE()
ORDER BY ORDINAL_POSITION ASC";
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct GetColumns {
	pub column_name: String,
	pub data_type: String,
	/// "YES" or "NO"
	pub is_nullable: String,
	pub column_comment: Option<String>,
	pub ordinal_position: u64,
}

impl From<GetColumns> for Column {
	fn from(row: GetColumns) -> Column {
		Column {
			nullable: row.is_nullable.trim().eq_ignore_ascii_case("YES"),
			name: row.column_name,
			sql_type: row.data_type,
			comment: row.column_comment.unwrap_or_default(),
		}
	}
}
