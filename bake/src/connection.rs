//! Reads table and column metadata from a MySQL database
use sqlx::{
	mysql::{
		MySqlConnectOptions,
		MySqlConnection,
	},
	ConnectOptions,
	Connection,
};
use tracing::debug;

use super::{
	config::DatabaseConfig,
	error::{
		BakeError,
		SchemaError,
	},
	info_schema::*,
	sql_tree::*,
};

/// Source of schema metadata
///
/// Implemented by [`SchemaClient`] over a live connection. Both methods describe the current database only.
#[allow(async_fn_in_trait)]
pub trait Catalog {
	/// Names of all base tables (no views)
	async fn base_tables(&mut self) -> Result<Vec<String>, sqlx::Error>;
	/// Columns of one table, ordered by ordinal position
	async fn columns(&mut self, table: &str) -> Result<Vec<GetColumns>, sqlx::Error>;
}

/// Opens a connection to the configured database and checks it responds
pub async fn connect(db: &DatabaseConfig) -> Result<MySqlConnection, BakeError> {
	let options = MySqlConnectOptions::new()
		.host(&db.host)
		.port(db.port)
		.username(&db.user)
		.password(&db.password)
		.database(&db.name);
	let mut conn = options.connect().await.map_err(BakeError::Connection)?;
	conn.ping().await.map_err(BakeError::Connection)?;
	debug!("connected to {}:{}/{}", db.host, db.port, db.name);
	Ok(conn)
}

/// Wraps a connection and runs the INFORMATION_SCHEMA queries against it
pub struct SchemaClient {
	conn: MySqlConnection,
}

impl SchemaClient {
	pub fn new(conn: MySqlConnection) -> SchemaClient {
		SchemaClient { conn }
	}

	/// Closes the underlying connection
	pub async fn close(self) -> Result<(), sqlx::Error> {
		self.conn.close().await
	}
}

impl Catalog for SchemaClient {
	async fn base_tables(&mut self) -> Result<Vec<String>, sqlx::Error> {
		Ok(sqlx::query_as::<_, GetTables>(GET_TABLES)
			.fetch_all(&mut self.conn)
			.await?
			.into_iter()
			.map(|v| v.table_name)
			.collect())
	}

	async fn columns(&mut self, table: &str) -> Result<Vec<GetColumns>, sqlx::Error> {
		sqlx::query_as::<_, GetColumns>(GET_COLUMNS)
			.bind(table)
			.fetch_all(&mut self.conn)
			.await
	}
}

/// Reads the tables to generate
///
/// With an empty `selected` list every base table of the database is read, in catalog order.
/// Otherwise exactly the named tables are read in the given order and the first failure aborts the whole read.
pub async fn read_tables<C: Catalog>(catalog: &mut C, selected: &[String]) -> Result<Vec<Table>, SchemaError> {
	let names = if selected.is_empty() {
		let names = catalog.base_tables().await.map_err(SchemaError::ListTables)?;
		debug!("found {} base tables", names.len());
		names
	} else {
		selected.to_vec()
	};

	let mut tables = Vec::with_capacity(names.len());
	for name in names {
		tables.push(read_table(catalog, name).await?);
	}
	Ok(tables)
}

/// Reads the columns of one table
///
/// A table without columns does not exist in the current database and is reported as [`SchemaError::TableNotFound`].
pub async fn read_table<C: Catalog>(catalog: &mut C, name: String) -> Result<Table, SchemaError> {
	let mut rows = match catalog.columns(&name).await {
		Ok(rows) => rows,
		Err(source) => return Err(SchemaError::Columns { table: name, source }),
	};
	if rows.is_empty() {
		return Err(SchemaError::TableNotFound { table: name });
	}
	// stable, so rows already in ordinal order are untouched
	rows.sort_by_key(|v| v.ordinal_position);

	debug!("table {}: {} columns", name, rows.len());
	Ok(Table {
		name,
		columns: rows.into_iter().map(Column::from).collect(),
	})
}


#[cfg(test)]
mod tests {
	use super::{
		memory::MemoryCatalog,
		*,
	};

	fn catalog() -> MemoryCatalog {
		MemoryCatalog::default()
			.with_table("users", &[("id", "int", false), ("email", "varchar", false)])
			.with_table("orders", &[("id", "bigint", false), ("placed_at", "datetime", true)])
			.with_table("audit_log", &[("payload", "json", true)])
	}

	fn names(tables: &[Table]) -> Vec<&str> {
		tables.iter().map(|v| v.name.as_str()).collect()
	}

	#[tokio::test]
	async fn reads_all_tables_in_catalog_order() {
		let mut catalog = catalog();
		let tables = read_tables(&mut catalog, &[]).await.unwrap();
		assert_eq!(names(&tables), ["users", "orders", "audit_log"]);
		assert_eq!(tables[1].columns, vec![
			Column::new("id", "bigint", false),
			Column::new("placed_at", "datetime", true),
		]);
	}

	#[tokio::test]
	async fn reads_selected_tables_in_given_order() {
		let mut catalog = catalog();
		let selected = vec!["audit_log".to_owned(), "users".to_owned()];
		let tables = read_tables(&mut catalog, &selected).await.unwrap();
		assert_eq!(names(&tables), ["audit_log", "users"]);
		assert!(!catalog.column_queries.contains_key("orders"));
	}

	#[tokio::test]
	async fn columns_follow_ordinal_position() {
		let mut catalog = MemoryCatalog::default().with_table("t", &[("a", "int", false), ("b", "int", false), ("c", "int", false)]);
		// delivered as positions [3, 1, 2]
		let rows = &mut catalog.tables[0].1;
		rows[0].ordinal_position = 3;
		rows[1].ordinal_position = 1;
		rows[2].ordinal_position = 2;

		let table = read_table(&mut catalog, "t".to_owned()).await.unwrap();
		let cols: Vec<_> = table.columns.iter().map(|v| v.name.as_str()).collect();
		assert_eq!(cols, ["b", "c", "a"]);
	}

	#[tokio::test]
	async fn unknown_selected_table_fails() {
		let mut catalog = catalog();
		let selected = vec!["users".to_owned(), "nope".to_owned(), "orders".to_owned()];
		match read_tables(&mut catalog, &selected).await {
			Err(SchemaError::TableNotFound { table }) => assert_eq!(table, "nope"),
			other => panic!("unexpected {:?}", other),
		}
		// stops at the first failure
		assert!(!catalog.column_queries.contains_key("orders"));
	}

	#[tokio::test]
	async fn column_query_failure_fails_whole_read() {
		let mut catalog = catalog();
		catalog.broken.push("orders".to_owned());
		match read_tables(&mut catalog, &[]).await {
			Err(SchemaError::Columns { table, .. }) => assert_eq!(table, "orders"),
			other => panic!("unexpected {:?}", other),
		}
	}

	#[tokio::test]
	async fn listing_failure() {
		let mut catalog = catalog();
		catalog.fail_listing = true;
		assert!(matches!(read_tables(&mut catalog, &[]).await, Err(SchemaError::ListTables(_))));
	}
}
