use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Params, Row, Transaction};

pub struct DB(Connection);

pub const MEMORY: &str = ":memory:";

pub fn open(path: &Path) -> Result<DB, rusqlite::Error> {
	let con = if path.as_os_str() == MEMORY {
		Connection::open_in_memory()?
	} else {
		Connection::open(path)?
	};
	con.pragma_update(None, "foreign_keys", "ON")?;
	Ok(DB(con))
}

impl DB {
	// runs every statement in `command`
	pub fn schema(&self, command: &str) -> Result<(), rusqlite::Error> {
		self.0.execute_batch(command)
	}

	// on Ok returns number of rows edited
	pub fn exec<P: Params>(&self, command: &str, params: P) -> Result<usize, rusqlite::Error> {
		self.0.prepare_cached(command)?.execute(params)
	}

	pub fn query_one<T, P, F>(&self, command: &str, params: P, f: F) -> Result<Option<T>, rusqlite::Error>
	where
		P: Params,
		F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
	{
		self.0.prepare_cached(command)?.query_row(params, f).optional()
	}

	pub fn query_all<T, P, F>(&self, command: &str, params: P, f: F) -> Result<Vec<T>, rusqlite::Error>
	where
		P: Params,
		F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
	{
		let mut stmt = self.0.prepare_cached(command)?;
		let rows = stmt.query_map(params, f)?;
		rows.collect()
	}

	pub fn transaction(&mut self) -> Result<Transaction<'_>, rusqlite::Error> {
		self.0.transaction()
	}

	pub fn close(self) -> Result<(), (DB, rusqlite::Error)> {
		self.0.close().map_err(|(con, e)| (DB(con), e))
	}
}

pub const SQL_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
	category TEXT NOT NULL PRIMARY KEY,
	definition TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS catalog (
	uid INTEGER PRIMARY KEY AUTOINCREMENT,
	category TEXT NOT NULL,
	accession INTEGER NOT NULL,
	title TEXT NOT NULL COLLATE NOCASE CHECK(title != ''),
	author TEXT COLLATE NOCASE,
	cutter TEXT NOT NULL COLLATE NOCASE CHECK(cutter != ''),
	note TEXT COLLATE NOCASE,
	times_circulated INTEGER NOT NULL DEFAULT 0,
	date_added DATE NOT NULL,
	UNIQUE(category, accession),
	FOREIGN KEY(category) REFERENCES categories(category)
);

CREATE INDEX IF NOT EXISTS authors ON catalog(author);
CREATE INDEX IF NOT EXISTS titles ON catalog(title);

CREATE TABLE IF NOT EXISTS circulation (
	category TEXT NOT NULL,
	accession INTEGER NOT NULL,
	patron TEXT NOT NULL COLLATE NOCASE CHECK(patron != ''),
	date_out DATE NOT NULL,
	date_due DATE NOT NULL,
	UNIQUE(category, accession),
	FOREIGN KEY(category, accession) REFERENCES catalog(category, accession)
);
"#;

#[cfg(test)]
mod tests {
	use super::*;

	fn memory() -> DB {
		let db = open(Path::new(MEMORY)).unwrap();
		db.schema(SQL_TABLE_SCHEMA).unwrap();
		db
	}

	#[test]
	fn schema_is_idempotent() {
		let db = memory();
		db.schema(SQL_TABLE_SCHEMA).unwrap();
		let tables: Vec<String> = db.query_all(
			"SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
			[],
			|row| row.get(0),
		).unwrap();
		assert_eq!(tables, ["catalog", "categories", "circulation"]);
	}

	#[test]
	fn lookup_indexes_exist() {
		let db = memory();
		let indexes: Vec<String> = db.query_all(
			"SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'catalog' AND name NOT LIKE 'sqlite_%' ORDER BY name",
			[],
			|row| row.get(0),
		).unwrap();
		assert_eq!(indexes, ["authors", "titles"]);
	}

	#[test]
	fn foreign_keys_are_enforced() {
		let db = memory();
		let err = db.exec(
			"INSERT INTO catalog (category, accession, title, cutter, date_added) VALUES ('FIC', 1, 'Emma', 'Austen', '2024-01-01')",
			[],
		);
		assert!(err.is_err());
	}

	#[test]
	fn blank_title_is_rejected() {
		let db = memory();
		db.exec("INSERT INTO categories (category) VALUES ('FIC')", []).unwrap();
		let err = db.exec(
			"INSERT INTO catalog (category, accession, title, cutter, date_added) VALUES ('FIC', 1, '', 'Austen', '2024-01-01')",
			[],
		);
		assert!(err.is_err());
	}

	#[test]
	fn query_one_missing_row_is_none() {
		let db = memory();
		let hit: Option<String> = db.query_one(
			"SELECT definition FROM categories WHERE category = ?1",
			["BIO"],
			|row| row.get(0),
		).unwrap();
		assert!(hit.is_none());
	}
}
