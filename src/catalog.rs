use std::collections::BTreeSet;
use std::path::PathBuf;

use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::journal::TransactionLog;
use crate::report;
use crate::sql::{self, DB};
use crate::time::{due_date, Clock, DateRange, SystemClock};
use crate::types::{
	Accession, BookQuery, CatalogEntry, Category, FoundBook, Loan, LoanRow, NewEntry, ShelfRow,
	ShelfStatus,
};

/// Known category codes, reloaded from the store whenever categories change.
#[derive(Debug, Default)]
struct CategoryCache(BTreeSet<String>);

impl CategoryCache {
	fn load(db: &DB) -> Result<Self> {
		let codes: Vec<String> = db.query_all("SELECT category FROM categories", [], |row| row.get(0))?;
		Ok(CategoryCache(codes.into_iter().collect()))
	}

	fn contains(&self, code: &str) -> bool {
		self.0.contains(code)
	}
}

const LOAN_ROWS: &str = "
SELECT r.patron AS patron, c.title AS title, c.author AS author,
	c.cutter AS cutter, c.note AS note, r.date_due AS date_due
FROM catalog c
JOIN circulation r
	ON c.category = r.category
	AND c.accession = r.accession";

/// A library catalog backed by a single SQLite file.
///
/// The catalog owns its connection and transaction log for its whole
/// lifetime and assumes it is the only writer.
pub struct Catalog {
	db: DB,
	log: TransactionLog,
	categories: CategoryCache,
	config: Config,
	clock: Box<dyn Clock>,
}

impl Catalog {
	/// Opens (or creates) the store and transaction log named in `config`.
	pub fn open(config: Config) -> Result<Self> {
		Catalog::with_clock(config, SystemClock)
	}

	pub fn with_clock<C: Clock + 'static>(config: Config, clock: C) -> Result<Self> {
		let db = sql::open(&config.database).map_err(|e| {
			Error::Config(format!("can't open database {}: {e}", config.database.display()))
		})?;
		db.schema(sql::SQL_TABLE_SCHEMA)?;

		let log = TransactionLog::open(&config.transaction_log).map_err(|e| {
			Error::Config(format!("can't open transaction log {}: {e}", config.transaction_log.display()))
		})?;

		let categories = CategoryCache::load(&db)?;
		info!(
			"opened catalog {} ({} categories)",
			config.database.display(),
			categories.0.len()
		);

		Ok(Catalog { db, log, categories, config, clock: Box::new(clock) })
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn today(&self) -> chrono::NaiveDate {
		self.clock.today()
	}

	/// Flushes the transaction log and closes the store.
	pub fn close(mut self) -> Result<()> {
		self.log.sync()?;
		self.db.close().map_err(|(_, e)| Error::Sql(e))?;
		info!("closed catalog {}", self.config.database.display());
		Ok(())
	}

	// categories

	pub fn add_category(&mut self, code: &str, definition: &str) -> Result<()> {
		self.db.exec(
			"INSERT INTO categories (category, definition) VALUES (?1, ?2)",
			params![code, definition],
		)?;
		self.categories = CategoryCache::load(&self.db)?;
		info!("added category {code}");
		Ok(())
	}

	/// Refuses to remove a category that still has catalog entries.
	pub fn delete_category(&mut self, code: &str) -> Result<bool> {
		let entries: i64 = self.db
			.query_one("SELECT COUNT(*) FROM catalog WHERE category = ?1", [code], |row| row.get(0))?
			.unwrap_or(0);
		if entries > 0 {
			warn!("refusing to delete category {code} with {entries} entries");
			return Err(Error::CategoryInUse { code: code.to_owned(), entries });
		}

		let removed = self.db.exec("DELETE FROM categories WHERE category = ?1", [code])?;
		self.categories = CategoryCache::load(&self.db)?;
		info!("deleted category {code}");
		Ok(removed > 0)
	}

	pub fn categories(&self) -> Result<Vec<Category>> {
		Ok(self.db.query_all(
			"SELECT category, definition FROM categories ORDER BY category",
			[],
			Category::from_query,
		)?)
	}

	pub fn is_category(&self, code: &str) -> bool {
		self.categories.contains(code)
	}

	// holdings

	/// Catalogs a copy, deriving the cutter from the author or title.
	/// Returns the assigned accession number.
	pub fn add_book(&mut self, category: &str, title: &str, author: Option<&str>) -> Result<Accession> {
		self.add_entry(NewEntry::new(category, title, author))
	}

	pub fn add_entry(&mut self, entry: NewEntry) -> Result<Accession> {
		if !self.categories.contains(&entry.category) {
			return Err(Error::UnknownCategory(entry.category));
		}
		let date_added = entry.date_added.unwrap_or_else(|| self.clock.today());

		let tx = self.db.transaction()?;
		// equal to 1 + count while accessions are dense
		let accession: Accession = tx.query_row(
			"SELECT MAX(COUNT(*), IFNULL(MAX(accession), 0)) + 1 FROM catalog WHERE category = ?1",
			[&entry.category],
			|row| row.get(0),
		)?;
		tx.execute(
			"INSERT INTO catalog (category, accession, title, author, cutter, note, date_added)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
			params![
				entry.category,
				accession,
				entry.title,
				entry.author,
				entry.cutter,
				entry.note,
				date_added,
			],
		)?;
		tx.commit()?;

		info!("added {} {accession} {:?}", entry.category, entry.title);
		Ok(accession)
	}

	/// Removes a copy from the catalog. Returns false when nothing matched.
	/// A copy that is checked out must be checked in first.
	pub fn delete_book(&mut self, category: &str, accession: Accession) -> Result<bool> {
		if self.loan(category, accession)?.is_some() {
			warn!("refusing to delete {category} {accession} while checked out");
			return Err(Error::CheckedOut { category: category.to_owned(), accession });
		}
		let removed = self.db.exec(
			"DELETE FROM catalog WHERE category = ?1 AND accession = ?2",
			params![category, accession],
		)?;
		if removed > 0 {
			info!("deleted {category} {accession}");
		}
		Ok(removed > 0)
	}

	pub fn entry(&self, category: &str, accession: Accession) -> Result<Option<CatalogEntry>> {
		Ok(self.db.query_one(
			"SELECT uid, category, accession, title, author, cutter, note, times_circulated, date_added
			FROM catalog WHERE category = ?1 AND accession = ?2",
			params![category, accession],
			CatalogEntry::from_query,
		)?)
	}

	/// `LIKE` search over category, title and author. Results are unordered.
	pub fn find_book(&self, query: &BookQuery) -> Result<Vec<FoundBook>> {
		debug!("find_book {query:?}");
		Ok(self.db.query_all(
			"SELECT category, title, author, cutter, note
			FROM catalog
			WHERE category LIKE ?1
				AND title LIKE ?2
				AND IFNULL(author, '') LIKE ?3",
			params![query.category, query.title, query.author],
			FoundBook::from_query,
		)?)
	}

	// circulation

	fn loan(&self, category: &str, accession: Accession) -> Result<Option<Loan>> {
		Ok(self.db.query_one(
			"SELECT category, accession, patron, date_out, date_due
			FROM circulation WHERE category = ?1 AND accession = ?2",
			params![category, accession],
			Loan::from_query,
		)?)
	}

	pub fn loans(&self) -> Result<Vec<Loan>> {
		Ok(self.db.query_all(
			"SELECT category, accession, patron, date_out, date_due
			FROM circulation ORDER BY date_due, category, accession",
			[],
			Loan::from_query,
		)?)
	}

	/// Active loans whose due date has passed.
	pub fn overdue_loans(&self) -> Result<Vec<Loan>> {
		let today = self.clock.today();
		Ok(self.loans()?.into_iter().filter(|loan| loan.is_overdue(today)).collect())
	}

	pub fn status(&self, category: &str, accession: Accession) -> Result<ShelfStatus> {
		if self.entry(category, accession)?.is_none() {
			return Err(Error::NotFound { category: category.to_owned(), accession });
		}
		Ok(match self.loan(category, accession)? {
			Some(loan) => ShelfStatus::CheckedOut { patron: loan.patron, due: loan.date_due },
			None => ShelfStatus::Available,
		})
	}

	/// Lends a copy for the standard loan period and logs the transaction.
	pub fn check_out(&mut self, category: &str, accession: Accession, patron: &str) -> Result<Loan> {
		let date_out = self.clock.today();
		let loan = Loan {
			category: category.to_owned(),
			accession,
			patron: patron.to_owned(),
			date_out,
			date_due: due_date(date_out),
		};

		let tx = self.db.transaction()?;
		let (title, note): (String, Option<String>) = tx
			.query_row(
				"SELECT title, note FROM catalog WHERE category = ?1 AND accession = ?2",
				params![category, accession],
				|row| Ok((row.get(0)?, row.get(1)?)),
			)
			.optional()?
			.ok_or_else(|| Error::NotFound { category: category.to_owned(), accession })?;

		let holder: Option<String> = tx
			.query_row(
				"SELECT patron FROM circulation WHERE category = ?1 AND accession = ?2",
				params![category, accession],
				|row| row.get(0),
			)
			.optional()?;
		if let Some(holder) = holder {
			warn!("{category} {accession} already out to {holder}");
			return Err(Error::AlreadyCheckedOut { category: category.to_owned(), accession, patron: holder });
		}

		tx.execute(
			"UPDATE catalog SET times_circulated = times_circulated + 1
			WHERE category = ?1 AND accession = ?2",
			params![category, accession],
		)?;
		tx.execute(
			"INSERT INTO circulation (category, accession, patron, date_out, date_due)
			VALUES (?1, ?2, ?3, ?4, ?5)",
			params![loan.category, loan.accession, loan.patron, loan.date_out, loan.date_due],
		)?;
		// a failed log write drops tx and rolls the loan back
		self.log.record_checkout(&loan, &title, note.as_deref())?;
		tx.commit()?;

		info!("{patron} checked out {category} {accession}, due {}", loan.date_due);
		Ok(loan)
	}

	/// Closes the loan on a copy. The circulation count is left as is.
	pub fn check_in(&mut self, category: &str, accession: Accession) -> Result<Loan> {
		let loan = self.loan(category, accession)?.ok_or_else(|| {
			Error::NotCheckedOut { category: category.to_owned(), accession }
		})?;
		self.db.exec(
			"DELETE FROM circulation WHERE category = ?1 AND accession = ?2",
			params![category, accession],
		)?;
		info!("checked in {category} {accession} from {}", loan.patron);
		Ok(loan)
	}

	/// Checks in by title and author instead of accession. Exactly one
	/// active loan in the category has to match.
	pub fn check_in_work(&mut self, category: &str, title: &str, author: Option<&str>) -> Result<Loan> {
		let matches: Vec<Loan> = self.db.query_all(
			"SELECT r.category AS category, r.accession AS accession, r.patron AS patron,
				r.date_out AS date_out, r.date_due AS date_due
			FROM circulation r
			JOIN catalog c
				ON c.category = r.category
				AND c.accession = r.accession
			WHERE c.category = ?1
				AND c.title = ?2
				AND IFNULL(c.author, '') = IFNULL(?3, '') COLLATE NOCASE",
			params![category, title, author],
			Loan::from_query,
		)?;

		match matches.as_slice() {
			[] => Err(Error::NoLoanFor { category: category.to_owned(), title: title.to_owned() }),
			[loan] => {
				let accession = loan.accession;
				self.check_in(category, accession)
			}
			_ => Err(Error::AmbiguousLoan {
				category: category.to_owned(),
				title: title.to_owned(),
				matches: matches.len(),
			}),
		}
	}

	// reports

	pub fn shelf_rows<S: AsRef<str>>(&self, categories: &[S], range: DateRange) -> Result<Vec<ShelfRow>> {
		if categories.is_empty() {
			return Ok(Vec::new());
		}
		let placeholders = vec!["?"; categories.len()].join(", ");
		let command = format!(
			"SELECT category, accession, title, author, cutter
			FROM catalog
			WHERE category IN ({placeholders})
				AND date_added BETWEEN ? AND ?
			ORDER BY category, accession"
		);

		let mut values: Vec<Value> = categories.iter()
			.map(|c| Value::Text(c.as_ref().to_owned()))
			.collect();
		values.push(Value::Text(range.from.to_string()));
		values.push(Value::Text(range.to.to_string()));

		Ok(self.db.query_all(&command, params_from_iter(values), ShelfRow::from_query)?)
	}

	/// Writes every entry of `categories` added within `range` to the shelf
	/// list report.
	pub fn shelf_list<S: AsRef<str>>(&self, categories: &[S], range: DateRange) -> Result<PathBuf> {
		let rows = self.shelf_rows(categories, range)?;
		let path = self.config.shelf_list_path();
		report::overwrite(&path, |out| report::write_shelf_list(out, &rows))?;
		debug!("wrote {} shelf list rows to {}", rows.len(), path.display());
		Ok(path)
	}

	pub fn out_rows(&self) -> Result<Vec<LoanRow>> {
		let command = format!("{LOAN_ROWS} ORDER BY r.date_due, c.category, c.accession");
		Ok(self.db.query_all(&command, [], LoanRow::from_query)?)
	}

	/// Writes every active loan to the currently-out report.
	pub fn out_list(&self) -> Result<PathBuf> {
		let rows = self.out_rows()?;
		let path = self.config.out_list_path();
		report::overwrite(&path, |out| report::write_loans(out, &rows))?;
		debug!("wrote {} loans to {}", rows.len(), path.display());
		Ok(path)
	}

	/// Loans due today or later.
	pub fn due_rows(&self) -> Result<Vec<LoanRow>> {
		let command = format!("{LOAN_ROWS} WHERE r.date_due >= ?1 ORDER BY r.date_due, c.category, c.accession");
		Ok(self.db.query_all(&command, [self.clock.today()], LoanRow::from_query)?)
	}

	pub fn due_list(&self) -> Result<PathBuf> {
		let rows = self.due_rows()?;
		let path = self.config.due_list_path();
		report::overwrite(&path, |out| report::write_loans(out, &rows))?;
		debug!("wrote {} due loans to {}", rows.len(), path.display());
		Ok(path)
	}
}
