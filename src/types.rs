use chrono::NaiveDate;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub type Uid = i64;
pub type Accession = i64;

/// Matches any value in a `LIKE` pattern.
pub const ANY: &str = "%";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
	pub code: String,
	pub definition: String,
}

impl Category {
	pub fn from_query(row: &Row) -> Result<Self, rusqlite::Error> {
		Ok(Category {
			code: row.get("category")?,
			definition: row.get("definition")?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
	pub uid: Uid,
	pub category: String,
	pub accession: Accession,
	pub title: String,
	pub author: Option<String>,
	pub cutter: String,
	pub note: Option<String>,
	pub times_circulated: i64,
	pub date_added: NaiveDate,
}

impl CatalogEntry {
	pub fn from_query(row: &Row) -> Result<Self, rusqlite::Error> {
		Ok(CatalogEntry {
			uid: row.get("uid")?,
			category: row.get("category")?,
			accession: row.get("accession")?,
			title: row.get("title")?,
			author: row.get("author")?,
			cutter: row.get("cutter")?,
			note: row.get("note")?,
			times_circulated: row.get("times_circulated")?,
			date_added: row.get("date_added")?,
		})
	}
}

/// Everything needed to catalog a new copy. The accession is always assigned
/// by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEntry {
	pub category: String,
	pub title: String,
	pub author: Option<String>,
	pub cutter: String,
	pub note: Option<String>,
	pub date_added: Option<NaiveDate>,
}

impl NewEntry {
	pub fn new(category: &str, title: &str, author: Option<&str>) -> Self {
		NewEntry {
			category: category.to_owned(),
			title: title.to_owned(),
			author: author.map(str::to_owned),
			cutter: cutter_for(title, author),
			note: None,
			date_added: None,
		}
	}

	pub fn cutter(mut self, cutter: &str) -> Self {
		self.cutter = cutter.to_owned();
		self
	}

	pub fn note(mut self, note: &str) -> Self {
		self.note = Some(note.to_owned());
		self
	}

	pub fn added_on(mut self, date: NaiveDate) -> Self {
		self.date_added = Some(date);
		self
	}
}

const ARTICLES: [&str; 3] = ["the", "a", "an"];

/// Shelving code for a work: the author's surname, or the first significant
/// word of the title when there is no author.
pub fn cutter_for(title: &str, author: Option<&str>) -> String {
	if let Some(author) = author.map(str::trim).filter(|a| !a.is_empty()) {
		// "Austen, Jane" or "Jane Austen"
		let surname = match author.split_once(',') {
			Some((last, _)) => last.trim(),
			None => author.split_whitespace().last().unwrap_or(author),
		};
		return surname.to_owned();
	}

	let mut words = title.split_whitespace();
	let first = words.next().unwrap_or_default();
	if ARTICLES.contains(&first.to_lowercase().as_str()) {
		if let Some(next) = words.next() {
			return next.to_owned();
		}
	}
	first.to_owned()
}

/// Search terms for `find_book`. Each field is a `LIKE` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
	pub category: String,
	pub title: String,
	pub author: String,
}

impl Default for BookQuery {
	fn default() -> Self {
		BookQuery {
			category: ANY.to_owned(),
			title: ANY.to_owned(),
			author: ANY.to_owned(),
		}
	}
}

impl BookQuery {
	pub fn category(mut self, pattern: &str) -> Self {
		self.category = pattern.to_owned();
		self
	}

	pub fn title(mut self, pattern: &str) -> Self {
		self.title = pattern.to_owned();
		self
	}

	pub fn author(mut self, pattern: &str) -> Self {
		self.author = pattern.to_owned();
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundBook {
	pub category: String,
	pub title: String,
	pub author: Option<String>,
	pub cutter: String,
	pub note: Option<String>,
}

impl FoundBook {
	pub fn from_query(row: &Row) -> Result<Self, rusqlite::Error> {
		Ok(FoundBook {
			category: row.get("category")?,
			title: row.get("title")?,
			author: row.get("author")?,
			cutter: row.get("cutter")?,
			note: row.get("note")?,
		})
	}
}

/// An active loan. Removed on check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
	pub category: String,
	pub accession: Accession,
	pub patron: String,
	pub date_out: NaiveDate,
	pub date_due: NaiveDate,
}

impl Loan {
	pub fn from_query(row: &Row) -> Result<Self, rusqlite::Error> {
		Ok(Loan {
			category: row.get("category")?,
			accession: row.get("accession")?,
			patron: row.get("patron")?,
			date_out: row.get("date_out")?,
			date_due: row.get("date_due")?,
		})
	}

	pub fn is_overdue(&self, today: NaiveDate) -> bool {
		self.date_due < today
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShelfStatus {
	Available,
	CheckedOut { patron: String, due: NaiveDate },
}

impl ShelfStatus {
	pub fn is_available(&self) -> bool {
		matches!(self, ShelfStatus::Available)
	}
}

impl std::fmt::Display for ShelfStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			ShelfStatus::Available => write!(f, "available"),
			ShelfStatus::CheckedOut { patron, due } => write!(f, "out to {patron}, due {due}"),
		}
	}
}

/// One line of the shelf list report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfRow {
	pub category: String,
	pub accession: Accession,
	pub title: String,
	pub author: Option<String>,
	pub cutter: String,
}

impl ShelfRow {
	pub fn from_query(row: &Row) -> Result<Self, rusqlite::Error> {
		Ok(ShelfRow {
			category: row.get("category")?,
			accession: row.get("accession")?,
			title: row.get("title")?,
			author: row.get("author")?,
			cutter: row.get("cutter")?,
		})
	}
}

/// One line of the loan reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRow {
	pub patron: String,
	pub title: String,
	pub author: Option<String>,
	pub cutter: String,
	pub note: Option<String>,
	pub date_due: NaiveDate,
}

impl LoanRow {
	pub fn from_query(row: &Row) -> Result<Self, rusqlite::Error> {
		Ok(LoanRow {
			patron: row.get("patron")?,
			title: row.get("title")?,
			author: row.get("author")?,
			cutter: row.get("cutter")?,
			note: row.get("note")?,
			date_due: row.get("date_due")?,
		})
	}
}
