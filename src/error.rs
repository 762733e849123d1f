use crate::time::DateError;
use crate::types::Accession;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("database error: {0}")]
	Sql(#[from] rusqlite::Error),

	#[error("invalid date: {0}")]
	Date(#[from] DateError),

	#[error("unknown category {0:?}")]
	UnknownCategory(String),

	#[error("category {code:?} still holds {entries} catalog entries")]
	CategoryInUse { code: String, entries: i64 },

	#[error("no catalog entry {category} {accession}")]
	NotFound { category: String, accession: Accession },

	#[error("{category} {accession} is not checked out")]
	NotCheckedOut { category: String, accession: Accession },

	#[error("no active loan for {title:?} in {category}")]
	NoLoanFor { category: String, title: String },

	#[error("{matches} active loans match {title:?} in {category}")]
	AmbiguousLoan { category: String, title: String, matches: usize },

	#[error("{category} {accession} is already checked out to {patron}")]
	AlreadyCheckedOut { category: String, accession: Accession, patron: String },

	#[error("{category} {accession} is checked out and cannot be removed")]
	CheckedOut { category: String, accession: Accession },
}
