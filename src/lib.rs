//! Single-user library catalog: holdings by category, check-out and check-in
//! of physical copies, and tab-separated shelf and loan reports, kept in a
//! local SQLite file.

pub mod catalog;
pub mod config;
pub mod error;
pub mod journal;
pub mod report;
pub mod sql;
pub mod time;
pub mod types;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{Error, Result};
pub use time::{Clock, DateRange, FixedClock, SystemClock, LOAN_PERIOD_DAYS};
pub use types::{
	Accession, BookQuery, CatalogEntry, Category, FoundBook, Loan, LoanRow, NewEntry, ShelfRow,
	ShelfStatus, ANY,
};
