//! Installation paths for the catalog database, transaction log and reports.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::report;

pub const DATABASE_FILE: &str = "library.db";
pub const LOG_FILE: &str = "transactions.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub database: PathBuf,
	pub transaction_log: PathBuf,
	pub report_dir: PathBuf,
}

impl Config {
	/// Keeps everything in one directory.
	pub fn in_dir(dir: &Path) -> Self {
		Config {
			database: dir.join(DATABASE_FILE),
			transaction_log: dir.join(LOG_FILE),
			report_dir: dir.to_owned(),
		}
	}

	/// Reads `LIBRARY_DIR`, `LIBRARY_DATABASE`, `LIBRARY_LOG` and
	/// `LIBRARY_REPORTS`, after loading a `.env` file if one exists.
	pub fn from_env() -> Result<Self> {
		match dotenvy::dotenv() {
			Ok(_) => {}
			Err(e) if e.not_found() => {}
			Err(e) => return Err(Error::Config(format!("can't load .env: {e}"))),
		}
		Config::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
		let base = var("LIBRARY_DIR");

		let pick = |key: &str, file: Option<&str>| -> Result<PathBuf> {
			var(key)
				.or_else(|| base.as_ref().map(|dir| match file {
					Some(file) => dir.join(file),
					None => dir.clone(),
				}))
				.ok_or_else(|| Error::Config(format!("{key} not set and no LIBRARY_DIR to fall back on")))
		};

		Ok(Config {
			database: pick("LIBRARY_DATABASE", Some(DATABASE_FILE))?,
			transaction_log: pick("LIBRARY_LOG", Some(LOG_FILE))?,
			report_dir: pick("LIBRARY_REPORTS", None)?,
		})
	}

	pub fn shelf_list_path(&self) -> PathBuf {
		self.report_dir.join(report::SHELF_LIST)
	}

	pub fn out_list_path(&self) -> PathBuf {
		self.report_dir.join(report::CURRENTLY_OUT)
	}

	pub fn due_list_path(&self) -> PathBuf {
		self.report_dir.join(report::DUE)
	}
}
