use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::types::Loan;

/// Append-only, human-readable record of check-outs.
pub struct TransactionLog {
	file: File,
}

impl TransactionLog {
	pub fn open(path: &Path) -> io::Result<Self> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent)?;
		}
		let file = OpenOptions::new().create(true).append(true).open(path)?;
		Ok(TransactionLog { file })
	}

	pub fn record_checkout(&mut self, loan: &Loan, title: &str, note: Option<&str>) -> io::Result<()> {
		writeln!(self.file, "{}", checkout_line(loan, title, note))?;
		self.file.flush()
	}

	pub fn sync(&mut self) -> io::Result<()> {
		self.file.flush()?;
		self.file.sync_all()
	}
}

pub fn checkout_line(loan: &Loan, title: &str, note: Option<&str>) -> String {
	format!(
		"{} checked out {} ({}) on {}, due back {}",
		loan.patron,
		title,
		note.unwrap_or_default(),
		loan.date_out,
		loan.date_due,
	)
}
