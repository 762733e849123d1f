//! Tab-separated report files. Each report is rewritten from scratch.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::types::{LoanRow, ShelfRow};

pub const SHELF_LIST: &str = "shelf_list.txt";
pub const CURRENTLY_OUT: &str = "currently_out.txt";
pub const DUE: &str = "overdue.txt";

pub const LOAN_HEADER: [&str; 6] = ["Person's Name", "Title", "Author", "Cutter", "Label Note", "Date Due"];

fn field(value: &Option<String>) -> &str {
	value.as_deref().unwrap_or_default()
}

pub fn write_shelf_list<W: Write>(out: &mut W, rows: &[ShelfRow]) -> io::Result<()> {
	for row in rows {
		writeln!(
			out,
			"{}\t{}\t{}\t{}\t{}",
			row.category,
			row.accession,
			row.title,
			field(&row.author),
			row.cutter,
		)?;
	}
	Ok(())
}

pub fn write_loans<W: Write>(out: &mut W, rows: &[LoanRow]) -> io::Result<()> {
	writeln!(out, "{}", LOAN_HEADER.join("\t"))?;
	for row in rows {
		writeln!(
			out,
			"{}\t{}\t{}\t{}\t{}\t{}",
			row.patron,
			row.title,
			field(&row.author),
			row.cutter,
			field(&row.note),
			row.date_due,
		)?;
	}
	Ok(())
}

/// Truncates `path` and hands a buffered writer to `f`.
pub fn overwrite<F>(path: &Path, f: F) -> io::Result<()>
where
	F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent)?;
	}
	let mut out = BufWriter::new(File::create(path)?);
	f(&mut out)?;
	out.flush()
}
