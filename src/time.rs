use std::cell::Cell;
use std::rc::Rc;

use chrono::{Duration, Local, NaiveDate};

/// Length of a loan, from check-out to due date.
pub const LOAN_PERIOD_DAYS: i64 = 14;

pub fn due_date(date_out: NaiveDate) -> NaiveDate {
	date_out + Duration::days(LOAN_PERIOD_DAYS)
}

/// Source of "today" for check-outs, accessions and due reports.
pub trait Clock {
	fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn today(&self) -> NaiveDate {
		Local::now().date_naive()
	}
}

/// A clock that only moves when told to. Clones share the same date.
#[derive(Debug, Clone)]
pub struct FixedClock(Rc<Cell<NaiveDate>>);

impl FixedClock {
	pub fn new(date: NaiveDate) -> Self {
		FixedClock(Rc::new(Cell::new(date)))
	}

	pub fn set(&self, date: NaiveDate) {
		self.0.set(date);
	}

	pub fn advance(&self, days: i64) {
		self.0.set(self.0.get() + Duration::days(days));
	}
}

impl Clock for FixedClock {
	fn today(&self) -> NaiveDate {
		self.0.get()
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
	#[error("Month Error")]
	MonthParseError,
	#[error("Year Parsing Error")]
	YearParseError,
	#[error("Day Parsing Error")]
	DayParseError,
	#[error("Day range error")]
	DayRangeError,
	#[error("Wrong Length Error")]
	WrongLenError,
	#[error("range starts after it ends")]
	InvertedRange,
}

fn month_number(s: &str) -> Result<u32, DateError> {
	Ok(match s.to_lowercase().as_str() {
		"jan"|"january"|"01"|"1" => 1,
		"feb"|"february"|"02"|"2" => 2,
		"mar"|"march"|"03"|"3" => 3,
		"apr"|"april"|"04"|"4" => 4,
		"may"|"05"|"5" => 5,
		"jun"|"june"|"06"|"6" => 6,
		"jul"|"july"|"07"|"7" => 7,
		"aug"|"august"|"08"|"8" => 8,
		"sep"|"sept"|"september"|"09"|"9" => 9,
		"oct"|"october"|"10" => 10,
		"nov"|"november"|"11" => 11,
		"dec"|"december"|"12" => 12,
		_ => return Err(DateError::MonthParseError),
	})
}

/// Accepts `2026-10-18` as well as day-month-year forms like `18-Oct-2026`
/// or `18/10/2026`.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
	let s = s.trim();
	if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
		return Ok(date);
	}

	let split: Vec<&str> = s.split(['-', '/']).collect();
	if split.len() != 3 {
		return Err(DateError::WrongLenError);
	}
	let day: u32 = split[0].parse().or(Err(DateError::DayParseError))?;
	let month = month_number(split[1])?;
	let year: i32 = split[2].parse().or(Err(DateError::YearParseError))?;

	NaiveDate::from_ymd_opt(year, month, day).ok_or(DateError::DayRangeError)
}

/// Inclusive range of `date_added` values for shelf lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
	pub from: NaiveDate,
	pub to: NaiveDate,
}

impl Default for DateRange {
	fn default() -> Self {
		DateRange {
			from: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap_or(NaiveDate::MIN),
			to: NaiveDate::from_ymd_opt(9999, 12, 12).unwrap_or(NaiveDate::MAX),
		}
	}
}

impl DateRange {
	pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, DateError> {
		if from > to {
			return Err(DateError::InvertedRange);
		}
		Ok(DateRange { from, to })
	}

	pub fn parse(from: &str, to: &str) -> Result<Self, DateError> {
		DateRange::new(parse_date(from)?, parse_date(to)?)
	}

	pub fn since(from: NaiveDate) -> Self {
		DateRange { from, ..DateRange::default() }
	}
}
