//! Filter options for statement queries.

use chrono::NaiveDate;

use crate::error::{CvmError, Result};

/// Filters for [queries](crate::DatasetStore::query) against one statement
/// table. All filters are conjunctive; an empty filter matches every record.
///
/// # Examples
///
/// ```rust
/// use cvmkit::StatementFilter;
///
/// # fn main() -> cvmkit::Result<()> {
/// let filter = StatementFilter::new()
///     .with_code("9512")
///     .try_with_date_range("2024-01-01", "2024-12-31")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementFilter {
    code: Option<String>,
    cnpj_digits: Option<String>,
    date: Option<NaiveDate>,
    date_range: Option<(NaiveDate, NaiveDate)>,
}

/// Strips punctuation so `33.000.167/0001-01` and `33000167000101` compare
/// equal.
pub(crate) fn cnpj_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// CVM codes are published zero-padded in some datasets and bare in others.
pub(crate) fn normalize_code(value: &str) -> &str {
    let stripped = value.trim().trim_start_matches('0');
    if stripped.is_empty() { "0" } else { stripped }
}

impl StatementFilter {
    /// Creates an empty filter matching all records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by exact company CVM code. Leading zeros are ignored on
    /// both sides.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(normalize_code(&code.into()).to_string());
        self
    }

    /// Filters by company tax ID, ignoring punctuation on both sides.
    pub fn with_cnpj(mut self, cnpj: impl Into<String>) -> Self {
        self.cnpj_digits = Some(cnpj_digits(&cnpj.into()));
        self
    }

    /// Filters by exact reference date (`YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// `CvmError::InvalidFilter` naming the `date` parameter when the value
    /// does not parse.
    pub fn try_with_date(mut self, date: &str) -> Result<Self> {
        self.date = Some(parse_date("date", date)?);
        Ok(self)
    }

    /// Filters by inclusive reference-date range.
    ///
    /// # Errors
    ///
    /// `CvmError::InvalidFilter` when either bound does not parse or the
    /// range is inverted.
    pub fn try_with_date_range(mut self, start: &str, end: &str) -> Result<Self> {
        let start = parse_date("start_date", start)?;
        let end = parse_date("end_date", end)?;
        if start > end {
            return Err(CvmError::InvalidFilter {
                param: "start_date",
                reason: format!("range start {} is after end {}", start, end),
            });
        }
        self.date_range = Some((start, end));
        Ok(self)
    }

    /// Whether a record with these identity fields passes the filter.
    pub(crate) fn matches(&self, code: &str, cnpj: &str, ref_date: NaiveDate) -> bool {
        if let Some(want) = &self.code {
            if normalize_code(code) != want {
                return false;
            }
        }
        if let Some(want) = &self.cnpj_digits {
            if cnpj_digits(cnpj) != *want {
                return false;
            }
        }
        if let Some(want) = self.date {
            if ref_date != want {
                return false;
            }
        }
        if let Some((start, end)) = self.date_range {
            if ref_date < start || ref_date > end {
                return false;
            }
        }
        true
    }
}

fn parse_date(param: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| CvmError::InvalidFilter {
        param,
        reason: format!("`{}` is not a YYYY-MM-DD date", value),
    })
}
