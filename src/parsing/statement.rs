//! Parser turning one cached bulk archive into cleaned long-format rows.
//!
//! Each archive holds several CSV entries per statement type: one per
//! consolidation variant (`_con_` / `_ind_`), and for cash flow one per
//! method (`DFC_MI` / `DFC_MD`). The parser selects the entries for the
//! requested statement by filename marker, so the balance-sheet side
//! (BPA vs BPP) comes from the file's own naming rather than from account
//! codes.
//!
//! Parsing is lazy: rows stream one CSV entry at a time, untracked account
//! codes are discarded immediately, and individual malformed rows are
//! skipped and counted instead of failing the whole entry. Structural
//! problems (no matching entries, no recognized delimiter, missing header
//! columns) are hard errors, since they signal an upstream format change.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{CvmError, Result};
use crate::parsing::decode_text;
use crate::statements::{Consolidation, RawRow, StatementType};

/// Configuration for the statement parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserConfig {
    /// Field delimiter override; auto-detected from the header when `None`
    pub delimiter: Option<u8>,
}

/// Parses statement CSV entries out of cached bulk archives.
///
/// # Examples
///
/// ```no_run
/// use cvmkit::{ParserConfig, StatementParser, StatementType};
///
/// # fn main() -> cvmkit::Result<()> {
/// let parser = StatementParser::new(ParserConfig::default());
/// let rows = parser.parse("data/cache/itr_cia_aberta_2024.zip".as_ref(), StatementType::Dre)?;
/// for row in rows {
///     let row = row?;
///     println!("{} {} = {}", row.company_code, row.account_code, row.value);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatementParser {
    config: ParserConfig,
}

/// One archive entry selected for parsing.
#[derive(Debug)]
struct EntryMeta {
    name: String,
    consolidation: Consolidation,
    marker: &'static str,
}

/// Column positions resolved from an entry's header row.
#[derive(Debug, Clone)]
struct ColumnIndex {
    cnpj: usize,
    company_name: usize,
    company_code: usize,
    ref_date: usize,
    account_code: usize,
    account_description: usize,
    value: usize,
    exercise_order: Option<usize>,
    currency_scale: Option<usize>,
}

impl ColumnIndex {
    const REQUIRED: &'static [&'static str] = &[
        "CNPJ_CIA",
        "DENOM_CIA",
        "CD_CVM",
        "DT_REFER",
        "CD_CONTA",
        "DS_CONTA",
        "VL_CONTA",
    ];

    fn from_headers(headers: &csv::StringRecord) -> std::result::Result<Self, String> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        for required in Self::REQUIRED {
            if position(required).is_none() {
                return Err(format!("missing required column {}", required));
            }
        }

        Ok(Self {
            cnpj: position("CNPJ_CIA").unwrap_or_default(),
            company_name: position("DENOM_CIA").unwrap_or_default(),
            company_code: position("CD_CVM").unwrap_or_default(),
            ref_date: position("DT_REFER").unwrap_or_default(),
            account_code: position("CD_CONTA").unwrap_or_default(),
            account_description: position("DS_CONTA").unwrap_or_default(),
            value: position("VL_CONTA").unwrap_or_default(),
            exercise_order: position("ORDEM_EXERC"),
            currency_scale: position("ESCALA_MOEDA"),
        })
    }
}

/// Per-entry streaming state.
struct EntryRows {
    name: String,
    records: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
    columns: ColumnIndex,
    consolidation: Consolidation,
    marker: &'static str,
    skipped: u64,
}

/// Lazy sequence of cleaned rows for one (archive, statement type) pair.
///
/// Finite and not restartable; re-parsing requires calling
/// [`StatementParser::parse`] on the same path again, which is idempotent
/// because cached archives are immutable.
pub struct RawRows {
    archive: ZipArchive<File>,
    // Stack: entries are popped in reverse of the pushed order.
    pending: Vec<EntryMeta>,
    current: Option<EntryRows>,
    statement: StatementType,
    delimiter: Option<u8>,
}

/// Per-row outcome: genuine rows, damage (counted), and by-design drops.
enum RowOutcome {
    Row(RawRow),
    Skip,
    Discard,
}

impl StatementParser {
    /// Creates a new parser with the specified configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Opens a cached archive and returns the lazy row stream for one
    /// statement type.
    ///
    /// # Errors
    ///
    /// * `CvmError::UnexpectedShape` - the archive holds no CSV entry for
    ///   this statement type (upstream layout change)
    /// * `CvmError::FileError` / `ZipError` - unreadable archive
    ///
    /// Structural errors inside an entry (delimiter, header) surface as
    /// `UnexpectedShape` items while iterating.
    pub fn parse(&self, path: &Path, statement: StatementType) -> Result<RawRows> {
        let archive = ZipArchive::new(File::open(path)?)?;

        let mut pending = Vec::new();
        for marker in statement.markers() {
            let tag = format!("_{}_", marker);
            let mut names: Vec<String> = archive
                .file_names()
                .filter(|name| name.contains(&tag) && name.ends_with(".csv"))
                .map(str::to_owned)
                .collect();
            names.sort();
            for name in names {
                let consolidation = if name.contains("_ind_") {
                    Consolidation::Individual
                } else {
                    // `_con_` entries and legacy unqualified entries.
                    Consolidation::Consolidated
                };
                pending.push(EntryMeta {
                    name,
                    consolidation,
                    marker,
                });
            }
        }

        if pending.is_empty() {
            return Err(CvmError::UnexpectedShape {
                entry: path.display().to_string(),
                reason: format!("no {} CSV entries in archive", statement),
            });
        }

        debug!(archive = %path.display(), %statement, entries = pending.len(), "parsing archive");
        pending.reverse();

        Ok(RawRows {
            archive,
            pending,
            current: None,
            statement,
            delimiter: self.config.delimiter,
        })
    }
}

impl Iterator for RawRows {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut exhausted = false;
            match self.current.as_mut() {
                None => {
                    let meta = self.pending.pop()?;
                    match open_entry(&mut self.archive, &meta, self.delimiter) {
                        Ok(entry) => self.current = Some(entry),
                        Err(err) => return Some(Err(err)),
                    }
                }
                Some(entry) => match entry.records.next() {
                    Some(Ok(record)) => {
                        match build_row(&record, entry, self.statement) {
                            RowOutcome::Row(row) => return Some(Ok(row)),
                            RowOutcome::Skip => entry.skipped += 1,
                            RowOutcome::Discard => {}
                        }
                    }
                    Some(Err(_)) => entry.skipped += 1,
                    None => exhausted = true,
                },
            }
            if exhausted {
                if let Some(done) = self.current.take() {
                    if done.skipped > 0 {
                        warn!(entry = %done.name, skipped = done.skipped, "skipped malformed rows");
                    } else {
                        debug!(entry = %done.name, "finished archive entry");
                    }
                }
            }
        }
    }
}

/// Decompresses one entry, decodes it and positions its column index.
fn open_entry(
    archive: &mut ZipArchive<File>,
    meta: &EntryMeta,
    delimiter: Option<u8>,
) -> Result<EntryRows> {
    let mut file = archive.by_name(&meta.name)?;
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;
    drop(file);

    let text = decode_text(&bytes);
    let delimiter = match delimiter {
        Some(d) => d,
        None => detect_delimiter(&text).ok_or_else(|| CvmError::UnexpectedShape {
            entry: meta.name.clone(),
            reason: "no recognized field delimiter".to_string(),
        })?,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(Cursor::new(text.into_bytes()));

    let headers = reader.headers()?.clone();
    let columns =
        ColumnIndex::from_headers(&headers).map_err(|reason| CvmError::UnexpectedShape {
            entry: meta.name.clone(),
            reason,
        })?;

    Ok(EntryRows {
        name: meta.name.clone(),
        records: reader.into_records(),
        columns,
        consolidation: meta.consolidation,
        marker: meta.marker,
        skipped: 0,
    })
}

/// Picks the delimiter from the header line. CVM uses semicolons; commas
/// cover one-off republished files.
fn detect_delimiter(text: &str) -> Option<u8> {
    let header = text.lines().next()?;
    if header.contains(';') {
        Some(b';')
    } else if header.contains(',') {
        Some(b',')
    } else {
        None
    }
}

/// Cleans one CSV record into a [`RawRow`].
fn build_row(record: &csv::StringRecord, entry: &EntryRows, statement: StatementType) -> RowOutcome {
    let columns = &entry.columns;

    let field = |idx: usize| record.get(idx).map(str::trim);

    // Restated periods (PENÚLTIMO) are republished data, not damage: drop
    // silently, keeping only the latest figures.
    if let Some(idx) = columns.exercise_order {
        match field(idx) {
            Some(order) if order != "ÚLTIMO" => return RowOutcome::Discard,
            _ => {}
        }
    }

    let account_code = match field(columns.account_code) {
        Some(code) if statement.tracks(code) => code.to_string(),
        Some(_) => return RowOutcome::Discard,
        None => return RowOutcome::Skip,
    };

    let (Some(cnpj), Some(company_name), Some(company_code), Some(ref_date), Some(value)) = (
        field(columns.cnpj),
        field(columns.company_name),
        field(columns.company_code),
        field(columns.ref_date),
        field(columns.value),
    ) else {
        return RowOutcome::Skip;
    };

    let Ok(mut value) = value.replace(',', ".").parse::<f64>() else {
        return RowOutcome::Skip;
    };

    // Values published in thousands are normalized to units of one real.
    if let Some(idx) = columns.currency_scale {
        if field(idx).is_some_and(|scale| scale.eq_ignore_ascii_case("MIL")) {
            value *= 1000.0;
        }
    }

    // Tolerate timestamps by using the date prefix only.
    let date_text = ref_date.get(..10).unwrap_or(ref_date);
    let Ok(ref_date) = NaiveDate::parse_from_str(date_text, "%Y-%m-%d") else {
        return RowOutcome::Skip;
    };

    RowOutcome::Row(RawRow {
        company_code: company_code.to_string(),
        company_name: company_name.to_string(),
        cnpj: cnpj.to_string(),
        ref_date,
        account_code,
        account_description: field(columns.account_description)
            .unwrap_or_default()
            .to_string(),
        value,
        consolidation: entry.consolidation,
        marker: entry.marker.to_string(),
    })
}
