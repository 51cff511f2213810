//! Reshapes long-format account rows into wide per-company-per-period
//! records.
//!
//! Companies publish the same statement in up to four variants: consolidated
//! or individual scope, and (for cash flow) indirect or direct method. Only
//! one variant survives per (company, date) group, chosen by rank; mixing
//! values from different variants would produce figures no company ever
//! published.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::statements::{Consolidation, FinancialRecord, RawRow, StatementType};

/// Tie-break between consolidated and individual statements when a company
/// publishes both for the same period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsolidationPolicy {
    /// Group-level figures win; individual is a fallback. The default,
    /// since consolidated statements cover the whole economic entity.
    #[default]
    PreferConsolidated,
    /// Standalone-entity figures win; consolidated is a fallback.
    PreferIndividual,
}

impl ConsolidationPolicy {
    /// Rank of a row's variant under this policy; lower wins. The method
    /// bit keeps indirect-method cash flow ahead of direct-method, which
    /// only a handful of companies file.
    fn rank(self, row: &RawRow) -> u8 {
        let scope = match (self, row.consolidation) {
            (Self::PreferConsolidated, Consolidation::Consolidated)
            | (Self::PreferIndividual, Consolidation::Individual) => 0,
            _ => 1,
        };
        let method = u8::from(row.marker == "DFC_MD");
        scope * 2 + method
    }
}

/// Pivots cleaned rows into one [`FinancialRecord`] per (company, date).
///
/// Within a group, only rows of the best-ranked variant contribute; a
/// better-ranked row discards everything accumulated from worse variants.
/// Duplicate (company, date, account) rows within the same variant resolve
/// last-seen-wins. Accounts absent from the source stay `None`.
///
/// Output order is deterministic: ascending (company code, date).
pub fn normalize(
    rows: &[RawRow],
    statement: StatementType,
    policy: ConsolidationPolicy,
) -> Vec<FinancialRecord> {
    let mut groups: BTreeMap<(String, NaiveDate), (u8, FinancialRecord)> = BTreeMap::new();

    for row in rows {
        let rank = policy.rank(row);
        let key = (row.company_code.clone(), row.ref_date);
        match groups.get_mut(&key) {
            None => {
                let mut record = FinancialRecord::from_row(statement, row);
                record.set_account(&row.account_code, row.value);
                groups.insert(key, (rank, record));
            }
            Some((best, record)) => {
                if rank < *best {
                    // Strictly better variant: restart the group from scratch.
                    *best = rank;
                    *record = FinancialRecord::from_row(statement, row);
                    record.set_account(&row.account_code, row.value);
                } else if rank == *best {
                    record.set_account(&row.account_code, row.value);
                }
            }
        }
    }

    groups.into_values().map(|(_, record)| record).collect()
}
