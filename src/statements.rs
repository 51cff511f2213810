//! Domain model for CVM financial statement disclosures.
//!
//! The CVM publishes standardized statements in long format: one CSV row per
//! (company, reference date, account code). This module defines the closed
//! set of statement types, the curated subset of account codes extracted
//! from each, the long-format [`RawRow`], and the wide per-company-per-period
//! records produced by the pivot step.
//!
//! Account codes follow the CVM chart of accounts: `1.x` asset side, `2.x`
//! liability/equity side, `3.x` income statement, `6.x` cash flow.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CvmError, Result};

/// The four statement tables served by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatementType {
    /// Income statement (Demonstração do Resultado do Exercício)
    #[serde(rename = "DRE")]
    Dre,
    /// Balance sheet, asset side (Balanço Patrimonial Ativo)
    #[serde(rename = "BPA")]
    Bpa,
    /// Balance sheet, liability and equity side (Balanço Patrimonial Passivo)
    #[serde(rename = "BPP")]
    Bpp,
    /// Cash-flow statement (Demonstração do Fluxo de Caixa)
    #[serde(rename = "DFC")]
    Dfc,
}

/// Tracked accounts for the income statement.
pub const DRE_ACCOUNTS: &[(&str, &str)] = &[
    ("3.01", "Receita Líquida"),
    ("3.02", "Custo dos Bens e/ou Serviços Vendidos"),
    ("3.03", "Resultado Bruto"),
    ("3.04", "Despesas/Receitas Operacionais"),
    ("3.05", "Resultado Antes do Resultado Financeiro e dos Tributos"),
    ("3.06", "Resultado Financeiro"),
    ("3.06.01", "Receitas Financeiras"),
    ("3.06.02", "Despesas Financeiras"),
    ("3.07", "Resultado Antes dos Tributos sobre o Lucro"),
    ("3.08", "Imposto de Renda e Contribuição Social"),
    ("3.09", "Resultado Líquido das Operações Continuadas"),
    ("3.11", "Lucro/Prejuízo do Período"),
];

/// Tracked accounts for the asset side of the balance sheet.
pub const BPA_ACCOUNTS: &[(&str, &str)] = &[
    ("1", "Ativo Total"),
    ("1.01", "Ativo Circulante"),
    ("1.01.01", "Caixa e Equivalentes de Caixa"),
    ("1.01.02", "Aplicações Financeiras"),
    ("1.01.03", "Contas a Receber"),
    ("1.01.04", "Estoques"),
    ("1.02", "Ativo Não Circulante"),
    ("1.02.01", "Ativo Realizável a Longo Prazo"),
    ("1.02.02", "Investimentos"),
    ("1.02.03", "Imobilizado"),
    ("1.02.04", "Intangível"),
];

/// Tracked accounts for the liability/equity side of the balance sheet.
pub const BPP_ACCOUNTS: &[(&str, &str)] = &[
    ("2", "Passivo Total"),
    ("2.01", "Passivo Circulante"),
    ("2.01.04", "Empréstimos e Financiamentos CP"),
    ("2.02", "Passivo Não Circulante"),
    ("2.02.01", "Empréstimos e Financiamentos LP"),
    ("2.03", "Patrimônio Líquido Consolidado"),
    ("2.03.01", "Capital Social Realizado"),
    ("2.03.04", "Reservas de Lucros"),
    ("2.03.08", "Outros Resultados Abrangentes"),
];

/// Tracked accounts for the cash-flow statement.
pub const DFC_ACCOUNTS: &[(&str, &str)] = &[
    ("6.01", "Caixa Líquido Atividades Operacionais"),
    ("6.02", "Caixa Líquido Atividades de Investimento"),
    ("6.03", "Caixa Líquido Atividades de Financiamento"),
    ("6.05", "Aumento (Redução) de Caixa e Equivalentes"),
];

impl StatementType {
    /// All statement types, in the order tables are loaded and reported.
    pub const ALL: [StatementType; 4] = [
        StatementType::Dre,
        StatementType::Bpa,
        StatementType::Bpp,
        StatementType::Dfc,
    ];

    /// Canonical short name, as used in CVM archive entry names.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::Dre => "DRE",
            StatementType::Bpa => "BPA",
            StatementType::Bpp => "BPP",
            StatementType::Dfc => "DFC",
        }
    }

    /// Filename markers identifying this statement's CSV entries inside a
    /// bulk archive. The cash-flow statement comes in two method variants
    /// (indirect `DFC_MI` and direct `DFC_MD`), both feeding the DFC table;
    /// the indirect marker is listed first because it is preferred during
    /// normalization.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            StatementType::Dre => &["DRE"],
            StatementType::Bpa => &["BPA"],
            StatementType::Bpp => &["BPP"],
            StatementType::Dfc => &["DFC_MI", "DFC_MD"],
        }
    }

    /// The curated (code, label) pairs extracted for this statement type.
    /// All other account codes are discarded at parse time.
    pub fn tracked_accounts(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            StatementType::Dre => DRE_ACCOUNTS,
            StatementType::Bpa => BPA_ACCOUNTS,
            StatementType::Bpp => BPP_ACCOUNTS,
            StatementType::Dfc => DFC_ACCOUNTS,
        }
    }

    /// Whether `code` is in the tracked set for this statement type.
    pub fn tracks(&self, code: &str) -> bool {
        self.tracked_accounts().iter().any(|(c, _)| *c == code)
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = CvmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRE" => Ok(StatementType::Dre),
            "BPA" => Ok(StatementType::Bpa),
            "BPP" => Ok(StatementType::Bpp),
            "DFC" | "DFC_MI" | "DFC_MD" => Ok(StatementType::Dfc),
            other => Err(CvmError::InvalidFilter {
                param: "statement",
                reason: format!("unknown statement type `{}`", other),
            }),
        }
    }
}

/// Bulk document kind published by the portal: one archive per kind per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocKind {
    /// Quarterly filings (Informações Trimestrais)
    #[serde(rename = "itr")]
    Itr,
    /// Annual filings (Demonstrações Financeiras Padronizadas)
    #[serde(rename = "dfp")]
    Dfp,
}

impl DocKind {
    /// Both document kinds, fetched and merged on every load.
    pub const ALL: [DocKind; 2] = [DocKind::Itr, DocKind::Dfp];

    /// Lowercase prefix used in portal filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Itr => "itr",
            DocKind::Dfp => "dfp",
        }
    }

    /// Deterministic archive filename for a fiscal year, identical on the
    /// portal and in the local cache (e.g. `itr_cia_aberta_2024.zip`).
    pub fn archive_name(&self, year: i32) -> String {
        format!("{}_cia_aberta_{}.zip", self.as_str(), year)
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statement qualifier: group-level vs standalone-entity figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consolidation {
    /// Group-level figures (`_con_` entries)
    #[serde(rename = "con")]
    Consolidated,
    /// Standalone-entity figures (`_ind_` entries)
    #[serde(rename = "ind")]
    Individual,
}

/// One cleaned long-format row from a decoded archive entry.
///
/// Produced by the parser after filtering to tracked accounts and
/// normalizing values (decimal comma, currency scale, restatement rows
/// dropped). Stored per table to serve the `raw = true` query view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Company CVM code (CD_CVM)
    pub company_code: String,
    /// Company name (DENOM_CIA)
    pub company_name: String,
    /// Company tax ID (CNPJ_CIA), punctuation preserved as published
    pub cnpj: String,
    /// Reference date (DT_REFER)
    pub ref_date: NaiveDate,
    /// Account code (CD_CONTA), always in the tracked set
    pub account_code: String,
    /// Account description as published (DS_CONTA)
    pub account_description: String,
    /// Account value in units of one real (VL_CONTA after scale adjustment)
    pub value: f64,
    /// Consolidated or individual statement variant
    pub consolidation: Consolidation,
    /// Statement marker from the source filename (e.g. `DRE`, `DFC_MI`)
    pub marker: String,
}

/// Directory entry mapping one company to its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyEntry {
    /// Company CVM code
    pub code: String,
    /// Company name
    pub name: String,
    /// Company tax ID
    pub cnpj: String,
}

/// Wide income-statement record: one row per company and reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub company_code: String,
    pub company_name: String,
    pub cnpj: String,
    pub ref_date: NaiveDate,
    #[serde(rename = "3.01")]
    pub net_revenue: Option<f64>,
    #[serde(rename = "3.02")]
    pub cost_of_goods_sold: Option<f64>,
    #[serde(rename = "3.03")]
    pub gross_profit: Option<f64>,
    #[serde(rename = "3.04")]
    pub operating_income_expenses: Option<f64>,
    #[serde(rename = "3.05")]
    pub operating_result: Option<f64>,
    #[serde(rename = "3.06")]
    pub financial_result: Option<f64>,
    #[serde(rename = "3.06.01")]
    pub financial_income: Option<f64>,
    #[serde(rename = "3.06.02")]
    pub financial_expenses: Option<f64>,
    #[serde(rename = "3.07")]
    pub pre_tax_result: Option<f64>,
    #[serde(rename = "3.08")]
    pub income_tax: Option<f64>,
    #[serde(rename = "3.09")]
    pub continuing_operations_result: Option<f64>,
    #[serde(rename = "3.11")]
    pub net_income: Option<f64>,
}

/// Wide balance-sheet record, asset side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetAssets {
    pub company_code: String,
    pub company_name: String,
    pub cnpj: String,
    pub ref_date: NaiveDate,
    #[serde(rename = "1")]
    pub total_assets: Option<f64>,
    #[serde(rename = "1.01")]
    pub current_assets: Option<f64>,
    #[serde(rename = "1.01.01")]
    pub cash_and_equivalents: Option<f64>,
    #[serde(rename = "1.01.02")]
    pub financial_investments: Option<f64>,
    #[serde(rename = "1.01.03")]
    pub accounts_receivable: Option<f64>,
    #[serde(rename = "1.01.04")]
    pub inventories: Option<f64>,
    #[serde(rename = "1.02")]
    pub non_current_assets: Option<f64>,
    #[serde(rename = "1.02.01")]
    pub long_term_receivables: Option<f64>,
    #[serde(rename = "1.02.02")]
    pub investments: Option<f64>,
    #[serde(rename = "1.02.03")]
    pub property_plant_equipment: Option<f64>,
    #[serde(rename = "1.02.04")]
    pub intangible_assets: Option<f64>,
}

/// Wide balance-sheet record, liability and equity side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetLiabilities {
    pub company_code: String,
    pub company_name: String,
    pub cnpj: String,
    pub ref_date: NaiveDate,
    #[serde(rename = "2")]
    pub total_liabilities: Option<f64>,
    #[serde(rename = "2.01")]
    pub current_liabilities: Option<f64>,
    #[serde(rename = "2.01.04")]
    pub short_term_debt: Option<f64>,
    #[serde(rename = "2.02")]
    pub non_current_liabilities: Option<f64>,
    #[serde(rename = "2.02.01")]
    pub long_term_debt: Option<f64>,
    #[serde(rename = "2.03")]
    pub shareholders_equity: Option<f64>,
    #[serde(rename = "2.03.01")]
    pub share_capital: Option<f64>,
    #[serde(rename = "2.03.04")]
    pub profit_reserves: Option<f64>,
    #[serde(rename = "2.03.08")]
    pub other_comprehensive_income: Option<f64>,
}

/// Wide cash-flow record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub company_code: String,
    pub company_name: String,
    pub cnpj: String,
    pub ref_date: NaiveDate,
    #[serde(rename = "6.01")]
    pub operating_cash_flow: Option<f64>,
    #[serde(rename = "6.02")]
    pub investing_cash_flow: Option<f64>,
    #[serde(rename = "6.03")]
    pub financing_cash_flow: Option<f64>,
    #[serde(rename = "6.05")]
    pub net_cash_change: Option<f64>,
}

/// A normalized record for any of the four statement tables.
///
/// The variant is fully determined by the table the record lives in; the
/// tag exists so generic paths (the company bundle, snapshot persistence)
/// can carry mixed records without losing the table identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "statement_type")]
pub enum FinancialRecord {
    #[serde(rename = "DRE")]
    Dre(IncomeStatement),
    #[serde(rename = "BPA")]
    Bpa(BalanceSheetAssets),
    #[serde(rename = "BPP")]
    Bpp(BalanceSheetLiabilities),
    #[serde(rename = "DFC")]
    Dfc(CashFlow),
}

impl FinancialRecord {
    /// Creates an empty record for `statement`, taking identity fields from
    /// `row`. All account fields start as `None`.
    pub fn from_row(statement: StatementType, row: &RawRow) -> Self {
        let company_code = row.company_code.clone();
        let company_name = row.company_name.clone();
        let cnpj = row.cnpj.clone();
        let ref_date = row.ref_date;
        match statement {
            StatementType::Dre => FinancialRecord::Dre(IncomeStatement {
                company_code,
                company_name,
                cnpj,
                ref_date,
                net_revenue: None,
                cost_of_goods_sold: None,
                gross_profit: None,
                operating_income_expenses: None,
                operating_result: None,
                financial_result: None,
                financial_income: None,
                financial_expenses: None,
                pre_tax_result: None,
                income_tax: None,
                continuing_operations_result: None,
                net_income: None,
            }),
            StatementType::Bpa => FinancialRecord::Bpa(BalanceSheetAssets {
                company_code,
                company_name,
                cnpj,
                ref_date,
                total_assets: None,
                current_assets: None,
                cash_and_equivalents: None,
                financial_investments: None,
                accounts_receivable: None,
                inventories: None,
                non_current_assets: None,
                long_term_receivables: None,
                investments: None,
                property_plant_equipment: None,
                intangible_assets: None,
            }),
            StatementType::Bpp => FinancialRecord::Bpp(BalanceSheetLiabilities {
                company_code,
                company_name,
                cnpj,
                ref_date,
                total_liabilities: None,
                current_liabilities: None,
                short_term_debt: None,
                non_current_liabilities: None,
                long_term_debt: None,
                shareholders_equity: None,
                share_capital: None,
                profit_reserves: None,
                other_comprehensive_income: None,
            }),
            StatementType::Dfc => FinancialRecord::Dfc(CashFlow {
                company_code,
                company_name,
                cnpj,
                ref_date,
                operating_cash_flow: None,
                investing_cash_flow: None,
                financing_cash_flow: None,
                net_cash_change: None,
            }),
        }
    }

    /// The table this record belongs to.
    pub fn statement_type(&self) -> StatementType {
        match self {
            FinancialRecord::Dre(_) => StatementType::Dre,
            FinancialRecord::Bpa(_) => StatementType::Bpa,
            FinancialRecord::Bpp(_) => StatementType::Bpp,
            FinancialRecord::Dfc(_) => StatementType::Dfc,
        }
    }

    pub fn company_code(&self) -> &str {
        match self {
            FinancialRecord::Dre(r) => &r.company_code,
            FinancialRecord::Bpa(r) => &r.company_code,
            FinancialRecord::Bpp(r) => &r.company_code,
            FinancialRecord::Dfc(r) => &r.company_code,
        }
    }

    pub fn company_name(&self) -> &str {
        match self {
            FinancialRecord::Dre(r) => &r.company_name,
            FinancialRecord::Bpa(r) => &r.company_name,
            FinancialRecord::Bpp(r) => &r.company_name,
            FinancialRecord::Dfc(r) => &r.company_name,
        }
    }

    pub fn cnpj(&self) -> &str {
        match self {
            FinancialRecord::Dre(r) => &r.cnpj,
            FinancialRecord::Bpa(r) => &r.cnpj,
            FinancialRecord::Bpp(r) => &r.cnpj,
            FinancialRecord::Dfc(r) => &r.cnpj,
        }
    }

    pub fn ref_date(&self) -> NaiveDate {
        match self {
            FinancialRecord::Dre(r) => r.ref_date,
            FinancialRecord::Bpa(r) => r.ref_date,
            FinancialRecord::Bpp(r) => r.ref_date,
            FinancialRecord::Dfc(r) => r.ref_date,
        }
    }

    /// Sets the field for a tracked account code. Untracked codes are
    /// ignored; the parser has already filtered them out.
    pub fn set_account(&mut self, code: &str, value: f64) {
        match self {
            FinancialRecord::Dre(r) => r.set_account(code, value),
            FinancialRecord::Bpa(r) => r.set_account(code, value),
            FinancialRecord::Bpp(r) => r.set_account(code, value),
            FinancialRecord::Dfc(r) => r.set_account(code, value),
        }
    }

    /// Reads the field for a tracked account code; `None` for untracked
    /// codes or absent values.
    pub fn account(&self, code: &str) -> Option<f64> {
        match self {
            FinancialRecord::Dre(r) => r.account(code),
            FinancialRecord::Bpa(r) => r.account(code),
            FinancialRecord::Bpp(r) => r.account(code),
            FinancialRecord::Dfc(r) => r.account(code),
        }
    }
}

impl IncomeStatement {
    fn set_account(&mut self, code: &str, value: f64) {
        match code {
            "3.01" => self.net_revenue = Some(value),
            "3.02" => self.cost_of_goods_sold = Some(value),
            "3.03" => self.gross_profit = Some(value),
            "3.04" => self.operating_income_expenses = Some(value),
            "3.05" => self.operating_result = Some(value),
            "3.06" => self.financial_result = Some(value),
            "3.06.01" => self.financial_income = Some(value),
            "3.06.02" => self.financial_expenses = Some(value),
            "3.07" => self.pre_tax_result = Some(value),
            "3.08" => self.income_tax = Some(value),
            "3.09" => self.continuing_operations_result = Some(value),
            "3.11" => self.net_income = Some(value),
            _ => {}
        }
    }

    fn account(&self, code: &str) -> Option<f64> {
        match code {
            "3.01" => self.net_revenue,
            "3.02" => self.cost_of_goods_sold,
            "3.03" => self.gross_profit,
            "3.04" => self.operating_income_expenses,
            "3.05" => self.operating_result,
            "3.06" => self.financial_result,
            "3.06.01" => self.financial_income,
            "3.06.02" => self.financial_expenses,
            "3.07" => self.pre_tax_result,
            "3.08" => self.income_tax,
            "3.09" => self.continuing_operations_result,
            "3.11" => self.net_income,
            _ => None,
        }
    }
}

impl BalanceSheetAssets {
    fn set_account(&mut self, code: &str, value: f64) {
        match code {
            "1" => self.total_assets = Some(value),
            "1.01" => self.current_assets = Some(value),
            "1.01.01" => self.cash_and_equivalents = Some(value),
            "1.01.02" => self.financial_investments = Some(value),
            "1.01.03" => self.accounts_receivable = Some(value),
            "1.01.04" => self.inventories = Some(value),
            "1.02" => self.non_current_assets = Some(value),
            "1.02.01" => self.long_term_receivables = Some(value),
            "1.02.02" => self.investments = Some(value),
            "1.02.03" => self.property_plant_equipment = Some(value),
            "1.02.04" => self.intangible_assets = Some(value),
            _ => {}
        }
    }

    fn account(&self, code: &str) -> Option<f64> {
        match code {
            "1" => self.total_assets,
            "1.01" => self.current_assets,
            "1.01.01" => self.cash_and_equivalents,
            "1.01.02" => self.financial_investments,
            "1.01.03" => self.accounts_receivable,
            "1.01.04" => self.inventories,
            "1.02" => self.non_current_assets,
            "1.02.01" => self.long_term_receivables,
            "1.02.02" => self.investments,
            "1.02.03" => self.property_plant_equipment,
            "1.02.04" => self.intangible_assets,
            _ => None,
        }
    }
}

impl BalanceSheetLiabilities {
    fn set_account(&mut self, code: &str, value: f64) {
        match code {
            "2" => self.total_liabilities = Some(value),
            "2.01" => self.current_liabilities = Some(value),
            "2.01.04" => self.short_term_debt = Some(value),
            "2.02" => self.non_current_liabilities = Some(value),
            "2.02.01" => self.long_term_debt = Some(value),
            "2.03" => self.shareholders_equity = Some(value),
            "2.03.01" => self.share_capital = Some(value),
            "2.03.04" => self.profit_reserves = Some(value),
            "2.03.08" => self.other_comprehensive_income = Some(value),
            _ => {}
        }
    }

    fn account(&self, code: &str) -> Option<f64> {
        match code {
            "2" => self.total_liabilities,
            "2.01" => self.current_liabilities,
            "2.01.04" => self.short_term_debt,
            "2.02" => self.non_current_liabilities,
            "2.02.01" => self.long_term_debt,
            "2.03" => self.shareholders_equity,
            "2.03.01" => self.share_capital,
            "2.03.04" => self.profit_reserves,
            "2.03.08" => self.other_comprehensive_income,
            _ => None,
        }
    }
}

impl CashFlow {
    fn set_account(&mut self, code: &str, value: f64) {
        match code {
            "6.01" => self.operating_cash_flow = Some(value),
            "6.02" => self.investing_cash_flow = Some(value),
            "6.03" => self.financing_cash_flow = Some(value),
            "6.05" => self.net_cash_change = Some(value),
            _ => {}
        }
    }

    fn account(&self, code: &str) -> Option<f64> {
        match code {
            "6.01" => self.operating_cash_flow,
            "6.02" => self.investing_cash_flow,
            "6.03" => self.financing_cash_flow,
            "6.05" => self.net_cash_change,
            _ => None,
        }
    }
}
