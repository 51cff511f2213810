use std::io::Write;
use std::path::Path;
use std::time::Duration;

use cvmkit::{CvmConfig, CvmUrls, DocKind, FinancialsService};
use zip::write::SimpleFileOptions;

#[allow(dead_code)]
pub const HEADER: &str =
    "CNPJ_CIA;DT_REFER;DENOM_CIA;CD_CVM;ESCALA_MOEDA;ORDEM_EXERC;CD_CONTA;DS_CONTA;VL_CONTA";

/// Latin-1 encodes fixture text the way the portal publishes it. The
/// encoding is the identity map over the first 256 code points.
#[allow(dead_code)]
pub fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u8).collect()
}

/// One statement CSV entry with the standard header row.
#[allow(dead_code)]
pub fn csv_entry(lines: &[String]) -> Vec<u8> {
    let mut text = String::from(HEADER);
    for line in lines {
        text.push('\n');
        text.push_str(line);
    }
    text.push('\n');
    latin1(&text)
}

/// One data line in the portal's column order. `order` is the
/// ORDEM_EXERC value, normally `ÚLTIMO`.
#[allow(dead_code)]
pub fn data_line(
    cnpj: &str,
    date: &str,
    name: &str,
    code: &str,
    order: &str,
    account: &str,
    value: &str,
) -> String {
    format!(
        "{cnpj};{date};{name};{code};UNIDADE;{order};{account};Conta;{value}"
    )
}

/// Writes a bulk archive into `cache_dir` under the deterministic name the
/// fetcher uses, so a subsequent load hits the cache and never touches the
/// network.
#[allow(dead_code)]
pub fn seed_archive(cache_dir: &Path, kind: DocKind, year: i32, entries: &[(String, Vec<u8>)]) {
    std::fs::create_dir_all(cache_dir).unwrap();
    let path = cache_dir.join(kind.archive_name(year));
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, content) in entries {
        writer
            .start_file(name.clone(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().flush().unwrap();
}

/// Entry name for a statement CSV inside a bulk archive, e.g.
/// `itr_cia_aberta_DRE_con_2024.csv`.
#[allow(dead_code)]
pub fn entry_name(kind: DocKind, marker: &str, qualifier: &str, year: i32) -> String {
    format!("{}_cia_aberta_{}_{}_{}.csv", kind, marker, qualifier, year)
}

/// Writes an open-company registry file into `cache_dir` under the name the
/// fetcher uses, one row per company as `(cnpj, name, code, sector)`.
#[allow(dead_code)]
pub fn seed_registry(cache_dir: &Path, companies: &[(&str, &str, &str, &str)]) {
    std::fs::create_dir_all(cache_dir).unwrap();
    let mut text = String::from("CNPJ_CIA;DENOM_CIA;SIT;CD_CVM;SETOR_ATIV");
    for (cnpj, name, code, sector) in companies {
        text.push_str(&format!("\n{cnpj};{name};ATIVO;{code};{sector}"));
    }
    text.push('\n');
    std::fs::write(cache_dir.join("cad_cia_aberta.csv"), latin1(&text)).unwrap();
}

/// Service pointed at an unroutable portal, so any cache miss fails fast
/// instead of reaching the network.
#[allow(dead_code)]
pub fn offline_service(cache_dir: &Path, years: std::ops::RangeInclusive<i32>) -> FinancialsService {
    let config = CvmConfig {
        user_agent: "test_agent example@example.com".to_string(),
        timeout: Duration::from_millis(200),
        max_retries: 0,
        base_urls: CvmUrls {
            itr: "http://127.0.0.1:1/itr".to_string(),
            dfp: "http://127.0.0.1:1/dfp".to_string(),
            registry: "http://127.0.0.1:1/cad".to_string(),
        },
        cache_dir: cache_dir.to_path_buf(),
        years,
        ..CvmConfig::default()
    };
    FinancialsService::new(config).unwrap()
}
