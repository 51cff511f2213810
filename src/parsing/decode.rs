/// UTF-8 byte-order mark, sometimes prepended by upstream republishing.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes archive entry bytes into text.
///
/// Strips a leading UTF-8 BOM, then tries UTF-8 and falls back to Latin-1.
/// Latin-1 maps every byte to the Unicode code point of the same value, so
/// the fallback cannot fail; mixed or mislabeled files decode to *something*
/// line-structured, and genuinely broken rows are dropped later, row by row,
/// rather than failing the whole entry.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8_passthrough() {
        assert_eq!(decode_text("CNPJ_CIA;DT_REFER".as_bytes()), "CNPJ_CIA;DT_REFER");
    }

    #[test]
    fn strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"CD_CONTA");
        assert_eq!(decode_text(&bytes), "CD_CONTA");
    }

    #[test]
    fn latin1_fallback() {
        // "ÚLTIMO" in Latin-1: 0xDA is not valid UTF-8.
        let bytes = [0xDA, b'L', b'T', b'I', b'M', b'O'];
        assert_eq!(decode_text(&bytes), "ÚLTIMO");
    }

    #[test]
    fn latin1_accented_company_name() {
        let bytes: Vec<u8> = "AMBEV S.A. ADMINISTRAÇÃO"
            .chars()
            .map(|c| c as u8)
            .collect();
        assert_eq!(decode_text(&bytes), "AMBEV S.A. ADMINISTRAÇÃO");
    }
}
