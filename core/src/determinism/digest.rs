use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Deterministic anchor for a span of document text.
///
/// Format: `<PREFIX>_<first 8 hex of sha256(text)>_<char offset>`
pub fn span_anchor(prefix: &str, text: &str, char_offset: usize) -> String {
    let digest = sha256_hex(text.as_bytes());
    format!("{}_{}_{}", prefix, &digest[..8], char_offset)
}
