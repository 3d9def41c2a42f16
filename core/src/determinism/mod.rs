pub mod digest;
pub mod json_canonical;

pub use digest::{sha256_hex, span_anchor};
pub use json_canonical::{to_canonical_bytes, to_canonical_pretty};
