pub mod address;
pub mod dates;
pub mod money;
pub mod quantity;

pub use address::parse_address;
pub use dates::{add_days, find_date_in_text, normalize_date, years_after, MAX_TERM_YEARS};
pub use money::{currency_or_default, detect_currency, extract_numeric_value};
pub use quantity::{first_quantity, infer_unit};
