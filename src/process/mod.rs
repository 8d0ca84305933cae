// src/process/mod.rs
pub mod extract;
pub mod raw_table;
pub mod text;

pub use extract::{extract_months, shows_for_month, Availability, ShowAvailability};
pub use raw_table::{AvailabilityRow, Columns, RawTable};
pub use text::{extract_date_phrase, month_label, title_case, DatePhrase};
