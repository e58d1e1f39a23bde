//! Research-product connector for the national open-data portal
//!
//! Products join on a composite key parsed from the portal's product id
//! (researcher code + product sequence). Matched products merge author,
//! group, and identifier facts into the existing work; unmatched ones
//! first run the fuzzy title/author duplicate policy against the
//! similarity index before a new work document is synthesized.

pub mod config;
pub mod parser;
pub mod process;
pub mod record;
pub mod runner;

pub use config::Config;
pub use record::OpendataRecord;
pub use runner::run;
