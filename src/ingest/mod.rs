pub mod csv_import;

pub use csv_import::{parse_bets_csv, CsvImport, RowError, CSV_SOURCE};
