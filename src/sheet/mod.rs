pub mod export;
pub mod reader;
pub mod records;

pub use export::{export_to_csv, to_csv_string, write_csv, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};
pub use reader::{read_sheet, Cell, RawSheet, SheetOptions, SheetRow, DEFAULT_SKIP_ROWS};
pub use records::{profitability_records, register_records};
