// Spreadsheet import and export around the pricing core.
pub mod csv_parser;
pub mod export;
