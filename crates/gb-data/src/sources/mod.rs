pub mod csv_source;
pub mod json_source;

pub use csv_source::CsvRecordSource;
pub use json_source::JsonRecordSource;
