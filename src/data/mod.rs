//! Data loading for dense labeled datasets

pub mod csv;

pub use self::csv::CsvDataset;
