//! CSV dataset loading
//!
//! Supports files where:
//! - the last column is the label
//! - all other columns are features
//! - the first row can be headers (automatically detected)
//! - labels may be {-1, +1} or {0, 1}; 0 is remapped to -1

use crate::core::{DenseDataset, Result, SvmError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Loader producing a validated [`DenseDataset`] from CSV input
#[derive(Debug)]
pub struct CsvDataset;

impl CsvDataset {
    /// Load a dataset from a CSV file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<DenseDataset> {
        let file = File::open(path).map_err(SvmError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from any buffered reader
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<DenseDataset> {
        let mut features = Vec::new();
        let mut labels = Vec::new();

        let mut first_line = String::new();
        reader.read_line(&mut first_line).map_err(SvmError::IoError)?;
        let first_line = first_line.trim();
        if first_line.is_empty() {
            return Err(SvmError::EmptyDataset);
        }

        if !first_line.starts_with('#') && !Self::is_header_line(first_line) {
            Self::parse_data_line(first_line, &mut features, &mut labels)?;
        }

        for line in reader.lines() {
            let line = line.map_err(SvmError::IoError)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            Self::parse_data_line(line, &mut features, &mut labels)?;
        }

        DenseDataset::new(features, labels)
    }

    /// A line is a header when its leading fields fail numeric parsing
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            return false;
        }
        let non_numeric = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();
        non_numeric > (fields.len() - 1) / 2
    }

    fn parse_data_line(
        line: &str,
        features: &mut Vec<Vec<f64>>,
        labels: &mut Vec<f64>,
    ) -> Result<()> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            return Err(SvmError::ParseError(format!(
                "expected at least one feature and a label, got: {line}"
            )));
        }

        let mut row = Vec::with_capacity(fields.len() - 1);
        for field in &fields[..fields.len() - 1] {
            let value = field.trim().parse::<f64>().map_err(|_| {
                SvmError::ParseError(format!("invalid feature value: {}", field.trim()))
            })?;
            row.push(value);
        }

        let raw_label = fields[fields.len() - 1].trim().parse::<f64>().map_err(|_| {
            SvmError::ParseError(format!(
                "invalid label value: {}",
                fields[fields.len() - 1].trim()
            ))
        })?;
        // 0/1 labeled data (e.g. the breast cancer set) maps onto -1/+1
        let label = if raw_label == 0.0 { -1.0 } else { raw_label };

        features.push(row);
        labels.push(label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_load_plain_csv() {
        let data = "1.0,2.0,1\n-1.0,-2.0,-1\n";
        let dataset = CsvDataset::from_reader(Cursor::new(data)).expect("load");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 2);
        assert_eq!(dataset.label(0), 1.0);
        assert_eq!(dataset.row(1), &[-1.0, -2.0]);
    }

    #[test]
    fn test_header_detection() {
        let data = "x1,x2,class\n1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = CsvDataset::from_reader(Cursor::new(data)).expect("load");
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_zero_one_labels_are_remapped() {
        let data = "1.0,1\n2.0,0\n";
        let dataset = CsvDataset::from_reader(Cursor::new(data)).expect("load");
        assert_eq!(dataset.label(0), 1.0);
        assert_eq!(dataset.label(1), -1.0);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let data = "# generated\n1.0,1\n\n-1.0,-1\n";
        let dataset = CsvDataset::from_reader(Cursor::new(data)).expect("load");
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_bad_feature_value_is_parse_error() {
        let data = "1.0,abc,1\n";
        assert!(matches!(
            CsvDataset::from_reader(Cursor::new(data)),
            Err(SvmError::ParseError(_))
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(CsvDataset::from_reader(Cursor::new("")).is_err());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = "1.0,2.0,1\n1.0,-1\n";
        assert!(CsvDataset::from_reader(Cursor::new(data)).is_err());
    }
}
