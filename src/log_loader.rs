use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;

use crate::food_log::NutritionRecord;

// Expected column headers
const DATE_COL: &str = "date";
const NAME_COL: &str = "name";
const CALORIES_COL: &str = "calories";
const PROTEIN_COL: &str = "protein";
const IMAGE_COL: &str = "image_ref";
const NOTE_COL: &str = "note";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn optional_text(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name))
}

/// Loads a flat food log from CSV. `image_ref` and `note` columns are optional;
/// every other column is required and every row must validate.
pub fn load_food_log(csv_path: &Path) -> Result<Vec<NutritionRecord>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Food log CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open food log CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let date_idx = column(&headers, DATE_COL)?;
    let name_idx = column(&headers, NAME_COL)?;
    let calories_idx = column(&headers, CALORIES_COL)?;
    let protein_idx = column(&headers, PROTEIN_COL)?;
    let image_idx = column(&headers, IMAGE_COL).ok();
    let note_idx = column(&headers, NOTE_COL).ok();

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let row = result
            .with_context(|| format!("Failed to read record at row index {}", row_index))?;
        let field = |idx: usize, col: &str| {
            row.get(idx)
                .map(str::trim)
                .ok_or_else(|| anyhow::anyhow!("Missing {} at row {}", col, row_index))
        };

        let date_text = field(date_idx, DATE_COL)?;
        let occurred_on = NaiveDate::parse_from_str(date_text, DATE_FORMAT)
            .with_context(|| format!("Invalid date '{}' at row {}", date_text, row_index))?;
        let calories_text = field(calories_idx, CALORIES_COL)?;
        let calories: f64 = calories_text
            .parse()
            .with_context(|| format!("Invalid calories '{}' at row {}", calories_text, row_index))?;
        let protein_text = field(protein_idx, PROTEIN_COL)?;
        let protein: f64 = protein_text
            .parse()
            .with_context(|| format!("Invalid protein '{}' at row {}", protein_text, row_index))?;

        let name = field(name_idx, NAME_COL)?;
        let record = NutritionRecord::new(name, calories, protein, occurred_on)
            .with_context(|| format!("Invalid record at row {}", row_index))?
            .with_image_ref(optional_text(image_idx.and_then(|i| row.get(i))))
            .with_note(optional_text(note_idx.and_then(|i| row.get(i))));
        records.push(record);
    }

    tracing::debug!(path = ?csv_path, records = records.len(), "Loaded food log");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_food_log_success() -> Result<()> {
        let file = write_csv(&[
            "date,name,calories,protein,image_ref,note",
            "2024-03-01,chicken rice,400,30,  ,",
            "2024-03-01,\"2 rotis, dal, rice\",520,18,photos/1.jpg,homemade",
            "2024-03-02,salad,150,5,,",
        ])?;
        let records = load_food_log(file.path())?;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name(), "chicken rice");
        assert_eq!(records[0].image_ref(), None);
        assert_eq!(records[1].name(), "2 rotis, dal, rice");
        assert_eq!(records[1].image_ref(), Some("photos/1.jpg"));
        assert_eq!(records[1].note(), Some("homemade"));
        assert_eq!(records[2].occurred_on(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        Ok(())
    }

    #[test]
    fn test_optional_columns_may_be_absent() -> Result<()> {
        let file = write_csv(&["date,name,calories,protein", "2024-03-01,oats,300,10"])?;
        let records = load_food_log(file.path())?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].note(), None);
        Ok(())
    }

    #[test]
    fn test_missing_required_column() -> Result<()> {
        let file = write_csv(&["date,name,protein", "2024-03-01,oats,10"])?;
        let result = load_food_log(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Column 'calories' not found"));
        Ok(())
    }

    #[test]
    fn test_negative_calories_rejected_with_row() -> Result<()> {
        let file = write_csv(&["date,name,calories,protein", "2024-03-01,oats,-300,10"])?;
        let err = load_food_log(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid record at row 0"));
        Ok(())
    }

    #[test]
    fn test_bad_date_rejected() -> Result<()> {
        let file = write_csv(&["date,name,calories,protein", "03/01/2024,oats,300,10"])?;
        let err = load_food_log(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid date '03/01/2024' at row 0"));
        Ok(())
    }

    #[test]
    fn test_empty_log_is_ok() -> Result<()> {
        let file = write_csv(&["date,name,calories,protein"])?;
        assert!(load_food_log(file.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_file_not_found() {
        let result = load_food_log(Path::new("this_file_does_not_exist.csv"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Food log CSV file not found"));
    }
}
