use crate::models::ResultTable;
use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Export a result table to a file
pub fn export_results(table: &ResultTable, format: ExportFormat, path: &Path) -> Result<String> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        ExportFormat::Csv => export_to_csv(table, path),
        ExportFormat::Json => export_to_json(table, path),
    }
}

fn export_to_csv(table: &ResultTable, path: &Path) -> Result<String> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(path.to_string_lossy().to_string())
}

fn export_to_json(table: &ResultTable, path: &Path) -> Result<String> {
    let mut file = File::create(path)?;

    let mut output = Vec::new();
    for row in &table.rows {
        let mut map = serde_json::Map::new();
        for (col, value) in table.columns.iter().zip(row) {
            map.insert(col.clone(), serde_json::Value::String(value.clone()));
        }
        output.push(serde_json::Value::Object(map));
    }

    let json = serde_json::to_string_pretty(&output)?;
    file.write_all(json.as_bytes())?;

    Ok(path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResultTable {
        ResultTable {
            columns: vec!["Role Name".to_string(), "Source".to_string()],
            rows: vec![vec!["Sales, EMEA".to_string(), "Direct & Team".to_string()]],
            sources: Vec::new(),
        }
    }

    fn temp_file(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("rolelens-export-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_csv_quotes_fields_with_commas() {
        let path = temp_file("roles.csv");
        export_results(&table(), ExportFormat::Csv, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Role Name,Source\n\"Sales, EMEA\",Direct & Team\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_csv_quotes_fields_with_line_breaks() {
        let table = ResultTable {
            columns: vec!["Full Name".to_string(), "Team Name".to_string()],
            rows: vec![
                vec!["Jane\rDoe".to_string(), "EMEA".to_string()],
                vec!["John \"JD\" Doe".to_string(), "Sales\nNorth".to_string()],
            ],
            sources: Vec::new(),
        };
        let path = temp_file("line-breaks.csv");
        export_results(&table, ExportFormat::Csv, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Full Name,Team Name\n\"Jane\rDoe\",EMEA\n\"John \"\"JD\"\" Doe\",\"Sales\nNorth\"\n"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_export_uses_column_names() {
        let path = temp_file("roles.json");
        export_results(&table(), ExportFormat::Json, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json[0]["Role Name"], "Sales, EMEA");
        assert_eq!(json[0]["Source"], "Direct & Team");
        let _ = std::fs::remove_file(&path);
    }
}
