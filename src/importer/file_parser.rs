// ==========================================
// 检验报告(CoA)系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 按位置的行（无表头映射），单元格已清洗
// 红线: 不跳过任何行，表头/空行由加载器按行号处理
// ==========================================

use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// 行解析器接口
pub trait RowParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<Vec<String>>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl RowParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<Vec<String>>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 检验导出行长度不一致
            .from_reader(file);

        let cleaner = DataCleaner;
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(cleaner.clean_row(record.iter()));
        }
        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn cell_text(cleaner: &DataCleaner, cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => cleaner.clean_cell(s),
            Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
                Some(date) => cleaner.export_date_text(date),
                None => cleaner.clean_cell(&cell.to_string()),
            },
            other => cleaner.clean_cell(&other.to_string()),
        }
    }
}

impl RowParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<Vec<String>>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::EmptyWorkbook(file_path.display().to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let cleaner = DataCleaner;
        Ok(range
            .rows()
            .map(|row| row.iter().map(|cell| Self::cell_text(&cleaner, cell)).collect())
            .collect())
    }
}

// ==========================================
// 通用行解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalRowParser;

impl RowParser for UniversalRowParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<Vec<String>>> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_rows(file_path),
            "xlsx" | "xls" => ExcelParser.parse_rows(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_positional_rows() {
        let temp_file = csv_file(&[
            "Product,Name,Days,Recipe",
            " AB123 ,Ranch Dressing,180,R-77",
            "CD456,Caesar,90",
        ]);

        let rows = CsvParser.parse_rows(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["AB123", "Ranch Dressing", "180", "R-77"]);
        // 行长度不一致也保留
        assert_eq!(rows[2].len(), 3);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_keeps_blank_rows_for_numbering() {
        let temp_file = csv_file(&["a,b", ",", "c,d"]);
        let rows = CsvParser.parse_rows(temp_file.path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["", ""]);
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalRowParser.parse_rows(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }
}
