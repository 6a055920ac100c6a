// ==========================================
// 物料关键性评估系统 - 文件解析器实现
// ==========================================
// 支持: 分隔符文本 (.csv/.txt/.tsv，分隔符自动识别) / Excel (.xlsx/.xls/.ods)
// 输出: RawTable（列名原样保留）
// ==========================================

use crate::domain::material::{Cell, RawTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::material_importer_trait::FileParser;
use crate::importer::numeric_coercer::is_missing_token;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;
use tracing::debug;

/// 候选分隔符（顺序即同分时的优先级）
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// 分隔符识别采样行数
const SNIFF_LINES: usize = 10;

// ==========================================
// 分隔符识别
// ==========================================

/// 统计一行中引号外的分隔符数量
fn count_outside_quotes(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// 识别分隔符
///
/// 规则:
/// 1) 采样行内计数一致且 > 0 的候选中取计数最大者
/// 2) 无一致候选 → 取表头行计数最大者
/// 3) 均为 0 → ','
pub fn sniff_delimiter(sample: &str) -> u8 {
    let lines: Vec<&str> = sample
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let Some(header) = lines.first() else {
        return b',';
    };

    let mut best_consistent: Option<(u8, usize)> = None;
    for &candidate in &DELIMITER_CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|l| count_outside_quotes(l, candidate))
            .collect();
        let first = counts[0];
        if first > 0 && counts.iter().all(|&c| c == first) {
            match best_consistent {
                Some((_, best)) if best >= first => {}
                _ => best_consistent = Some((candidate, first)),
            }
        }
    }

    if let Some((delimiter, _)) = best_consistent {
        return delimiter;
    }

    let mut best_header: Option<(u8, usize)> = None;
    for &candidate in &DELIMITER_CANDIDATES {
        let count = count_outside_quotes(header, candidate);
        if count == 0 {
            continue;
        }
        match best_header {
            Some((_, best)) if best >= count => {}
            _ => best_header = Some((candidate, count)),
        }
    }

    best_header.map(|(d, _)| d).unwrap_or(b',')
}

/// 文本单元格 → Cell（缺失值文本 → Empty）
fn text_cell(value: &str) -> Cell {
    if is_missing_token(value) {
        Cell::Empty
    } else {
        Cell::Text(value.trim().to_string())
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    /// 指定分隔符（None = 自动识别）
    pub delimiter: Option<u8>,
}

impl CsvParser {
    pub fn new(delimiter: Option<u8>) -> Self {
        Self { delimiter }
    }

    /// 从内存文本解析
    pub fn parse_str(&self, content: &str) -> ImportResult<RawTable> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let delimiter = self.delimiter.unwrap_or_else(|| sniff_delimiter(content));
        let shown = (delimiter as char).escape_default().to_string();
        debug!(delimiter = %shown, "CSV 分隔符");

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(content.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;

            // 仅跳过空白行；全为缺失值或仅含分隔符的行保留
            if record.len() <= 1 && record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            let row: Vec<Cell> = record
                .iter()
                .take(headers.len())
                .map(text_cell)
                .collect();
            rows.push(row);
        }

        Ok(RawTable::new(headers, rows))
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let bytes = fs::read(file_path)?;
        let content = String::from_utf8_lossy(&bytes);
        self.parse_str(&content)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn data_cell(data: &Data) -> Cell {
        match data {
            Data::Int(v) => Cell::Number(*v as f64),
            Data::Float(v) => Cell::Number(*v),
            Data::String(s) => text_cell(s),
            Data::Empty | Data::Error(_) => Cell::Empty,
            other => text_cell(&other.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let Some(sheet_name) = sheet_names.first().cloned() else {
            return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows_iter = range.rows();
        let header_row = rows_iter
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无表头行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut rows = Vec::new();
        for data_row in rows_iter {
            // 仅跳过无任何内容的行；"NA" 等缺失值文本的行保留
            if data_row.iter().all(|d| matches!(d, Data::Empty)) {
                continue;
            }

            let row: Vec<Cell> = data_row
                .iter()
                .take(headers.len())
                .map(Self::data_cell)
                .collect();
            rows.push(row);
        }

        Ok(RawTable::new(headers, rows))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct UniversalFileParser {
    pub delimiter: Option<u8>,
}

impl UniversalFileParser {
    pub fn new(delimiter: Option<u8>) -> Self {
        Self { delimiter }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawTable> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" | "txt" | "tsv" => CsvParser::new(self.delimiter).parse_to_raw_table(path),
            "xlsx" | "xlsm" | "xls" | "ods" => ExcelParser.parse_to_raw_table(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_sniff_comma() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
    }

    #[test]
    fn test_sniff_semicolon_with_comma_decimals() {
        let sample = "Codigo;Custo;Estoque\nM1;1.234,56;10\nM2;12,5;3\n";
        assert_eq!(sniff_delimiter(sample), b';');
    }

    #[test]
    fn test_sniff_tab_and_pipe() {
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c\n1|2|3\n"), b'|');
    }

    #[test]
    fn test_sniff_ignores_quoted_delimiters() {
        let sample = "id,desc\n1,\"a;b;c\"\n2,\"d;e;f\"\n";
        assert_eq!(sniff_delimiter(sample), b',');
    }

    #[test]
    fn test_sniff_single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("id\n1\n2\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_parse_str_strips_bom_and_blank_rows() {
        let parser = CsvParser::default();
        let table = parser
            .parse_str("\u{feff}Codigo;Custo\nM1;12,5\n\n   \nM2;NA\n")
            .unwrap();

        assert_eq!(table.headers, vec!["Codigo".to_string(), "Custo".to_string()]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][1], Cell::from("12,5"));
        assert_eq!(table.rows[1][1], Cell::Empty);
    }

    #[test]
    fn test_parse_str_keeps_all_missing_rows() {
        let parser = CsvParser::new(Some(b';'));
        let table = parser
            .parse_str("Codigo;Custo;Estoque\nM1;1;2\nNA;NA;NA\n;;\nM2;3;4\n")
            .unwrap();

        assert_eq!(table.row_count(), 4);
        assert!(table.rows[1].iter().all(Cell::is_empty));
        assert!(table.rows[2].iter().all(Cell::is_empty));
        assert_eq!(table.rows[3][0], Cell::from("M2"));
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "material,custo").unwrap();
        writeln!(temp_file, "MAT001,2.5").unwrap();
        writeln!(temp_file, "MAT002,3.0").unwrap();

        let parser = UniversalFileParser::default();
        let table = parser.parse(temp_file.path()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][0], Cell::from("MAT001"));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let parser = CsvParser::default();
        let result = parser.parse_to_raw_table(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let parser = UniversalFileParser::default();
        let result = parser.parse("data.json");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
