// ==========================================
// 物料关键性评估系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单元格级解析失败不在此列（本地回填，进入 DQ 报告）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv/.txt/.tsv/.xlsx/.xls/.ods）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构错误 =====
    #[error(
        "缺少必填列: {missing:?}\n已识别列: {}",
        found.join(", ")
    )]
    MissingRequiredFields {
        missing: Vec<String>,
        found: Vec<String>,
    },
}

impl ImportError {
    /// 是否为表结构错误（SchemaError）
    pub fn is_schema_error(&self) -> bool {
        matches!(self, ImportError::MissingRequiredFields { .. })
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_message_lists_fields_and_headers() {
        let err = ImportError::MissingRequiredFields {
            missing: vec!["daily_consumption".to_string()],
            found: vec!["material_id".to_string(), "Obs".to_string()],
        };

        let msg = err.to_string();
        assert!(msg.contains("daily_consumption"));
        assert!(msg.contains("material_id, Obs"));
        assert!(err.is_schema_error());
    }
}
