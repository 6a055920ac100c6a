// ==========================================
// 物料关键性评估系统 - 引擎错误类型
// ==========================================
// 致命错误: 表结构错误 / 空数据集 / 输出失败 / 配置错误
// 单元格级与列级数值异常均在本地回填，不进入此处
// ==========================================

use crate::config::ConfigError;
use crate::importer::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("数据集为空: 无法进行归一化与 ABC/XYZ 分类")]
    EmptyDataset,

    #[error("报表写入失败 ({path}): {message}")]
    ReportWriteError { path: String, message: String },

    #[error("CSV 序列化失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// 是否为表结构错误（SchemaError）
    pub fn is_schema_error(&self) -> bool {
        matches!(self, EngineError::Import(e) if e.is_schema_error())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
