// ==========================================
// 物料关键性评估系统 - 核心库
// ==========================================
// 输入: BOM / 库存台账（CSV 或 Excel，列名不固定）
// 输出: 关键性评分 + 风险标记 + ABC/XYZ 分类 + 建议补货量
// 系统定位: 批处理分析工具（单次运行，无状态）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 引擎常量与阈值
pub mod config;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 指标与分类
pub mod engine;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AbcClass, CanonicalField, DqLevel, ReplenishmentAction, XyzClass};

// 领域实体
pub use domain::{
    Cell, DqReport, DqViolation, MaterialRecord, MaterialRow, RawTable, ReportRow, ReportSummary,
};

// 配置
pub use config::{ConfigError, EngineConfig};

// 导入
pub use importer::{ImportError, MaterialImporter};

// 引擎
pub use engine::{
    AbcClassifier, CriticalityPipeline, CriticalityReport, EngineError, EngineResult,
    MetricEngine, Reporter, XyzClassifier,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "物料关键性评估系统";

// 默认输出路径
pub const DEFAULT_OUTPUT: &str = "data/processed/criticidade.csv";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
