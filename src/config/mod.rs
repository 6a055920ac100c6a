// ==========================================
// 物料关键性评估系统 - 配置层
// ==========================================
// 职责: 引擎常量与阈值，支持 JSON 文件覆写
// ==========================================

pub mod engine_config;
pub mod error;

// 重导出核心配置
pub use engine_config::{
    AbcThresholds, EngineConfig, ScoreWeights, XyzQuantiles, COVERAGE_CLIP, Z_SERVICE,
};
pub use error::{ConfigError, ConfigResult};
