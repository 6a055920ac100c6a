// ==========================================
// 物料关键性评估系统 - 引擎层
// ==========================================
// 职责: 指标计算 / ABC-XYZ 分类 / 报表输出
// 红线: 引擎不做 I/O 解析，输入均为标准化记录
// ==========================================

pub mod classification;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod reporter;

// 重导出核心引擎
pub use classification::{quantile_sorted, AbcClassifier, XyzClassifier};
pub use error::{EngineError, EngineResult};
pub use metrics::{MaterialMetrics, MetricEngine};
pub use orchestrator::{CriticalityPipeline, CriticalityReport};
pub use reporter::Reporter;
