// ==========================================
// 物料关键性评估系统 - 领域层
// ==========================================
// 职责: 实体与类型定义，不含业务规则
// ==========================================

pub mod material;
pub mod report;
pub mod types;

// 重导出核心类型
pub use material::{Cell, DqReport, DqViolation, MaterialRecord, MaterialRow, RawTable};
pub use report::{MatrixCell, ParetoEntry, ReportRow, ReportSummary, RiskEntry};
pub use types::{AbcClass, CanonicalField, DqLevel, ReplenishmentAction, XyzClass};
