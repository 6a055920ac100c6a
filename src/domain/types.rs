// ==========================================
// 物料关键性评估系统 - 领域类型定义
// ==========================================
// 职责: 标准字段 / ABC 等级 / XYZ 等级 / DQ 级别 / 建议动作
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 所有外部列名最终映射到这 9 个字段之一（或不映射）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    MaterialId,       // 物料编码
    EngCrit,          // 工程关键性
    LeadTimeDays,     // 采购提前期（天）
    UnitCost,         // 单价
    StockQty,         // 库存数量
    DailyConsumption, // 日消耗量
    Category,         // 类别（可选）
    Supplier,         // 供应商（可选）
    DemandStd,        // 需求标准差（可选）
}

impl CanonicalField {
    /// 必填字段（缺一即 SchemaError）
    pub const REQUIRED: [CanonicalField; 6] = [
        CanonicalField::MaterialId,
        CanonicalField::EngCrit,
        CanonicalField::LeadTimeDays,
        CanonicalField::UnitCost,
        CanonicalField::StockQty,
        CanonicalField::DailyConsumption,
    ];

    /// 可选字段
    pub const OPTIONAL: [CanonicalField; 3] = [
        CanonicalField::Category,
        CanonicalField::Supplier,
        CanonicalField::DemandStd,
    ];

    /// 必填数值字段（解析失败补 0.0）
    pub const REQUIRED_NUMERIC: [CanonicalField; 5] = [
        CanonicalField::EngCrit,
        CanonicalField::LeadTimeDays,
        CanonicalField::UnitCost,
        CanonicalField::StockQty,
        CanonicalField::DailyConsumption,
    ];

    /// 标准列名
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::MaterialId => "material_id",
            CanonicalField::EngCrit => "eng_crit",
            CanonicalField::LeadTimeDays => "lead_time_days",
            CanonicalField::UnitCost => "unit_cost",
            CanonicalField::StockQty => "stock_qty",
            CanonicalField::DailyConsumption => "daily_consumption",
            CanonicalField::Category => "category",
            CanonicalField::Supplier => "supplier",
            CanonicalField::DemandStd => "demand_std",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// ABC 等级 (按年度价值累计占比)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbcClass {
    A, // 累计 ≤ 80%
    B, // 80% ~ 95%
    C, // > 95%
}

impl AbcClass {
    pub const ALL: [AbcClass; 3] = [AbcClass::A, AbcClass::B, AbcClass::C];
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbcClass::A => write!(f, "A"),
            AbcClass::B => write!(f, "B"),
            AbcClass::C => write!(f, "C"),
        }
    }
}

// ==========================================
// XYZ 等级 (按需求变异系数)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum XyzClass {
    X, // 需求稳定
    Y, // 中等波动
    Z, // 高波动
}

impl XyzClass {
    pub const ALL: [XyzClass; 3] = [XyzClass::X, XyzClass::Y, XyzClass::Z];
}

impl fmt::Display for XyzClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XyzClass::X => write!(f, "X"),
            XyzClass::Y => write!(f, "Y"),
            XyzClass::Z => write!(f, "Z"),
        }
    }
}

// ==========================================
// DQ 级别
// ==========================================
// 说明: 数据质量问题均不阻断流程，只进入报告
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Info,    // 提示
    Warning, // 警告（可能的导入缺陷）
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Info => write!(f, "INFO"),
            DqLevel::Warning => write!(f, "WARNING"),
        }
    }
}

// ==========================================
// 建议动作 (Replenishment Action)
// ==========================================
// 判定顺序: 立即补货 → 降低库存 → 复核提前期 → 持续监控
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplenishmentAction {
    ReplenishNow,   // 有风险且建议量 > 0
    ReduceStock,    // 无风险且覆盖天数 > 2 倍提前期
    ReviewLeadTime, // 提前期 ≥ 60 天
    Monitor,        // 其他
}

impl fmt::Display for ReplenishmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplenishmentAction::ReplenishNow => write!(f, "REPLENISH_NOW"),
            ReplenishmentAction::ReduceStock => write!(f, "REDUCE_STOCK"),
            ReplenishmentAction::ReviewLeadTime => write!(f, "REVIEW_LEAD_TIME"),
            ReplenishmentAction::Monitor => write!(f, "MONITOR"),
        }
    }
}
