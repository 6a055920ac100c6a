// ==========================================
// 物料关键性评估系统 - 报表领域模型
// ==========================================
// 职责: 输出行 (固定列集) + 运行汇总
// ==========================================

use crate::domain::material::MaterialRow;
use crate::domain::types::{AbcClass, ReplenishmentAction, XyzClass};
use serde::{Deserialize, Serialize};

// ==========================================
// ReportRow - 输出行
// ==========================================
// 字段顺序即输出列顺序，不可调整
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub material_id: String,
    pub category: String,
    pub supplier: String,
    pub eng_crit: f64,
    pub lead_time_days: f64,
    pub unit_cost: f64,
    pub stock_qty: f64,
    pub daily_consumption: f64,
    pub coverage_days: f64,
    pub annual_value: f64,
    pub score: f64,
    pub risk_flag: u8,
    pub risk_score: f64,
    pub abc_class: AbcClass,
    pub xyz_class: XyzClass,
    pub suggest_qty: f64,
}

impl ReportRow {
    /// 输出列名（与字段顺序一致）
    pub const COLUMNS: [&'static str; 16] = [
        "material_id",
        "category",
        "supplier",
        "eng_crit",
        "lead_time_days",
        "unit_cost",
        "stock_qty",
        "daily_consumption",
        "coverage_days",
        "annual_value",
        "score",
        "risk_flag",
        "risk_score",
        "abc_class",
        "xyz_class",
        "suggest_qty",
    ];
}

impl From<&MaterialRow> for ReportRow {
    fn from(row: &MaterialRow) -> Self {
        let r = &row.record;
        Self {
            material_id: r.material_id.clone(),
            category: r.category.clone(),
            supplier: r.supplier.clone(),
            eng_crit: r.eng_crit,
            lead_time_days: r.lead_time_days,
            unit_cost: r.unit_cost,
            stock_qty: r.stock_qty,
            daily_consumption: r.daily_consumption,
            coverage_days: row.coverage_days,
            annual_value: row.annual_value,
            score: row.score,
            risk_flag: row.risk_flag,
            risk_score: row.risk_score,
            abc_class: row.abc_class,
            xyz_class: row.xyz_class,
            suggest_qty: row.suggest_qty,
        }
    }
}

// ==========================================
// 运行汇总
// ==========================================

/// ABC×XYZ 矩阵单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub abc_class: AbcClass,
    pub xyz_class: XyzClass,
    pub count: usize,
    pub annual_value: f64,
}

/// 帕累托条目（按年度价值降序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoEntry {
    pub material_id: String,
    pub annual_value: f64,
    pub cumulative_pct: f64, // 0~100
}

/// 风险清单条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEntry {
    pub material_id: String,
    pub eng_crit: f64,
    pub lead_time_days: f64,
    pub coverage_days: f64,
    pub score: f64,
    pub risk_score: f64,
    pub suggest_qty: f64,
    pub action: ReplenishmentAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub row_count: usize,
    pub at_risk_count: usize,
    pub total_annual_value: f64,
    pub total_suggest_qty: f64,
    pub matrix: Vec<MatrixCell>,
    pub pareto: Vec<ParetoEntry>,
    pub top_risks: Vec<RiskEntry>,
}
