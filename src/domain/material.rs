// ==========================================
// 物料关键性评估系统 - 物料领域模型
// ==========================================
// 职责: 原始表 / 标准化物料记录 / 评估结果行 / DQ 报告
// 流向: RawTable → MaterialRecord → MaterialRow
// ==========================================

use crate::domain::types::{AbcClass, DqLevel, XyzClass};
use serde::{Deserialize, Serialize};

// ==========================================
// Cell - 原始单元格
// ==========================================
// CSV 只会产生 Text / Empty；Excel 数值单元格为 Number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// 以文本形式取值（Empty → None）
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Number(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
            Cell::Empty => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

// ==========================================
// RawTable - 原始表
// ==========================================
// 列名保持原样（可重复、可为任意语言）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 取第 col 列的所有单元格（行长度不足按 Empty 处理）
    pub fn column(&self, col: usize) -> Vec<Cell> {
        self.rows
            .iter()
            .map(|row| row.get(col).cloned().unwrap_or(Cell::Empty))
            .collect()
    }
}

// ==========================================
// MaterialRecord - 标准化物料记录
// ==========================================
// 导入层输出: 数值已清洗为有限 f64，可选字段已补默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub material_id: String,
    pub category: String,
    pub supplier: String,
    pub eng_crit: f64,
    pub lead_time_days: f64,
    pub unit_cost: f64,
    pub stock_qty: f64,
    pub daily_consumption: f64,
    pub demand_std: f64,

    // ===== 元信息 =====
    pub row_number: usize, // 数据行号（从 1 开始，不含表头）
}

// ==========================================
// MaterialRow - 评估结果行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    pub record: MaterialRecord,

    // ===== 覆盖与价值 =====
    pub coverage_days: f64,
    pub annual_value: f64,

    // ===== 归一化子分 [0,1] =====
    pub eng_crit_norm: f64,
    pub lead_time_norm: f64,
    pub unit_cost_norm: f64,
    pub coverage_norm: f64,

    // ===== 综合评分 =====
    pub score: f64,
    pub risk_flag: u8, // 1 = 覆盖天数 < 提前期
    pub risk_score: f64,

    // ===== 分类 =====
    pub abc_class: AbcClass,
    pub xyz_class: XyzClass,
    pub cv: f64,

    // ===== 补货 =====
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub suggest_qty: f64,
}

impl MaterialRow {
    pub fn material_id(&self) -> &str {
        &self.record.material_id
    }

    pub fn is_at_risk(&self) -> bool {
        self.risk_flag == 1
    }
}

// ==========================================
// DQ 报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: Option<usize>, // None = 列级问题
    pub material_id: Option<String>,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqReport {
    pub violations: Vec<DqViolation>,
}

impl DqReport {
    pub fn warning_count(&self) -> usize {
        self.count(DqLevel::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(DqLevel::Info)
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// 按字段筛选
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a DqViolation> + 'a {
        self.violations.iter().filter(move |v| v.field == field)
    }

    fn count(&self, level: DqLevel) -> usize {
        self.violations.iter().filter(|v| v.level == level).count()
    }
}
