// ==========================================
// 物料关键性评估系统 - 数据质量校验器
// ==========================================
// 职责: 非阻断式 DQ 报告
//   - 列级: 解析失败计数 / 整列为 0（疑似整列无法解析）
//   - 行级: 物料编码为空或重复 / 库存、消耗为负
// 红线: 只报告，不修改数据，不中断流程
// ==========================================

use crate::domain::material::{DqReport, DqViolation, MaterialRecord};
use crate::domain::types::{CanonicalField, DqLevel};
use std::collections::HashSet;
use tracing::{info, warn};

/// 单列解析失败统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionStat {
    pub field: CanonicalField,
    pub failures: usize,
}

pub struct DqValidator;

impl DqValidator {
    /// 生成 DQ 报告
    pub fn validate(&self, records: &[MaterialRecord], stats: &[CoercionStat]) -> DqReport {
        let mut violations = Vec::new();

        violations.extend(self.validate_coercion(stats));
        violations.extend(self.validate_all_zero_columns(records));
        violations.extend(self.validate_primary_key(records));
        for record in records {
            violations.extend(self.validate_ranges(record));
        }

        for v in &violations {
            match v.level {
                DqLevel::Warning => warn!(
                    row = ?v.row_number,
                    material_id = ?v.material_id,
                    field = %v.field,
                    "DQ: {}",
                    v.message
                ),
                DqLevel::Info => info!(
                    row = ?v.row_number,
                    material_id = ?v.material_id,
                    field = %v.field,
                    "DQ: {}",
                    v.message
                ),
            }
        }

        DqReport { violations }
    }

    /// 解析失败计数（列级）
    fn validate_coercion(&self, stats: &[CoercionStat]) -> Vec<DqViolation> {
        stats
            .iter()
            .filter(|s| s.failures > 0)
            .map(|s| DqViolation {
                row_number: None,
                material_id: None,
                level: DqLevel::Warning,
                field: s.field.as_str().to_string(),
                message: format!("{} 个单元格无法解析为数值，已按默认值回填", s.failures),
            })
            .collect()
    }

    /// 必填数值列整列为 0
    fn validate_all_zero_columns(&self, records: &[MaterialRecord]) -> Vec<DqViolation> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for field in CanonicalField::REQUIRED_NUMERIC {
            let all_zero = records.iter().all(|r| numeric_value(r, field) == 0.0);
            if all_zero {
                violations.push(DqViolation {
                    row_number: None,
                    material_id: None,
                    level: DqLevel::Warning,
                    field: field.as_str().to_string(),
                    message: "整列为 0，可能整列无法解析".to_string(),
                });
            }
        }
        violations
    }

    /// 物料编码为空 / 重复
    fn validate_primary_key(&self, records: &[MaterialRecord]) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let mut seen_ids = HashSet::new();

        for record in records {
            if record.material_id.is_empty() {
                violations.push(DqViolation {
                    row_number: Some(record.row_number),
                    material_id: None,
                    level: DqLevel::Warning,
                    field: "material_id".to_string(),
                    message: "物料编码为空".to_string(),
                });
                continue;
            }

            if !seen_ids.insert(record.material_id.as_str()) {
                violations.push(DqViolation {
                    row_number: Some(record.row_number),
                    material_id: Some(record.material_id.clone()),
                    level: DqLevel::Warning,
                    field: "material_id".to_string(),
                    message: "物料编码重复".to_string(),
                });
            }
        }

        violations
    }

    /// 负数库存 / 负数消耗
    fn validate_ranges(&self, record: &MaterialRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        for (field, value) in [
            (CanonicalField::StockQty, record.stock_qty),
            (CanonicalField::DailyConsumption, record.daily_consumption),
        ] {
            if value < 0.0 {
                violations.push(DqViolation {
                    row_number: Some(record.row_number),
                    material_id: Some(record.material_id.clone()),
                    level: DqLevel::Info,
                    field: field.as_str().to_string(),
                    message: format!("数值为负: {}", value),
                });
            }
        }

        violations
    }
}

fn numeric_value(record: &MaterialRecord, field: CanonicalField) -> f64 {
    match field {
        CanonicalField::EngCrit => record.eng_crit,
        CanonicalField::LeadTimeDays => record.lead_time_days,
        CanonicalField::UnitCost => record.unit_cost,
        CanonicalField::StockQty => record.stock_qty,
        CanonicalField::DailyConsumption => record.daily_consumption,
        CanonicalField::DemandStd => record.demand_std,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, row: usize, stock: f64, daily: f64) -> MaterialRecord {
        MaterialRecord {
            material_id: id.to_string(),
            category: "N/A".to_string(),
            supplier: "N/A".to_string(),
            eng_crit: 3.0,
            lead_time_days: 10.0,
            unit_cost: 5.0,
            stock_qty: stock,
            daily_consumption: daily,
            demand_std: 0.5,
            row_number: row,
        }
    }

    #[test]
    fn test_clean_dataset() {
        let validator = DqValidator;
        let report = validator.validate(&[record("M1", 1, 10.0, 1.0)], &[]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_duplicate_and_empty_ids() {
        let validator = DqValidator;
        let records = vec![
            record("M1", 1, 10.0, 1.0),
            record("M1", 2, 10.0, 1.0),
            record("", 3, 10.0, 1.0),
        ];
        let report = validator.validate(&records, &[]);

        let id_issues: Vec<_> = report.for_field("material_id").collect();
        assert_eq!(id_issues.len(), 2);
        assert_eq!(id_issues[0].row_number, Some(2));
        assert_eq!(id_issues[1].row_number, Some(3));
    }

    #[test]
    fn test_all_zero_column_warning() {
        let validator = DqValidator;
        let records = vec![record("M1", 1, 10.0, 0.0), record("M2", 2, 5.0, 0.0)];
        let report = validator.validate(&records, &[]);

        let issues: Vec<_> = report.for_field("daily_consumption").collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, DqLevel::Warning);
        assert_eq!(issues[0].row_number, None);
    }

    #[test]
    fn test_coercion_failures_and_negative_values() {
        let validator = DqValidator;
        let records = vec![record("M1", 1, -4.0, 1.0)];
        let stats = vec![
            CoercionStat {
                field: CanonicalField::UnitCost,
                failures: 2,
            },
            CoercionStat {
                field: CanonicalField::EngCrit,
                failures: 0,
            },
        ];
        let report = validator.validate(&records, &stats);

        assert_eq!(report.for_field("unit_cost").count(), 1);
        assert_eq!(report.for_field("eng_crit").count(), 0);
        assert_eq!(report.info_count(), 1);
        assert_eq!(report.warning_count(), 1);
    }
}
