// ==========================================
// 物料关键性评估系统 - 引擎编排器
// ==========================================
// 用途: 串联导入 → 指标 → 分类 → 输出
// 流程:
//   1. 导入（列映射 / 数值清洗 / DQ）
//   2. 指标计算
//   3. ABC / XYZ 分类
//   4. 排序 + 报表 + 汇总
// ==========================================

use crate::config::EngineConfig;
use crate::domain::material::{DqReport, DqViolation, MaterialRecord, MaterialRow, RawTable};
use crate::domain::report::{ReportRow, ReportSummary};
use crate::domain::types::{AbcClass, DqLevel, XyzClass};
use crate::engine::classification::{AbcClassifier, XyzClassifier};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::metrics::{saturate, MaterialMetrics, MetricEngine};
use crate::engine::reporter::Reporter;
use crate::importer::{ColumnMapping, ImportOutcome, MaterialImporter};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

// ==========================================
// CriticalityReport - 单次运行结果
// ==========================================
#[derive(Debug, Clone)]
pub struct CriticalityReport {
    /// 完整行（已按输出顺序排序）
    pub rows: Vec<MaterialRow>,
    /// 输出列
    pub report_rows: Vec<ReportRow>,
    pub summary: ReportSummary,
    pub dq_report: DqReport,
    pub mapping: ColumnMapping,
}

impl CriticalityReport {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn find(&self, material_id: &str) -> Option<&MaterialRow> {
        self.rows.iter().find(|r| r.material_id() == material_id)
    }
}

// ==========================================
// CriticalityPipeline - 引擎编排器
// ==========================================
pub struct CriticalityPipeline {
    config: EngineConfig,
    importer: MaterialImporter,
    metrics: MetricEngine,
    abc: AbcClassifier,
    xyz: XyzClassifier,
    reporter: Reporter,
}

impl CriticalityPipeline {
    /// 创建编排器（配置非法时返回 ConfigError）
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        Ok(Self {
            importer: MaterialImporter::new(config.clone()),
            metrics: MetricEngine::new(config.clone()),
            abc: AbcClassifier::new(config.abc_thresholds.clone()),
            xyz: XyzClassifier::new(config.xyz_quantiles.clone(), config.cv_epsilon),
            reporter: Reporter::new(config.summary_top_n),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// 从文件运行（不写出）
    #[instrument(skip(self, input), fields(input = %input.as_ref().display()))]
    pub fn run_file<P: AsRef<Path>>(&self, input: P) -> EngineResult<CriticalityReport> {
        let outcome = self.importer.import_file(input)?;
        self.run_outcome(outcome)
    }

    /// 从原始表运行
    #[instrument(skip(self, table), fields(rows = table.row_count()))]
    pub fn run_table(&self, table: &RawTable) -> EngineResult<CriticalityReport> {
        let outcome = self.importer.import_table(table)?;
        self.run_outcome(outcome)
    }

    /// 完整批处理: 读入 → 计算 → 写出 CSV
    pub fn run_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> EngineResult<CriticalityReport> {
        let report = self.run_file(input)?;
        self.reporter.write_csv_file(&report.report_rows, output)?;
        Ok(report)
    }

    /// 从已标准化的记录运行
    pub fn run_records(&self, records: Vec<MaterialRecord>) -> EngineResult<Vec<MaterialRow>> {
        self.evaluate(records).map(|(rows, _)| rows)
    }

    /// 计算 + 分类 + 排序，同时返回数值溢出告警
    fn evaluate(
        &self,
        records: Vec<MaterialRecord>,
    ) -> EngineResult<(Vec<MaterialRow>, Vec<DqViolation>)> {
        // ==========================================
        // 步骤0: 空数据集拒绝
        // ==========================================
        if records.is_empty() {
            return Err(EngineError::EmptyDataset);
        }

        // ==========================================
        // 步骤1: 指标计算
        // ==========================================
        debug!("步骤1: 指标计算");
        let metrics = self.metrics.compute(&records);

        let mut overflow: Vec<DqViolation> = records
            .iter()
            .zip(&metrics)
            .flat_map(|(r, m)| m.saturated.iter().map(move |field| overflow_violation(r, field)))
            .collect();

        // ==========================================
        // 步骤2: ABC 分类
        // ==========================================
        debug!("步骤2: ABC 分类");
        let annual: Vec<f64> = metrics.iter().map(|m| m.annual_value).collect();
        let abc = self.abc.classify(&annual);

        // ==========================================
        // 步骤3: XYZ 分类
        // ==========================================
        debug!("步骤3: XYZ 分类");
        let cvs: Vec<f64> = records
            .iter()
            .map(|r| {
                let raw = self
                    .xyz
                    .raw_coefficient_of_variation(r.demand_std, r.daily_consumption);
                if !raw.is_finite() {
                    overflow.push(overflow_violation(r, "cv"));
                }
                saturate(raw)
            })
            .collect();
        let xyz = self.xyz.classify(&cvs);

        // ==========================================
        // 步骤4: 组装 + 排序
        // ==========================================
        let mut rows: Vec<MaterialRow> = records
            .into_iter()
            .zip(metrics)
            .enumerate()
            .map(|(i, (record, m))| assemble(record, m, abc[i], xyz[i], cvs[i]))
            .collect();
        self.reporter.sort_rows(&mut rows);

        for v in &overflow {
            warn!(row = ?v.row_number, field = %v.field, "DQ: {}", v.message);
        }

        Ok((rows, overflow))
    }

    fn run_outcome(&self, outcome: ImportOutcome) -> EngineResult<CriticalityReport> {
        let ImportOutcome {
            records,
            mapping,
            mut dq_report,
        } = outcome;

        let (rows, overflow) = self.evaluate(records)?;
        dq_report.violations.extend(overflow);

        if dq_report.warning_count() > 0 {
            warn!(warnings = dq_report.warning_count(), "数据质量存在告警");
        }

        let report_rows = self.reporter.report_rows(&rows);
        let summary = self.reporter.summarize(&rows);

        info!(
            rows = summary.row_count,
            at_risk = summary.at_risk_count,
            total_annual_value = summary.total_annual_value,
            "评估完成"
        );

        Ok(CriticalityReport {
            rows,
            report_rows,
            summary,
            dq_report,
            mapping,
        })
    }
}

/// 数值溢出告警（已饱和到 ±f64::MAX）
fn overflow_violation(record: &MaterialRecord, field: &str) -> DqViolation {
    DqViolation {
        row_number: Some(record.row_number),
        material_id: Some(record.material_id.clone()),
        level: DqLevel::Warning,
        field: field.to_string(),
        message: "计算结果溢出，已饱和为最大有限值".to_string(),
    }
}

fn assemble(
    record: MaterialRecord,
    m: MaterialMetrics,
    abc_class: AbcClass,
    xyz_class: XyzClass,
    cv: f64,
) -> MaterialRow {
    MaterialRow {
        record,
        coverage_days: m.coverage_days,
        annual_value: m.annual_value,
        eng_crit_norm: m.eng_crit_norm,
        lead_time_norm: m.lead_time_norm,
        unit_cost_norm: m.unit_cost_norm,
        coverage_norm: m.coverage_norm,
        score: m.score,
        risk_flag: m.risk_flag,
        risk_score: m.risk_score,
        abc_class,
        xyz_class,
        cv,
        safety_stock: m.safety_stock,
        reorder_point: m.reorder_point,
        suggest_qty: m.suggest_qty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::material::Cell;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::from(*c)).collect())
                .collect(),
        )
    }

    fn pipeline() -> CriticalityPipeline {
        CriticalityPipeline::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_run_table_three_rows() {
        let t = table(
            &["Codigo", "CritEng", "PrazoEntrega", "Custo", "Estoque", "ConsumoDiario"],
            &[
                &["M1", "5", "30", "100", "50", "2"],
                &["M2", "1", "10", "20", "500", "10"],
                &["M3", "3", "20", "50", "0", "0"],
            ],
        );

        let report = pipeline().run_table(&t).unwrap();

        assert_eq!(report.row_count(), 3);
        assert_eq!(report.find("M1").unwrap().coverage_days, 25.0);
        assert_eq!(report.find("M2").unwrap().coverage_days, 50.0);
        assert_eq!(report.find("M3").unwrap().coverage_days, 180.0);

        // 唯一风险物料排在首位
        assert_eq!(report.rows[0].material_id(), "M1");
        assert_eq!(report.report_rows[0].material_id, "M1");
        assert_eq!(report.rows[0].record.category, "N/A");
    }

    #[test]
    fn test_infinite_cell_does_not_shift_decimals() {
        let t = table(
            &["Codigo", "CritEng", "PrazoEntrega", "Custo", "Estoque", "ConsumoDiario"],
            &[
                &["M1", "5", "30", "2.5", "50", "2"],
                &["M2", "1", "10", "inf", "500", "10"],
            ],
        );

        let report = pipeline().run_table(&t).unwrap();

        assert_eq!(report.find("M1").unwrap().record.unit_cost, 2.5);
        assert_eq!(report.find("M2").unwrap().record.unit_cost, 0.0);
        assert_eq!(report.dq_report.for_field("unit_cost").count(), 1);
    }

    #[test]
    fn test_overflowing_values_stay_finite() {
        let t = table(
            &["Codigo", "CritEng", "PrazoEntrega", "Custo", "Estoque", "ConsumoDiario"],
            &[
                &["M1", "5", "30", "1e200", "50", "1e200"],
                &["M2", "1", "10", "20", "500", "1"],
                &["M3", "2", "10", "1e200", "500", "1e199"],
            ],
        );

        let report = pipeline().run_table(&t).unwrap();

        for r in &report.rows {
            for v in [r.annual_value, r.score, r.cv, r.reorder_point, r.suggest_qty] {
                assert!(v.is_finite());
            }
        }
        assert_eq!(report.find("M1").unwrap().annual_value, f64::MAX);
        assert!(report.summary.total_annual_value.is_finite());
        assert!(report.rows.iter().any(|r| r.abc_class == AbcClass::A));
        assert!(report
            .dq_report
            .for_field("annual_value")
            .any(|v| v.material_id.as_deref() == Some("M1")));
    }

    #[test]
    fn test_run_records_empty_dataset() {
        let err = pipeline().run_records(Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset));
    }

    #[test]
    fn test_header_only_table_is_empty_dataset() {
        let t = table(
            &["Codigo", "CritEng", "PrazoEntrega", "Custo", "Estoque", "ConsumoDiario"],
            &[],
        );
        let err = pipeline().run_table(&t).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let t = table(&["Codigo", "CritEng", "Custo"], &[&["M1", "5", "100"]]);
        let err = pipeline().run_table(&t).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.coverage_clip = -1.0;
        assert!(matches!(
            CriticalityPipeline::new(config),
            Err(EngineError::Config(_))
        ));
    }
}
