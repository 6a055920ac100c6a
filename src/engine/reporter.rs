// ==========================================
// 物料关键性评估系统 - 报表输出
// ==========================================
// 职责: 固定列集输出 + 排序 + CSV 序列化 + 运行汇总
// 排序键: (risk_score, score, annual_value) 均降序，稳定排序
// ==========================================

use crate::domain::material::MaterialRow;
use crate::domain::report::{MatrixCell, ParetoEntry, ReportRow, ReportSummary, RiskEntry};
use crate::domain::types::{AbcClass, ReplenishmentAction, XyzClass};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::metrics::{accumulation_scale, saturate};
use csv::WriterBuilder;
use std::cmp::Ordering;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// 提前期复核阈值（天）
const REVIEW_LEAD_TIME_DAYS: f64 = 60.0;

// ==========================================
// Reporter
// ==========================================
pub struct Reporter {
    top_n: usize,
}

impl Reporter {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    // ==========================================
    // 排序与列选择
    // ==========================================

    /// 按输出顺序排序（稳定）
    pub fn sort_rows(&self, rows: &mut [MaterialRow]) {
        rows.sort_by(|a, b| compare_desc(a, b));
    }

    /// 选择输出列
    pub fn report_rows(&self, rows: &[MaterialRow]) -> Vec<ReportRow> {
        rows.iter().map(ReportRow::from).collect()
    }

    // ==========================================
    // 序列化
    // ==========================================

    /// 写出 CSV（表头为标准列名）
    pub fn write_csv<W: Write>(&self, rows: &[ReportRow], writer: W) -> EngineResult<()> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(ReportRow::COLUMNS)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// 序列化为字符串
    pub fn to_csv_string(&self, rows: &[ReportRow]) -> EngineResult<String> {
        let mut buf = Vec::new();
        self.write_csv(rows, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// 写出 CSV 文件（目录不存在则创建）
    pub fn write_csv_file<P: AsRef<Path>>(&self, rows: &[ReportRow], path: P) -> EngineResult<()> {
        let path = path.as_ref();
        let file = create_with_parent(path)?;
        self.write_csv(rows, file)?;
        info!(path = %path.display(), rows = rows.len(), "[ok] 报表已生成");
        Ok(())
    }

    /// 写出汇总 JSON
    pub fn write_summary_json<P: AsRef<Path>>(
        &self,
        summary: &ReportSummary,
        path: P,
    ) -> EngineResult<()> {
        let path = path.as_ref();
        let file = create_with_parent(path)?;
        serde_json::to_writer_pretty(file, summary)?;
        info!(path = %path.display(), "汇总已生成");
        Ok(())
    }

    // ==========================================
    // 汇总
    // ==========================================

    /// 建议动作（判定顺序即优先级）
    pub fn action_for(&self, row: &MaterialRow) -> ReplenishmentAction {
        let lead_time = row.record.lead_time_days;
        if row.is_at_risk() && row.suggest_qty > 0.0 {
            ReplenishmentAction::ReplenishNow
        } else if !row.is_at_risk() && row.coverage_days > lead_time * 2.0 {
            ReplenishmentAction::ReduceStock
        } else if lead_time >= REVIEW_LEAD_TIME_DAYS {
            ReplenishmentAction::ReviewLeadTime
        } else {
            ReplenishmentAction::Monitor
        }
    }

    /// 生成运行汇总（rows 需已按输出顺序排序）
    pub fn summarize(&self, rows: &[MaterialRow]) -> ReportSummary {
        let total_annual_value = saturate(rows.iter().map(|r| r.annual_value).sum());

        let mut matrix = Vec::with_capacity(9);
        for abc in AbcClass::ALL {
            for xyz in XyzClass::ALL {
                let cell_rows = rows
                    .iter()
                    .filter(|r| r.abc_class == abc && r.xyz_class == xyz);
                let (count, value) = cell_rows.fold((0, 0.0), |(n, v), r| (n + 1, v + r.annual_value));
                matrix.push(MatrixCell {
                    abc_class: abc,
                    xyz_class: xyz,
                    count,
                    annual_value: saturate(value),
                });
            }
        }

        ReportSummary {
            row_count: rows.len(),
            at_risk_count: rows.iter().filter(|r| r.is_at_risk()).count(),
            total_annual_value,
            total_suggest_qty: saturate(rows.iter().map(|r| r.suggest_qty).sum()),
            matrix,
            pareto: self.pareto(rows),
            top_risks: self.top_risks(rows),
        }
    }

    /// 帕累托: 年度价值前 N，累计占比以前 N 合计为分母
    fn pareto(&self, rows: &[MaterialRow]) -> Vec<ParetoEntry> {
        let mut by_value: Vec<&MaterialRow> = rows.iter().collect();
        by_value.sort_by(|a, b| {
            b.annual_value
                .partial_cmp(&a.annual_value)
                .unwrap_or(Ordering::Equal)
        });
        by_value.truncate(self.top_n);

        let values: Vec<f64> = by_value.iter().map(|r| r.annual_value).collect();
        let scale = accumulation_scale(&values);

        let top_total: f64 = values.iter().map(|v| v / scale).sum();
        let divisor = if top_total != 0.0 { top_total } else { 1.0 };

        let mut acc = 0.0;
        by_value
            .into_iter()
            .map(|r| {
                acc += r.annual_value / scale;
                ParetoEntry {
                    material_id: r.material_id().to_string(),
                    annual_value: r.annual_value,
                    cumulative_pct: acc / divisor * 100.0,
                }
            })
            .collect()
    }

    /// 风险清单: risk_score 前 N
    fn top_risks(&self, rows: &[MaterialRow]) -> Vec<RiskEntry> {
        let mut by_risk: Vec<&MaterialRow> = rows.iter().collect();
        by_risk.sort_by(|a, b| b.risk_score.partial_cmp(&a.risk_score).unwrap_or(Ordering::Equal));

        by_risk
            .into_iter()
            .take(self.top_n)
            .map(|r| RiskEntry {
                material_id: r.material_id().to_string(),
                eng_crit: r.record.eng_crit,
                lead_time_days: r.record.lead_time_days,
                coverage_days: r.coverage_days,
                score: r.score,
                risk_score: r.risk_score,
                suggest_qty: r.suggest_qty,
                action: self.action_for(r),
            })
            .collect()
    }
}

/// (risk_score, score, annual_value) 降序比较
fn compare_desc(a: &MaterialRow, b: &MaterialRow) -> Ordering {
    let desc = |x: f64, y: f64| y.partial_cmp(&x).unwrap_or(Ordering::Equal);

    desc(a.risk_score, b.risk_score)
        .then_with(|| desc(a.score, b.score))
        .then_with(|| desc(a.annual_value, b.annual_value))
}

fn create_with_parent(path: &Path) -> EngineResult<fs::File> {
    let write_err = |e: std::io::Error| EngineError::ReportWriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }
    fs::File::create(path).map_err(write_err)
}
