// ==========================================
// 物料关键性评估系统 - 指标计算引擎
// ==========================================
// 职责: 覆盖天数 / 年度价值 / 归一化子分 / 综合评分 / 风险标记 / 补货量
// 输入: 标准化物料记录（数值已清洗）
// 输出: MaterialMetrics（不含分类）
// ==========================================

use crate::config::EngineConfig;
use crate::domain::material::MaterialRecord;
use tracing::{debug, instrument};

/// 年化天数
const DAYS_PER_YEAR: f64 = 365.0;

/// 归一化判定 max == min 的相对容差
const MINMAX_REL_TOL: f64 = 1e-9;

// ==========================================
// MaterialMetrics - 单物料派生指标
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMetrics {
    pub coverage_days: f64,
    pub annual_value: f64,
    pub eng_crit_norm: f64,
    pub lead_time_norm: f64,
    pub unit_cost_norm: f64,
    pub coverage_norm: f64,
    pub score: f64,
    pub risk_flag: u8,
    pub risk_score: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub suggest_qty: f64,
    /// 计算溢出后被饱和处理的字段
    pub saturated: Vec<&'static str>,
}

// ==========================================
// 纯函数
// ==========================================

/// 覆盖天数: 消耗 > 0 → clamp(库存/消耗, 0, clip)；否则 clip
pub fn coverage_days(stock_qty: f64, daily_consumption: f64, clip: f64) -> f64 {
    if daily_consumption > 0.0 {
        let cov = stock_qty / daily_consumption;
        if cov > 0.0 {
            cov.min(clip)
        } else {
            0.0
        }
    } else {
        clip
    }
}

/// 年度价值
pub fn annual_value(unit_cost: f64, daily_consumption: f64) -> f64 {
    unit_cost * DAYS_PER_YEAR * daily_consumption
}

/// Min-Max 归一化；max ≈ min 时整列为 0
pub fn min_max(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if values.is_empty() || is_close(min, max) {
        return vec![0.0; values.len()];
    }

    let span = max - min;
    if span.is_finite() {
        values.iter().map(|v| (v - min) / span).collect()
    } else {
        // 跨度溢出: 各项减半后再归一化
        let half_span = max / 2.0 - min / 2.0;
        values
            .iter()
            .map(|v| (v / 2.0 - min / 2.0) / half_span)
            .collect()
    }
}

/// 非有限值饱和到 ±f64::MAX（NaN → 0）
pub fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}

/// 累加缩放因子: 逐项累加可能溢出时取最大绝对值，否则为 1.0
pub fn accumulation_scale(values: &[f64]) -> f64 {
    let max_abs = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if max_abs > 0.0 && !(max_abs * values.len() as f64).is_finite() {
        max_abs
    } else {
        1.0
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= MINMAX_REL_TOL * a.abs().max(b.abs())
}

/// 安全库存: Z × σ × sqrt(max(LT, 1))
pub fn safety_stock(z_service: f64, demand_std: f64, lead_time_days: f64) -> f64 {
    z_service * demand_std * lead_time_days.max(1.0).sqrt()
}

/// 建议补货量: max(再订货点 - 库存, 0)，四舍六入五成双取整
pub fn suggest_qty(reorder_point: f64, stock_qty: f64) -> f64 {
    let raw = reorder_point - stock_qty;
    if raw > 0.0 {
        raw.round_ties_even()
    } else {
        0.0
    }
}

// ==========================================
// MetricEngine - 指标计算引擎
// ==========================================
pub struct MetricEngine {
    config: EngineConfig,
}

impl MetricEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// 批量计算（归一化依赖全数据集的 min/max）
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn compute(&self, records: &[MaterialRecord]) -> Vec<MaterialMetrics> {
        let clip = self.config.coverage_clip;
        let w = &self.config.score_weights;

        // 1. 覆盖天数 + 年度价值
        let coverage: Vec<f64> = records
            .iter()
            .map(|r| coverage_days(r.stock_qty, r.daily_consumption, clip))
            .collect();
        let annual_raw: Vec<f64> = records
            .iter()
            .map(|r| annual_value(r.unit_cost, r.daily_consumption))
            .collect();
        let annual: Vec<f64> = annual_raw.iter().copied().map(saturate).collect();

        // 2. 归一化子分
        let eng_norm = min_max(&records.iter().map(|r| r.eng_crit).collect::<Vec<_>>());
        let lt_norm = min_max(&records.iter().map(|r| r.lead_time_days).collect::<Vec<_>>());
        let cost_norm = min_max(&records.iter().map(|r| r.unit_cost).collect::<Vec<_>>());
        let cov_norm = min_max(&coverage);

        debug!(
            eng_degenerate = eng_norm.iter().all(|v| *v == 0.0),
            lead_time_degenerate = lt_norm.iter().all(|v| *v == 0.0),
            "归一化完成"
        );

        // 3. 逐行派生
        records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                // 浮点累加误差可能越过 1，收敛到 [0,1]
                let score = (w.eng_crit * eng_norm[i]
                    + w.lead_time * lt_norm[i]
                    + w.unit_cost * cost_norm[i]
                    + w.coverage * (1.0 - cov_norm[i]))
                    .clamp(0.0, 1.0);

                let risk_flag = u8::from(coverage[i] < r.lead_time_days);
                let risk_score = score * f64::from(risk_flag);

                let mut saturated = Vec::new();
                if !annual_raw[i].is_finite() {
                    saturated.push("annual_value");
                }
                let mut checked = |name: &'static str, value: f64| {
                    if !value.is_finite() {
                        saturated.push(name);
                    }
                    saturate(value)
                };

                let ss = checked(
                    "safety_stock",
                    safety_stock(self.config.z_service, r.demand_std, r.lead_time_days),
                );
                let reorder_point =
                    checked("reorder_point", r.daily_consumption * r.lead_time_days + ss);
                let suggest = checked("suggest_qty", suggest_qty(reorder_point, r.stock_qty));

                MaterialMetrics {
                    coverage_days: coverage[i],
                    annual_value: annual[i],
                    eng_crit_norm: eng_norm[i],
                    lead_time_norm: lt_norm[i],
                    unit_cost_norm: cost_norm[i],
                    coverage_norm: cov_norm[i],
                    score,
                    risk_flag,
                    risk_score,
                    safety_stock: ss,
                    reorder_point,
                    suggest_qty: suggest,
                    saturated,
                }
            })
            .collect()
    }
}
