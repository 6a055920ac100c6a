// ==========================================
// 物料关键性评估系统 - ABC / XYZ 分类引擎
// ==========================================
// ABC: 按年度价值降序（稳定排序），累计占比分段
// XYZ: 按需求变异系数，经验分位点（线性插值）分段
// 两者均为全量批处理，依赖数据集级统计量
// ==========================================

use crate::config::{AbcThresholds, XyzQuantiles};
use crate::domain::types::{AbcClass, XyzClass};
use crate::engine::metrics::{accumulation_scale, saturate};
use std::cmp::Ordering;
use tracing::{debug, instrument};

// ==========================================
// AbcClassifier
// ==========================================
pub struct AbcClassifier {
    thresholds: AbcThresholds,
}

impl AbcClassifier {
    pub fn new(thresholds: AbcThresholds) -> Self {
        Self { thresholds }
    }

    /// 按累计占比判定
    pub fn class_for(&self, cum_share: f64) -> AbcClass {
        if cum_share <= self.thresholds.a_max {
            AbcClass::A
        } else if cum_share <= self.thresholds.b_max {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }

    /// 各行累计占比（按原始行顺序返回）
    ///
    /// 总价值 ≤ 0 时以 1.0 作分母；累加可能溢出时先按最大绝对值缩放
    pub fn cumulative_shares(&self, annual_values: &[f64]) -> Vec<f64> {
        let order = descending_order(annual_values);

        let scale = accumulation_scale(annual_values);
        let scaled: Vec<f64> = annual_values.iter().map(|v| v / scale).collect();

        let total: f64 = scaled.iter().sum();
        let divisor = if total > 0.0 { total } else { 1.0 };

        let mut shares = vec![0.0; scaled.len()];
        let mut running = 0.0;
        for idx in order {
            running += scaled[idx];
            shares[idx] = running / divisor;
        }
        shares
    }

    /// 批量分类（按原始行顺序返回）
    #[instrument(skip(self, annual_values), fields(count = annual_values.len()))]
    pub fn classify(&self, annual_values: &[f64]) -> Vec<AbcClass> {
        self.cumulative_shares(annual_values)
            .into_iter()
            .map(|cum| self.class_for(cum))
            .collect()
    }
}

/// 降序稳定排序的下标（值相同保持原始顺序）
fn descending_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(Ordering::Equal)
    });
    order
}

// ==========================================
// XyzClassifier
// ==========================================
pub struct XyzClassifier {
    quantiles: XyzQuantiles,
    epsilon: f64,
}

impl XyzClassifier {
    pub fn new(quantiles: XyzQuantiles, epsilon: f64) -> Self {
        Self { quantiles, epsilon }
    }

    /// 变异系数: σ / (|日消耗| + ε)，未饱和处理
    pub fn raw_coefficient_of_variation(&self, demand_std: f64, daily_consumption: f64) -> f64 {
        demand_std / (daily_consumption.abs() + self.epsilon)
    }

    /// 变异系数（溢出饱和到 f64::MAX）
    pub fn coefficient_of_variation(&self, demand_std: f64, daily_consumption: f64) -> f64 {
        saturate(self.raw_coefficient_of_variation(demand_std, daily_consumption))
    }

    /// X/Y 分界点
    pub fn boundaries(&self, cvs: &[f64]) -> (f64, f64) {
        let mut sorted = cvs.to_vec();
        sorted.sort_by(f64::total_cmp);
        (
            quantile_sorted(&sorted, self.quantiles.x_quantile),
            quantile_sorted(&sorted, self.quantiles.y_quantile),
        )
    }

    /// 批量分类（按原始行顺序返回）
    #[instrument(skip(self, cvs), fields(count = cvs.len()))]
    pub fn classify(&self, cvs: &[f64]) -> Vec<XyzClass> {
        if cvs.is_empty() {
            return Vec::new();
        }

        let (p_x, p_y) = self.boundaries(cvs);
        debug!(p_x, p_y, "XYZ 分位点");

        cvs.iter()
            .map(|&cv| match (cv.partial_cmp(&p_x), cv.partial_cmp(&p_y)) {
                (Some(Ordering::Less | Ordering::Equal), _) => XyzClass::X,
                (_, Some(Ordering::Less | Ordering::Equal)) => XyzClass::Y,
                _ => XyzClass::Z,
            })
            .collect()
    }
}

/// 线性插值分位数（输入需已升序）
///
/// pos = q × (n - 1)，在相邻次序统计量间线性插值
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> AbcClassifier {
        AbcClassifier::new(AbcThresholds::default())
    }

    fn xyz() -> XyzClassifier {
        XyzClassifier::new(XyzQuantiles::default(), 1e-9)
    }

    #[test]
    fn test_abc_thresholds() {
        // 70 / 20 / 6 / 4 → 累计 0.70 / 0.90 / 0.96 / 1.00
        let classes = abc().classify(&[20.0, 70.0, 4.0, 6.0]);
        assert_eq!(
            classes,
            vec![AbcClass::B, AbcClass::A, AbcClass::C, AbcClass::C]
        );
    }

    #[test]
    fn test_abc_boundary_inclusive() {
        let c = abc();
        assert_eq!(c.class_for(0.80), AbcClass::A);
        assert_eq!(c.class_for(0.95), AbcClass::B);
        assert_eq!(c.class_for(0.9500001), AbcClass::C);
    }

    #[test]
    fn test_abc_ties_keep_original_order() {
        // 两个相同价值: 先出现者累计占比更小
        let shares = abc().cumulative_shares(&[50.0, 50.0]);
        assert_eq!(shares, vec![0.5, 1.0]);
        let classes = abc().classify(&[50.0, 50.0]);
        assert_eq!(classes, vec![AbcClass::A, AbcClass::C]);
    }

    #[test]
    fn test_abc_zero_total() {
        // 总价值为 0: 分母取 1.0，累计占比均为 0 → 全部 A
        let classes = abc().classify(&[0.0, 0.0, 0.0]);
        assert!(classes.iter().all(|c| *c == AbcClass::A));
    }

    #[test]
    fn test_abc_huge_values_keep_a_class() {
        // 逐项累加会溢出: 缩放后占比仍有效
        let shares = abc().cumulative_shares(&[f64::MAX, 7300.0, f64::MAX / 2.0]);
        assert!(shares.iter().all(|s| s.is_finite()));

        let classes = abc().classify(&[f64::MAX, 7300.0]);
        assert_eq!(classes, vec![AbcClass::C, AbcClass::C]);
        let classes = abc().classify(&[f64::MAX, 7300.0, f64::MAX / 2.0, f64::MAX / 4.0]);
        assert_eq!(classes[0], AbcClass::A);
    }

    #[test]
    fn test_cv_overflow_saturates() {
        let cv = xyz().coefficient_of_variation(1e300, 0.0);
        assert_eq!(cv, f64::MAX);
        assert!(xyz().raw_coefficient_of_variation(1e300, 0.0).is_infinite());
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        // pos = 0.33 × 3 = 0.99 → 1 + 0.99
        assert!((quantile_sorted(&sorted, 0.33) - 1.99).abs() < 1e-12);
        // pos = 0.66 × 3 = 1.98 → 2 + 0.98
        assert!((quantile_sorted(&sorted, 0.66) - 2.98).abs() < 1e-12);
        assert_eq!(quantile_sorted(&[7.0], 0.5), 7.0);
    }

    #[test]
    fn test_xyz_terciles() {
        let cvs = [0.1, 0.5, 0.9, 0.2, 0.6, 1.2];
        let classes = xyz().classify(&cvs);
        // 升序: 0.1 0.2 0.5 0.6 0.9 1.2 → p33 = 0.395, p66 = 0.69
        assert_eq!(
            classes,
            vec![
                XyzClass::X,
                XyzClass::Y,
                XyzClass::Z,
                XyzClass::X,
                XyzClass::Y,
                XyzClass::Z,
            ]
        );
    }

    #[test]
    fn test_xyz_constant_cv_all_x() {
        let classes = xyz().classify(&[0.25, 0.25, 0.25]);
        assert!(classes.iter().all(|c| *c == XyzClass::X));
    }

    #[test]
    fn test_cv_zero_consumption_is_finite() {
        let cv = xyz().coefficient_of_variation(0.0, 0.0);
        assert_eq!(cv, 0.0);
        let cv = xyz().coefficient_of_variation(1.0, -4.0);
        assert!((cv - 0.25).abs() < 1e-9);
    }
}
