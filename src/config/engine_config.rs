// ==========================================
// 物料关键性评估系统 - 引擎配置
// ==========================================
// 职责: 常量默认值 + JSON 文件覆写 + 启动校验
// 红线: 配置只读，运行期不修改
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 覆盖天数上限（天）
pub const COVERAGE_CLIP: f64 = 180.0;

/// 服务水平 Z 值（单侧 ~95%）
pub const Z_SERVICE: f64 = 1.65;

// ==========================================
// ScoreWeights - 综合评分权重
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub eng_crit: f64,
    pub lead_time: f64,
    pub unit_cost: f64,
    pub coverage: f64, // 作用于 (1 - coverage_norm)
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            eng_crit: 0.4,
            lead_time: 0.3,
            unit_cost: 0.2,
            coverage: 0.1,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.eng_crit + self.lead_time + self.unit_cost + self.coverage
    }
}

// ==========================================
// AbcThresholds - ABC 累计占比阈值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbcThresholds {
    pub a_max: f64, // cum ≤ a_max → A
    pub b_max: f64, // a_max < cum ≤ b_max → B
}

impl Default for AbcThresholds {
    fn default() -> Self {
        Self {
            a_max: 0.80,
            b_max: 0.95,
        }
    }
}

// ==========================================
// XyzQuantiles - XYZ 分位点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XyzQuantiles {
    pub x_quantile: f64,
    pub y_quantile: f64,
}

impl Default for XyzQuantiles {
    fn default() -> Self {
        Self {
            x_quantile: 0.33,
            y_quantile: 0.66,
        }
    }
}

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 覆盖天数上限
    pub coverage_clip: f64,

    /// 安全库存 Z 值
    pub z_service: f64,

    pub score_weights: ScoreWeights,
    pub abc_thresholds: AbcThresholds,
    pub xyz_quantiles: XyzQuantiles,

    /// 变异系数分母保护项
    pub cv_epsilon: f64,

    /// demand_std 缺失时按 |日消耗| 的比例回填
    pub demand_std_fallback_ratio: f64,

    /// 可选文本字段缺列时的默认值
    pub category_default: String,
    pub supplier_default: String,

    /// 汇总中帕累托/风险清单条数
    pub summary_top_n: usize,

    /// 输入分隔符（None = 自动识别）
    pub delimiter: Option<char>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coverage_clip: COVERAGE_CLIP,
            z_service: Z_SERVICE,
            score_weights: ScoreWeights::default(),
            abc_thresholds: AbcThresholds::default(),
            xyz_quantiles: XyzQuantiles::default(),
            cv_epsilon: 1e-9,
            demand_std_fallback_ratio: 0.25,
            category_default: "N/A".to_string(),
            supplier_default: "N/A".to_string(),
            summary_top_n: 20,
            delimiter: None,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 文件加载（缺省字段取默认值），并执行校验
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置，一次返回全部错误
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if !(self.coverage_clip.is_finite() && self.coverage_clip > 0.0) {
            errors.push(format!("coverage_clip: 必须为正数，实际 {}", self.coverage_clip));
        }
        if !(self.z_service.is_finite() && self.z_service >= 0.0) {
            errors.push(format!("z_service: 必须为非负数，实际 {}", self.z_service));
        }

        let w = &self.score_weights;
        for (name, value) in [
            ("score_weights.eng_crit", w.eng_crit),
            ("score_weights.lead_time", w.lead_time),
            ("score_weights.unit_cost", w.unit_cost),
            ("score_weights.coverage", w.coverage),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(format!("{}: 必须为非负数，实际 {}", name, value));
            }
        }
        // 权重和超过 1 时 score 可能越界 [0,1]
        if w.total() > 1.0 + 1e-9 {
            errors.push(format!("score_weights: 权重之和不得超过 1，实际 {:.4}", w.total()));
        }

        let t = &self.abc_thresholds;
        if !(0.0 < t.a_max && t.a_max < t.b_max && t.b_max <= 1.0) {
            errors.push(format!(
                "abc_thresholds: 需满足 0 < a_max < b_max ≤ 1，实际 a_max={}, b_max={}",
                t.a_max, t.b_max
            ));
        }

        let q = &self.xyz_quantiles;
        if !(0.0 <= q.x_quantile && q.x_quantile <= q.y_quantile && q.y_quantile <= 1.0) {
            errors.push(format!(
                "xyz_quantiles: 需满足 0 ≤ x ≤ y ≤ 1，实际 x={}, y={}",
                q.x_quantile, q.y_quantile
            ));
        }

        if !(self.cv_epsilon.is_finite() && self.cv_epsilon > 0.0) {
            errors.push(format!("cv_epsilon: 必须为正数，实际 {}", self.cv_epsilon));
        }
        if !(self.demand_std_fallback_ratio.is_finite() && self.demand_std_fallback_ratio >= 0.0) {
            errors.push(format!(
                "demand_std_fallback_ratio: 必须为非负数，实际 {}",
                self.demand_std_fallback_ratio
            ));
        }

        if let Some(d) = self.delimiter {
            if !d.is_ascii() || d == '"' || d == '\n' || d == '\r' {
                errors.push(format!("delimiter: 不支持的分隔符 {:?}", d));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.coverage_clip, 180.0);
        assert_eq!(config.z_service, 1.65);
        assert!((config.score_weights.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_partial_json_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "coverage_clip": 90, "abc_thresholds": {{ "a_max": 0.7 }} }}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.coverage_clip, 90.0);
        assert_eq!(config.abc_thresholds.a_max, 0.7);
        assert_eq!(config.abc_thresholds.b_max, 0.95);
        assert_eq!(config.z_service, 1.65);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = EngineConfig {
            coverage_clip: -1.0,
            z_service: f64::NAN,
            abc_thresholds: AbcThresholds {
                a_max: 0.9,
                b_max: 0.8,
            },
            ..EngineConfig::default()
        };

        match config.validate() {
            Err(ConfigError::Invalid(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors[0].starts_with("coverage_clip"));
            }
            other => panic!("期望 Invalid，实际 {:?}", other),
        }
    }

    #[test]
    fn test_weights_over_one_rejected() {
        let config = EngineConfig {
            score_weights: ScoreWeights {
                eng_crit: 0.9,
                ..ScoreWeights::default()
            },
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load("no_such_config.json");
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
