// ==========================================
// 物料关键性评估系统 - 数值清洗器
// ==========================================
// 职责: 混合格式数值列 → 有限 f64
// 规则:
//   1) 整列均为原生数值 → 原样透传
//   2) 否则按本地化文本处理: 去 '.' 千分位 → ',' 作小数点 → 去除 [0-9.-] 以外字符 → 解析
//   3) 解析失败 → 缺失（由调用方回填）
// ==========================================

use crate::domain::material::Cell;

/// 视为缺失值的文本（大小写不敏感）
const MISSING_TOKENS: &[&str] = &[
    "", "na", "n/a", "nan", "-nan", "null", "none", "#n/a", "#n/a n/a", "#na", "<na>",
    "-1.#ind", "1.#ind", "-1.#qnan", "1.#qnan",
];

/// 是否为缺失值文本
pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_ascii_lowercase();
    MISSING_TOKENS.contains(&lower.as_str())
}

/// 按常规浮点格式解析（仅接受有限值）
pub fn parse_native(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// 是否为常规浮点文本（含 inf / infinity 等非有限值）
fn is_float_text(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok()
}

/// 按本地化格式解析（"1.234,56" → 1234.56）
pub fn parse_locale(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|&c| c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ==========================================
// CoercedColumn - 清洗结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedColumn {
    pub values: Vec<Option<f64>>,
    /// 非空但无法解析的单元格数量
    pub failures: usize,
    /// 是否走原生透传路径
    pub native: bool,
}

impl CoercedColumn {
    /// 整列缺失
    pub fn all_missing(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// 缺失值统一回填
    pub fn fill(&self, default: f64) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(default)).collect()
    }

    /// 缺失值逐行回填
    pub fn fill_with(&self, fallback: &[f64]) -> Vec<f64> {
        self.values
            .iter()
            .zip(fallback)
            .map(|(v, fb)| v.unwrap_or(*fb))
            .collect()
    }
}

// ==========================================
// NumericCoercer - 数值清洗器
// ==========================================
pub struct NumericCoercer;

impl NumericCoercer {
    /// 清洗一整列
    pub fn coerce_column(&self, cells: &[Cell]) -> CoercedColumn {
        // 非有限值（inf）仍视为原生格式，仅该单元格计为解析失败
        let native = cells.iter().all(|cell| match cell {
            Cell::Number(_) | Cell::Empty => true,
            Cell::Text(s) => is_missing_token(s) || is_float_text(s),
        });

        let mut failures = 0;
        let values = cells
            .iter()
            .map(|cell| {
                let parsed = match cell {
                    Cell::Empty => return None,
                    Cell::Text(s) if is_missing_token(s) => return None,
                    Cell::Number(v) => Some(*v).filter(|v| v.is_finite()),
                    Cell::Text(s) if native => parse_native(s),
                    Cell::Text(s) => parse_locale(s),
                };
                if parsed.is_none() {
                    failures += 1;
                }
                parsed
            })
            .collect();

        CoercedColumn {
            values,
            failures,
            native,
        }
    }

    /// 必填数值列: 缺失补 0.0
    pub fn coerce_required(&self, cells: &[Cell]) -> (Vec<f64>, CoercedColumn) {
        let column = self.coerce_column(cells);
        (column.fill(0.0), column)
    }

    /// demand_std: 缺列或整列缺失 → ratio × |daily|；否则仅回填缺失项
    pub fn coerce_demand_std(
        &self,
        cells: Option<&[Cell]>,
        daily_consumption: &[f64],
        ratio: f64,
    ) -> (Vec<f64>, Option<CoercedColumn>) {
        let fallback: Vec<f64> = daily_consumption.iter().map(|d| d.abs() * ratio).collect();

        let Some(cells) = cells else {
            return (fallback, None);
        };

        let column = self.coerce_column(cells);
        if column.all_missing() {
            return (fallback, Some(column));
        }

        (column.fill_with(&fallback), Some(column))
    }
}
