// ==========================================
// 物料关键性评估系统 - 列映射器
// ==========================================
// 职责: 标准化列名 → 标准字段（关键字启发式，葡/英双语）
// 规则: 有序规则表，命中即返回；同一标准字段先到先得
// ==========================================

use crate::domain::types::CanonicalField;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_normalizer::normalize_header;
use std::collections::HashMap;
use tracing::{debug, info};

// ==========================================
// 匹配谓词
// ==========================================
#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// token 等于任一关键字
    Exact(&'static [&'static str]),
    /// token 包含任一关键字
    Contains(&'static [&'static str]),
    /// token 以后缀结尾
    EndsWith(&'static str),
    /// 包含任一关键字，且不包含排除词
    ContainsExcept {
        any: &'static [&'static str],
        except: &'static str,
    },
}

impl Matcher {
    fn matches(&self, token: &str) -> bool {
        match self {
            Matcher::Exact(words) => words.contains(&token),
            Matcher::Contains(words) => words.iter().any(|w| token.contains(w)),
            Matcher::EndsWith(suffix) => token.ends_with(suffix),
            Matcher::ContainsExcept { any, except } => {
                any.iter().any(|w| token.contains(w)) && !token.contains(except)
            }
        }
    }
}

// ==========================================
// 规则表（顺序即优先级）
// ==========================================
// 同一目标的多条规则为"或"关系
const RULES: &[(Matcher, CanonicalField)] = &[
    // 1. 物料编码
    (
        Matcher::Exact(&["id", "material", "codigo", "cod", "sku", "item"]),
        CanonicalField::MaterialId,
    ),
    (Matcher::Contains(&["material"]), CanonicalField::MaterialId),
    (Matcher::EndsWith("_id"), CanonicalField::MaterialId),
    // 2. 工程关键性
    (
        Matcher::Contains(&[
            "eng",
            "criticidade",
            "critical",
            "crit_eng",
            "criticidade_eng",
            "critic",
        ]),
        CanonicalField::EngCrit,
    ),
    // 3. 提前期
    (
        Matcher::Contains(&["lead_time", "leadtime", "lt", "prazo", "tempo"]),
        CanonicalField::LeadTimeDays,
    ),
    // 4. 单价
    (
        Matcher::Contains(&[
            "unit_cost",
            "unitprice",
            "unit_price",
            "preco",
            "custo",
            "valor_unit",
        ]),
        CanonicalField::UnitCost,
    ),
    // 5. 库存（排除"消耗"类列名）
    (
        Matcher::ContainsExcept {
            any: &["stock", "estoque", "saldo", "qtd", "quantidade"],
            except: "consum",
        },
        CanonicalField::StockQty,
    ),
    // 6. 日消耗
    (
        Matcher::Contains(&["consumo", "consum", "demand", "demanda", "usage", "uso"]),
        CanonicalField::DailyConsumption,
    ),
    // 7. 类别
    (
        Matcher::Contains(&["categoria", "category"]),
        CanonicalField::Category,
    ),
    // 8. 供应商
    (
        Matcher::Contains(&["fornecedor", "supplier"]),
        CanonicalField::Supplier,
    ),
    // 9. 需求标准差
    (
        Matcher::Contains(&["desvio", "std", "sigma", "cv_demanda", "stdev"]),
        CanonicalField::DemandStd,
    ),
];

/// 猜测标准化 token 对应的标准字段
pub fn guess_target(token: &str) -> Option<CanonicalField> {
    RULES
        .iter()
        .find(|(matcher, _)| matcher.matches(token))
        .map(|(_, field)| *field)
}

// ==========================================
// ColumnMapping - 映射结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    /// 标准字段 → 原始列下标
    pub fields: HashMap<CanonicalField, usize>,
    /// 原始列名（按输入顺序）
    pub headers: Vec<String>,
}

impl ColumnMapping {
    pub fn column_of(&self, field: CanonicalField) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    /// 原始列下标 → 标准字段
    pub fn field_of(&self, col: usize) -> Option<CanonicalField> {
        self.fields
            .iter()
            .find(|(_, &c)| c == col)
            .map(|(f, _)| *f)
    }

    /// 映射后的列名（未映射列保持原名）
    pub fn renamed_headers(&self) -> Vec<String> {
        (0..self.headers.len())
            .map(|col| match self.field_of(col) {
                Some(field) => field.as_str().to_string(),
                None => self.headers[col].clone(),
            })
            .collect()
    }

    /// 缺失的必填字段
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        CanonicalField::REQUIRED
            .iter()
            .copied()
            .filter(|f| !self.fields.contains_key(f))
            .collect()
    }

    /// 未映射的可选字段（由默认值或回填规则补全）
    pub fn missing_optional(&self) -> Vec<CanonicalField> {
        CanonicalField::OPTIONAL
            .iter()
            .copied()
            .filter(|f| !self.fields.contains_key(f))
            .collect()
    }

    /// 必填字段校验（硬门槛）
    pub fn ensure_required(&self) -> ImportResult<()> {
        let missing = self.missing_required();
        if missing.is_empty() {
            return Ok(());
        }

        Err(ImportError::MissingRequiredFields {
            missing: missing.iter().map(|f| f.as_str().to_string()).collect(),
            found: self.renamed_headers(),
        })
    }
}

// ==========================================
// ColumnMapper - 列映射器
// ==========================================
pub struct ColumnMapper;

impl ColumnMapper {
    /// 按列顺序映射；已被占用的标准字段不再分配
    pub fn map_headers(&self, headers: &[String]) -> ColumnMapping {
        let mut mapping = ColumnMapping {
            fields: HashMap::new(),
            headers: headers.to_vec(),
        };

        for (col, raw) in headers.iter().enumerate() {
            let token = normalize_header(raw);
            let Some(target) = guess_target(&token) else {
                debug!(column = %raw, token = %token, "列未映射");
                continue;
            };

            if mapping.fields.contains_key(&target) {
                debug!(column = %raw, target = %target, "标准字段已被占用，跳过");
                continue;
            }

            info!("[map] {} -> {}", raw, target);
            mapping.fields.insert(target, col);
        }

        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_guess_target_rules() {
        assert_eq!(guess_target("codigo"), Some(CanonicalField::MaterialId));
        assert_eq!(guess_target("material_code"), Some(CanonicalField::MaterialId));
        assert_eq!(guess_target("part_id"), Some(CanonicalField::MaterialId));
        assert_eq!(guess_target("criteng"), Some(CanonicalField::EngCrit));
        assert_eq!(guess_target("prazoentrega"), Some(CanonicalField::LeadTimeDays));
        assert_eq!(guess_target("custo"), Some(CanonicalField::UnitCost));
        assert_eq!(guess_target("estoque"), Some(CanonicalField::StockQty));
        assert_eq!(guess_target("consumodiario"), Some(CanonicalField::DailyConsumption));
        assert_eq!(guess_target("categoria"), Some(CanonicalField::Category));
        assert_eq!(guess_target("fornecedor"), Some(CanonicalField::Supplier));
        assert_eq!(guess_target("desvio_padrao"), Some(CanonicalField::DemandStd));
        assert_eq!(guess_target("observacao"), None);
    }

    #[test]
    fn test_rule_order_first_match_wins() {
        // "material" 优先于其他关键字
        assert_eq!(guess_target("material_stock"), Some(CanonicalField::MaterialId));
        // "eng" 规则排在提前期之前
        assert_eq!(guess_target("eng_lead_time"), Some(CanonicalField::EngCrit));
        // "lt" 子串命中提前期（启发式固有偏差）
        assert_eq!(guess_target("saldo_ultimo"), Some(CanonicalField::LeadTimeDays));
    }

    #[test]
    fn test_stock_excludes_consumption() {
        assert_eq!(guess_target("qtd_consumida"), Some(CanonicalField::DailyConsumption));
        assert_eq!(guess_target("qtd_estoque"), Some(CanonicalField::StockQty));
    }

    #[test]
    fn test_map_headers_first_claim_wins() {
        let mapper = ColumnMapper;
        let mapping = mapper.map_headers(&headers(&["SKU", "Codigo", "Custo"]));

        assert_eq!(mapping.column_of(CanonicalField::MaterialId), Some(0));
        assert_eq!(mapping.column_of(CanonicalField::UnitCost), Some(2));
        assert_eq!(mapping.field_of(1), None);
        assert_eq!(mapping.renamed_headers(), headers(&["material_id", "Codigo", "unit_cost"]));
    }

    #[test]
    fn test_map_headers_reordered_columns() {
        let mapper = ColumnMapper;
        let mapping = mapper.map_headers(&headers(&["Codigo", "SKU"]));

        assert_eq!(mapping.column_of(CanonicalField::MaterialId), Some(0));
        assert_eq!(mapping.field_of(1), None);
    }

    #[test]
    fn test_missing_optional_fields() {
        let mapper = ColumnMapper;
        let mapping = mapper.map_headers(&headers(&["Codigo", "Fornecedor"]));

        assert_eq!(
            mapping.missing_optional(),
            vec![CanonicalField::Category, CanonicalField::DemandStd]
        );
    }

    #[test]
    fn test_ensure_required_reports_missing() {
        let mapper = ColumnMapper;
        let mapping = mapper.map_headers(&headers(&[
            "Codigo", "CritEng", "PrazoEntrega", "Custo", "Estoque", "Obs",
        ]));

        match mapping.ensure_required() {
            Err(ImportError::MissingRequiredFields { missing, found }) => {
                assert_eq!(missing, vec!["daily_consumption".to_string()]);
                assert_eq!(found.len(), 6);
                assert!(found.contains(&"Obs".to_string()));
            }
            other => panic!("期望 MissingRequiredFields，实际 {:?}", other),
        }
    }
}
