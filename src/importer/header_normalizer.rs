// ==========================================
// 物料关键性评估系统 - 列名标准化
// ==========================================
// 职责: 原始列名 → 可比较 token
// 规则: NFKD 去重音 → 小写 → 非 [a-z0-9] 连续段折叠为 '_' → 去首尾 '_'
// ==========================================

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 标准化列名（纯函数，永不失败）
///
/// 兼容分解（NFKD）后去掉组合附加符，全角字母与带重音字母均折叠为 ASCII；
/// 无 ASCII 分解的字符（汉字、ß、Ø 等）直接丢弃。
///
/// # 示例
/// - "Código Material" → "codigo_material"
/// - "  Lead-Time (dias) " → "lead_time_dias"
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.nfkd() {
        if is_combining_mark(ch) || !ch.is_ascii() {
            continue;
        }
        let lower = ch.to_ascii_lowercase();

        if lower.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(lower);
        } else {
            pending_sep = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_header("Codigo"), "codigo");
        assert_eq!(normalize_header("Lead Time"), "lead_time");
        assert_eq!(normalize_header("unit_cost"), "unit_cost");
    }

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize_header("Código"), "codigo");
        assert_eq!(normalize_header("Preço Unitário"), "preco_unitario");
        assert_eq!(normalize_header("CRITICIDADE_ENG"), "criticidade_eng");
    }

    #[test]
    fn test_normalize_collapses_and_trims_separators() {
        assert_eq!(normalize_header("  Lead-Time (dias) "), "lead_time_dias");
        assert_eq!(normalize_header("__Estoque__Atual__"), "estoque_atual");
        assert_eq!(normalize_header("a...b"), "a_b");
    }

    #[test]
    fn test_normalize_drops_non_latin() {
        // 非拉丁字符丢弃后剩余部分仍保持 token 语义
        assert_eq!(normalize_header("材料号"), "");
        assert_eq!(normalize_header("SKU 编码"), "sku");
        assert_eq!(normalize_header("ß"), "");
    }

    #[test]
    fn test_normalize_folds_beyond_latin1() {
        assert_eq!(normalize_header("ＳＫＵ"), "sku");
        assert_eq!(normalize_header("Ｃódigo"), "codigo");
        assert_eq!(normalize_header("ǎ"), "a");
        assert_eq!(normalize_header("Lead\u{00A0}Time"), "lead_time");
        assert_eq!(normalize_header("Ẽstoque Ạtual"), "estoque_atual");
        // 分解形式与预组合形式等价
        assert_eq!(normalize_header("Co\u{0301}digo"), "codigo");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["Consumo Diário", "Prazo-Entrega", "ID", "  x  y "] {
            let once = normalize_header(raw);
            assert_eq!(normalize_header(&once), once);
        }
    }
}
