// ==========================================
// 物料关键性评估系统 - 物料导入器
// ==========================================
// 职责: 原始表 → 标准化物料记录
// 流程:
//   1. 列名映射（启发式）
//   2. 必填列校验（缺列即 SchemaError）
//   3. 必填数值列清洗（缺失补 0.0）
//   4. 可选列补全（category / supplier / demand_std 回填）
//   5. DQ 报告
// ==========================================

use crate::config::EngineConfig;
use crate::domain::material::{Cell, DqReport, MaterialRecord, RawTable};
use crate::domain::types::CanonicalField;
use crate::importer::column_mapper::{ColumnMapper, ColumnMapping};
use crate::importer::dq_validator::{CoercionStat, DqValidator};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::numeric_coercer::NumericCoercer;
use std::path::Path;
use tracing::{debug, info, instrument};

/// 导入结果
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub records: Vec<MaterialRecord>,
    pub mapping: ColumnMapping,
    pub dq_report: DqReport,
}

// ==========================================
// MaterialImporter - 物料导入器
// ==========================================
pub struct MaterialImporter {
    config: EngineConfig,
    mapper: ColumnMapper,
    coercer: NumericCoercer,
    validator: DqValidator,
}

impl MaterialImporter {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            mapper: ColumnMapper,
            coercer: NumericCoercer,
            validator: DqValidator,
        }
    }

    /// 从文件导入（按扩展名选择解析器）
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportOutcome> {
        let delimiter = self.config.delimiter.map(|c| c as u8);
        let table = UniversalFileParser::new(delimiter).parse(file_path.as_ref())?;
        info!(
            columns = table.headers.len(),
            rows = table.row_count(),
            "文件解析完成"
        );
        self.import_table(&table)
    }

    /// 从原始表导入
    #[instrument(skip(self, table), fields(rows = table.row_count()))]
    pub fn import_table(&self, table: &RawTable) -> ImportResult<ImportOutcome> {
        // 1-2. 列映射 + 必填校验
        let mapping = self.mapper.map_headers(&table.headers);
        mapping.ensure_required()?;
        for field in mapping.missing_optional() {
            info!(field = %field, "可选列缺失，按默认规则补全");
        }

        let column = |field: CanonicalField| -> Option<Vec<Cell>> {
            mapping.column_of(field).map(|col| table.column(col))
        };

        // 3. 必填数值列
        let mut stats = Vec::new();
        let mut numeric = |field: CanonicalField| -> Vec<f64> {
            let cells = column(field).unwrap_or_default();
            let (values, coerced) = self.coercer.coerce_required(&cells);
            debug!(
                field = %field,
                native = coerced.native,
                failures = coerced.failures,
                "数值列清洗完成"
            );
            stats.push(CoercionStat {
                field,
                failures: coerced.failures,
            });
            values
        };

        let eng_crit = numeric(CanonicalField::EngCrit);
        let lead_time_days = numeric(CanonicalField::LeadTimeDays);
        let unit_cost = numeric(CanonicalField::UnitCost);
        let stock_qty = numeric(CanonicalField::StockQty);
        let daily_consumption = numeric(CanonicalField::DailyConsumption);

        // 4. 可选列补全
        let demand_cells = column(CanonicalField::DemandStd);
        let (demand_std, demand_coerced) = self.coercer.coerce_demand_std(
            demand_cells.as_deref(),
            &daily_consumption,
            self.config.demand_std_fallback_ratio,
        );
        if let Some(coerced) = demand_coerced {
            stats.push(CoercionStat {
                field: CanonicalField::DemandStd,
                failures: coerced.failures,
            });
        }

        let ids = self.text_column(column(CanonicalField::MaterialId), table.row_count(), "");
        let categories = self.text_column(
            column(CanonicalField::Category),
            table.row_count(),
            &self.config.category_default,
        );
        let suppliers = self.text_column(
            column(CanonicalField::Supplier),
            table.row_count(),
            &self.config.supplier_default,
        );

        let records: Vec<MaterialRecord> = (0..table.row_count())
            .map(|i| MaterialRecord {
                material_id: ids[i].clone(),
                category: categories[i].clone(),
                supplier: suppliers[i].clone(),
                eng_crit: eng_crit[i],
                lead_time_days: lead_time_days[i],
                unit_cost: unit_cost[i],
                stock_qty: stock_qty[i],
                daily_consumption: daily_consumption[i],
                demand_std: demand_std[i],
                row_number: i + 1,
            })
            .collect();

        // 5. DQ 报告
        let dq_report = self.validator.validate(&records, &stats);
        info!(
            records = records.len(),
            dq_warnings = dq_report.warning_count(),
            "物料导入完成"
        );

        Ok(ImportOutcome {
            records,
            mapping,
            dq_report,
        })
    }

    /// 文本列: 缺列 → 列默认值；空单元格 → 空字符串
    fn text_column(&self, cells: Option<Vec<Cell>>, rows: usize, default: &str) -> Vec<String> {
        match cells {
            Some(cells) => cells
                .iter()
                .map(|c| c.as_text().unwrap_or_default())
                .collect(),
            None => vec![default.to_string(); rows],
        }
    }
}
