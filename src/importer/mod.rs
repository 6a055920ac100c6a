// ==========================================
// 物料关键性评估系统 - 导入层
// ==========================================
// 职责: 外部表格 → 标准化物料记录
// 支持: CSV（分隔符自动识别）, Excel
// ==========================================

// 模块声明
pub mod column_mapper;
pub mod dq_validator;
pub mod error;
pub mod file_parser;
pub mod header_normalizer;
pub mod material_importer;
pub mod material_importer_trait;
pub mod numeric_coercer;

// 重导出核心类型
pub use column_mapper::{guess_target, ColumnMapper, ColumnMapping};
pub use dq_validator::{CoercionStat, DqValidator};
pub use error::{ImportError, ImportResult};
pub use file_parser::{sniff_delimiter, CsvParser, ExcelParser, UniversalFileParser};
pub use header_normalizer::normalize_header;
pub use material_importer::{ImportOutcome, MaterialImporter};
pub use numeric_coercer::{parse_locale, CoercedColumn, NumericCoercer};

// 重导出 Trait 接口
pub use material_importer_trait::FileParser;
