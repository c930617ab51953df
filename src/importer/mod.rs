// ==========================================
// 检验报告(CoA)系统 - 导入层
// ==========================================
// 职责: 外部导出文件 → 类型化行 → 只读索引快照
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod dataset_loader;
pub mod error;
pub mod file_parser;
pub mod row_mapper;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use dataset_loader::{
    group_sales_orders, source_rows, DatasetLoader, DatasetPaths, LoadedDatasets, RawDatasets,
};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, RowParser, UniversalRowParser};
pub use row_mapper::{Mapped, RowMapper};
