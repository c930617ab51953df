// ==========================================
// 检验报告(CoA)系统 - 领域模型层
// ==========================================
// 职责: 定义批号、成品主数据、检验行、销售订单与解析结果
// 红线: 不含文件读取逻辑,不含匹配/归约逻辑
// ==========================================

pub mod dq;
pub mod finished_goods;
pub mod lot;
pub mod metric;
pub mod rows;
pub mod sales_order;
pub mod types;

// 重导出核心类型
pub use dq::{Dataset, DqLevel, DqReport, DqSummary, DqViolation};
pub use finished_goods::FinishedGoodsRecord;
pub use lot::{DecodedLot, RawExpiry};
pub use metric::{LotResolution, MatchRule, MetricResolution, MetricValue, ResolvedMetric};
pub use rows::{
    MicroReadingBlock, MicroRow, RawReading, SourceRow, TitrationMarker, TitrationReadingBlock,
    TitrationRow,
};
pub use sales_order::SalesOrder;
pub use types::{FactoryCode, MicroMetric, TitrationMetric};
