// ==========================================
// 检验报告(CoA)系统 - 引擎层
// ==========================================
// 职责: 批号解码、索引匹配、代表值选取、报告记录
// 红线: 引擎不读文件，索引在加载屏障之后只读
// ==========================================

mod cell_value;

pub mod batch;
pub mod date_text;
pub mod finished_goods_index;
pub mod lot_codec;
pub mod micro_index;
pub mod renderer;
pub mod report;
pub mod representative;
pub mod resolver;
pub mod titration_index;

// 重导出核心引擎
pub use batch::{BatchError, BatchResolver, BatchResult, LotOutcome, OrderResolution};
pub use finished_goods_index::FinishedGoodsIndex;
pub use lot_codec::{LotCodeError, LotCodec};
pub use micro_index::MicroIndex;
pub use renderer::{JsonLinesRenderer, RenderError, ReportRenderer};
pub use report::{LotReport, MetricReport, MetricStatus, OrderReport, ReportValue};
pub use representative::RepresentativePolicy;
pub use resolver::{IndexSnapshot, ResolutionError, ResultResolver};
pub use titration_index::{TitrationIndex, TitrationMatch};
