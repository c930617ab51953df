// ==========================================
// 检验报告(CoA)系统 - 核心库
// ==========================================
// 职责: 批号解码 + 理化/微生物检验结果解析
// 系统定位: 报告生成的数据来源（版式渲染在外部）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 匹配与代表值
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// 耗时统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FactoryCode, MicroMetric, TitrationMetric};

// 领域实体
pub use domain::{
    DecodedLot, DqReport, FinishedGoodsRecord, LotResolution, MatchRule, MetricResolution,
    MetricValue, ResolvedMetric, SalesOrder,
};

// 引擎
pub use engine::{
    BatchResolver, FinishedGoodsIndex, IndexSnapshot, LotCodec, MicroIndex, ResolutionError,
    ResultResolver, TitrationIndex,
};

// 配置
pub use config::ResolverConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "检验报告(CoA)解析引擎";
