// ==========================================
// 检验报告(CoA)系统 - 配置层
// ==========================================
// 职责: 解析引擎配置的加载与校验
// 存储: JSON 文件（运行期只读）
// ==========================================

pub mod resolver_config;

// 重导出核心配置类型
pub use resolver_config::{
    default_config_path, ConfigError, InputLayout, MetricSelection, MicroLimits, ProcessWindow,
    ResolverConfig, CONFIG_PATH_ENV,
};
