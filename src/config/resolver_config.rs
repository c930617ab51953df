// ==========================================
// 检验报告(CoA)系统 - 解析引擎配置
// ==========================================
// 职责: 微生物限值 / 理化过程窗口 / 回退开关 / 指标选择 / 输入表头行数
// 存储: JSON 文件（缺失时使用默认值）
// ==========================================

use crate::domain::types::{MicroMetric, TitrationMetric};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "COA_RESOLVER_CONFIG";

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("配置值非法 (key: {key}): {message}")]
    Invalid { key: String, message: String },
}

// ==========================================
// MicroLimits - 微生物法规限值（严格小于）
// ==========================================
// 大肠杆菌固定要求 == 0，不可配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MicroLimits {
    #[serde(default = "default_aerobic_limit")]
    pub aerobic: i64,
    #[serde(default = "default_coliform_limit")]
    pub coliform: i64,
    #[serde(default = "default_fungal_limit")]
    pub yeast: i64,
    #[serde(default = "default_fungal_limit")]
    pub mold: i64,
    #[serde(default = "default_fungal_limit")]
    pub lactic: i64,
}

fn default_aerobic_limit() -> i64 {
    100_000
}

fn default_coliform_limit() -> i64 {
    100
}

fn default_fungal_limit() -> i64 {
    1_000
}

impl Default for MicroLimits {
    fn default() -> Self {
        Self {
            aerobic: default_aerobic_limit(),
            coliform: default_coliform_limit(),
            yeast: default_fungal_limit(),
            mold: default_fungal_limit(),
            lactic: default_fungal_limit(),
        }
    }
}

impl MicroLimits {
    /// 判定微生物计数是否合格
    ///
    /// # 规则
    /// - 大肠杆菌: == 0
    /// - 其他: < 限值
    pub fn is_in_spec(&self, metric: MicroMetric, value: i64) -> bool {
        match metric {
            MicroMetric::EColiform => value == 0,
            MicroMetric::Aerobic => value < self.aerobic,
            MicroMetric::Coliform => value < self.coliform,
            MicroMetric::Yeast => value < self.yeast,
            MicroMetric::Mold => value < self.mold,
            MicroMetric::Lactic => value < self.lactic,
        }
    }
}

// ==========================================
// ProcessWindow - 理化过程窗口（闭区间）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessWindow {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl ProcessWindow {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

// ==========================================
// MetricSelection - 报告指标选择
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSelection {
    #[serde(default = "all_titration_metrics")]
    pub titration: Vec<TitrationMetric>,
    #[serde(default = "all_micro_metrics")]
    pub micro: Vec<MicroMetric>,
}

fn all_titration_metrics() -> Vec<TitrationMetric> {
    TitrationMetric::ALL.to_vec()
}

fn all_micro_metrics() -> Vec<MicroMetric> {
    MicroMetric::ALL.to_vec()
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self {
            titration: all_titration_metrics(),
            micro: all_micro_metrics(),
        }
    }
}

// ==========================================
// InputLayout - 输入文件表头行数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputLayout {
    #[serde(default = "default_header_rows")]
    pub finished_goods_header_rows: usize,
    #[serde(default = "default_header_rows")]
    pub titration_header_rows: usize,
    #[serde(default = "default_header_rows")]
    pub micro_header_rows: usize,
    #[serde(default = "default_header_rows")]
    pub sales_order_header_rows: usize,
}

fn default_header_rows() -> usize {
    1
}

impl Default for InputLayout {
    fn default() -> Self {
        Self {
            finished_goods_header_rows: 1,
            titration_header_rows: 1,
            micro_header_rows: 1,
            sales_order_header_rows: 1,
        }
    }
}

// ==========================================
// ResolverConfig - 解析引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default)]
    pub micro_limits: MicroLimits,

    /// 理化过程窗口；未配置的指标视为合格
    #[serde(default)]
    pub titration_limits: BTreeMap<TitrationMetric, ProcessWindow>,

    /// 理化行仍未命中时是否以生产日期 +1 天重试
    #[serde(default = "default_true")]
    pub next_day_fallback: bool,

    #[serde(default)]
    pub metrics: MetricSelection,

    #[serde(default)]
    pub input: InputLayout,
}

fn default_true() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            micro_limits: MicroLimits::default(),
            titration_limits: BTreeMap::new(),
            next_day_fallback: true,
            metrics: MetricSelection::default(),
            input: InputLayout::default(),
        }
    }
}

impl ResolverConfig {
    /// 从 JSON 文件加载配置
    ///
    /// # 返回
    /// - 文件不存在: 默认配置
    /// - 其他读取/解析失败: ConfigError
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.display().to_string();
        if !path.exists() {
            info!(path = %path_str, "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        let config: ResolverConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path_str.clone(),
                source,
            })?;
        config.validate()?;

        debug!(path = %path_str, "配置加载完成");
        Ok(config)
    }

    /// 从默认位置加载配置
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&default_config_path())
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("micro_limits.aerobic", self.micro_limits.aerobic),
            ("micro_limits.coliform", self.micro_limits.coliform),
            ("micro_limits.yeast", self.micro_limits.yeast),
            ("micro_limits.mold", self.micro_limits.mold),
            ("micro_limits.lactic", self.micro_limits.lactic),
        ];
        for (key, value) in limits {
            if value <= 0 {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    message: format!("限值必须为正数: {}", value),
                });
            }
        }

        for (metric, window) in &self.titration_limits {
            if let (Some(min), Some(max)) = (window.min, window.max) {
                if min > max {
                    return Err(ConfigError::Invalid {
                        key: format!("titration_limits.{}", metric),
                        message: format!("下限 {} 大于上限 {}", min, max),
                    });
                }
            }
        }

        Ok(())
    }
}

/// 默认配置文件路径
///
/// 优先级: 环境变量 COA_RESOLVER_CONFIG > 用户配置目录 > 当前目录
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::config_dir() {
        Some(config_dir) => config_dir.join("coa-resolver").join("config.json"),
        None => PathBuf::from("./coa-resolver.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_micro_limits() {
        let limits = MicroLimits::default();
        assert!(limits.is_in_spec(MicroMetric::Aerobic, 99_999));
        assert!(!limits.is_in_spec(MicroMetric::Aerobic, 100_000));
        assert!(limits.is_in_spec(MicroMetric::Coliform, 99));
        assert!(!limits.is_in_spec(MicroMetric::Coliform, 100));
        assert!(limits.is_in_spec(MicroMetric::Yeast, 999));
        assert!(!limits.is_in_spec(MicroMetric::Mold, 1_000));
        assert!(!limits.is_in_spec(MicroMetric::Lactic, 1_500));
        assert!(limits.is_in_spec(MicroMetric::EColiform, 0));
        assert!(!limits.is_in_spec(MicroMetric::EColiform, 1));
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let config = ResolverConfig::load(Path::new("/nonexistent/coa-resolver.json")).unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert!(config.next_day_fallback);
        assert_eq!(config.metrics.titration.len(), 6);
    }

    #[test]
    fn test_load_partial_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"{{
                "micro_limits": {{ "coliform": 10 }},
                "titration_limits": {{ "PH": {{ "min": 3.2, "max": 4.1 }} }},
                "next_day_fallback": false,
                "metrics": {{ "micro": ["AEROBIC", "YEAST"] }}
            }}"#
        )
        .unwrap();

        let config = ResolverConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.micro_limits.coliform, 10);
        assert_eq!(config.micro_limits.aerobic, 100_000);
        assert!(!config.next_day_fallback);
        assert_eq!(config.metrics.micro, vec![MicroMetric::Aerobic, MicroMetric::Yeast]);
        assert_eq!(config.metrics.titration.len(), 6);
        let ph = &config.titration_limits[&TitrationMetric::Ph];
        assert_eq!((ph.min, ph.max), (Some(3.2), Some(4.1)));
        assert!(!config.titration_limits.contains_key(&TitrationMetric::Salt));
    }

    #[test]
    fn test_load_default_honors_env_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{ "next_day_fallback": false }}"#).unwrap();

        std::env::set_var(CONFIG_PATH_ENV, temp_file.path());
        assert_eq!(default_config_path(), temp_file.path());
        let config = ResolverConfig::load_default();
        std::env::remove_var(CONFIG_PATH_ENV);

        assert!(!config.unwrap().next_day_fallback);
    }

    #[test]
    fn test_load_rejects_unknown_field() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{ "unknown_key": 1 }}"#).unwrap();

        let result = ResolverConfig::load(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut config = ResolverConfig::default();
        config.titration_limits.insert(
            TitrationMetric::Acidity,
            ProcessWindow { min: Some(2.0), max: Some(1.0) },
        );
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_non_positive_limit() {
        let mut config = ResolverConfig::default();
        config.micro_limits.yeast = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }
}
