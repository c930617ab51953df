// ==========================================
// 检验报告(CoA)系统 - 指标解析结果
// ==========================================
// 职责: 每个 (批号, 指标) 查询的解析结果，创建后不可变
// ==========================================

use crate::domain::lot::DecodedLot;
use crate::domain::types::{MicroMetric, TitrationMetric};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// MetricValue - 数值读数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Decimal(f64), // 理化读数
    Count(i64),   // 微生物计数
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Decimal(v) => write!(f, "{}", v),
            MetricValue::Count(v) => write!(f, "{}", v),
        }
    }
}

// ==========================================
// ResolvedMetric - 单指标解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMetric {
    pub raw_candidates: Vec<String>,          // 扫描到的全部原始读数（不含 "*"）
    pub numeric_values: Vec<MetricValue>,     // 可解析的数值读数（扫描顺序）
    pub representative: Option<MetricValue>,  // None 即 "N/A"
    pub is_in_spec: bool,
    pub has_anomalous_input: bool,
    pub anomalies: Vec<String>,               // 非数值且非 "*" 的读数
}

// ==========================================
// MetricResolution - 指标解析状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "metric", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricResolution {
    SearchError, // 没有匹配行
    Resolved(ResolvedMetric),
}

impl MetricResolution {
    pub fn resolved(&self) -> Option<&ResolvedMetric> {
        match self {
            MetricResolution::Resolved(metric) => Some(metric),
            MetricResolution::SearchError => None,
        }
    }
}

// ==========================================
// MatchRule - 理化行命中所用规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchRule {
    Exact,
    FactorySwap,        // H1 ↔ L1 换厂
    NextDay,            // 生产日期 +1 天
    NextDayFactorySwap, // +1 天且换厂
    NoMatch,
}

// ==========================================
// LotResolution - 单批号解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotResolution {
    pub lot: DecodedLot,
    pub product_name: String,
    pub recipe_code: String,
    pub manufacture_date: NaiveDate,
    pub titration_rule: MatchRule,
    pub titration_rows: usize,
    pub micro_rows: usize,
    pub titration: BTreeMap<TitrationMetric, MetricResolution>,
    pub micro: BTreeMap<MicroMetric, MetricResolution>,
}

impl LotResolution {
    /// 配方/产品代码组合（报告中的 "配方-产品" 栏）
    pub fn recipe_product_pair(&self) -> String {
        format!("{}-{}", self.recipe_code, self.lot.product_code)
    }
}
