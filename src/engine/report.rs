// ==========================================
// 检验报告(CoA)系统 - 报告记录
// ==========================================
// 职责: 解析结果 → 渲染器可直接输出的 (批号, 指标) 记录
// 红线: 显示文本必须与下游约定完全一致
//       "N/A" / "Search error" / "<10" / "<100"
// ==========================================

use crate::config::MetricSelection;
use crate::domain::metric::{
    LotResolution, MatchRule, MetricResolution, MetricValue, ResolvedMetric,
};
use crate::domain::types::{FactoryCode, MicroMetric, TitrationMetric};
use crate::engine::batch::{BatchResult, OrderResolution};
use crate::engine::resolver::ResolutionError;
use chrono::NaiveDate;
use serde::Serialize;

pub const NOT_AVAILABLE: &str = "N/A";
pub const SEARCH_ERROR: &str = "Search error";
pub const PARSE_ERROR: &str = "Parse error";
pub const DETECTION_LIMIT: &str = "<10";
pub const AEROBIC_DETECTION_LIMIT: &str = "<100";

// ==========================================
// MetricStatus - 指标状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricStatus {
    Resolved,
    NotFound,
    SearchError,
    ParseError,
}

/// 数值或显示文本
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Number(MetricValue),
    Text(String),
}

impl ReportValue {
    fn text(s: &str) -> Self {
        ReportValue::Text(s.to_string())
    }
}

// ==========================================
// MetricReport - 单指标报告记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReport {
    pub metric: String,
    pub status: MetricStatus,
    pub value: ReportValue,
    pub is_in_spec: Option<bool>,
    pub comment: Option<String>,
}

impl MetricReport {
    /// 理化指标记录
    pub fn from_titration(metric: TitrationMetric, resolution: &MetricResolution) -> Self {
        match resolution {
            MetricResolution::SearchError => Self::search_error(metric.to_string()),
            MetricResolution::Resolved(resolved) => {
                let value = match resolved.representative {
                    Some(v) => ReportValue::Number(v),
                    None => ReportValue::text(NOT_AVAILABLE),
                };
                Self::resolved(metric.to_string(), resolved, value)
            }
        }
    }

    /// 微生物指标记录
    ///
    /// # 规则
    /// - 代表值为 0 且合格时显示检出限: 非 H1 工厂的需氧菌为 "<100"，其余为 "<10"
    pub fn from_micro(
        metric: MicroMetric,
        resolution: &MetricResolution,
        factory_code: &FactoryCode,
    ) -> Self {
        match resolution {
            MetricResolution::SearchError => Self::search_error(metric.to_string()),
            MetricResolution::Resolved(resolved) => {
                let value = match resolved.representative {
                    None => ReportValue::text(NOT_AVAILABLE),
                    Some(MetricValue::Count(0)) if resolved.is_in_spec => {
                        if metric == MicroMetric::Aerobic && *factory_code != FactoryCode::H1 {
                            ReportValue::text(AEROBIC_DETECTION_LIMIT)
                        } else {
                            ReportValue::text(DETECTION_LIMIT)
                        }
                    }
                    Some(v) => ReportValue::Number(v),
                };
                Self::resolved(metric.to_string(), resolved, value)
            }
        }
    }

    /// 批号无法解码时的指标记录
    pub fn parse_error(metric: impl ToString, message: &str) -> Self {
        Self {
            metric: metric.to_string(),
            status: MetricStatus::ParseError,
            value: ReportValue::text(PARSE_ERROR),
            is_in_spec: None,
            comment: Some(message.to_string()),
        }
    }

    fn search_error(metric: String) -> Self {
        Self {
            metric,
            status: MetricStatus::SearchError,
            value: ReportValue::text(SEARCH_ERROR),
            is_in_spec: None,
            comment: None,
        }
    }

    fn resolved(metric: String, resolved: &ResolvedMetric, value: ReportValue) -> Self {
        let status = if resolved.representative.is_some() {
            MetricStatus::Resolved
        } else {
            MetricStatus::NotFound
        };
        let is_in_spec = resolved.representative.map(|_| resolved.is_in_spec);
        let comment = resolved
            .has_anomalous_input
            .then(|| anomaly_comment(&resolved.anomalies));
        Self {
            metric,
            status,
            value,
            is_in_spec,
            comment,
        }
    }
}

/// 异常读数提示
pub fn anomaly_comment(anomalies: &[String]) -> String {
    format!("Anomalous reading(s) ignored: {}", anomalies.join(", "))
}

// ==========================================
// LotReport - 单批号报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotReport {
    pub lot_code: String,
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    pub recipe_product: Option<String>,
    pub site_name: Option<String>,
    pub manufacture_date: Option<NaiveDate>,
    pub titration_rule: Option<MatchRule>,
    pub error: Option<String>,
    pub metrics: Vec<MetricReport>,
}

impl LotReport {
    pub fn from_resolution(resolution: &LotResolution) -> Self {
        let factory = &resolution.lot.factory_code;
        let metrics = resolution
            .titration
            .iter()
            .map(|(&metric, r)| MetricReport::from_titration(metric, r))
            .chain(
                resolution
                    .micro
                    .iter()
                    .map(|(&metric, r)| MetricReport::from_micro(metric, r, factory)),
            )
            .collect();

        Self {
            lot_code: resolution.lot.lot_code.clone(),
            product_code: Some(resolution.lot.product_code.clone()),
            product_name: Some(resolution.product_name.clone()),
            recipe_product: Some(resolution.recipe_product_pair()),
            site_name: Some(resolution.lot.site_name.clone()),
            manufacture_date: Some(resolution.manufacture_date),
            titration_rule: Some(resolution.titration_rule),
            error: None,
            metrics,
        }
    }

    /// 批号级失败
    ///
    /// 解码失败时每个请求指标记为 ParseError；未知产品只在批号级标记
    pub fn from_error(
        lot_code: &str,
        error: &ResolutionError,
        titration: &[TitrationMetric],
        micro: &[MicroMetric],
    ) -> Self {
        let message = error.to_string();
        let (product_code, metrics) = match error {
            ResolutionError::Parse(_) => (
                None,
                titration
                    .iter()
                    .map(|m| MetricReport::parse_error(m, &message))
                    .chain(micro.iter().map(|m| MetricReport::parse_error(m, &message)))
                    .collect(),
            ),
            ResolutionError::UnknownProduct { product_code } => {
                (Some(product_code.clone()), Vec::new())
            }
        };

        Self {
            lot_code: lot_code.to_string(),
            product_code,
            product_name: None,
            recipe_product: None,
            site_name: None,
            manufacture_date: None,
            titration_rule: None,
            error: Some(message),
            metrics,
        }
    }
}

// ==========================================
// OrderReport - 单销售订单报告（一份输出文档）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReport {
    pub batch_id: String,
    pub order_id: String,
    pub error: Option<String>,
    pub lots: Vec<LotReport>,
}

impl OrderReport {
    pub fn from_resolution(
        batch_id: &str,
        order: &OrderResolution,
        metrics: &MetricSelection,
    ) -> Self {
        let (error, lots) = match &order.outcome {
            Ok(outcomes) => (
                None,
                outcomes
                    .iter()
                    .map(|outcome| match &outcome.result {
                        Ok(resolution) => LotReport::from_resolution(resolution),
                        Err(e) => LotReport::from_error(
                            &outcome.lot_code,
                            e,
                            &metrics.titration,
                            &metrics.micro,
                        ),
                    })
                    .collect(),
            ),
            Err(e) => (Some(e.to_string()), Vec::new()),
        };

        Self {
            batch_id: batch_id.to_string(),
            order_id: order.order_id.clone(),
            error,
            lots,
        }
    }

    /// 批量结果 → 按订单顺序的报告
    pub fn from_batch(batch: &BatchResult, metrics: &MetricSelection) -> Vec<Self> {
        batch
            .orders
            .iter()
            .map(|order| Self::from_resolution(&batch.batch_id, order, metrics))
            .collect()
    }
}
