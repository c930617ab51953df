// ==========================================
// 检验报告(CoA)系统 - 理化检验索引
// ==========================================
// 职责: 按 配方/生产日期/工厂 匹配理化行 + 指标提取与代表值选取
// 回退: 零命中时 H1 ↔ L1 换厂重试一次（S1 不换）
//       生产日期 +1 天的回退由调用方负责
// ==========================================

use crate::config::ProcessWindow;
use crate::domain::metric::{MetricValue, ResolvedMetric};
use crate::domain::rows::{RawReading, TitrationRow};
use crate::domain::types::{FactoryCode, TitrationMetric};
use crate::engine::cell_value::CellValue;
use crate::engine::date_text::{date_forms, matches_date};
use crate::engine::representative::{nearest_to_mean, RepresentativePolicy};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// 普通理化读数
pub(crate) fn parse_decimal_cell(cell: &str) -> CellValue<f64> {
    match cell {
        "*" => CellValue::NotTested,
        "" => CellValue::Blank,
        text => match text.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Value(value),
            _ => CellValue::Anomalous(text.to_string()),
        },
    }
}

/// 水分活度读数（跨两格）
///
/// # 规则
/// - 任一格为 "*" → 未检测
/// - 整数部分以 "1" 开头 → 最大值 1.0
/// - 两格拼接后整数部分只能为空或 "0"，且小数必须恰好 3 位
pub(crate) fn parse_water_activity(whole: &str, fraction: &str) -> CellValue<f64> {
    if whole == "*" || fraction == "*" {
        return CellValue::NotTested;
    }
    if whole.is_empty() && fraction.is_empty() {
        return CellValue::Blank;
    }
    if whole.starts_with('1') {
        return CellValue::Value(1.0);
    }

    let joined = if whole.contains('.') {
        format!("{}{}", whole, fraction)
    } else {
        format!("{}.{}", whole, fraction)
    };
    let anomalous = || CellValue::Anomalous(format!("{},{}", whole, fraction));

    let Some((int_part, frac_part)) = joined.split_once('.') else {
        return anomalous();
    };
    if !(int_part.is_empty() || int_part == "0") {
        return anomalous();
    }
    if frac_part.len() != 3 || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return anomalous();
    }
    match frac_part.parse::<u32>() {
        Ok(thousandths) => CellValue::Value(f64::from(thousandths) / 1000.0),
        Err(_) => anomalous(),
    }
}

// ==========================================
// TitrationMatch - 匹配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitrationMatch {
    pub indices: Vec<usize>,
    pub swapped_to: Option<FactoryCode>, // 命中来自换厂回退时为换后工厂
}

// ==========================================
// TitrationIndex - 理化检验索引
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct TitrationIndex {
    rows: Vec<TitrationRow>,
    limits: BTreeMap<TitrationMetric, ProcessWindow>,
}

impl TitrationIndex {
    pub fn new(rows: Vec<TitrationRow>) -> Self {
        Self {
            rows,
            limits: BTreeMap::new(),
        }
    }

    /// 设置理化过程窗口（未设置的指标视为合格）
    pub fn with_limits(mut self, limits: BTreeMap<TitrationMetric, ProcessWindow>) -> Self {
        self.limits = limits;
        self
    }

    pub fn rows(&self) -> &[TitrationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 匹配理化行（含换厂回退）
    pub fn matching_indices(
        &self,
        recipe_code: &str,
        manufacture_date: NaiveDate,
        factory_code: &FactoryCode,
    ) -> Vec<usize> {
        self.find_matches(recipe_code, manufacture_date, factory_code).indices
    }

    /// 匹配理化行，并报告是否使用了换厂回退
    #[instrument(skip(self), fields(rows = self.rows.len()))]
    pub fn find_matches(
        &self,
        recipe_code: &str,
        manufacture_date: NaiveDate,
        factory_code: &FactoryCode,
    ) -> TitrationMatch {
        let indices = self.exact_indices(recipe_code, manufacture_date, factory_code);
        if !indices.is_empty() {
            return TitrationMatch {
                indices,
                swapped_to: None,
            };
        }

        match factory_code.swap_partner() {
            Some(partner) => {
                let indices = self.exact_indices(recipe_code, manufacture_date, &partner);
                debug!(
                    from = %factory_code,
                    to = %partner,
                    hits = indices.len(),
                    "理化零命中，换厂重试"
                );
                let swapped_to = (!indices.is_empty()).then_some(partner);
                TitrationMatch { indices, swapped_to }
            }
            None => TitrationMatch {
                indices: Vec::new(),
                swapped_to: None,
            },
        }
    }

    fn exact_indices(
        &self,
        recipe_code: &str,
        manufacture_date: NaiveDate,
        factory_code: &FactoryCode,
    ) -> Vec<usize> {
        let forms = date_forms(manufacture_date);
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.factory_code == *factory_code
                    && row.recipe_code == recipe_code
                    && matches_date(&row.date_text, &forms)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// 提取指标并选取代表值（最接近均值）
    ///
    /// # 规则
    /// - 遍历命中行的全部读数块
    /// - "*" 与空单元格跳过；非数值读数记为异常，不参与计算
    /// - 无数值读数时代表值为 None（显示 "N/A"）
    pub fn extract_metric(&self, indices: &[usize], metric: TitrationMetric) -> ResolvedMetric {
        let mut raw_candidates = Vec::new();
        let mut numbers = Vec::new();
        let mut anomalies = Vec::new();

        let blocks = indices
            .iter()
            .filter_map(|&i| self.rows.get(i))
            .flat_map(|row| row.blocks.iter());

        for block in blocks {
            let Some(reading) = block.reading(metric) else {
                continue;
            };
            let (raw, parsed) = match reading {
                RawReading::Cell(cell) => (cell.clone(), parse_decimal_cell(cell)),
                RawReading::SplitDecimal { whole, fraction } => (
                    format!("{},{}", whole, fraction),
                    parse_water_activity(whole, fraction),
                ),
            };
            match parsed {
                CellValue::NotTested | CellValue::Blank => {}
                CellValue::Value(value) => {
                    raw_candidates.push(raw);
                    numbers.push(value);
                }
                CellValue::Anomalous(text) => {
                    raw_candidates.push(raw);
                    anomalies.push(text);
                }
            }
        }

        if !anomalies.is_empty() {
            debug!(metric = %metric, anomalies = ?anomalies, "理化读数存在异常值");
        }

        let representative = nearest_to_mean(&numbers);
        let is_in_spec = representative.map_or(false, |v| self.is_in_spec(v, metric));

        debug!(
            metric = %metric,
            policy = %RepresentativePolicy::NearestToMean,
            candidates = raw_candidates.len(),
            representative = ?representative,
            "理化代表值选取完成"
        );

        ResolvedMetric {
            raw_candidates,
            numeric_values: numbers.into_iter().map(MetricValue::Decimal).collect(),
            representative: representative.map(MetricValue::Decimal),
            is_in_spec,
            has_anomalous_input: !anomalies.is_empty(),
            anomalies,
        }
    }

    /// 理化读数是否在过程窗口内
    pub fn is_in_spec(&self, value: f64, metric: TitrationMetric) -> bool {
        self.limits
            .get(&metric)
            .map_or(true, |window| window.contains(value))
    }
}
