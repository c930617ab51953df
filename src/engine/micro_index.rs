// ==========================================
// 检验报告(CoA)系统 - 微生物检验索引
// ==========================================
// 职责: 按 工厂/配方/产品/生产日期 匹配微生物行 + 计数提取与代表值选取
// 红线: 微生物匹配没有换厂回退（与理化不对称，保持现状）
// ==========================================

use crate::config::MicroLimits;
use crate::domain::metric::{MetricValue, ResolvedMetric};
use crate::domain::rows::MicroRow;
use crate::domain::types::{FactoryCode, MicroMetric};
use crate::engine::cell_value::CellValue;
use crate::engine::date_text::{date_forms, matches_date};
use crate::engine::representative::{worst_case_in_spec, RepresentativePolicy};
use chrono::NaiveDate;
use tracing::{debug, instrument};

/// 微生物计数单元格（计数不可能为负，负数按异常读数处理）
pub(crate) fn parse_count_cell(cell: &str) -> CellValue<i64> {
    match cell {
        "*" => CellValue::NotTested,
        "" => CellValue::Blank,
        text => match text.parse::<i64>() {
            Ok(value) if value >= 0 => CellValue::Value(value),
            _ => CellValue::Anomalous(text.to_string()),
        },
    }
}

// ==========================================
// MicroIndex - 微生物检验索引
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MicroIndex {
    rows: Vec<MicroRow>,
    limits: MicroLimits,
}

impl MicroIndex {
    pub fn new(rows: Vec<MicroRow>) -> Self {
        Self {
            rows,
            limits: MicroLimits::default(),
        }
    }

    /// 设置微生物限值
    pub fn with_limits(mut self, limits: MicroLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn rows(&self) -> &[MicroRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 主查询: 工厂、配方、产品代码全部相等，且日期为长/短写法之一
    #[instrument(skip(self), fields(rows = self.rows.len()))]
    pub fn matching_indices(
        &self,
        recipe_code: &str,
        lot_product_code: &str,
        manufacture_date: NaiveDate,
        factory_code: &FactoryCode,
    ) -> Vec<usize> {
        let forms = date_forms(manufacture_date);
        let indices = self.collect(|row| {
            row.factory_code == *factory_code
                && row.recipe_code == recipe_code
                && row.product_code == lot_product_code
                && matches_date(&row.manufacture_date_text, &forms)
        });
        debug!(hits = indices.len(), "微生物匹配完成");
        indices
    }

    /// 内部报告查询: 按供应商代替工厂/配方匹配
    #[instrument(skip(self), fields(rows = self.rows.len()))]
    pub fn matching_indices_by_supplier(
        &self,
        product_code: &str,
        manufacture_date: NaiveDate,
        supplier: &str,
    ) -> Vec<usize> {
        let forms = date_forms(manufacture_date);
        self.collect(|row| {
            row.product_code == product_code
                && row.supplier.as_deref() == Some(supplier)
                && matches_date(&row.manufacture_date_text, &forms)
        })
    }

    fn collect(&self, predicate: impl Fn(&MicroRow) -> bool) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate(row))
            .map(|(i, _)| i)
            .collect()
    }

    /// 提取计数并选取代表值（合格读数中的最大值）
    ///
    /// # 规则
    /// - 遍历命中行的全部工厂标记读数块
    /// - "*" 与空单元格跳过；非整数读数记为异常
    /// - 先筛合格读数，全部不合格时退回全部读数，再取最大值
    /// - 无读数时代表值为 None（显示 "N/A"）
    pub fn extract_metric(&self, indices: &[usize], metric: MicroMetric) -> ResolvedMetric {
        let mut raw_candidates = Vec::new();
        let mut counts = Vec::new();
        let mut anomalies = Vec::new();

        let readings = indices
            .iter()
            .filter_map(|&i| self.rows.get(i))
            .flat_map(|row| row.blocks.iter())
            .filter_map(|block| block.reading(metric));

        for cell in readings {
            match parse_count_cell(cell) {
                CellValue::NotTested | CellValue::Blank => {}
                CellValue::Value(count) => {
                    raw_candidates.push(cell.to_string());
                    counts.push(count);
                }
                CellValue::Anomalous(text) => {
                    raw_candidates.push(cell.to_string());
                    anomalies.push(text);
                }
            }
        }

        if !anomalies.is_empty() {
            debug!(metric = %metric, anomalies = ?anomalies, "微生物读数存在异常值");
        }

        let representative = worst_case_in_spec(&counts, |v| self.is_in_spec(v, metric));
        let is_in_spec = representative.map_or(false, |v| self.is_in_spec(v, metric));

        debug!(
            metric = %metric,
            policy = %RepresentativePolicy::WorstCaseInSpec,
            candidates = raw_candidates.len(),
            representative = ?representative,
            "微生物代表值选取完成"
        );

        ResolvedMetric {
            raw_candidates,
            numeric_values: counts.into_iter().map(MetricValue::Count).collect(),
            representative: representative.map(MetricValue::Count),
            is_in_spec,
            has_anomalous_input: !anomalies.is_empty(),
            anomalies,
        }
    }

    /// 计数是否合格
    pub fn is_in_spec(&self, value: i64, metric: MicroMetric) -> bool {
        self.limits.is_in_spec(metric, value)
    }
}
