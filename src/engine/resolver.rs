// ==========================================
// 检验报告(CoA)系统 - 结果解析器
// ==========================================
// 职责: 批号 → 生产日期/配方 → 理化/微生物命中行 → 各指标代表值
// 流程: 解码 → 成品主数据 → 生产日期 → 理化匹配(换厂, +1 天) → 微生物匹配 → 指标提取
// 红线: 索引在解析开始前构建完毕，之后只读共享
// ==========================================

use crate::config::{MetricSelection, ResolverConfig};
use crate::domain::lot::DecodedLot;
use crate::domain::metric::{LotResolution, MatchRule, MetricResolution};
use crate::domain::types::{MicroMetric, TitrationMetric};
use crate::engine::finished_goods_index::FinishedGoodsIndex;
use crate::engine::lot_codec::{LotCodeError, LotCodec};
use crate::engine::micro_index::MicroIndex;
use crate::engine::titration_index::TitrationIndex;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

// ==========================================
// ResolutionError - 批号级错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error(transparent)]
    Parse(#[from] LotCodeError),

    #[error("成品主数据中不存在产品代码: {product_code}")]
    UnknownProduct { product_code: String },
}

// ==========================================
// IndexSnapshot - 加载屏障后的只读索引集合
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    pub finished_goods: FinishedGoodsIndex,
    pub titration: TitrationIndex,
    pub micro: MicroIndex,
}

impl IndexSnapshot {
    pub fn new(
        finished_goods: FinishedGoodsIndex,
        titration: TitrationIndex,
        micro: MicroIndex,
    ) -> Self {
        Self {
            finished_goods,
            titration,
            micro,
        }
    }
}

/// 微生物查询方式
#[derive(Debug, Clone, Copy)]
enum MicroQuery<'a> {
    Standard,
    Supplier(&'a str),
}

// ==========================================
// ResultResolver - 结果解析器
// ==========================================
#[derive(Debug, Clone)]
pub struct ResultResolver {
    snapshot: Arc<IndexSnapshot>,
    next_day_fallback: bool,
    metrics: MetricSelection,
}

impl ResultResolver {
    pub fn new(snapshot: Arc<IndexSnapshot>, config: &ResolverConfig) -> Self {
        Self {
            snapshot,
            next_day_fallback: config.next_day_fallback,
            metrics: config.metrics.clone(),
        }
    }

    /// 解析批号（标准报告路径）
    #[instrument(skip(self))]
    pub fn resolve(&self, lot_code: &str) -> Result<LotResolution, ResolutionError> {
        self.resolve_with(lot_code, MicroQuery::Standard)
    }

    /// 解析批号（内部报告路径: 微生物按供应商匹配）
    #[instrument(skip(self))]
    pub fn resolve_internal(
        &self,
        lot_code: &str,
        supplier: &str,
    ) -> Result<LotResolution, ResolutionError> {
        self.resolve_with(lot_code, MicroQuery::Supplier(supplier))
    }

    fn resolve_with(
        &self,
        lot_code: &str,
        micro_query: MicroQuery<'_>,
    ) -> Result<LotResolution, ResolutionError> {
        // 1. 解码批号
        let lot = LotCodec::decode(lot_code).map_err(|e| {
            warn!(lot_code, error = %e, "批号解码失败");
            e
        })?;

        // 2. 成品主数据
        let record = self
            .snapshot
            .finished_goods
            .get(&lot.product_code)
            .ok_or_else(|| {
                warn!(product_code = %lot.product_code, "成品主数据缺失");
                ResolutionError::UnknownProduct {
                    product_code: lot.product_code.clone(),
                }
            })?;

        // 3. 生产日期
        let manufacture_date = LotCodec::manufacture_date(&lot.raw_expiry, record.days_to_expiry)?;

        // 4. 理化匹配
        let (titration_indices, titration_rule) =
            self.find_titration(&record.recipe_code, manufacture_date, &lot);

        // 5. 微生物匹配（无回退）
        let micro_indices = match micro_query {
            MicroQuery::Standard => self.snapshot.micro.matching_indices(
                &record.recipe_code,
                &lot.product_code,
                manufacture_date,
                &lot.factory_code,
            ),
            MicroQuery::Supplier(supplier) => self.snapshot.micro.matching_indices_by_supplier(
                &lot.product_code,
                manufacture_date,
                supplier,
            ),
        };

        // 6. 指标提取
        let titration: BTreeMap<TitrationMetric, MetricResolution> = self
            .metrics
            .titration
            .iter()
            .map(|&metric| {
                let resolution = if titration_indices.is_empty() {
                    MetricResolution::SearchError
                } else {
                    MetricResolution::Resolved(
                        self.snapshot
                            .titration
                            .extract_metric(&titration_indices, metric),
                    )
                };
                (metric, resolution)
            })
            .collect();

        let micro: BTreeMap<MicroMetric, MetricResolution> = self
            .metrics
            .micro
            .iter()
            .map(|&metric| {
                let resolution = if micro_indices.is_empty() {
                    MetricResolution::SearchError
                } else {
                    MetricResolution::Resolved(
                        self.snapshot.micro.extract_metric(&micro_indices, metric),
                    )
                };
                (metric, resolution)
            })
            .collect();

        debug!(
            lot_code = %lot.lot_code,
            manufacture_date = %manufacture_date,
            titration_rows = titration_indices.len(),
            micro_rows = micro_indices.len(),
            rule = ?titration_rule,
            "批号解析完成"
        );

        Ok(LotResolution {
            product_name: record.product_name.clone(),
            recipe_code: record.recipe_code.clone(),
            manufacture_date,
            titration_rule,
            titration_rows: titration_indices.len(),
            micro_rows: micro_indices.len(),
            titration,
            micro,
            lot,
        })
    }

    /// 理化匹配: 先精确（含换厂），再以生产日期 +1 天重试
    fn find_titration(
        &self,
        recipe_code: &str,
        manufacture_date: NaiveDate,
        lot: &DecodedLot,
    ) -> (Vec<usize>, MatchRule) {
        let titration = &self.snapshot.titration;

        let found = titration.find_matches(recipe_code, manufacture_date, &lot.factory_code);
        if !found.indices.is_empty() {
            let rule = match found.swapped_to {
                Some(_) => MatchRule::FactorySwap,
                None => MatchRule::Exact,
            };
            return (found.indices, rule);
        }

        if !self.next_day_fallback {
            return (Vec::new(), MatchRule::NoMatch);
        }

        let Some(next_day) = manufacture_date.checked_add_signed(Duration::days(1)) else {
            return (Vec::new(), MatchRule::NoMatch);
        };
        let found = titration.find_matches(recipe_code, next_day, &lot.factory_code);
        if found.indices.is_empty() {
            debug!(lot_code = %lot.lot_code, "理化回退后仍无命中");
            return (Vec::new(), MatchRule::NoMatch);
        }
        let rule = match found.swapped_to {
            Some(_) => MatchRule::NextDayFactorySwap,
            None => MatchRule::NextDay,
        };
        (found.indices, rule)
    }
}
