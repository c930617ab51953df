// ==========================================
// 检验报告(CoA)系统 - 批量解析
// ==========================================
// 职责: 每个销售订单一个阻塞工作任务，共享同一份只读索引快照
// 红线: 结果顺序与输入订单顺序一致；单个订单失败不影响其他订单
// ==========================================

use crate::domain::metric::LotResolution;
use crate::domain::sales_order::SalesOrder;
use crate::engine::resolver::{ResolutionError, ResultResolver};
use crate::perf::PerfGuard;
use futures::future::join_all;
use thiserror::Error;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("订单 {order_id} 解析任务失败: {message}")]
    WorkerFailed { order_id: String, message: String },
}

/// 单批号解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct LotOutcome {
    pub lot_code: String,
    pub result: Result<LotResolution, ResolutionError>,
}

/// 单订单解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct OrderResolution {
    pub order_id: String,
    pub outcome: Result<Vec<LotOutcome>, BatchError>,
}

/// 一次批量解析的结果
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub batch_id: String,
    pub orders: Vec<OrderResolution>,
}

impl BatchResult {
    pub fn lot_count(&self) -> usize {
        self.orders
            .iter()
            .filter_map(|o| o.outcome.as_ref().ok())
            .map(Vec::len)
            .sum()
    }

    pub fn failed_orders(&self) -> usize {
        self.orders.iter().filter(|o| o.outcome.is_err()).count()
    }
}

// ==========================================
// BatchResolver - 批量解析器
// ==========================================
#[derive(Debug, Clone)]
pub struct BatchResolver {
    resolver: ResultResolver,
}

impl BatchResolver {
    pub fn new(resolver: ResultResolver) -> Self {
        Self { resolver }
    }

    /// 并发解析全部销售订单
    ///
    /// # 参数
    /// - supplier: 给定时走内部报告路径（微生物按供应商匹配）
    #[instrument(skip(self, orders), fields(orders = orders.len()))]
    pub async fn resolve_orders(
        &self,
        orders: Vec<SalesOrder>,
        supplier: Option<String>,
    ) -> BatchResult {
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, "开始批量解析");

        let handles: Vec<_> = orders
            .into_iter()
            .map(|order| {
                let resolver = self.resolver.clone();
                let supplier = supplier.clone();
                let order_id = order.order_id.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    resolve_order(&resolver, &order, supplier.as_deref())
                });
                (order_id, handle)
            })
            .collect();

        let (order_ids, handles): (Vec<String>, Vec<_>) = handles.into_iter().unzip();
        let joined = join_all(handles).await;

        let orders: Vec<OrderResolution> = order_ids
            .into_iter()
            .zip(joined)
            .map(|(order_id, joined)| {
                let outcome = joined.map_err(|e| {
                    error!(order_id = %order_id, error = %e, "订单解析任务失败");
                    BatchError::WorkerFailed {
                        order_id: order_id.clone(),
                        message: e.to_string(),
                    }
                });
                OrderResolution { order_id, outcome }
            })
            .collect();

        let result = BatchResult { batch_id, orders };
        info!(
            batch_id = %result.batch_id,
            lots = result.lot_count(),
            failed_orders = result.failed_orders(),
            "批量解析完成"
        );
        result
    }
}

fn resolve_order(
    resolver: &ResultResolver,
    order: &SalesOrder,
    supplier: Option<&str>,
) -> Vec<LotOutcome> {
    let mut perf = PerfGuard::new("resolve_order");
    perf.add_items(order.lot_codes.len());

    order
        .lot_codes
        .iter()
        .map(|lot_code| {
            let result = match supplier {
                Some(supplier) => resolver.resolve_internal(lot_code, supplier),
                None => resolver.resolve(lot_code),
            };
            LotOutcome {
                lot_code: lot_code.clone(),
                result,
            }
        })
        .collect()
}
