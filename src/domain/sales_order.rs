// ==========================================
// 检验报告(CoA)系统 - 销售订单
// ==========================================

use serde::{Deserialize, Serialize};

/// 一个销售订单对应一份输出文档
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub order_id: String,
    pub lot_codes: Vec<String>, // 清单中的出现顺序
}

impl SalesOrder {
    pub fn new(order_id: impl Into<String>, lot_codes: Vec<String>) -> Self {
        Self {
            order_id: order_id.into(),
            lot_codes,
        }
    }
}
