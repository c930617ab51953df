// ==========================================
// 检验报告(CoA)系统 - 成品主数据
// ==========================================

use serde::{Deserialize, Serialize};

/// 成品主数据记录
///
/// 源行格式: `[productCode, productName, daysToExpiry, recipeCode]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedGoodsRecord {
    pub product_code: String,
    pub product_name: String,
    pub days_to_expiry: i64, // 保质期天数
    pub recipe_code: String,
}
