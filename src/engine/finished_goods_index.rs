// ==========================================
// 检验报告(CoA)系统 - 成品主数据索引
// ==========================================
// 职责: 产品代码 → 产品名称 / 配方代码 / 保质期天数
// 红线: 重复产品代码不拒绝，先出现者生效（后者被遮蔽）
// ==========================================

use crate::domain::finished_goods::FinishedGoodsRecord;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct FinishedGoodsIndex {
    records: HashMap<String, FinishedGoodsRecord>,
    shadowed: usize,
}

impl FinishedGoodsIndex {
    /// 按加载顺序建立索引
    pub fn new(records: impl IntoIterator<Item = FinishedGoodsRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            match index.records.entry(record.product_code.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(_) => {
                    warn!(product_code = %record.product_code, "成品主数据重复，已被首条记录遮蔽");
                    index.shadowed += 1;
                }
            }
        }
        index
    }

    pub fn get(&self, product_code: &str) -> Option<&FinishedGoodsRecord> {
        self.records.get(product_code)
    }

    pub fn product_name(&self, product_code: &str) -> Option<&str> {
        self.get(product_code).map(|r| r.product_name.as_str())
    }

    pub fn recipe_code(&self, product_code: &str) -> Option<&str> {
        self.get(product_code).map(|r| r.recipe_code.as_str())
    }

    pub fn days_to_expiry(&self, product_code: &str) -> Option<i64> {
        self.get(product_code).map(|r| r.days_to_expiry)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 被遮蔽的重复记录数
    pub fn shadowed(&self) -> usize {
        self.shadowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, name: &str, days: i64, recipe: &str) -> FinishedGoodsRecord {
        FinishedGoodsRecord {
            product_code: code.to_string(),
            product_name: name.to_string(),
            days_to_expiry: days,
            recipe_code: recipe.to_string(),
        }
    }

    #[test]
    fn test_lookup() {
        let index = FinishedGoodsIndex::new(vec![
            record("AB123", "Ranch", 180, "R-77"),
            record("CD456", "Caesar", 90, "R-12"),
        ]);
        assert_eq!(index.product_name("AB123"), Some("Ranch"));
        assert_eq!(index.recipe_code("CD456"), Some("R-12"));
        assert_eq!(index.days_to_expiry("CD456"), Some(90));
        assert_eq!(index.recipe_code("ZZ999"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_first_match_wins() {
        let index = FinishedGoodsIndex::new(vec![
            record("AB123", "Ranch", 180, "R-77"),
            record("AB123", "Ranch v2", 120, "R-78"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.shadowed(), 1);
        assert_eq!(index.recipe_code("AB123"), Some("R-77"));
        assert_eq!(index.days_to_expiry("AB123"), Some(180));
    }
}
