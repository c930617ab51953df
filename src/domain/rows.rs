// ==========================================
// 检验报告(CoA)系统 - 检验结果行模型
// ==========================================
// 职责: 理化/微生物导出行的类型化结构
// 说明: 每行在建索引时一次性解码为若干读数块（标记单元格 + 固定偏移读数），
//       之后的指标提取不再扫描原始单元格
// ==========================================

use crate::domain::types::{FactoryCode, MicroMetric, TitrationMetric};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SourceRow - 已切分的源数据行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    pub row_number: usize, // 源文件行号（1 起，含表头）
    pub fields: Vec<String>,
}

impl SourceRow {
    pub fn new(row_number: usize, fields: Vec<String>) -> Self {
        Self { row_number, fields }
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

// ==========================================
// 理化行 - 固定列位置
// ==========================================
pub const TITRATION_DATE_COL: usize = 0;
pub const TITRATION_FACTORY_COL: usize = 2;
pub const TITRATION_JOB_COL: usize = 3;
pub const TITRATION_RECIPE_COL: usize = 4;
pub const TITRATION_MIN_FIELDS: usize = TITRATION_RECIPE_COL + 1;

// 水分活度被拆分在两个相邻单元格（整数部分 / 小数部分）
pub const WATER_ACTIVITY_WHOLE_OFFSET: usize = 12;
pub const WATER_ACTIVITY_FRACTION_OFFSET: usize = 13;

/// 理化指标相对标记单元格的偏移
///
/// 水分活度返回整数部分所在偏移（小数部分在其后一格）
pub fn titration_offset(metric: TitrationMetric) -> usize {
    match metric {
        TitrationMetric::ViscosityCps => 2,
        TitrationMetric::ViscosityCm => 3,
        TitrationMetric::Salt => 4,
        TitrationMetric::Acidity => 5,
        TitrationMetric::Ph => 6,
        TitrationMetric::WaterActivity => WATER_ACTIVITY_WHOLE_OFFSET,
    }
}

// ==========================================
// 微生物行 - 固定列位置
// ==========================================
pub const MICRO_FACTORY_COL: usize = 0;
pub const MICRO_RECIPE_COL: usize = 7;
pub const MICRO_DATE_COL: usize = 9;
pub const MICRO_PRODUCT_COL: usize = 10;
pub const MICRO_SUPPLIER_COL: usize = 16;
pub const MICRO_MIN_FIELDS: usize = MICRO_PRODUCT_COL + 1;

/// 微生物标记单元格（工厂名称）
pub const MICRO_PLANT_MARKERS: [&str; 4] = ["Hurricane", "HURRICANE", "Lowell", "Sandpoint"];

/// 微生物指标相对标记单元格的偏移
pub fn micro_offset(metric: MicroMetric) -> usize {
    match metric {
        MicroMetric::EColiform => 5,
        MicroMetric::Coliform => 7,
        MicroMetric::Yeast => 9,
        MicroMetric::Mold => 11,
        MicroMetric::Lactic => 13,
        MicroMetric::Aerobic => 15,
    }
}

// ==========================================
// 理化检验标记
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitrationMarker {
    Original,
    ReTest(u8),       // ReTest_1 .. ReTest_5
    ReTestLegacy(u8), // Re_Test_1 .. Re_Test_3
}

impl TitrationMarker {
    /// 识别标记单元格；非标记返回 None
    pub fn parse(cell: &str) -> Option<Self> {
        if cell == "Original" {
            return Some(TitrationMarker::Original);
        }
        if let Some(n) = cell.strip_prefix("ReTest_").and_then(single_digit) {
            return (1..=5).contains(&n).then_some(TitrationMarker::ReTest(n));
        }
        if let Some(n) = cell.strip_prefix("Re_Test_").and_then(single_digit) {
            return (1..=3).contains(&n).then_some(TitrationMarker::ReTestLegacy(n));
        }
        None
    }
}

fn single_digit(s: &str) -> Option<u8> {
    match s.as_bytes() {
        [b @ b'0'..=b'9'] => Some(b - b'0'),
        _ => None,
    }
}

/// 原始读数单元格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawReading {
    Cell(String),
    // 小数点附近被分隔符拆开的读数
    SplitDecimal { whole: String, fraction: String },
}

// ==========================================
// 理化读数块
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitrationReadingBlock {
    pub marker: TitrationMarker,
    pub column: usize,
    pub readings: BTreeMap<TitrationMetric, RawReading>, // 行长不足的指标不出现
}

impl TitrationReadingBlock {
    pub fn reading(&self, metric: TitrationMetric) -> Option<&RawReading> {
        self.readings.get(&metric)
    }
}

// ==========================================
// 理化检验行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitrationRow {
    pub row_number: usize, // 源文件行号（1 起）
    pub date_text: String,
    pub factory_code: FactoryCode,
    pub job_number: String,
    pub recipe_code: String,
    pub blocks: Vec<TitrationReadingBlock>,
}

// ==========================================
// 微生物读数块
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroReadingBlock {
    pub plant: String,
    pub column: usize,
    pub readings: BTreeMap<MicroMetric, String>,
}

impl MicroReadingBlock {
    pub fn reading(&self, metric: MicroMetric) -> Option<&str> {
        self.readings.get(&metric).map(String::as_str)
    }
}

// ==========================================
// 微生物检验行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroRow {
    pub row_number: usize,
    pub factory_code: FactoryCode,
    pub recipe_code: String,
    pub manufacture_date_text: String,
    pub product_code: String,
    pub supplier: Option<String>, // 行长不足 17 列时缺失
    pub blocks: Vec<MicroReadingBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titration_marker_parse() {
        assert_eq!(TitrationMarker::parse("Original"), Some(TitrationMarker::Original));
        assert_eq!(TitrationMarker::parse("ReTest_1"), Some(TitrationMarker::ReTest(1)));
        assert_eq!(TitrationMarker::parse("ReTest_5"), Some(TitrationMarker::ReTest(5)));
        assert_eq!(
            TitrationMarker::parse("Re_Test_3"),
            Some(TitrationMarker::ReTestLegacy(3))
        );
    }

    #[test]
    fn test_titration_marker_rejects_out_of_range() {
        assert_eq!(TitrationMarker::parse("ReTest_6"), None);
        assert_eq!(TitrationMarker::parse("ReTest_0"), None);
        assert_eq!(TitrationMarker::parse("Re_Test_4"), None);
        assert_eq!(TitrationMarker::parse("ReTest_01"), None);
        assert_eq!(TitrationMarker::parse("original"), None);
        assert_eq!(TitrationMarker::parse(""), None);
    }
}
