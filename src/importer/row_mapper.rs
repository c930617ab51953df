// ==========================================
// 检验报告(CoA)系统 - 行映射器
// ==========================================
// 职责: 已切分的源数据行 → 类型化行结构
//       最小列数校验、标记单元格扫描、读数块解码
// 红线: 不合格行隔离（DQ Error），截断读数块记录为 DQ Warning
// ==========================================

use crate::domain::dq::{Dataset, DqViolation};
use crate::domain::finished_goods::FinishedGoodsRecord;
use crate::domain::rows::{
    micro_offset, titration_offset, MicroReadingBlock, MicroRow, RawReading, SourceRow,
    TitrationMarker, TitrationReadingBlock, TitrationRow, MICRO_DATE_COL, MICRO_FACTORY_COL,
    MICRO_MIN_FIELDS, MICRO_PLANT_MARKERS, MICRO_PRODUCT_COL, MICRO_RECIPE_COL,
    MICRO_SUPPLIER_COL, TITRATION_DATE_COL, TITRATION_FACTORY_COL, TITRATION_JOB_COL,
    TITRATION_MIN_FIELDS, TITRATION_RECIPE_COL, WATER_ACTIVITY_FRACTION_OFFSET,
    WATER_ACTIVITY_WHOLE_OFFSET,
};
use crate::domain::types::{FactoryCode, MicroMetric, TitrationMetric};
use std::collections::BTreeMap;

/// 单行映射结果: 类型化行 + 行内警告
pub type Mapped<T> = Result<(T, Vec<DqViolation>), DqViolation>;

pub struct RowMapper;

impl RowMapper {
    // ==========================================
    // 成品主数据
    // ==========================================

    /// 映射成品主数据行 `[productCode, productName, daysToExpiry, recipeCode]`
    pub fn map_finished_goods(&self, row: &SourceRow) -> Result<FinishedGoodsRecord, DqViolation> {
        let dataset = Dataset::FinishedGoods;
        if row.fields.len() < 4 {
            return Err(DqViolation::error(
                dataset,
                row.row_number,
                "row",
                format!("列数不足: 期望 4 列，实际 {} 列", row.fields.len()),
            ));
        }

        let product_code = row.fields[0].trim();
        if product_code.is_empty() {
            return Err(DqViolation::error(
                dataset,
                row.row_number,
                "product_code",
                "产品代码为空".to_string(),
            ));
        }

        let days_text = row.fields[2].trim();
        let days_to_expiry = days_text.parse::<i64>().map_err(|_| {
            DqViolation::error(
                dataset,
                row.row_number,
                "days_to_expiry",
                format!("无法解析为整数: {}", days_text),
            )
        })?;

        Ok(FinishedGoodsRecord {
            product_code: product_code.to_string(),
            product_name: row.fields[1].trim().to_string(),
            days_to_expiry,
            recipe_code: row.fields[3].trim().to_string(),
        })
    }

    // ==========================================
    // 理化检验行
    // ==========================================

    /// 映射理化检验行
    ///
    /// # 规则
    /// - 至少 5 列（日期 / - / 工厂 / 任务号 / 配方）
    /// - 任意位置的 Original / ReTest_n / Re_Test_n 单元格开启一个读数块
    /// - 读数块中越过行尾的指标不记录读数，并给出警告
    pub fn map_titration(&self, row: &SourceRow) -> Mapped<TitrationRow> {
        let dataset = Dataset::Titration;
        if row.fields.len() < TITRATION_MIN_FIELDS {
            return Err(DqViolation::error(
                dataset,
                row.row_number,
                "row",
                format!(
                    "列数不足: 期望至少 {} 列，实际 {} 列",
                    TITRATION_MIN_FIELDS,
                    row.fields.len()
                ),
            ));
        }

        let mut warnings = Vec::new();
        let mut blocks = Vec::new();

        for (column, cell) in row.fields.iter().enumerate() {
            let Some(marker) = TitrationMarker::parse(cell.trim()) else {
                continue;
            };

            let mut readings = BTreeMap::new();
            for metric in TitrationMetric::ALL {
                match Self::titration_reading(row, column, metric) {
                    Some(reading) => {
                        readings.insert(metric, reading);
                    }
                    None => warnings.push(DqViolation::warning(
                        dataset,
                        row.row_number,
                        &metric.to_string(),
                        format!("第 {} 列标记 {} 的读数越过行尾", column + 1, cell.trim()),
                    )),
                }
            }
            blocks.push(TitrationReadingBlock { marker, column, readings });
        }

        let titration_row = TitrationRow {
            row_number: row.row_number,
            date_text: row.fields[TITRATION_DATE_COL].trim().to_string(),
            factory_code: FactoryCode::from_code(row.fields[TITRATION_FACTORY_COL].trim()),
            job_number: row.fields[TITRATION_JOB_COL].trim().to_string(),
            recipe_code: row.fields[TITRATION_RECIPE_COL].trim().to_string(),
            blocks,
        };
        Ok((titration_row, warnings))
    }

    fn titration_reading(
        row: &SourceRow,
        column: usize,
        metric: TitrationMetric,
    ) -> Option<RawReading> {
        let cell = |offset: usize| row.field(column + offset).map(|v| v.trim().to_string());
        match metric {
            // 小数部分缺失时按空串处理；整数部分必须存在
            TitrationMetric::WaterActivity => {
                let whole = cell(WATER_ACTIVITY_WHOLE_OFFSET)?;
                let fraction = cell(WATER_ACTIVITY_FRACTION_OFFSET).unwrap_or_default();
                Some(RawReading::SplitDecimal { whole, fraction })
            }
            _ => cell(titration_offset(metric)).map(RawReading::Cell),
        }
    }

    // ==========================================
    // 微生物检验行
    // ==========================================

    /// 映射微生物检验行
    ///
    /// # 规则
    /// - 至少 11 列（到产品代码为止）；供应商列（第 17 列）可缺失
    /// - 值为工厂名称的单元格开启一个读数块
    pub fn map_micro(&self, row: &SourceRow) -> Mapped<MicroRow> {
        let dataset = Dataset::Micro;
        if row.fields.len() < MICRO_MIN_FIELDS {
            return Err(DqViolation::error(
                dataset,
                row.row_number,
                "row",
                format!(
                    "列数不足: 期望至少 {} 列，实际 {} 列",
                    MICRO_MIN_FIELDS,
                    row.fields.len()
                ),
            ));
        }

        let mut warnings = Vec::new();
        let mut blocks = Vec::new();

        for (column, cell) in row.fields.iter().enumerate() {
            let plant = cell.trim();
            if !MICRO_PLANT_MARKERS.contains(&plant) {
                continue;
            }

            let mut readings = BTreeMap::new();
            for metric in MicroMetric::ALL {
                match row.field(column + micro_offset(metric)) {
                    Some(value) => {
                        readings.insert(metric, value.trim().to_string());
                    }
                    None => warnings.push(DqViolation::warning(
                        dataset,
                        row.row_number,
                        &metric.to_string(),
                        format!("第 {} 列标记 {} 的读数越过行尾", column + 1, plant),
                    )),
                }
            }
            blocks.push(MicroReadingBlock {
                plant: plant.to_string(),
                column,
                readings,
            });
        }

        let micro_row = MicroRow {
            row_number: row.row_number,
            factory_code: FactoryCode::from_code(row.fields[MICRO_FACTORY_COL].trim()),
            recipe_code: row.fields[MICRO_RECIPE_COL].trim().to_string(),
            manufacture_date_text: row.fields[MICRO_DATE_COL].trim().to_string(),
            product_code: row.fields[MICRO_PRODUCT_COL].trim().to_string(),
            supplier: row
                .field(MICRO_SUPPLIER_COL)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            blocks,
        };
        Ok((micro_row, warnings))
    }
}
