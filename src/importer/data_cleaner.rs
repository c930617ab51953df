// ==========================================
// 检验报告(CoA)系统 - 单元格清洗器
// ==========================================
// 职责: TRIM / 不可见字符清理 / 空行判定 / Excel 日期单元格 → 导出文本
// ==========================================

use chrono::{Datelike, NaiveDate};

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗单元格文本
    ///
    /// - 去除 BOM、不间断空格
    /// - 首尾 TRIM
    pub fn clean_cell(&self, value: &str) -> String {
        value
            .replace('\u{feff}', "")
            .replace('\u{a0}', " ")
            .trim()
            .to_string()
    }

    /// 清洗整行
    pub fn clean_row<I, S>(&self, cells: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        cells.into_iter().map(|c| self.clean_cell(c.as_ref())).collect()
    }

    /// 全部单元格为空的行
    pub fn is_blank_row(&self, cells: &[String]) -> bool {
        cells.iter().all(|c| c.is_empty())
    }

    /// 空串 → None
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 日期单元格按导出文件的 M/d/yyyy 写法输出
    pub fn export_date_text(&self, date: NaiveDate) -> String {
        format!("{}/{}/{}", date.month(), date.day(), date.year())
    }
}
