// ==========================================
// 检验报告(CoA)系统 - 批号领域模型
// ==========================================
// 职责: 批号解码结果 + 到期日原始字段
// 红线: 不含解码逻辑（见 engine::lot_codec）
// ==========================================

use crate::domain::types::FactoryCode;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ==========================================
// RawExpiry - 批号中的到期日 (MMDDYY)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawExpiry {
    pub month: u32,
    pub day: u32,
    pub year_2d: u32, // 两位年份, 解释为 2000 + YY
}

impl RawExpiry {
    /// 转为日历日期；月/日非法时返回 None（不做修正）
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2000 + self.year_2d as i32, self.month, self.day)
    }

    /// 从日历日期构造（仅 2000-2099 可表示）
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        let year = date.year();
        if !(2000..=2099).contains(&year) {
            return None;
        }
        Some(Self {
            month: date.month(),
            day: date.day(),
            year_2d: (year - 2000) as u32,
        })
    }

    /// 渲染为 MMDDYY
    pub fn to_mmddyy(&self) -> String {
        format!("{:02}{:02}{:02}", self.month, self.day, self.year_2d)
    }
}

// ==========================================
// DecodedLot - 批号解码结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedLot {
    pub lot_code: String,          // 去空白后的批号
    pub product_code: String,      // 第 1-5 位
    pub location_code: String,     // 第 6-7 位
    pub factory_code: FactoryCode, // 由地点代码映射
    pub site_name: String,         // 工厂名称（未登记时为原始地点代码）
    pub raw_expiry: RawExpiry,     // 第 8-13 位
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_expiry_to_date() {
        let expiry = RawExpiry { month: 1, day: 15, year_2d: 24 };
        assert_eq!(expiry.to_date(), NaiveDate::from_ymd_opt(2024, 1, 15));

        let invalid = RawExpiry { month: 13, day: 40, year_2d: 24 };
        assert_eq!(invalid.to_date(), None);

        // 非闰年 2 月 29 日
        let feb = RawExpiry { month: 2, day: 29, year_2d: 23 };
        assert_eq!(feb.to_date(), None);
    }

    #[test]
    fn test_raw_expiry_from_date_out_of_range() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(RawExpiry::from_date(date), None);

        let date = NaiveDate::from_ymd_opt(2007, 3, 9).unwrap();
        assert_eq!(RawExpiry::from_date(date).unwrap().to_mmddyy(), "030907");
    }
}
