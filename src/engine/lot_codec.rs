// ==========================================
// 检验报告(CoA)系统 - 批号编解码
// ==========================================
// 职责: 13 位批号 → 产品代码 / 工厂代码 / 到期日
//       到期日 + 保质期 → 生产日期
// 红线: 非法日期直接报错，不做修正
// ==========================================

use crate::domain::lot::{DecodedLot, RawExpiry};
use crate::domain::types::FactoryCode;
use chrono::{Duration, NaiveDate};
use thiserror::Error;

pub const LOT_CODE_LEN: usize = 13;

/// 地点代码 → (工厂代码, 工厂名称)
const SITE_TABLE: [(&str, FactoryCode, &str); 3] = [
    ("01", FactoryCode::S1, "Sandpoint, ID"),
    ("02", FactoryCode::L1, "Lowell, MI"),
    ("03", FactoryCode::H1, "Hurricane, UT"),
];

// ==========================================
// LotCodeError - 批号错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LotCodeError {
    #[error("批号长度错误: {lot_code}（期望 13 位，实际 {length} 位）")]
    WrongLength { lot_code: String, length: usize },

    #[error("批号到期日含非数字字符: {lot_code}（到期日段 {expiry}）")]
    NonNumericExpiry { lot_code: String, expiry: String },

    #[error("批号到期日不是有效日历日期: {expiry}")]
    InvalidCalendarDate { expiry: String },

    #[error("保质期天数超出可计算范围: {days_to_expiry}（到期日 {expiry}）")]
    ShelfLifeOutOfRange { expiry: String, days_to_expiry: i64 },
}

pub struct LotCodec;

impl LotCodec {
    /// 解码批号
    ///
    /// # 规则
    /// - 先去除所有空白字符（导出文件中常夹带空格）
    /// - 长度必须为 13
    /// - 第 8-13 位必须为数字 (MMDDYY)
    /// - 地点代码未登记时原样透传为工厂代码与工厂名称
    pub fn decode(lot_code: &str) -> Result<DecodedLot, LotCodeError> {
        let normalized: String = lot_code.chars().filter(|c| !c.is_whitespace()).collect();
        let chars: Vec<char> = normalized.chars().collect();

        if chars.len() != LOT_CODE_LEN {
            return Err(LotCodeError::WrongLength {
                length: chars.len(),
                lot_code: normalized,
            });
        }

        let product_code: String = chars[0..5].iter().collect();
        let location_code: String = chars[5..7].iter().collect();
        let expiry: String = chars[7..13].iter().collect();

        if !expiry.chars().all(|c| c.is_ascii_digit()) {
            return Err(LotCodeError::NonNumericExpiry {
                lot_code: normalized,
                expiry,
            });
        }

        let (factory_code, site_name) = Self::lookup_site(&location_code);

        Ok(DecodedLot {
            raw_expiry: Self::parse_expiry_digits(&expiry),
            lot_code: normalized,
            product_code,
            location_code,
            factory_code,
            site_name,
        })
    }

    /// 计算生产日期
    ///
    /// # 规则
    /// - 生产日期 = Date(2000+YY, MM, DD) - days_to_expiry 天
    /// - 到期日本身无效 → InvalidCalendarDate；减去保质期后越界 → ShelfLifeOutOfRange
    pub fn manufacture_date(
        raw_expiry: &RawExpiry,
        days_to_expiry: i64,
    ) -> Result<NaiveDate, LotCodeError> {
        let expiry_date = raw_expiry
            .to_date()
            .ok_or_else(|| LotCodeError::InvalidCalendarDate {
                expiry: raw_expiry.to_mmddyy(),
            })?;
        let out_of_range = || LotCodeError::ShelfLifeOutOfRange {
            expiry: raw_expiry.to_mmddyy(),
            days_to_expiry,
        };
        let shelf_life = Duration::try_days(days_to_expiry).ok_or_else(out_of_range)?;
        expiry_date
            .checked_sub_signed(shelf_life)
            .ok_or_else(out_of_range)
    }

    /// 将日期编码为批号到期日段 (MMDDYY)
    pub fn encode_expiry(date: NaiveDate) -> Option<String> {
        RawExpiry::from_date(date).map(|expiry| expiry.to_mmddyy())
    }

    fn lookup_site(location_code: &str) -> (FactoryCode, String) {
        SITE_TABLE
            .iter()
            .find(|(code, _, _)| *code == location_code)
            .map(|(_, factory, name)| (factory.clone(), name.to_string()))
            .unwrap_or_else(|| {
                (
                    FactoryCode::Other(location_code.to_string()),
                    location_code.to_string(),
                )
            })
    }

    // 调用方已保证 6 位 ASCII 数字
    fn parse_expiry_digits(expiry: &str) -> RawExpiry {
        let digit_pair = |i: usize| -> u32 {
            expiry.as_bytes()[i..i + 2]
                .iter()
                .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
        };
        RawExpiry {
            month: digit_pair(0),
            day: digit_pair(2),
            year_2d: digit_pair(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_decode_known_sites() {
        let cases = [
            ("AB12301011524", FactoryCode::S1, "Sandpoint, ID"),
            ("AB12302011524", FactoryCode::L1, "Lowell, MI"),
            ("AB12303011524", FactoryCode::H1, "Hurricane, UT"),
        ];
        for (lot_code, factory, site) in cases {
            let lot = LotCodec::decode(lot_code).unwrap();
            assert_eq!(lot.product_code, "AB123");
            assert_eq!(lot.factory_code, factory);
            assert_eq!(lot.site_name, site);
            assert_eq!(lot.raw_expiry, RawExpiry { month: 1, day: 15, year_2d: 24 });
        }
    }

    #[test]
    fn test_decode_unmapped_location_passes_through() {
        let lot = LotCodec::decode("XY99907123125").unwrap();
        assert_eq!(lot.location_code, "07");
        assert_eq!(lot.factory_code, FactoryCode::Other("07".to_string()));
        assert_eq!(lot.site_name, "07");
    }

    #[test]
    fn test_decode_strips_embedded_whitespace() {
        let lot = LotCodec::decode(" AB123 03 011524 ").unwrap();
        assert_eq!(lot.lot_code, "AB12303011524");
        assert_eq!(lot.factory_code, FactoryCode::H1);
    }

    #[test]
    fn test_decode_wrong_length() {
        let err = LotCodec::decode("AB1230301152").unwrap_err();
        assert_eq!(
            err,
            LotCodeError::WrongLength { lot_code: "AB1230301152".to_string(), length: 12 }
        );
        assert!(matches!(
            LotCodec::decode("AB123030115245"),
            Err(LotCodeError::WrongLength { length: 14, .. })
        ));
    }

    #[test]
    fn test_decode_non_numeric_expiry() {
        assert!(matches!(
            LotCodec::decode("AB12303O11524"),
            Err(LotCodeError::NonNumericExpiry { .. })
        ));
    }

    #[test]
    fn test_manufacture_date() {
        let expiry = RawExpiry { month: 1, day: 15, year_2d: 24 };
        assert_eq!(
            LotCodec::manufacture_date(&expiry, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );

        // 跨年
        assert_eq!(
            LotCodec::manufacture_date(&expiry, 365).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_manufacture_date_invalid_calendar() {
        let lot = LotCodec::decode("AB12301134024").unwrap();
        assert_eq!(
            LotCodec::manufacture_date(&lot.raw_expiry, 10),
            Err(LotCodeError::InvalidCalendarDate { expiry: "134024".to_string() })
        );
    }

    #[test]
    fn test_manufacture_date_shelf_life_out_of_range() {
        let expiry = RawExpiry { month: 1, day: 15, year_2d: 24 };
        for days in [i64::MAX, i64::MIN, 1_000_000_000_000] {
            assert_eq!(
                LotCodec::manufacture_date(&expiry, days),
                Err(LotCodeError::ShelfLifeOutOfRange {
                    expiry: "011524".to_string(),
                    days_to_expiry: days,
                })
            );
        }
    }

    #[test]
    fn test_expiry_round_trip() {
        let mut date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        while date.year() < 2100 {
            let encoded = LotCodec::encode_expiry(date).unwrap();
            let lot = LotCodec::decode(&format!("AB12301{}", encoded)).unwrap();
            assert_eq!(lot.raw_expiry.to_date(), Some(date));
            date += Duration::days(37);
        }
    }
}
