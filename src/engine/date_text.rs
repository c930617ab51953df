// ==========================================
// 检验报告(CoA)系统 - 导出日期文本匹配
// ==========================================
// 导出文件中的日期以 M/d/yyyy 或 M/d/yy 文本出现，按文本比较
// ==========================================

use chrono::{Datelike, NaiveDate};

/// 日期的两种导出写法: (M/d/yyyy, M/d/yy)
pub fn date_forms(date: NaiveDate) -> (String, String) {
    let long = format!("{}/{}/{}", date.month(), date.day(), date.year());
    let short = format!(
        "{}/{}/{:02}",
        date.month(),
        date.day(),
        date.year().rem_euclid(100)
    );
    (long, short)
}

/// 文本是否为该日期的任一写法
pub fn matches_date(text: &str, forms: &(String, String)) -> bool {
    text == forms.0 || text == forms.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_forms() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let forms = date_forms(date);
        assert_eq!(forms.0, "1/5/2024");
        assert_eq!(forms.1, "1/5/24");

        let date = NaiveDate::from_ymd_opt(2009, 11, 23).unwrap();
        assert_eq!(date_forms(date).1, "11/23/09");
    }

    #[test]
    fn test_matches_date() {
        let forms = date_forms(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(matches_date("1/5/2024", &forms));
        assert!(matches_date("1/5/24", &forms));
        assert!(!matches_date("01/05/2024", &forms));
        assert!(!matches_date("1/6/2024", &forms));
    }
}
