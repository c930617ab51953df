// ==========================================
// 检验报告(CoA)系统 - 领域类型定义
// ==========================================
// 职责: 工厂代码 / 理化指标 / 微生物指标枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工厂代码 (Factory Code)
// ==========================================
// 由批号第 6-7 位派生; 未登记的地点代码原样透传
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactoryCode {
    S1,            // Sandpoint, ID
    L1,            // Lowell, MI
    H1,            // Hurricane, UT
    Other(String), // 未登记地点
}

impl FactoryCode {
    /// 按导出文件中的文本解析工厂代码
    pub fn from_code(code: &str) -> Self {
        match code {
            "S1" => FactoryCode::S1,
            "L1" => FactoryCode::L1,
            "H1" => FactoryCode::H1,
            other => FactoryCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FactoryCode::S1 => "S1",
            FactoryCode::L1 => "L1",
            FactoryCode::H1 => "H1",
            FactoryCode::Other(code) => code,
        }
    }

    /// 理化检验的换厂回退对象
    ///
    /// # 规则
    /// - H1 ↔ L1 互换
    /// - S1 及未登记地点无回退对象
    pub fn swap_partner(&self) -> Option<FactoryCode> {
        match self {
            FactoryCode::H1 => Some(FactoryCode::L1),
            FactoryCode::L1 => Some(FactoryCode::H1),
            FactoryCode::S1 | FactoryCode::Other(_) => None,
        }
    }
}

impl fmt::Display for FactoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 理化指标 (Titration Metric)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitrationMetric {
    Acidity,       // 酸度
    ViscosityCps,  // 粘度 (cps)
    ViscosityCm,   // 粘度 (cm)
    Salt,          // 盐分
    Ph,            // pH
    WaterActivity, // 水分活度
}

impl TitrationMetric {
    pub const ALL: [TitrationMetric; 6] = [
        TitrationMetric::Acidity,
        TitrationMetric::ViscosityCps,
        TitrationMetric::ViscosityCm,
        TitrationMetric::Salt,
        TitrationMetric::Ph,
        TitrationMetric::WaterActivity,
    ];
}

impl fmt::Display for TitrationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitrationMetric::Acidity => write!(f, "ACIDITY"),
            TitrationMetric::ViscosityCps => write!(f, "VISCOSITY_CPS"),
            TitrationMetric::ViscosityCm => write!(f, "VISCOSITY_CM"),
            TitrationMetric::Salt => write!(f, "SALT"),
            TitrationMetric::Ph => write!(f, "PH"),
            TitrationMetric::WaterActivity => write!(f, "WATER_ACTIVITY"),
        }
    }
}

// ==========================================
// 微生物指标 (Micro Metric)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MicroMetric {
    Aerobic,   // 需氧菌总数
    Coliform,  // 大肠菌群
    EColiform, // 大肠杆菌
    Yeast,     // 酵母
    Mold,      // 霉菌
    Lactic,    // 乳酸菌
}

impl MicroMetric {
    pub const ALL: [MicroMetric; 6] = [
        MicroMetric::Aerobic,
        MicroMetric::Coliform,
        MicroMetric::EColiform,
        MicroMetric::Yeast,
        MicroMetric::Mold,
        MicroMetric::Lactic,
    ];
}

impl fmt::Display for MicroMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MicroMetric::Aerobic => write!(f, "AEROBIC"),
            MicroMetric::Coliform => write!(f, "COLIFORM"),
            MicroMetric::EColiform => write!(f, "E_COLIFORM"),
            MicroMetric::Yeast => write!(f, "YEAST"),
            MicroMetric::Mold => write!(f, "MOLD"),
            MicroMetric::Lactic => write!(f, "LACTIC"),
        }
    }
}
