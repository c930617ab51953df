// ==========================================
// 检验报告(CoA)系统 - 代表值选取策略
// ==========================================
// 职责: 多个候选读数 → 单一代表值
// 红线: 两种策略必须保持独立，不可合并
//   - 理化: 最接近均值（过程控制取中心）
//   - 微生物: 合格读数中的最大值（食品安全取最坏）
// ==========================================

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentativePolicy {
    NearestToMean,
    WorstCaseInSpec,
}

impl fmt::Display for RepresentativePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepresentativePolicy::NearestToMean => write!(f, "NEAREST_TO_MEAN"),
            RepresentativePolicy::WorstCaseInSpec => write!(f, "WORST_CASE_IN_SPEC"),
        }
    }
}

/// 最接近均值的读数
///
/// # 规则
/// - 计算全部读数的算术均值
/// - 返回与均值绝对距离最小的读数；距离相同时取扫描顺序中的第一个
/// - 无读数返回 None
pub fn nearest_to_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    let mut best: Option<(f64, f64)> = None; // (读数, 距离)
    for &value in values {
        let distance = (value - mean).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((value, distance)),
        }
    }
    best.map(|(value, _)| value)
}

/// 合格读数中的最大值（最坏情况）
///
/// # 规则
/// - 先保留合格读数；若无任何合格读数，则退回全部读数
///   （整批不合格时不能显示为"无数据"）
/// - 在保留集合中取最大值
/// - 无读数返回 None
pub fn worst_case_in_spec(values: &[i64], in_spec: impl Fn(i64) -> bool) -> Option<i64> {
    let passing = values.iter().copied().filter(|v| in_spec(*v)).max();
    passing.or_else(|| values.iter().copied().max())
}
