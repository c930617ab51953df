// ==========================================
// 检验报告(CoA)系统 - 数据质量报告
// ==========================================
// 职责: 建索引时隔离的行 + 截断读数块的记录
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Dataset - 数据集标识
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dataset {
    FinishedGoods,
    Titration,
    Micro,
    SalesOrders,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::FinishedGoods => write!(f, "FINISHED_GOODS"),
            Dataset::Titration => write!(f, "TITRATION"),
            Dataset::Micro => write!(f, "MICRO"),
            Dataset::SalesOrders => write!(f, "SALES_ORDERS"),
        }
    }
}

// ==========================================
// DqLevel - 数据质量级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DqLevel {
    Error,   // 行被隔离，不进入索引
    Warning, // 行进入索引，部分读数不可用
}

// ==========================================
// DqViolation - 数据质量违规明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqViolation {
    pub dataset: Dataset,
    pub row_number: usize, // 原始文件行号
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

impl DqViolation {
    pub fn error(dataset: Dataset, row_number: usize, field: &str, message: String) -> Self {
        Self {
            dataset,
            row_number,
            level: DqLevel::Error,
            field: field.to_string(),
            message,
        }
    }

    pub fn warning(dataset: Dataset, row_number: usize, field: &str, message: String) -> Self {
        Self {
            dataset,
            row_number,
            level: DqLevel::Warning,
            field: field.to_string(),
            message,
        }
    }
}

// ==========================================
// DqSummary - 数据质量汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize,  // 总行数
    pub accepted: usize,    // 进入索引
    pub quarantined: usize, // 隔离（ERROR）
    pub warning: usize,     // 警告条目数
}

// ==========================================
// DqReport - 数据质量报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqReport {
    pub summary: DqSummary,
    pub violations: Vec<DqViolation>,
}

impl DqReport {
    /// 由建索引的行数与违规明细汇总
    pub fn from_build(total_rows: usize, accepted: usize, violations: Vec<DqViolation>) -> Self {
        let warning = violations
            .iter()
            .filter(|v| v.level == DqLevel::Warning)
            .count();
        Self {
            summary: DqSummary {
                total_rows,
                accepted,
                quarantined: total_rows - accepted,
                warning,
            },
            violations,
        }
    }

    /// 合并另一数据集的报告
    pub fn merge(&mut self, other: DqReport) {
        self.summary.total_rows += other.summary.total_rows;
        self.summary.accepted += other.summary.accepted;
        self.summary.quarantined += other.summary.quarantined;
        self.summary.warning += other.summary.warning;
        self.violations.extend(other.violations);
    }

    pub fn for_dataset(&self, dataset: Dataset) -> impl Iterator<Item = &DqViolation> {
        self.violations.iter().filter(move |v| v.dataset == dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_merge() {
        let mut report = DqReport::from_build(
            3,
            2,
            vec![DqViolation::error(Dataset::Titration, 2, "row", "too short".into())],
        );
        let other = DqReport::from_build(
            4,
            4,
            vec![DqViolation::warning(Dataset::Micro, 1, "AEROBIC", "truncated".into())],
        );
        report.merge(other);

        assert_eq!(report.summary.total_rows, 7);
        assert_eq!(report.summary.accepted, 6);
        assert_eq!(report.summary.quarantined, 1);
        assert_eq!(report.summary.warning, 1);
        assert_eq!(report.for_dataset(Dataset::Micro).count(), 1);
    }
}
