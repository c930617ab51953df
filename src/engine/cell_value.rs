// ==========================================
// 检验报告(CoA)系统 - 读数单元格分类
// ==========================================

/// 单个读数单元格的解析结果
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue<T> {
    NotTested,         // "*"
    Blank,             // 空单元格
    Value(T),
    Anomalous(String), // 非数值且非 "*"
}
