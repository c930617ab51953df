// ==========================================
// 检验报告(CoA)系统 - 数据集加载器
// ==========================================
// 职责: 整合加载流程，从文件到只读索引快照
// 流程: 解析 → 跳过表头/空行 → 行映射 → DQ 汇总 → 建索引
// 红线: 全部索引构建完成后才交给解析器（加载屏障）
// ==========================================

use crate::config::{InputLayout, MicroLimits, ProcessWindow, ResolverConfig};
use crate::domain::dq::{Dataset, DqReport, DqViolation};
use crate::domain::rows::SourceRow;
use crate::domain::sales_order::SalesOrder;
use crate::domain::types::TitrationMetric;
use crate::engine::finished_goods_index::FinishedGoodsIndex;
use crate::engine::micro_index::MicroIndex;
use crate::engine::resolver::IndexSnapshot;
use crate::engine::titration_index::TitrationIndex;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{RowParser, UniversalRowParser};
use crate::importer::row_mapper::{Mapped, RowMapper};
use crate::perf::PerfGuard;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 三个输入数据集的文件路径
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub finished_goods: PathBuf,
    pub titration: PathBuf,
    pub micro: PathBuf,
}

/// 原始行（按位置，未跳过表头）
#[derive(Debug, Clone, Default)]
pub struct RawDatasets {
    pub finished_goods: Vec<Vec<String>>,
    pub titration: Vec<Vec<String>>,
    pub micro: Vec<Vec<String>>,
}

/// 加载结果: 只读索引快照 + 数据质量报告
#[derive(Debug, Clone)]
pub struct LoadedDatasets {
    pub snapshot: Arc<IndexSnapshot>,
    pub dq: DqReport,
}

/// 跳过表头行与全空行，行号为源文件中的 1 起始行号
pub fn source_rows(rows: Vec<Vec<String>>, header_rows: usize) -> Vec<SourceRow> {
    let cleaner = DataCleaner;
    rows.into_iter()
        .enumerate()
        .skip(header_rows)
        .filter(|(_, fields)| !cleaner.is_blank_row(fields))
        .map(|(idx, fields)| SourceRow::new(idx + 1, fields))
        .collect()
}

/// 销售订单清单 `[salesOrderId, lotCode]` 按订单号分组（首次出现顺序）
pub fn group_sales_orders(rows: &[SourceRow]) -> (Vec<SalesOrder>, Vec<DqViolation>) {
    let cleaner = DataCleaner;
    let mut orders: Vec<SalesOrder> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut violations = Vec::new();

    for row in rows {
        let order_id = cleaner.normalize_null(row.field(0).map(str::to_string));
        let lot_code = cleaner.normalize_null(row.field(1).map(str::to_string));
        let (Some(order_id), Some(lot_code)) = (order_id, lot_code) else {
            violations.push(DqViolation::error(
                Dataset::SalesOrders,
                row.row_number,
                "row",
                "销售订单号或批号为空".to_string(),
            ));
            continue;
        };

        match positions.get(&order_id) {
            Some(&pos) => orders[pos].lot_codes.push(lot_code),
            None => {
                positions.insert(order_id.clone(), orders.len());
                orders.push(SalesOrder::new(order_id, vec![lot_code]));
            }
        }
    }

    (orders, violations)
}

// ==========================================
// DatasetLoader - 数据集加载器
// ==========================================
pub struct DatasetLoader<P: RowParser = UniversalRowParser> {
    parser: P,
    mapper: RowMapper,
    layout: InputLayout,
    micro_limits: MicroLimits,
    titration_limits: BTreeMap<TitrationMetric, ProcessWindow>,
}

impl DatasetLoader<UniversalRowParser> {
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_parser(UniversalRowParser, config)
    }
}

impl<P: RowParser> DatasetLoader<P> {
    pub fn with_parser(parser: P, config: &ResolverConfig) -> Self {
        Self {
            parser,
            mapper: RowMapper,
            layout: config.input.clone(),
            micro_limits: config.micro_limits.clone(),
            titration_limits: config.titration_limits.clone(),
        }
    }

    /// 从文件加载三个数据集并建立索引
    #[instrument(skip(self, paths))]
    pub fn load(&self, paths: &DatasetPaths) -> ImportResult<LoadedDatasets> {
        let mut perf = PerfGuard::new("load_datasets");
        info!(
            finished_goods = %paths.finished_goods.display(),
            titration = %paths.titration.display(),
            micro = %paths.micro.display(),
            "开始加载数据集"
        );

        let raw = RawDatasets {
            finished_goods: self.parser.parse_rows(&paths.finished_goods)?,
            titration: self.parser.parse_rows(&paths.titration)?,
            micro: self.parser.parse_rows(&paths.micro)?,
        };
        perf.add_items(raw.finished_goods.len() + raw.titration.len() + raw.micro.len());

        Ok(self.build(raw))
    }

    /// 由原始行建立索引快照
    pub fn build(&self, raw: RawDatasets) -> LoadedDatasets {
        let mut dq = DqReport::default();

        // === 成品主数据 ===
        let rows = source_rows(raw.finished_goods, self.layout.finished_goods_header_rows);
        let (records, report) = collect_mapped(Dataset::FinishedGoods, &rows, |row| {
            self.mapper.map_finished_goods(row).map(|r| (r, Vec::new()))
        });
        dq.merge(report);
        let finished_goods = FinishedGoodsIndex::new(records);

        // === 理化检验 ===
        let rows = source_rows(raw.titration, self.layout.titration_header_rows);
        let (titration_rows, report) =
            collect_mapped(Dataset::Titration, &rows, |row| self.mapper.map_titration(row));
        dq.merge(report);
        let titration =
            TitrationIndex::new(titration_rows).with_limits(self.titration_limits.clone());

        // === 微生物检验 ===
        let rows = source_rows(raw.micro, self.layout.micro_header_rows);
        let (micro_rows, report) =
            collect_mapped(Dataset::Micro, &rows, |row| self.mapper.map_micro(row));
        dq.merge(report);
        let micro = MicroIndex::new(micro_rows).with_limits(self.micro_limits.clone());

        info!(
            finished_goods = finished_goods.len(),
            shadowed = finished_goods.shadowed(),
            titration = titration.len(),
            micro = micro.len(),
            quarantined = dq.summary.quarantined,
            warnings = dq.summary.warning,
            "索引构建完成"
        );

        LoadedDatasets {
            snapshot: Arc::new(IndexSnapshot::new(finished_goods, titration, micro)),
            dq,
        }
    }

    /// 加载销售订单清单
    #[instrument(skip(self, path))]
    pub fn load_sales_orders(&self, path: &Path) -> ImportResult<(Vec<SalesOrder>, DqReport)> {
        let rows = source_rows(
            self.parser.parse_rows(path)?,
            self.layout.sales_order_header_rows,
        );
        let (orders, violations) = group_sales_orders(&rows);
        for v in &violations {
            warn!(row = v.row_number, message = %v.message, "销售订单行被隔离");
        }
        let report = DqReport::from_build(rows.len(), rows.len() - violations.len(), violations);
        info!(orders = orders.len(), rows = rows.len(), "销售订单加载完成");
        Ok((orders, report))
    }
}

/// 逐行映射，不合格行隔离并记录
fn collect_mapped<T>(
    dataset: Dataset,
    rows: &[SourceRow],
    map: impl Fn(&SourceRow) -> Mapped<T>,
) -> (Vec<T>, DqReport) {
    let mut accepted = Vec::with_capacity(rows.len());
    let mut violations = Vec::new();

    for row in rows {
        match map(row) {
            Ok((value, warnings)) => {
                accepted.push(value);
                violations.extend(warnings);
            }
            Err(violation) => {
                debug!(
                    dataset = %dataset,
                    row = violation.row_number,
                    message = %violation.message,
                    "行被隔离"
                );
                violations.push(violation);
            }
        }
    }

    let report = DqReport::from_build(rows.len(), accepted.len(), violations);
    if report.summary.quarantined > 0 {
        warn!(
            dataset = %dataset,
            quarantined = report.summary.quarantined,
            "存在被隔离的行"
        );
    }
    (accepted, report)
}
