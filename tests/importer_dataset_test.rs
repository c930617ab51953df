// ==========================================
// 检验报告(CoA)系统 - 数据集加载集成测试
// ==========================================
// 覆盖: CSV 解析 → 行映射 → DQ 隔离 → 索引快照 → 解析
// ==========================================


use coa_resolver::config::ResolverConfig;
use coa_resolver::domain::{Dataset, DqLevel, MatchRule, MetricValue, TitrationMetric};
use coa_resolver::engine::ResultResolver;
use coa_resolver::importer::{DatasetLoader, DatasetPaths, ImportError};
use std::path::PathBuf;
use test_helpers::{
    finished_goods_row, micro_row, titration_row, with_header, write_csv, MicroBlock,
    TitrationBlock,
};

#[test]
fn test_load_csv_datasets_and_resolve() {
    let finished_goods = write_csv(&with_header(vec![
        finished_goods_row("AB123", "Ranch Dressing", 10, "R-77"),
        finished_goods_row("AB123", "Ranch (old)", 20, "R-70"),
        vec!["CD456".to_string(), "Caesar".to_string(), "thirty".to_string(), "R-12".to_string()],
    ]));

    // 截断行: ReTest_1 之后只有 3 列
    let mut truncated = titration_row("1/5/2024", "H1", "R-77", &[]);
    truncated.extend(["ReTest_1", "", "1300", "12"].iter().map(|s| s.to_string()));

    let titration = write_csv(&with_header(vec![
        titration_row("1/5/2024", "H1", "R-77", &[TitrationBlock::new("Original").acidity("0.62")]),
        vec!["1/5/2024".to_string(), "".to_string()],
        truncated,
    ]));
    let micro = write_csv(&with_header(vec![micro_row(
        "H1",
        "R-77",
        "1/5/2024",
        "AB123",
        "",
        &[MicroBlock::new("Hurricane").aerobic("1200")],
    )]));

    let config = ResolverConfig::default();
    let loader = DatasetLoader::new(&config);
    let loaded = loader
        .load(&DatasetPaths {
            finished_goods: finished_goods.path().to_path_buf(),
            titration: titration.path().to_path_buf(),
            micro: micro.path().to_path_buf(),
        })
        .unwrap();

    // 重复产品代码: 首条生效
    assert_eq!(loaded.snapshot.finished_goods.len(), 1);
    assert_eq!(loaded.snapshot.finished_goods.shadowed(), 1);
    assert_eq!(loaded.snapshot.titration.len(), 2);
    assert_eq!(loaded.snapshot.micro.len(), 1);

    let dq = &loaded.dq;
    assert_eq!(dq.summary.quarantined, 2);
    let fg_errors: Vec<_> = dq.for_dataset(Dataset::FinishedGoods).collect();
    assert_eq!(fg_errors.len(), 1);
    assert_eq!(fg_errors[0].row_number, 4);
    assert_eq!(fg_errors[0].field, "days_to_expiry");
    let titration_warnings = dq
        .for_dataset(Dataset::Titration)
        .filter(|v| v.level == DqLevel::Warning)
        .count();
    assert_eq!(titration_warnings, 4);

    let resolver = ResultResolver::new(loaded.snapshot, &config);
    let resolution = resolver.resolve("AB12303011524").unwrap();
    assert_eq!(resolution.titration_rule, MatchRule::Exact);
    assert_eq!(resolution.product_name, "Ranch Dressing");
    assert_eq!(
        resolution.titration[&TitrationMetric::Acidity]
            .resolved()
            .and_then(|m| m.representative),
        Some(MetricValue::Decimal(0.62))
    );
    // 截断块仍提供其范围内的读数
    let cps = resolution.titration[&TitrationMetric::ViscosityCps]
        .resolved()
        .unwrap();
    assert_eq!(cps.numeric_values, vec![MetricValue::Decimal(1300.0)]);
}

#[test]
fn test_load_sales_orders() {
    let orders = write_csv(&[
        vec!["Sales Order".to_string(), "Lot".to_string()],
        vec!["SO-1".to_string(), "AB123 03 011524".to_string()],
        vec!["SO-2".to_string(), "CD45601021424".to_string()],
        vec!["SO-1".to_string(), "AB12302011524".to_string()],
    ]);

    let loader = DatasetLoader::new(&ResolverConfig::default());
    let (orders, dq) = loader.load_sales_orders(orders.path()).unwrap();

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].order_id, "SO-1");
    assert_eq!(orders[0].lot_codes, vec!["AB123 03 011524", "AB12302011524"]);
    assert_eq!(dq.summary.accepted, 3);
    assert_eq!(dq.summary.quarantined, 0);
}

#[test]
fn test_missing_file_is_reported() {
    let loader = DatasetLoader::new(&ResolverConfig::default());
    let result = loader.load(&DatasetPaths {
        finished_goods: PathBuf::from("/nonexistent/finished_goods.csv"),
        titration: PathBuf::from("/nonexistent/titration.csv"),
        micro: PathBuf::from("/nonexistent/micro.csv"),
    });
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

#[test]
fn test_header_rows_from_config() {
    let mut config = ResolverConfig::default();
    config.input.finished_goods_header_rows = 3;

    let finished_goods = write_csv(&[
        vec!["Report".to_string()],
        vec!["Generated 2024-01-20".to_string()],
        vec!["Code".to_string(), "Name".to_string(), "Days".to_string(), "Recipe".to_string()],
        finished_goods_row("AB123", "Ranch Dressing", 10, "R-77"),
    ]);
    let empty = write_csv(&[vec!["header".to_string()]]);

    let loaded = DatasetLoader::new(&config)
        .load(&DatasetPaths {
            finished_goods: finished_goods.path().to_path_buf(),
            titration: empty.path().to_path_buf(),
            micro: empty.path().to_path_buf(),
        })
        .unwrap();
    assert_eq!(loaded.snapshot.finished_goods.len(), 1);
    assert_eq!(loaded.dq.summary.quarantined, 0);
}
