// ==========================================
// 检验报告(CoA)系统 - 批量解析集成测试
// ==========================================


use coa_resolver::config::ResolverConfig;
use coa_resolver::domain::{MetricValue, MicroMetric, SalesOrder};
use coa_resolver::engine::{
    BatchResolver, JsonLinesRenderer, MetricStatus, OrderReport, ReportRenderer, ResolutionError,
    ResultResolver,
};
use test_helpers::{
    build_datasets, finished_goods_row, micro_row, titration_row, MicroBlock, TitrationBlock,
};

fn batch_resolver() -> BatchResolver {
    let config = ResolverConfig::default();
    let loaded = build_datasets(
        &config,
        vec![
            finished_goods_row("AB123", "Ranch Dressing", 10, "R-77"),
            finished_goods_row("CD456", "Caesar Dressing", 30, "R-12"),
        ],
        vec![titration_row(
            "1/5/2024",
            "H1",
            "R-77",
            &[TitrationBlock::new("Original").acidity("0.61")],
        )],
        vec![
            micro_row(
                "H1",
                "R-77",
                "1/5/2024",
                "AB123",
                "Acme",
                &[MicroBlock::new("Hurricane").aerobic("800")],
            ),
            micro_row(
                "S1",
                "R-12",
                "1/15/2024",
                "CD456",
                "Acme",
                &[MicroBlock::new("Sandpoint").aerobic("0")],
            ),
        ],
    );
    BatchResolver::new(ResultResolver::new(loaded.snapshot, &config))
}

fn orders() -> Vec<SalesOrder> {
    vec![
        SalesOrder::new("SO-2", vec!["AB12303011524".to_string(), "ZZ99903011524".to_string()]),
        SalesOrder::new("SO-1", vec!["CD45601021424".to_string()]),
        SalesOrder::new("SO-3", vec!["bad".to_string()]),
    ]
}

#[tokio::test]
async fn test_resolve_orders_preserves_order() {
    let batch = batch_resolver().resolve_orders(orders(), None).await;

    assert!(uuid::Uuid::parse_str(&batch.batch_id).is_ok());
    let ids: Vec<&str> = batch.orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["SO-2", "SO-1", "SO-3"]);
    assert_eq!(batch.failed_orders(), 0);
    assert_eq!(batch.lot_count(), 4);

    let so2 = batch.orders[0].outcome.as_ref().unwrap();
    assert_eq!(so2[0].lot_code, "AB12303011524");
    let resolution = so2[0].result.as_ref().unwrap();
    assert_eq!(
        resolution.micro[&MicroMetric::Aerobic]
            .resolved()
            .and_then(|m| m.representative),
        Some(MetricValue::Count(800))
    );
    assert!(matches!(
        so2[1].result,
        Err(ResolutionError::UnknownProduct { .. })
    ));

    // CD456 到期 2024-02-14，保质期 30 天 → 2024-01-15
    let so1 = batch.orders[1].outcome.as_ref().unwrap();
    let caesar = so1[0].result.as_ref().unwrap();
    assert_eq!(caesar.manufacture_date.to_string(), "2024-01-15");
    assert_eq!(caesar.micro_rows, 1);
}

#[tokio::test]
async fn test_supplier_path_in_batch() {
    let orders = vec![SalesOrder::new("SO-9", vec!["CD45603021424".to_string()])];

    // 标准路径: H1 批号在 S1 行中无命中
    let standard = batch_resolver().resolve_orders(orders.clone(), None).await;
    let lot = &standard.orders[0].outcome.as_ref().unwrap()[0];
    assert_eq!(lot.result.as_ref().unwrap().micro_rows, 0);

    let internal = batch_resolver()
        .resolve_orders(orders, Some("Acme".to_string()))
        .await;
    let lot = &internal.orders[0].outcome.as_ref().unwrap()[0];
    assert_eq!(lot.result.as_ref().unwrap().micro_rows, 1);
}

#[tokio::test]
async fn test_order_reports_render_as_json_lines() {
    let config = ResolverConfig::default();
    let batch = batch_resolver().resolve_orders(orders(), None).await;
    let reports = OrderReport::from_batch(&batch, &config.metrics);
    assert_eq!(reports.len(), 3);

    // 解码失败的批号: 每个指标 ParseError
    let bad = &reports[2].lots[0];
    assert_eq!(bad.metrics.len(), 12);
    assert!(bad.metrics.iter().all(|m| m.status == MetricStatus::ParseError));

    // 未知产品: 批号级标记
    let unknown = &reports[0].lots[1];
    assert!(unknown.metrics.is_empty());
    assert!(unknown.error.is_some());

    let mut renderer = JsonLinesRenderer::new(Vec::new());
    for report in &reports {
        renderer.render(report).unwrap();
    }
    renderer.finish().unwrap();
    let output = String::from_utf8(renderer.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["orderId"], "SO-2");
    assert_eq!(lines[0]["batchId"], batch.batch_id.as_str());
    assert_eq!(lines[1]["lots"][0]["siteName"], "Sandpoint, ID");
}
