// ==========================================
// 检验报告(CoA)系统 - 命令行入口
// ==========================================
// 流程: 加载配置 → 加载数据集（加载屏障）→ 批量解析 → JSON Lines 输出
// 日志写 stderr，报告写 stdout
// ==========================================

use anyhow::Context;
use clap::Parser;
use coa_resolver::config::ResolverConfig;
use coa_resolver::engine::{
    BatchResolver, JsonLinesRenderer, OrderReport, ReportRenderer, ResultResolver,
};
use coa_resolver::importer::{DatasetLoader, DatasetPaths};
use coa_resolver::logging::{self, LogFormat};
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coa-resolver", version, about = "Resolve lot codes to CoA test results")]
struct Cli {
    /// Finished-goods master export (.csv/.xlsx/.xls)
    #[arg(long, value_name = "PATH")]
    finished_goods: PathBuf,

    /// Titration export
    #[arg(long, value_name = "PATH")]
    titration: PathBuf,

    /// Micro export
    #[arg(long, value_name = "PATH")]
    micro: PathBuf,

    /// Sales-order manifest: rows of [sales order id, lot code]
    #[arg(long, value_name = "PATH")]
    orders: PathBuf,

    /// Resolver config JSON (defaults to COA_RESOLVER_CONFIG or the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Match micro rows by supplier instead of factory/recipe (internal reports)
    #[arg(long)]
    supplier: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_with_format(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    tracing::info!("{} v{}", coa_resolver::APP_NAME, coa_resolver::VERSION);

    let config = match &cli.config {
        Some(path) => ResolverConfig::load(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => ResolverConfig::load_default().context("加载默认配置失败")?,
    };

    // === 加载屏障 ===
    let loader = DatasetLoader::new(&config);
    let loaded = loader
        .load(&DatasetPaths {
            finished_goods: cli.finished_goods.clone(),
            titration: cli.titration.clone(),
            micro: cli.micro.clone(),
        })
        .context("加载检验数据集失败")?;
    let (orders, order_dq) = loader
        .load_sales_orders(&cli.orders)
        .with_context(|| format!("加载销售订单失败: {}", cli.orders.display()))?;

    let mut dq = loaded.dq;
    dq.merge(order_dq);
    tracing::info!(
        total_rows = dq.summary.total_rows,
        accepted = dq.summary.accepted,
        quarantined = dq.summary.quarantined,
        warnings = dq.summary.warning,
        "数据质量汇总"
    );

    // === 批量解析 ===
    let resolver = ResultResolver::new(loaded.snapshot, &config);
    let batch = BatchResolver::new(resolver)
        .resolve_orders(orders, cli.supplier.clone())
        .await;

    let stdout = std::io::stdout();
    let mut renderer = JsonLinesRenderer::new(BufWriter::new(stdout.lock()));
    for report in OrderReport::from_batch(&batch, &config.metrics) {
        renderer.render(&report).context("写出报告失败")?;
    }
    renderer.finish().context("写出报告失败")?;

    if batch.failed_orders() > 0 {
        anyhow::bail!("{} 个销售订单解析任务失败", batch.failed_orders());
    }
    Ok(())
}
