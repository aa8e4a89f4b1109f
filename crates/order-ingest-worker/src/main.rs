//! 订单摄取服务入口
//!
//! 加载配置、初始化日志、建立存储连接后启动消费循环，
//! 收到 Ctrl-C 时通过 watch channel 通知消费循环优雅退出。

use std::sync::Arc;

use anyhow::Context;
use order_ingest_worker::consumer::OrderIngestConsumer;
use order_ingest_worker::processor::OrderIngestProcessor;
use order_shared::config::{AppConfig, ObservabilityConfig};
use order_shared::store::RedisOrderStore;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

const SERVICE_NAME: &str = "order-ingest-worker";

/// 初始化 tracing 日志
///
/// RUST_LOG 优先，其次使用配置中的 log_level；
/// 输出格式按配置选择 json（结构化）或 pretty（人类可读）。
fn init_tracing(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if config.log_format == "json" {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).with_ansi(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;

    init_tracing(&config.observability)?;

    info!(
        service = SERVICE_NAME,
        environment = %config.environment,
        "订单摄取服务启动中"
    );

    // 存储客户端在进程启动时创建一次，消费循环全程复用
    let store = RedisOrderStore::new(&config.redis).context("创建 Redis 客户端失败")?;
    if let Err(e) = store.health_check().await {
        // 存储暂时不可用不阻止启动，单条写入失败会在信封边界内被吸收
        warn!(error = %e, "Redis 健康检查失败，写入将在消费时重试连接");
    }

    let processor = OrderIngestProcessor::new(Arc::new(store));
    let consumer =
        OrderIngestConsumer::new(&config, processor).context("创建 Kafka 消费者失败")?;

    // 优雅关闭：Ctrl-C -> watch channel -> 消费循环退出
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "监听 Ctrl-C 信号失败");
            return;
        }
        info!("收到 Ctrl-C，开始优雅关闭");
        let _ = shutdown_tx.send(true);
    });

    consumer.run(shutdown_rx).await?;

    info!("订单摄取服务已退出");
    Ok(())
}
