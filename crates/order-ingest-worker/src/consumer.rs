//! Kafka 消费者与消息分发
//!
//! 组合 KafkaConsumer（消息拉取）和 OrderIngestProcessor（信封处理）
//! 形成完整的消费管道。处理结果只记录日志，从不向消费循环上抛错误，
//! 保证单条坏消息不会中断消费，也不会触发队列侧重投。

use order_shared::config::AppConfig;
use order_shared::kafka::{ConsumerMessage, KafkaConsumer, topics};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::WorkerError;
use crate::processor::{IngestOutcome, OrderIngestProcessor};

/// 订单通知消费者
pub struct OrderIngestConsumer {
    consumer: KafkaConsumer,
    processor: OrderIngestProcessor,
}

impl OrderIngestConsumer {
    pub fn new(config: &AppConfig, processor: OrderIngestProcessor) -> Result<Self, WorkerError> {
        let consumer = KafkaConsumer::new(&config.kafka, None)?;
        Ok(Self {
            consumer,
            processor,
        })
    }

    /// 启动消费循环，直到收到 shutdown 信号
    ///
    /// 将 processor 移入闭包，通过 KafkaConsumer::start 驱动消费循环。
    /// 单独抽取 handle_message 函数方便单元测试。
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), WorkerError> {
        self.consumer.subscribe(&[topics::ORDER_NOTIFICATIONS])?;

        info!(topic = topics::ORDER_NOTIFICATIONS, "订单通知消费者已启动");

        let processor = self.processor;

        self.consumer
            .start(shutdown, |msg| {
                let processor = &processor;
                async move {
                    handle_message(processor, &msg).await;
                    Ok(())
                }
            })
            .await;

        info!("订单通知消费者已停止");
        Ok(())
    }
}

/// 处理单条 Kafka 消息
///
/// 拆分为独立函数而非方法，便于在测试中直接调用而无需构造完整的 Consumer。
/// 非 UTF-8 负载与外层 JSON 损坏同等对待：记日志后跳过。
pub async fn handle_message(
    processor: &OrderIngestProcessor,
    msg: &ConsumerMessage,
) -> IngestOutcome {
    let raw = match msg.payload_str() {
        Ok(s) => s,
        Err(e) => {
            warn!(
                error = %e,
                topic = %msg.topic,
                partition = msg.partition,
                offset = msg.offset,
                "消息负载非 UTF-8，跳过"
            );
            return IngestOutcome::Skipped {
                reason: WorkerError::OuterDecodeFailed(e.to_string()),
            };
        }
    };

    let outcome = processor.process_envelope(raw).await;

    match &outcome {
        IngestOutcome::Stored { order_id } => {
            info!(
                order_id = %order_id,
                topic = %msg.topic,
                partition = msg.partition,
                offset = msg.offset,
                "订单通知处理完成"
            );
        }
        IngestOutcome::Failed { order_id, error } => {
            warn!(
                order_id = %order_id,
                error = %error,
                topic = %msg.topic,
                partition = msg.partition,
                offset = msg.offset,
                "订单通知处理失败，消息已放弃"
            );
        }
        // 各 Skipped 分支在流水线内部已记过日志
        _ => {}
    }

    outcome
}
