//! 订单摄取处理器
//!
//! 实现单信封的线性处理流水线：外层解码 -> 内层解码 -> 必填字段校验 ->
//! 强转 -> 写入存储，任一阶段失败都在当前信封边界内终止并记录日志。
//! 批次严格按投递顺序逐条处理，单条失败不影响后续信封，
//! 批次结果永远是成功值——局部失败只体现在日志与汇总计数中，
//! 避免向队列侧触发重投风暴。

use std::sync::Arc;

use order_shared::order::{OrderNotification, QueueEnvelope, REQUIRED_FIELDS};
use order_shared::store::OrderStore;
use tracing::{debug, error, info, warn};

use crate::error::WorkerError;

// ---------------------------------------------------------------------------
// IngestOutcome — 单信封处理结果
// ---------------------------------------------------------------------------

/// 单个信封的终态
///
/// 对应流水线的提前退出点：
/// - `SkippedNoMessage` 表示信封上没有 `Message` 字段，静默跳过；
/// - `Skipped` 表示解码失败或必填字段缺失，记日志后放弃且不写记录；
/// - `Failed` 表示记录已生成但存储写入失败，不做重试；
/// - `Stored` 表示记录已成功落库。
#[derive(Debug)]
pub enum IngestOutcome {
    /// 记录已写入存储
    Stored { order_id: String },
    /// 信封没有 `Message` 字段，静默跳过
    SkippedNoMessage,
    /// 解码失败或必填字段缺失，跳过该信封
    Skipped { reason: WorkerError },
    /// 存储写入失败，放弃该信封
    Failed {
        order_id: String,
        error: WorkerError,
    },
}

// ---------------------------------------------------------------------------
// BatchSummary — 批次处理汇总
// ---------------------------------------------------------------------------

/// 批次处理汇总计数
///
/// 处理批次的返回值永远是此成功值：单信封的解码失败、字段缺失
/// 和写入失败都不会以错误形式上抛给调用方。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub received: usize,
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// 将单信封的终态计入汇总
    fn record(&mut self, outcome: &IngestOutcome) {
        self.received += 1;
        match outcome {
            IngestOutcome::Stored { .. } => self.stored += 1,
            IngestOutcome::Failed { .. } => self.failed += 1,
            _ => self.skipped += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// OrderIngestProcessor
// ---------------------------------------------------------------------------

/// 订单摄取处理器
///
/// 只持有注入的记录存储，自身无任何跨批次状态，每个批次都从干净状态开始。
/// 使用 trait object 而非泛型参数，因为处理器会被存储到 Consumer 中，
/// trait object 避免了泛型传播到整个调用链。
pub struct OrderIngestProcessor {
    store: Arc<dyn OrderStore>,
}

impl OrderIngestProcessor {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// 按投递顺序逐条处理批次内的信封
    ///
    /// 单线程顺序执行，无并行也无乱序；返回汇总计数而非错误，
    /// 保持"批次整体总是成功"的对外契约。
    pub async fn process_batch<'a, I>(&self, envelopes: I) -> BatchSummary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = BatchSummary::default();

        for raw in envelopes {
            let outcome = self.process_envelope(raw).await;
            summary.record(&outcome);
        }

        info!(
            received = summary.received,
            stored = summary.stored,
            skipped = summary.skipped,
            failed = summary.failed,
            "批次处理完成"
        );

        summary
    }

    /// 处理单个信封的完整流水线
    ///
    /// 外层解码失败与内层解码失败同等对待：记日志、跳过当前信封、
    /// 继续处理后续信封，不让一条坏消息拖垮整个批次。
    pub async fn process_envelope(&self, raw: &str) -> IngestOutcome {
        debug!(raw, "收到原始信封");

        // 1. 外层解码
        let envelope: QueueEnvelope = match serde_json::from_str(raw) {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "外层信封解析失败，跳过该信封");
                return IngestOutcome::Skipped {
                    reason: WorkerError::OuterDecodeFailed(e.to_string()),
                };
            }
        };

        // 2. 信封无 Message 字段时静默跳过，不算异常
        let Some(inner) = envelope.message else {
            debug!("信封无 Message 字段，跳过");
            return IngestOutcome::SkippedNoMessage;
        };

        // 3. 内层解码
        let notification: OrderNotification = match serde_json::from_str(&inner) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "内层通知解析失败，跳过该信封");
                return IngestOutcome::Skipped {
                    reason: WorkerError::InnerDecodeFailed(e.to_string()),
                };
            }
        };

        debug!(?notification, "内层通知已解析");

        // 4. 必填字段校验与强转
        let record = match notification.into_record() {
            Ok(r) => r,
            Err(missing) => {
                warn!(
                    required = ?REQUIRED_FIELDS,
                    missing = ?missing,
                    "必填字段缺失，跳过该信封"
                );
                return IngestOutcome::Skipped {
                    reason: WorkerError::MissingFields { missing },
                };
            }
        };

        debug!(order_id = %record.order_id, record = ?record, "准备写入订单记录");

        // 5. 无条件 upsert，同主键整条覆盖
        match self.store.upsert(&record).await {
            Ok(()) => {
                debug!(order_id = %record.order_id, "订单记录写入成功");
                IngestOutcome::Stored {
                    order_id: record.order_id,
                }
            }
            Err(e) => {
                error!(
                    order_id = %record.order_id,
                    error = %e,
                    "订单记录写入失败，不做重试"
                );
                IngestOutcome::Failed {
                    order_id: record.order_id,
                    error: WorkerError::StoreWriteFailed(e),
                }
            }
        }
    }
}
