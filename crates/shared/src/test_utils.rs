//! 测试工具模块
//!
//! 提供测试所需的配置辅助函数、内存版订单存储和信封构造器，
//! 用于简化测试代码编写，提高测试的可重复性和可维护性。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::{KafkaConfig, RedisConfig};
use crate::error::{IngestError, Result};
use crate::order::OrderRecord;
use crate::store::OrderStore;

// ==================== 测试配置辅助 ====================

/// 创建测试用 Redis 配置
///
/// 优先使用环境变量，否则使用默认测试实例的 1 号库
pub fn test_redis_config() -> RedisConfig {
    RedisConfig {
        url: std::env::var("TEST_REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379/1".to_string()),
    }
}

/// 创建测试用 Kafka 配置
pub fn test_kafka_config() -> KafkaConfig {
    KafkaConfig {
        brokers: std::env::var("TEST_KAFKA_BROKERS")
            .unwrap_or_else(|_| "localhost:9092".to_string()),
        consumer_group: "order-ingest-test".to_string(),
        auto_offset_reset: "earliest".to_string(),
    }
}

/// 将内层通知 JSON 文本包装为外层信封 JSON
///
/// 模拟 fanout 主题到队列的双重编码：内层文本被整体塞进 `Message` 字段。
pub fn wrap_in_envelope(inner: &str) -> String {
    serde_json::json!({ "Message": inner }).to_string()
}

// ==================== 内存版订单存储 ====================

/// 内存版订单存储
///
/// 用 HashMap 模拟按主键覆盖写的存储语义，供单元测试注入。
/// 可通过 `arm_write_failure` 使后续写入全部失败，
/// 用于验证存储故障不会中断批次内其余信封的处理。
#[derive(Default)]
pub struct InMemoryOrderStore {
    records: RwLock<HashMap<String, OrderRecord>>,
    fail_writes: AtomicBool,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使后续所有写入返回错误
    pub fn arm_write_failure(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// 恢复正常写入
    pub fn disarm_write_failure(&self) {
        self.fail_writes.store(false, Ordering::SeqCst);
    }

    /// 当前存储的记录数
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn upsert(&self, record: &OrderRecord) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(IngestError::Internal("模拟存储写入失败".to_string()));
        }

        self.records
            .write()
            .await
            .insert(record.order_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<OrderRecord>> {
        Ok(self.records.read().await.get(order_id).cloned())
    }
}
