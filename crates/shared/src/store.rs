//! 订单记录存储模块
//!
//! 定义按主键幂等覆盖写的 `OrderStore` 抽象，并提供 Redis 实现。
//! 存储以 trait 形式注入处理器而非模块级单例，便于测试注入替身。

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use crate::config::RedisConfig;
use crate::error::{IngestError, Result};
use crate::order::OrderRecord;

/// 订单集合的键前缀；集合名固定为常量，不做外部配置
const ORDER_KEY_PREFIX: &str = "orders:";

/// 构造订单记录的存储键
pub fn order_key(order_id: &str) -> String {
    format!("{ORDER_KEY_PREFIX}{order_id}")
}

// ---------------------------------------------------------------------------
// OrderStore trait
// ---------------------------------------------------------------------------

/// 订单记录存储抽象
///
/// 写入语义为无条件 upsert：同主键的记录整条覆盖（last-write-wins），
/// 不做条件写也不需要锁，因为每次写入只涉及单个独立的键。
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 按主键 upsert 订单记录，已存在时整条覆盖
    async fn upsert(&self, record: &OrderRecord) -> Result<()>;

    /// 按主键读取订单记录，不存在时返回 None
    async fn get(&self, order_id: &str) -> Result<Option<OrderRecord>>;
}

// ---------------------------------------------------------------------------
// RedisOrderStore
// ---------------------------------------------------------------------------

/// Redis 订单记录存储
///
/// 记录以 JSON 字符串存于 `orders:{orderId}`，用普通 SET 实现无条件覆盖。
#[derive(Clone)]
pub struct RedisOrderStore {
    client: Client,
}

impl RedisOrderStore {
    /// 创建 Redis 客户端
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!("Redis client created");
        Ok(Self { client })
    }

    /// 获取连接
    async fn get_conn(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(IngestError::from)
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.get_conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(IngestError::from)
    }
}

#[async_trait]
impl OrderStore for RedisOrderStore {
    async fn upsert(&self, record: &OrderRecord) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let serialized = serde_json::to_string(record)
            .map_err(|e| IngestError::Serialization(format!("订单记录序列化失败: {e}")))?;

        let key = order_key(&record.order_id);
        let _: () = conn.set(&key, serialized).await?;

        debug!(order_id = %record.order_id, key = %key, "订单记录已写入");
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<OrderRecord>> {
        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(order_key(order_id)).await?;

        match value {
            Some(v) => {
                let record: OrderRecord = serde_json::from_str(&v)
                    .map_err(|e| IngestError::Serialization(format!("订单记录反序列化失败: {e}")))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_key_generation() {
        assert_eq!(order_key("O-123"), "orders:O-123");
        assert_eq!(order_key(""), "orders:");
    }

    fn sample_record(order_id: &str) -> OrderRecord {
        OrderRecord {
            order_id: order_id.to_string(),
            user_id: "U-1".to_string(),
            item_name: "键盘".to_string(),
            quantity: 2,
            status: "new".to_string(),
            timestamp: "2026-08-29T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    #[ignore] // 需要 Redis 实例
    async fn test_redis_store_upsert_and_get() {
        let store = RedisOrderStore::new(&crate::test_utils::test_redis_config())
            .expect("创建 Redis 存储失败");
        store.health_check().await.expect("Redis 健康检查失败");

        // 进程号区分并行运行，避免键冲突
        let order_id = format!("it-{}", std::process::id());
        let record = sample_record(&order_id);

        store.upsert(&record).await.expect("写入订单记录失败");
        let fetched = store
            .get(&order_id)
            .await
            .expect("读取订单记录失败")
            .expect("订单记录应存在");
        assert_eq!(fetched, record);

        // 同键重写整条覆盖
        let mut updated = record.clone();
        updated.status = "shipped".to_string();
        updated.quantity = 5;
        store.upsert(&updated).await.expect("覆盖写入失败");
        let fetched = store
            .get(&order_id)
            .await
            .expect("读取订单记录失败")
            .expect("订单记录应存在");
        assert_eq!(fetched.status, "shipped");
        assert_eq!(fetched.quantity, 5);
    }

    #[tokio::test]
    #[ignore] // 需要 Redis 实例
    async fn test_redis_store_get_missing_returns_none() {
        let store = RedisOrderStore::new(&crate::test_utils::test_redis_config())
            .expect("创建 Redis 存储失败");

        let missing = store
            .get("it-不存在的订单")
            .await
            .expect("读取订单记录失败");
        assert!(missing.is_none());
    }
}
