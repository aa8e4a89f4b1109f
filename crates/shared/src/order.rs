//! 订单数据模型
//!
//! 定义摄取链路的三层数据形态：队列投递的外层信封、信封内嵌套的
//! 订单通知、以及最终持久化的订单记录。上游通知经双重 JSON 编码
//! （fanout 主题的消息被原样塞进队列消息的 `Message` 字段），
//! 因此外层与内层需要分两步独立解码。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 必填字段的线上字段名，用于缺字段时的固定跳过日志
pub const REQUIRED_FIELDS: [&str; 4] = ["orderId", "userId", "itemName", "timestamp"];

/// quantity 缺省值
pub const DEFAULT_QUANTITY: i64 = 1;
/// status 缺省值
pub const DEFAULT_STATUS: &str = "new";

// ---------------------------------------------------------------------------
// QueueEnvelope — 外层信封
// ---------------------------------------------------------------------------

/// 队列投递的外层信封
///
/// 只关心 `Message` 字段；信封上的其他字段（消息 ID、签名、主题 ARN 等）
/// 与摄取无关，反序列化时直接忽略。`message` 为 `None` 表示信封上
/// 根本没有 `Message` 字段，这类信封静默跳过。
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEnvelope {
    /// 内层通知的 JSON 文本，仍需二次解码
    #[serde(rename = "Message")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// OrderNotification — 内层订单通知
// ---------------------------------------------------------------------------

/// 内层解码出的订单通知
///
/// 所有字段都建模为 `Option`，"缺失"判定只看字段是否存在，
/// 绝不等同于假值判断：`quantity: 0` 和空字符串都是有效的已填值。
/// `orderId`/`userId` 用 `Value` 承载，因为上游可能发字符串也可能发数字，
/// 两种形态都按文本落库。
#[derive(Debug, Clone, Deserialize)]
pub struct OrderNotification {
    #[serde(rename = "orderId")]
    pub order_id: Option<Value>,
    #[serde(rename = "userId")]
    pub user_id: Option<Value>,
    #[serde(rename = "itemName")]
    pub item_name: Option<String>,
    /// 按不透明文本处理，不做日期解析
    pub timestamp: Option<String>,
    pub quantity: Option<i64>,
    pub status: Option<String>,
}

impl OrderNotification {
    /// 返回缺失的必填字段名列表，空列表表示校验通过
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.order_id.is_none() {
            missing.push(REQUIRED_FIELDS[0]);
        }
        if self.user_id.is_none() {
            missing.push(REQUIRED_FIELDS[1]);
        }
        if self.item_name.is_none() {
            missing.push(REQUIRED_FIELDS[2]);
        }
        if self.timestamp.is_none() {
            missing.push(REQUIRED_FIELDS[3]);
        }
        missing
    }

    /// 校验并强转为待持久化的订单记录
    ///
    /// 必填字段缺失时返回缺失字段名列表；
    /// 否则执行强转：标识字段归一为文本，可选字段落缺省值。
    pub fn into_record(self) -> Result<OrderRecord, Vec<&'static str>> {
        let missing = self.missing_required_fields();

        let (Some(order_id), Some(user_id), Some(item_name), Some(timestamp)) =
            (self.order_id, self.user_id, self.item_name, self.timestamp)
        else {
            return Err(missing);
        };

        Ok(OrderRecord {
            order_id: identifier_text(&order_id),
            user_id: identifier_text(&user_id),
            item_name,
            quantity: self.quantity.unwrap_or(DEFAULT_QUANTITY),
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            timestamp,
        })
    }
}

/// 将标识字段归一为文本
///
/// 字符串原样透传；数字等其他 JSON 形态渲染为其文本表示。
/// 不能直接用 `Value::to_string`，否则字符串会带上引号。
fn identifier_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// OrderRecord — 持久化订单记录
// ---------------------------------------------------------------------------

/// 持久化的订单记录
///
/// 主键为 `order_id`；同键的后续写入整条覆盖，不保证跨投递的先后顺序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: String,
    pub user_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub status: String,
    pub timestamp: String,
}
