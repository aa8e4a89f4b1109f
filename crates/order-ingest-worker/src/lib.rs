//! 订单摄取服务
//!
//! 从 Kafka 消费订单通知，拆开嵌套的信封编码，校验必填字段后
//! 将归一化的订单记录按主键 upsert 到记录存储。
//! 每条消息独立处理，单条坏消息不影响批次内其余消息。

pub mod consumer;
pub mod error;
pub mod processor;
