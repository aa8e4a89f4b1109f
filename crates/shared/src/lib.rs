//! 共享库
//!
//! 包含订单摄取服务所需的配置、错误处理、Kafka 消费、订单数据模型
//! 和记录存储等基础设施代码。

pub mod config;
pub mod error;
pub mod kafka;
pub mod order;
pub mod store;
pub mod test_utils;
