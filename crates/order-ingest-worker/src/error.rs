//! 订单摄取服务专用错误类型
//!
//! 在共享库 IngestError 基础上定义本服务特有的错误变体，
//! 与信封处理的各个阶段一一对应：外层解码、内层解码、必填字段校验
//! 和存储写入。这些错误全部在单信封边界内被吸收，不会上抛给调用方。

use order_shared::error::IngestError;

/// 订单摄取处理错误
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// 外层信封 JSON 格式损坏
    #[error("外层信封解析失败: {0}")]
    OuterDecodeFailed(String),

    /// `Message` 字段内的二次编码 JSON 格式损坏
    #[error("内层通知解析失败: {0}")]
    InnerDecodeFailed(String),

    /// 必填字段缺失，携带缺失字段名便于排查上游数据问题
    #[error("必填字段缺失: {missing:?}")]
    MissingFields { missing: Vec<&'static str> },

    /// 记录存储写入失败（如瞬时不可用），不做重试
    #[error("订单记录写入失败: {0}")]
    StoreWriteFailed(#[source] IngestError),

    /// 透传共享库错误，避免在每个 match 分支手动转换
    #[error(transparent)]
    Shared(#[from] IngestError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkerError::OuterDecodeFailed("expected value at line 1".to_string());
        assert_eq!(err.to_string(), "外层信封解析失败: expected value at line 1");

        let err = WorkerError::InnerDecodeFailed("EOF while parsing".to_string());
        assert_eq!(err.to_string(), "内层通知解析失败: EOF while parsing");

        let err = WorkerError::MissingFields {
            missing: vec!["orderId", "timestamp"],
        };
        assert_eq!(err.to_string(), r#"必填字段缺失: ["orderId", "timestamp"]"#);

        let err = WorkerError::StoreWriteFailed(IngestError::Internal("连接拒绝".to_string()));
        assert_eq!(err.to_string(), "订单记录写入失败: 内部错误: 连接拒绝");

        let shared_err = IngestError::Kafka("broker 不可达".to_string());
        let err = WorkerError::Shared(shared_err);
        assert_eq!(err.to_string(), "Kafka 错误: broker 不可达");
    }
}
