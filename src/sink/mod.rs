//! sink模块 - 外部流式摄取端点的抽象

use serde::{Serialize, Deserialize};

/// 发送给sink的单条数据 - 分区键与不透明负载的配对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkEntry {
    pub partition_key: String,
    pub payload: Vec<u8>,
}

/// 流式sink trait - 工作线程独占持有
pub trait StreamSink: Send + 'static {
    /// sink名称（用于诊断输出）
    fn name(&self) -> &'static str;

    /// 目标是否可达且就绪 - 构造时fail-fast校验用
    fn is_ready(&self) -> bool;

    /// 发送一批数据
    ///
    /// 错误通过返回值报告，绝不panic越过此边界。
    fn send(&mut self, entries: &[SinkEntry]) -> Result<(), String>;
}

pub mod udp;

pub use udp::UdpStreamSink;
