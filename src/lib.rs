//! rat_shipper - 缓冲批量日志投递库
//!
//! 把日志记录缓冲成批，经无界调度队列交给后台工作线程，
//! 异步投递到远端流式摄取端点，使日志调用点与网络IO延迟
//! 及瞬时故障解耦。
//!
//! 三个角色：
//! - 缓冲采集器（生产者侧）：累积记录，满容量时格式化成批入队
//! - 调度队列：批次与停止哨兵共用的无界FIFO通道
//! - 投递工作线程（消费者侧）：逐批出队转发给sink，停止时排空队列
//!
//! 投递是尽力而为的至多一次：sink失败的批次被丢弃，不重试，
//! 任何错误都不会传回日志调用点。

pub mod core;
pub mod collector;
pub mod worker;
pub mod sink;
pub mod codec;
pub mod config;

// 重新导出主要类型
pub use crate::core::{DispatchMessage, ShipperBuilder, ShipperCore, ShipperError, dispatch_channel};
pub use crate::collector::{BufferingCollector, FormatFn};
pub use crate::worker::{DeliveryWorker, WorkerState};
pub use crate::sink::{SinkEntry, StreamSink, UdpStreamSink};
pub use crate::config::{
    DEFAULT_PARTITION_KEY, Level, LevelFilter, Metadata, NetworkConfig, Record, ShipperConfig,
    WireRecord,
};
