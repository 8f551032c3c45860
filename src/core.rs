//! 投递核心模块 - 生产者消费者架构的装配层

use std::sync::Arc;
use crossbeam_channel::{Sender, Receiver, unbounded};

use crate::collector::{BufferingCollector, FormatFn};
use crate::config::{Level, LevelFilter, Record, ShipperConfig};
use crate::sink::StreamSink;
use crate::worker::DeliveryWorker;

/// 调度队列消息 - 数据批次或停止哨兵
///
/// 哨兵通过类型系统与真实批次区分，绝不会被当作数据转发给sink。
#[derive(Debug, Clone)]
pub enum DispatchMessage {
    /// 一批已格式化的日志数据
    Batch(Vec<Vec<u8>>),
    /// 停止工作线程的哨兵
    Stop,
}

/// 创建无界调度队列
///
/// 多个生产者可并发入队，单个工作线程出队。FIFO顺序由通道保证。
pub fn dispatch_channel() -> (Sender<DispatchMessage>, Receiver<DispatchMessage>) {
    unbounded()
}

/// 投递器配置错误
#[derive(Debug)]
pub struct ShipperError(String);

impl ShipperError {
    pub(crate) fn new<S: Into<String>>(msg: S) -> Self {
        ShipperError(msg.into())
    }
}

impl std::fmt::Display for ShipperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ShipperError {}

/// 投递核心实现 - 极简设计
///
/// 持有采集器和工作线程，`log` 调用永不阻塞、永不panic。
pub struct ShipperCore<S: StreamSink> {
    level: LevelFilter,
    collector: Arc<BufferingCollector>,
    worker: DeliveryWorker<S>,
}

impl<S: StreamSink> ShipperCore<S> {
    /// 获取当前日志级别
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// 检查是否应该记录该级别的日志
    pub fn should_log(&self, level: &Level) -> bool {
        (level.to_level_filter() as u8) <= (self.level as u8)
    }

    /// 获取采集器的引用（可克隆给其他生产者线程）
    pub fn collector(&self) -> &Arc<BufferingCollector> {
        &self.collector
    }

    /// 记录一条日志
    pub fn log(&self, record: &Record) {
        if self.should_log(&record.metadata.level) {
            self.collector.accept(record.clone());
        }
    }

    /// 强制刷新缓冲区
    pub fn flush(&self) {
        self.collector.flush();
    }

    /// 关闭投递器 - 刷新缓冲区并等待工作线程排空队列
    ///
    /// 显式调用与Drop等价：两者都先刷新采集器缓冲区，
    /// 再停止工作线程排空队列，缓冲中未发送的记录不会丢失。
    pub fn shutdown(self) {
        // 实际收尾在Drop中完成
    }
}

impl<S: StreamSink> Drop for ShipperCore<S> {
    fn drop(&mut self) {
        // 先刷新缓冲区，残留记录成批入队后再停止工作线程
        self.collector.flush();
        self.worker.stop();
    }
}

/// 投递构建器 - 极简设计
pub struct ShipperBuilder {
    level: LevelFilter,
    config: ShipperConfig,
    formatter: Option<FormatFn>,
}

impl ShipperBuilder {
    /// 创建新的投递构建器
    pub fn new() -> Self {
        Self {
            level: LevelFilter::Info,
            config: ShipperConfig::default(),
            formatter: None,
        }
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// 设置缓冲区容量
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// 设置目标流名称
    pub fn with_stream_name<T: Into<String>>(mut self, name: T) -> Self {
        self.config.stream_name = name.into();
        self
    }

    /// 设置分区键
    pub fn with_partition_key<T: Into<String>>(mut self, key: T) -> Self {
        self.config.partition_key = key.into();
        self
    }

    /// 设置自定义格式化函数
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Record) -> std::io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// 构建投递器并启动工作线程
    ///
    /// 配置无效或目标不可达时立即返回错误（fail-fast），
    /// 不会把失败推迟到第一次发送。
    pub fn build<S: StreamSink>(self, sink: S) -> Result<ShipperCore<S>, ShipperError> {
        self.config.validate().map_err(ShipperError::new)?;

        let (sender, receiver) = dispatch_channel();
        let formatter = self
            .formatter
            .unwrap_or_else(|| Box::new(crate::codec::binary_format));

        let collector = Arc::new(BufferingCollector::new(
            self.config.capacity,
            formatter,
            sender.clone(),
        ));
        let mut worker = DeliveryWorker::new(sink, receiver, sender, &self.config)?;
        worker.start()?;

        Ok(ShipperCore {
            level: self.level,
            collector,
            worker,
        })
    }
}

impl Default for ShipperBuilder {
    fn default() -> Self {
        Self::new()
    }
}
