//! 缓冲采集器 - 在生产者线程上累积日志记录，满容量时整批入队

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::config::Record;
use crate::core::DispatchMessage;

/// 格式化函数类型 - 由宿主日志前端注入，flush时每条记录调用一次
pub type FormatFn = Box<dyn Fn(&Record) -> io::Result<Vec<u8>> + Send + Sync>;

/// 缓冲采集器
///
/// 运行在调用日志API的任意线程上。`accept`/`flush` 永不阻塞、
/// 永不panic，投递路径上的任何失败都不会传回日志调用点。
pub struct BufferingCollector {
    capacity: usize,
    buffer: Mutex<Vec<Record>>,
    formatter: FormatFn,
    sender: Sender<DispatchMessage>,
    dropped: AtomicUsize,
}

impl BufferingCollector {
    /// 创建新的采集器
    pub fn new(capacity: usize, formatter: FormatFn, sender: Sender<DispatchMessage>) -> Self {
        Self {
            capacity,
            buffer: Mutex::new(Vec::with_capacity(capacity)),
            formatter,
            sender,
            dropped: AtomicUsize::new(0),
        }
    }

    /// 追加一条记录，达到容量后自动刷新
    ///
    /// 刷新在同一把锁内完成，不存在追加和刷新之间的竞争窗口。
    pub fn accept(&self, record: Record) {
        let mut buffer = self.buffer.lock();
        buffer.push(record);
        if buffer.len() >= self.capacity {
            self.flush_locked(&mut buffer);
        }
    }

    /// 强制刷新缓冲区（空缓冲区不产生批次）
    pub fn flush(&self) {
        let mut buffer = self.buffer.lock();
        self.flush_locked(&mut buffer);
    }

    /// 当前缓冲的记录数
    pub fn buffered(&self) -> usize {
        self.buffer.lock().len()
    }

    /// 因格式化失败被跳过的记录数
    pub fn dropped_records(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// 读取-格式化-入队-换空缓冲区在同一把锁内完成，
    /// 并发的accept不会看到半清空的缓冲区，记录不丢失不重复
    fn flush_locked(&self, buffer: &mut Vec<Record>) {
        if buffer.is_empty() {
            return;
        }

        let records = std::mem::replace(buffer, Vec::with_capacity(self.capacity));
        let mut batch = Vec::with_capacity(records.len());
        for record in &records {
            match (self.formatter)(record) {
                Ok(data) => batch.push(data),
                Err(e) => {
                    // 格式化失败：跳过该条并计数，批次中其余记录继续
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    eprintln!("格式化日志记录失败: {}", e);
                }
            }
        }

        if batch.is_empty() {
            return;
        }
        if let Err(e) = self.sender.send(DispatchMessage::Batch(batch)) {
            eprintln!("批次入队失败: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::config::Metadata;
    use crate::core::dispatch_channel;

    fn make_record(msg: &str) -> Record {
        Record {
            metadata: Arc::new(Metadata::default()),
            args: msg.to_string(),
            module_path: None,
            file: None,
            line: None,
        }
    }

    #[test]
    fn test_format_failure_skips_and_counts() {
        let (sender, receiver) = dispatch_channel();
        // "bad" 无法格式化，其余正常
        let formatter: FormatFn = Box::new(|record| {
            if record.args == "bad" {
                Err(io::Error::new(io::ErrorKind::InvalidData, "无法格式化"))
            } else {
                Ok(record.args.clone().into_bytes())
            }
        });
        let collector = BufferingCollector::new(3, formatter, sender);

        collector.accept(make_record("a"));
        collector.accept(make_record("bad"));
        collector.accept(make_record("b"));

        match receiver.try_recv().unwrap() {
            DispatchMessage::Batch(batch) => {
                assert_eq!(batch, vec![b"a".to_vec(), b"b".to_vec()]);
            }
            DispatchMessage::Stop => panic!("未预期的停止哨兵"),
        }
        assert_eq!(collector.dropped_records(), 1);
    }

    #[test]
    fn test_empty_flush_is_noop() {
        let (sender, receiver) = dispatch_channel();
        let formatter: FormatFn = Box::new(|record| Ok(record.args.clone().into_bytes()));
        let collector = BufferingCollector::new(3, formatter, sender);

        collector.flush();
        assert!(receiver.try_recv().is_err());
    }
}
