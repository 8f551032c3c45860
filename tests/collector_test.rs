//! 缓冲采集器测试
//! 验证容量触发、顺序保持与显式flush行为

use std::sync::Arc;

use rat_shipper::{BufferingCollector, DispatchMessage, FormatFn, dispatch_channel};
use rat_shipper::config::{Metadata, Record};

fn make_record(msg: &str) -> Record {
    Record {
        metadata: Arc::new(Metadata::default()),
        args: msg.to_string(),
        module_path: Some("collector_test".to_string()),
        file: Some("collector_test.rs".to_string()),
        line: Some(1),
    }
}

fn plain_formatter() -> FormatFn {
    Box::new(|record| Ok(record.args.clone().into_bytes()))
}

fn expect_batch(message: DispatchMessage) -> Vec<Vec<u8>> {
    match message {
        DispatchMessage::Batch(batch) => batch,
        DispatchMessage::Stop => panic!("未预期的停止哨兵"),
    }
}

#[test]
fn test_no_enqueue_below_capacity() {
    let (sender, receiver) = dispatch_channel();
    let collector = BufferingCollector::new(5, plain_formatter(), sender);

    for i in 0..4 {
        collector.accept(make_record(&format!("记录{}", i)));
    }

    // 未达容量，不应有任何批次入队
    assert!(receiver.try_recv().is_err());
    assert_eq!(collector.buffered(), 4);
}

#[test]
fn test_capacity_triggers_single_batch() {
    let (sender, receiver) = dispatch_channel();
    let collector = BufferingCollector::new(3, plain_formatter(), sender);

    collector.accept(make_record("a"));
    collector.accept(make_record("b"));
    collector.accept(make_record("c"));

    // 恰好一个批次，顺序与缓冲顺序一致
    let batch = expect_batch(receiver.try_recv().unwrap());
    assert_eq!(batch, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    assert!(receiver.try_recv().is_err());

    // 刷新后缓冲区立即为空
    assert_eq!(collector.buffered(), 0);
}

#[test]
fn test_explicit_flush_below_capacity() {
    let (sender, receiver) = dispatch_channel();
    let collector = BufferingCollector::new(10, plain_formatter(), sender);

    collector.accept(make_record("x"));
    collector.accept(make_record("y"));
    collector.flush();

    let batch = expect_batch(receiver.try_recv().unwrap());
    assert_eq!(batch, vec![b"x".to_vec(), b"y".to_vec()]);
    assert_eq!(collector.buffered(), 0);
}

#[test]
fn test_accept_after_flush_starts_new_buffer() {
    let (sender, receiver) = dispatch_channel();
    let collector = BufferingCollector::new(3, plain_formatter(), sender);

    collector.accept(make_record("a"));
    collector.accept(make_record("b"));
    collector.accept(make_record("c"));
    let _ = expect_batch(receiver.try_recv().unwrap());

    // 新记录进入全新的空缓冲区，不触发新批次
    collector.accept(make_record("d"));
    assert_eq!(collector.buffered(), 1);
    assert!(receiver.try_recv().is_err());
}

#[test]
fn test_repeated_flush_no_duplicates() {
    let (sender, receiver) = dispatch_channel();
    let collector = BufferingCollector::new(10, plain_formatter(), sender);

    collector.accept(make_record("once"));
    collector.flush();
    collector.flush();
    collector.flush();

    let batch = expect_batch(receiver.try_recv().unwrap());
    assert_eq!(batch, vec![b"once".to_vec()]);
    // 空缓冲区的flush不产生批次，记录不会重复投递
    assert!(receiver.try_recv().is_err());
}

#[test]
fn test_accept_survives_closed_queue() {
    let (sender, receiver) = dispatch_channel();
    let collector = BufferingCollector::new(2, plain_formatter(), sender);
    drop(receiver);

    // 队列消费端已关闭，accept和flush依然不panic
    collector.accept(make_record("a"));
    collector.accept(make_record("b"));
    collector.flush();
    assert_eq!(collector.buffered(), 0);
}
