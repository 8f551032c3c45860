//! 投递工作线程 - 轮询调度队列，把批次转发给外部sink

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use crossbeam_channel::{Sender, Receiver};

use crate::config::ShipperConfig;
use crate::core::{DispatchMessage, ShipperError};
use crate::sink::{SinkEntry, StreamSink};

/// 工作线程状态机: Stopped -> Running -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Stopped,
    Running,
    Draining,
}

/// 投递工作线程
///
/// 独占持有sink，单线程消费调度队列，批次按入队顺序投递。
/// 停止是协作式的：置标志并推入哨兵，线程处理完手头的批次后
/// 进入排空阶段，把队列中剩余批次全部投递完再退出。
pub struct DeliveryWorker<S: StreamSink> {
    sink: Option<S>,
    receiver: Option<Receiver<DispatchMessage>>,
    sender: Sender<DispatchMessage>,
    partition_key: String,
    stop_flag: Arc<AtomicBool>,
    worker_thread: Option<thread::JoinHandle<()>>,
    state: WorkerState,
}

impl<S: StreamSink> DeliveryWorker<S> {
    /// 创建工作线程包装（尚未启动）
    ///
    /// 构造时校验配置和sink就绪状态，失败立即返回配置错误，
    /// 此刻没有任何线程被spawn。
    pub fn new(
        sink: S,
        receiver: Receiver<DispatchMessage>,
        sender: Sender<DispatchMessage>,
        config: &ShipperConfig,
    ) -> Result<Self, ShipperError> {
        config.validate().map_err(ShipperError::new)?;
        if !sink.is_ready() {
            return Err(ShipperError::new(format!(
                "配置错误: 目标 {} 不可达或未就绪",
                sink.name()
            )));
        }

        Ok(Self {
            sink: Some(sink),
            receiver: Some(receiver),
            sender,
            partition_key: config.partition_key.clone(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker_thread: None,
            state: WorkerState::Stopped,
        })
    }

    /// 获取当前状态
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// 启动工作线程
    ///
    /// 运行中重复启动返回错误；停止后的工作线程不支持重新启动
    /// （sink与队列接收端已被消费），同样返回错误。
    pub fn start(&mut self) -> Result<(), ShipperError> {
        let (sink, receiver) = match (self.sink.take(), self.receiver.take()) {
            (Some(sink), Some(receiver)) => (sink, receiver),
            _ if self.worker_thread.is_some() => {
                return Err(ShipperError::new("工作线程已经在运行"));
            }
            _ => {
                return Err(ShipperError::new("工作线程已停止，不支持重新启动"));
            }
        };
        let stop_flag = self.stop_flag.clone();
        let partition_key = self.partition_key.clone();

        self.worker_thread = Some(thread::spawn(move || {
            Self::monitor(sink, receiver, stop_flag, partition_key);
        }));
        self.state = WorkerState::Running;
        Ok(())
    }

    /// 停止工作线程
    ///
    /// 置停止标志并推入哨兵（唤醒阻塞在recv上的线程），
    /// 等待线程排空队列后join。可重复调用。
    pub fn stop(&mut self) {
        if let Some(thread) = self.worker_thread.take() {
            self.state = WorkerState::Draining;
            self.stop_flag.store(true, Ordering::SeqCst);
            let _ = self.sender.send(DispatchMessage::Stop);
            let _ = thread.join();
        }
        self.state = WorkerState::Stopped;
    }

    /// 工作线程主体，分两个阶段
    fn monitor(
        mut sink: S,
        receiver: Receiver<DispatchMessage>,
        stop_flag: Arc<AtomicBool>,
        partition_key: String,
    ) {
        // 阶段1：阻塞等待，直到停止标志置位或收到哨兵。
        // 投递失败只打印诊断，循环绝不因瞬时错误而死亡。
        while !stop_flag.load(Ordering::SeqCst) {
            match receiver.recv() {
                Ok(DispatchMessage::Batch(batch)) => {
                    if let Err(e) = Self::handle(&mut sink, &partition_key, batch) {
                        eprintln!("[{}] 批次投递失败，丢弃该批次: {}", sink.name(), e);
                    }
                }
                Ok(DispatchMessage::Stop) => break,
                // 所有发送端已关闭，直接进入排空阶段
                Err(_) => break,
            }
        }

        // 阶段2：排空。哨兵入队前的批次可能还留在队列里，
        // 处理到队列为空或遇到哨兵为止。
        loop {
            match receiver.try_recv() {
                Ok(DispatchMessage::Batch(batch)) => {
                    if let Err(e) = Self::handle(&mut sink, &partition_key, batch) {
                        eprintln!("[{}] 排空时批次投递失败，丢弃该批次: {}", sink.name(), e);
                    }
                }
                Ok(DispatchMessage::Stop) => break,
                Err(_) => break,
            }
        }
    }

    /// 将批次配成 (分区键, 数据) 对并调用sink发送
    ///
    /// sink返回的任何错误都在此被丢弃，不重试不重新入队，
    /// 至多一次投递。
    ///
    /// TODO: 每条记录独立分区键尚未实现，当前所有记录共用配置中的单一键。
    fn handle(sink: &mut S, partition_key: &str, batch: Vec<Vec<u8>>) -> Result<(), String> {
        let entries: Vec<SinkEntry> = batch
            .into_iter()
            .map(|payload| SinkEntry {
                partition_key: partition_key.to_string(),
                payload,
            })
            .collect();
        sink.send(&entries)
    }
}

impl<S: StreamSink> Drop for DeliveryWorker<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
