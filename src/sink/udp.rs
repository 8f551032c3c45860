//! UDP流式sink

use std::sync::Arc;
use dashmap::DashMap;
use tokio::net::UdpSocket;
use tokio::runtime::Runtime;

use crate::codec::PacketHelper;
use crate::config::NetworkConfig;
use crate::sink::{SinkEntry, StreamSink};

/// UDP连接池
struct UdpConnectionPool {
    connections: DashMap<String, Arc<UdpSocket>>,
    runtime: Arc<Runtime>,
}

impl UdpConnectionPool {
    /// 创建新的连接池
    fn new() -> Result<Self, String> {
        let runtime = Runtime::new()
            .map_err(|e| format!("创建tokio运行时失败: {}", e))?;

        Ok(Self {
            connections: DashMap::new(),
            runtime: Arc::new(runtime),
        })
    }

    /// 获取或创建UDP连接
    async fn get_connection(&self, addr: &str) -> Option<Arc<UdpSocket>> {
        if let Some(socket) = self.connections.get(addr) {
            return Some(socket.clone());
        }

        match UdpSocket::bind("0.0.0.0:0").await {
            Ok(socket) => {
                if let Ok(()) = socket.connect(addr).await {
                    let socket = Arc::new(socket);
                    self.connections.insert(addr.to_string(), socket.clone());
                    Some(socket)
                } else {
                    None
                }
            }
            Err(_) => None,
        }
    }

    /// 发送数据
    async fn send_data(&self, addr: &str, data: &[u8]) -> std::io::Result<()> {
        if let Some(socket) = self.get_connection(addr).await {
            socket.send(data).await?;
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Failed to establish UDP connection",
            ))
        }
    }
}

impl Drop for UdpConnectionPool {
    fn drop(&mut self) {
        self.connections.clear();
    }
}

/// UDP流式sink
///
/// 每条数据作为独立数据包发送，包内部带有界重试。
/// 重试是sink内部策略，对工作线程不可见；工作线程层面
/// 批次投递仍是至多一次。
pub struct UdpStreamSink {
    addr: String,
    retry_count: u32,
    pool: UdpConnectionPool,
}

impl UdpStreamSink {
    /// 创建新的UDP sink
    pub fn new(config: &NetworkConfig) -> Result<Self, String> {
        Ok(Self {
            addr: format!("{}:{}", config.server_addr, config.server_port),
            retry_count: 3,
            pool: UdpConnectionPool::new()?,
        })
    }

    /// 设置重试次数
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count.max(1);
        self
    }

    /// 带重试地发送单个数据包
    fn send_with_retry(&self, data: &[u8]) -> Result<(), String> {
        let pool = &self.pool;
        let addr = &self.addr;
        let retry_count = self.retry_count;

        pool.runtime.block_on(async {
            let mut last_err = String::new();
            for attempt in 0..retry_count {
                match pool.send_data(addr, data).await {
                    Ok(()) => return Ok(()),
                    Err(e) => {
                        last_err = e.to_string();
                        if attempt + 1 < retry_count {
                            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                        }
                    }
                }
            }
            Err(format!("UDP发送在{}次尝试后失败: {}", retry_count, last_err))
        })
    }
}

impl StreamSink for UdpStreamSink {
    fn name(&self) -> &'static str {
        "udp"
    }

    fn is_ready(&self) -> bool {
        // 能否绑定本地socket并连接到目标地址
        let addr = self.addr.clone();
        self.pool.runtime.block_on(async {
            match UdpSocket::bind("0.0.0.0:0").await {
                Ok(socket) => socket.connect(&addr).await.is_ok(),
                Err(_) => false,
            }
        })
    }

    fn send(&mut self, entries: &[SinkEntry]) -> Result<(), String> {
        for entry in entries {
            let frame = PacketHelper::encode_entry(entry)
                .map_err(|e| format!("编码sink数据失败: {}", e))?;
            self.send_with_retry(&frame)?;
        }
        Ok(())
    }
}
