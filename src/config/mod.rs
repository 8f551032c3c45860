//! 配置模块

use serde::{Serialize, Deserialize};

/// 默认分区键 - 假定目标流只有一个分片
pub const DEFAULT_PARTITION_KEY: &str = "thereisonlyoneshard";

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Level::Error => LevelFilter::Error,
            Level::Warn => LevelFilter::Warn,
            Level::Info => LevelFilter::Info,
            Level::Debug => LevelFilter::Debug,
            Level::Trace => LevelFilter::Trace,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Error => write!(f, "ERROR"),
            Level::Warn => write!(f, "WARN"),
            Level::Info => write!(f, "INFO"),
            Level::Debug => write!(f, "DEBUG"),
            Level::Trace => write!(f, "TRACE"),
        }
    }
}

/// 日志级别过滤器
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LevelFilter {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// 日志元数据
#[derive(Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub level: Level,
    pub target: String,
    pub auth_token: Option<String>,
    pub app_id: Option<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            level: Level::Info,
            target: String::new(),
            auth_token: None,
            app_id: None,
        }
    }
}

/// 日志记录 - 由宿主日志前端构造，创建后不可变
#[derive(Clone)]
pub struct Record {
    pub metadata: std::sync::Arc<Metadata>,
    pub args: String,
    pub module_path: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// 投递配置
#[derive(Debug, Clone)]
pub struct ShipperConfig {
    /// 缓冲区容量（条数），达到后自动flush
    pub capacity: usize,
    /// 目标流名称
    pub stream_name: String,
    /// 分区键（所有记录共用同一个键）
    pub partition_key: String,
}

impl ShipperConfig {
    /// 创建指定目标流的配置
    pub fn new<S: Into<String>>(capacity: usize, stream_name: S) -> Self {
        Self {
            capacity,
            stream_name: stream_name.into(),
            partition_key: DEFAULT_PARTITION_KEY.to_string(),
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), String> {
        // 验证缓冲区容量
        if self.capacity == 0 {
            return Err("配置错误: 缓冲区容量不能为 0".to_string());
        }
        if self.capacity > 10_000 {
            return Err("配置错误: 缓冲区容量过大 (最大 10000条)".to_string());
        }

        // 验证目标流名称
        if self.stream_name.is_empty() {
            return Err("配置错误: 目标流名称不能为空".to_string());
        }

        // 验证分区键
        if self.partition_key.is_empty() {
            return Err("配置错误: 分区键不能为空".to_string());
        }

        Ok(())
    }
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            capacity: 500,      // 500条 - 与下游单次批量请求上限对齐
            stream_name: "default_stream".to_string(),
            partition_key: DEFAULT_PARTITION_KEY.to_string(),
        }
    }
}

/// 网络目标配置
#[derive(Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub server_addr: String,
    pub server_port: u16,
    pub auth_token: String,
    pub app_id: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1".to_string(),
            server_port: 5140,
            auth_token: "default_token".to_string(),
            app_id: "default_app".to_string(),
        }
    }
}

/// 用于网络传输的日志记录
#[derive(Serialize, Deserialize)]
pub struct WireRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub module_path: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub timestamp: u64,
    pub auth_token: Option<String>,
    pub app_id: Option<String>,
}

impl From<&Record> for WireRecord {
    fn from(record: &Record) -> Self {
        WireRecord {
            level: record.metadata.level,
            target: record.metadata.target.clone(),
            message: record.args.clone(),
            module_path: record.module_path.clone(),
            file: record.file.clone(),
            line: record.line,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            auth_token: record.metadata.auth_token.clone(),
            app_id: record.metadata.app_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validate() {
        let config = ShipperConfig::new(3, "logs");
        assert!(config.validate().is_ok());

        let zero = ShipperConfig::new(0, "logs");
        assert!(zero.validate().is_err());

        let no_stream = ShipperConfig::new(3, "");
        assert!(no_stream.validate().is_err());

        let mut no_key = ShipperConfig::new(3, "logs");
        no_key.partition_key = String::new();
        assert!(no_key.validate().is_err());
    }

    #[test]
    fn test_default_partition_key() {
        let config = ShipperConfig::default();
        assert_eq!(config.partition_key, DEFAULT_PARTITION_KEY);
        assert_eq!(config.capacity, 500);
    }
}
