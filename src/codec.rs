//! 编解码辅助工具 - 默认格式化函数与数据包封包解包

use std::io;

use crate::config::{Record, WireRecord};
use crate::sink::SinkEntry;

/// 默认二进制格式化函数 - Record转WireRecord后bincode编码
pub fn binary_format(record: &Record) -> io::Result<Vec<u8>> {
    let wire = WireRecord::from(record);
    bincode::serde::encode_to_vec(&wire, bincode::config::standard())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// 文本格式化函数 - 带本地时间戳的单行文本
pub fn text_format(record: &Record) -> io::Result<Vec<u8>> {
    use chrono::Local;

    let now = Local::now();
    let timestamp = now.format("%Y-%m-%d %H:%M:%S%.3f");

    Ok(format!(
        "{} [{}] {} {}:{} - {}\n",
        timestamp,
        record.metadata.level,
        record.metadata.target,
        record.file.as_deref().unwrap_or("unknown"),
        record.line.unwrap_or(0),
        record.args
    )
    .into_bytes())
}

/// 数据包封包解包工具
pub struct PacketHelper;

impl PacketHelper {
    /// 将sink数据编码为UDP数据包
    pub fn encode_entry(entry: &SinkEntry) -> io::Result<Vec<u8>> {
        bincode::serde::encode_to_vec(entry, bincode::config::standard())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// 将UDP数据包解码为sink数据
    pub fn decode_entry(data: &[u8]) -> io::Result<SinkEntry> {
        bincode::serde::decode_from_slice(data, bincode::config::standard())
            .map(|(entry, _)| entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// 将负载解码为WireRecord（负载由binary_format产生时适用）
    pub fn decode_payload(data: &[u8]) -> io::Result<WireRecord> {
        bincode::serde::decode_from_slice(data, bincode::config::standard())
            .map(|(record, _)| record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// 验证UDP数据包的有效性
    pub fn validate_packet(data: &[u8]) -> bool {
        Self::decode_entry(data).is_ok()
    }
}
