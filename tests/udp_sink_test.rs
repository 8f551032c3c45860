//! UDP sink端到端测试
//! 本地回环上起一个接收socket，验证数据包能送达并解码

use std::net::UdpSocket;
use std::time::Duration;

use rat_shipper::{SinkEntry, StreamSink, UdpStreamSink};
use rat_shipper::codec::PacketHelper;
use rat_shipper::config::NetworkConfig;

fn local_receiver() -> (UdpSocket, NetworkConfig) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("绑定本地接收socket失败");
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();

    let config = NetworkConfig {
        server_addr: "127.0.0.1".to_string(),
        server_port: port,
        ..NetworkConfig::default()
    };
    (socket, config)
}

#[test]
fn test_udp_sink_is_ready() {
    let (_receiver, config) = local_receiver();
    let sink = UdpStreamSink::new(&config).unwrap();
    assert!(sink.is_ready());
}

#[test]
fn test_udp_sink_delivers_entries() {
    let (receiver, config) = local_receiver();
    let mut sink = UdpStreamSink::new(&config).unwrap();

    let entries = vec![
        SinkEntry {
            partition_key: "shard-0".to_string(),
            payload: b"first".to_vec(),
        },
        SinkEntry {
            partition_key: "shard-0".to_string(),
            payload: b"second".to_vec(),
        },
    ];
    sink.send(&entries).unwrap();

    // 每条数据一个数据包，按发送顺序到达本地回环
    let mut buf = [0u8; 2048];
    for expected in &entries {
        let (len, _) = receiver.recv_from(&mut buf).expect("接收UDP数据包超时");
        let decoded = PacketHelper::decode_entry(&buf[..len]).unwrap();
        assert_eq!(&decoded, expected);
    }
}
