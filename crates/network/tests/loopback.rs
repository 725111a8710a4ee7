//! Loopback tests for the connection codecs

use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use w3net_core::{Encoding, FactoryCache, W3Error};
use w3net_network::{BncsConn, W3gsConn};
use w3net_protocol::{bncs, w3gs};

async fn w3gs_pair() -> (W3gsConn<FactoryCache<w3gs::DefaultFactory, w3gs::Packet>>, W3gsConn<FactoryCache<w3gs::DefaultFactory, w3gs::Packet>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let connect = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
    let (accepted, _) = listener.accept().await.unwrap();
    let connected = connect.await.unwrap();

    let enc = Encoding::new(30);
    (
        W3gsConn::new(accepted, FactoryCache::new(w3gs::DefaultFactory), enc),
        W3gsConn::new(connected, FactoryCache::new(w3gs::DefaultFactory), enc),
    )
}

#[tokio::test]
async fn w3gs_ping_pong() {
    let (mut host, mut joiner) = w3gs_pair().await;

    host.send(&w3gs::Packet::Ping(w3gs::Ping { payload: 7 }))
        .await
        .unwrap();

    match joiner.next_packet(Duration::from_secs(5)).await.unwrap() {
        w3gs::Packet::Ping(ping) => {
            joiner
                .send(&w3gs::Packet::Pong(w3gs::Pong {
                    payload: ping.payload,
                }))
                .await
                .unwrap();
        }
        other => panic!("expected ping, got {other:?}"),
    }

    let pong = host.next_packet(Duration::from_secs(5)).await.unwrap();
    assert_eq!(pong, w3gs::Packet::Pong(w3gs::Pong { payload: 7 }));
}

#[tokio::test]
async fn w3gs_coalesced_frames_split_cleanly() {
    let (mut host, mut joiner) = w3gs_pair().await;

    host.send(&w3gs::Packet::CountDownStart(w3gs::CountDownStart))
        .await
        .unwrap();
    host.send(&w3gs::Packet::CountDownEnd(w3gs::CountDownEnd))
        .await
        .unwrap();
    host.send(&w3gs::Packet::PlayerLoaded(w3gs::PlayerLoaded { player_id: 3 }))
        .await
        .unwrap();

    let deadline = Duration::from_secs(5);
    assert_eq!(
        joiner.next_packet(deadline).await.unwrap(),
        w3gs::Packet::CountDownStart(w3gs::CountDownStart)
    );
    assert_eq!(
        joiner.next_packet(deadline).await.unwrap(),
        w3gs::Packet::CountDownEnd(w3gs::CountDownEnd)
    );
    assert_eq!(
        joiner.next_packet(deadline).await.unwrap(),
        w3gs::Packet::PlayerLoaded(w3gs::PlayerLoaded { player_id: 3 })
    );
}

#[tokio::test]
async fn w3gs_read_deadline_expires() {
    let (_host, mut joiner) = w3gs_pair().await;

    let err = joiner
        .next_packet(Duration::from_millis(50))
        .await
        .unwrap_err();
    assert_eq!(err, W3Error::Timeout);
    assert!(!joiner.is_closed());
}

#[tokio::test]
async fn w3gs_closed_codec_rejects_operations() {
    let (mut host, _joiner) = w3gs_pair().await;

    host.close().await;
    assert!(host.is_closed());

    let err = host
        .send(&w3gs::Packet::LeaveAck(w3gs::LeaveAck))
        .await
        .unwrap_err();
    assert_eq!(err, W3Error::ConnectionClosed);

    let err = host.next_packet(Duration::from_millis(50)).await.unwrap_err();
    assert_eq!(err, W3Error::ConnectionClosed);
}

#[tokio::test]
async fn w3gs_peer_eof_is_terminal() {
    let (host, mut joiner) = w3gs_pair().await;
    drop(host);

    let err = joiner
        .next_packet(Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(err, W3Error::ConnectionClosed);
    assert!(joiner.is_closed());
}

#[tokio::test]
async fn bncs_logon_exchange() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let connect = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
    let (accepted, _) = listener.accept().await.unwrap();
    let mut server = BncsConn::new(accepted);
    let mut client = BncsConn::new(connect.await.unwrap());

    client
        .send(&bncs::Packet::Ping(bncs::Ping { payload: 123 }))
        .await
        .unwrap();
    client
        .send(&bncs::Packet::ChatCommand(bncs::ChatCommand {
            text: "/join The Void".to_string(),
        }))
        .await
        .unwrap();

    let deadline = Duration::from_secs(5);
    assert_eq!(
        server.next_client_packet(deadline).await.unwrap(),
        bncs::Packet::Ping(bncs::Ping { payload: 123 })
    );
    assert_eq!(
        server.next_client_packet(deadline).await.unwrap(),
        bncs::Packet::ChatCommand(bncs::ChatCommand {
            text: "/join The Void".to_string(),
        })
    );

    server
        .send(&bncs::Packet::ChatEvent(bncs::ChatEvent {
            event_id: bncs::EVENT_CHANNEL,
            user_flags: 0,
            ping: 31,
            user_name: "w3net".to_string(),
            text: "The Void".to_string(),
        }))
        .await
        .unwrap();

    match client.next_server_packet(deadline).await.unwrap() {
        bncs::Packet::ChatEvent(ev) => assert_eq!(ev.text, "The Void"),
        other => panic!("expected chat event, got {other:?}"),
    }
}

#[tokio::test]
async fn bncs_unknown_packet_is_forwarded_verbatim() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let connect = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
    let (accepted, _) = listener.accept().await.unwrap();
    let mut server = BncsConn::new(accepted);
    let mut client = BncsConn::new(connect.await.unwrap());

    client
        .send(&bncs::Packet::Unknown(bncs::UnknownPacket {
            id: 0xFE,
            blob: vec![0xFF, 0xFE, 0x06, 0x00, 0xAA, 0xBB],
        }))
        .await
        .unwrap();

    let pkt = server
        .next_client_packet(Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(
        pkt,
        bncs::Packet::Unknown(bncs::UnknownPacket {
            id: 0xFE,
            blob: vec![0xFF, 0xFE, 0x06, 0x00, 0xAA, 0xBB],
        })
    );
}
