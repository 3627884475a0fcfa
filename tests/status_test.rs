//! Status-merge endpoints: catalog truth joined with live presence.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn start_test_server() -> (SocketAddr, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp.path().to_str().unwrap().to_string();

    let db = polewatch_server::db::init_db(&data_dir).expect("Failed to init DB");
    {
        let conn = db.lock().unwrap();
        conn.execute_batch(
            "INSERT INTO zones (id, name) VALUES (1, 'Harbor');
            INSERT INTO poles (id, zone_id, code, router_ip) VALUES
                (1, 1, 'P2', '10.0.7.1'),
                (2, 1, 'P9', '10.0.7.2');
            INSERT INTO cameras (id, pole_id, ip) VALUES
                (1, 1, '10.11.5.144'),
                (2, 1, '10.11.5.145'),
                (3, 2, '10.11.9.17');",
        )
        .expect("Failed to seed catalog");
    }

    let state = polewatch_server::state::AppState::new(db);
    let app = polewatch_server::routes::build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, tmp)
}

async fn get_json(addr: SocketAddr, path: &str) -> Value {
    reqwest::Client::new()
        .get(format!("http://{addr}{path}"))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("invalid json body")
}

/// Connect a field unit, report it online, and report one camera online.
async fn bring_up_unit(addr: SocketAddr, pole_code: &str, camera_ip: &str) -> WsStream {
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("Failed to connect");

    // assigned-connection-id frame
    let _ = tokio::time::timeout(Duration::from_secs(2), ws.next()).await;

    for (event, data) in [
        (
            "unit-online",
            json!({ "pole_code": pole_code, "router_ip": "10.0.7.1", "file_server_id": "fs-7" }),
        ),
        (
            "camera-online",
            json!({ "camera_ip": camera_ip, "pole_code": pole_code }),
        ),
    ] {
        let frame = json!({ "event": event, "data": data });
        ws.send(Message::Text(frame.to_string().into()))
            .await
            .expect("send failed");
    }

    // Let the server process both reports before the caller queries status.
    tokio::time::sleep(Duration::from_millis(150)).await;
    ws
}

fn entry<'a>(list: &'a Value, key: &str, value: &str) -> &'a Value {
    list.as_array()
        .expect("expected an array body")
        .iter()
        .find(|item| item[key] == value)
        .unwrap_or_else(|| panic!("no entry with {key} = {value}"))
}

#[tokio::test]
async fn poles_report_dark_until_a_unit_connects() {
    let (addr, _tmp) = start_test_server().await;

    let poles = get_json(addr, "/api/status/poles").await;
    assert_eq!(poles.as_array().unwrap().len(), 2);
    assert_eq!(entry(&poles, "code", "P2")["status"], 0);
    assert_eq!(entry(&poles, "code", "P9")["status"], 0);
    assert_eq!(entry(&poles, "code", "P2")["camera_count"], 2);
    assert_eq!(entry(&poles, "code", "P2")["zone_name"], "Harbor");

    let _unit = bring_up_unit(addr, "P2", "10.11.5.144").await;

    let poles = get_json(addr, "/api/status/poles").await;
    assert_eq!(entry(&poles, "code", "P2")["status"], 1);
    assert_eq!(entry(&poles, "code", "P9")["status"], 0, "other poles stay dark");
}

#[tokio::test]
async fn camera_status_follows_live_reports() {
    let (addr, _tmp) = start_test_server().await;

    let _unit = bring_up_unit(addr, "P2", "10.11.5.144").await;

    let cameras = get_json(addr, "/api/status/poles/P2/cameras").await;
    assert_eq!(cameras.as_array().unwrap().len(), 2);
    assert_eq!(entry(&cameras, "camera_ip", "10.11.5.144")["status"], 1);
    // Catalogued but never reported: present in the merge, dark.
    assert_eq!(entry(&cameras, "camera_ip", "10.11.5.145")["status"], 0);
}

#[tokio::test]
async fn unknown_pole_yields_an_empty_list() {
    let (addr, _tmp) = start_test_server().await;

    let cameras = get_json(addr, "/api/status/poles/P404/cameras").await;
    assert_eq!(cameras, json!([]));
}
