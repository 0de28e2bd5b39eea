//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use payment_gate::{GateConfig, HttpServer, Shutdown};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub const ADDRESS: &str = "19Tf5K7eZY6umSpaCktKfaf5ZTWv7qQvw6";

/// Start a programmable mock explorer; `f` maps a request path to a reply.
pub async fn start_mock_explorer<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(path) = read_request_path(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_path(socket: &mut TcpStream) -> Option<String> {
    let (reader, _) = socket.split();
    let mut reader = BufReader::new(reader);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await.ok()?;

    // Drain headers so closing the socket does not reset the connection.
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await.ok()?;
        if n == 0 || line == "\r\n" {
            break;
        }
    }

    request_line.split_whitespace().nth(1).map(str::to_string)
}

/// Mutable explorer scenario shared with a mock explorer.
#[derive(Debug, Clone)]
pub struct Chain {
    pub txs: String,
    pub tip: u64,
    pub failing: bool,
    pub delay: Option<Duration>,
    pub tip_requests: u32,
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            txs: "[]".to_string(),
            tip: 0,
            failing: false,
            delay: None,
            tip_requests: 0,
        }
    }
}

/// Start a mock explorer serving the Esplora endpoints from `chain`.
pub async fn start_chain_explorer(chain: Arc<Mutex<Chain>>) -> SocketAddr {
    start_mock_explorer(move |path| {
        let chain = chain.clone();
        async move {
            let (reply, delay) = {
                let mut chain = chain.lock().unwrap();
                let reply = if chain.failing {
                    (503, "unavailable".to_string())
                } else if path == format!("/address/{}/txs", ADDRESS) {
                    (200, chain.txs.clone())
                } else if path == "/blocks/tip/height" {
                    chain.tip_requests += 1;
                    (200, chain.tip.to_string())
                } else {
                    (404, "not found".to_string())
                };
                (reply, chain.delay)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            reply
        }
    })
    .await
}

/// JSON for one transaction paying `sats` to the watched address.
pub fn incoming_tx(txid: &str, sats: u64, block_height: Option<u64>) -> String {
    let status = match block_height {
        Some(h) => format!(r#"{{"confirmed":true,"block_height":{}}}"#, h),
        None => r#"{"confirmed":false}"#.to_string(),
    };
    format!(
        r#"{{"txid":"{}","status":{},"vout":[{{"scriptpubkey_address":"{}","value":{}}},{{"scriptpubkey_address":"change","value":1234}}]}}"#,
        txid, status, ADDRESS, sats
    )
}

/// Config pointing at `explorer`, with state and bundle under `dir`.
pub fn gate_config(explorer: SocketAddr, dir: &std::path::Path) -> GateConfig {
    let mut config = GateConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.explorer.base_url = format!("http://{}", explorer);
    config.explorer.timeout_secs = 2;
    config.explorer.use_system_proxy = false;
    config.payment.address = ADDRESS.to_string();
    config.storage.state_path = dir.join("payment_state.json").to_string_lossy().into_owned();
    config.bundle.directory = dir.join("wallet_folder").to_string_lossy().into_owned();
    config.bundle.static_dir = dir.join("static").to_string_lossy().into_owned();
    config
}

/// Run a gate server on an ephemeral port.
pub async fn spawn_gate(config: GateConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
