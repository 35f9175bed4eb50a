//! # Status server.
//!
//! [`StatusServer`] is polled once per scheduler tick. It never waits for a
//! client to show up: [`StatusServer::poll_once`] polls `accept` a single time
//! and returns `None` straight away when nobody is connecting.
//!
//! ## One exchange
//! ```text
//! accept (now_or_never) ──► hyper http1 (keep-alive off) ──► route
//!                                                            ├─ GET /data ──► 200 application/json (LotSnapshot)
//!                                                            └─ otherwise ──► 200 text/html (dashboard)
//!                       ──► response written ──► connection closed
//! ```
//! The whole exchange is bounded by `request_timeout` when it is non-zero. A
//! failed exchange closes the connection and is reported to the caller; lot
//! state is only read, never changed.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use futures::FutureExt;
use http_body_util::Full;
use hyper::{
    Method, Request, Response,
    body::{Bytes, Incoming},
    header::CONTENT_TYPE,
    server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::core::{LotConfig, Timestamp};
use crate::error::{LotError, ServeError};
use crate::lot::SlotRegistry;

const DASHBOARD: &str = include_str!("dashboard.html");

/// Smallest read buffer hyper accepts for a request head.
const MIN_REQUEST_LIMIT: usize = 8192;

/// What a request asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// JSON snapshot (`GET /data`).
    Data,
    /// HTML dashboard (everything else).
    Dashboard,
}

impl Route {
    /// Routes a parsed request: `GET /data` gets the snapshot, anything else the page.
    pub fn of<B>(req: &Request<B>) -> Self {
        if req.method() == Method::GET && req.uri().path() == "/data" {
            Route::Data
        } else {
            Route::Dashboard
        }
    }

    /// Short name used in events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Data => "data",
            Route::Dashboard => "dashboard",
        }
    }
}

/// Outcome of one accepted connection.
#[derive(Debug)]
pub struct Exchange {
    /// Remote address, if the accept itself succeeded.
    pub peer: Option<SocketAddr>,
    /// Route served, or why the exchange failed.
    pub result: Result<Route, ServeError>,
}

/// Non-blocking status endpoint.
#[derive(Debug)]
pub struct StatusServer {
    listener: TcpListener,
    request_limit: usize,
    request_timeout: Option<Duration>,
}

impl StatusServer {
    /// Binds a listener on `addr`.
    pub async fn bind<A>(addr: A, cfg: &LotConfig) -> Result<Self, LotError>
    where
        A: ToSocketAddrs + std::fmt::Display,
    {
        let shown = addr.to_string();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| LotError::Bind {
                addr: shown,
                source,
            })?;
        Ok(Self::from_listener(listener, cfg))
    }

    /// Wraps an already bound listener.
    pub fn from_listener(listener: TcpListener, cfg: &LotConfig) -> Self {
        Self {
            listener,
            request_limit: cfg.request_limit.max(MIN_REQUEST_LIMIT),
            request_timeout: cfg.request_deadline(),
        }
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Services at most one pending connection.
    ///
    /// Returns `None` when no client is waiting. Otherwise one request is read,
    /// answered from `lot.snapshot(now)` and the connection is closed before
    /// returning.
    pub async fn poll_once(&self, lot: &SlotRegistry, now: Timestamp) -> Option<Exchange> {
        let accepted = self.listener.accept().now_or_never()?;
        let (stream, peer) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                return Some(Exchange {
                    peer: None,
                    result: Err(ServeError::Io(e)),
                });
            }
        };

        let exchange = self.serve_connection(stream, lot, now);
        let result = match self.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, exchange).await {
                Ok(res) => res,
                Err(_) => Err(ServeError::Timeout { timeout: limit }),
            },
            None => exchange.await,
        };
        Some(Exchange {
            peer: Some(peer),
            result,
        })
    }

    async fn serve_connection(
        &self,
        stream: TcpStream,
        lot: &SlotRegistry,
        now: Timestamp,
    ) -> Result<Route, ServeError> {
        let served: Mutex<Option<Result<Route, ServeError>>> = Mutex::new(None);
        let service = service_fn(|req: Request<Incoming>| {
            let (route, response) = handle_request(&req, lot, now);
            *served.lock().unwrap_or_else(|e| e.into_inner()) = Some(route);
            async move { Ok::<_, Infallible>(response) }
        });

        http1::Builder::new()
            .keep_alive(false)
            .max_buf_size(self.request_limit)
            .serve_connection(TokioIo::new(stream), service)
            .await?;

        served
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .unwrap_or_else(|| {
                Err(ServeError::Malformed {
                    reason: "empty request".into(),
                })
            })
    }
}

fn handle_request(
    req: &Request<Incoming>,
    lot: &SlotRegistry,
    now: Timestamp,
) -> (Result<Route, ServeError>, Response<Full<Bytes>>) {
    let route = Route::of(req);
    match route {
        Route::Data => match lot.snapshot(now).to_json() {
            Ok(json) => (Ok(route), render(200, "application/json", Bytes::from(json))),
            Err(e) => (
                Err(ServeError::Encode(e)),
                render(500, "text/plain", Bytes::from_static(b"snapshot unavailable")),
            ),
        },
        Route::Dashboard => (
            Ok(route),
            render(
                200,
                "text/html; charset=utf-8",
                Bytes::from_static(DASHBOARD.as_bytes()),
            ),
        ),
    }
}

fn render(status: u16, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Full::new(body.clone()))
        .unwrap_or_else(|_| Response::new(Full::new(body)))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::core::{Clock, ManualClock};

    async fn server(cfg: &LotConfig) -> StatusServer {
        StatusServer::bind("127.0.0.1:0", cfg).await.unwrap()
    }

    async fn serve_next(srv: &StatusServer, lot: &SlotRegistry) -> Exchange {
        let now = ManualClock::epoch().now();
        for _ in 0..400 {
            if let Some(x) = srv.poll_once(lot, now).await {
                return x;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no connection accepted");
    }

    async fn request(srv: &StatusServer, lot: &SlotRegistry, raw: &str) -> (Exchange, String) {
        let mut client = TcpStream::connect(srv.local_addr().unwrap()).await.unwrap();
        client.write_all(raw.as_bytes()).await.unwrap();
        let x = serve_next(srv, lot).await;
        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        (x, out)
    }

    fn body(response: &str) -> &str {
        response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap()
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn routing_uses_method_and_path() {
        assert_eq!(Route::of(&get("/data")), Route::Data);
        assert_eq!(Route::of(&get("/data?ts=1")), Route::Data);
        assert_eq!(Route::of(&get("/")), Route::Dashboard);
        assert_eq!(Route::of(&get("/data/extra")), Route::Dashboard);

        let post = Request::builder()
            .method(Method::POST)
            .uri("/data")
            .body(())
            .unwrap();
        assert_eq!(Route::of(&post), Route::Dashboard);
    }

    #[tokio::test]
    async fn idle_listener_returns_immediately() {
        let cfg = LotConfig::default();
        let srv = server(&cfg).await;
        let lot = SlotRegistry::new(&cfg).unwrap();
        assert!(srv.poll_once(&lot, ManualClock::epoch().now()).await.is_none());
    }

    #[tokio::test]
    async fn data_route_serves_snapshot_json() {
        let cfg = LotConfig::default();
        let srv = server(&cfg).await;
        let mut lot = SlotRegistry::new(&cfg).unwrap();
        lot.arrive(2, ManualClock::epoch().now()).unwrap();

        let (x, out) = request(&srv, &lot, "GET /data HTTP/1.1\r\nHost: lot\r\n\r\n").await;
        assert_eq!(x.result.unwrap(), Route::Data);
        assert!(x.peer.is_some());
        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.to_ascii_lowercase().contains("content-type: application/json"));

        let v: Value = serde_json::from_str(body(&out)).unwrap();
        assert_eq!(v["total"], 3);
        assert_eq!(v["free"], 2);
        assert_eq!(v["slots"][1]["status"], "Occupied");
        assert_eq!(lot.free_count(), 2);
    }

    #[tokio::test]
    async fn request_head_split_across_writes_is_still_routed() {
        let cfg = LotConfig::default();
        let srv = server(&cfg).await;
        let lot = SlotRegistry::new(&cfg).unwrap();
        let addr = srv.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let mut client = TcpStream::connect(addr).await.unwrap();
            client.write_all(b"GET /da").await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            client
                .write_all(b"ta HTTP/1.1\r\nHost: x\r\n\r\n")
                .await
                .unwrap();
            let mut out = String::new();
            client.read_to_string(&mut out).await.unwrap();
            out
        });

        let x = serve_next(&srv, &lot).await;
        assert_eq!(x.result.unwrap(), Route::Data);
        let out = client.await.unwrap();
        assert!(out.to_ascii_lowercase().contains("content-type: application/json"));
        let v: Value = serde_json::from_str(body(&out)).unwrap();
        assert_eq!(v["free"], 3);
    }

    #[tokio::test]
    async fn other_requests_get_the_dashboard() {
        let cfg = LotConfig::default();
        let srv = server(&cfg).await;
        let lot = SlotRegistry::new(&cfg).unwrap();

        let (x, out) = request(&srv, &lot, "GET / HTTP/1.1\r\nHost: lot\r\n\r\n").await;
        assert_eq!(x.result.unwrap(), Route::Dashboard);
        assert!(out.to_ascii_lowercase().contains("content-type: text/html"));
        assert!(body(&out).contains("fetch('/data')"));
        assert!(body(&out).contains("3000"));
    }

    #[tokio::test]
    async fn empty_request_is_malformed() {
        let cfg = LotConfig::default();
        let srv = server(&cfg).await;
        let lot = SlotRegistry::new(&cfg).unwrap();

        let client = TcpStream::connect(srv.local_addr().unwrap()).await.unwrap();
        drop(client);
        let x = serve_next(&srv, &lot).await;
        assert_eq!(x.result.unwrap_err().as_label(), "serve_malformed");
    }

    #[tokio::test]
    async fn unparsable_request_is_an_http_error() {
        let cfg = LotConfig::default();
        let srv = server(&cfg).await;
        let lot = SlotRegistry::new(&cfg).unwrap();

        let mut client = TcpStream::connect(srv.local_addr().unwrap()).await.unwrap();
        client.write_all(b"\x00\x01 not http\r\n\r\n").await.unwrap();
        let x = serve_next(&srv, &lot).await;
        assert_eq!(x.result.unwrap_err().as_label(), "serve_http");
    }

    #[tokio::test]
    async fn silent_client_times_out() {
        let cfg = LotConfig {
            request_timeout: Duration::from_millis(50),
            ..LotConfig::default()
        };
        let srv = server(&cfg).await;
        let lot = SlotRegistry::new(&cfg).unwrap();

        let _client = TcpStream::connect(srv.local_addr().unwrap()).await.unwrap();
        let x = serve_next(&srv, &lot).await;
        assert!(matches!(
            x.result,
            Err(ServeError::Timeout { timeout }) if timeout == Duration::from_millis(50)
        ));
    }

    #[tokio::test]
    async fn bind_failure_names_the_address() {
        let cfg = LotConfig::default();
        let taken = server(&cfg).await;
        let addr = taken.local_addr().unwrap();

        let err = StatusServer::bind(addr, &cfg).await.unwrap_err();
        assert_eq!(err.as_label(), "lot_bind");
        assert!(err.as_message().contains(&addr.to_string()));
    }
}
