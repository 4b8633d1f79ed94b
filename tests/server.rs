//! Serves a router over a real socket and talks raw HTTP/1.1 to it.

use std::net::SocketAddr;

use hyper::StatusCode;
use pathwise::server::{create_reusable_listener, serve, ServeOptions};
use pathwise::{handler_fn, Context, Router, SharedRouter};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

fn router() -> Router {
    let fallback = handler_fn(|mut ctx: Context| async move {
        ctx.response_mut().set_status(StatusCode::NOT_FOUND);
        ctx.response_mut().write("fallback");
        Ok(ctx.into_response())
    });
    let mut router = Router::new(fallback).with_max_body_size(16);
    router
        .get(
            "/users/:id",
            handler_fn(|mut ctx: Context| async move {
                let id = ctx.param("id").unwrap_or_default().to_string();
                ctx.response_mut().write(format!("user {id}"));
                Ok(ctx.into_response())
            }),
        )
        .unwrap();
    router
        .post(
            "/upload",
            handler_fn(|ctx: Context| async move { Ok(ctx.into_response()) }),
        )
        .unwrap();
    router
}

async fn start() -> (SocketAddr, oneshot::Sender<()>) {
    let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve(
        listener,
        SharedRouter::new(router()),
        ServeOptions::default(),
        async {
            let _ = rx.await;
        },
    ));
    (addr, tx)
}

async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn serves_param_route() {
    let (addr, _shutdown) = start().await;
    let response = raw_request(
        addr,
        "GET /users/42 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with("user 42"), "{response}");
}

#[tokio::test]
async fn unknown_route_hits_fallback() {
    let (addr, _shutdown) = start().await;
    let response = raw_request(
        addr,
        "GET /nowhere HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
    assert!(response.ends_with("fallback"), "{response}");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (addr, _shutdown) = start().await;
    let body = "x".repeat(64);
    let request = format!(
        "POST /upload HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let response = raw_request(addr, &request).await;
    assert!(
        response.starts_with("HTTP/1.1 413 Payload Too Large"),
        "{response}"
    );
}
