use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tokio::sync::RwLock;

use pathwise::config::Config;
use pathwise::server::{self, ServeOptions};
use pathwise::{handler_fn, logger, Context, HandlerError, Router, RouterError, SharedRouter};

type HandlerResult = Result<Response<Full<Bytes>>, HandlerError>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    logger::init(&cfg.logging)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let router = build_router(UserStore::default())?.with_max_body_size(cfg.http.max_body_size);

    let listener = server::create_reusable_listener(addr)?;
    let routes = router.routes();
    logger::log_server_start(&addr, &cfg, routes.len());
    for (method, pattern) in &routes {
        logger::log_route(method.as_str(), pattern);
    }

    server::serve(
        listener,
        SharedRouter::new(router),
        ServeOptions::from(&cfg),
        server::shutdown_signal(),
    )
    .await;
    Ok(())
}

/// In-memory users for the demo routes
#[derive(Default, Clone)]
struct UserStore {
    users: Arc<RwLock<BTreeMap<u64, User>>>,
    next_id: Arc<AtomicU64>,
}

#[derive(Clone, Serialize)]
struct User {
    id: u64,
    name: String,
}

fn build_router(store: UserStore) -> Result<Router, RouterError> {
    let mut router = Router::new(handler_fn(not_found));

    let list = store.clone();
    let create = store.clone();
    let show = store.clone();
    let remove = store;

    router
        .get("/", handler_fn(index))?
        .get("/users", handler_fn(move |ctx| list_users(ctx, list.clone())))?
        .post("/users", handler_fn(move |ctx| create_user(ctx, create.clone())))?
        .get("/users/:id", handler_fn(move |ctx| show_user(ctx, show.clone())))?
        .delete("/users/:id", handler_fn(move |ctx| delete_user(ctx, remove.clone())))?
        .get("/users/:id/posts/:postId", handler_fn(show_post))?;

    Ok(router)
}

async fn index(mut ctx: Context) -> HandlerResult {
    ctx.json(&serde_json::json!({ "service": "pathwise", "status": "ok" }))?;
    Ok(ctx.into_response())
}

async fn list_users(mut ctx: Context, store: UserStore) -> HandlerResult {
    let users: Vec<User> = store.users.read().await.values().cloned().collect();
    ctx.json(&users)?;
    Ok(ctx.into_response())
}

/// `POST /users` with a form body or query string carrying `name`
async fn create_user(mut ctx: Context, store: UserStore) -> HandlerResult {
    let Some(name) = ctx.param("name").filter(|n| !n.is_empty()) else {
        return Err(HandlerError::status(StatusCode::BAD_REQUEST, "missing name"));
    };
    let user = User {
        id: store.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        name: name.to_string(),
    };
    store.users.write().await.insert(user.id, user.clone());

    ctx.response_mut().set_status(StatusCode::CREATED);
    ctx.json(&user)?;
    Ok(ctx.into_response())
}

async fn show_user(mut ctx: Context, store: UserStore) -> HandlerResult {
    let id = user_id(&ctx)?;
    let user = store.users.read().await.get(&id).cloned();
    match user {
        Some(user) => ctx.json(&user)?,
        None => return not_found(ctx).await,
    }
    Ok(ctx.into_response())
}

async fn delete_user(mut ctx: Context, store: UserStore) -> HandlerResult {
    let id = user_id(&ctx)?;
    if store.users.write().await.remove(&id).is_none() {
        return not_found(ctx).await;
    }
    ctx.response_mut().set_status(StatusCode::NO_CONTENT);
    Ok(ctx.into_response())
}

async fn show_post(mut ctx: Context) -> HandlerResult {
    let params = ctx.params().clone();
    ctx.json(&params)?;
    Ok(ctx.into_response())
}

async fn not_found(ctx: Context) -> HandlerResult {
    Ok(pathwise::http::build_not_found_response(ctx.path()))
}

fn user_id(ctx: &Context) -> Result<u64, HandlerError> {
    ctx.param("id")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| HandlerError::status(StatusCode::BAD_REQUEST, "user id must be a number"))
}
