use std::net::SocketAddr;

use token_auth::{build_api_route_filter, handle_auth_errors, with_auth, Config, Identity};
use tracing_subscriber::EnvFilter;
use warp::{path, Filter};

const DEFAULT_CONFIG: &str = r#"{
    "token": {
        "key": "this is a really bad secret",
        "algorithm": "HS256",
        "ttl_secs": 3600
    },
    "controller": {
        "type": "memory",
        "users": [
            { "username": "test", "email": "test@example.com", "display_name": "Test", "password": "test" }
        ]
    }
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // pass a JSON config file to use something other than the built-in user list
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::from_json(DEFAULT_CONFIG)?,
    };

    let auth = config.build()?;

    let auth_routes = build_api_route_filter(&auth, &config.base_url);

    let unsecured_homepage =
        warp::path::end().then(|| async move { warp::reply::html("hello, world!") });

    let secure_page = path!("whoami")
        .and(with_auth(&auth))
        .then(|identity: Identity| async move { warp::reply::json(&identity) });

    let all_routes = unsecured_homepage
        .or(secure_page)
        .or(auth_routes)
        .recover(handle_auth_errors);

    let addr: SocketAddr = "127.0.0.1:4000".parse()?;
    tracing::info!(%addr, "listening");
    warp::serve(all_routes).run(addr).await;

    Ok(())
}
