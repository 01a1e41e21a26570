use std::net::SocketAddr;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use token_auth::{
    build_api_route_filter, handle_auth_errors, with_auth, Backend, Config, CredentialRecord,
    Identity,
};
use warp::{path, Filter};

const CONFIG: &str = r#"{
    "base_url": "/auth",
    "token": { "key": "this is a really bad secret", "algorithm": "HS256", "issuer": "test" },
    "controller": {
        "type": "memory",
        "users": [
            { "username": "test", "email": "test@example.com", "display_name": "Test", "password": "test" },
            { "username": "hugo", "password": "hugo" }
        ]
    }
}"#;

fn start_server(config: &Config) -> SocketAddr {
    let auth = config.build().unwrap();

    let auth_routes = build_api_route_filter(&auth, &config.base_url);

    let unsecured_page =
        path!("insecure").then(|| async move { warp::reply::html("hello, world!") });

    let secure_page = path!("secure")
        .and(with_auth(&auth))
        .then(|identity: Identity| async move { warp::reply::json(&identity) });

    let all_routes = unsecured_page
        .or(secure_page)
        .or(auth_routes)
        .recover(handle_auth_errors);

    let (addr, server) = warp::serve(all_routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[tokio::test]
async fn integration() {
    let addr = start_server(&Config::from_json(CONFIG).unwrap());
    let url = |path: &str| format!("http://{}{}", addr, path);

    let client = reqwest::Client::new();

    assert_eq!(
        client
            .post(url("/auth/token"))
            .json(&json!({"username": "test", "password": "wrong"}))
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::BAD_REQUEST,
        "attempt to login with an invalid password should have been denied"
    );

    assert_eq!(
        client
            .post(url("/auth/token"))
            .json(&json!({"username": "nobody", "password": "test"}))
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::BAD_REQUEST,
        "attempt to login as an unknown user should have been denied"
    );

    let login_response = client
        .post(url("/auth/token"))
        .json(&json!({"username": "test", "password": "test"}))
        .send()
        .await
        .unwrap();

    assert_eq!(
        login_response.status(),
        StatusCode::OK,
        "failed to login as user"
    );

    let token = login_response
        .json::<TokenResponse>()
        .await
        .unwrap()
        .access_token;

    let verified = client
        .get(url(&format!("/auth/verify/{}", token)))
        .send()
        .await
        .unwrap();
    assert_eq!(verified.status(), StatusCode::OK, "failed to verify token");
    assert_eq!(
        verified.json::<Identity>().await.unwrap(),
        Identity::new("test", "test@example.com", "Test")
    );

    assert_eq!(
        client
            .get(url("/auth/verify/garbage-not-a-token"))
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::BAD_REQUEST,
        "a garbage token should not verify"
    );

    assert_eq!(
        client.get(url("/insecure")).send().await.unwrap().status(),
        StatusCode::OK,
        "failed to fetch insecure page"
    );

    assert_eq!(
        client
            .get(url("/secure"))
            .bearer_auth("fake token")
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::BAD_REQUEST,
        "access to secure page with a bad auth token should have been denied"
    );

    let secure = client
        .get(url("/secure"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(
        secure.status(),
        StatusCode::OK,
        "failed to access secure page with a valid auth token"
    );
    assert_eq!(
        secure.json::<Identity>().await.unwrap().username(),
        "test"
    );

    assert_eq!(
        client
            .delete(url(&format!("/auth/token/{}", token)))
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::NO_CONTENT,
        "failed to invalidate token"
    );

    assert_eq!(
        client
            .get(url("/secure"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::OK,
        "an invalidated token keeps working until it expires"
    );
}

#[tokio::test]
async fn sqlite_backend() {
    let dir = tempfile::tempdir().unwrap();
    let dsn = dir.path().join("users.db");
    let config = Config::from_json(
        &json!({
            "token": { "key": "another bad secret" },
            "controller": { "type": "simple", "driver": "sqlite3", "dsn": dsn },
            "password": { "scheme": "argon2", "salt": "this is a terrible salt" }
        })
        .to_string(),
    )
    .unwrap();

    // provision before serving, through a store opened on the same file
    match config.build().unwrap().store() {
        Backend::Sqlite(store) => store
            .upsert(&CredentialRecord::new(
                Identity::new("hugo", "hugo@example.com", "Hugo"),
                "foobar",
            ))
            .unwrap(),
        Backend::Memory(_) => panic!("expected a sqlite backend"),
    }

    let addr = start_server(&config);
    let client = reqwest::Client::new();

    let login_response = client
        .post(format!("http://{}/token", addr))
        .json(&json!({"username": "hugo", "password": "foobar"}))
        .send()
        .await
        .unwrap();
    assert_eq!(login_response.status(), StatusCode::OK);
    let token = login_response
        .json::<TokenResponse>()
        .await
        .unwrap()
        .access_token;

    let verified = client
        .get(format!("http://{}/verify/{}", addr, token))
        .send()
        .await
        .unwrap();
    assert_eq!(verified.status(), StatusCode::OK);
    assert_eq!(
        verified.json::<Identity>().await.unwrap().email(),
        "hugo@example.com"
    );

    assert_eq!(
        client
            .post(format!("http://{}/token", addr))
            .json(&json!({"username": "hugo", "password": "hunter1"}))
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::BAD_REQUEST
    );
}
