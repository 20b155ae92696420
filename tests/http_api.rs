use lingolink::api::v1::{recover_error, routes};
use lingolink::server::Server;
use lingolink::settings::{Auth, Chat, Http, Log, Settings, Storage};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

fn test_settings() -> Settings {
    Settings {
        auth: Auth {
            jwt_secret: "test-secret".into(),
        },
        chat: Chat {
            backend: "fake".into(),
            api_key: String::new(),
            api_secret: String::new(),
            base_url: String::new(),
        },
        http: Http {
            address: "127.0.0.1:0".into(),
            secure_cookies: false,
        },
        log: Log {
            filter: "warn".into(),
        },
        storage: Storage {
            backend: "memory".into(),
            mysql_dsn: String::new(),
        },
    }
}

async fn test_server() -> Arc<Server> {
    Arc::new(Server::try_new(&test_settings()).await.unwrap())
}

/// The same composition main runs: the /api prefix, the v1 routes, the
/// rejection recovery. State lives in the server, so rebuilding the filter
/// per request is free.
fn app(
    server: &Arc<Server>,
) -> impl warp::Filter<Extract = impl warp::Reply + Send, Error = Infallible> + Clone + 'static {
    warp::path("api")
        .and(routes(server.clone()))
        .recover(recover_error)
}

fn json_body<B: AsRef<[u8]>>(resp: &warp::http::Response<B>) -> Value {
    serde_json::from_slice(resp.body().as_ref()).unwrap()
}

fn set_cookie<B>(resp: &warp::http::Response<B>) -> &str {
    resp.headers()["set-cookie"].to_str().unwrap()
}

/// Pulls the token out of the `jwt=...; Max-Age=...` set-cookie header.
fn session_token<B>(resp: &warp::http::Response<B>) -> String {
    let cookie = set_cookie(resp);
    let value = cookie.strip_prefix("jwt=").unwrap();
    value.split(';').next().unwrap().to_string()
}

async fn signup(server: &Arc<Server>, email: &str, password: &str, name: &str) -> (String, Value) {
    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/signup")
        .json(&json!({ "email": email, "password": password, "fullName": name }))
        .reply(&app(server))
        .await;
    assert_eq!(resp.status(), 201, "signup failed: {:?}", resp.body());
    let token = session_token(&resp);
    (token, json_body(&resp))
}

async fn user_id_of(server: &Arc<Server>, token: &str) -> String {
    let resp = warp::test::request()
        .method("GET")
        .path("/api/auth/me")
        .header("cookie", format!("jwt={token}"))
        .reply(&app(server))
        .await;
    assert_eq!(resp.status(), 200);
    json_body(&resp)["data"]["user"]["userId"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn signup_sets_the_session_cookie() {
    let server = test_server().await;

    let (_, body) = signup(&server, "alice@gmail.com", "secret1", "Alice").await;
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["user"]["email"], "alice@gmail.com");
    assert_eq!(body["data"]["user"]["fullName"], "Alice");

    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/signup")
        .json(&json!({ "email": "bob@yahoo.com", "password": "secret2", "fullName": "Bob" }))
        .reply(&app(&server))
        .await;
    let cookie = set_cookie(&resp);
    assert!(cookie.starts_with("jwt="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=86400"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn signup_rejects_bad_input() {
    let server = test_server().await;

    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/signup")
        .json(&json!({ "email": "alice@example.com", "password": "secret1", "fullName": "Alice" }))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 400);

    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/signup")
        .json(&json!({ "email": "alice@gmail.com", "password": "short", "fullName": "Alice" }))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(
        json_body(&resp)["message"],
        "Password must be at least 6 characters"
    );
}

#[tokio::test]
async fn protected_routes_require_a_valid_cookie() {
    let server = test_server().await;

    let resp = warp::test::request()
        .method("GET")
        .path("/api/auth/me")
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 401);
    assert_eq!(
        json_body(&resp)["message"],
        "Unauthorized - No Token Provided"
    );

    let resp = warp::test::request()
        .method("GET")
        .path("/api/auth/me")
        .header("cookie", "jwt=not-a-real-token")
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 401);
    assert_eq!(json_body(&resp)["message"], "Unauthorized - Invalid Token");
}

#[tokio::test]
async fn login_failures_are_opaque() {
    let server = test_server().await;
    signup(&server, "alice@gmail.com", "secret1", "Alice").await;

    for creds in [
        json!({ "email": "alice@gmail.com", "password": "wrong-one" }),
        json!({ "email": "nobody@gmail.com", "password": "secret1" }),
    ] {
        let resp = warp::test::request()
            .method("POST")
            .path("/api/auth/login")
            .json(&creds)
            .reply(&app(&server))
            .await;
        assert_eq!(resp.status(), 401);
        assert_eq!(json_body(&resp)["message"], "Invalid email or password");
    }

    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/login")
        .json(&json!({ "email": "alice@gmail.com", "password": "secret1" }))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 200);
    assert!(set_cookie(&resp).starts_with("jwt="));
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let server = test_server().await;

    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/logout")
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 200);
    let cookie = set_cookie(&resp);
    assert!(cookie.starts_with("jwt=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn onboarding_reports_missing_fields() {
    let server = test_server().await;
    let (token, _) = signup(&server, "alice@gmail.com", "secret1", "Alice").await;

    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/onboarding")
        .header("cookie", format!("jwt={token}"))
        .json(&json!({ "fullName": "Alice", "bio": "hi" }))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 400);
    let message = json_body(&resp)["message"].as_str().unwrap().to_string();
    assert!(message.contains("country"), "{message}");
    assert!(message.contains("learning_language"), "{message}");

    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/onboarding")
        .header("cookie", format!("jwt={token}"))
        .json(&json!({
            "fullName": "Alice",
            "bio": "bonjour",
            "country": "France",
            "nativeLanguage": "French",
            "learningLanguage": "Spanish",
        }))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 200);
    let body = json_body(&resp);
    assert_eq!(body["data"]["userUpdated"]["isOnboarded"], true);
    assert_eq!(body["data"]["userUpdated"]["nativeLanguage"], "French");
}

#[tokio::test]
async fn friend_request_flow_over_http() {
    let server = test_server().await;

    let (alice, _) = signup(&server, "alice@gmail.com", "secret1", "Alice").await;
    let (bob, _) = signup(&server, "bob@yahoo.com", "secret2", "Bob").await;
    let bob_id = user_id_of(&server, &bob).await;

    let resp = warp::test::request()
        .method("POST")
        .path(&format!("/api/user/friend-request/{bob_id}"))
        .header("cookie", format!("jwt={alice}"))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 201);
    let body = json_body(&resp);
    let request_id = body["data"]["friendRequest"]["requestId"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(body["data"]["friendRequest"]["status"], "pending");

    // Duplicate, opposite direction, is a 400.
    let alice_id = user_id_of(&server, &alice).await;
    let resp = warp::test::request()
        .method("POST")
        .path(&format!("/api/user/friend-request/{alice_id}"))
        .header("cookie", format!("jwt={bob}"))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 400);

    // Bob sees it incoming; only Bob may accept it.
    let resp = warp::test::request()
        .method("GET")
        .path("/api/user/friend-requests")
        .header("cookie", format!("jwt={bob}"))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 200);
    let feeds = json_body(&resp);
    assert_eq!(feeds["data"]["incomingRequests"].as_array().unwrap().len(), 1);
    assert_eq!(
        feeds["data"]["incomingRequests"][0]["user"]["fullName"],
        "Alice"
    );

    let resp = warp::test::request()
        .method("PUT")
        .path(&format!("/api/user/friend-request/{request_id}/accept"))
        .header("cookie", format!("jwt={alice}"))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 403);

    let resp = warp::test::request()
        .method("PUT")
        .path(&format!("/api/user/friend-request/{request_id}/accept"))
        .header("cookie", format!("jwt={bob}"))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        json_body(&resp)["data"]["friendRequest"]["status"],
        "accepted"
    );

    // Both ends now list each other.
    for (token, expected) in [(&alice, "Bob"), (&bob, "Alice")] {
        let resp = warp::test::request()
            .method("GET")
            .path("/api/user/friends")
            .header("cookie", format!("jwt={token}"))
            .reply(&app(&server))
            .await;
        let friends = json_body(&resp);
        let list = friends["data"]["friends"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["fullName"], expected);
    }

    // Alice's accepted feed carries the request she sent; nothing is
    // pending anymore.
    let resp = warp::test::request()
        .method("GET")
        .path("/api/user/friend-requests")
        .header("cookie", format!("jwt={alice}"))
        .reply(&app(&server))
        .await;
    let feeds = json_body(&resp);
    assert_eq!(feeds["data"]["acceptedRequests"].as_array().unwrap().len(), 1);

    let resp = warp::test::request()
        .method("GET")
        .path("/api/user/outgoing-friend-requests")
        .header("cookie", format!("jwt={alice}"))
        .reply(&app(&server))
        .await;
    let outgoing = json_body(&resp);
    assert!(
        outgoing["data"]["outgoingRequests"]
            .as_array()
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn chat_token_comes_from_the_provider() {
    let server = test_server().await;
    let (token, _) = signup(&server, "alice@gmail.com", "secret1", "Alice").await;

    let resp = warp::test::request()
        .method("GET")
        .path("/api/chat/token")
        .header("cookie", format!("jwt={token}"))
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 200);
    let body = json_body(&resp);
    assert!(
        body["data"]["token"]
            .as_str()
            .unwrap()
            .starts_with("fake-chat-token:")
    );
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let server = test_server().await;

    let resp = warp::test::request()
        .method("POST")
        .path("/api/auth/signup")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&app(&server))
        .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(json_body(&resp)["message"], "Invalid request body");
}
