use crate::middleware::auth::{require_admin, require_token};
use crate::middleware::handlers;
use crate::state::AppState;
use axum::{
    Extension, Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    let management = Router::new()
        .route("/credentials", post(handlers::issue_credentials))
        .route("/credentials/{username}", get(handlers::lookup_credentials))
        .route(
            "/clients/{client_id}/claims",
            put(handlers::set_claims).get(handlers::get_claims),
        )
        .route_layer(middleware::from_fn(require_admin));

    let protected = Router::new()
        .route("/claims", get(handlers::claims))
        .route_layer(middleware::from_fn(require_token));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/token", post(handlers::token))
        .route("/check", get(handlers::check))
        .merge(management)
        .merge(protected)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::OnceLock;
    use tollgate_core::TollgateConfig;
    use tollgate_core::config::SecretHashConfig;
    use tollgate_store::MemoryStore;
    use tollgate_token::KeyMaterial;
    use tower::ServiceExt;

    fn keys() -> Arc<KeyMaterial> {
        static KEYS: OnceLock<Arc<KeyMaterial>> = OnceLock::new();
        KEYS.get_or_init(|| Arc::new(KeyMaterial::generate(2048).unwrap()))
            .clone()
    }

    fn config(admin_token: Option<&str>) -> TollgateConfig {
        let mut cfg = TollgateConfig::default();
        cfg.token.issuer = "tollgate-test".to_string();
        cfg.server.admin_token = admin_token.map(str::to_string);
        cfg.secret_hash = SecretHashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        };
        cfg
    }

    fn app(admin_token: Option<&str>) -> Router {
        let state =
            AppState::build(&config(admin_token), keys(), Arc::new(MemoryStore::new())).unwrap();
        router(Arc::new(state))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn bearer_request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    /// Register `username` with `claims` and exchange for a token.
    async fn onboard(app: &Router, username: &str, claims: &[&str]) -> (String, String) {
        let (status, body) = send(
            app,
            json_request("POST", "/credentials", json!({ "username": username })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["auth"], "OK");
        let client_id = body["CLIENT_ID"].as_str().unwrap().to_string();
        let secret = body["CLIENT_SECRET"].as_str().unwrap().to_string();

        let (status, body) = send(
            app,
            json_request(
                "PUT",
                &format!("/clients/{client_id}/claims"),
                json!({ "claims": claims }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");

        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/token",
                json!({ "client_id": client_id, "client_secret": secret }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["validation"], "OK");
        (client_id, body["token"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = app(None);
        let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "tollgate-server");
    }

    #[tokio::test]
    async fn test_token_flow() {
        let app = app(None);
        let (_, token) = onboard(&app, "alice", &["users/GET", "v1/orders/POST"]).await;

        let (status, body) = send(&app, bearer_request("/check", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": "OK" }));

        let (status, body) = send(&app, bearer_request("/claims", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["iss"], "tollgate-test");
        assert_eq!(body["0"], "users/GET");
        assert_eq!(body["1"], "v1/orders/POST");
    }

    #[tokio::test]
    async fn test_check_without_token() {
        let app = app(None);
        let req = Request::builder().uri("/check").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "response": "TOKEN_NOT_FOUND" }));

        let (status, body) = send(&app, bearer_request("/check", "garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "token": "INVALID" }));
    }

    #[tokio::test]
    async fn test_claims_requires_token() {
        let app = app(None);
        let req = Request::builder().uri("/claims").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_secret_is_invalid() {
        let app = app(None);
        let (client_id, _) = onboard(&app, "bob", &["users/GET"]).await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/token",
                json!({ "client_id": client_id, "client_secret": "bm9wZQ==" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "validation": "INVALID" }));
    }

    #[tokio::test]
    async fn test_no_endpoints() {
        let app = app(None);
        let (_, body) = send(
            &app,
            json_request("POST", "/credentials", json!({ "username": "idle" })),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/token",
                json!({
                    "client_id": body["CLIENT_ID"],
                    "client_secret": body["CLIENT_SECRET"],
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "validation": "FAILED", "error": "NO ENDPOINTS" }));
    }

    #[tokio::test]
    async fn test_claims_for_unknown_client() {
        let app = app(None);
        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/clients/{}/claims", uuid::Uuid::new_v4()),
                json!({ "claims": ["users/GET"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "CLIENT NOT FOUND");
    }

    #[tokio::test]
    async fn test_malformed_claim() {
        let app = app(None);
        let (client_id, _) = onboard(&app, "carol", &["users/GET"]).await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/clients/{client_id}/claims"),
                json!({ "claims": ["users"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "MALFORMED CLAIM");

        let req = Request::builder()
            .uri(format!("/clients/{client_id}/claims"))
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app, req).await;
        assert_eq!(body["claims"], json!(["users/GET"]));
    }

    #[tokio::test]
    async fn test_reissue_and_lookup() {
        let app = app(None);
        let (first, _) = onboard(&app, "dave", &["users/GET"]).await;
        let (second, _) = onboard(&app, "dave", &["users/GET"]).await;
        assert_ne!(first, second);

        let req = Request::builder()
            .uri("/credentials/dave")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["CLIENT_ID"], second.as_str());
        assert!(body.get("CLIENT_SECRET").is_none());
    }

    #[tokio::test]
    async fn test_admin_token_guards_management() {
        let app = app(Some("s3cret"));

        let (status, _) = send(
            &app,
            json_request("POST", "/credentials", json!({ "username": "eve" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut req = json_request("POST", "/credentials", json!({ "username": "eve" }));
        req.headers_mut().insert(
            crate::middleware::auth::ADMIN_TOKEN_HEADER,
            "s3cret".parse().unwrap(),
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["auth"], "OK");

        // Token routes stay open.
        let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        assert_eq!(send(&app, req).await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_username() {
        let app = app(None);
        let (status, body) = send(
            &app,
            json_request("POST", "/credentials", json!({ "username": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["auth"], "INVALID_USERNAME");
    }
}
