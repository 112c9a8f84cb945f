use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{
        artifacts::{create_artifact, list_artifacts},
        health::healthz,
        task_runs::{create_task_run, get_task_run, list_task_runs, update_task_run},
        tasks::{create_task, delete_task, get_task, list_tasks, list_user_tasks, update_task},
        users::{
            assign_role, delete_user, get_user, list_user_roles, list_users, remove_role,
            update_user,
        },
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, config: &Config) -> Router {
    let api_routes = Router::new()
        // Task routes
        .route("/task", get(list_tasks))
        .route(
            "/user/{user_id}/task",
            get(list_user_tasks).post(create_task),
        )
        .route(
            "/user/{user_id}/task/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        // Run routes
        .route(
            "/user/{user_id}/task/{task_id}/run",
            get(list_task_runs).post(create_task_run),
        )
        .route(
            "/user/{user_id}/task/{task_id}/run/{run_id}",
            get(get_task_run).put(update_task_run),
        )
        .route(
            "/user/{user_id}/task/{task_id}/run/{run_id}/artifact",
            get(list_artifacts).post(create_artifact),
        )
        // User routes
        .route("/user", get(list_users))
        .route(
            "/user/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route(
            "/user/{user_id}/roles",
            get(list_user_roles).post(assign_role).delete(remove_role),
        );

    #[cfg(feature = "auth0")]
    let api_routes = api_routes.layer(axum::middleware::from_fn_with_state(
        state.jwt.clone(),
        taskadmin_auth::require_jwt,
    ));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(cors_layer(&config.cors_allow_origins))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .with_state(state)
}

/// CORS for the admin UI. An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, Response},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[cfg(feature = "auth0")]
    fn bearer() -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = chrono::Utc::now().timestamp();
        let claims = json!({
            "sub": "auth0|admin",
            "iss": "https://tenant.example.com/",
            "aud": "taskadmin",
            "iat": now,
            "exp": now + 600,
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(crate::state::test_support::TEST_JWT_SECRET),
        )
        .unwrap();
        format!("Bearer {token}")
    }

    fn app() -> Router {
        create_app(AppState::for_tests(), &Config::default())
    }

    fn raw_request(method: &str, uri: &str, body: Body) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        #[cfg(feature = "auth0")]
        let builder = builder.header(header::AUTHORIZATION, bearer());
        builder.body(body).unwrap()
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let body = body.map_or_else(Body::empty, |value| Body::from(value.to_string()));
        raw_request(method, uri, body)
    }

    async fn json_body(response: Response<Body>) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    async fn create_task_for(app: &Router, user_id: &str) -> Value {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/user/{user_id}/task"),
                Some(json!({
                    "task_name": "crawl",
                    "task_definition": {"url": "https://example.com"}
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = app()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_list_tasks_empty() {
        let response = app()
            .oneshot(request("GET", "/api/task", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_create_and_get_task() {
        let app = app();
        let created = create_task_for(&app, "u1").await;

        assert_eq!(created["owner"], "u1");
        assert_eq!(created["status"], 1);
        assert_eq!(
            created["task_definition"],
            r#"{"url":"https://example.com"}"#
        );

        let id = created["id"].as_str().unwrap();
        let response = app
            .oneshot(request("GET", &format!("/api/user/u1/task/{id}"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, created);
    }

    #[tokio::test]
    async fn test_malformed_task_id_is_bad_request() {
        let response = app()
            .oneshot(request("GET", "/api/user/u1/task/abc", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let response = app()
            .oneshot(request("GET", "/api/user/u1/task/42", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({"error": "task not found"}));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = app()
            .oneshot(raw_request("POST", "/api/user/u1/task", Body::from("{not json")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_update_then_delete_task() {
        let app = app();
        let created = create_task_for(&app, "u1").await;
        let uri = format!("/api/user/u1/task/{}", created["id"].as_str().unwrap());

        let response = app
            .clone()
            .oneshot(request("PUT", &uri, Some(json!({"status": 2}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = json_body(response).await;
        assert_eq!(updated["status"], 2);
        assert_eq!(updated["task_name"], "crawl");

        let response = app
            .clone()
            .oneshot(request("DELETE", &uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(request("GET", &uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_and_artifacts() {
        let app = app();
        let task = create_task_for(&app, "u1").await;
        let task_id = task["id"].as_str().unwrap();
        let execution_id = uuid::Uuid::now_v7();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/user/u1/task/{task_id}/run"),
                Some(json!({"execution_id": execution_id.to_string()})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let run = json_body(response).await;
        let run_uri = format!("/api/user/u1/task/{task_id}/run/{}", run["id"]);

        for n in 0..3 {
            let response = app
                .clone()
                .oneshot(request(
                    "POST",
                    &format!("{run_uri}/artifact"),
                    Some(json!({
                        "execution_id": execution_id.to_string(),
                        "execution_task_id": uuid::Uuid::now_v7().to_string(),
                        "created_at": format!("2024-05-01T12:0{n}:00Z"),
                        "artifact_type": "html",
                        "url": format!("https://example.com/{n}"),
                        "content_type": "text/html",
                        "content_length": 10,
                        "status_code": 200,
                        "storage_bucket": "bucket",
                        "storage_key": format!("key-{n}"),
                    })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .clone()
            .oneshot(request(
                "GET",
                &format!("{run_uri}/artifact?page=1&pageSize=2"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        let urls: Vec<&str> = page
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["url"].as_str().unwrap())
            .collect();
        assert_eq!(urls, vec!["https://example.com/2", "https://example.com/1"]);

        let response = app
            .oneshot(request("GET", &format!("{run_uri}/artifact?page=0"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_run_body_is_bad_request() {
        let app = app();
        let task = create_task_for(&app, "u1").await;
        let uri = format!("/api/user/u1/task/{}/run", task["id"].as_str().unwrap());

        let response = app
            .oneshot(raw_request("POST", &uri, Body::from("{not json")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_run_without_body_is_created() {
        let app = app();
        let task = create_task_for(&app, "u1").await;
        let uri = format!("/api/user/u1/task/{}/run", task["id"].as_str().unwrap());

        let builder = Request::builder().method("POST").uri(&uri);
        #[cfg(feature = "auth0")]
        let builder = builder.header(header::AUTHORIZATION, bearer());
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let run = json_body(response).await;
        assert_eq!(run["execution_id"], Value::Null);
    }

    #[tokio::test]
    async fn test_missing_run_is_not_found() {
        let response = app()
            .oneshot(request("GET", "/api/user/u1/task/1/run/9", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({"error": "no task run found with the given ID"})
        );
    }

    #[tokio::test]
    async fn test_list_users_with_roles() {
        let response = app()
            .oneshot(request("GET", "/api/user?page=1&pageSize=10", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page["total"], 3);
        let users = page["data"].as_array().unwrap();
        assert_eq!(users.len(), 3);
        assert!(users.iter().all(|u| u["roles"].is_array()));
    }

    #[tokio::test]
    async fn test_role_assignment_round_trip() {
        let app = app();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/user/local%7Cuser/roles",
                Some(json!({"role": 2})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/user/local%7Cuser", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let roles = json_body(response).await["roles"].clone();
        assert!(roles.as_array().unwrap().contains(&json!(2)));

        let response = app
            .oneshot(request(
                "POST",
                "/api/user/local%7Cuser/roles",
                Some(json!({"role": 0})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let response = app()
            .oneshot(request("GET", "/api/user/nobody", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[cfg(feature = "auth0")]
    #[tokio::test]
    async fn test_api_requires_token() {
        let response = app()
            .oneshot(Request::builder().uri("/api/task").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_cors_layer_accepts_origin_list() {
        let _ = cors_layer(&["https://admin.example.com".to_string()]);
        let _ = cors_layer(&[]);
    }
}
