// src/handlers_tests.rs

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::ess_client::{EssClient, LOGIN_PATH, LOG_ACTIVITY_PATH};
    use crate::handlers::{router, AppState};
    use crate::timesheet::SheetOptions;
    use crate::xlsx::XLSX_CONTENT_TYPE;

    fn create_test_app(server: &MockServer) -> Router {
        let state = AppState {
            ess_client: EssClient::new(&server.base_url(), Duration::from_secs(5)).unwrap(),
            sheet_options: Arc::new(SheetOptions::default()),
        };
        router(state)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn converter_body(project: &str) -> Value {
        json!({
            "employee_id": "4321",
            "token": "tok",
            "months": [7, 8],
            "year": 2025,
            "project_name": project,
            "randomize_log": { "is_random": false, "min_duration": 0, "max_duration": 0 }
        })
    }

    async fn mock_july_and_august(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(LOG_ACTIVITY_PATH)
                    .query_param("months", "7");
                then.status(200).json_body(json!({
                    "data": [
                        { "id": 1, "dateString": "01-07-2025", "activityDetail": "A",
                          "duration": 5, "overtime": 0, "projectName": "X" },
                        { "id": 3, "dateString": "02-07-2025", "activityDetail": "C",
                          "duration": 9, "overtime": 0, "projectName": "Y" }
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(LOG_ACTIVITY_PATH)
                    .query_param("months", "8");
                then.status(200).json_body(json!({
                    "data": [
                        { "id": 2, "dateString": "15-08-2025", "activityDetail": "B",
                          "duration": 3, "overtime": 0, "projectName": "X" }
                    ]
                }));
            })
            .await;
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start_async().await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let server = MockServer::start_async().await;
        let upstream = server
            .mock_async(|when, then| {
                when.method(POST).path(LOGIN_PATH);
                then.status(200);
            })
            .await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(json_request("POST", "/api/auth/login", json!({ "username": "jdoe" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("password"));
        assert_eq!(upstream.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_login_upstream_rejection_is_unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(LOGIN_PATH);
                then.status(401).body("nope");
            })
            .await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "username": "jdoe", "password": "wrong" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_response_omits_user_password() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(LOGIN_PATH);
                then.status(200).json_body(json!({
                    "idToken": "tok",
                    "userInfo": {
                        "id": 10,
                        "username": "jdoe",
                        "employeeId": 4321,
                        "password": "$2a$10$hashed"
                    }
                }));
            })
            .await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "username": "jdoe", "password": "secret" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["idToken"], "tok");
        assert_eq!(body["userInfo"]["employeeId"], 4321);
        assert!(body["userInfo"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_log_converter_mistyped_field_is_json_bad_request() {
        let server = MockServer::start_async().await;
        let upstream = server
            .mock_async(|when, then| {
                when.method(GET).path(LOG_ACTIVITY_PATH);
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        let app = create_test_app(&server);

        let mut body = converter_body("X");
        body["year"] = json!("2025");
        let response = app
            .oneshot(json_request("POST", "/api/log-converter", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_json(response).await;
        assert!(body["error"].is_string());
        assert_eq!(upstream.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_log_converter_missing_content_type_is_json_bad_request() {
        let server = MockServer::start_async().await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(
                Request::post("/api/log-converter")
                    .body(Body::from(converter_body("X").to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_log_converter_returns_xlsx_attachment() {
        let server = MockServer::start_async().await;
        mock_july_and_august(&server).await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(json_request("POST", "/api/log-converter", converter_body("X")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            XLSX_CONTENT_TYPE
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"timesheet.xlsx\""
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[tokio::test]
    async fn test_log_converter_unknown_project_is_not_found() {
        let server = MockServer::start_async().await;
        mock_july_and_august(&server).await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(json_request("POST", "/api/log-converter", converter_body("Z")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("'Z'"));
    }

    #[tokio::test]
    async fn test_log_converter_inverted_range_skips_upstream() {
        let server = MockServer::start_async().await;
        let upstream = server
            .mock_async(|when, then| {
                when.method(GET).path(LOG_ACTIVITY_PATH);
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        let app = create_test_app(&server);

        let mut body = converter_body("X");
        body["randomize_log"] = json!({ "is_random": true, "min_duration": 2, "max_duration": 1 });
        let response = app
            .oneshot(json_request("POST", "/api/log-converter", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(upstream.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_log_converter_validates_months() {
        let server = MockServer::start_async().await;
        let app = create_test_app(&server);

        let mut body = converter_body("X");
        body["months"] = json!([7, 13]);
        let response = app
            .oneshot(json_request("POST", "/api/log-converter", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("13"));
    }

    #[tokio::test]
    async fn test_log_converter_malformed_date_is_unprocessable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(LOG_ACTIVITY_PATH);
                then.status(200).json_body(json!({
                    "data": [
                        { "id": 1, "dateString": "2025-07-01", "activityDetail": "A",
                          "duration": 5, "overtime": 0, "projectName": "X" }
                    ]
                }));
            })
            .await;
        let app = create_test_app(&server);

        let mut body = converter_body("X");
        body["months"] = json!([7]);
        let response = app
            .oneshot(json_request("POST", "/api/log-converter", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("2025-07-01"));
    }

    #[tokio::test]
    async fn test_log_converter_upstream_failure_propagates_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(LOG_ACTIVITY_PATH);
                then.status(503).body("maintenance");
            })
            .await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(json_request("POST", "/api/log-converter", converter_body("X")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_projects_requires_bearer_token() {
        let server = MockServer::start_async().await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(
                Request::get("/api/projects?employee_id=4321")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_projects_missing_employee_id_is_json_bad_request() {
        let server = MockServer::start_async().await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(
                Request::get("/api/projects")
                    .header(header::AUTHORIZATION, "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("employee_id"));
    }

    #[tokio::test]
    async fn test_projects_checks_token_before_query() {
        let server = MockServer::start_async().await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(Request::get("/api/projects").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_projects_returns_merged_names() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/project-assignment/table-for-home/")
                    .header("authorization", "Bearer tok");
                then.status(200).json_body(json!({
                    "data": [{ "projectName": "X" }, { "projectName": "Y" }]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/project-assignment/table-for-home-prev/")
                    .header("authorization", "Bearer tok");
                then.status(200).json_body(json!({
                    "data": [{ "projectName": "Y" }]
                }));
            })
            .await;
        let app = create_test_app(&server);

        let response = app
            .oneshot(
                Request::get("/api/projects?employee_id=4321")
                    .header(header::AUTHORIZATION, "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let mut names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["X", "Y"]);
    }
}
