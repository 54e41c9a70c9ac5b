//! Wire-level tests for KuFlowRestClient against one-shot tiny_http servers

use std::fs;
use std::io::Read;
use std::thread::{self, JoinHandle};

use tempfile::TempDir;
use tiny_http::{Response, Server};
use uuid::Uuid;

use kuflowctl::config::{PartialConfig, ResolvedConfig};
use kuflowctl::domain::{
    ElementTarget, LogLevel, SaveElementCommand, SaveElementDocumentCommand, TaskLog,
};
use kuflowctl::infrastructure::error::TransportError;
use kuflowctl::infrastructure::rest::KuFlowRestClient;
use kuflowctl::infrastructure::traits::TaskOperations;

/// What the server saw.
#[derive(Debug)]
struct Captured {
    method: String,
    url: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

/// Serve a single request with `status`, returning the endpoint and a handle
/// yielding the captured request.
fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Captured>) {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_ip().expect("ip address");

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request");
        let header = |name: &'static str| {
            request
                .headers()
                .iter()
                .find(|h| h.field.equiv(name))
                .map(|h| h.value.as_str().to_string())
        };
        let authorization = header("Authorization");
        let content_type = header("Content-Type");
        let mut content = String::new();
        request
            .as_reader()
            .read_to_string(&mut content)
            .expect("read body");
        let captured = Captured {
            method: request.method().to_string(),
            url: request.url().to_string(),
            authorization,
            content_type,
            body: content,
        };
        request
            .respond(Response::from_string(body).with_status_code(status))
            .expect("respond");
        captured
    });

    (format!("http://{addr}/api"), handle)
}

fn client(endpoint: &str) -> KuFlowRestClient {
    let config = ResolvedConfig::try_from(PartialConfig::new(
        Some(endpoint.to_string()),
        Some("my-client".to_string()),
        Some("my-secret".to_string()),
    ))
    .unwrap();
    KuFlowRestClient::new(&config).unwrap()
}

fn target() -> ElementTarget {
    ElementTarget {
        task_id: Uuid::new_v4(),
        element_code: Some("FIELD".to_string()),
        valid: true,
    }
}

#[test]
fn given_field_values_when_save_element_then_posts_json_with_basic_auth() {
    // Arrange
    let (endpoint, server) = serve_once(200, "{}");
    let target = target();
    let command = SaveElementCommand::strings(&target, &["v1".to_string()]);

    // Act
    client(&endpoint)
        .save_element(target.task_id, &command)
        .unwrap();

    // Assert
    let req = server.join().unwrap();
    assert_eq!(req.method, "POST");
    assert_eq!(
        req.url,
        format!("/api/tasks/{}/~actions/save-element", target.task_id)
    );
    assert!(req
        .authorization
        .as_deref()
        .is_some_and(|a| a.starts_with("Basic ")));
    assert!(req
        .content_type
        .as_deref()
        .is_some_and(|c| c.starts_with("application/json")));
    let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(body["elementDefinitionCode"], "FIELD");
    assert_eq!(body["elementValues"][0]["type"], "STRING");
    assert_eq!(body["elementValues"][0]["value"], "v1");
}

#[test]
fn given_file_when_save_element_document_then_posts_multipart() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("report.txt");
    fs::write(&file, "report body").unwrap();
    let (endpoint, server) = serve_once(200, "{}");
    let task_id = Uuid::new_v4();
    let command = SaveElementDocumentCommand {
        element_definition_code: Some("DOC".to_string()),
        element_value_id: None,
        element_value_valid: false,
    };

    // Act
    client(&endpoint)
        .save_element_document(task_id, &command, &file)
        .unwrap();

    // Assert
    let req = server.join().unwrap();
    assert_eq!(
        req.url,
        format!("/api/tasks/{task_id}/~actions/save-element-value-document")
    );
    assert!(req
        .content_type
        .as_deref()
        .is_some_and(|c| c.starts_with("multipart/form-data")));
    assert!(req.body.contains("name=\"file\""), "{}", req.body);
    assert!(req.body.contains("filename=\"report.txt\""), "{}", req.body);
    assert!(req.body.contains("report body"));
    assert!(req.body.contains("name=\"elementDefinitionCode\""));
    assert!(req.body.contains("name=\"elementValueValid\""));
    assert!(!req.body.contains("name=\"elementValueId\""));
}

#[test]
fn given_log_when_append_log_then_posts_level_and_message() {
    // Arrange
    let (endpoint, server) = serve_once(200, "{}");
    let task_id = Uuid::new_v4();
    let log = TaskLog {
        level: LogLevel::Error,
        message: "failed".to_string(),
    };

    // Act
    client(&endpoint).append_log(task_id, &log).unwrap();

    // Assert
    let req = server.join().unwrap();
    assert_eq!(req.url, format!("/api/tasks/{task_id}/~actions/append-log"));
    let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(body, serde_json::json!({"level": "ERROR", "message": "failed"}));
}

#[test]
fn given_unauthorized_response_when_calling_then_unauthorized_error() {
    // Arrange
    let (endpoint, server) = serve_once(401, "");
    let log = TaskLog {
        level: LogLevel::Info,
        message: "m".to_string(),
    };

    // Act
    let err = client(&endpoint)
        .append_log(Uuid::new_v4(), &log)
        .unwrap_err();

    // Assert
    server.join().unwrap();
    assert!(matches!(err, TransportError::Unauthorized), "{err:?}");
}

#[test]
fn given_server_error_when_calling_then_keeps_status_and_body() {
    // Arrange
    let (endpoint, server) = serve_once(500, "kaboom");
    let target = target();
    let command = SaveElementCommand::strings(&target, &["v".to_string()]);

    // Act
    let err = client(&endpoint)
        .save_element(target.task_id, &command)
        .unwrap_err();

    // Assert
    server.join().unwrap();
    match err {
        TransportError::Server { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "kaboom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_relative_endpoint_when_building_client_then_invalid_endpoint() {
    // Arrange
    let config = ResolvedConfig::try_from(PartialConfig::new(
        Some("api.kuflow.com".to_string()),
        Some("id".to_string()),
        Some("secret".to_string()),
    ))
    .unwrap();

    // Act
    let result = KuFlowRestClient::new(&config);

    // Assert
    assert!(matches!(
        result,
        Err(TransportError::InvalidEndpoint { .. })
    ));
}

#[test]
fn given_trailing_slash_when_building_url_then_no_double_slash() {
    // Arrange
    let client = client("https://api.kuflow.com/v2022-10-08/");
    let task_id = Uuid::nil();

    // Act
    let url = client.task_action_url(task_id, "append-log");

    // Assert
    assert_eq!(
        url,
        format!("https://api.kuflow.com/v2022-10-08/tasks/{task_id}/~actions/append-log")
    );
}
