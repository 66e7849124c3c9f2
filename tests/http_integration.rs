//! Integration tests for the OneView HTTP transport using wiremock
//!
//! These tests drive the resource client and facades through a real
//! `HttpConnection` against mocked appliance endpoints.

use std::sync::Arc;
use std::time::Duration;

use oneview::{
    Config, Connection, DeleteOutcome, HttpConnection, OneViewClient, OneViewError, Outcome,
    QueryParams, RequestOptions, Resource, ResourceClient, TaskMonitor,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_ID: &str = "LTIxNjUzMjc0OTUzzHoF7eEkZLEUWVA";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn connection(server: &MockServer) -> Arc<dyn Connection> {
    init_tracing();
    let config = Config::new(server.uri(), SESSION_ID).expect("valid config");
    Arc::new(HttpConnection::new(&config).expect("http client"))
}

fn fast_monitor(connection: Arc<dyn Connection>) -> TaskMonitor {
    TaskMonitor::new(connection).with_poll_interval(Duration::from_millis(5), Duration::from_millis(20))
}

fn client(server: &MockServer, base: &str) -> ResourceClient {
    let connection = connection(server);
    ResourceClient::with_task_monitor(connection.clone(), base, fast_monitor(connection))
}

fn resource(value: Value) -> Resource {
    value.as_object().cloned().expect("object literal")
}

mod transport_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every request carries the API version, session and accept headers
    #[tokio::test]
    async fn test_standard_headers_are_sent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/fc-networks/1"))
            .and(header("X-API-Version", "300"))
            .and(header("Auth", SESSION_ID))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "SAN A"})))
            .expect(1)
            .mount(&server)
            .await;

        let network = client(&server, "/rest/fc-networks").get("1").await.unwrap();
        assert_eq!(network["name"], "SAN A");
    }

    /// 404 maps to NotFound with the requested address
    #[tokio::test]
    async fn test_404_maps_to_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/fc-networks/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"errorCode": "RESOURCE_NOT_FOUND"})))
            .mount(&server)
            .await;

        let err = client(&server, "/rest/fc-networks").get("missing").await.unwrap_err();
        match err {
            OneViewError::NotFound { uri } => assert_eq!(uri, "/rest/fc-networks/missing"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    /// 401 maps to an authentication error
    #[tokio::test]
    async fn test_401_maps_to_authentication() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/fc-networks/1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server, "/rest/fc-networks").get("1").await.unwrap_err();
        assert!(matches!(err, OneViewError::Authentication));
    }

    /// Error bodies never carry the session id
    #[tokio::test]
    async fn test_error_body_is_sanitized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/fc-networks/1"))
            .respond_with(ResponseTemplate::new(500).set_body_string(format!("session {} rejected", SESSION_ID)))
            .mount(&server)
            .await;

        let err = client(&server, "/rest/fc-networks").get("1").await.unwrap_err();
        match err {
            OneViewError::HttpStatus { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert!(!body.contains(SESSION_ID));
                assert!(body.contains("[REDACTED]"));
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    /// A 202 with a Location header is reported as a task
    #[tokio::test]
    async fn test_accepted_with_location_is_task() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/fc-networks"))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", "/rest/tasks/abc"))
            .mount(&server)
            .await;

        let outcome = connection(&server)
            .post("/rest/fc-networks", Some(&json!({"name": "SAN A"})), &Default::default())
            .await
            .unwrap();

        match outcome {
            Outcome::Task(task) => assert_eq!(task.uri, "/rest/tasks/abc"),
            other => panic!("expected task, got {:?}", other),
        }
    }

    /// A body that is itself a task resource is reported as a task
    #[tokio::test]
    async fn test_task_body_is_task() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/rest/fc-networks/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "category": "tasks",
                "uri": "/rest/tasks/def",
                "taskState": "Running"
            })))
            .mount(&server)
            .await;

        let outcome = connection(&server)
            .put("/rest/fc-networks/1", Some(&json!({})), &Default::default())
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Task(ref t) if t.uri == "/rest/tasks/def"));
    }

    /// A slow response is a transport timeout, not a task timeout
    #[tokio::test]
    async fn test_http_timeout_is_not_task_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/fc-networks/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "SAN A"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let source = http
            .get(format!("{}/rest/fc-networks/1", server.uri()))
            .send()
            .await
            .unwrap_err();
        let err = OneViewError::Http(source);

        assert!(err.is_transport_timeout());
        assert!(!err.is_timeout());
        assert!(!err.is_task_failure());
    }
}

mod resource_client_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// get_all follows nextPageUri and concatenates members in order
    #[tokio::test]
    async fn test_get_all_follows_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/fc-networks"))
            .and(query_param("start", "0"))
            .and(query_param("count", "-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "members": [{"name": "a"}, {"name": "b"}],
                "nextPageUri": "/rest/fc-networks?start=2&count=2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/fc-networks"))
            .and(query_param("start", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "members": [{"name": "c"}],
                "nextPageUri": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = client(&server, "/rest/fc-networks")
            .get_all(&QueryParams::new(), None)
            .await
            .unwrap();

        let names: Vec<&str> = items.iter().filter_map(|i| i["name"].as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    /// get_by sends the quoted equality filter
    #[tokio::test]
    async fn test_get_by_filter_on_the_wire() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/fc-networks"))
            .and(query_param("filter", "\"'name'='SAN A'\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"members": [{"name": "SAN A"}]})))
            .expect(1)
            .mount(&server)
            .await;

        let found = client(&server, "/rest/fc-networks")
            .get_by_name("SAN A")
            .await
            .unwrap();
        assert_eq!(found, Some(json!({"name": "SAN A"})));
    }

    /// create waits for the task through Running to Completed
    #[tokio::test]
    async fn test_create_waits_for_task() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/fc-networks"))
            .and(body_json(json!({"name": "SAN A"})))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", "/rest/tasks/t1"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/tasks/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "category": "tasks", "uri": "/rest/tasks/t1", "taskState": "Running"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/tasks/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "category": "tasks",
                "uri": "/rest/tasks/t1",
                "taskState": "Completed",
                "associatedResource": {"resourceUri": "/rest/fc-networks/9"}
            })))
            .mount(&server)
            .await;

        let result = client(&server, "/rest/fc-networks")
            .create(&resource(json!({"name": "SAN A"})), &RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(result["taskState"], "Completed");
        assert_eq!(result["associatedResource"]["resourceUri"], "/rest/fc-networks/9");
    }

    /// A task body that already finished is returned without polling
    #[tokio::test]
    async fn test_finished_task_body_is_not_polled() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/fc-networks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "category": "tasks", "uri": "/rest/tasks/t4", "taskState": "Completed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/tasks/t4"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let result = client(&server, "/rest/fc-networks")
            .create(&resource(json!({"name": "SAN A"})), &RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(result["uri"], "/rest/tasks/t4");
    }

    /// A failed task surfaces its error payload
    #[tokio::test]
    async fn test_failed_task_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/fc-networks/1"))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", "/rest/tasks/t2"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/tasks/t2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "category": "tasks",
                "uri": "/rest/tasks/t2",
                "taskState": "Error",
                "taskErrors": [{"message": "Network in use", "errorCode": "NETWORK_IN_USE"}]
            })))
            .mount(&server)
            .await;

        let err = client(&server, "/rest/fc-networks")
            .delete("1", &RequestOptions::new())
            .await
            .unwrap_err();

        assert!(err.is_task_failure());
        assert!(err.to_string().contains("Network in use"));
    }

    /// A task that never finishes times out
    #[tokio::test]
    async fn test_task_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/rest/fc-networks/1"))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", "/rest/tasks/t3"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/tasks/t3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "category": "tasks", "uri": "/rest/tasks/t3", "taskState": "Running"
            })))
            .mount(&server)
            .await;

        let err = client(&server, "/rest/fc-networks")
            .update(
                &resource(json!({"uri": "/rest/fc-networks/1"})),
                &RequestOptions::new().with_timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OneViewError::TaskTimeout { .. }));
    }

    /// 204 on delete is a completed deletion
    #[tokio::test]
    async fn test_delete_no_content() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/fc-networks/1"))
            .and(query_param("force", "True"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server, "/rest/fc-networks")
            .delete("1", &RequestOptions::new().with_force(true))
            .await
            .unwrap();
        assert_eq!(result, DeleteOutcome::Completed);
    }
}

mod facade_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Volume deletes carry the exportOnly header
    #[tokio::test]
    async fn test_volume_delete_export_only() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/storage-volumes/v1"))
            .and(header("exportOnly", "true"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let connection = connection(&server);
        let client = OneViewClient::with_connection(connection.clone(), fast_monitor(connection));

        let result = client
            .volumes()
            .delete("v1", true, &RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(result, DeleteOutcome::Completed);
    }

    /// FC network creation sends merged defaults
    #[tokio::test]
    async fn test_fc_network_create_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/fc-networks"))
            .and(body_json(json!({
                "autoLoginRedistribution": false,
                "type": "fc-networkV2",
                "linkStabilityTime": 30,
                "fabricType": "FabricAttach",
                "name": "SAN A"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"uri": "/rest/fc-networks/1"})))
            .expect(1)
            .mount(&server)
            .await;

        let connection = connection(&server);
        let client = OneViewClient::with_connection(connection.clone(), fast_monitor(connection));

        let created = client
            .fc_networks()
            .create(&resource(json!({"name": "SAN A"})), &RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(created["uri"], "/rest/fc-networks/1");
    }
}
