//! Integration tests using wiremock to simulate the Shippo API.

use serde_json::json;
use shippo::extras::{Extra, Extras};
use shippo::models::{Address, ListParams, ShipmentRequest, TransactionRequest};
use shippo::{Client, ClientConfig, Error, PollBackoff};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, token: &str) -> ClientConfig {
    ClientConfig::builder()
        .token(token)
        .base_url(server.uri())
        .poll_backoff(PollBackoff::Fixed(Duration::from_millis(10)))
        .build()
        .unwrap()
}

fn with_status(code: u16, object_id: &str, status: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({"object_id": object_id, "status": status}))
}

fn client_for(server: &MockServer) -> Client {
    Client::new(config_for(server, "shippo_test_abc")).unwrap()
}

#[tokio::test]
async fn test_successful_retrieve() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/addresses/addr_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object_id": "addr_1",
            "name": "Mr Hippo",
            "country": "US",
            "is_complete": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let address = client_for(&mock_server)
        .retrieve_address("addr_1")
        .await
        .unwrap();

    assert_eq!(address.object_id.as_deref(), Some("addr_1"));
    assert_eq!(address.name.as_deref(), Some("Mr Hippo"));
    assert_eq!(address.is_complete, Some(true));
}

#[tokio::test]
async fn test_raw_body_is_returned_unchanged() {
    let mock_server = MockServer::start().await;
    let body = r#"{"object_id": "rate_1",   "amount": "5.50"}"#;

    Mock::given(method("GET"))
        .and(path("/rates/rate_1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .send(&shippo::metadata::RequestMetadata::get("rates").segment("rate_1"))
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.body, body);
}

#[tokio::test]
async fn test_create_sends_json_without_nulls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/addresses"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "name": "Mrs Hippo",
            "city": "San Francisco",
            "country": "US",
            "validate": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "object_id": "addr_2",
            "name": "Mrs Hippo"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let created = client_for(&mock_server)
        .create_address(&Address {
            name: Some("Mrs Hippo".to_string()),
            city: Some("San Francisco".to_string()),
            country: Some("US".to_string()),
            validate: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.object_id.as_deref(), Some("addr_2"));
}

#[tokio::test]
async fn test_shippo_token_auth_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/parcels/p_1"))
        .and(header("authorization", "ShippoToken shippo_test_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object_id": "p_1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    client_for(&mock_server).retrieve_parcel("p_1").await.unwrap();
}

#[tokio::test]
async fn test_oauth_token_uses_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/parcels/p_1"))
        .and(header("authorization", "Bearer oauth.abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object_id": "p_1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(config_for(&mock_server, "oauth.abc123")).unwrap();
    client.retrieve_parcel("p_1").await.unwrap();
}

#[tokio::test]
async fn test_version_header_only_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/parcels/p_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object_id": "p_1"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.retrieve_parcel("p_1").await.unwrap();

    let mut pinned_config = client.config().clone();
    pinned_config.set_api_version(Some("2018-02-08".to_string()));
    client
        .with_config(pinned_config)
        .retrieve_parcel("p_1")
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].headers.get("shippo-api-version").is_none());
    assert_eq!(requests[1].headers["shippo-api-version"], "2018-02-08");
    assert!(requests[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_404_is_api_error_with_exact_body() {
    let mock_server = MockServer::start().await;
    let payload = r#"{"detail":"not found"}"#;

    Mock::given(method("GET"))
        .and(path("/shipments/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(payload))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).retrieve_shipment("missing").await;

    match result {
        Err(Error::Api {
            status,
            raw_response,
            ..
        }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(raw_response, payload);
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_400_validation_error_is_api_error() {
    let mock_server = MockServer::start().await;
    let payload = r#"{"zip":["This field is required."]}"#;

    Mock::given(method("POST"))
        .and(path("/addresses"))
        .respond_with(ResponseTemplate::new(400).set_body_string(payload))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .create_address(&Address::default())
        .await
        .unwrap_err();

    assert!(err.is_api_error());
    assert_eq!(err.raw_response(), Some(payload));
}

#[tokio::test]
async fn test_500_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/refunds/r_1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .retrieve_refund("r_1")
        .await
        .unwrap_err();

    assert!(err.is_api_error());
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert_eq!(err.raw_response(), Some("Internal Server Error"));
}

#[tokio::test]
async fn test_503_is_passed_through_as_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/refunds/r_1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .retrieve_refund("r_1")
        .await
        .unwrap_err();

    match err {
        Error::Network(cause) => {
            assert!(cause.is_status());
            assert_eq!(cause.status().map(|s| s.as_u16()), Some(503));
        }
        other => panic!("Expected Network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    let config = ClientConfig::builder()
        .token("shippo_test_abc")
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = Client::new(config)
        .unwrap()
        .retrieve_address("addr_1")
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.raw_response().is_none());
}

#[tokio::test]
async fn test_slow_response_hits_request_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rates/rate_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"object_id": "rate_1"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = ClientConfig::builder()
        .token("shippo_test_abc")
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let err = Client::new(config)
        .unwrap()
        .retrieve_rate("rate_1")
        .await
        .unwrap_err();

    match err {
        Error::Network(ref cause) => assert!(cause.is_timeout()),
        ref other => panic!("Expected Network timeout, got {:?}", other),
    }
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_blank_ids_are_rejected_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object_id": "WRONG"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = client.validate_address("").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", err);

    let err = client.retrieve_address("").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", err);

    let err = client
        .add_shipments_to_batch(" ", &["shp_1".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", err);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_malformed_success_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transactions/tx_1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).retrieve_transaction("tx_1").await;

    match result {
        Err(Error::DeserializationFailed {
            raw_response,
            status,
            ..
        }) => {
            assert_eq!(raw_response, "not json");
            assert_eq!(status.as_u16(), 200);
        }
        other => panic!("Expected DeserializationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_sends_paging_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shipments"))
        .and(query_param("page", "2"))
        .and(query_param("results", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 6,
            "next": null,
            "previous": "https://api.goshippo.com/shipments?page=1&results=5",
            "results": [{"object_id": "shp_6", "status": "SUCCESS"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = client_for(&mock_server)
        .list_shipments(&ListParams {
            page: Some(2),
            results: Some(5),
        })
        .await
        .unwrap();

    assert_eq!(page.count, Some(6));
    assert!(page.next.is_none());
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].object_id.as_deref(), Some("shp_6"));
}

#[tokio::test]
async fn test_shipping_rates_waits_for_generation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shipments/shp_1"))
        .respond_with(with_status(200, "shp_1", "WAITING"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shipments/shp_1"))
        .respond_with(with_status(200, "shp_1", "QUEUED"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shipments/shp_1"))
        .respond_with(with_status(200, "shp_1", "SUCCESS"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shipments/shp_1/rates/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{
                "object_id": "rate_1",
                "provider": "USPS",
                "amount": "5.50",
                "currency": "USD"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rates = client_for(&mock_server)
        .shipping_rates("shp_1", Some("USD"))
        .await
        .unwrap();

    assert_eq!(rates.results.len(), 1);
    assert_eq!(rates.results[0].provider.as_deref(), Some("USPS"));
}

#[tokio::test]
async fn test_rates_without_currency_use_trailing_slash() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shipments/shp_1/rates/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rates = client_for(&mock_server)
        .rates_for_shipment("shp_1", None)
        .await
        .unwrap();

    assert!(rates.results.is_empty());
}

#[tokio::test]
async fn test_transaction_wait_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transactions"))
        .respond_with(with_status(201, "tx_1", "QUEUED"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transactions/tx_1"))
        .respond_with(with_status(200, "tx_1", "WAITING"))
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server, "shippo_test_abc");
    config.set_transaction_poll_timeout(Duration::from_millis(200));
    config.set_poll_backoff(PollBackoff::Fixed(Duration::from_millis(50)));

    let err = Client::new(config)
        .unwrap()
        .create_transaction_and_wait(&TransactionRequest {
            rate: Some("rate_1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    match err {
        Error::RequestTimeout {
            resource,
            object_id,
            waited,
            ..
        } => {
            assert_eq!(resource, "transaction");
            assert_eq!(object_id, "tx_1");
            assert!(waited >= Duration::from_millis(200));
        }
        other => panic!("Expected RequestTimeout, got {:?}", other),
    }

    let fetches = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert!(fetches >= 1);
    assert!(fetches <= 4, "fetched {} times within 200ms at 50ms spacing", fetches);
}

#[tokio::test]
async fn test_transaction_that_finishes_immediately_is_not_polled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "object_id": "tx_2",
            "status": "SUCCESS",
            "label_url": "https://shippo-delivery.s3.amazonaws.com/label.pdf"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transactions/tx_2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let transaction = client_for(&mock_server)
        .create_transaction_and_wait(&TransactionRequest {
            rate: Some("rate_1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(transaction.label_url.is_some());
}

#[tokio::test]
async fn test_invalid_extra_is_rejected_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/shipments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let request = ShipmentRequest {
        address_from: Some("addr_from".into()),
        address_to: Some("addr_to".into()),
        parcels: vec!["parcel_1".into()],
        extra: Some(Extras::new().with(Extra::Reference1("x".repeat(51)))),
        ..Default::default()
    };

    let err = client_for(&mock_server)
        .create_shipment(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidExtra { feature: "reference_1", .. }));
}

#[tokio::test]
async fn test_add_shipments_to_batch_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batches/b_1/add_shipments"))
        .and(body_json(json!([{"shipment": "shp_1"}, {"shipment": "shp_2"}])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object_id": "b_1",
            "status": "VALIDATING",
            "batch_shipments": {"count": 2, "results": []}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let batch = client_for(&mock_server)
        .add_shipments_to_batch("b_1", &["shp_1".to_string(), "shp_2".to_string()])
        .await
        .unwrap();

    assert_eq!(batch.status.as_deref(), Some("VALIDATING"));
    assert_eq!(batch.batch_shipments.count, Some(2));
}

#[tokio::test]
async fn test_tracking_path_segments_are_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks/usps/9205%2090"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "carrier": "usps",
            "tracking_number": "9205 90",
            "tracking_status": {"status": "TRANSIT"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let track = client_for(&mock_server)
        .retrieve_tracking("usps", "9205 90")
        .await
        .unwrap();

    assert_eq!(track.tracking_number.as_deref(), Some("9205 90"));
}

#[test]
fn test_blocking_client_shares_the_async_path() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mock_server = runtime.block_on(MockServer::start());

    runtime.block_on(
        Mock::given(method("GET"))
            .and(path("/carrier_accounts/ca_1"))
            .and(header("authorization", "ShippoToken shippo_test_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object_id": "ca_1",
                "carrier": "fedex",
                "active": true
            })))
            .expect(1)
            .mount(&mock_server),
    );

    runtime.block_on(
        Mock::given(method("GET"))
            .and(path("/manifests/m_1"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"not found"}"#))
            .mount(&mock_server),
    );

    let config = config_for(&mock_server, "shippo_test_abc");
    let client = shippo::blocking::Client::new(config).unwrap();

    let account = client.retrieve_carrier_account("ca_1").unwrap();
    assert_eq!(account.carrier.as_deref(), Some("fedex"));

    let err = client.retrieve_manifest("m_1").unwrap_err();
    assert!(err.is_api_error());
    assert_eq!(err.raw_response(), Some(r#"{"detail":"not found"}"#));
}
