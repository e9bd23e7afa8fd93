//! End-to-end checks against an in-process stand-in for the exchange.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::mpsc;
use std::thread;

use hbdm::market::MarketData;
use hbdm::orders::{CONTRACT_HISORDERS_PATH, CONTRACT_ORDER_PATH};
use hbdm::signer::{canonical_query, sign_payload, signing_payload};
use hbdm::{
    CandlestickInterval, ContractType, Credentials, Direction, ExchangeReply, HbdmClient,
    HbdmError, Offset, OrderGateway, OrderHistoryQuery, OrderRequest, PricePoint, RestConfig,
};
use tiny_http::{Header, Response, Server};

const SECRET: &str = "test-secret";

#[derive(Debug)]
struct Captured {
    method: String,
    url: String,
    content_type: Option<String>,
    body: String,
}

/// Serves `replies` in order, one per request, and reports what it saw.
fn stub_exchange(replies: Vec<&'static str>) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for reply in replies {
            let Ok(mut req) = server.recv() else { return };
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let content_type = req
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.to_string());
            let _ = tx.send(Captured {
                method: req.method().to_string(),
                url: req.url().to_string(),
                content_type,
                body,
            });
            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let _ = req.respond(Response::from_string(reply).with_header(header));
        }
    });

    (format!("http://127.0.0.1:{port}"), rx)
}

fn client(endpoint: String) -> HbdmClient {
    HbdmClient::new(RestConfig { endpoint, timeout: None })
        .unwrap()
        .with_credentials(Credentials::new("access-1", SECRET))
}

fn query_params(url: &str) -> BTreeMap<String, String> {
    let (_, query) = url.split_once('?').unwrap();
    query
        .split('&')
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap();
            (k.to_string(), urlencoding::decode(v).unwrap().into_owned())
        })
        .collect()
}

fn buy_order() -> OrderRequest {
    OrderRequest {
        volume: 2,
        direction: Direction::Buy,
        offset: Offset::Open,
        lever_rate: 5,
        symbol: "ETH".to_string(),
        order_price_type: "limit".to_string(),
        contract_type: ContractType::NextWeek,
        price: 385.25,
    }
}

#[tokio::test]
async fn order_is_signed_the_way_the_server_verifies_it() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (endpoint, seen) = stub_exchange(vec![
        r#"{"status":"ok","data":{"order_id":1,"order_id_str":"1"},"ts":1}"#,
    ]);

    let reply = client(endpoint).place_order(&buy_order()).await.unwrap();
    assert!(reply.is_accepted());

    let req = seen.recv().unwrap();
    assert_eq!(req.method, "POST");
    assert!(req.url.starts_with(CONTRACT_ORDER_PATH));
    assert_eq!(req.content_type.as_deref(), Some("application/json"));

    let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(body, serde_json::to_value(buy_order()).unwrap());

    let mut params = query_params(&req.url);
    assert_eq!(params["AccessKeyId"], "access-1");
    assert_eq!(params["SignatureMethod"], "HmacSHA256");
    assert_eq!(params["SignatureVersion"], "2");
    assert_eq!(params["Timestamp"].len(), "2023-01-01T00:00:00".len());

    // Recompute on the "server" side.
    let signature = params.remove("Signature").unwrap();
    let payload = signing_payload("POST", "127.0.0.1", CONTRACT_ORDER_PATH, &canonical_query(&params));
    assert_eq!(signature, sign_payload(SECRET.as_bytes(), &payload).unwrap());
}

#[tokio::test]
async fn exchange_error_is_returned_verbatim() {
    let (endpoint, _seen) = stub_exchange(vec![
        r#"{"status":"error","err_code":1047,"err_msg":"Insufficient margin available.","ts":1}"#,
    ]);

    let reply = client(endpoint).place_order(&buy_order()).await.unwrap();
    assert_eq!(
        reply,
        ExchangeReply::Rejected {
            code: Some(1047),
            message: "Insufficient margin available.".to_string()
        }
    );
}

#[tokio::test]
async fn raw_signed_post_does_not_classify() {
    let (endpoint, _seen) = stub_exchange(vec![r#"{"status":"error","err_msg":"bad"}"#]);
    let client = client(endpoint);

    let body = client
        .post_signed(&client.url(CONTRACT_ORDER_PATH), &buy_order())
        .await
        .unwrap();
    assert_eq!(body["err_msg"], "bad");
}

#[tokio::test]
async fn non_json_reply_is_a_decode_error() {
    let (endpoint, _seen) = stub_exchange(vec!["<html>gateway timeout</html>"]);

    let err = client(endpoint).place_order(&buy_order()).await.unwrap_err();
    assert!(matches!(err, HbdmError::Decode(_)));
}

#[tokio::test]
async fn invalid_order_never_reaches_the_wire() {
    let (endpoint, seen) = stub_exchange(vec![r#"{"status":"ok","data":{}}"#]);

    let mut order = buy_order();
    order.price = -1.0;
    let err = client(endpoint).place_order(&order).await.unwrap_err();

    assert!(matches!(err, HbdmError::InvalidOrder(_)));
    assert!(seen.try_recv().is_err());
}

#[tokio::test]
async fn order_history_reads_data_orders() {
    let (endpoint, seen) = stub_exchange(vec![
        r#"{"status":"ok","data":{"orders":[
            {"order_id":11,"symbol":"ETH","direction":"buy","offset":"open","volume":1.0,
             "price":380.0,"lever_rate":5,"trade_volume":1.0,"trade_avg_price":380.0,
             "status":6,"create_date":1604302745000}
        ],"total_page":1,"current_page":1,"total_size":1},"ts":1}"#,
    ]);

    let reply = client(endpoint)
        .order_history(&OrderHistoryQuery::all("ETH", 7))
        .await
        .unwrap();
    let ExchangeReply::Accepted(rows) = reply else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].order_id, 11);

    let req = seen.recv().unwrap();
    assert!(req.url.starts_with(CONTRACT_HISORDERS_PATH));
    let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(body["type"], 1);
    assert_eq!(body["create_date"], 7);
}

#[tokio::test]
async fn candles_come_back_most_recent_last() {
    let (endpoint, seen) = stub_exchange(vec![
        r#"{"ch":"market.ETH_CQ.kline.1min","status":"ok","ts":1,"data":[
            {"id":120,"open":2.0,"close":2.5,"low":1.9,"high":2.6,"amount":1,"vol":1,"count":1},
            {"id":60,"open":1.0,"close":1.5,"low":0.9,"high":1.6,"amount":1,"vol":1,"count":1}
        ]}"#,
    ]);

    // Public data needs no credentials.
    let client = HbdmClient::new(RestConfig { endpoint, timeout: None }).unwrap();
    let points = client
        .fetch_recent_candles("ETH_CQ", CandlestickInterval::Min1, 5000)
        .await
        .unwrap();
    assert_eq!(
        points,
        vec![PricePoint { ts: 60, close: 1.5 }, PricePoint { ts: 120, close: 2.5 }]
    );

    let req = seen.recv().unwrap();
    assert_eq!(req.method, "GET");
    let params = query_params(&req.url);
    assert_eq!(params["symbol"], "ETH_CQ");
    assert_eq!(params["period"], "1min");
    assert_eq!(params["size"], "2000");
}

#[tokio::test]
async fn rejected_kline_is_an_empty_series() {
    let (endpoint, seen) = stub_exchange(vec![
        r#"{"status":"error","err_code":1014,"err_msg":"This contract doesn't exist.","ts":1}"#,
    ]);

    let client = HbdmClient::new(RestConfig { endpoint, timeout: None }).unwrap();
    let points = client
        .fetch_recent_candles("XYZ_CQ", CandlestickInterval::Min5, 200)
        .await
        .unwrap();
    assert_eq!(points, Vec::<PricePoint>::new());

    let req = seen.recv().unwrap();
    assert_eq!(query_params(&req.url)["symbol"], "XYZ_CQ");
}
