// Shared test helpers

#![allow(dead_code)]

use axum::{Router, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::net::SocketAddr;

/// A statistics document shaped like Tdarr's StatisticsJSONDB response.
pub fn sample_document() -> Value {
    json!({
        "_id": "statistics",
        "totalFileCount": 1520,
        "totalTranscodeCount": 310,
        "totalHealthCheckCount": 1480,
        "sizeDiff": -812.25,
        "DBFetchTime": "1.5s",
        "DBLoadStatus": "Stable",
        "DBQueue": 4,
        "tdarrScore": "87.5",
        "healthCheckScore": "97.37",
        "processWarning": "",
        "processWarningQueues": false,
        "table0Count": 10, "table1Count": 11, "table2Count": 12, "table3Count": 13,
        "table4Count": 14, "table5Count": 15, "table6Count": 16,
        "table0ViewableCount": 20, "table1ViewableCount": 21, "table2ViewableCount": 22,
        "table3ViewableCount": 23, "table4ViewableCount": 24, "table5ViewableCount": 25,
        "table6ViewableCount": 26,
        "streamStats": {
            "duration": {"average": 2700, "highest": 10800, "total": 4104000},
            "bit_rate": {"average": 6500000, "highest": 48000000, "total": 9880000000u64},
            "nb_frames": {"average": 64800, "highest": 259200, "total": 98496000}
        },
        "avgNumberOfStreamsInVideo": 3.4,
        "languages": {
            "eng": {"count": 1400},
            "jpn": {"count": 120}
        },
        "pies": [
            [
                "Movies", "lib1", 1000, 200, -500.5, 990,
                [{"name": "Transcode success", "value": 180}, {"name": "Not required", "value": 20}],
                [{"name": "Success", "value": 985}, {"name": "Error", "value": 5}],
                [{"name": "hevc", "value": 700}, {"name": "h264", "value": 300}],
                [{"name": "mkv", "value": 950}, {"name": "mp4", "value": 50}],
                [{"name": "1080p", "value": 800}, {"name": "4KUHD", "value": 200}],
                [{"name": "aac", "value": 600}, {"name": "eac3", "value": 400}],
                [{"name": "mkv", "value": 1000}]
            ],
            [
                "TV", "lib2", 520, 110, -311.75, 490,
                [{"name": "Transcode success", "value": 110}],
                [{"name": "Success", "value": 490}],
                [{"name": "hevc", "value": 520}],
                [{"name": "mkv", "value": 520}],
                [{"name": "720p", "value": 520}],
                [{"name": "aac", "value": 520}],
                [{"name": "mkv", "value": 520}]
            ]
        ]
    })
}

pub fn sample_body() -> Vec<u8> {
    serde_json::to_vec(&sample_document()).expect("serialize sample document")
}

/// Serves `status` + `body` for every POST to /api/v2/cruddb on an ephemeral port.
pub async fn spawn_upstream(status: StatusCode, body: Vec<u8>) -> SocketAddr {
    let app = Router::new().route(
        "/api/v2/cruddb",
        post(move |payload: axum::Json<Value>| {
            let body = body.clone();
            async move {
                assert_eq!(payload.0["data"]["collection"], "StatisticsJSONDB");
                assert_eq!(payload.0["data"]["mode"], "getById");
                assert_eq!(payload.0["data"]["docID"], "statistics");
                (status, body)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream stub");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
