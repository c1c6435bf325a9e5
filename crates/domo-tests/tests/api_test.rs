//! API integration tests against an in-process server
//!
//! Each test boots the full router on an ephemeral port and drives it with
//! a real HTTP client, so routing, extractors, status codes, and JSON
//! shapes are all exercised.
//!
//! Run with: cargo test -p domo-tests --test api_test

use std::sync::Arc;

use domo_api::{create_router, AppState};
use domo_store::Inventory;
use reqwest::Client;
use serde_json::{json, Value};

/// In-process server handle for one test.
struct TestServer {
    client: Client,
    base_url: String,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with_state(AppState::new(Arc::new(Inventory::new()))).await
    }

    async fn start_with_state(state: AppState) -> Self {
        let app = create_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server run");
        });
        Self {
            client: Client::new(),
            base_url: format!("http://{}", addr),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("GET")
    }

    async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST")
    }

    async fn put(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT")
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE")
    }

    /// Create home -> level -> room, return (home_id, level_id, room_id).
    async fn seed_hierarchy(&self) -> (i64, i64, i64) {
        let home: Value = self
            .post("/api/v1/homes", &json!({ "name": "Main House" }))
            .await
            .json()
            .await
            .unwrap();
        let home_id = home["id"].as_i64().unwrap();

        let level: Value = self
            .post(
                "/api/v1/levels",
                &json!({ "homeId": home_id, "name": "First Floor", "slug": "1" }),
            )
            .await
            .json()
            .await
            .unwrap();
        let level_id = level["id"].as_i64().unwrap();

        let room: Value = self
            .post(
                "/api/v1/rooms",
                &json!({ "levelId": level_id, "name": "Kitchen" }),
            )
            .await
            .json()
            .await
            .unwrap();
        let room_id = room["id"].as_i64().unwrap();

        (home_id, level_id, room_id)
    }

    /// Create one entry in each catalog, return (model_id, firmware_id, function_id).
    async fn seed_catalogs(&self) -> (i64, i64, i64) {
        let model: Value = self
            .post("/api/v1/models", &json!({ "name": "Shelly 1" }))
            .await
            .json()
            .await
            .unwrap();
        let firmware: Value = self
            .post("/api/v1/firmwares", &json!({ "name": "tasmota" }))
            .await
            .json()
            .await
            .unwrap();
        let function: Value = self
            .post("/api/v1/functions", &json!({ "name": "light" }))
            .await
            .json()
            .await
            .unwrap();
        (
            model["id"].as_i64().unwrap(),
            firmware["id"].as_i64().unwrap(),
            function["id"].as_i64().unwrap(),
        )
    }
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let response = server.get("/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_home_crud_lifecycle() {
    let server = TestServer::start().await;

    // Create
    let response = server
        .post("/api/v1/homes", &json!({ "name": "Beach House" }))
        .await;
    assert_eq!(response.status(), 201);
    let home: Value = response.json().await.unwrap();
    let id = home["id"].as_i64().unwrap();
    assert_eq!(home["name"], "Beach House");
    assert_eq!(home["slug"], "beach-house");

    // Read
    let fetched: Value = server
        .get(&format!("/api/v1/homes/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Beach House");

    // Update
    let response = server
        .put(
            &format!("/api/v1/homes/{}", id),
            &json!({ "name": "Lake House" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["name"], "Lake House");

    // List
    let homes: Value = server.get("/api/v1/homes").await.json().await.unwrap();
    assert_eq!(homes.as_array().unwrap().len(), 1);

    // Delete
    let response = server.delete(&format!("/api/v1/homes/{}", id)).await;
    assert_eq!(response.status(), 200);
    let response = server.get(&format!("/api/v1/homes/{}", id)).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_get_nonexistent_home_returns_404() {
    let server = TestServer::start().await;
    let response = server.get("/api/v1/homes/999").await;
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_level_requires_existing_home() {
    let server = TestServer::start().await;
    let response = server
        .post("/api/v1/levels", &json!({ "homeId": 42, "name": "Ghost" }))
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_delete_room_with_devices_is_refused() {
    let server = TestServer::start().await;
    let (_, _, room_id) = server.seed_hierarchy().await;
    let (model_id, firmware_id, function_id) = server.seed_catalogs().await;

    let response = server
        .post(
            "/api/v1/devices",
            &json!({
                "mac": "AA:BB:CC:DD:EE:01",
                "roomId": room_id,
                "modelId": model_id,
                "firmwareId": firmware_id,
                "functionId": function_id,
            }),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = server.delete(&format!("/api/v1/rooms/{}", room_id)).await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_device_view_contains_computed_fields() {
    let server = TestServer::start().await;
    let (_, _, room_id) = server.seed_hierarchy().await;
    let (model_id, firmware_id, function_id) = server.seed_catalogs().await;

    let response = server
        .post(
            "/api/v1/devices",
            &json!({
                "mac": "AA:BB:CC:DD:EE:02",
                "ip": "77",
                "positionName": "Ceiling",
                "roomId": room_id,
                "modelId": model_id,
                "firmwareId": firmware_id,
                "functionId": function_id,
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let device: Value = response.json().await.unwrap();

    assert_eq!(device["hostname"], "l1_kitchen_light_ceiling");
    assert_eq!(device["mqttTopic"], "home/l1/kitchen/light/ceiling");
    assert_eq!(device["fqdn"], "l1_kitchen_light_ceiling.local");
    assert_eq!(device["countTopic"], 24);
    assert_eq!(device["link"], "http://192.168.0.77/");
    assert_eq!(device["roomName"], "Kitchen");
    assert_eq!(device["modelName"], "Shelly 1");
}

#[tokio::test]
async fn test_malicious_stored_ip_never_becomes_link() {
    let server = TestServer::start().await;
    let (_, _, room_id) = server.seed_hierarchy().await;
    let (model_id, firmware_id, function_id) = server.seed_catalogs().await;

    let device: Value = server
        .post(
            "/api/v1/devices",
            &json!({
                "mac": "AA:BB:CC:DD:EE:03",
                "ip": "javascript:alert(1)",
                "roomId": room_id,
                "modelId": model_id,
                "firmwareId": firmware_id,
                "functionId": function_id,
            }),
        )
        .await
        .json()
        .await
        .unwrap();

    // The raw value is stored, but the rendered link fails closed.
    assert_eq!(device["ip"], "javascript:alert(1)");
    assert_eq!(device["link"], Value::Null);
}

#[tokio::test]
async fn test_duplicate_mac_returns_409() {
    let server = TestServer::start().await;
    let (_, _, room_id) = server.seed_hierarchy().await;
    let (model_id, firmware_id, function_id) = server.seed_catalogs().await;

    let body = json!({
        "mac": "AA:BB:CC:DD:EE:04",
        "roomId": room_id,
        "modelId": model_id,
        "firmwareId": firmware_id,
        "functionId": function_id,
    });
    assert_eq!(server.post("/api/v1/devices", &body).await.status(), 201);
    assert_eq!(server.post("/api/v1/devices", &body).await.status(), 409);
}

#[tokio::test]
async fn test_device_list_sorting() {
    let server = TestServer::start().await;
    let (_, _, room_id) = server.seed_hierarchy().await;
    let (model_id, firmware_id, function_id) = server.seed_catalogs().await;

    for (mac, position) in [
        ("AA:00:00:00:00:01", "Zulu"),
        ("AA:00:00:00:00:02", "alpha"),
        ("AA:00:00:00:00:03", "Mike"),
    ] {
        let response = server
            .post(
                "/api/v1/devices",
                &json!({
                    "mac": mac,
                    "positionName": position,
                    "roomId": room_id,
                    "modelId": model_id,
                    "firmwareId": firmware_id,
                    "functionId": function_id,
                }),
            )
            .await;
        assert_eq!(response.status(), 201);
    }

    // Case-insensitive ascending sort
    let rows: Value = server
        .get("/api/v1/devices?sort=positionName&dir=asc")
        .await
        .json()
        .await
        .unwrap();
    let positions: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["positionName"].as_str().unwrap())
        .collect();
    assert_eq!(positions, vec!["alpha", "Mike", "Zulu"]);

    // Descending
    let rows: Value = server
        .get("/api/v1/devices?sort=positionName&dir=desc")
        .await
        .json()
        .await
        .unwrap();
    let positions: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["positionName"].as_str().unwrap())
        .collect();
    assert_eq!(positions, vec!["Zulu", "Mike", "alpha"]);

    // Bad direction is rejected
    let response = server.get("/api/v1/devices?sort=mac&dir=sideways").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_settings_roundtrip_and_unknown_key() {
    let server = TestServer::start().await;

    let settings: Value = server.get("/api/v1/settings").await.json().await.unwrap();
    assert_eq!(settings["ip_prefix"], "192.168.0");
    assert_eq!(settings["dns_suffix"], "local");

    let response = server
        .put("/api/v1/settings", &json!({ "dns_suffix": "lan" }))
        .await;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["dns_suffix"], "lan");

    // A payload with no recognized key is an error
    let response = server
        .put("/api/v1/settings", &json!({ "bogus_key": "x" }))
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_settings_drive_computed_fields() {
    let server = TestServer::start().await;
    let (_, _, room_id) = server.seed_hierarchy().await;
    let (model_id, firmware_id, function_id) = server.seed_catalogs().await;

    server
        .put(
            "/api/v1/settings",
            &json!({ "dns_suffix": "lan", "mqtt_topic_prefix": "casa" }),
        )
        .await;

    let device: Value = server
        .post(
            "/api/v1/devices",
            &json!({
                "mac": "AA:BB:CC:DD:EE:05",
                "positionName": "Ceiling",
                "roomId": room_id,
                "modelId": model_id,
                "firmwareId": firmware_id,
                "functionId": function_id,
            }),
        )
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(device["fqdn"], "l1_kitchen_light_ceiling.lan");
    assert_eq!(device["mqttTopic"], "casa/l1/kitchen/light/ceiling");
}

#[tokio::test]
async fn test_hierarchy_tree_counts_devices() {
    let server = TestServer::start().await;
    let (_, _, room_id) = server.seed_hierarchy().await;
    let (model_id, firmware_id, function_id) = server.seed_catalogs().await;

    for mac in ["AA:00:00:00:00:10", "AA:00:00:00:00:11"] {
        server
            .post(
                "/api/v1/devices",
                &json!({
                    "mac": mac,
                    "roomId": room_id,
                    "modelId": model_id,
                    "firmwareId": firmware_id,
                    "functionId": function_id,
                }),
            )
            .await;
    }

    let tree: Value = server.get("/api/v1/hierarchy").await.json().await.unwrap();
    assert_eq!(tree["totalDevices"], 2);
    let homes = tree["homes"].as_array().unwrap();
    assert_eq!(homes.len(), 1);
    assert_eq!(homes[0]["deviceCount"], 2);
    assert_eq!(homes[0]["children"][0]["children"][0]["deviceCount"], 2);
}

#[tokio::test]
async fn test_vocabulary_lists_canonical_values() {
    let server = TestServer::start().await;
    let vocab: Value = server.get("/api/v1/vocabulary").await.json().await.unwrap();

    let functions = vocab["functions"].as_array().unwrap();
    assert!(functions.iter().any(|f| f == "light"));
    assert!(functions.iter().any(|f| f == "doorbell"));

    let firmwares = vocab["firmwares"].as_array().unwrap();
    assert!(firmwares.iter().any(|f| f == "tasmota"));
    // Historical spelling, kept on purpose
    assert!(firmwares.iter().any(|f| f == "embeded"));
}

#[tokio::test]
async fn test_import_creates_hierarchy_and_devices() {
    let server = TestServer::start().await;

    let rows = json!([
        {
            "mac": "AA:BB:CC:00:00:01",
            "state": "Enable",
            "level": "1",
            "room": "Kitchen",
            "position": "Ceiling",
            "function": "light",
            "firmware": "Tasmota",
            "model": "Shelly 1",
            "ip": "77",
        },
        {
            "mac": "AA:BB:CC:00:00:02",
            "state": "Disable",
            "level": "1",
            "room": "Kitchen",
            "position": "Wall",
            "function": "button",
            "firmware": "embedded",
            "model": "Shelly 1",
            "target": "AA:BB:CC:00:00:01",
        },
    ]);

    let response = server.post("/api/v1/import", &rows).await;
    assert_eq!(response.status(), 200);
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["total"], 2);
    assert_eq!(report["created"], 2);
    assert_eq!(report["errors"].as_array().unwrap().len(), 0);

    // Hierarchy was created on the fly
    let tree: Value = server.get("/api/v1/hierarchy").await.json().await.unwrap();
    assert_eq!(tree["totalDevices"], 2);

    // The target MAC was resolved in the second pass
    let devices: Value = server.get("/api/v1/devices").await.json().await.unwrap();
    let second = devices
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["mac"] == "AA:BB:CC:00:00:02")
        .unwrap();
    assert_eq!(second["targetMac"], "AA:BB:CC:00:00:01");
    assert_eq!(second["enabled"], false);
    // "embedded" is folded into the canonical catalog spelling
    assert_eq!(second["firmwareName"], "embeded");
}

#[tokio::test]
async fn test_import_empty_body_is_rejected() {
    let server = TestServer::start().await;
    let response = server.post("/api/v1/import", &json!([])).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_export_roundtrip() {
    let server = TestServer::start().await;

    let rows = json!([
        {
            "mac": "AA:BB:CC:00:00:03",
            "state": "Enable",
            "level": "2",
            "room": "Attic",
            "position": "Window",
            "function": "sensor",
            "firmware": "zigbee",
            "model": "Aqara",
            "ip": "50",
        },
    ]);
    server.post("/api/v1/import", &rows).await;

    let exported: Value = server.get("/api/v1/export").await.json().await.unwrap();
    let exported = exported.as_array().unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0]["mac"], "AA:BB:CC:00:00:03");
    assert_eq!(exported[0]["state"], "Enable");
    assert_eq!(exported[0]["level"], "2");
    assert_eq!(exported[0]["roomSlug"], "attic");
    // Import expands the bare octet with the prefix
    assert_eq!(exported[0]["ip"], "192.168.0.50");

    // YAML export carries its own content type
    let response = server.get("/api/v1/export?format=yaml").await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/yaml"
    );
    let body = response.text().await.unwrap();
    assert!(body.contains("AA:BB:CC:00:00:03"));

    let response = server.get("/api/v1/export?format=xml").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_maintenance_stats_and_clean_db() {
    let server = TestServer::start().await;
    let (_, _, room_id) = server.seed_hierarchy().await;
    let (model_id, firmware_id, function_id) = server.seed_catalogs().await;

    server
        .post(
            "/api/v1/devices",
            &json!({
                "mac": "AA:BB:CC:DD:EE:06",
                "roomId": room_id,
                "modelId": model_id,
                "firmwareId": firmware_id,
                "functionId": function_id,
            }),
        )
        .await;

    let stats: Value = server
        .get("/api/v1/maintenance/stats")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stats["devices"], 1);
    assert_eq!(stats["homes"], 1);

    // Wipe without the phrase is refused
    let response = server
        .post("/api/v1/maintenance/clean-db", &json!({ "confirmation": "yes" }))
        .await;
    assert_eq!(response.status(), 400);

    // Wipe with the phrase clears everything
    let response = server
        .post(
            "/api/v1/maintenance/clean-db",
            &json!({ "confirmation": "DELETE ALL DATA" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["deleted"]["devices"], 1);

    let stats: Value = server
        .get("/api/v1/maintenance/stats")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stats["devices"], 0);
    assert_eq!(stats["homes"], 0);
}

#[tokio::test]
async fn test_snapshot_persists_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("inventory.json");

    {
        let state = AppState::with_snapshot(Arc::new(Inventory::new()), snapshot.clone());
        let server = TestServer::start_with_state(state).await;
        server.seed_hierarchy().await;
    }

    assert!(snapshot.exists());

    // A fresh inventory loaded from the snapshot sees the same records
    let reloaded = Inventory::load_from_file(&snapshot).unwrap();
    let stats = reloaded.stats();
    assert_eq!(stats.get("homes"), Some(&1));
    assert_eq!(stats.get("rooms"), Some(&1));
}
