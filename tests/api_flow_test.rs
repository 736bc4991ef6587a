mod common;

use atelier_api::auth::Role;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}

async fn seed_client(app: &TestApp, name: &str) -> i64 {
    let client = app
        .admin(
            Method::POST,
            "/api/client",
            Some(json!({ "name": name })),
            StatusCode::CREATED,
        )
        .await;
    client["id"].as_i64().unwrap()
}

/// Client "Maison Nord" with model "Veste" ordering CMD-1: 10 S + 20 M.
async fn seed_model(app: &TestApp) -> (i64, i64) {
    let client_id = seed_client(app, "Maison Nord").await;
    let model = app
        .admin(
            Method::POST,
            "/api/client-model",
            Some(json!({
                "client_id": client_id,
                "name": "Veste",
                "commandes": "CMD-1",
                "variants": [
                    { "commande": "CMD-1", "variantes": [
                        { "name": "S", "quantity": 10 },
                        { "name": "M", "quantity": 20 }
                    ]}
                ]
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(model["total_quantity"], 30);
    (client_id, model["id"].as_i64().unwrap())
}

#[tokio::test]
async fn ordered_received_and_delivered_quantities_reconcile() {
    let app = TestApp::new().await;
    let (client_id, model_id) = seed_model(&app).await;
    let today = Utc::now().date_naive();

    app.admin(
        Method::POST,
        "/api/import",
        Some(json!({
            "client_id": client_id,
            "client": "maison nord ",
            "reference": "DI-001",
            "date": today,
            "lines": [
                { "id": "tmp-1", "client_model_id": model_id, "model": "Veste", "commande": "CMD-1",
                  "quantity_recu": 20, "quantity_trouve": 18 }
            ],
            "accessories": [
                { "model": "Veste", "name": "Boutons", "quantity_recu": 100, "quantity_trouve": 100, "quantity_sortie": 40 }
            ]
        })),
        StatusCode::CREATED,
    )
    .await;

    let delivery = app
        .admin(
            Method::POST,
            "/api/livraisons",
            Some(json!({
                "client_id": client_id,
                "client": "Maison Nord",
                "reference": "BL-001",
                "date": today,
                "lines": [
                    { "client_model_id": model_id, "model": "Veste", "commande": "CMD-1",
                      "quantity_livree": 15, "unit_price": "2.50" },
                    { "client_model_id": model_id, "model": "Veste", "commande": "CMD-1",
                      "quantity_livree": 5, "unit_price": "0", "is_excluded": true }
                ]
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(delivery["quantity_livree"], 15);

    let report = app
        .admin(
            Method::GET,
            &format!("/api/client-model/{model_id}/reconciliation"),
            None,
            StatusCode::OK,
        )
        .await;
    let order = &report["orders"][0];
    assert_eq!(order["commande"], "CMD-1");
    assert_eq!(order["quantityTotal"], 30);
    assert_eq!(order["quantityReceived"], 20);
    assert_eq!(order["quantityDelivered"], 15);

    let planning = app
        .admin(Method::GET, "/api/planning?client=MAISON%20NORD", None, StatusCode::OK)
        .await;
    let rows = planning.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["outbound_missing"], 15);

    let etat = app
        .admin(Method::GET, "/api/etat/import", None, StatusCode::OK)
        .await;
    assert_eq!(etat[0]["inbound_missing"], 2);
    assert_eq!(etat[0]["flagged"], false);
}

#[tokio::test]
async fn invoice_lines_are_diffed_and_overdue_invoices_become_unpaid() {
    let app = TestApp::new().await;
    let today = Utc::now().date_naive();

    let created = app
        .admin(
            Method::POST,
            "/api/invoices",
            Some(json!({
                "number": "F-2024-001",
                "issuer_name": "Atelier",
                "client_name": "Maison Nord",
                "invoice_date": today - Duration::days(40),
                "due_date": today - Duration::days(10),
                "vat_active": true,
                "vat_rate": "19",
                "status": 2,
                "lines": [
                    { "id": "new-a", "commande": "CMD-1", "model": "Veste", "quantity": 10, "unit_price": "10" },
                    { "id": "new-b", "commande": "CMD-1", "model": "Veste", "quantity": 1, "unit_price": "5" }
                ]
            })),
            StatusCode::CREATED,
        )
        .await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(decimal(&created["total_ht"]), dec!(105));
    assert_eq!(decimal(&created["total_tva"]), dec!(19.95));
    assert_eq!(decimal(&created["total_ttc"]), dec!(124.95));

    // Past its due date while pending: reads persist the switch to unpaid
    let fetched = app
        .admin(Method::GET, &format!("/api/invoices/{id}"), None, StatusCode::OK)
        .await;
    assert_eq!(fetched["status"], 5);

    let keep = fetched["lines"][0]["id"].as_i64().unwrap();
    let updated = app
        .admin(
            Method::PUT,
            &format!("/api/invoices/{id}"),
            Some(json!({
                "number": "F-2024-001",
                "issuer_name": "Atelier",
                "client_name": "Maison Nord",
                "invoice_date": today - Duration::days(40),
                "due_date": today - Duration::days(10),
                "vat_active": false,
                "status": 5,
                "lines": [
                    { "id": keep, "commande": "CMD-1", "model": "Veste", "quantity": 12, "unit_price": "10" },
                    { "id": 1712345678901i64, "commande": "CMD-2", "model": "Veste", "quantity": 2, "unit_price": "7.5" }
                ]
            })),
            StatusCode::OK,
        )
        .await;
    let lines = updated["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l["id"].as_i64() == Some(keep) && l["quantity"] == 12));
    assert_eq!(decimal(&updated["total_ht"]), dec!(135));
    assert_eq!(decimal(&updated["total_tva"]), Decimal::ZERO);
    assert_eq!(decimal(&updated["vat_rate"]), dec!(19));

    let paid = app
        .admin(
            Method::PUT,
            &format!("/api/invoices/{id}/status"),
            Some(json!({ "status": 3 })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(paid["status"], 3);

    let (status, _) = app
        .send_as(
            Role::Admin,
            Method::POST,
            "/api/invoices",
            Some(json!({
                "number": " F-2024-001 ",
                "issuer_name": "Atelier",
                "client_name": "Other",
                "invoice_date": today
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let listed = app
        .admin(Method::GET, "/api/invoices?status=3", None, StatusCode::OK)
        .await;
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn overdue_pending_export_reads_back_unpaid() {
    let app = TestApp::new().await;
    let today = Utc::now().date_naive();

    let created = app
        .admin(
            Method::POST,
            "/api/exporte",
            Some(json!({
                "client": "Maison Nord",
                "reference": "DE-001",
                "date": today - Duration::days(40),
                "due_date": today - Duration::days(1),
                "status": 2,
                "vat_active": true,
                "vat_rate": "19",
                "lines": [
                    { "model": "Veste", "commande": "CMD-1", "quantity_livree": 10, "unit_price": "3" }
                ]
            })),
            StatusCode::CREATED,
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let fetched = app
        .admin(Method::GET, &format!("/api/exporte/{id}"), None, StatusCode::OK)
        .await;
    assert_eq!(fetched["status"], 5);
    assert_eq!(decimal(&fetched["total_ttc"]), dec!(35.7));

    let not_yet_due = app
        .admin(
            Method::POST,
            "/api/exporte",
            Some(json!({
                "client": "Maison Nord",
                "reference": "DE-002",
                "date": today,
                "due_date": today,
                "status": 2
            })),
            StatusCode::CREATED,
        )
        .await;
    let id = not_yet_due["id"].as_i64().unwrap();
    let fetched = app
        .admin(Method::GET, &format!("/api/exporte/{id}"), None, StatusCode::OK)
        .await;
    assert_eq!(fetched["status"], 2);
}

#[tokio::test]
async fn credit_lines_with_negative_quantity_are_saved_and_totalled() {
    let app = TestApp::new().await;
    let today = Utc::now().date_naive();

    let created = app
        .admin(
            Method::POST,
            "/api/invoices",
            Some(json!({
                "number": "F-2024-010",
                "issuer_name": "Atelier",
                "client_name": "Maison Nord",
                "invoice_date": today,
                "lines": [
                    { "commande": "CMD-1", "model": "Veste", "quantity": 10, "unit_price": "10" },
                    { "commande": "CMD-1", "model": "Veste", "description": "Retour", "quantity": -2, "unit_price": "4" }
                ]
            })),
            StatusCode::CREATED,
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let fetched = app
        .admin(Method::GET, &format!("/api/invoices/{id}"), None, StatusCode::OK)
        .await;
    let lines = fetched["lines"].as_array().unwrap();
    assert!(lines.iter().any(|l| l["quantity"] == -2 && decimal(&l["amount"]) == dec!(-8)));
    assert_eq!(decimal(&fetched["total_ht"]), dec!(92));
    assert_eq!(decimal(&fetched["total_ttc"]), dec!(92));
}

#[tokio::test]
async fn routes_are_gated_by_role() {
    let app = TestApp::new().await;

    let unauthenticated = app.request(Method::GET, "/api/client", None, None).await;
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send_as(Role::Coupeur, Method::GET, "/api/invoices", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send_as(Role::Chef, Method::GET, "/api/dashboard", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send_as(Role::User, Method::POST, "/api/client", Some(json!({ "name": "X" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send_as(
            Role::Coupeur,
            Method::POST,
            "/api/fiche-coupe",
            Some(json!({
                "client": "Maison Nord",
                "model": "Veste",
                "commande": "CMD-1",
                "grid": [
                    { "day": "2024-03-01", "category": "Tissu", "quantity": 12 },
                    { "day": "2024-03-02", "category": "Tissu", "quantity": 8 },
                    { "day": "2024-03-02", "category": "Doublure", "quantity": 5 }
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["produced"], 25);
    assert_eq!(body["data"]["per_category"]["Tissu"], 20);

    let (status, _) = app
        .send_as(
            Role::Coupeur,
            Method::POST,
            "/api/fiche-production",
            Some(json!({ "client": "Maison Nord", "model": "Veste", "commande": "CMD-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send_as(Role::User, Method::GET, "/api/fiche-coupe", None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send_as(Role::Admin, Method::GET, "/api/dashboard", None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cutting_sheet_cannot_exceed_the_ordered_quantity() {
    let app = TestApp::new().await;
    let (_, model_id) = seed_model(&app).await;

    let (status, body) = app
        .send_as(
            Role::Chef,
            Method::POST,
            "/api/fiche-coupe",
            Some(json!({
                "client": "Maison Nord",
                "model": "Veste",
                "commande": "CMD-1",
                "client_model_id": model_id,
                "grid": [ { "day": "2024-03-01", "category": "Tissu", "quantity": 31 } ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let sheet = app
        .admin(
            Method::POST,
            "/api/fiche-coupe",
            Some(json!({
                "client": "Maison Nord",
                "model": "Veste",
                "commande": "CMD-1",
                "client_model_id": model_id,
                "grid": [ { "day": "2024-03-01", "category": "Tissu", "quantity": 30 } ]
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(sheet["order_total"], 30);

    // The cap is per sheet: a second sheet for the same order is checked on its own grid
    let (status, _) = app
        .send_as(
            Role::Coupeur,
            Method::POST,
            "/api/fiche-coupe",
            Some(json!({
                "client": "Maison Nord",
                "model": "Veste",
                "commande": "CMD-1",
                "client_model_id": model_id,
                "grid": [ { "day": "2024-03-04", "category": "Doublure", "quantity": 30 } ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn expiring_clients_are_listed_soonest_first() {
    let app = TestApp::new().await;
    let today = Utc::now().date_naive();

    for (name, offset) in [("Later", 20), ("Soon", 3), ("Closed", -2)] {
        app.admin(
            Method::POST,
            "/api/client",
            Some(json!({
                "name": name,
                "submission_start": today - Duration::days(60),
                "submission_end": today + Duration::days(offset)
            })),
            StatusCode::CREATED,
        )
        .await;
    }

    let expiring = app
        .admin(Method::GET, "/api/client/expiring?within_days=7", None, StatusCode::OK)
        .await;
    let names: Vec<&str> = expiring
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["client"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Closed", "Soon"]);
    assert_eq!(expiring[0]["days_remaining"], -2);
}

#[tokio::test]
async fn queued_offline_operations_replay_in_order() {
    let app = TestApp::new().await;

    let report = app
        .admin(
            Method::POST,
            "/api/client/sync",
            Some(json!([
                { "op": "upsert", "data": { "name": "Offline client" } },
                { "op": "delete", "id": 9999 },
                { "op": "upsert", "data": { "email": "missing-name@example.com" } }
            ])),
            StatusCode::OK,
        )
        .await;
    assert_eq!(report["applied"], 1);
    assert_eq!(report["ignored"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["results"][0]["outcome"], "applied");
    assert_eq!(report["results"][2]["outcome"], "failed");

    let created_id = report["results"][0]["id"].as_i64().unwrap();
    let rename = app
        .admin(
            Method::POST,
            "/api/client/sync",
            Some(json!([
                { "op": "upsert", "id": created_id, "data": { "name": "Renamed offline" } }
            ])),
            StatusCode::OK,
        )
        .await;
    assert_eq!(rename["applied"], 1);

    let client = app
        .admin(Method::GET, &format!("/api/client/{created_id}"), None, StatusCode::OK)
        .await;
    assert_eq!(client["name"], "Renamed offline");
}

#[tokio::test]
async fn health_endpoints_answer_without_auth() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert_eq!(body["status"], "up");
}
