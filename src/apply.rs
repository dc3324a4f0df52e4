//! Applies a reconcile plan bucket by bucket. A failing record is logged and
//! the batch keeps going; each function returns its failure count so the run
//! can report a final summary.

use log::{error, info};

use crate::config::Record;
use crate::provider::cloudflare::CloudflareClient;
use crate::provider::LiveRecord;

pub async fn create_records(client: &CloudflareClient, zone_id: &str, records: &[Record]) -> usize {
    if records.is_empty() {
        return 0;
    }

    info!("Creating {} record(s)", records.len());

    let mut failed = 0;
    for rec in records {
        match client.create_record(zone_id, rec).await {
            Ok(created) => info!(
                "Created record: [{}] {} ({})",
                rec.record_type, rec.name, created.id
            ),
            Err(e) => {
                error!("Failed to create record {}: {:#}", rec.name, e);
                failed += 1;
            }
        }
    }

    failed
}

pub async fn update_records(client: &CloudflareClient, zone_id: &str, records: &[Record]) -> usize {
    if records.is_empty() {
        return 0;
    }

    info!("Updating {} record(s)", records.len());

    let mut failed = 0;
    for rec in records {
        // Re-check the drift so a plan entry that is somehow already in sync
        // cannot trigger a redundant write.
        if !rec.needs_update() {
            continue;
        }

        let Some(live) = rec.matched_live.as_ref() else {
            continue;
        };

        match client.update_record(zone_id, &live.id, rec).await {
            Ok(()) => info!("Updated record: [{}] {}", rec.record_type, rec.name),
            Err(e) => {
                error!("Failed to update record {}: {:#}", rec.name, e);
                failed += 1;
            }
        }
    }

    failed
}

pub async fn delete_records(
    client: &CloudflareClient,
    zone_id: &str,
    records: &[LiveRecord],
) -> usize {
    if records.is_empty() {
        return 0;
    }

    info!("Deleting {} record(s)", records.len());

    let mut failed = 0;
    for rec in records {
        match client.delete_record(zone_id, &rec.id).await {
            Ok(()) => info!("Deleted record: [{}] {}", rec.record_type, rec.name),
            Err(e) => {
                error!("Failed to delete record {}: {:#}", rec.name, e);
                failed += 1;
            }
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RecordType;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn declared(name: &str, content: &str) -> Record {
        Record {
            name: name.to_string(),
            record_type: RecordType::A,
            content: content.to_string(),
            proxied: false,
            matched_live: None,
        }
    }

    fn live(id: &str, name: &str, content: &str) -> LiveRecord {
        LiveRecord {
            id: id.to_string(),
            name: name.to_string(),
            record_type: RecordType::A,
            content: content.to_string(),
            proxied: false,
        }
    }

    fn ok_body(id: &str) -> serde_json::Value {
        json!({
            "success": true,
            "errors": [],
            "result": {
                "id": id,
                "type": "A",
                "name": "www.example.com",
                "content": "1.1.1.1",
                "proxied": false,
            },
        })
    }

    fn error_body() -> serde_json::Value {
        json!({
            "success": false,
            "errors": [{ "code": 81057, "message": "Record already exists" }],
            "result": null,
        })
    }

    #[tokio::test]
    async fn a_failing_create_does_not_stop_the_batch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/zones/z1/dns_records"))
            .and(body_partial_json(json!({ "name": "bad" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(error_body()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/zones/z1/dns_records"))
            .and(body_partial_json(json!({ "name": "good" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("r-good")))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudflareClient::new("token").with_base_url(server.uri());
        let records = vec![declared("bad", "1.1.1.1"), declared("good", "2.2.2.2")];

        let failed = create_records(&client, "z1", &records).await;

        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn updates_skip_records_that_are_already_in_sync() {
        let server = MockServer::start().await;

        // No mock is mounted for r-sync: a request for it would fail the
        // test through the returned failure count.
        Mock::given(method("PUT"))
            .and(path("/zones/z1/dns_records/r-drift"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("r-drift")))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudflareClient::new("token").with_base_url(server.uri());

        let mut in_sync = declared("www", "1.1.1.1");
        in_sync.matched_live = Some(live("r-sync", "www.example.com", "1.1.1.1"));

        let mut drifted = declared("api", "2.2.2.2");
        drifted.matched_live = Some(live("r-drift", "api.example.com", "9.9.9.9"));

        let failed = update_records(&client, "z1", &[in_sync, drifted]).await;

        assert_eq!(failed, 0);
    }

    #[tokio::test]
    async fn a_failing_delete_does_not_stop_the_batch() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/zones/z1/dns_records/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(error_body()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/zones/z1/dns_records/r2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudflareClient::new("token").with_base_url(server.uri());
        let records = vec![
            live("r1", "old.example.com", "1.1.1.1"),
            live("r2", "gone.example.com", "2.2.2.2"),
        ];

        let failed = delete_records(&client, "z1", &records).await;

        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn empty_buckets_issue_no_requests() {
        let server = MockServer::start().await;
        let client = CloudflareClient::new("token").with_base_url(server.uri());

        assert_eq!(create_records(&client, "z1", &[]).await, 0);
        assert_eq!(update_records(&client, "z1", &[]).await, 0);
        assert_eq!(delete_records(&client, "z1", &[]).await, 0);

        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
