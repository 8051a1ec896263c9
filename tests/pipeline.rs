//! End-to-end runs of the export stages against a mock helpdesk API.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use hdx::client::ApiClient;
use hdx::config::Config;
use hdx::export::layout::{discover_anchors, ticket_dir};
use hdx::export::{
    ArtifactKind, ExportContext, RunOptions, export_attachments, export_children, export_tickets,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer, root: &Path, workers: usize) -> ExportContext {
    let config = Config {
        url: server.uri(),
        token: "secret".into(),
        export_folder: root.to_path_buf(),
        per_page: 100,
        download_threads: workers,
        timeout: 5,
    };
    ExportContext::from_config(&config).unwrap()
}

fn ticket(id: u64, last_activity_at: &str) -> Value {
    json!({
        "id": id,
        "created_at": "2018-06-01T12:00:00Z",
        "last_activity_at": last_activity_at,
        "subject": format!("Ticket {id}"),
        "content": { "text": "hello", "attachments": [] }
    })
}

fn write_anchor(root: &Path, ticket: &Value) {
    let id = ticket["id"].as_u64().unwrap();
    let dir = ticket_dir(root, id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("ticket.json"), ticket.to_string()).unwrap();
}

#[tokio::test]
async fn test_tickets_pages_until_server_reports_last() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    let first: Vec<Value> = (1..=100).map(|id| ticket(id, "2020-05-01T00:00:00Z")).collect();
    let second: Vec<Value> = (101..=137).map(|id| ticket(id, "2020-05-01T00:00:00Z")).collect();

    Mock::given(method("GET"))
        .and(path("/tickets"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current_page": 1, "total_pages": 2, "tickets": first
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current_page": 2, "total_pages": 2, "tickets": second
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server, temp_dir.path(), 4);
    let summary = export_tickets(&ctx, None).await.unwrap();

    assert_eq!(summary.written, 137);
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.failed_pages, 0);
    assert_eq!(discover_anchors(temp_dir.path()).unwrap().len(), 137);
    assert!(ticket_dir(temp_dir.path(), 137).join("ticket.json").exists());
}

#[tokio::test]
async fn test_first_page_failure_aborts_tickets() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let ctx = context(&server, temp_dir.path(), 2);
    assert!(export_tickets(&ctx, None).await.is_err());
}

#[tokio::test]
async fn test_stale_ticket_makes_no_request() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    write_anchor(temp_dir.path(), &ticket(42, "2019-01-01T00:00:00Z"));

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "replies": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));
    let cutoff = "2020-01-01T00:00:00Z".parse().unwrap();
    let summary = export_children(ctx, ArtifactKind::Replies, RunOptions::new(Some(cutoff), true))
        .await
        .unwrap();

    assert_eq!(summary.stale, 1);
    assert_eq!(summary.written, 0);
    assert!(!ticket_dir(temp_dir.path(), 42).join("replies.json").exists());
}

#[tokio::test]
async fn test_children_rerun_skips_unless_forced() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    for id in [1, 2, 3] {
        write_anchor(temp_dir.path(), &ticket(id, "2020-05-01T00:00:00Z"));
        Mock::given(method("GET"))
            .and(path(format!("/tickets/{id}/comments")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "comments": [{ "id": id * 10, "body": "internal note" }]
            })))
            .expect(2)
            .mount(&server)
            .await;
    }

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));

    let first = export_children(Arc::clone(&ctx), ArtifactKind::Comments, RunOptions::default())
        .await
        .unwrap();
    assert_eq!(first.written, 3);

    let again = export_children(Arc::clone(&ctx), ArtifactKind::Comments, RunOptions::default())
        .await
        .unwrap();
    assert_eq!(again.written, 0);
    assert_eq!(again.skipped, 3);

    let forced = export_children(ctx, ArtifactKind::Comments, RunOptions::new(None, true))
        .await
        .unwrap();
    assert_eq!(forced.written, 3);

    let stored: Value = serde_json::from_str(
        &fs::read_to_string(ticket_dir(temp_dir.path(), 2).join("comments.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stored, json!([{ "id": 20, "body": "internal note" }]));
}

#[tokio::test]
async fn test_malformed_anchor_does_not_stop_batch() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    write_anchor(temp_dir.path(), &ticket(7, "2020-05-01T00:00:00Z"));

    let broken = ticket_dir(temp_dir.path(), 8);
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("ticket.json"), "{ not json").unwrap();

    Mock::given(method("GET"))
        .and(path("/tickets/7/replies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "replies": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Arc::new(context(&server, temp_dir.path(), 3));
    let summary = export_children(ctx, ArtifactKind::Replies, RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(summary.failed, 1);
    assert!(ticket_dir(temp_dir.path(), 7).join("replies.json").exists());
}

fn ticket_with_attachment(server: &MockServer, id: u64) -> Value {
    let mut value = ticket(id, "2020-05-01T00:00:00Z");
    value["content"]["attachments"] = json!([{
        "filename": "a.png",
        "url": { "original": format!("{}/files/a.png", server.uri()) }
    }]);
    value
}

#[tokio::test]
async fn test_existing_attachment_is_skipped() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    write_anchor(temp_dir.path(), &ticket_with_attachment(&server, 5));

    let target = ticket_dir(temp_dir.path(), 5).join("attachments").join("a.png");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, b"old").unwrap();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));
    let summary = export_attachments(ctx, RunOptions::default()).await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.written, 0);
    assert_eq!(fs::read(&target).unwrap(), b"old");
}

#[tokio::test]
async fn test_forced_attachment_is_overwritten() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    write_anchor(temp_dir.path(), &ticket_with_attachment(&server, 5));

    let target = ticket_dir(temp_dir.path(), 5).join("attachments").join("a.png");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, b"old").unwrap();

    Mock::given(method("GET"))
        .and(path("/files/a.png"))
        .and(query_param("auth_token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));
    let summary = export_attachments(ctx, RunOptions::new(None, true))
        .await
        .unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(fs::read(&target).unwrap(), b"new");
}

#[tokio::test]
async fn test_reply_attachments_use_their_own_directory() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    write_anchor(temp_dir.path(), &ticket(9, "2020-05-01T00:00:00Z"));

    let replies = json!([
        { "id": 1, "content": { "attachments": [
            { "filename": "log.txt", "url": { "original": format!("{}/files/log.txt", server.uri()) } }
        ] } },
        { "id": 2, "content": null }
    ]);
    fs::write(
        ticket_dir(temp_dir.path(), 9).join("replies.json"),
        replies.to_string(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/files/log.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"line".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));
    let summary = export_attachments(ctx, RunOptions::default()).await.unwrap();

    assert_eq!(summary.written, 1);
    let stored = ticket_dir(temp_dir.path(), 9)
        .join("attachments_replies")
        .join("log.txt");
    assert_eq!(fs::read(stored).unwrap(), b"line");
}

#[tokio::test]
async fn test_failed_download_is_not_saved() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    write_anchor(temp_dir.path(), &ticket_with_attachment(&server, 11));

    Mock::given(method("GET"))
        .and(path("/files/a.png"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));
    let summary = export_attachments(ctx, RunOptions::default()).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert!(
        !ticket_dir(temp_dir.path(), 11)
            .join("attachments")
            .join("a.png")
            .exists()
    );
}

#[tokio::test]
async fn test_stale_ticket_skips_comments_and_attachments() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let mut stale = ticket_with_attachment(&server, 42);
    stale["last_activity_at"] = json!("2019-01-01T00:00:00Z");
    write_anchor(temp_dir.path(), &stale);

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "comments": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));
    let cutoff = "2020-01-01T00:00:00Z".parse().unwrap();
    let options = RunOptions::new(Some(cutoff), false);

    let comments = export_children(Arc::clone(&ctx), ArtifactKind::Comments, options)
        .await
        .unwrap();
    assert_eq!(comments.stale, 1);
    assert_eq!(comments.written, 0);

    let attachments = export_attachments(ctx, options).await.unwrap();
    assert_eq!(attachments.stale_tickets, 1);
    assert_eq!(attachments.written, 0);
    assert_eq!(attachments.skipped, 0);

    let dir = ticket_dir(temp_dir.path(), 42);
    assert!(!dir.join("comments.json").exists());
    assert!(!dir.join("attachments").exists());
}

#[tokio::test]
async fn test_failed_replies_leave_comments_written() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    write_anchor(temp_dir.path(), &ticket(13, "2020-05-01T00:00:00Z"));

    Mock::given(method("GET"))
        .and(path("/tickets/13/replies"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tickets/13/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comments": [{ "id": 1 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));

    let replies = export_children(Arc::clone(&ctx), ArtifactKind::Replies, RunOptions::default())
        .await
        .unwrap();
    assert_eq!(replies.failed, 1);
    assert_eq!(replies.written, 0);

    let comments = export_children(ctx, ArtifactKind::Comments, RunOptions::default())
        .await
        .unwrap();
    assert_eq!(comments.written, 1);

    let dir = ticket_dir(temp_dir.path(), 13);
    assert!(!dir.join("replies.json").exists());
    assert!(dir.join("comments.json").exists());
}

#[tokio::test]
async fn test_attachment_rerun_is_all_skipped_with_tmp_named_files() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    let mut value = ticket(21, "2020-05-01T00:00:00Z");
    value["content"]["attachments"] = json!([
        { "filename": "report.tmp", "url": { "original": format!("{}/files/1", server.uri()) } },
        { "filename": "report", "url": { "original": format!("{}/files/2", server.uri()) } },
        { "filename": "a.png", "url": { "original": format!("{}/files/3", server.uri()) } },
        { "filename": "a.png", "url": { "original": format!("{}/files/4", server.uri()) } },
        { "filename": "a (1).png", "url": { "original": format!("{}/files/5", server.uri()) } }
    ]);
    write_anchor(temp_dir.path(), &value);

    for n in 1..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/files/{n}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(format!("body {n}").into_bytes()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let ctx = Arc::new(context(&server, temp_dir.path(), 2));

    let first = export_attachments(Arc::clone(&ctx), RunOptions::default())
        .await
        .unwrap();
    assert_eq!(first.written, 5);

    let dir = ticket_dir(temp_dir.path(), 21).join("attachments");
    let mut stored: Vec<String> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    stored.sort();
    assert_eq!(
        stored,
        vec!["a (1).png", "a (2).png", "a.png", "report", "report.tmp"]
    );
    assert_eq!(fs::read(dir.join("report.tmp")).unwrap(), b"body 1");
    assert_eq!(fs::read(dir.join("a (1).png")).unwrap(), b"body 5");

    let second = export_attachments(ctx, RunOptions::default()).await.unwrap();
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped, 5);
}
