use std::time::Duration;

use splitfile_core::{Area, Msg, PaymentMode, SessionPhase};
use splitfile_driver::WorkflowSession;
use splitfile_engine::{ClientSettings, EngineConfig};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: String, download_dir: std::path::PathBuf) -> EngineConfig {
    EngineConfig {
        client: ClientSettings {
            base_url,
            ..ClientSettings::default()
        },
        download_dir,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn upload_review_export_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload-file"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "processing_id": "p1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // First poll sees "processing", every later one the terminal payload.
    Mock::given(method("GET"))
        .and(path("/api/processing-status/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "processing" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/processing-status/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed",
            "processed_data": { "references": ["A-1", "B-2"] },
            "summary": { "total_amount": 10.00, "total_transactions": 2 },
            "raw_contents": ["A", "B"],
            "separator": "|"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate-report"))
        .and(body_json(serde_json::json!({
            "processed_data": { "references": ["A-1", "B-2"] },
            "raw_contents": ["A", "B"],
            "separator": "|",
            "original_filename": "collections",
            "area": "EPR"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "content-disposition",
                    "attachment; filename=\"collections_EPR.zip\"",
                )
                .set_body_bytes(b"zip-artifact-bytes".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let download_dir = tempfile::tempdir().unwrap();
    let uri = server.uri();
    let dir = download_dir.path().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut session = WorkflowSession::new(config(uri, dir.clone()));
        session.dispatch(Msg::PaymentModeSelected(PaymentMode::Bdo));
        session.dispatch(Msg::AreaSelected(Area::Epr));
        session.dispatch(Msg::FileSelected {
            name: "collections.txt".to_string(),
            bytes: b"A|B".to_vec(),
        });

        assert!(session.pump_until(Duration::from_secs(10), |state| {
            state.phase() == SessionPhase::Completed
        }));
        let view = session.view();
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.total_transactions, 2);
        assert_eq!(view.total_amount.as_deref(), Some("₱10.00"));
        assert!(view.error.is_none());

        session.dispatch(Msg::GenerateReportClicked);
        assert!(session.pump_until(Duration::from_secs(10), |state| {
            !state.view().generating_report
        }));

        let view = session.view();
        assert!(view.error.is_none());
        assert_eq!(view.report_progress, 0);

        // Exactly one download was triggered under the server-provided name.
        let artifact = dir.join("collections_EPR.zip");
        assert!(artifact.is_file());
        assert_eq!(
            std::fs::read(&artifact).unwrap(),
            b"zip-artifact-bytes".to_vec()
        );
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
    })
    .await
    .unwrap();

    // `expect(1)` on the upload and export mocks verifies that neither was
    // ever re-issued.
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn service_reported_error_surfaces_its_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload-file"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "processing_id": "p9" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/processing-status/p9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "error": "Unrecognized record layout"
        })))
        .mount(&server)
        .await;

    let download_dir = tempfile::tempdir().unwrap();
    let uri = server.uri();
    let dir = download_dir.path().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut session = WorkflowSession::new(config(uri, dir));
        session.dispatch(Msg::PaymentModeSelected(PaymentMode::Metrobank));
        session.dispatch(Msg::AreaSelected(Area::Pwic));
        session.dispatch(Msg::FileSelected {
            name: "bad.txt".to_string(),
            bytes: b"???".to_vec(),
        });

        assert!(session.pump_until(Duration::from_secs(10), |state| {
            state.phase() == SessionPhase::Error
        }));
        assert_eq!(
            session.view().error.as_deref(),
            Some("Unrecognized record layout")
        );
    })
    .await
    .unwrap();
}
