//! Integration tests for job submission against a stub service.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use bytes::Bytes;
use chunkycloud_client::submit::{Navigator, SubmissionAssembler, SubmitError, SubmitOutcome};
use chunkycloud_client::views::CreateJobView;
use chunkycloud_core::assets::{AssetRequirements, SceneAssetBundle, SceneFile};
use chunkycloud_core::types::JobId;
use common::{eventually, spawn_stub, unreachable_api, Reply};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Records every navigation request.
#[derive(Default)]
struct RecordingNavigator {
    visited: Mutex<Vec<JobId>>,
}

impl RecordingNavigator {
    fn visited(&self) -> Vec<JobId> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to_job(&self, id: &JobId) {
        self.visited.lock().unwrap().push(id.clone());
    }
}

fn file(name: &str, content: &'static [u8]) -> SceneFile {
    SceneFile::in_memory(name, Bytes::from_static(content))
}

fn complete_bundle() -> SceneAssetBundle {
    SceneAssetBundle {
        description: Some(file("castle.json", br#"{"emitterSamplingStrategy":"SIMPLE"}"#)),
        octree: Some(file("castle.octree2", b"octree-bytes")),
        emitter_grid: Some(file("castle.emittergrid", b"grid-bytes")),
        skymap: Some(file("dusk.png", b"png-bytes")),
        resource_pack: None,
        target_spp: 250,
    }
}

const GRID_ONLY: AssetRequirements = AssetRequirements {
    emitter_grid: true,
    skymap: false,
};

// ---------------------------------------------------------------------------
// Test: 201 navigates to the new job
// ---------------------------------------------------------------------------

/// The form carries exactly the required parts, in order, with file names,
/// and the API key travels in the `X-Api-Key` header.
#[tokio::test]
async fn created_job_navigates_and_sends_expected_form() {
    let (stub, api) = spawn_stub().await;
    let assembler = SubmissionAssembler::new(api);
    let navigator = RecordingNavigator::default();

    let outcome = assembler
        .submit(&complete_bundle(), GRID_ONLY, "secret-key", &navigator)
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Created(JobId::new("new-job")));
    assert_eq!(navigator.visited(), [JobId::new("new-job")]);
    assert!(!assembler.is_in_flight());

    let submissions = stub.submissions();
    assert_eq!(submissions.len(), 1);
    let received = &submissions[0];
    assert_eq!(received.api_key.as_deref(), Some("secret-key"));
    // skymap is not required and the default pack sends no texturepack
    assert_eq!(received.names(), ["scene", "octree", "emittergrid", "targetSpp"]);
    assert_eq!(
        received.part("octree").and_then(|p| p.file_name.as_deref()),
        Some("castle.octree2")
    );
    assert_eq!(received.part("emittergrid").unwrap().content, b"grid-bytes");
    assert_eq!(received.text("targetSpp").as_deref(), Some("250"));
}

#[tokio::test]
async fn chosen_resource_pack_is_sent() {
    let (stub, api) = spawn_stub().await;
    let assembler = SubmissionAssembler::new(api);

    let mut bundle = complete_bundle();
    bundle.resource_pack = Some("faithful-1.16.4".into());
    assembler
        .submit(&bundle, AssetRequirements::default(), "key", &RecordingNavigator::default())
        .await
        .unwrap();

    let received = &stub.submissions()[0];
    assert_eq!(received.names(), ["scene", "octree", "targetSpp", "texturepack"]);
    assert_eq!(received.text("texturepack").as_deref(), Some("faithful-1.16.4"));
}

// ---------------------------------------------------------------------------
// Test: failures surface and release the in-flight flag
// ---------------------------------------------------------------------------

/// Any non-201 status is a rejection carrying the raw body text.
#[tokio::test]
async fn rejection_carries_raw_body() {
    let (stub, api) = spawn_stub().await;
    stub.set_create(Reply::new(StatusCode::BAD_REQUEST, "Invalid scene description"));
    let assembler = SubmissionAssembler::new(api);
    let navigator = RecordingNavigator::default();

    let result = assembler
        .submit(&complete_bundle(), GRID_ONLY, "key", &navigator)
        .await;

    assert_matches!(
        result,
        Err(SubmitError::Rejected { status: 400, ref body }) if body == "Invalid scene description"
    );
    assert!(navigator.visited().is_empty());
    assert!(!assembler.is_in_flight());
}

/// A 200 is not a creation either.
#[tokio::test]
async fn ok_instead_of_created_is_rejected() {
    let (stub, api) = spawn_stub().await;
    stub.set_create(Reply::ok(r#"{"_id": "x"}"#));
    let assembler = SubmissionAssembler::new(api);

    let result = assembler
        .submit(&complete_bundle(), GRID_ONLY, "key", &RecordingNavigator::default())
        .await;
    assert_matches!(result, Err(SubmitError::Rejected { status: 200, .. }));
}

#[tokio::test]
async fn created_without_id_is_reported() {
    let (stub, api) = spawn_stub().await;
    stub.set_create(Reply::new(StatusCode::CREATED, "{}"));
    let assembler = SubmissionAssembler::new(api);
    let navigator = RecordingNavigator::default();

    let result = assembler
        .submit(&complete_bundle(), GRID_ONLY, "key", &navigator)
        .await;
    assert_matches!(result, Err(SubmitError::MissingJobId));
    assert!(navigator.visited().is_empty());
}

#[tokio::test]
async fn transport_error_releases_flag() {
    let assembler = SubmissionAssembler::new(unreachable_api().await);

    let result = assembler
        .submit(&complete_bundle(), GRID_ONLY, "key", &RecordingNavigator::default())
        .await;
    assert_matches!(result, Err(SubmitError::Transport(_)));
    assert!(!assembler.is_in_flight());
}

// ---------------------------------------------------------------------------
// Test: single flight
// ---------------------------------------------------------------------------

/// A second submit while the first is outstanding sends nothing.
#[tokio::test]
async fn concurrent_submit_is_ignored() {
    let (stub, api) = spawn_stub().await;
    *stub.create_delay.lock().unwrap() = Duration::from_millis(300);
    let assembler = Arc::new(SubmissionAssembler::new(api));
    let navigator = Arc::new(RecordingNavigator::default());

    let first = tokio::spawn({
        let assembler = Arc::clone(&assembler);
        let navigator = Arc::clone(&navigator);
        async move {
            assembler
                .submit(&complete_bundle(), GRID_ONLY, "key", navigator.as_ref())
                .await
        }
    });

    eventually(|| stub.submissions().len() == 1).await;
    assert!(assembler.is_in_flight());

    let second = assembler
        .submit(&complete_bundle(), GRID_ONLY, "key", navigator.as_ref())
        .await
        .unwrap();
    assert_eq!(second, SubmitOutcome::AlreadyInFlight);

    let first = first.await.unwrap().unwrap();
    assert_eq!(first, SubmitOutcome::Created(JobId::new("new-job")));
    assert_eq!(stub.submissions().len(), 1);
    assert_eq!(navigator.visited().len(), 1);
    assert!(!assembler.is_in_flight());
}

// ---------------------------------------------------------------------------
// Test: end to end through the creation view
// ---------------------------------------------------------------------------

/// Dropping a scene directory from disk and submitting consumes the bundle.
#[tokio::test]
async fn create_view_submits_dropped_directory() {
    let (stub, api) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let scene = dir.path().join("castle");
    std::fs::create_dir(&scene).unwrap();
    let description = r#"{"emitterSamplingStrategy": "NONE"}"#;
    std::fs::write(scene.join("castle.json"), description).unwrap();
    std::fs::write(scene.join("castle.octree2"), b"octree-bytes").unwrap();
    std::fs::write(scene.join("castle.emittergrid"), b"unused").unwrap();

    let mut view = CreateJobView::new(api, &mut StdRng::seed_from_u64(3));
    view.set_api_key("key");
    view.load_resource_packs().await.unwrap();
    view.select_resource_pack(Some("Sphax PureBDcraft")).unwrap();
    view.drag_enter();
    view.drop_paths(&[scene]).await.unwrap();
    assert!(!view.is_drag_active());
    assert!(view.matcher().is_complete());

    let navigator = RecordingNavigator::default();
    let outcome = view.submit(&navigator).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Created(JobId::new("new-job")));
    assert!(view.last_error().is_none());
    assert!(view.matcher().bundle().description.is_none());
    assert_eq!(view.matcher().bundle().resource_pack.as_deref(), Some("sphax-1.16"));

    let received = &stub.submissions()[0];
    assert_eq!(received.names(), ["scene", "octree", "targetSpp", "texturepack"]);
    let scene_part = received.part("scene").unwrap();
    assert_eq!(scene_part.file_name.as_deref(), Some("castle.json"));
    assert_eq!(scene_part.content, description.as_bytes());
    let octree_part = received.part("octree").unwrap();
    assert_eq!(octree_part.file_name.as_deref(), Some("castle.octree2"));
    assert_eq!(octree_part.content, b"octree-bytes");
    assert_eq!(received.text("targetSpp").as_deref(), Some("500"));
    assert_eq!(received.text("texturepack").as_deref(), Some("sphax-1.16"));
}

/// A rejected submission keeps the bundle and shows the server's message.
#[tokio::test]
async fn create_view_keeps_bundle_on_rejection() {
    let (stub, api) = spawn_stub().await;
    stub.set_create(Reply::new(StatusCode::UNAUTHORIZED, "Invalid API key"));

    let mut view = CreateJobView::new(api, &mut StdRng::seed_from_u64(3));
    view.set_api_key("wrong");
    view.drop_entries(vec![
        chunkycloud_core::assets::DroppedEntry::File(file("a.json", b"{}")),
        chunkycloud_core::assets::DroppedEntry::File(file("a.octree2", b"o")),
    ])
    .await;

    let result = view.submit(&RecordingNavigator::default()).await;
    assert_matches!(result, Err(SubmitError::Rejected { status: 401, .. }));
    assert_eq!(view.last_error(), Some("Invalid API key"));
    assert!(view.matcher().bundle().description.is_some());
}
