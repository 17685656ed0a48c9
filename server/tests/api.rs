use std::fs;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use topgoal::{AppState, router};
use topgoal_library::{CoverResolver, Library, LibraryScanner, ScannerConfig};
use topgoal_storage::StatsStore;
use tower::ServiceExt;

const SONG_LEN: usize = 1000;
const COVER_JPG: &[u8] = b"\xff\xd8\xff\xe0 not really a jpeg";

/// Bytes that no tag parser will mistake for a real container.
fn song_bytes() -> Vec<u8> {
    (0..SONG_LEN).map(|i| (i % 200) as u8).collect()
}

struct TestApp {
    _music: TempDir,
    app: Router,
}

impl TestApp {
    /// Library layout:
    /// `Artist/Album/song.mp3` (with `cover.jpg`) and `Loose/b.ogg`.
    async fn new() -> Self {
        let music = tempfile::tempdir().unwrap();
        let album = music.path().join("Artist").join("Album");
        let loose = music.path().join("Loose");
        fs::create_dir_all(&album).unwrap();
        fs::create_dir_all(&loose).unwrap();
        fs::write(album.join("song.mp3"), song_bytes()).unwrap();
        fs::write(album.join("cover.jpg"), COVER_JPG).unwrap();
        fs::write(loose.join("b.ogg"), b"tiny").unwrap();
        fs::write(loose.join("notes.txt"), b"ignored").unwrap();

        let state = AppState::new(
            Library::new(music.path(), LibraryScanner::new(ScannerConfig::default())),
            StatsStore::in_memory().unwrap(),
            CoverResolver::new(),
        );
        let app = TestApp {
            _music: music,
            app: router(state),
        };

        let scan = app.post("/api/library/scan", None).await;
        assert_eq!(scan.status(), StatusCode::OK);
        assert_eq!(json_body(scan).await, json!({ "message": "Scan completed", "tracks": 2 }));
        app
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, payload: Option<Value>) -> Response {
        let request = match payload {
            Some(payload) => Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
            None => Request::post(uri).body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn library(&self) -> Vec<Value> {
        let response = self.get("/api/library").await;
        assert_eq!(response.status(), StatusCode::OK);
        match json_body(response).await {
            Value::Array(tracks) => tracks,
            other => panic!("expected an array, got {other}"),
        }
    }

    async fn id_of(&self, title: &str) -> String {
        self.library()
            .await
            .into_iter()
            .find(|t| t["title"] == title)
            .and_then(|t| t["id"].as_str().map(str::to_owned))
            .unwrap()
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
    response.headers()[name].to_str().unwrap()
}

#[tokio::test]
async fn library_lists_tracks_sorted_with_fallbacks() {
    let app = TestApp::new().await;
    let tracks = app.library().await;

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0]["title"], "song");
    assert_eq!(tracks[0]["album"], "Album");
    assert_eq!(tracks[0]["artist"], "Unknown Artist");
    assert_eq!(tracks[0]["has_cover"], true);
    assert_eq!(tracks[0]["play_count"], 0);
    assert_eq!(tracks[1]["title"], "b");
    assert_eq!(tracks[1]["album"], "Loose");
    assert_eq!(tracks[1]["has_cover"], false);

    for track in &tracks {
        assert_eq!(track["id"].as_str().unwrap().len(), 64);
        assert!(track.get("path").is_none());
    }
}

#[tokio::test]
async fn stream_without_range_sends_whole_file_as_partial_content() {
    let app = TestApp::new().await;
    let id = app.id_of("song").await;

    let response = app.get(&format!("/api/stream/{id}")).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 0-999/1000");
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "1000");
    assert_eq!(header_str(&response, header::ACCEPT_RANGES), "bytes");
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "audio/mpeg");
    assert_eq!(body_bytes(response).await, song_bytes());
}

#[tokio::test]
async fn stream_honours_byte_range() {
    let app = TestApp::new().await;
    let id = app.id_of("song").await;

    let request = Request::get(format!("/api/stream/{id}"))
        .header(header::RANGE, "bytes=100-199")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 100-199/1000");
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "100");
    assert_eq!(body_bytes(response).await, &song_bytes()[100..200]);
}

#[tokio::test]
async fn stream_range_past_end_is_not_satisfiable() {
    let app = TestApp::new().await;
    let id = app.id_of("song").await;

    let request = Request::get(format!("/api/stream/{id}"))
        .header(header::RANGE, "bytes=5000-")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes */1000");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = TestApp::new().await;
    let unknown = "0".repeat(64);

    for uri in [
        format!("/api/stream/{unknown}"),
        "/api/stream/not-a-track".to_string(),
        format!("/api/cover/{unknown}"),
    ] {
        let response = app.get(&uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(response.headers().get(header::CONTENT_RANGE).is_none());
        assert_eq!(json_body(response).await, json!({ "detail": "Track not found" }));
    }

    let response = app.post(&format!("/api/track/{unknown}/play"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cover_uses_folder_image_then_placeholder() {
    let app = TestApp::new().await;

    let response = app.get(&format!("/api/cover/{}", app.id_of("song").await)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/jpeg");
    assert_eq!(body_bytes(response).await, COVER_JPG);

    let response = app.get(&format!("/api/cover/{}", app.id_of("b").await)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/png");
    assert!(body_bytes(response).await.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[tokio::test]
async fn play_and_finish_counters_show_up_in_listing() {
    let app = TestApp::new().await;
    let id = app.id_of("b").await;

    for expected in 1..=2 {
        let response = app.post(&format!("/api/track/{id}/play"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["play_count"], expected);
    }
    let response = app.post(&format!("/api/track/{id}/finish"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "ok", "play_count": 2, "finish_count": 1 })
    );

    let track = app.library().await.into_iter().find(|t| t["id"] == id.as_str()).unwrap();
    assert_eq!(track["play_count"], 2);
    assert_eq!(track["finish_count"], 1);
}

#[tokio::test]
async fn comments_round_trip_newest_first() {
    let app = TestApp::new().await;

    let blank = app
        .post("/api/comments", Some(json!({ "nickname": "  ", "content": "hello" })))
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(blank).await["detail"].is_string());

    for (nickname, content) in [("ana", "first"), ("bo", "second")] {
        let response = app
            .post("/api/comments", Some(json!({ "nickname": nickname, "content": content })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let stored = json_body(response).await;
        assert_eq!(stored["nickname"], nickname);
        assert!(stored["created_at"].is_string());
    }

    let response = app.get("/api/comments").await;
    assert_eq!(response.status(), StatusCode::OK);
    let comments = json_body(response).await;
    assert_eq!(comments[0]["content"], "second");
    assert_eq!(comments[1]["content"], "first");
}

#[tokio::test]
async fn scanning_a_missing_directory_fails_and_keeps_serving() {
    let music = tempfile::tempdir().unwrap();
    let gone = music.path().join("gone");
    let app = router(AppState::new(
        Library::new(gone, LibraryScanner::new(ScannerConfig::default())),
        StatsStore::in_memory().unwrap(),
        CoverResolver::new(),
    ));

    let response = app
        .clone()
        .oneshot(Request::post("/api/library/scan").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .oneshot(Request::get("/api/library").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}
