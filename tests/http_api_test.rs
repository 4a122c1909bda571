// 端到端接口测试：在 127.0.0.1 随机端口启动完整路由，用 reqwest 发请求。

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use card_backend::config::AppConfig;
use card_backend::http::{self, AppState};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

fn unique_temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock error")
        .as_nanos();
    let seq = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("card-backend-http-test-{nanos}-{seq}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

struct TestServer {
    base: String,
    root: PathBuf,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with_limit(16 * 1024 * 1024).await
    }

    async fn start_with_limit(max_content_length: usize) -> Self {
        let root = unique_temp_dir();
        let page_path = root.join("card.html");
        std::fs::write(&page_path, "<html><body>card</body></html>").expect("write page");

        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            upload_dir: root.join("uploads"),
            music_dir: root.join("uploads").join("music"),
            page_path,
            max_content_length,
        };

        let state = AppState::from_config(&config).expect("build state");
        let app = http::router(state, config.max_content_length);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server failed");
        let addr = listener.local_addr().expect("read local addr failed");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server crashed");
        });

        Self {
            base: format!("http://{addr}"),
            root,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn upload_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    async fn upload(&self, path: &str, field: &str, file_name: &str, bytes: Vec<u8>) -> reqwest::Response {
        let form = Form::new().part(field.to_string(), Part::bytes(bytes).file_name(file_name.to_string()));
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8])
    });
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("encode test image");
    buffer
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("read dir")
        .flatten()
        .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
        .count()
}

#[tokio::test]
async fn photo_upload_is_fitted_and_served_back() {
    let server = TestServer::start().await;

    let response = server
        .upload("/api/upload_photo", "photo", "my photo.png", encode_image(500, 500, ImageFormat::Png))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["success"], json!(true));
    let filename = body["filename"].as_str().expect("filename").to_string();
    assert!(filename.ends_with("_my_photo.png"), "{filename}");
    assert_eq!(body["url"], json!(format!("/uploads/{filename}")));

    let served = server
        .client
        .get(server.url(&format!("/uploads/{filename}")))
        .send()
        .await
        .expect("fetch upload");
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()["content-type"], "image/png");

    let bytes = served.bytes().await.expect("read body");
    let decoded = image::load_from_memory(&bytes).expect("decode fitted image");
    assert_eq!(decoded.dimensions(), (800, 450));

    let rgb = decoded.to_rgb8();
    assert_eq!(rgb.get_pixel(0, 225), &Rgb([245, 245, 245]));
    assert_eq!(rgb.get_pixel(799, 225), &Rgb([245, 245, 245]));
}

#[tokio::test]
async fn jpeg_upload_stays_jpeg() {
    let server = TestServer::start().await;

    let response = server
        .upload("/api/upload_photo", "photo", "wide.JPG", encode_image(1920, 1080, ImageFormat::Jpeg))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json body");
    let filename = body["filename"].as_str().expect("filename");

    let stored = std::fs::read(server.upload_dir().join(filename)).expect("stored file");
    assert_eq!(image::guess_format(&stored).expect("guess format"), ImageFormat::Jpeg);
    let decoded = image::load_from_memory(&stored).expect("decode stored");
    assert_eq!(decoded.dimensions(), (800, 450));
}

#[tokio::test]
async fn photo_validation_errors_are_400_json() {
    let server = TestServer::start().await;

    let response = server
        .upload("/api/upload_photo", "image", "a.png", encode_image(10, 10, ImageFormat::Png))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "success": false, "message": "没有上传文件" }));

    let response = server
        .upload("/api/upload_photo", "photo", "", encode_image(10, 10, ImageFormat::Png))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["message"], json!("没有选择文件"));

    let response = server
        .upload("/api/upload_photo", "photo", "notes.txt", b"hello".to_vec())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["success"], json!(false));

    let response = server
        .client
        .post(server.url("/api/upload_photo"))
        .body("plain body")
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(file_count(&server.upload_dir()), 0);
}

#[tokio::test]
async fn corrupt_image_is_500_and_leaves_no_file() {
    let server = TestServer::start().await;

    let mut png = encode_image(300, 300, ImageFormat::Png);
    png.truncate(png.len() / 2);

    let response = server.upload("/api/upload_photo", "photo", "broken.png", png).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().expect("message").starts_with("上传失败"));

    let response = server
        .upload("/api/upload_photo", "photo", "fake.gif", b"GIF? no, text".to_vec())
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(file_count(&server.upload_dir()), 0);
}

#[tokio::test]
async fn music_upload_is_stored_byte_for_byte() {
    let server = TestServer::start().await;
    let audio: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 256) as u8).collect();

    let response = server
        .upload("/api/upload_music", "music", "birthday song.mp3", audio.clone())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("json body");
    let filename = body["filename"].as_str().expect("filename");
    assert!(filename.ends_with("_birthday_song.mp3"));
    assert_eq!(body["url"], json!(format!("/music/{filename}")));

    let served = server
        .client
        .get(server.url(&format!("/music/{filename}")))
        .send()
        .await
        .expect("fetch music");
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.expect("read body").to_vec(), audio);

    let response = server
        .upload("/api/upload_music", "music", "song.png", audio)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .upload("/api/upload_music", "photo", "song.mp3", b"abc".to_vec())
        .await;
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["message"], json!("没有上传音乐文件"));
}

#[tokio::test]
async fn card_save_and_load_roundtrip() {
    let server = TestServer::start().await;
    let card = json!({ "title": "生日快乐", "photo": "/uploads/x.png", "music": null });

    let response = server
        .client
        .post(server.url("/api/save_card"))
        .json(&card)
        .send()
        .await
        .expect("save card");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("卡片保存成功"));
    let card_id = body["card_id"].as_str().expect("card id");

    let response = server
        .client
        .get(server.url(&format!("/api/cards/{card_id}")))
        .send()
        .await
        .expect("load card");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "success": true, "data": card }));

    let stored = server.upload_dir().join(format!("card_{card_id}.json"));
    assert!(stored.is_file());
}

#[tokio::test]
async fn card_errors_are_json() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/api/cards/00000000-0000-4000-8000-000000000000"))
        .send()
        .await
        .expect("load card");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "success": false, "message": "找不到卡片" }));

    let response = server
        .client
        .post(server.url("/api/save_card"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .expect("save card");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn static_routes_and_cors() {
    let server = TestServer::start().await;

    for path in ["/", "/card.html"] {
        let response = server.client.get(server.url(path)).send().await.expect("page");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(response.text().await.expect("text").contains("card"));
    }

    let response = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/api/save_card"))
        .send()
        .await
        .expect("preflight");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()["access-control-allow-methods"],
        "GET,PUT,POST,DELETE,OPTIONS"
    );
    assert_eq!(
        response.headers()["access-control-allow-headers"],
        "Content-Type,Authorization"
    );

    let response = server
        .client
        .get(server.url("/uploads/missing.png"))
        .send()
        .await
        .expect("missing upload");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.client.get(server.url("/api/health")).send().await.expect("health");
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn oversized_body_is_rejected_with_413() {
    let server = TestServer::start_with_limit(1024).await;

    let response = server
        .upload("/api/upload_music", "music", "big.mp3", vec![7u8; 8 * 1024])
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert_eq!(file_count(&server.root.join("uploads").join("music")), 0);
}
