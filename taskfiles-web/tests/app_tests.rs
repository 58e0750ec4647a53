/// Frontend router tests
///
/// Each test drives a frontend router in-process while its API client talks
/// to the mock API over a real socket.

mod common;

use axum::http::{header, StatusCode};
use common::{body_text, location, spawn_mock_api, web_app, Browser};
use taskfiles_web::config::Frontend;

#[tokio::test]
async fn test_pages_redirect_to_login_when_signed_out() {
    let (base_url, _api) = spawn_mock_api().await;

    for (frontend, pages) in [
        (Frontend::Tasks, ["/", "/tasks"]),
        (Frontend::Files, ["/", "/files"]),
    ] {
        let mut browser = Browser::new(web_app(frontend, &base_url));
        for page in pages {
            let response = browser.get(page).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", page);
            assert_eq!(location(&response), "/account/login");
        }
    }

    let mut browser = Browser::new(web_app(Frontend::Tasks, &base_url));
    let response = browser.post_form("/tasks/create", "title=sneaky").await;
    assert_eq!(location(&response), "/account/login");
}

#[tokio::test]
async fn test_login_page_renders() {
    let (base_url, _api) = spawn_mock_api().await;
    let mut browser = Browser::new(web_app(Frontend::Files, &base_url));

    let response = browser.get("/account/login").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("action=\"/account/login\""));
    assert!(html.contains("<title>Files</title>"));
}

#[tokio::test]
async fn test_login_validation_and_bad_credentials() {
    let (base_url, _api) = spawn_mock_api().await;
    let mut browser = Browser::new(web_app(Frontend::Tasks, &base_url));

    let response = browser.post_form("/account/login", "username=&password=").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Username and password are required"));

    let response = browser
        .post_form("/account/login", "username=user&password=nope")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Invalid username or password"));
    assert!(html.contains("value=\"user\""));

    let response = browser.get("/").await;
    assert_eq!(location(&response), "/account/login");
}

#[tokio::test]
async fn test_sign_in_shows_tasks_and_flash() {
    let (base_url, api) = spawn_mock_api().await;
    api.add_task("Water the plants");
    let mut browser = Browser::new(web_app(Frontend::Tasks, &base_url));

    browser.sign_in().await;

    let response = browser.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Welcome, user"));
    assert!(html.contains("Water the plants"));

    // Flash messages are shown once
    let html = body_text(browser.get("/tasks").await).await;
    assert!(!html.contains("Welcome, user"));

    // Already signed in
    let response = browser.get("/account/login").await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_task_forms() {
    let (base_url, api) = spawn_mock_api().await;
    let mut browser = Browser::new(web_app(Frontend::Tasks, &base_url));
    browser.sign_in().await;

    let response = browser
        .post_form("/tasks/create", "title=Buy+milk&description=2+litres")
        .await;
    assert_eq!(location(&response), "/tasks");
    let id = api.data().tasks[0].id;
    assert_eq!(api.data().tasks[0].description.as_deref(), Some("2 litres"));

    let response = browser.post_form(&format!("/tasks/{}/toggle", id), "").await;
    assert_eq!(location(&response), "/tasks");
    assert!(api.data().tasks[0].is_completed);
    assert!(body_text(browser.get("/tasks").await).await.contains("Task completed"));

    let response = browser
        .post_form(&format!("/tasks/{}/update", id), "title=Buy+oat+milk&description=")
        .await;
    assert_eq!(location(&response), "/tasks");
    {
        let data = api.data();
        assert_eq!(data.tasks[0].title, "Buy oat milk");
        assert_eq!(data.tasks[0].description, None);
        assert!(!data.tasks[0].is_completed);
    }

    browser.post_form("/tasks/create", "title=++").await;
    assert!(body_text(browser.get("/tasks").await).await.contains("Title is required"));
    assert_eq!(api.data().tasks.len(), 1);

    browser.post_form(&format!("/tasks/{}/delete", id), "").await;
    assert!(api.data().tasks.is_empty());

    browser.post_form(&format!("/tasks/{}/delete", id), "").await;
    assert!(body_text(browser.get("/tasks").await).await.contains("Task not found"));
}

#[tokio::test]
async fn test_rejected_token_signs_out() {
    let (base_url, api) = spawn_mock_api().await;
    let mut browser = Browser::new(web_app(Frontend::Tasks, &base_url));
    browser.sign_in().await;

    api.data().revoked = true;

    let response = browser.get("/tasks").await;
    assert_eq!(location(&response), "/account/login");

    let html = body_text(browser.get("/account/login").await).await;
    assert!(html.contains("Your session has expired"));

    api.data().revoked = false;
    let response = browser.get("/tasks").await;
    assert_eq!(location(&response), "/account/login");
}

#[tokio::test]
async fn test_logout() {
    let (base_url, _api) = spawn_mock_api().await;
    let mut browser = Browser::new(web_app(Frontend::Files, &base_url));
    browser.sign_in().await;

    let response = browser.post_form("/account/logout", "").await;
    assert_eq!(location(&response), "/account/login");

    let response = browser.get("/files").await;
    assert_eq!(location(&response), "/account/login");
}

#[tokio::test]
async fn test_file_upload_download_delete() {
    let (base_url, api) = spawn_mock_api().await;
    let mut browser = Browser::new(web_app(Frontend::Files, &base_url));
    browser.sign_in().await;

    let response = browser
        .post_file("/files/upload", "report.csv", "text/csv", b"a,b\n1,2\n")
        .await;
    assert_eq!(location(&response), "/files");
    let id = api.data().files[0].0.id;

    let html = body_text(browser.get("/files").await).await;
    assert!(html.contains("Uploaded &quot;report.csv&quot;"));
    assert!(html.contains(&format!("/files/{}/download", id)));

    let response = browser.get(&format!("/files/{}/download", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.csv\""
    );
    assert_eq!(body_text(response).await, "a,b\n1,2\n");

    let response = browser.post_form(&format!("/files/{}/delete", id), "").await;
    assert_eq!(location(&response), "/files");
    assert!(api.data().files.is_empty());

    let response = browser.get(&format!("/files/{}/download", id)).await;
    assert_eq!(location(&response), "/files");
    assert!(body_text(browser.get("/files").await).await.contains("File not found"));
}

#[tokio::test]
async fn test_download_keeps_non_ascii_file_name() {
    let (base_url, api) = spawn_mock_api().await;
    let id = api.add_file("résumé.pdf", "application/pdf", b"%PDF");
    let mut browser = Browser::new(web_app(Frontend::Files, &base_url));
    browser.sign_in().await;

    let response = browser.get(&format!("/files/{}/download", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].as_bytes(),
        "attachment; filename=\"résumé.pdf\"".as_bytes()
    );
    assert_eq!(body_text(response).await, "%PDF");
}

#[tokio::test]
async fn test_empty_upload_is_rejected() {
    let (base_url, api) = spawn_mock_api().await;
    let mut browser = Browser::new(web_app(Frontend::Files, &base_url));
    browser.sign_in().await;

    let response = browser.post_file("/files/upload", "", "application/octet-stream", b"").await;
    assert_eq!(location(&response), "/files");
    assert!(api.data().files.is_empty());

    let html = body_text(browser.get("/files").await).await;
    assert!(html.contains("Please choose a file to upload"));
}
