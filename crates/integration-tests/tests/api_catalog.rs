use axum::http::{Method, StatusCode};
use integration_tests::{id_of, TestApp};
use serde_json::json;

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn category_lifecycle() {
    let app = TestApp::spawn().await;

    let (status, created) = app
        .post("/api/categories", json!({ "name": "Night Sky", "icon": "fas fa-moon" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "night-sky");
    assert_eq!(created["imageCount"], 0);

    let (status, _) = app.post("/api/categories", json!({ "name": "Night  Sky" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, by_slug) = app.get("/api/categories/night-sky").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["id"], created["id"]);

    let id = id_of(&created);
    let (status, updated) = app
        .patch(&format!("/api/categories/{id}"), json!({ "name": "Stars", "slug": "stars" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["slug"], "stars");
    assert_eq!(app.get("/api/categories/night-sky").await.0, StatusCode::NOT_FOUND);

    app.category("Abstract").await;
    let (_, list) = app.get("/api/categories").await;
    let names: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Abstract", "Stars"]);
}

#[tokio::test]
async fn category_patch_conflicts_and_missing() {
    let app = TestApp::spawn().await;
    let nature = app.category("Nature").await;
    app.category("Space").await;

    let (status, _) = app
        .patch(&format!("/api/categories/{nature}"), json!({ "slug": "space" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .patch(&format!("/api/categories/{nature}"), json!({ "name": "Space" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, unchanged) = app.get("/api/categories/nature").await;
    assert_eq!(unchanged["name"], "Nature");

    let (status, body) = app
        .patch(&format!("/api/categories/{}", uuid::Uuid::new_v4()), json!({ "name": "Ghost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn malformed_ids_and_bodies() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/images/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Image not found");

    let (status, body) = app.post("/api/images", json!({ "title": "No urls" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = app
        .send(Method::PATCH, "/api/categories/not-a-uuid", Some(json!({ "name": "x" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/images/search?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn images_are_counted_tagged_and_searchable() {
    let app = TestApp::spawn().await;
    let nature = app.category("Nature").await;

    let forest = app.image("forest", "free", Some(&nature), &["Green", " fog ", "green"]).await;
    app.image("lake", "premium", Some(&nature), &["water"]).await;
    app.image("neon", "free", None, &["neon"]).await;

    let (_, category) = app.get("/api/categories/nature").await;
    assert_eq!(category["imageCount"], 2);

    let (status, image) = app.get(&format!("/api/images/{forest}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(image["tags"], json!(["fog", "green"]));
    assert_eq!(image["type"], "free");
    assert_eq!(image["downloadCount"], 0);

    let (_, hits) = app.get("/api/images/search?q=GREEN").await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["id"], forest.as_str());

    let (_, hits) = app.get("/api/images/search?q=gre").await;
    assert!(hits.as_array().unwrap().is_empty());

    let (_, in_category) = app.get(&format!("/api/images/category/{nature}")).await;
    assert_eq!(in_category.as_array().unwrap().len(), 2);

    let (_, page) = app.get("/api/images?limit=2").await;
    let titles: Vec<_> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["neon", "lake"]);

    let (_, rest) = app.get("/api/images?limit=2&offset=2").await;
    assert_eq!(rest[0]["title"], "forest");
}

#[tokio::test]
async fn image_update_and_unknown_category() {
    let app = TestApp::spawn().await;
    let id = app.image("dunes", "free", None, &["sand"]).await;

    let (status, updated) = app
        .patch(&format!("/api/images/{id}"), json!({ "type": "premium", "tags": ["Desert"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["type"], "premium");
    assert_eq!(updated["tags"], json!(["desert"]));

    let (status, _) = app
        .post(
            "/api/images",
            json!({
                "title": "orphan",
                "categoryId": uuid::Uuid::new_v4(),
                "type": "free",
                "postimageUrl": "https://i.example/o.jpg",
                "thumbnailUrl": "https://i.example/o_t.jpg",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn featured_ranks_by_downloads() {
    let app = TestApp::spawn().await;
    let quiet = app.image("quiet", "free", None, &[]).await;
    let popular = app.image("popular", "free", None, &[]).await;

    for _ in 0..3 {
        let (status, _) = app.post(&format!("/api/images/{popular}/download"), json!({})).await;
        assert_eq!(status, StatusCode::OK);
    }
    app.post(&format!("/api/images/{quiet}/download"), json!({})).await;

    let (_, featured) = app.get("/api/images/featured").await;
    assert_eq!(featured[0]["id"], popular.as_str());
    assert_eq!(featured[0]["downloadCount"], 3);
    assert_eq!(featured[1]["id"], quiet.as_str());
}
