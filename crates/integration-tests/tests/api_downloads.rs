use axum::http::StatusCode;
use integration_tests::{id_of, TestApp};
use serde_json::json;

async fn make_premium(app: &TestApp, user: &str) {
    let (_, payment) = app
        .post(
            "/api/payments",
            json!({ "userId": user, "plan": "monthly", "network": "TRC20", "txid": "0x01" }),
        )
        .await;
    let (status, _) = app
        .patch(&format!("/api/payments/{}", id_of(&payment)), json!({ "status": "completed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn free_image_is_watermarked_for_free_users() {
    let app = TestApp::spawn().await;
    let image = app.image("meadow", "free", None, &[]).await;
    let user = app.user("fay").await;

    for uri in [
        format!("/api/images/{image}/download"),
        format!("/api/images/{image}/download?userId={user}"),
    ] {
        let (status, grant) = app.post(&uri, json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(grant["watermarked"], true);
        assert_eq!(grant["url"], "https://i.example/meadow.jpg");
    }

    let (_, stored) = app.get(&format!("/api/images/{image}")).await;
    assert_eq!(stored["downloadCount"], 2);
}

#[tokio::test]
async fn premium_image_requires_active_plan() {
    let app = TestApp::spawn().await;
    let image = app.image("aurora", "premium", None, &[]).await;
    let user = app.user("gus").await;
    let uri = format!("/api/images/{image}/download?userId={user}");

    let (status, body) = app.post(&uri, json!({})).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body["message"].as_str().unwrap().contains("premium"));
    let (status, _) = app.post(&format!("/api/images/{image}/download"), json!({})).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);

    make_premium(&app, &user).await;

    let (status, grant) = app.post(&uri, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grant["watermarked"], false);

    let (_, stored) = app.get(&format!("/api/images/{image}")).await;
    assert_eq!(stored["downloadCount"], 1);
}

#[tokio::test]
async fn unknown_image_or_user_is_not_found() {
    let app = TestApp::spawn().await;
    let image = app.image("reef", "free", None, &[]).await;

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app.post(&format!("/api/images/{missing}/download"), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(&format!("/api/images/{image}/download?userId=nobody"), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn metrics_track_payments_and_downloads() {
    let app = TestApp::spawn().await;
    let user = app.user("hal").await;
    let image = app.image("canyon", "premium", None, &[]).await;

    app.post(&format!("/api/images/{image}/download"), json!({})).await;
    make_premium(&app, &user).await;
    app.post(&format!("/api/images/{image}/download?userId={user}"), json!({})).await;

    let (status, text) = app.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("pixhub_payments_submitted_total 1"), "{text}");
    assert!(text.contains("pixhub_payment_reviews_total{outcome=\"Completed\"} 1"), "{text}");
    assert!(text.contains("pixhub_downloads_total{variant=\"Clean\"} 1"), "{text}");
    assert!(text.contains("pixhub_premium_denials_total 1"), "{text}");
}
