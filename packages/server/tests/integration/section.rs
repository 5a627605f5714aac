use crate::common::{TestApp, routes};
use serde_json::json;

#[tokio::test]
async fn section_lifecycle() {
    let app = TestApp::spawn().await;
    app.create_site("My Blog", "my-blog", "blog").await;

    let res = app
        .post(routes::SECTIONS, &json!({ "name": "Tech", "path": "tech" }), Some("my-blog"))
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["section"]["path"], "/tech/");
    let id = res.body["section"]["id"].as_str().unwrap().to_string();

    let res = app
        .post(routes::SECTIONS, &json!({ "name": "Again", "path": "/tech/" }), Some("my-blog"))
        .await;
    assert_eq!(res.status, 409, "{}", res.text);

    let res = app
        .put(
            &routes::section(&id),
            &json!({ "name": "Technology", "path": "technology", "description": "All tech" }),
            Some("my-blog"),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["section"]["path"], "/technology/");

    let res = app.delete(&routes::section(&id), Some("my-blog")).await;
    assert_eq!(res.status, 204);
    let res = app.get(&routes::section(&id), Some("my-blog")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn root_section_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    app.create_site("My Blog", "my-blog", "blog").await;

    let res = app.get(routes::SECTIONS, Some("my-blog")).await;
    let root = res.body["sections"]
        .as_array()
        .and_then(|items| items.iter().find(|s| s["path"] == "/"))
        .and_then(|s| s["id"].as_str())
        .unwrap()
        .to_string();

    let res = app.delete(&routes::section(&root), Some("my-blog")).await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn deleting_a_layout_detaches_sections() {
    let app = TestApp::spawn().await;
    app.create_site("My Blog", "my-blog", "blog").await;

    let res = app
        .post(routes::LAYOUTS, &json!({ "name": "wide", "code": "" }), Some("my-blog"))
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    let layout = res.body["layout"]["id"].as_str().unwrap().to_string();

    let res = app
        .post(routes::LAYOUTS, &json!({ "name": "  " }), Some("my-blog"))
        .await;
    assert_eq!(res.status, 400, "{}", res.text);

    let res = app
        .post(
            routes::SECTIONS,
            &json!({ "name": "Docs", "path": "docs", "layout_id": layout }),
            Some("my-blog"),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    let section = res.body["section"]["id"].as_str().unwrap().to_string();
    assert_eq!(res.body["section"]["layout_id"], layout.as_str());

    let res = app
        .put(&routes::layout(&layout), &json!({ "name": "narrow" }), Some("my-blog"))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["layout"]["name"], "narrow");

    let res = app.delete(&routes::layout(&layout), Some("my-blog")).await;
    assert_eq!(res.status, 204);
    let res = app.get(&routes::section(&section), Some("my-blog")).await;
    assert!(res.body["section"]["layout_id"].is_null());
    let res = app.get(&routes::layout(&layout), Some("my-blog")).await;
    assert_eq!(res.status, 404);
}
