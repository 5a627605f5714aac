use crate::common::{TestApp, routes};
use serde_json::json;

mod search {
    use super::*;

    #[tokio::test]
    async fn matches_heading_and_paginates() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app.get(routes::CONTENTS, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 2);
        assert_eq!(res.body["pagination"]["per_page"], 20);

        let res = app
            .get(&format!("{}?q=about", routes::CONTENTS), Some("my-blog"))
            .await;
        let contents = res.body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["heading"], "About");

        let res = app
            .get(&format!("{}?page=2&per_page=1", routes::CONTENTS), Some("my-blog"))
            .await;
        assert_eq!(res.body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
    }
}

mod tagging {
    use super::*;

    #[tokio::test]
    async fn add_list_and_remove_a_tag() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let content = app.content_id("my-blog", "About").await;
        let path = routes::content_tags(&content);

        let res = app.post(&path, &json!({ "name": "rust" }), Some("my-blog")).await;
        assert_eq!(res.status, 201, "{}", res.text);
        let tag_id = res.body["tag"]["id"].as_str().unwrap().to_string();

        // Linking twice is harmless.
        let res = app.post(&path, &json!({ "name": "rust" }), Some("my-blog")).await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["tag"]["id"], tag_id.as_str());

        let res = app.get(&path, Some("my-blog")).await;
        assert_eq!(res.body["tags"].as_array().unwrap().len(), 1);

        let res = app
            .delete(&format!("{path}/{tag_id}"), Some("my-blog"))
            .await;
        assert_eq!(res.status, 204);
        let res = app
            .delete(&format!("{path}/{tag_id}"), Some("my-blog"))
            .await;
        assert_eq!(res.status, 404);
    }
}

mod crud {
    use super::*;

    async fn root_section(app: &TestApp) -> String {
        let res = app.get(routes::SECTIONS, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        res.body["sections"]
            .as_array()
            .and_then(|items| items.iter().find(|s| s["path"] == "/"))
            .and_then(|s| s["id"].as_str())
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn create_read_update_and_delete() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let section = root_section(&app).await;

        let body = json!({
            "section_id": section,
            "kind": "article",
            "heading": "Hello World",
            "body": "Some text",
            "meta": { "description": "greeting", "share": true },
        });
        let res = app.post(routes::CONTENTS, &body, Some("my-blog")).await;
        assert_eq!(res.status, 201, "{}", res.text);
        let content = &res.body["content"];
        let id = content["id"].as_str().unwrap().to_string();
        assert_eq!(content["meta"]["description"], "greeting");
        assert_eq!(content["meta"]["share"], true);
        assert_eq!(content["section_path"], "/");
        assert!(content["slug"].as_str().unwrap().starts_with("hello-world-"));

        let res = app.get(&routes::content(&id), Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["content"]["heading"], "Hello World");

        let update = json!({
            "section_id": section,
            "kind": "blog",
            "heading": "Hello Again",
            "meta": { "robots": "noindex" },
        });
        let res = app.put(&routes::content(&id), &update, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["content"]["kind"], "blog");
        assert_eq!(res.body["content"]["meta"]["robots"], "noindex");
        assert_eq!(res.body["content"]["meta"]["description"], "");

        let res = app.delete(&routes::content(&id), Some("my-blog")).await;
        assert_eq!(res.status, 204);
        let res = app.get(&routes::content(&id), Some("my-blog")).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn invalid_content_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let section = root_section(&app).await;

        let res = app
            .post(
                routes::CONTENTS,
                &json!({ "section_id": section, "kind": "poem", "heading": "x" }),
                Some("my-blog"),
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .post(
                routes::CONTENTS,
                &json!({ "section_id": section, "kind": "series", "heading": "Part 1" }),
                Some("my-blog"),
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);

        let res = app
            .post(
                routes::CONTENTS,
                &json!({ "section_id": uuid_nil(), "kind": "blog", "heading": "Lost" }),
                Some("my-blog"),
            )
            .await;
        assert_eq!(res.status, 404, "{}", res.text);
    }

    #[tokio::test]
    async fn deleting_a_tag_unlinks_content() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let content = app.content_id("my-blog", "About").await;

        let res = app
            .post(&routes::content_tags(&content), &json!({ "name": "ephemeral" }), Some("my-blog"))
            .await;
        let tag_id = res.body["tag"]["id"].as_str().unwrap().to_string();

        let res = app.delete(&routes::tag(&tag_id), Some("my-blog")).await;
        assert_eq!(res.status, 204);
        let res = app.get(routes::TAGS, Some("my-blog")).await;
        assert!(res.body["tags"].as_array().unwrap().iter().all(|t| t["id"] != tag_id.as_str()));
        let res = app.get(&routes::content_tags(&content), Some("my-blog")).await;
        assert!(res.body["tags"].as_array().unwrap().iter().all(|t| t["name"] != "ephemeral"));
        let res = app.delete(&routes::tag(&tag_id), Some("my-blog")).await;
        assert_eq!(res.status, 404);
    }

    fn uuid_nil() -> &'static str {
        "00000000-0000-0000-0000-000000000000"
    }
}
