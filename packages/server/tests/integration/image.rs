use std::path::Path;

use crate::common::{TestApp, png_bytes, routes};

fn header_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains("_header_"))
        .collect()
}

mod content_uploads {
    use super::*;

    #[tokio::test]
    async fn stores_the_file_and_reports_dimensions() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let content = app.content_id("my-blog", "Welcome").await;

        let res = app
            .upload(
                &routes::content_images(&content),
                "my-blog",
                "Photo One.png",
                png_bytes(4, 3),
                "content",
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let image = &res.body["image"]["image"];
        assert_eq!(res.body["image"]["purpose"], "content");
        assert_eq!(image["width"], 4);
        assert_eq!(image["height"], 3);
        assert_eq!(image["alt_text"], "A test image");
        assert!(image["url"].as_str().unwrap().starts_with("/static/images/"));

        let file = app
            .site_paths("my-blog")
            .images
            .join(image["file_path"].as_str().unwrap());
        assert!(file.is_file());
    }

    #[tokio::test]
    async fn second_header_replaces_the_first_file() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let content = app.content_id("my-blog", "Welcome").await;
        let path = routes::content_images(&content);

        let first = app
            .upload(&path, "my-blog", "one.png", png_bytes(2, 2), "header")
            .await;
        assert_eq!(first.status, 201, "{}", first.text);
        let body = app
            .upload(&path, "my-blog", "body.png", png_bytes(2, 2), "content")
            .await;
        assert_eq!(body.status, 201, "{}", body.text);
        let second = app
            .upload(&path, "my-blog", "two.png", png_bytes(3, 3), "header")
            .await;
        assert_eq!(second.status, 201, "{}", second.text);

        let images_root = app.site_paths("my-blog").images;
        let second_file =
            images_root.join(second.body["image"]["image"]["file_path"].as_str().unwrap());
        let dir = second_file.parent().unwrap();

        let headers = header_files(dir);
        assert_eq!(headers.len(), 1, "{headers:?}");
        assert!(second_file.is_file());
        // Plain content images are left alone.
        let body_file = images_root.join(body.body["image"]["image"]["file_path"].as_str().unwrap());
        assert!(body_file.is_file());

        let list = app.get(&path, Some("my-blog")).await;
        assert_eq!(list.status, 200);
        let active_headers: Vec<_> = list.body["images"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|i| i["purpose"] == "header")
            .collect();
        assert_eq!(active_headers.len(), 1);
        assert_eq!(active_headers[0]["id"], second.body["image"]["id"]);
    }

    #[tokio::test]
    async fn rejects_a_section_purpose() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let content = app.content_id("my-blog", "Welcome").await;

        let res = app
            .upload(
                &routes::content_images(&content),
                "my-blog",
                "one.png",
                png_bytes(2, 2),
                "section_header",
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn deleting_removes_relation_and_file() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let content = app.content_id("my-blog", "Welcome").await;
        let path = routes::content_images(&content);

        let res = app
            .upload(&path, "my-blog", "one.png", png_bytes(2, 2), "content")
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let rel_id = res.body["image"]["id"].as_str().unwrap();
        let file = app
            .site_paths("my-blog")
            .images
            .join(res.body["image"]["image"]["file_path"].as_str().unwrap());

        let res = app
            .delete(&routes::content_image(&content, rel_id), Some("my-blog"))
            .await;
        assert_eq!(res.status, 204);
        assert!(!file.exists());

        let list = app.get(&path, Some("my-blog")).await;
        assert_eq!(list.body["images"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_content_is_not_found() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app
            .upload(
                &routes::content_images("00000000-0000-0000-0000-000000000001"),
                "my-blog",
                "one.png",
                png_bytes(2, 2),
                "content",
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod section_paths {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn header_url_resolves_for_mixed_case_section() {
        let app = TestApp::spawn().await;
        app.create_site("My Site", "my-site", "structured").await;

        let res = app
            .post(routes::SECTIONS, &json!({ "name": "My Tech", "path": "/My Tech/" }), Some("my-site"))
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["section"]["path"], "/my-tech/");
        let section = res.body["section"]["id"].as_str().unwrap().to_string();

        let res = app
            .post(
                routes::CONTENTS,
                &json!({ "section_id": section, "kind": "article", "heading": "Hello" }),
                Some("my-site"),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let content = res.body["content"]["id"].as_str().unwrap().to_string();

        let res = app
            .upload(&routes::content_images(&content), "my-site", "Cover.png", png_bytes(2, 2), "header")
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app.post_empty(routes::GENERATE_HTML, Some("my-site")).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get(&routes::content(&content), Some("my-site")).await;
        let url = res.body["content"]["header_image_url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/static/images/my-tech/"), "{url}");
        let file = app.site_paths("my-site").html.join(url.trim_start_matches('/'));
        assert!(file.is_file(), "missing {}", file.display());
    }
}
