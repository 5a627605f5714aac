use crate::common::{TestApp, routes};
use serde_json::json;

mod site_creation {
    use super::*;

    #[tokio::test]
    async fn creates_directories_and_database() {
        let app = TestApp::spawn().await;

        let site = app.create_site("My Blog", "my-blog", "blog").await;

        assert_eq!(site["slug"], "my-blog");
        assert_eq!(site["mode"], "blog");
        assert_eq!(site["active"], true);

        let paths = app.site_paths("my-blog");
        assert!(paths.db_file.is_file());
        assert!(paths.db_file.ends_with("db/my-blog/clio.db"));
        for dir in [&paths.markdown, &paths.html, &paths.images] {
            assert!(dir.is_dir(), "{} should exist", dir.display());
        }
        assert!(paths.images.ends_with("sites/my-blog/documents/assets/images"));
    }

    #[tokio::test]
    async fn returns_a_generated_password_when_none_is_given() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::SITES,
                &json!({ "name": "Docs", "slug": "docs" }),
                None,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["site"]["mode"], "structured");
        assert!(res.body["generated_password"].as_str().is_some_and(|p| !p.is_empty()));
    }

    #[tokio::test]
    async fn omits_the_password_when_one_is_given() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::SITES,
                &json!({ "name": "Docs", "slug": "docs", "admin_password": "s3cret-pass" }),
                None,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body.get("generated_password").is_none());
    }

    #[tokio::test]
    async fn rejects_a_duplicate_slug() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app
            .post(
                routes::SITES,
                &json!({ "name": "Other", "slug": "my-blog", "mode": "blog" }),
                None,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn rejects_an_unknown_mode_without_leaving_files() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::SITES,
                &json!({ "name": "Wiki", "slug": "wiki", "mode": "wiki" }),
                None,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(!app.site_paths("wiki").root.exists());

        let list = app.get(routes::SITES, None).await;
        assert_eq!(list.body["sites"].as_array().unwrap().len(), 0);
    }
}

mod site_listing {
    use super::*;

    #[tokio::test]
    async fn lists_sites_sorted_by_name() {
        let app = TestApp::spawn().await;
        app.create_site("Zeta", "zeta", "blog").await;
        app.create_site("Alpha", "alpha", "structured").await;

        let res = app.get(routes::SITES, None).await;

        assert_eq!(res.status, 200);
        let names: Vec<&str> = res.body["sites"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn prunes_sites_whose_database_is_gone() {
        let app = TestApp::spawn().await;
        app.create_site("Keep", "keep", "blog").await;
        app.create_site("Lost", "lost", "blog").await;
        std::fs::remove_file(app.site_paths("lost").db_file).unwrap();

        let res = app.get(routes::SITES, None).await;
        let slugs: Vec<&str> = res.body["sites"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, ["keep"]);

        let res = app.get(&routes::site("lost"), None).await;
        assert_eq!(res.status, 404);
        // The tree is left on disk.
        assert!(app.site_paths("lost").markdown.is_dir());
    }

    #[tokio::test]
    async fn gets_a_site_by_slug() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app.get(&routes::site("my-blog"), None).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["site"]["name"], "My Blog");
    }
}

mod site_deletion {
    use super::*;

    #[tokio::test]
    async fn removes_the_row_but_keeps_the_files() {
        let app = TestApp::spawn().await;
        let site = app.create_site("My Blog", "my-blog", "blog").await;
        let id = site["id"].as_str().unwrap();

        let res = app.delete(&routes::site(id), None).await;
        assert_eq!(res.status, 204);

        let res = app.get(&routes::site("my-blog"), None).await;
        assert_eq!(res.status, 404);
        assert!(app.site_paths("my-blog").db_file.is_file());
    }

    #[tokio::test]
    async fn returns_not_found_for_an_unknown_id() {
        let app = TestApp::spawn().await;

        let res = app
            .delete(&routes::site("00000000-0000-0000-0000-000000000001"), None)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod generation {
    use super::*;

    #[tokio::test]
    async fn generates_markdown_and_html_for_the_seeded_site() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app.post_empty(routes::GENERATE_MARKDOWN, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["report"]["pages"].as_u64().unwrap() >= 1);
        assert_eq!(res.body["report"]["failures"].as_array().unwrap().len(), 0);

        let res = app.post_empty(routes::GENERATE_HTML, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["report"]["failures"].as_array().unwrap().len(), 0);

        let paths = app.site_paths("my-blog");
        assert!(paths.html.join("index.html").is_file());
        let md_files = walkdir::WalkDir::new(&paths.markdown)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|x| x == "md"))
            .count();
        assert!(md_files >= 1);
    }
}
