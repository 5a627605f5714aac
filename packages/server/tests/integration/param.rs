use crate::common::{TestApp, routes};
use serde_json::{Value, json};

async fn system_param(app: &TestApp, ref_key: &str) -> Value {
    let res = app.get(routes::PARAMS, Some("my-blog")).await;
    assert_eq!(res.status, 200, "{}", res.text);
    res.body["params"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["ref_key"] == ref_key)
        .cloned()
        .unwrap_or_else(|| panic!("no param {ref_key}"))
}

mod system_params {
    use super::*;

    #[tokio::test]
    async fn accepts_a_value_change() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        app.set_param("my-blog", "ssg.header.style", "overlay").await;

        let param = system_param(&app, "ssg.header.style").await;
        assert_eq!(param["value"], "overlay");
        assert_eq!(param["system"], true);
    }

    #[tokio::test]
    async fn rejects_a_renamed_ref_key() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let param = system_param(&app, "ssg.header.style").await;

        let res = app
            .put(
                &routes::param(param["id"].as_str().unwrap()),
                &json!({
                    "name": param["name"],
                    "description": param["description"],
                    "ref_key": "ssg.header.renamed",
                    "value": "plain",
                }),
                Some("my-blog"),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
        let param = system_param(&app, "ssg.header.style").await;
        assert_ne!(param["value"], "plain");
    }

    #[tokio::test]
    async fn rejects_a_changed_description() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let param = system_param(&app, "ssg.index.maxitems").await;

        let res = app
            .put(
                &routes::param(param["id"].as_str().unwrap()),
                &json!({
                    "name": param["name"],
                    "description": "something else",
                    "ref_key": param["ref_key"],
                    "value": "4",
                }),
                Some("my-blog"),
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn cannot_be_deleted() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        let param = system_param(&app, "ssg.blocks.maxitems").await;

        let res = app
            .delete(&routes::param(param["id"].as_str().unwrap()), Some("my-blog"))
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "FORBIDDEN");
    }
}

mod user_params {
    use super::*;

    #[tokio::test]
    async fn create_update_and_delete() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app
            .post(
                routes::PARAMS,
                &json!({ "name": "Footer", "value": "hello", "ref_key": "site.footer.text" }),
                Some("my-blog"),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["param"]["system"], false);
        let id = res.body["param"]["id"].as_str().unwrap().to_string();

        let res = app
            .put(
                &routes::param(&id),
                &json!({ "name": "Footer text", "value": "bye", "ref_key": "site.footer.label" }),
                Some("my-blog"),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["param"]["ref_key"], "site.footer.label");

        let res = app.delete(&routes::param(&id), Some("my-blog")).await;
        assert_eq!(res.status, 204);
        let res = app.get(&routes::param(&id), Some("my-blog")).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn rejects_a_duplicate_ref_key() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app
            .post(
                routes::PARAMS,
                &json!({ "name": "Dup", "value": "x", "ref_key": "ssg.header.style" }),
                Some("my-blog"),
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn rejects_a_malformed_ref_key() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app
            .post(
                routes::PARAMS,
                &json!({ "name": "Bad", "value": "x", "ref_key": "Not A Key" }),
                Some("my-blog"),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
