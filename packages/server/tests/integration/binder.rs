use crate::common::{SITE_HEADER, TestApp, routes};

mod api_flow {
    use super::*;

    #[tokio::test]
    async fn missing_header_is_a_bad_request() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app.get(routes::PARAMS, None).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn blank_header_is_a_bad_request() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .get(app.url(routes::PARAMS))
            .header(SITE_HEADER, "  ")
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn unknown_site_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::PARAMS, Some("nope")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn requests_stay_isolated_per_site() {
        let app = TestApp::spawn().await;
        app.create_site("First", "first", "blog").await;
        app.create_site("Second", "second", "blog").await;

        app.set_param("first", "ssg.header.style", "plain").await;

        let res = app.get(routes::PARAMS, Some("second")).await;
        let style = res.body["params"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["ref_key"] == "ssg.header.style")
            .unwrap();
        assert_ne!(style["value"], "plain");
    }
}

mod web_flow {
    use super::*;

    #[tokio::test]
    async fn redirects_to_the_site_list_without_a_site() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::WEB_CURRENT, None).await;

        assert!((300..400).contains(&res.status), "status {}", res.status);
        assert_eq!(res.location.as_deref(), Some(routes::WEB_SITES));
    }

    #[tokio::test]
    async fn query_binds_the_site_and_sets_the_cookie() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app
            .get(&format!("{}?site=my-blog", routes::WEB_CURRENT), None)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["page"]["site"]["slug"], "my-blog");
        let cookie = res
            .set_cookie
            .iter()
            .find(|c| c.starts_with("last_site="))
            .expect("last_site cookie");
        assert!(cookie.starts_with("last_site=my-blog"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=31536000"));
    }

    #[tokio::test]
    async fn cookie_is_used_when_the_query_is_absent() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app
            .get_with_cookie(routes::WEB_CURRENT, "last_site=my-blog")
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["page"]["site"]["slug"], "my-blog");
    }

    #[tokio::test]
    async fn stale_cookie_falls_back_to_the_site_list() {
        let app = TestApp::spawn().await;

        let res = app
            .get_with_cookie(routes::WEB_CURRENT, "last_site=gone")
            .await;

        assert_eq!(res.location.as_deref(), Some(routes::WEB_SITES));
    }

    #[tokio::test]
    async fn site_list_needs_no_binding() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;

        let res = app.get(routes::WEB_SITES, None).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["sites"][0]["slug"], "my-blog");
    }
}
