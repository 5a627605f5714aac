use crate::common::{TestApp, bare_remote_from, commit_count, git, remote_files, routes};

const BRANCH: &str = "gh-pages";

/// A generated site pointed at a bare remote holding everything but `index.html`.
async fn site_with_remote(app: &TestApp) -> std::path::PathBuf {
    app.create_site("My Blog", "my-blog", "blog").await;
    let res = app.post_empty(routes::GENERATE_HTML, Some("my-blog")).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let html = app.site_paths("my-blog").html;
    let bare = bare_remote_from(&app.tmp.path().join("git"), BRANCH, &html, "index.html");

    app.set_param("my-blog", "ssg.publish.repo.url", bare.to_str().unwrap())
        .await;
    app.set_param("my-blog", "ssg.publish.branch", BRANCH).await;
    app.set_param("my-blog", "ssg.publish.auth.method", "ssh").await;
    bare
}

mod plan_and_publish {
    use super::*;

    #[tokio::test]
    async fn plan_reports_the_one_new_file_and_publish_pushes_it() {
        let app = TestApp::spawn().await;
        let bare = site_with_remote(&app).await;
        let before = git(&bare, &["rev-parse", BRANCH]);
        let commits_before = commit_count(&bare, BRANCH);

        let res = app.post_empty(routes::PLAN, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["plan"]["added"], serde_json::json!(["index.html"]));
        assert_eq!(res.body["plan"]["modified"], serde_json::json!([]));
        assert_eq!(res.body["plan"]["removed"], serde_json::json!([]));
        assert_eq!(res.body["plan"]["summary"], "Added: 1, Modified: 0, Removed: 0");
        // Planning leaves the remote untouched.
        assert_eq!(git(&bare, &["rev-parse", BRANCH]), before);

        let res = app.post_empty(routes::PUBLISH, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let after = git(&bare, &["rev-parse", BRANCH]);
        let expected_url = format!("{}/commit/{after}", bare.to_str().unwrap());
        assert_eq!(res.body["publish"]["commit_url"], expected_url.as_str());

        assert_eq!(commit_count(&bare, BRANCH), commits_before + 1);
        let diff = git(&bare, &["diff", "--name-status", &before, &after]);
        assert_eq!(diff, "A\tindex.html");
        assert!(remote_files(&bare, BRANCH).contains(&"index.html".to_string()));
    }

    #[tokio::test]
    async fn skip_if_unchanged_does_not_commit_an_identical_tree() {
        let app = TestApp::spawn().await;
        let bare = site_with_remote(&app).await;

        let res = app.post_empty(routes::PUBLISH, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let commits = commit_count(&bare, BRANCH);

        let res = app
            .post(
                routes::PUBLISH,
                &serde_json::json!({ "skip_if_unchanged": true }),
                Some("my-blog"),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["publish"]["commit_url"].is_null());
        assert_eq!(commit_count(&bare, BRANCH), commits);

        // Without the option an empty commit is still pushed.
        let res = app.post_empty(routes::PUBLISH, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(commit_count(&bare, BRANCH), commits + 1);
    }

    #[tokio::test]
    async fn publish_into_a_subdirectory_keeps_the_rest_of_the_branch() {
        let app = TestApp::spawn().await;
        let bare = site_with_remote(&app).await;
        let before = remote_files(&bare, BRANCH);
        app.set_param("my-blog", "ssg.publish.pages.subdir", "docs").await;

        let res = app.post_empty(routes::PUBLISH, Some("my-blog")).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let after = remote_files(&bare, BRANCH);
        for file in &before {
            assert!(after.contains(file), "{file} should survive");
        }
        assert!(after.contains(&"docs/index.html".to_string()));
    }
}

mod publish_failures {
    use super::*;

    #[tokio::test]
    async fn missing_repository_is_a_validation_error() {
        let app = TestApp::spawn().await;
        app.create_site("My Blog", "my-blog", "blog").await;
        app.post_empty(routes::GENERATE_HTML, Some("my-blog")).await;

        let res = app.post_empty(routes::PUBLISH, Some("my-blog")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_branch_fails_and_leaves_the_remote_alone() {
        let app = TestApp::spawn().await;
        let bare = site_with_remote(&app).await;
        app.set_param("my-blog", "ssg.publish.branch", "missing").await;

        let res = app.post_empty(routes::PUBLISH, Some("my-blog")).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "INTERNAL_ERROR");
        let branches = git(&bare, &["branch", "--list"]);
        assert!(!branches.contains("missing"));
    }

    #[tokio::test]
    async fn subdirectory_outside_the_repository_is_rejected() {
        let app = TestApp::spawn().await;
        site_with_remote(&app).await;
        app.set_param("my-blog", "ssg.publish.pages.subdir", "../outside").await;

        let res = app.post_empty(routes::PLAN, Some("my-blog")).await;

        assert_eq!(res.status, 400);
    }
}
