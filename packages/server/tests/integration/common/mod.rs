use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use reqwest::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use tempfile::TempDir;

use folio_common::paths::SitePaths;
use folio_server::config::AppConfig;
use folio_server::database::init_catalog_db;
use folio_server::orchestrator::Orchestrator;
use folio_server::publish::CommandGitClient;
use folio_server::repo::{RepoManager, SiteStore};
use folio_server::state::AppState;
use folio_server::workspace::Workspace;

pub const SITE_HEADER: &str = "X-Site-Slug";

pub mod routes {
    pub const SITES: &str = "/api/v1/ssg/sites";
    pub const GENERATE_MARKDOWN: &str = "/api/v1/ssg/generate-markdown";
    pub const GENERATE_HTML: &str = "/api/v1/ssg/generate-html";
    pub const PUBLISH: &str = "/api/v1/ssg/publish";
    pub const PLAN: &str = "/api/v1/ssg/plan";
    pub const CONTENTS: &str = "/api/v1/ssg/contents";
    pub const PARAMS: &str = "/api/v1/ssg/params";
    pub const SECTIONS: &str = "/api/v1/ssg/sections";
    pub const LAYOUTS: &str = "/api/v1/ssg/layouts";
    pub const TAGS: &str = "/api/v1/ssg/tags";
    pub const WEB_SITES: &str = "/ssg/sites";
    pub const WEB_CURRENT: &str = "/ssg/current";

    pub fn site(slug_or_id: &str) -> String {
        format!("/api/v1/ssg/sites/{slug_or_id}")
    }

    pub fn param(id: &str) -> String {
        format!("/api/v1/ssg/params/{id}")
    }

    pub fn content(id: &str) -> String {
        format!("/api/v1/ssg/contents/{id}")
    }

    pub fn section(id: &str) -> String {
        format!("/api/v1/ssg/sections/{id}")
    }

    pub fn layout(id: &str) -> String {
        format!("/api/v1/ssg/layouts/{id}")
    }

    pub fn tag(id: &str) -> String {
        format!("/api/v1/ssg/tags/{id}")
    }

    pub fn content_images(content_id: &str) -> String {
        format!("/api/v1/ssg/contents/{content_id}/images")
    }

    pub fn content_image(content_id: &str, rel_id: &str) -> String {
        format!("/api/v1/ssg/contents/{content_id}/images/{rel_id}")
    }

    pub fn content_tags(content_id: &str) -> String {
        format!("/api/v1/ssg/contents/{content_id}/tags")
    }
}

/// A running test server over a throwaway workspace.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub workspace: Arc<Workspace>,
    // Keeps the workspace alive for the lifetime of the test.
    pub tmp: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    pub location: Option<String>,
    pub set_cookie: Vec<String>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp workspace");

        let mut config = AppConfig::from_defaults().expect("Failed to build default config");
        config.server.port = 0;
        config.server.preview_port = 0;
        config.ssg.workspace_path = Some(tmp.path().join("workspace"));

        let workspace = Arc::new(Workspace::from_config(&config.app, &config.ssg));
        workspace
            .init()
            .await
            .expect("Failed to initialize workspace");

        let catalog = init_catalog_db(&workspace.catalog_db)
            .await
            .expect("Failed to open site catalog");
        let repos = Arc::new(RepoManager::new(
            workspace.clone(),
            config.ssg.repo_cache_size,
        ));
        let sites = Orchestrator::new(SiteStore::new(catalog), repos.clone(), workspace.clone());

        let state = AppState::new(
            config,
            workspace.clone(),
            sites,
            repos,
            Arc::new(CommandGitClient::new()),
        );
        let app = folio_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::builder()
                .redirect(Policy::none())
                .build()
                .expect("Failed to build HTTP client"),
            workspace,
            tmp,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn site_paths(&self, slug: &str) -> SitePaths {
        self.workspace.site_paths(slug)
    }

    fn scoped(&self, req: reqwest::RequestBuilder, site: Option<&str>) -> reqwest::RequestBuilder {
        match site {
            Some(slug) => req.header(SITE_HEADER, slug),
            None => req,
        }
    }

    pub async fn get(&self, path: &str, site: Option<&str>) -> TestResponse {
        let res = self
            .scoped(self.client.get(self.url(path)), site)
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Cookie", cookie)
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value, site: Option<&str>) -> TestResponse {
        let res = self
            .scoped(self.client.post(self.url(path)), site)
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    /// POST without a body, for action endpoints.
    pub async fn post_empty(&self, path: &str, site: Option<&str>) -> TestResponse {
        let res = self
            .scoped(self.client.post(self.url(path)), site)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value, site: Option<&str>) -> TestResponse {
        let res = self
            .scoped(self.client.put(self.url(path)), site)
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str, site: Option<&str>) -> TestResponse {
        let res = self
            .scoped(self.client.delete(self.url(path)), site)
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn upload(
        &self,
        path: &str,
        site: &str,
        file_name: &str,
        file_bytes: Vec<u8>,
        purpose: &str,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str("image/png")
            .expect("Failed to set MIME type");
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("purpose", purpose.to_string())
            .text("alt_text", "A test image");

        let res = self
            .client
            .post(self.url(path))
            .header(SITE_HEADER, site)
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Create a site through the API and return its JSON record.
    pub async fn create_site(&self, name: &str, slug: &str, mode: &str) -> Value {
        let res = self
            .post(
                routes::SITES,
                &serde_json::json!({ "name": name, "slug": slug, "mode": mode }),
                None,
            )
            .await;
        assert_eq!(res.status, 201, "create_site failed: {}", res.text);
        res.body["site"].clone()
    }

    /// Find a content item's id by heading.
    pub async fn content_id(&self, site: &str, heading: &str) -> String {
        let res = self
            .get(&format!("{}?q={heading}", routes::CONTENTS), Some(site))
            .await;
        assert_eq!(res.status, 200, "search failed: {}", res.text);
        res.body["contents"]
            .as_array()
            .and_then(|items| items.iter().find(|c| c["heading"] == heading))
            .and_then(|c| c["id"].as_str())
            .unwrap_or_else(|| panic!("no content titled {heading}: {}", res.text))
            .to_string()
    }

    /// Set a seeded system param's value, keeping its other fields.
    pub async fn set_param(&self, site: &str, ref_key: &str, value: &str) {
        let res = self.get(routes::PARAMS, Some(site)).await;
        assert_eq!(res.status, 200, "list params failed: {}", res.text);
        let param = res.body["params"]
            .as_array()
            .and_then(|items| items.iter().find(|p| p["ref_key"] == ref_key))
            .unwrap_or_else(|| panic!("no param {ref_key}"))
            .clone();

        let body = serde_json::json!({
            "name": param["name"],
            "description": param["description"],
            "ref_key": param["ref_key"],
            "value": value,
        });
        let id = param["id"].as_str().unwrap();
        let res = self.put(&routes::param(id), &body, Some(site)).await;
        assert_eq!(res.status, 200, "update param failed: {}", res.text);
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let location = res
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookie = res
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            text,
            body,
            location,
            set_cookie,
        }
    }
}

/// A small valid PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    out.into_inner()
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(["-c", "user.name=test", "-c", "user.email=test@localhost"])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

/// A bare remote whose `branch` holds a copy of `source`, minus `skip`.
pub fn bare_remote_from(root: &Path, branch: &str, source: &Path, skip: &str) -> PathBuf {
    let bare = root.join("remote.git");
    let seed = root.join("seed");
    std::fs::create_dir_all(&seed).unwrap();
    git(root, &["init", "--quiet", "--bare", bare.to_str().unwrap()]);
    git(&seed, &["init", "--quiet"]);
    git(&seed, &["checkout", "--quiet", "-b", branch]);

    for entry in walkdir::WalkDir::new(source) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(source).unwrap();
        if rel.as_os_str().is_empty() || rel.to_string_lossy().replace('\\', "/") == skip {
            continue;
        }
        let dest = seed.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).unwrap();
        } else {
            std::fs::copy(entry.path(), &dest).unwrap();
        }
    }

    git(&seed, &["add", "-A"]);
    git(&seed, &["commit", "--quiet", "-m", "seed"]);
    git(&seed, &["remote", "add", "origin", bare.to_str().unwrap()]);
    git(&seed, &["push", "--quiet", "origin", branch]);
    bare
}

pub fn remote_files(bare: &Path, branch: &str) -> Vec<String> {
    let listing = git(bare, &["ls-tree", "-r", "--name-only", branch]);
    let mut files: Vec<String> = listing.lines().map(str::to_string).collect();
    files.sort();
    files
}

pub fn commit_count(bare: &Path, branch: &str) -> usize {
    git(bare, &["rev-list", "--count", branch]).parse().unwrap()
}
