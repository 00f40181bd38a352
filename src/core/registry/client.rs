use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::lookup::ModRegistry;
use super::model::{ProjectMetadata, SearchResponse, VersionRecord};
use super::select::select_version;
use crate::core::error::{PackerError, PackerResult};
use crate::core::mods::{ModTarget, ResolvedMod};
use crate::core::rate_limit::RateLimiter;

pub const MODRINTH_API_BASE: &str = "https://api.modrinth.com/v2";

const MOD_FACETS: &str = r#"[["project_type:mod"]]"#;

/// Rate-limited client for the three registry operations.
///
/// Every request waits on the shared [`RateLimiter`] first. Once `cancel`
/// fires no further acquisitions are made.
pub struct RegistryClient {
    client: Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
    cancel: CancellationToken,
}

impl RegistryClient {
    pub fn new(
        base_url: impl Into<String>,
        client: Client,
        limiter: Arc<RateLimiter>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            limiter,
            cancel,
        }
    }

    /// `GET /search` for mod projects matching `query`.
    pub async fn search(&self, query: &str, limit: usize) -> PackerResult<Vec<String>> {
        let url = self.endpoint(&["search"])?;
        let params = [
            ("query", query.to_string()),
            ("limit", limit.to_string()),
            ("facets", MOD_FACETS.to_string()),
        ];
        let response: SearchResponse = self.get_json(url, &params).await?;
        Ok(response.hits.into_iter().map(|hit| hit.project_id).collect())
    }

    /// `GET /project/{id|slug}`. `None` on 404 or an empty body.
    pub async fn get_project(&self, id_or_slug: &str) -> PackerResult<Option<ProjectMetadata>> {
        let url = self.endpoint(&["project", id_or_slug])?;
        match self.get_json::<ProjectMetadata>(url, &[]).await {
            Ok(project) if project.is_empty() => Ok(None),
            Ok(project) => Ok(Some(project)),
            Err(PackerError::DownloadFailed { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// `GET /project/{slug}/version` filtered to one loader and game version.
    pub async fn list_versions(
        &self,
        slug: &str,
        target: &ModTarget,
    ) -> PackerResult<Vec<VersionRecord>> {
        let url = self.endpoint(&["project", slug, "version"])?;
        let params = [
            ("loaders", serde_json::to_string(&[target.loader.to_string()])?),
            ("game_versions", serde_json::to_string(&[&target.game_version])?),
        ];
        self.get_json(url, &params).await
    }

    async fn lookup(
        &self,
        id_or_slug: &str,
        target: &ModTarget,
    ) -> PackerResult<Option<ResolvedMod>> {
        let Some(project) = self.get_project(id_or_slug).await? else {
            return Ok(None);
        };

        let slug = if project.slug.is_empty() {
            project.id.as_str()
        } else {
            project.slug.as_str()
        };
        let versions = self.list_versions(slug, target).await?;

        let Some((version, file)) = select_version(&versions) else {
            debug!(
                "No {} {} build with files for {}",
                target.loader, target.game_version, slug
            );
            return Ok(None);
        };

        Ok(Some(ResolvedMod {
            original_query: String::new(),
            display_name: project.title.clone(),
            project_id: project.id.clone(),
            version_id: version.id.clone(),
            download_url: file.url.clone(),
            filename: file.filename.clone(),
            release_channel: version.version_type,
            dependencies: version.dependencies.clone(),
            is_dependency: false,
            update_available: false,
        }))
    }

    fn endpoint(&self, segments: &[&str]) -> PackerResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            PackerError::RegistryApi(format!("invalid registry URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                PackerError::RegistryApi(format!("registry URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> PackerResult<T> {
        self.limiter.acquire_or_cancel(&self.cancel).await?;

        let resp = self.client.get(url.clone()).query(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PackerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl ModRegistry for RegistryClient {
    async fn search_by_text(&self, query: &str, limit: usize) -> PackerResult<Vec<String>> {
        self.search(query, limit).await
    }

    async fn get_mod_info(&self, id_or_slug: &str, target: &ModTarget) -> Option<ResolvedMod> {
        if id_or_slug.trim().is_empty() {
            return None;
        }
        match self.lookup(id_or_slug, target).await {
            Ok(found) => found,
            Err(e) => {
                debug!("Lookup of {} failed: {}", id_or_slug, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::build_http_client;
    use crate::core::mods::LoaderType;
    use crate::core::registry::ReleaseChannel;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RegistryClient {
        RegistryClient::new(
            server.uri(),
            build_http_client().unwrap(),
            Arc::new(RateLimiter::new(60_000)),
            CancellationToken::new(),
        )
    }

    fn target() -> ModTarget {
        ModTarget::new(LoaderType::Fabric, "1.20.1")
    }

    async fn mount_sodium(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/project/sodium"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "AANobbMI",
                "slug": "sodium",
                "title": "Sodium",
                "author": "jellysquid3",
                "description": "Rendering engine",
                "icon_url": null
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/project/sodium/version"))
            .and(query_param("loaders", r#"["fabric"]"#))
            .and(query_param("game_versions", r#"["1.20.1"]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "alpha1",
                    "version_type": "alpha",
                    "files": [{"url": "https://cdn.example/a.jar", "filename": "a.jar"}],
                    "dependencies": []
                },
                {
                    "id": "rel1",
                    "version_type": "release",
                    "files": [{"url": "https://cdn.example/sodium.jar", "filename": "sodium.jar"}],
                    "dependencies": [{"project_id": "P7dR8mSH", "dependency_type": "required"}]
                }
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn get_mod_info_selects_release_and_copies_dependencies() {
        let server = MockServer::start().await;
        mount_sodium(&server).await;

        let item = client_for(&server)
            .get_mod_info("sodium", &target())
            .await
            .expect("sodium resolves");

        assert_eq!(item.project_id, "AANobbMI");
        assert_eq!(item.display_name, "Sodium");
        assert_eq!(item.version_id, "rel1");
        assert_eq!(item.filename, "sodium.jar");
        assert_eq!(item.release_channel, ReleaseChannel::Release);
        assert_eq!(item.required_dependency_ids().collect::<Vec<_>>(), vec!["P7dR8mSH"]);
        assert!(item.original_query.is_empty());
        assert!(!item.is_dependency);
    }

    #[tokio::test]
    async fn missing_project_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.get_project("nope").await.unwrap().is_none());
        assert!(client.get_mod_info("nope", &target()).await.is_none());
    }

    #[tokio::test]
    async fn server_error_is_absent_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(client_for(&server)
            .get_mod_info("sodium", &target())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn malformed_versions_body_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project/broken"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "B", "slug": "broken"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/project/broken/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(client_for(&server)
            .get_mod_info("broken", &target())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn search_sends_mod_facet_and_returns_hits_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("query", "Apple Skin"))
            .and(query_param("limit", "5"))
            .and(query_param("facets", MOD_FACETS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": [{"project_id": "EsAfCjCV"}, {"project_id": "other"}]
            })))
            .mount(&server)
            .await;

        let hits = client_for(&server).search("Apple Skin", 5).await.unwrap();
        assert_eq!(hits, vec!["EsAfCjCV", "other"]);
    }

    #[tokio::test]
    async fn cancelled_client_makes_no_requests() {
        let server = MockServer::start().await;
        mount_sodium(&server).await;

        let client = client_for(&server);
        client.cancel.cancel();

        assert!(client.get_mod_info("sodium", &target()).await.is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
