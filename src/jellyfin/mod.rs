use crate::config::Configuration;
use crate::error::Result;
use crate::http::HttpClient;
use crate::library::MovieProbe;
use crate::models::{ItemsPage, MediaFolder, Movie, User};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Upper bound on the movies fetched for a single random pick.
pub const MOVIE_LIMIT: u32 = 1000;

const MOVIE_FIELDS: &str = "ProductionYear,RunTimeTicks,CommunityRating,Overview";

pub struct JellyfinClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    user_id: String,
}

impl JellyfinClient {
    pub fn new(http: HttpClient, config: &Configuration) -> Self {
        Self {
            http,
            base_url: config.jellyfin_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            user_id: config.user_id.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let url = format!("{}/Users", self.base_url);
        let users: Vec<User> = self.http.get_json(&url, &self.api_key).await?;

        info!("Retrieved {} users", users.len());
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn list_media_folders(&self) -> Result<Vec<MediaFolder>> {
        let url = format!("{}/Library/MediaFolders", self.base_url);
        let page: ItemsPage<MediaFolder> = self.http.get_json(&url, &self.api_key).await?;

        info!("Retrieved {} media folders", page.items.len());
        Ok(page.items)
    }

    #[instrument(skip(self))]
    pub async fn probe_library_has_movies(&self, library_id: &str) -> Result<bool> {
        let url = format!("{}&Limit=1", self.movie_items_url(library_id));
        let page: ItemsPage<Movie> = self.http.get_json(&url, &self.api_key).await?;

        debug!("Probe found {} movies", page.total_record_count);
        Ok(page.total_record_count > 0)
    }

    #[instrument(skip(self))]
    pub async fn list_movies(&self, library_id: &str) -> Result<Vec<Movie>> {
        let url = format!(
            "{}&Fields={}&StartIndex=0&Limit={}",
            self.movie_items_url(library_id),
            MOVIE_FIELDS,
            MOVIE_LIMIT
        );
        let page: ItemsPage<Movie> = self.http.get_json(&url, &self.api_key).await?;

        info!("Retrieved {} movies", page.items.len());
        Ok(page.items)
    }

    fn movie_items_url(&self, library_id: &str) -> String {
        format!(
            "{}/Users/{}/Items?ParentId={}&IncludeItemTypes=Movie&Recursive=true",
            self.base_url,
            urlencoding::encode(&self.user_id),
            urlencoding::encode(library_id)
        )
    }
}

#[async_trait]
impl MovieProbe for JellyfinClient {
    async fn has_movies(&self, library_id: &str) -> Result<bool> {
        self.probe_library_has_movies(library_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::DEFAULT_TIMEOUT;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> JellyfinClient {
        let config = Configuration {
            jellyfin_url: format!("{}/", server.uri()),
            api_key: "secret".to_string(),
            user_id: "u1".to_string(),
            user_name: "alice".to_string(),
        };
        JellyfinClient::new(HttpClient::new(DEFAULT_TIMEOUT).unwrap(), &config)
    }

    #[tokio::test]
    async fn list_users_sends_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Users"))
            .and(header("X-Emby-Token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"Id": "u1", "Name": "alice", "Policy": {}},
                {"Id": "u2", "Name": "bob"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let users = client_for(&server).list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "bob");
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(path("/Users"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).list_users().await.unwrap_err();
        assert!(matches!(err, Error::UpstreamStatus(s) if s.as_u16() == 401));
    }

    #[tokio::test]
    async fn malformed_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(path("/Library/MediaFolders"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_media_folders().await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn probe_reads_total_record_count() {
        let server = MockServer::start().await;
        Mock::given(path("/Users/u1/Items"))
            .and(query_param("ParentId", "full"))
            .and(query_param("IncludeItemTypes", "Movie"))
            .and(query_param("Limit", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Items": [{"Id": "m1", "Name": "X"}], "TotalRecordCount": 42})),
            )
            .mount(&server)
            .await;
        Mock::given(path("/Users/u1/Items"))
            .and(query_param("ParentId", "bare"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"Items": [], "TotalRecordCount": 0})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.probe_library_has_movies("full").await.unwrap());
        assert!(!client.probe_library_has_movies("bare").await.unwrap());
    }

    #[tokio::test]
    async fn list_movies_requests_fields_and_limit() {
        let server = MockServer::start().await;
        Mock::given(path("/Users/u1/Items"))
            .and(query_param("ParentId", "lib"))
            .and(query_param("Recursive", "true"))
            .and(query_param("Fields", MOVIE_FIELDS))
            .and(query_param("Limit", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Items": [
                    {"Id": "m1", "Name": "X", "ProductionYear": 2020, "RunTimeTicks": 7380000000i64},
                    {"Id": "m2", "Name": "Y"}
                ],
                "TotalRecordCount": 2
            })))
            .mount(&server)
            .await;

        let movies = client_for(&server).list_movies("lib").await.unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].production_year, Some(2020));
        assert_eq!(movies[1].run_time_ticks, None);
    }
}
