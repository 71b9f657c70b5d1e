//! HTTP implementation of [`ResourceApi`].

use std::time::Duration;

use async_trait::async_trait;
use iam_core::{ExportFormat, ResourceType, ServerConfig};
use reqwest::{header, multipart, Method, StatusCode};
use serde::Deserialize;

use crate::api::{ExportedFile, ResourceApi, ResourceRef, UploadFile};
use crate::error::{ApiError, ApiResult};
use crate::token::fetch_access_token;

/// Management API client for one tenant.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Creates a client for the management API rooted at `base_url`.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(client, base_url, token))
    }

    /// Creates a client with a pre-built `reqwest::Client`.
    pub fn with_http_client(client: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Creates a client for `server`, requesting a token unless one is
    /// configured.
    pub async fn connect(server: &ServerConfig, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let token = match &server.token {
            Some(token) => token.clone(),
            None => fetch_access_token(&client, server).await?,
        };
        Ok(Self::with_http_client(client, &server.api_base_url(), &token))
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, resource_type: ResourceType) -> String {
        format!("{}/{}", self.base_url, resource_type.api_path())
    }

    fn resource_url(&self, resource_type: ResourceType, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(resource_type),
            urlencoding::encode(id)
        )
    }

    fn export_url(&self, resource_type: ResourceType, id: &str) -> String {
        let action = match resource_type {
            ResourceType::Applications => "exportFile",
            _ => "export",
        };
        format!("{}/{action}", self.resource_url(resource_type, id))
    }

    fn import_url(&self, resource_type: ResourceType) -> String {
        match resource_type {
            ResourceType::UserStores => format!("{}/file", self.collection_url(resource_type)),
            _ => format!("{}/import", self.collection_url(resource_type)),
        }
    }

    fn update_url(&self, resource_type: ResourceType, id: &str) -> String {
        match resource_type {
            ResourceType::Applications | ResourceType::ClaimDialects => {
                self.import_url(resource_type)
            }
            ResourceType::UserStores => format!("{}/file", self.resource_url(resource_type, id)),
            ResourceType::IdentityProviders => {
                format!("{}/import", self.resource_url(resource_type, id))
            }
        }
    }

    async fn upload(
        &self,
        method: Method,
        url: &str,
        file: &UploadFile,
        expected: StatusCode,
    ) -> ApiResult<()> {
        tracing::debug!("{method} {url} ({})", file.filename);
        let part = multipart::Part::bytes(file.content.clone())
            .file_name(file.filename.clone())
            .mime_str(file.format.media_type())?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        expect_status(response, expected).await.map(drop)
    }
}

#[async_trait]
impl ResourceApi for ApiClient {
    async fn list(&self, resource_type: ResourceType) -> ApiResult<Vec<ResourceRef>> {
        let url = self.collection_url(resource_type);
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let body = expect_status(response, StatusCode::OK).await?;
        parse_list(resource_type, &body)
    }

    async fn export(
        &self,
        resource_type: ResourceType,
        id: &str,
        format: ExportFormat,
        exclude_secrets: bool,
    ) -> ApiResult<ExportedFile> {
        let url = self.export_url(resource_type, id);
        tracing::debug!("GET {url}");
        let mut request = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, format.media_type());
        request = match resource_type {
            ResourceType::Applications => {
                request.query(&[("exportSecrets", (!exclude_secrets).to_string())])
            }
            ResourceType::IdentityProviders => {
                request.query(&[("excludeSecrets", exclude_secrets.to_string())])
            }
            ResourceType::ClaimDialects | ResourceType::UserStores => request,
        };

        let response = request.send().await?;
        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename);
        let status = response.status();
        let content = response.bytes().await?;
        if status != StatusCode::OK {
            return Err(ApiError::from_status(
                status.as_u16(),
                &String::from_utf8_lossy(&content),
            ));
        }
        Ok(ExportedFile {
            filename,
            content: content.to_vec(),
        })
    }

    async fn import(&self, resource_type: ResourceType, file: &UploadFile) -> ApiResult<()> {
        let url = self.import_url(resource_type);
        self.upload(Method::POST, &url, file, StatusCode::CREATED).await
    }

    async fn update(
        &self,
        resource_type: ResourceType,
        id: &str,
        file: &UploadFile,
    ) -> ApiResult<()> {
        let url = self.update_url(resource_type, id);
        self.upload(Method::PUT, &url, file, StatusCode::OK).await
    }

    async fn delete(&self, resource_type: ResourceType, id: &str) -> ApiResult<()> {
        let url = self.resource_url(resource_type, id);
        tracing::debug!("DELETE {url}");
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        expect_status(response, StatusCode::NO_CONTENT).await.map(drop)
    }
}

/// Reads the body, failing unless the status is `expected`.
async fn expect_status(response: reqwest::Response, expected: StatusCode) -> ApiResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if status == expected {
        Ok(body)
    } else {
        Err(ApiError::from_status(status.as_u16(), &body))
    }
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationList {
    applications: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityProviderList {
    identity_providers: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
struct DialectEntry {
    id: String,
    #[serde(rename = "dialectURI")]
    dialect_uri: String,
}

fn parse_list(resource_type: ResourceType, body: &str) -> ApiResult<Vec<ResourceRef>> {
    let decode = |e: serde_json::Error| {
        ApiError::Decode(format!("{resource_type} list: {e}"))
    };
    let named = |entries: Vec<NamedEntry>| -> Vec<ResourceRef> {
        entries
            .into_iter()
            .map(|entry| ResourceRef::new(entry.id, entry.name))
            .collect()
    };

    let refs = match resource_type {
        ResourceType::Applications => {
            named(serde_json::from_str::<ApplicationList>(body).map_err(decode)?.applications)
        }
        ResourceType::IdentityProviders => named(
            serde_json::from_str::<IdentityProviderList>(body)
                .map_err(decode)?
                .identity_providers,
        ),
        ResourceType::ClaimDialects => serde_json::from_str::<Vec<DialectEntry>>(body)
            .map_err(decode)?
            .into_iter()
            .map(|entry| ResourceRef::new(entry.id, entry.dialect_uri))
            .collect(),
        ResourceType::UserStores => {
            named(serde_json::from_str::<Vec<NamedEntry>>(body).map_err(decode)?)
        }
    };
    Ok(refs)
}

/// Extracts the `filename` parameter of a `Content-Disposition` header.
#[must_use]
pub fn content_disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("filename")
                .then(|| value.trim().trim_matches('"').to_string())
        })
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::with_http_client(
            reqwest::Client::new(),
            "https://iam.example.com/t/carbon.super/api/server/v1/",
            "token",
        )
    }

    #[test]
    fn endpoint_shapes_follow_resource_type() {
        let client = client();
        let base = "https://iam.example.com/t/carbon.super/api/server/v1";
        assert_eq!(
            client.export_url(ResourceType::Applications, "a1"),
            format!("{base}/applications/a1/exportFile")
        );
        assert_eq!(
            client.export_url(ResourceType::IdentityProviders, "LOCAL"),
            format!("{base}/identity-providers/LOCAL/export")
        );
        assert_eq!(
            client.import_url(ResourceType::UserStores),
            format!("{base}/userstores/file")
        );
        assert_eq!(
            client.update_url(ResourceType::UserStores, "VVM"),
            format!("{base}/userstores/VVM/file")
        );
        assert_eq!(
            client.update_url(ResourceType::Applications, "a1"),
            format!("{base}/applications/import")
        );
        assert_eq!(
            client.update_url(ResourceType::IdentityProviders, "i1"),
            format!("{base}/identity-providers/i1/import")
        );
    }

    #[test]
    fn filename_from_content_disposition() {
        assert_eq!(
            content_disposition_filename("attachment; filename=app.yml"),
            Some("app.yml".to_string())
        );
        assert_eq!(
            content_disposition_filename("attachment; filename=\"My App.json\""),
            Some("My App.json".to_string())
        );
        assert_eq!(content_disposition_filename("inline"), None);
    }

    #[test]
    fn claim_dialect_list_uses_dialect_uri() {
        let refs = parse_list(
            ResourceType::ClaimDialects,
            r#"[{"id":"bG9jYWw","dialectURI":"local"}]"#,
        )
        .unwrap();
        assert_eq!(refs, vec![ResourceRef::new("bG9jYWw", "local")]);
    }

    #[test]
    fn malformed_list_is_a_decode_error() {
        let error = parse_list(ResourceType::Applications, "[]").unwrap_err();
        assert!(matches!(error, ApiError::Decode(_)));
    }

    #[test]
    fn list_without_its_key_is_a_decode_error() {
        for resource_type in [ResourceType::Applications, ResourceType::IdentityProviders] {
            let error = parse_list(resource_type, "{}").unwrap_err();
            assert!(matches!(error, ApiError::Decode(_)));
        }
    }

    #[test]
    fn empty_application_list_is_accepted() {
        let refs = parse_list(
            ResourceType::Applications,
            r#"{"totalResults":0,"applications":[]}"#,
        )
        .unwrap();
        assert!(refs.is_empty());
    }
}
