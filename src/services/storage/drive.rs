use crate::services::storage::{Storage, StorageDestination, StorageError};
use axum::http::StatusCode;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const FILES_ENDPOINT: &str = "/drive/v3/files";
const UPLOAD_ENDPOINT: &str = "/upload/drive/v3/files";
const TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(serde::Deserialize, Debug)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(serde::Serialize, Debug)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(serde::Deserialize, Debug)]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(serde::Deserialize, Debug)]
struct DriveFile {
    id: String,
}

#[derive(serde::Deserialize, Debug)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Service account that trades a signed RS256 assertion for an OAuth access token.
pub struct ServiceAccount {
    client_email: String,
    token_uri: String,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccount {
    pub fn from_file(path: &Path) -> Result<ServiceAccount, StorageError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Credentials(format!(
                "failed to read service account credentials {}: {e}",
                path.display()
            ))
        })?;
        ServiceAccount::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<ServiceAccount, StorageError> {
        let key: ServiceAccountKey = serde_json::from_str(contents)
            .map_err(|e| StorageError::Credentials(format!("failed to parse credentials: {e}")))?;
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StorageError::Credentials(format!("invalid private key: {e}")))?;

        Ok(ServiceAccount {
            client_email: key.client_email,
            token_uri: key.token_uri,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    async fn access_token(&self, client: &reqwest::Client) -> Result<String, StorageError> {
        // Held across the refresh so concurrent requests wait for a single exchange
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: DRIVE_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME.as_secs() as i64,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| StorageError::Credentials(format!("failed to sign assertion: {e}")))?;

        let response = client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        let response = check_status(response).await?;
        let body = response.json::<AccessTokenResponse>().await?;

        let lifetime = body
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(TOKEN_LIFETIME);
        debug!("refreshed drive access token for {}", self.client_email);

        *cached = Some(CachedToken {
            token: body.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        });
        Ok(body.access_token)
    }
}

pub enum DriveCredentials {
    ServiceAccount(ServiceAccount),
    AccessToken(String),
}

//-------------------------
// google drive
//-------------------------
pub struct DriveStorage {
    client: reqwest::Client,
    base_url: String,
    credentials: DriveCredentials,
}

impl DriveStorage {
    pub fn new(base_url: impl Into<String>, credentials: DriveCredentials) -> DriveStorage {
        DriveStorage {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    async fn bearer(&self) -> Result<String, StorageError> {
        match &self.credentials {
            DriveCredentials::AccessToken(token) => Ok(token.clone()),
            DriveCredentials::ServiceAccount(account) => account.access_token(&self.client).await,
        }
    }

    async fn find_existing(
        &self,
        token: &str,
        name: &str,
        parent: &str,
    ) -> Result<Option<String>, StorageError> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_query(name),
            escape_query(parent)
        );
        let response = self
            .client
            .get(format!("{}{}", self.base_url, FILES_ENDPOINT))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        let list = check_status(response).await?.json::<DriveFileList>().await?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create(
        &self,
        token: &str,
        name: &str,
        parent: &str,
        data: Vec<u8>,
    ) -> Result<String, StorageError> {
        let boundary = format!("tripsnap-{}", Uuid::new_v4().simple());
        let metadata = json!({ "name": name, "parents": [parent] });

        let mut body = format!(
            "--{boundary}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata}\r\n\
             --{boundary}\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let response = self
            .client
            .post(format!("{}{}", self.base_url, UPLOAD_ENDPOINT))
            .bearer_auth(token)
            .query(&[("uploadType", "multipart"), ("supportsAllDrives", "true")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;
        let created = check_status(response).await?.json::<DriveFile>().await?;

        Ok(created.id)
    }

    async fn replace(&self, token: &str, id: &str, data: Vec<u8>) -> Result<String, StorageError> {
        let response = self
            .client
            .patch(format!("{}{}/{}", self.base_url, UPLOAD_ENDPOINT, id))
            .bearer_auth(token)
            .query(&[("uploadType", "media"), ("supportsAllDrives", "true")])
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(data)
            .send()
            .await?;
        let updated = check_status(response).await?.json::<DriveFile>().await?;

        Ok(updated.id)
    }
}

impl Storage for DriveStorage {
    /// Objects live flat under the destination folder, so `scope` is only
    /// reflected through the logical name. An existing object with the same
    /// name is replaced in place.
    async fn store(
        &self,
        _scope: &str,
        logical_name: &str,
        data: Vec<u8>,
        destination: &StorageDestination,
    ) -> Result<String, StorageError> {
        let token = self.bearer().await?;
        let parent = destination.as_str();

        match self.find_existing(&token, logical_name, parent).await? {
            Some(id) => {
                debug!("replacing drive object {id} ({logical_name})");
                self.replace(&token, &id, data).await
            }
            None => self.create(&token, logical_name, parent, data).await,
        }
    }

    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, StorageError> {
        let token = self.bearer().await?;
        let response = self
            .client
            .get(format!("{}{}/{}", self.base_url, FILES_ENDPOINT, identifier))
            .bearer_auth(&token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(identifier.to_string()));
        }
        let data = check_status(response).await?.bytes().await?;

        Ok(data.to_vec())
    }

    fn kind(&self) -> &'static str {
        "drive"
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::UnexpectedStatus(status, body))
}

fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
