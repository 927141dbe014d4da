use crate::{
    model::*,
    ApiFuture,
    ClientError,
    NifiApi,
};
use reqwest::{
    Response,
    StatusCode,
};
use serde::de::DeserializeOwned;
use std::{
    path::PathBuf,
    time::Duration,
};
use tokio::sync::RwLock;
use url::Url;

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Root of the REST API, e.g. `https://nifi:8443/nifi-api`.
    pub base_url: Url,
    pub credentials: Option<Credentials>,
    /// PEM bundle of additional root certificates.
    pub ca_certificates: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl ClientOptions {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credentials: None,
            ca_certificates: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// `reqwest` backed [`NifiApi`].
///
/// The access token obtained from `POST /access/token` is cached and shared by
/// every request issued through the same client.
pub struct NifiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for NifiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NifiClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl NifiClient {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        if options.base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(options.base_url));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        if let Some(path) = &options.ca_certificates {
            let pem = std::fs::read(path).map_err(|source| ClientError::ReadCertificates {
                path: path.clone(),
                source,
            })?;
            let certificates =
                reqwest::Certificate::from_pem_bundle(&pem).map_err(|source| ClientError::ParseCertificates {
                    path: path.clone(),
                    source,
                })?;
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: options.base_url,
            credentials: options.credentials,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let (mut response, sent) = self.send_get(&url).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.credentials.is_some() {
            debug!(%url, "access token rejected, logging in again");
            self.forget_token(sent.as_deref()).await;
            (response, _) = self.send_get(&url).await?;
        }

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { url: url.clone(), source })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status,
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { url, source })
    }

    /// Returns the response together with the token it was authorized with.
    async fn send_get(&self, url: &Url) -> Result<(Response, Option<String>), ClientError> {
        let mut request = self.http.get(url.clone());
        let token = self.access_token().await?;
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        trace!(%url, "GET");
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport { url: url.clone(), source })?;
        Ok((response, token))
    }

    /// Drops the cached token if it is still the rejected one. A concurrent
    /// request may already have replaced it with a fresh token.
    async fn forget_token(&self, rejected: Option<&str>) {
        let mut token = self.token.write().await;
        if token.as_deref() == rejected {
            token.take();
        }
    }

    async fn access_token(&self) -> Result<Option<String>, ClientError> {
        let Some(credentials) = &self.credentials else {
            return Ok(None);
        };

        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(Some(token.clone()));
        }

        let mut token = self.token.write().await;
        // Another request may have logged in while we waited for the lock.
        if let Some(token) = token.as_ref() {
            return Ok(Some(token.clone()));
        }

        let fresh = self.login(credentials).await?;
        *token = Some(fresh.clone());
        Ok(Some(fresh))
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, ClientError> {
        let url = self.endpoint(&["access", "token"], &[])?;
        debug!(%url, username = %credentials.username, "requesting access token");

        let response = self
            .http
            .post(url.clone())
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ClientError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Login {
                username: credentials.username.clone(),
                status,
            });
        }

        let token = response
            .text()
            .await
            .map_err(|source| ClientError::Transport { url, source })?;
        Ok(token.trim().to_string())
    }
}

impl NifiApi for NifiClient {
    fn connections<'a>(&'a self, process_group_id: &'a str) -> ApiFuture<'a, Vec<ConnectionEntity>> {
        Box::pin(async move {
            let url = self.endpoint(&["process-groups", process_group_id, "connections"], &[])?;
            let entity: ConnectionsEntity = self.get_json(url).await?;
            Ok(entity.connections)
        })
    }

    fn counters<'a>(&'a self, query: &'a CounterQuery) -> ApiFuture<'a, CountersDto> {
        Box::pin(async move {
            let nodewise = query.nodewise.to_string();
            let mut params = vec![("nodewise", nodewise.as_str())];
            if let Some(node_id) = query.cluster_node_id.as_deref().filter(|id| !id.is_empty()) {
                params.push(("clusterNodeId", node_id));
            }
            let url = self.endpoint(&["counters"], &params)?;
            let entity: CountersEntity = self.get_json(url).await?;
            Ok(entity.counters)
        })
    }

    fn process_group_status<'a>(&'a self, process_group_id: &'a str) -> ApiFuture<'a, ProcessGroupStatusDto> {
        Box::pin(async move {
            let url = self.endpoint(
                &["flow", "process-groups", process_group_id, "status"],
                &[("recursive", "true"), ("nodewise", "true")],
            )?;
            let entity: ProcessGroupStatusEntity = self.get_json(url).await?;
            Ok(entity.process_group_status)
        })
    }

    fn system_diagnostics(&self) -> ApiFuture<'_, SystemDiagnosticsDto> {
        Box::pin(async move {
            let url = self.endpoint(&["system-diagnostics"], &[("nodewise", "true")])?;
            let entity: SystemDiagnosticsEntity = self.get_json(url).await?;
            Ok(entity.system_diagnostics)
        })
    }
}
