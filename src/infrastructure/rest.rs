//! KuFlow REST client over reqwest's blocking API
//!
//! Authenticates every request with HTTP Basic credentials built from the
//! resolved client id and client secret.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{ClientSecret, ResolvedConfig};
use crate::domain::{SaveElementCommand, SaveElementDocumentCommand, TaskLog};
use crate::infrastructure::error::{TransportError, TransportResult};
use crate::infrastructure::traits::TaskOperations;

const REQUEST_TIMEOUT_SECS: u64 = 60;

const ACTION_SAVE_ELEMENT: &str = "save-element";
const ACTION_SAVE_ELEMENT_DOCUMENT: &str = "save-element-value-document";
const ACTION_APPEND_LOG: &str = "append-log";

/// REST client for the task actions of the KuFlow API.
pub struct KuFlowRestClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: ClientSecret,
}

impl KuFlowRestClient {
    /// Build a client from resolved settings.
    ///
    /// # Errors
    /// [`TransportError::InvalidEndpoint`] if the endpoint is not an absolute URL.
    pub fn new(config: &ResolvedConfig) -> TransportResult<Self> {
        let base_url = config.endpoint().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| TransportError::InvalidEndpoint {
            endpoint: base_url.clone(),
            reason: e.to_string(),
        })?;
        if config.is_insecure() {
            warn!("using insecure connection to {base_url}");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("kuflowctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            client_id: config.client_id().to_string(),
            client_secret: config.client_secret().clone(),
        })
    }

    /// Build the URL of a task action.
    pub fn task_action_url(&self, task_id: Uuid, action: &str) -> String {
        format!("{}/tasks/{}/~actions/{}", self.base_url, task_id, action)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.client_id, Some(self.client_secret.expose()))
    }

    fn send(&self, request: RequestBuilder) -> TransportResult<()> {
        let response = self.authorize(request).send()?;
        handle_response(response)
    }
}

impl TaskOperations for KuFlowRestClient {
    fn save_element(&self, task_id: Uuid, command: &SaveElementCommand) -> TransportResult<()> {
        let url = self.task_action_url(task_id, ACTION_SAVE_ELEMENT);
        debug!("POST {url}");
        self.send(self.client.post(&url).json(command))
    }

    fn save_element_document(
        &self,
        task_id: Uuid,
        command: &SaveElementDocumentCommand,
        file: &Path,
    ) -> TransportResult<()> {
        let url = self.task_action_url(task_id, ACTION_SAVE_ELEMENT_DOCUMENT);
        debug!("POST {url} ({})", file.display());

        let part = multipart::Part::file(file)
            .map_err(|e| TransportError::io(format!("read {}", file.display()), e))?;
        let mut form = multipart::Form::new()
            .text("elementValueValid", command.element_value_valid.to_string());
        if let Some(code) = &command.element_definition_code {
            form = form.text("elementDefinitionCode", code.clone());
        }
        if let Some(id) = command.element_value_id {
            form = form.text("elementValueId", id.to_string());
        }
        form = form.part("file", part);

        self.send(self.client.post(&url).multipart(form))
    }

    fn append_log(&self, task_id: Uuid, log: &TaskLog) -> TransportResult<()> {
        let url = self.task_action_url(task_id, ACTION_APPEND_LOG);
        debug!("POST {url}");
        self.send(self.client.post(&url).json(log))
    }
}

fn handle_response(response: Response) -> TransportResult<()> {
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(TransportError::Unauthorized)
    } else if status == StatusCode::NOT_FOUND {
        Err(TransportError::NotFound(response.url().path().to_string()))
    } else {
        let body = response.text().unwrap_or_default();
        Err(TransportError::Server {
            status: status.as_u16(),
            body,
        })
    }
}
