use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use evaldesk_application::{
    ActivityGateway, CurrentUserGateway, EntityWriteGateway, ReferenceDataGateway,
    SessionTokenStore, StoredEntity,
};
use evaldesk_core::{AppError, AppResult, UserProfile};
use evaldesk_domain::{
    ActivityRecord, ActivityStatus, ActivitySubject, EntityDraft, EntityKind, ReferenceOptionSet,
    ReferenceSource, Role,
};
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use url::Url;

/// HTTP adapter for every backend collaborator of the console.
///
/// Attaches the stored bearer token when present; a missing token never
/// fails a request, the backend's 401 is the session-expired signal and
/// clears the store. No request is retried automatically.
pub struct HttpBackendGateway {
    http_client: reqwest::Client,
    base_url: String,
    token_store: Arc<dyn SessionTokenStore>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActivityRecordBody {
    description: String,
    status: String,
    occurred_at: String,
    actor_name: String,
    #[serde(default)]
    actor_role: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct WriteBody<'a, T> {
    #[serde(flatten)]
    entity: &'a T,
    notes: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    notes: &'a str,
}

impl HttpBackendGateway {
    /// Creates a gateway against a validated base URL.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        token_store: Arc<dyn SessionTokenStore>,
    ) -> AppResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Url::parse(base_url.as_str())
            .map_err(|error| AppError::Validation(format!("invalid base URL '{base_url}': {error}")))?;

        Ok(Self {
            http_client,
            base_url,
            token_store,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn prepared(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // Body-carrying requests get their JSON content type from `.json()`;
        // a missing token is not an error here, the backend's 401 is the
        // session-expired signal.
        match self.token_store.load() {
            Some(token) => builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.reveal()),
            ),
            None => builder,
        }
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        let response = self
            .prepared(builder)
            .send()
            .await
            .map_err(|error| AppError::Network(format!("transport error: {error}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.token_store.clear();
            return Err(AppError::Unauthorized(
                "backend rejected the session token".to_owned(),
            ));
        }

        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("request failed with status {status}"));
            return Err(AppError::Network(detail));
        }

        Ok(response)
    }

    async fn get_json<B: DeserializeOwned>(&self, path: &str) -> AppResult<B> {
        let response = self.execute(self.http_client.get(self.endpoint(path))).await?;

        response.json::<B>().await.map_err(|error| {
            AppError::Internal(format!("failed to decode response for '{path}': {error}"))
        })
    }
}

#[async_trait]
impl CurrentUserGateway for HttpBackendGateway {
    async fn current_user(&self) -> AppResult<UserProfile> {
        self.get_json("current-user").await
    }
}

#[async_trait]
impl ActivityGateway for HttpBackendGateway {
    async fn list_activity(&self, kind: EntityKind) -> AppResult<Vec<ActivityRecord>> {
        let path = format!("activity/{}", kind.as_str());
        let bodies: Vec<ActivityRecordBody> = self.get_json(path.as_str()).await?;

        // Malformed rows are dropped rather than failing the whole panel;
        // the audit trail is non-fatal to the page around it.
        let mut records = Vec::with_capacity(bodies.len());
        for body in bodies {
            match body.into_record(kind) {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!(
                        kind = kind.as_str(),
                        error = %error,
                        "dropping malformed activity record"
                    );
                }
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl ReferenceDataGateway for HttpBackendGateway {
    async fn fetch_options(&self, source: ReferenceSource) -> AppResult<ReferenceOptionSet> {
        let path = format!("options/{}", source.route_segment());
        let values: Vec<String> = self.get_json(path.as_str()).await?;
        Ok(ReferenceOptionSet::new(source, values))
    }
}

impl ActivityRecordBody {
    fn into_record(self, kind: EntityKind) -> AppResult<ActivityRecord> {
        let id_field = kind.activity_id_field();
        let entity_id = self
            .extra
            .get(id_field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "activity record is missing identifier field '{id_field}'"
                ))
            })?;

        ActivityRecord::new(
            self.description,
            ActivityStatus::from_str(self.status.as_str())?,
            self.occurred_at,
            self.actor_name,
            self.actor_role.as_deref().and_then(Role::parse),
            ActivitySubject::from_parts(kind, entity_id)?,
        )
    }
}

/// HTTP adapter for one entity kind's CRUD endpoint family.
pub struct HttpEntityWriter<T> {
    backend: Arc<HttpBackendGateway>,
    kind: EntityKind,
    _entity: PhantomData<fn() -> T>,
}

impl<T> HttpEntityWriter<T> {
    /// Creates a writer for one entity kind over the shared gateway.
    #[must_use]
    pub fn new(backend: Arc<HttpBackendGateway>, kind: EntityKind) -> Self {
        Self {
            backend,
            kind,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T> EntityWriteGateway<T> for HttpEntityWriter<T>
where
    T: EntityDraft + Serialize + DeserializeOwned,
{
    async fn list_entities(&self) -> AppResult<Vec<StoredEntity<T>>> {
        self.backend.get_json(self.kind.route_segment()).await
    }

    async fn create_entity(&self, draft: &T, notes: &str) -> AppResult<StoredEntity<T>> {
        let path = format!("{}/create", self.kind.route_segment());
        let response = self
            .backend
            .execute(
                self.backend
                    .http_client
                    .post(self.backend.endpoint(path.as_str()))
                    .json(&WriteBody {
                        entity: draft,
                        notes,
                    }),
            )
            .await?;

        response.json::<StoredEntity<T>>().await.map_err(|error| {
            AppError::Internal(format!("failed to decode create response: {error}"))
        })
    }

    async fn update_entity(
        &self,
        entity_id: &str,
        draft: &T,
        notes: &str,
    ) -> AppResult<StoredEntity<T>> {
        let path = format!("{}/update/{entity_id}", self.kind.route_segment());
        let response = self
            .backend
            .execute(
                self.backend
                    .http_client
                    .put(self.backend.endpoint(path.as_str()))
                    .json(&WriteBody {
                        entity: draft,
                        notes,
                    }),
            )
            .await?;

        response.json::<StoredEntity<T>>().await.map_err(|error| {
            AppError::Internal(format!("failed to decode update response: {error}"))
        })
    }

    async fn delete_entity(&self, entity_id: &str, notes: &str) -> AppResult<()> {
        let path = format!("{}/delete/{entity_id}", self.kind.route_segment());
        self.backend
            .execute(
                self.backend
                    .http_client
                    .delete(self.backend.endpoint(path.as_str()))
                    .json(&DeleteBody { notes }),
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use evaldesk_domain::{EntityKind, Role};

    use super::ActivityRecordBody;

    #[test]
    fn activity_body_resolves_the_kind_specific_id_field() {
        let body: ActivityRecordBody = serde_json::from_value(json!({
            "description": "updated target 'support-bot'",
            "status": "updated",
            "occurred_at": "2026-03-02T08:00:00Z",
            "actor_name": "dana",
            "actor_role": "Curator",
            "target_id": "t-9",
        }))
        .unwrap_or_else(|_| unreachable!());

        let record = body.into_record(EntityKind::Target);
        assert!(record.is_ok());

        let record = record.unwrap_or_else(|_| unreachable!());
        assert_eq!(record.subject().id(), "t-9");
        assert_eq!(record.actor_role(), Some(Role::Curator));
    }

    #[test]
    fn activity_body_without_the_id_field_is_rejected() {
        let body: ActivityRecordBody = serde_json::from_value(json!({
            "description": "updated prompt",
            "status": "updated",
            "occurred_at": "2026-03-02T08:00:00Z",
            "actor_name": "dana",
            "prompt_id": "p-1",
        }))
        .unwrap_or_else(|_| unreachable!());

        let record = body.into_record(EntityKind::Target);
        assert!(record.is_err());
    }

    #[test]
    fn unknown_actor_roles_become_unattributed() {
        let body: ActivityRecordBody = serde_json::from_value(json!({
            "description": "created language 'icelandic'",
            "status": "created",
            "occurred_at": "2026-03-02T08:00:00Z",
            "actor_name": "svc-import",
            "actor_role": "service-account",
            "language_id": "lang-is",
        }))
        .unwrap_or_else(|_| unreachable!());

        let record = body.into_record(EntityKind::Language);
        assert!(record.is_ok());
        assert_eq!(
            record.unwrap_or_else(|_| unreachable!()).actor_role(),
            None
        );
    }
}
