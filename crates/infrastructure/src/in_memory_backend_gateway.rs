use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use evaldesk_application::{
    ActivityGateway, CurrentUserGateway, EntityWriteGateway, ReferenceDataGateway, StoredEntity,
};
use evaldesk_core::{AppError, AppResult, UserProfile};
use evaldesk_domain::{
    ActivityRecord, ActivityStatus, ActivitySubject, EntityDraft, EntityKind, ReferenceOptionSet,
    ReferenceSource, Role,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory stand-in for the evaluation backend.
///
/// Backs tests and the console's offline mode with the same port surface as
/// the HTTP gateway, and stamps an activity record on every mutation the way
/// the real backend does.
#[derive(Default)]
pub struct InMemoryBackendGateway {
    current_user: RwLock<Option<UserProfile>>,
    entities: RwLock<HashMap<(EntityKind, String), Value>>,
    activity: RwLock<Vec<ActivityRecord>>,
    options: RwLock<HashMap<ReferenceSource, Vec<String>>>,
}

impl InMemoryBackendGateway {
    /// Creates an empty backend with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the signed-in user returned by the current-user endpoint.
    pub async fn set_current_user(&self, profile: UserProfile) {
        *self.current_user.write().await = Some(profile);
    }

    /// Seeds the option list for one reference source.
    pub async fn seed_options(&self, source: ReferenceSource, values: Vec<String>) {
        self.options.write().await.insert(source, values);
    }

    async fn append_activity(
        &self,
        kind: EntityKind,
        status: ActivityStatus,
        entity_id: &str,
        notes: &str,
    ) -> AppResult<()> {
        let (actor_name, actor_role) = match self.current_user.read().await.as_ref() {
            Some(profile) => (
                profile.user_name().to_owned(),
                Role::parse(profile.raw_role()),
            ),
            None => ("system".to_owned(), None),
        };

        let record = ActivityRecord::new(
            format!("{} {} '{entity_id}': {notes}", status.as_str(), kind.as_str()),
            status,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            actor_name,
            actor_role,
            ActivitySubject::from_parts(kind, entity_id)?,
        )?;

        self.activity.write().await.push(record);
        Ok(())
    }
}

#[async_trait]
impl CurrentUserGateway for InMemoryBackendGateway {
    async fn current_user(&self) -> AppResult<UserProfile> {
        self.current_user
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::Unauthorized("no active session".to_owned()))
    }
}

#[async_trait]
impl ActivityGateway for InMemoryBackendGateway {
    async fn list_activity(&self, kind: EntityKind) -> AppResult<Vec<ActivityRecord>> {
        let mut records: Vec<ActivityRecord> = self
            .activity
            .read()
            .await
            .iter()
            .filter(|record| record.subject().kind() == kind)
            .cloned()
            .collect();

        records.reverse();
        Ok(records)
    }
}

#[async_trait]
impl ReferenceDataGateway for InMemoryBackendGateway {
    async fn fetch_options(&self, source: ReferenceSource) -> AppResult<ReferenceOptionSet> {
        self.options
            .read()
            .await
            .get(&source)
            .map(|values| ReferenceOptionSet::new(source, values.clone()))
            .ok_or_else(|| {
                AppError::NotFound(format!("no option list seeded for '{}'", source.as_str()))
            })
    }
}

/// In-memory adapter for one entity kind's CRUD family.
pub struct InMemoryEntityWriter<T> {
    backend: Arc<InMemoryBackendGateway>,
    kind: EntityKind,
    _entity: PhantomData<fn() -> T>,
}

impl<T> InMemoryEntityWriter<T> {
    /// Creates a writer for one entity kind over the shared backend.
    #[must_use]
    pub fn new(backend: Arc<InMemoryBackendGateway>, kind: EntityKind) -> Self {
        Self {
            backend,
            kind,
            _entity: PhantomData,
        }
    }

    fn encode(draft: &T) -> AppResult<Value>
    where
        T: Serialize,
    {
        serde_json::to_value(draft)
            .map_err(|error| AppError::Internal(format!("failed to encode entity: {error}")))
    }

    fn decode(value: &Value) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(value.clone())
            .map_err(|error| AppError::Internal(format!("failed to decode entity: {error}")))
    }
}

#[async_trait]
impl<T> EntityWriteGateway<T> for InMemoryEntityWriter<T>
where
    T: EntityDraft + Serialize + DeserializeOwned,
{
    async fn list_entities(&self) -> AppResult<Vec<StoredEntity<T>>> {
        let entities = self.backend.entities.read().await;

        let mut listed = Vec::new();
        for ((kind, entity_id), value) in entities.iter() {
            if *kind != self.kind {
                continue;
            }

            listed.push(StoredEntity {
                entity_id: entity_id.clone(),
                entity: Self::decode(value)?,
            });
        }

        listed.sort_by(|left, right| left.entity_id.cmp(&right.entity_id));
        Ok(listed)
    }

    async fn create_entity(&self, draft: &T, notes: &str) -> AppResult<StoredEntity<T>> {
        let entity_id = Uuid::new_v4().to_string();
        let encoded = Self::encode(draft)?;

        self.backend
            .entities
            .write()
            .await
            .insert((self.kind, entity_id.clone()), encoded);

        self.backend
            .append_activity(self.kind, ActivityStatus::Created, entity_id.as_str(), notes)
            .await?;

        Ok(StoredEntity {
            entity_id,
            entity: draft.clone(),
        })
    }

    async fn update_entity(
        &self,
        entity_id: &str,
        draft: &T,
        notes: &str,
    ) -> AppResult<StoredEntity<T>> {
        let key = (self.kind, entity_id.to_owned());
        let encoded = Self::encode(draft)?;

        {
            let mut entities = self.backend.entities.write().await;
            if !entities.contains_key(&key) {
                return Err(AppError::NotFound(format!(
                    "{} '{entity_id}' does not exist",
                    self.kind.as_str()
                )));
            }

            entities.insert(key, encoded);
        }

        self.backend
            .append_activity(self.kind, ActivityStatus::Updated, entity_id, notes)
            .await?;

        Ok(StoredEntity {
            entity_id: entity_id.to_owned(),
            entity: draft.clone(),
        })
    }

    async fn delete_entity(&self, entity_id: &str, notes: &str) -> AppResult<()> {
        let removed = self
            .backend
            .entities
            .write()
            .await
            .remove(&(self.kind, entity_id.to_owned()));

        if removed.is_none() {
            return Err(AppError::NotFound(format!(
                "{} '{entity_id}' does not exist",
                self.kind.as_str()
            )));
        }

        self.backend
            .append_activity(self.kind, ActivityStatus::Deleted, entity_id, notes)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use evaldesk_application::{ActivityGateway, CurrentUserGateway, EntityWriteGateway};
    use evaldesk_core::UserProfile;
    use evaldesk_domain::{ActivityStatus, EntityKind, LanguageDraft, Role};

    use super::{InMemoryBackendGateway, InMemoryEntityWriter};

    fn icelandic() -> LanguageDraft {
        LanguageDraft {
            name: "Icelandic".to_owned(),
            code: "is".to_owned(),
        }
    }

    #[tokio::test]
    async fn current_user_requires_a_session() {
        let backend = InMemoryBackendGateway::new();
        assert!(backend.current_user().await.is_err());

        backend
            .set_current_user(UserProfile::new("erin", None, "manager"))
            .await;
        assert!(backend.current_user().await.is_ok());
    }

    #[tokio::test]
    async fn every_mutation_appends_one_activity_record() {
        let backend = Arc::new(InMemoryBackendGateway::new());
        backend
            .set_current_user(UserProfile::new("erin", None, "manager"))
            .await;
        let writer = InMemoryEntityWriter::<LanguageDraft>::new(backend.clone(), EntityKind::Language);

        let created = writer.create_entity(&icelandic(), "expanding coverage").await;
        assert!(created.is_ok());
        let created = created.unwrap_or_else(|_| unreachable!());

        let mut revised = icelandic();
        revised.name = "Icelandic (islenska)".to_owned();
        let updated = writer
            .update_entity(created.entity_id.as_str(), &revised, "native spelling")
            .await;
        assert!(updated.is_ok());

        let deleted = writer
            .delete_entity(created.entity_id.as_str(), "merged into nordic set")
            .await;
        assert!(deleted.is_ok());

        let records = backend.list_activity(EntityKind::Language).await;
        assert!(records.is_ok());
        let records = records.unwrap_or_default();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].status(), ActivityStatus::Deleted);
        assert_eq!(records[2].status(), ActivityStatus::Created);
        assert_eq!(records[0].actor_role(), Some(Role::Manager));
        assert!(records[0].description().contains("merged into nordic set"));
    }

    #[tokio::test]
    async fn updating_a_missing_entity_is_not_found() {
        let backend = Arc::new(InMemoryBackendGateway::new());
        let writer = InMemoryEntityWriter::<LanguageDraft>::new(backend, EntityKind::Language);

        let updated = writer.update_entity("missing", &icelandic(), "notes").await;
        assert!(updated.is_err());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_writer_kind() {
        let backend = Arc::new(InMemoryBackendGateway::new());
        let languages =
            InMemoryEntityWriter::<LanguageDraft>::new(backend.clone(), EntityKind::Language);

        let created = languages.create_entity(&icelandic(), "seed").await;
        assert!(created.is_ok());

        let listed = languages.list_entities().await;
        assert!(listed.is_ok());
        assert_eq!(listed.unwrap_or_default().len(), 1);
    }
}
