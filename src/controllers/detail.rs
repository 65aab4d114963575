//! Generic create/edit form over a single collaborator entity.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use senselib_events::Notifier;
use senselib_kernel::{ApiError, Collaborator, Entity, EntityDescriptor, Id, Scope};
use serde::Serialize;
use serde_json::Value;

use super::error::ControllerError;
use super::validation::{validate, FieldErrors};

/// Editable local copy of an entity's user-facing fields.
pub trait Draft: Clone + Default + fmt::Debug + Serialize + Send + Sync + 'static {
    type Entity: Entity;

    fn from_entity(entity: &Self::Entity) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Created(Id),
    Updated(Id),
    Deleted(Id),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Loading,
    Ready,
    Submitting,
    TogglingStatus,
    ConfirmingDelete,
    Deleting,
    /// The entity could not be fetched. Terminal.
    Errored(String),
    Done(FormOutcome),
}

impl FormPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FormPhase::Loading => "loading",
            FormPhase::Ready => "ready",
            FormPhase::Submitting => "submitting",
            FormPhase::TogglingStatus => "toggling status",
            FormPhase::ConfirmingDelete => "confirming delete",
            FormPhase::Deleting => "deleting",
            FormPhase::Errored(_) => "errored",
            FormPhase::Done(_) => "done",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState<D: Draft> {
    /// `None` until the entity exists on the backend.
    pub id: Option<Id>,
    pub phase: FormPhase,
    pub draft: D,
    /// Last copy received from the collaborator.
    pub entity: Option<D::Entity>,
    pub errors: FieldErrors,
}

pub struct DetailForm<D: Draft> {
    descriptor: Arc<EntityDescriptor>,
    collaborator: Arc<dyn Collaborator<D::Entity>>,
    notifier: Notifier,
    state: Mutex<FormState<D>>,
    scope: Scope,
}

impl<D: Draft> DetailForm<D> {
    /// Empty form for a new entity, ready for input.
    pub fn for_create(
        descriptor: Arc<EntityDescriptor>,
        collaborator: Arc<dyn Collaborator<D::Entity>>,
        notifier: Notifier,
    ) -> Self {
        Self::with_state(descriptor, collaborator, notifier, None, FormPhase::Ready)
    }

    /// Form for an existing entity. Call [`DetailForm::load`] before editing.
    pub fn for_edit(
        descriptor: Arc<EntityDescriptor>,
        collaborator: Arc<dyn Collaborator<D::Entity>>,
        notifier: Notifier,
        id: Id,
    ) -> Self {
        Self::with_state(descriptor, collaborator, notifier, Some(id), FormPhase::Loading)
    }

    fn with_state(
        descriptor: Arc<EntityDescriptor>,
        collaborator: Arc<dyn Collaborator<D::Entity>>,
        notifier: Notifier,
        id: Option<Id>,
        phase: FormPhase,
    ) -> Self {
        Self {
            descriptor,
            collaborator,
            notifier,
            state: Mutex::new(FormState {
                id,
                phase,
                draft: D::default(),
                entity: None,
                errors: FieldErrors::new(),
            }),
            scope: Scope::new(),
        }
    }

    pub fn state(&self) -> FormState<D> {
        self.lock().clone()
    }

    pub fn phase(&self) -> FormPhase {
        self.lock().phase.clone()
    }

    pub fn draft(&self) -> D {
        self.lock().draft.clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.lock().errors.clone()
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    /// Fetch the entity being edited. A failure leaves the form errored.
    pub async fn load(&self) -> Result<(), ControllerError> {
        let id = {
            let state = self.lock();
            match (&state.phase, state.id) {
                (FormPhase::Loading, Some(id)) => id,
                (phase, _) => return Err(invalid("load", phase)),
            }
        };

        let result = self.collaborator.get(id).await;
        if self.discarded("load") {
            return Ok(());
        }

        let mut state = self.lock();
        match result {
            Ok(entity) => {
                state.draft = D::from_entity(&entity);
                state.entity = Some(entity);
                state.phase = FormPhase::Ready;
                tracing::debug!(entity = self.descriptor.name(), %id, "form loaded");
                Ok(())
            }
            Err(error) => {
                state.phase = FormPhase::Errored(error.user_message());
                drop(state);
                self.report(&format!("Failed to load {} {}", self.descriptor.label(), id), &error);
                Err(error.into())
            }
        }
    }

    /// Change the draft. Clears the error of `field` and nothing else.
    pub fn edit(&self, field: &str, apply: impl FnOnce(&mut D)) -> Result<(), ControllerError> {
        let mut state = self.lock();
        if state.phase != FormPhase::Ready {
            return Err(invalid("edit", &state.phase));
        }
        apply(&mut state.draft);
        state.errors.remove(field);
        Ok(())
    }

    /// Validate, then create or update.
    ///
    /// Client-side validation failures never reach the collaborator.
    pub async fn submit(&self) -> Result<FormOutcome, ControllerError> {
        let (id, payload) = {
            let mut state = self.lock();
            if state.phase != FormPhase::Ready {
                return Err(invalid("submit", &state.phase));
            }

            let payload = draft_payload(&state.draft)?;
            let errors = validate(&self.descriptor, &payload);
            if !errors.is_empty() {
                tracing::debug!(
                    entity = self.descriptor.name(),
                    fields = errors.len(),
                    "submit rejected by validation"
                );
                state.errors = errors.clone();
                return Err(ControllerError::Validation(errors));
            }

            state.errors.clear();
            state.phase = FormPhase::Submitting;
            (state.id, payload)
        };

        let result = match id {
            Some(id) => self.collaborator.update(id, &payload).await,
            None => self.collaborator.create(&payload).await,
        };
        let outcome_of = |entity: &D::Entity| match id {
            Some(_) => FormOutcome::Updated(entity.id()),
            None => FormOutcome::Created(entity.id()),
        };
        if self.discarded("submit") {
            return result
                .map(|entity| outcome_of(&entity))
                .map_err(ControllerError::from);
        }

        let mut state = self.lock();
        match result {
            Ok(entity) => {
                let outcome = outcome_of(&entity);
                let saved = entity.id();
                state.id = Some(saved);
                state.draft = D::from_entity(&entity);
                state.entity = Some(entity);
                state.phase = FormPhase::Done(outcome);
                drop(state);

                let verb = if id.is_some() { "updated" } else { "created" };
                tracing::info!(entity = self.descriptor.name(), id = %saved, verb, "form submitted");
                self.notifier.success(
                    self.descriptor.label(),
                    format!("{} {} {}", self.descriptor.label(), saved, verb),
                );
                Ok(outcome)
            }
            Err(error) => {
                state.errors = FieldErrors::from_api_error(&error);
                state.phase = FormPhase::Ready;
                drop(state);
                self.report(&format!("Failed to save {}", self.descriptor.label()), &error);
                Err(error.into())
            }
        }
    }

    /// Flip the activation flag of the loaded entity. Returns the new flag.
    pub async fn toggle_active(&self) -> Result<bool, ControllerError> {
        if !self.descriptor.toggleable() {
            return Err(ControllerError::NotToggleable(self.descriptor.name()));
        }

        let id = {
            let mut state = self.lock();
            let id = match (&state.phase, &state.entity) {
                (FormPhase::Ready, Some(entity)) => entity.id(),
                (phase, _) => return Err(invalid("toggle status", phase)),
            };
            state.phase = FormPhase::TogglingStatus;
            id
        };

        let result = self.collaborator.toggle_active(id).await;
        if self.discarded("toggle status") {
            return result
                .map(|entity| entity.is_active().unwrap_or_default())
                .map_err(ControllerError::from);
        }

        let mut state = self.lock();
        state.phase = FormPhase::Ready;
        match result {
            Ok(entity) => {
                let active = entity.is_active().unwrap_or_default();
                state.entity = Some(entity);
                drop(state);

                tracing::info!(entity = self.descriptor.name(), %id, active, "status toggled");
                let verb = if active { "activated" } else { "deactivated" };
                self.notifier.success(
                    self.descriptor.label(),
                    format!("{} {} {}", self.descriptor.label(), id, verb),
                );
                Ok(active)
            }
            Err(error) => {
                state.errors.set_form(error.user_message());
                drop(state);
                self.report(
                    &format!("Failed to change status of {} {}", self.descriptor.label(), id),
                    &error,
                );
                Err(error.into())
            }
        }
    }

    /// Delete stays disabled while anything depends on the entity.
    ///
    /// Answers for both the delete trigger and the confirm button.
    pub fn can_delete(&self) -> bool {
        let state = self.lock();
        matches!(state.phase, FormPhase::Ready | FormPhase::ConfirmingDelete)
            && state
                .entity
                .as_ref()
                .is_some_and(|entity| entity.usage_count() == 0)
    }

    /// Open the delete confirmation.
    pub fn request_delete(&self) -> Result<(), ControllerError> {
        let mut state = self.lock();
        let entity = match (&state.phase, &state.entity) {
            (FormPhase::Ready, Some(entity)) => entity,
            (phase, _) => return Err(invalid("delete", phase)),
        };
        self.ensure_unused(entity)?;
        state.phase = FormPhase::ConfirmingDelete;
        Ok(())
    }

    pub fn cancel_delete(&self) -> Result<(), ControllerError> {
        let mut state = self.lock();
        if state.phase != FormPhase::ConfirmingDelete {
            return Err(invalid("cancel delete", &state.phase));
        }
        state.phase = FormPhase::Ready;
        Ok(())
    }

    /// Delete after re-reading the usage count from the collaborator.
    pub async fn confirm_delete(&self) -> Result<FormOutcome, ControllerError> {
        let id = {
            let mut state = self.lock();
            let id = match (&state.phase, state.id) {
                (FormPhase::ConfirmingDelete, Some(id)) => id,
                (phase, _) => return Err(invalid("confirm delete", phase)),
            };
            state.phase = FormPhase::Deleting;
            id
        };

        let mut current = None;
        let result = match self.collaborator.get(id).await {
            Ok(entity) => {
                let checked = self.ensure_unused(&entity);
                current = Some(entity);
                match checked {
                    Ok(()) => self.collaborator.delete(id).await.map_err(ControllerError::from),
                    Err(blocked) => Err(blocked),
                }
            }
            Err(error) => Err(error.into()),
        };
        if self.discarded("delete") {
            return result.map(|()| FormOutcome::Deleted(id));
        }

        let mut state = self.lock();
        match result {
            Ok(()) => {
                let outcome = FormOutcome::Deleted(id);
                state.phase = FormPhase::Done(outcome);
                drop(state);

                tracing::info!(entity = self.descriptor.name(), %id, "deleted");
                self.notifier.success(
                    self.descriptor.label(),
                    format!("{} {} deleted", self.descriptor.label(), id),
                );
                Ok(outcome)
            }
            Err(ControllerError::Api(error)) => {
                state.errors.set_form(error.user_message());
                state.phase = FormPhase::Ready;
                drop(state);
                self.report(&format!("Failed to delete {} {}", self.descriptor.label(), id), &error);
                Err(error.into())
            }
            Err(blocked @ ControllerError::DeleteBlocked { .. }) => {
                if let Some(entity) = current {
                    state.entity = Some(entity);
                }
                state.errors.set_form(blocked.to_string());
                state.phase = FormPhase::Ready;
                drop(state);
                self.notifier.error(self.descriptor.label(), blocked.to_string());
                Err(blocked)
            }
            Err(other) => {
                state.phase = FormPhase::Ready;
                Err(other)
            }
        }
    }

    /// Stop applying responses to this form.
    pub fn dispose(&self) {
        self.scope.close();
    }

    fn ensure_unused(&self, entity: &D::Entity) -> Result<(), ControllerError> {
        let usage = entity.usage_count();
        if usage == 0 {
            return Ok(());
        }
        tracing::warn!(
            entity = self.descriptor.name(),
            id = %entity.id(),
            usage,
            "delete blocked by usage count"
        );
        Err(ControllerError::DeleteBlocked {
            entity: self.descriptor.name(),
            id: entity.id(),
            usage,
        })
    }

    fn discarded(&self, action: &str) -> bool {
        if self.scope.is_open() {
            return false;
        }
        tracing::debug!(entity = self.descriptor.name(), action, "form disposed; response discarded");
        true
    }

    fn report(&self, context: &str, error: &ApiError) {
        self.notifier.error(
            self.descriptor.label(),
            format!("{}: {}", context, error.user_message()),
        );
    }

    fn lock(&self) -> MutexGuard<'_, FormState<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn invalid(action: &'static str, phase: &FormPhase) -> ControllerError {
    ControllerError::InvalidPhase {
        action,
        phase: phase.name(),
    }
}

/// JSON body sent to the collaborator for a draft.
pub fn draft_payload<T: Serialize + ?Sized>(draft: &T) -> Result<Value, ApiError> {
    serde_json::to_value(draft).map_err(|e| ApiError::Internal(anyhow::Error::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCollaborator, Operation};
    use crate::testing::{descriptor, genre, genres, Genre, GenreDraft};
    use senselib_events::Level;
    use serde_json::json;

    fn create_form(
        store: &Arc<MemoryCollaborator<Genre>>,
    ) -> (DetailForm<GenreDraft>, Notifier) {
        let notifier = Notifier::new(16);
        let form = DetailForm::<GenreDraft>::for_create(descriptor(), store.clone(), notifier.clone());
        (form, notifier)
    }

    async fn edit_form(store: &Arc<MemoryCollaborator<Genre>>, id: i64) -> DetailForm<GenreDraft> {
        let form = DetailForm::<GenreDraft>::for_edit(descriptor(), store.clone(), Notifier::new(16), Id(id));
        form.load().await.unwrap();
        form
    }

    #[tokio::test]
    async fn empty_required_fields_block_submit_without_network() {
        let store = Arc::new(MemoryCollaborator::new(genres(1)));
        let (form, _) = create_form(&store);

        let error = form.submit().await.unwrap_err();
        let ControllerError::Validation(errors) = error else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(form.errors(), errors);
        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(store.calls(Operation::Create), 0);
    }

    #[tokio::test]
    async fn create_submits_and_finishes() {
        let store = Arc::new(MemoryCollaborator::new(genres(2)));
        let (form, notifier) = create_form(&store);

        form.edit("name", |d| d.name = "Drama".to_string()).unwrap();
        let outcome = form.submit().await.unwrap();

        assert_eq!(outcome, FormOutcome::Created(Id(3)));
        assert_eq!(form.phase(), FormPhase::Done(outcome));
        assert_eq!(form.state().id, Some(Id(3)));
        assert_eq!(store.records().len(), 3);
        assert_eq!(notifier.pending_notifications()[0].level, Level::Success);
        assert!(form.edit("name", |d| d.name.clear()).is_err());
    }

    #[tokio::test]
    async fn edit_loads_then_updates() {
        let store = Arc::new(MemoryCollaborator::new(vec![genre(4, "Poetry", 0)]));
        let form = edit_form(&store, 4).await;
        assert_eq!(form.draft().name, "Poetry");

        form.edit("description", |d| d.description = "Verse".to_string())
            .unwrap();
        assert_eq!(form.submit().await.unwrap(), FormOutcome::Updated(Id(4)));
        assert_eq!(store.records()[0].description, "Verse");
        assert_eq!(store.calls(Operation::Create), 0);
    }

    #[tokio::test]
    async fn failed_load_is_terminal() {
        let store = Arc::new(MemoryCollaborator::new(genres(1)));
        let notifier = Notifier::new(4);
        let form =
            DetailForm::<GenreDraft>::for_edit(descriptor(), store.clone(), notifier.clone(), Id(9));

        assert!(form.load().await.is_err());
        assert!(matches!(form.phase(), FormPhase::Errored(message) if message.contains("does not exist")));
        assert!(matches!(
            form.submit().await,
            Err(ControllerError::InvalidPhase { action: "submit", phase: "errored" })
        ));
        assert!(form.load().await.is_err());
        assert_eq!(store.calls(Operation::Get), 1);
        assert_eq!(notifier.pending_notifications()[0].level, Level::Error);
    }

    #[tokio::test]
    async fn server_field_errors_map_and_clear_one_at_a_time() {
        let store = Arc::new(MemoryCollaborator::new(genres(1)));
        let (form, _) = create_form(&store);
        store.fail_next(
            Operation::Create,
            ApiError::validation(
                vec![
                    json!({"field": "name", "error": "already exists"}),
                    json!({"field": "description", "error": "too long"}),
                ],
                "Could not save genre",
            ),
        );

        form.edit("name", |d| d.name = "Genre 01".to_string()).unwrap();
        assert!(form.submit().await.is_err());
        let errors = form.errors();
        assert_eq!(errors.get("name"), Some("already exists"));
        assert_eq!(errors.get("description"), Some("too long"));
        assert_eq!(errors.form(), Some("Could not save genre"));
        assert_eq!(form.phase(), FormPhase::Ready);

        form.edit("name", |d| d.name = "Genre 99".to_string()).unwrap();
        let errors = form.errors();
        assert!(!errors.contains("name"));
        assert!(errors.contains("description"));
    }

    #[tokio::test]
    async fn toggle_status_returns_to_ready() {
        let store = Arc::new(MemoryCollaborator::new(genres(1)));
        let form = edit_form(&store, 1).await;

        assert!(!form.toggle_active().await.unwrap());
        assert_eq!(form.phase(), FormPhase::Ready);
        assert!(form.toggle_active().await.unwrap());

        store.fail_next(Operation::ToggleActive, ApiError::transport("offline"));
        assert!(form.toggle_active().await.is_err());
        let state = form.state();
        assert_eq!(state.phase, FormPhase::Ready);
        assert_eq!(state.entity.map(|g| g.is_active), Some(true));
        assert_eq!(state.errors.form(), Some("The server could not be reached"));
    }

    #[tokio::test]
    async fn delete_is_refused_at_request_while_in_use() {
        let store = Arc::new(MemoryCollaborator::new(vec![genre(1, "Fiction", 3)]));
        let form = edit_form(&store, 1).await;

        assert!(!form.can_delete());
        assert!(matches!(
            form.request_delete(),
            Err(ControllerError::DeleteBlocked { usage: 3, .. })
        ));
        assert_eq!(form.phase(), FormPhase::Ready);
    }

    #[tokio::test]
    async fn confirmation_rechecks_usage() {
        let store = Arc::new(MemoryCollaborator::new(vec![genre(1, "Fiction", 0)]));
        let notifier = Notifier::new(16);
        let form =
            DetailForm::<GenreDraft>::for_edit(descriptor(), store.clone(), notifier.clone(), Id(1));
        form.load().await.unwrap();
        assert!(form.can_delete());
        form.request_delete().unwrap();

        store.update(Id(1), &json!({"booksCount": 2})).await.unwrap();
        assert!(matches!(
            form.confirm_delete().await,
            Err(ControllerError::DeleteBlocked { usage: 2, .. })
        ));
        assert_eq!(form.phase(), FormPhase::Ready);
        assert!(!form.can_delete());
        assert_eq!(store.calls(Operation::Delete), 0);

        let banner = form.errors().form().map(str::to_string).unwrap();
        assert!(banner.contains("cannot be deleted"), "{banner}");
        let pending = notifier.pending_notifications();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].level, Level::Error);
    }

    #[tokio::test]
    async fn confirm_button_follows_usage_count() {
        let store = Arc::new(MemoryCollaborator::new(vec![
            genre(1, "Unused", 0),
            genre(2, "Used", 0),
        ]));
        let unused = edit_form(&store, 1).await;
        unused.request_delete().unwrap();
        assert_eq!(unused.phase(), FormPhase::ConfirmingDelete);
        assert!(unused.can_delete());

        let used = edit_form(&store, 2).await;
        used.request_delete().unwrap();
        store.update(Id(2), &json!({"booksCount": 1})).await.unwrap();
        assert!(used.confirm_delete().await.is_err());
        used.request_delete().unwrap_err();
        assert!(!used.can_delete());
    }

    #[tokio::test]
    async fn disposed_form_keeps_state_when_delete_is_blocked() {
        let store = Arc::new(MemoryCollaborator::new(vec![genre(1, "Fiction", 0)]));
        let notifier = Notifier::new(16);
        let form =
            DetailForm::<GenreDraft>::for_edit(descriptor(), store.clone(), notifier.clone(), Id(1));
        form.load().await.unwrap();
        form.request_delete().unwrap();

        store.update(Id(1), &json!({"booksCount": 5})).await.unwrap();
        form.dispose();
        assert!(form.confirm_delete().await.is_err());

        let state = form.state();
        assert_eq!(state.phase, FormPhase::Deleting);
        assert_eq!(state.entity.map(|g| g.books_count), Some(0));
        assert!(state.errors.is_empty());
        assert!(notifier.pending_notifications().is_empty());
    }

    #[tokio::test]
    async fn cancel_then_confirm_delete() {
        let store = Arc::new(MemoryCollaborator::new(genres(2)));
        let form = edit_form(&store, 2).await;

        form.request_delete().unwrap();
        assert_eq!(form.phase(), FormPhase::ConfirmingDelete);
        form.cancel_delete().unwrap();
        assert_eq!(form.phase(), FormPhase::Ready);

        form.request_delete().unwrap();
        assert_eq!(form.confirm_delete().await.unwrap(), FormOutcome::Deleted(Id(2)));
        assert_eq!(form.phase(), FormPhase::Done(FormOutcome::Deleted(Id(2))));
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn failed_delete_returns_to_ready_with_banner() {
        let store = Arc::new(MemoryCollaborator::new(genres(1)));
        let form = edit_form(&store, 1).await;
        store.fail_next(Operation::Delete, ApiError::forbidden("Admins only"));

        form.request_delete().unwrap();
        assert!(form.confirm_delete().await.is_err());
        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(form.errors().form(), Some("Admins only"));
    }

    #[tokio::test]
    async fn disposed_form_ignores_the_fetched_entity() {
        let store = Arc::new(MemoryCollaborator::new(genres(1)));
        let form =
            DetailForm::<GenreDraft>::for_edit(descriptor(), store.clone(), Notifier::new(4), Id(1));

        form.dispose();
        form.load().await.unwrap();
        assert_eq!(form.phase(), FormPhase::Loading);
        assert!(form.state().entity.is_none());
    }
}
