//! Generic searchable, sortable, paginated list over a collaborator collection.
//!
//! Every fetch takes a request id from a per-controller counter. A response
//! is applied only when its id is still the latest one issued, so the state
//! always reflects the most recently initiated request. Responses that arrive
//! after the controller is disposed are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use senselib_events::Notifier;
use senselib_kernel::query::{clamp_page, total_pages};
use senselib_kernel::{
    ApiError, Collaborator, Entity, EntityDescriptor, Id, ListQuery, Page, Scope, ScopeHandle,
    SortDirection, SortSpec,
};
use tokio::task::JoinHandle;

use super::error::ControllerError;

/// What happened to a fetch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer request was issued before this one resolved.
    Superseded,
    /// The controller was disposed before the response arrived.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<E> {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub sort: SortSpec,
    pub items: Vec<E>,
    pub total_items: u64,
    pub total_pages: u32,
    pub loading: bool,
    pub loaded: bool,
    pub error: Option<String>,
    /// Row whose status toggle is in flight.
    pub toggling: Option<Id>,
}

/// Which branch the list screen renders.
#[derive(Debug, PartialEq)]
pub enum ListView<'a, E> {
    Loading,
    Error(&'a str),
    NoResults,
    Rows(&'a [E]),
}

impl<E: Entity> ListState<E> {
    fn new(sort: SortSpec, page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            sort,
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
            loading: false,
            loaded: false,
            error: None,
            toggling: None,
        }
    }

    pub fn query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            size: self.page_size,
            search: self.search.clone(),
            sort_field: self.sort.field.to_string(),
            sort_direction: self.sort.direction,
        }
    }

    pub fn view(&self) -> ListView<'_, E> {
        if self.loading || !self.loaded {
            return ListView::Loading;
        }
        if let Some(error) = &self.error {
            return ListView::Error(error);
        }
        if self.items.is_empty() {
            ListView::NoResults
        } else {
            ListView::Rows(&self.items)
        }
    }

    /// Delete stays disabled while anything depends on the row.
    pub fn can_delete(&self, row: &E) -> bool {
        row.usage_count() == 0
    }

    pub fn is_toggle_disabled(&self, id: Id) -> bool {
        self.toggling.is_some() || !self.items.iter().any(|row| row.id() == id)
    }

    fn row(&self, id: Id) -> Option<&E> {
        self.items.iter().find(|row| row.id() == id)
    }
}

pub struct ListController<E: Entity> {
    inner: Arc<Inner<E>>,
    scope: Scope,
}

struct Inner<E: Entity> {
    descriptor: Arc<EntityDescriptor>,
    collaborator: Arc<dyn Collaborator<E>>,
    notifier: Notifier,
    state: Mutex<ListState<E>>,
    generation: AtomicU64,
}

impl<E: Entity> ListController<E> {
    pub fn new(
        descriptor: Arc<EntityDescriptor>,
        collaborator: Arc<dyn Collaborator<E>>,
        notifier: Notifier,
        page_size: u32,
    ) -> Self {
        let state = ListState::new(descriptor.default_sort(), page_size);
        Self {
            inner: Arc::new(Inner {
                descriptor,
                collaborator,
                notifier,
                state: Mutex::new(state),
                generation: AtomicU64::new(0),
            }),
            scope: Scope::new(),
        }
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.inner.descriptor
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ListState<E> {
        self.inner.lock().clone()
    }

    /// Fetch with the current parameters, clamping the page if it ran past the end.
    pub async fn refresh(&self) -> Result<FetchOutcome, ControllerError> {
        let scope = self.scope.handle();
        loop {
            let outcome = self.inner.fetch(&scope).await?;
            if outcome != FetchOutcome::Applied || !self.inner.clamp_current_page() {
                return Ok(outcome);
            }
        }
    }

    /// Run a fetch on the runtime; its result is dropped if this controller is gone.
    pub fn spawn_refresh(&self) -> JoinHandle<Result<FetchOutcome, ControllerError>> {
        let inner = Arc::clone(&self.inner);
        let scope = self.scope.handle();
        tokio::spawn(async move { inner.fetch(&scope).await })
    }

    pub async fn set_search(&self, search: impl Into<String>) -> Result<FetchOutcome, ControllerError> {
        {
            let mut state = self.inner.lock();
            state.search = search.into();
            state.page = 1;
        }
        self.refresh().await
    }

    /// Same column flips direction; a new column starts ascending.
    pub async fn sort_by(&self, field: &str) -> Result<FetchOutcome, ControllerError> {
        let field = self
            .inner
            .descriptor
            .sortable_field(field)
            .ok_or_else(|| ControllerError::UnsortableField(field.to_string()))?;

        {
            let mut state = self.inner.lock();
            state.sort = if state.sort.field == field {
                SortSpec::new(field, state.sort.direction.flipped())
            } else {
                SortSpec::new(field, SortDirection::Asc)
            };
            state.page = 1;
        }
        self.refresh().await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<FetchOutcome, ControllerError> {
        {
            let mut state = self.inner.lock();
            state.page = clamp_page(page, state.total_pages);
        }
        self.refresh().await
    }

    pub async fn next_page(&self) -> Result<FetchOutcome, ControllerError> {
        let page = self.inner.lock().page.saturating_add(1);
        self.go_to_page(page).await
    }

    pub async fn previous_page(&self) -> Result<FetchOutcome, ControllerError> {
        let page = self.inner.lock().page.saturating_sub(1);
        self.go_to_page(page).await
    }

    /// Flip one row's activation flag and patch it in place. Returns the new flag.
    ///
    /// Only one row may be mid-toggle at a time.
    pub async fn toggle_active(&self, id: Id) -> Result<bool, ControllerError> {
        let descriptor = &self.inner.descriptor;
        if !descriptor.toggleable() {
            return Err(ControllerError::NotToggleable(descriptor.name()));
        }

        {
            let mut state = self.inner.lock();
            if let Some(current) = state.toggling {
                return Err(ControllerError::ToggleInFlight(current));
            }
            if state.row(id).is_none() {
                return Err(ControllerError::UnknownRow(id));
            }
            state.toggling = Some(id);
        }

        let result = self.inner.collaborator.toggle_active(id).await;
        let scope_open = self.scope.is_open();

        let mut state = self.inner.lock();
        state.toggling = None;

        match result {
            Ok(updated) => {
                let mut active = updated.is_active().unwrap_or_default();
                if let Some(row) = state.items.iter_mut().find(|row| row.id() == id) {
                    active = updated
                        .is_active()
                        .unwrap_or_else(|| !row.is_active().unwrap_or_default());
                    if scope_open {
                        row.set_active(active);
                    }
                }
                drop(state);

                if !scope_open {
                    tracing::debug!(entity = descriptor.name(), %id, "list disposed; toggle result discarded");
                    return Ok(active);
                }
                tracing::info!(entity = descriptor.name(), %id, active, "status toggled");
                let verb = if active { "activated" } else { "deactivated" };
                self.inner
                    .notifier
                    .success(descriptor.label(), format!("{} {} {}", descriptor.label(), id, verb));
                Ok(active)
            }
            Err(error) => {
                drop(state);
                self.inner.report(
                    &format!("Failed to change status of {} {}", descriptor.label(), id),
                    &error,
                );
                Err(error.into())
            }
        }
    }

    /// Delete one row, then re-fetch the page.
    ///
    /// Rows with a non-zero usage count are refused without calling the collaborator.
    /// A failed re-fetch does not fail the delete; it shows up as the list's error state.
    pub async fn delete(&self, id: Id) -> Result<(), ControllerError> {
        let descriptor = &self.inner.descriptor;
        let usage = {
            let state = self.inner.lock();
            state
                .row(id)
                .map(Entity::usage_count)
                .ok_or(ControllerError::UnknownRow(id))?
        };
        if usage > 0 {
            tracing::warn!(entity = descriptor.name(), %id, usage, "delete blocked by usage count");
            return Err(ControllerError::DeleteBlocked {
                entity: descriptor.name(),
                id,
                usage,
            });
        }

        if let Err(error) = self.inner.collaborator.delete(id).await {
            self.inner.report(
                &format!("Failed to delete {} {}", descriptor.label(), id),
                &error,
            );
            return Err(error.into());
        }

        tracing::info!(entity = descriptor.name(), %id, "deleted");
        self.inner
            .notifier
            .success(descriptor.label(), format!("{} {} deleted", descriptor.label(), id));
        if let Err(error) = self.refresh().await {
            tracing::warn!(entity = descriptor.name(), %id, %error, "re-fetch after delete failed");
        }
        Ok(())
    }

    /// Stop applying responses; in-flight work is discarded when it lands.
    pub fn dispose(&self) {
        self.scope.close();
    }
}

impl<E: Entity> Inner<E> {
    fn lock(&self) -> MutexGuard<'_, ListState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self, scope: &ScopeHandle) -> Result<FetchOutcome, ControllerError> {
        let (request_id, query) = self.begin_fetch();
        tracing::debug!(
            entity = self.descriptor.name(),
            request_id,
            page = query.page,
            search = %query.search,
            sort_field = %query.sort_field,
            sort_direction = query.sort_direction.as_str(),
            "fetching page"
        );

        let result = self.collaborator.list(&query).await;
        self.apply_fetch(request_id, result, scope)
    }

    fn begin_fetch(&self) -> (u64, ListQuery) {
        let mut state = self.lock();
        let request_id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.loading = true;
        state.error = None;
        (request_id, state.query())
    }

    fn apply_fetch(
        &self,
        request_id: u64,
        result: Result<Page<E>, ApiError>,
        scope: &ScopeHandle,
    ) -> Result<FetchOutcome, ControllerError> {
        if !scope.is_open() {
            tracing::debug!(entity = self.descriptor.name(), request_id, "list disposed; response discarded");
            return Ok(FetchOutcome::Discarded);
        }

        let mut state = self.lock();
        let latest = self.generation.load(Ordering::SeqCst);
        if request_id != latest {
            tracing::debug!(
                entity = self.descriptor.name(),
                request_id,
                latest,
                "stale response dropped"
            );
            return Ok(FetchOutcome::Superseded);
        }

        state.loading = false;
        state.loaded = true;

        match result {
            Ok(page) => {
                state.total_items = page.total_items;
                state.total_pages = total_pages(page.total_items, state.page_size);
                state.items = page.items;
                state.error = None;
                tracing::debug!(
                    entity = self.descriptor.name(),
                    request_id,
                    rows = state.items.len(),
                    total_items = state.total_items,
                    "page applied"
                );
                Ok(FetchOutcome::Applied)
            }
            Err(error) => {
                state.items.clear();
                state.total_items = 0;
                state.total_pages = 0;
                state.error = Some(error.user_message());
                drop(state);

                self.report(
                    &format!("Failed to load {} list", self.descriptor.label()),
                    &error,
                );
                Err(error.into())
            }
        }
    }

    /// True when the page had to move back inside the range.
    fn clamp_current_page(&self) -> bool {
        let mut state = self.lock();
        let clamped = clamp_page(state.page, state.total_pages);
        if clamped == state.page {
            return false;
        }
        tracing::debug!(
            entity = self.descriptor.name(),
            from = state.page,
            to = clamped,
            "page clamped"
        );
        state.page = clamped;
        true
    }

    fn report(&self, context: &str, error: &ApiError) {
        self.notifier.error(
            self.descriptor.label(),
            format!("{}: {}", context, error.user_message()),
        );
    }
}
