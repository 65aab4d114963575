//! Application bootstrap: settings, telemetry, REST client, notifier and registry.

use std::sync::Arc;

use anyhow::Context;
use senselib_events::Notifier;
use senselib_http::RestClient;
use senselib_kernel::settings::Settings;
use senselib_kernel::{Collaborator, Entity, EntityDescriptor, EntityRegistry, Id};

use crate::controllers::{ControllerError, DetailForm, Draft, ListController};
use crate::format::Formatter;
use crate::modules;

/// Shared services every screen is built from.
pub struct App {
    settings: Settings,
    client: RestClient,
    notifier: Notifier,
    registry: EntityRegistry,
    formatter: Formatter,
}

impl App {
    /// Load settings from the environment and bootstrap.
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = Settings::load().context("failed to load settings")?;
        Self::bootstrap(settings)
    }

    pub fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        senselib_telemetry::init(&settings.telemetry).context("failed to initialize telemetry")?;

        let client = RestClient::new(&settings.api).context("failed to build REST client")?;
        let notifier = Notifier::new(settings.notifications.capacity);
        let mut registry = EntityRegistry::new();
        modules::register_all(&mut registry).context("failed to register entities")?;
        let formatter = Formatter::new(&settings.display);

        tracing::info!(
            environment = ?settings.environment,
            base_url = %client.base_url(),
            entities = registry.len(),
            page_size = settings.listing.page_size,
            "senselib admin bootstrapped"
        );

        Ok(Self {
            settings,
            client,
            notifier,
            registry,
            formatter,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn descriptor<E: Entity>(&self) -> Result<Arc<EntityDescriptor>, ControllerError> {
        self.registry
            .get(E::NAME)
            .cloned()
            .ok_or(ControllerError::Unregistered(E::NAME))
    }

    /// List controller over the entity's REST endpoints.
    pub fn list<E: Entity>(&self) -> Result<ListController<E>, ControllerError> {
        let descriptor = self.descriptor::<E>()?;
        let collaborator = self.collaborator::<E>(&descriptor);
        Ok(self.list_with(descriptor, collaborator))
    }

    /// List controller over any collaborator, e.g. one user's transactions.
    pub fn list_with<E: Entity>(
        &self,
        descriptor: Arc<EntityDescriptor>,
        collaborator: Arc<dyn Collaborator<E>>,
    ) -> ListController<E> {
        ListController::new(
            descriptor,
            collaborator,
            self.notifier.clone(),
            self.settings.listing.page_size,
        )
    }

    pub fn create_form<D: Draft>(&self) -> Result<DetailForm<D>, ControllerError> {
        let descriptor = self.descriptor::<D::Entity>()?;
        let collaborator = self.collaborator::<D::Entity>(&descriptor);
        Ok(DetailForm::for_create(descriptor, collaborator, self.notifier.clone()))
    }

    pub fn edit_form<D: Draft>(&self, id: Id) -> Result<DetailForm<D>, ControllerError> {
        let descriptor = self.descriptor::<D::Entity>()?;
        let collaborator = self.collaborator::<D::Entity>(&descriptor);
        Ok(DetailForm::for_edit(descriptor, collaborator, self.notifier.clone(), id))
    }

    fn collaborator<E: Entity>(&self, descriptor: &EntityDescriptor) -> Arc<dyn Collaborator<E>> {
        Arc::new(self.client.collaborator::<E>(descriptor.resource()))
    }
}
