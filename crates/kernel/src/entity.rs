use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::query::{SortDirection, SortSpec};

/// Backend-assigned identifier shared by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub i64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A record owned by the REST collaborator.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Registry name of the entity, matching its descriptor.
    const NAME: &'static str;

    fn id(&self) -> Id;

    /// Activation flag, for entities that have one.
    fn is_active(&self) -> Option<bool> {
        None
    }

    fn set_active(&mut self, _active: bool) {}

    /// Server-computed count of dependent records; non-zero blocks deletion.
    fn usage_count(&self) -> u64 {
        0
    }
}

/// Check applied to one serialized draft field on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinLength(usize),
    Email,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub message: String,
}

/// Per-entity configuration consumed by the generic controllers.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    name: &'static str,
    label: &'static str,
    resource: &'static str,
    sortable: Vec<&'static str>,
    default_sort: SortSpec,
    toggleable: bool,
    usage_field: Option<&'static str>,
    rules: Vec<FieldRule>,
}

impl EntityDescriptor {
    pub fn builder(name: &'static str) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder::new(name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable singular label used in notifications.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// REST resource segment, mounted under `/api/{resource}`.
    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn sortable(&self) -> &[&'static str] {
        &self.sortable
    }

    /// Resolve a requested sort field to its declared name.
    pub fn sortable_field(&self, field: &str) -> Option<&'static str> {
        self.sortable.iter().copied().find(|name| *name == field)
    }

    pub fn default_sort(&self) -> SortSpec {
        self.default_sort
    }

    pub fn toggleable(&self) -> bool {
        self.toggleable
    }

    pub fn usage_field(&self) -> Option<&'static str> {
        self.usage_field
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

/// Builder for [`EntityDescriptor`].
pub struct EntityDescriptorBuilder {
    descriptor: EntityDescriptor,
}

impl EntityDescriptorBuilder {
    fn new(name: &'static str) -> Self {
        Self {
            descriptor: EntityDescriptor {
                name,
                label: name,
                resource: name,
                sortable: Vec::new(),
                default_sort: SortSpec::new("createdAt", SortDirection::Desc),
                toggleable: false,
                usage_field: None,
                rules: Vec::new(),
            },
        }
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.descriptor.label = label;
        self
    }

    pub fn resource(mut self, resource: &'static str) -> Self {
        self.descriptor.resource = resource;
        self
    }

    pub fn sortable(mut self, fields: impl IntoIterator<Item = &'static str>) -> Self {
        for field in fields {
            if !self.descriptor.sortable.contains(&field) {
                self.descriptor.sortable.push(field);
            }
        }
        self
    }

    pub fn default_sort(mut self, field: &'static str, direction: SortDirection) -> Self {
        self.descriptor.default_sort = SortSpec::new(field, direction);
        self
    }

    /// Entity has an `isActive` flag flipped through the toggle endpoint.
    pub fn toggleable(mut self) -> Self {
        self.descriptor.toggleable = true;
        self
    }

    pub fn usage_field(mut self, field: &'static str) -> Self {
        self.descriptor.usage_field = Some(field);
        self
    }

    pub fn rule(mut self, field: &'static str, rule: Rule, message: impl Into<String>) -> Self {
        self.descriptor.rules.push(FieldRule {
            field,
            rule,
            message: message.into(),
        });
        self
    }

    pub fn required(self, field: &'static str, message: impl Into<String>) -> Self {
        self.rule(field, Rule::Required, message)
    }

    pub fn build(mut self) -> EntityDescriptor {
        // The default sort column is always selectable.
        let default_field = self.descriptor.default_sort.field;
        if !self.descriptor.sortable.contains(&default_field) {
            self.descriptor.sortable.push(default_field);
        }
        self.descriptor
    }
}
