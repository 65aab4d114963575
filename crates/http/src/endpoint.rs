//! URL builder for collaborator endpoints

use senselib_kernel::Id;

/// Builder for URLs under `{base}/api/{resource}`
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    url: String,
}

impl EndpointBuilder {
    /// Start from the collaborator base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Mount a resource under `/api/{resource}`
    pub fn resource(self, resource: &str) -> Self {
        self.segment("api").segment(resource)
    }

    /// Address one record of the resource
    pub fn item(self, id: Id) -> Self {
        self.segment(&id.to_string())
    }

    /// Append a raw path segment
    pub fn segment(mut self, segment: &str) -> Self {
        self.url.push('/');
        self.url.push_str(segment.trim_matches('/'));
        self
    }

    /// Build the final URL
    pub fn build(self) -> String {
        self.url
    }
}
