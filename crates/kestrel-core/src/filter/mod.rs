use crate::har::TimedEntry;

/// Selects which HAR entries count towards metrics
///
/// All conditions are combined with AND logic. An empty filter matches
/// every entry.
#[derive(Debug, Default, Clone)]
pub struct EntryFilter {
    /// HTTP method (stored uppercase)
    pub method: Option<String>,
    /// Substring that must appear in the request URL
    pub url_contains: Option<String>,
    /// DevTools resource type (stored lowercase)
    pub resource_type: Option<String>,
}

impl EntryFilter {
    /// Create a filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set method filter (case-insensitive)
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into().to_uppercase());
        self
    }

    /// Set URL substring filter (case-sensitive)
    pub fn with_url_contains(mut self, pattern: impl Into<String>) -> Self {
        self.url_contains = Some(pattern.into());
        self
    }

    /// Set resource type filter (case-insensitive)
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into().to_lowercase());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.method.is_none() && self.url_contains.is_none() && self.resource_type.is_none()
    }

    /// Check if an entry matches all filter criteria.
    ///
    /// An entry lacking the field a condition looks at does not match that
    /// condition.
    pub fn matches(&self, entry: &TimedEntry) -> bool {
        self.matches_method(entry) && self.matches_url(entry) && self.matches_resource_type(entry)
    }

    fn matches_method(&self, entry: &TimedEntry) -> bool {
        match &self.method {
            None => true,
            Some(method) => entry
                .method()
                .is_some_and(|m| m.eq_ignore_ascii_case(method)),
        }
    }

    fn matches_url(&self, entry: &TimedEntry) -> bool {
        match &self.url_contains {
            None => true,
            Some(pattern) => entry.url().is_some_and(|u| u.contains(pattern.as_str())),
        }
    }

    fn matches_resource_type(&self, entry: &TimedEntry) -> bool {
        match &self.resource_type {
            None => true,
            Some(kind) => entry
                .resource_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(kind)),
        }
    }
}
