use crate::error::ShellError;
use dayqhi_domain::config::SiteConfig;

pub const DEFAULT_TITLE: &str = "DayQHI";
pub const DEFAULT_DESCRIPTION: &str = "Subscribe to real-time alerts for your local AQHI";

/// Document head information shared by every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub description: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self { title: DEFAULT_TITLE.to_owned(), description: DEFAULT_DESCRIPTION.to_owned() }
    }
}

impl TryFrom<&SiteConfig> for Metadata {
    type Error = ShellError;

    /// Rejects a blank `title` or `description`; both end up in every page head.
    fn try_from(site: &SiteConfig) -> Result<Self, Self::Error> {
        let title = site.title.trim();
        let description = site.description.trim();
        if title.is_empty() {
            return Err(ShellError::config("site.title cannot be blank"));
        }
        if description.is_empty() {
            return Err(ShellError::config("site.description cannot be blank"));
        }
        Ok(Self { title: title.to_owned(), description: description.to_owned() })
    }
}

impl Metadata {
    /// Page fields win when present.
    #[must_use]
    pub fn merge(&self, page: &PageMetadata) -> Self {
        Self {
            title: page.title.clone().unwrap_or_else(|| self.title.clone()),
            description: page.description.clone().unwrap_or_else(|| self.description.clone()),
        }
    }
}

/// Per-page overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PageMetadata {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), description: None }
    }
}
