/// Parsed list filters: free-text search, tag intersection, favorites only.
///
/// Built once from the raw query string and applied uniformly to notes and
/// bookmarks; which fields the text search covers is the caller's choice.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    /// Lowercased search needle, `None` when the `q` parameter was absent or blank.
    pub text: Option<String>,
    /// Requested tags, trimmed and lowercased.
    pub tags: Vec<String>,
    /// Restrict to favorites. Only the literal `favorite=true` sets this.
    pub favorite_only: bool,
}

impl ResourceFilter {
    /// Build a filter from raw query-string parameters.
    ///
    /// `tags` is a comma-separated list; entries are trimmed, lowercased, and
    /// empty entries dropped.
    pub fn from_params(q: Option<&str>, tags: Option<&str>, favorite: Option<&str>) -> Self {
        let text = q
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let tags = tags
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        ResourceFilter {
            text,
            tags,
            favorite_only: favorite == Some("true"),
        }
    }

    /// True when a resource with the given searchable fields, tags, and
    /// favorite flag passes every active filter.
    ///
    /// Text matches as a case-insensitive substring OR across `fields`. Tags
    /// match when the resource's tag set intersects the requested tags; stored
    /// tags are already lowercase.
    pub fn matches(&self, fields: &[&str], tags: &[String], is_favorite: bool) -> bool {
        if self.favorite_only && !is_favorite {
            return false;
        }

        if let Some(ref needle) = self.text {
            if !fields.iter().any(|f| f.to_lowercase().contains(needle)) {
                return false;
            }
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|t| tags.contains(t)) {
            return false;
        }

        true
    }
}
