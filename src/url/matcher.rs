/// Prefix-based exclusion of discovered links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    prefixes: Vec<String>,
}

impl ExclusionList {
    pub fn new(prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks if a discovered URL starts with any excluded prefix
    ///
    /// # Examples
    ///
    /// ```
    /// use paper_trawl::url::ExclusionList;
    ///
    /// let exclusions = ExclusionList::new(["https://ieeexplore.ieee.org/courses/"]);
    /// assert!(exclusions.is_excluded("https://ieeexplore.ieee.org/courses/details/123"));
    /// assert!(!exclusions.is_excluded("https://ieeexplore.ieee.org/document/8946141/"));
    /// ```
    pub fn is_excluded(&self, url: &str) -> bool {
        self.prefixes.iter().any(|prefix| url.starts_with(prefix.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
