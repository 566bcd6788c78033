/// A remote repository an extension can be installed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReference {
    pub url: String,
    /// Local directory name, absent for URLs without a usable last segment
    pub derived_name: Option<String>,
}

impl RepoReference {
    pub fn parse(url: impl Into<String>) -> Self {
        let url = url.into();
        let derived_name = Self::derive_name(&url);
        Self { url, derived_name }
    }

    /// Last `/` segment of the URL with a trailing `.git` stripped.
    ///
    /// `https://github.com/user/repo.git` gives `repo`; `https://github.com/user/`
    /// gives `None`.
    pub fn derive_name(url: &str) -> Option<String> {
        let url = url.trim();
        let url = url.split(['?', '#']).next().unwrap_or(url);

        let segment = url.rsplit('/').next()?;
        let name = segment.strip_suffix(".git").unwrap_or(segment);

        match name {
            "" | "." | ".." => None,
            name => Some(name.to_string()),
        }
    }
}
