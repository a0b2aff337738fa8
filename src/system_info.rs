use git_version::git_version;
use serde::Serialize;

// include -modified if the working tree has uncommitted changes
const COMMIT: &str = git_version!(
    args = ["--abbrev=10", "--always", "--dirty=-modified"],
    fallback = "unknown"
);

/// Build description served from `/api/info` and logged at startup.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub package: &'static str,
    pub version: String,
    pub commit: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        let profile = if cfg!(debug_assertions) {
            "Dev"
        } else {
            "Release"
        };

        let latest = option_env!("LATEST_TAG").unwrap_or("");
        let ahead = option_env!("COMMITS_AHEAD").unwrap_or("");
        let version = match option_env!("RELEASE_VERSION") {
            Some(tag) if !tag.is_empty() => format!("release {}", tag),
            _ if !latest.is_empty() && !ahead.is_empty() => {
                format!("development branch {} commits ahead of {}", ahead, latest)
            }
            _ if !latest.is_empty() => format!("development branch ahead of {}", latest),
            _ => format!("development {}", env!("CARGO_PKG_VERSION")),
        };

        Self {
            package: env!("CARGO_PKG_NAME"),
            version,
            commit: COMMIT,
            profile,
        }
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} (commit {}, {} build)",
            self.package, self.version, self.commit, self.profile
        )
    }
}
