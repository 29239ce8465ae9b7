//! Packages always eligible for selection, even when flagged as system apps

use std::collections::HashSet;

/// Popular user-facing apps that some vendors ship as system apps
pub const DEFAULT_ALLOWLISTED_PACKAGES: &[&str] = &[
    "com.android.chrome",
    "com.google.android.youtube",
    "com.google.android.gm",
    "com.google.android.apps.photos",
    "com.google.android.apps.maps",
    "com.google.android.apps.youtube.music",
    "com.facebook.katana",
    "com.instagram.android",
    "com.whatsapp",
    "com.twitter.android",
    "com.spotify.music",
    "com.netflix.mediaclient",
    "com.amazon.avod.thirdpartyclient",
];

/// Immutable set of allowlisted package identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    packages: HashSet<String>,
}

impl Allowlist {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            packages: HashSet::new(),
        }
    }

    /// Default list plus `extra`
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        list.packages.extend(extra.into_iter().map(Into::into));
        list
    }

    pub fn contains(&self, package_name: &str) -> bool {
        self.packages.contains(package_name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Entries in sorted order, for display
    pub fn sorted(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.packages.iter().map(String::as_str).collect();
        entries.sort_unstable();
        entries
    }
}

impl Default for Allowlist {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWLISTED_PACKAGES.iter().copied())
    }
}
