use std::path::{Path, PathBuf};

pub const PUBSPEC_FILE: &str = "pubspec.yaml";
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Which of the two packages a package reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PackageRole {
    /// The base library.
    Source,
    /// The package declaring a `^version` dependency on the source package.
    Dependent,
}

impl PackageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Dependent => "dependent",
        }
    }
}

impl std::fmt::Display for PackageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package as configured: its registry name and its directory relative to
/// the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub dir: String,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>, dir: impl Into<String>) -> Self {
        let dir = dir.into();
        Self {
            name: name.into(),
            dir: dir.trim_end_matches('/').to_string(),
        }
    }

    /// `true` when a repository-relative path lives inside this package.
    pub fn contains_path(&self, path: &str) -> bool {
        path.strip_prefix(self.dir.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// The two packages of the repository, anchored at its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub source: PackageSpec,
    pub dependent: PackageSpec,
}

impl ProjectLayout {
    pub fn package(&self, role: PackageRole) -> &PackageSpec {
        match role {
            PackageRole::Source => &self.source,
            PackageRole::Dependent => &self.dependent,
        }
    }

    /// Packages in publish order: the source package first.
    pub fn packages(&self) -> [(PackageRole, &PackageSpec); 2] {
        [
            (PackageRole::Source, &self.source),
            (PackageRole::Dependent, &self.dependent),
        ]
    }

    pub fn package_dir(&self, role: PackageRole) -> PathBuf {
        self.root.join(&self.package(role).dir)
    }

    pub fn pubspec_path(&self, role: PackageRole) -> PathBuf {
        self.package_dir(role).join(PUBSPEC_FILE)
    }

    pub fn changelog_path(&self, role: PackageRole) -> PathBuf {
        self.package_dir(role).join(CHANGELOG_FILE)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A commit as seen by changelog generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    /// First line of the commit message.
    pub summary: String,
    /// Repository-relative paths changed against the first parent; empty for
    /// root commits.
    pub paths: Vec<String>,
}

impl CommitRecord {
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

/// Packages a commit is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Affected {
    pub source: bool,
    pub dependent: bool,
}

impl Affected {
    pub const NONE: Self = Self {
        source: false,
        dependent: false,
    };
    pub const SOURCE: Self = Self {
        source: true,
        dependent: false,
    };
    pub const DEPENDENT: Self = Self {
        source: false,
        dependent: true,
    };
    pub const BOTH: Self = Self {
        source: true,
        dependent: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.source && !self.dependent
    }

    pub fn contains(&self, role: PackageRole) -> bool {
        match role {
            PackageRole::Source => self.source,
            PackageRole::Dependent => self.dependent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_path_requires_directory_boundary() {
        let spec = PackageSpec::new("dart_object_extension", "dart_object_extension/");
        assert_eq!(spec.dir, "dart_object_extension");
        assert!(spec.contains_path("dart_object_extension/lib/x.dart"));
        assert!(!spec.contains_path("dart_object_extension_gen/lib/x.dart"));
        assert!(!spec.contains_path("dart_object_extension"));
        assert!(!spec.contains_path("README.md"));
    }

    #[test]
    fn layout_paths_are_rooted() {
        let layout = ProjectLayout {
            root: PathBuf::from("/repo"),
            source: PackageSpec::new("a", "pkgs/a"),
            dependent: PackageSpec::new("b", "pkgs/b"),
        };
        assert_eq!(
            layout.pubspec_path(PackageRole::Source),
            PathBuf::from("/repo/pkgs/a/pubspec.yaml")
        );
        assert_eq!(
            layout.changelog_path(PackageRole::Dependent),
            PathBuf::from("/repo/pkgs/b/CHANGELOG.md")
        );
        let order: Vec<_> = layout.packages().iter().map(|(role, _)| *role).collect();
        assert_eq!(order, vec![PackageRole::Source, PackageRole::Dependent]);
    }

    #[test]
    fn short_id_truncates_long_hashes_only() {
        let commit = CommitRecord {
            id: "0123456789abcdef".into(),
            summary: String::new(),
            paths: Vec::new(),
        };
        assert_eq!(commit.short_id(), "01234567");
        let short = CommitRecord {
            id: "abc".into(),
            ..commit
        };
        assert_eq!(short.short_id(), "abc");
    }
}
