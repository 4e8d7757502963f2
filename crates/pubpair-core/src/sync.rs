//! Keeping the two packages' versions and the dependency constraint aligned.

use crate::changelog::generate_changelogs;
use crate::config::Config;
use crate::errors::{PubPairError, Result};
use crate::manifest::Pubspec;
use crate::types::{PackageRole, ProjectLayout};
use semver::Version;
use std::fmt;

/// `true` for `X.Y.Z` where each part is a non-empty run of ASCII digits.
pub fn is_valid_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// The constraint the dependent package must declare on the source package.
pub fn expected_constraint(source_version: &str) -> String {
    format!("^{source_version}")
}

/// Declared versions of both packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions {
    pub source: String,
    pub dependent: String,
}

impl Versions {
    pub fn get(&self, role: PackageRole) -> &str {
        match role {
            PackageRole::Source => &self.source,
            PackageRole::Dependent => &self.dependent,
        }
    }

    pub fn are_equal(&self) -> bool {
        self.source == self.dependent
    }
}

/// Read both packages' `version` fields.
pub fn get_versions(layout: &ProjectLayout) -> Result<Versions> {
    Ok(Versions {
        source: Pubspec::load(&layout.pubspec_path(PackageRole::Source))?.version()?,
        dependent: Pubspec::load(&layout.pubspec_path(PackageRole::Dependent))?.version()?,
    })
}

/// The dependent package's constraint on the source package, if declared.
pub fn dependency_constraint(layout: &ProjectLayout) -> Result<Option<String>> {
    let pubspec = Pubspec::load(&layout.pubspec_path(PackageRole::Dependent))?;
    Ok(pubspec.dependency(&layout.source.name))
}

/// Snapshot of everything `check_sync` looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub source_name: String,
    pub dependent_name: String,
    pub versions: Versions,
    pub constraint: Option<String>,
}

impl SyncStatus {
    pub fn load(layout: &ProjectLayout) -> Result<Self> {
        Ok(Self {
            source_name: layout.source.name.clone(),
            dependent_name: layout.dependent.name.clone(),
            versions: get_versions(layout)?,
            constraint: dependency_constraint(layout)?,
        })
    }

    pub fn constraint_matches(&self) -> bool {
        self.constraint.as_deref() == Some(expected_constraint(&self.versions.source).as_str())
    }

    /// Versions equal and the constraint exactly `^<version>`.
    pub fn is_in_sync(&self) -> bool {
        self.versions.are_equal() && self.constraint_matches()
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current versions:")?;
        writeln!(f, "  {}: {}", self.source_name, self.versions.source)?;
        writeln!(f, "  {}: {}", self.dependent_name, self.versions.dependent)?;

        match self.constraint.as_deref().filter(|c| !c.is_empty()) {
            Some(constraint) => {
                writeln!(
                    f,
                    "\n  {} depends on {}: {}",
                    self.dependent_name, self.source_name, constraint
                )?;
                if !self.constraint_matches() {
                    writeln!(
                        f,
                        "  [WARN] Expected constraint: {}",
                        expected_constraint(&self.versions.source)
                    )?;
                }
            }
            None => writeln!(
                f,
                "\n  [WARN] {} does not declare a dependency on {}",
                self.dependent_name, self.source_name
            )?,
        }

        if self.versions.are_equal() {
            write!(f, "\n  [OK] Versions are in sync.")
        } else {
            write!(f, "\n  [WARN] Versions are out of sync!")
        }
    }
}

/// Print the status report and return the snapshot it was rendered from.
pub fn print_status(layout: &ProjectLayout) -> Result<SyncStatus> {
    let status = SyncStatus::load(layout)?;
    println!("{status}");
    Ok(status)
}

/// Print the status report; `true` iff versions are equal and the constraint
/// is `^<version>`.
pub fn check_sync(layout: &ProjectLayout) -> Result<bool> {
    Ok(print_status(layout)?.is_in_sync())
}

/// What `sync_to` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub previous: Versions,
    pub new_version: String,
    /// Previous constraint, when the dependency entry existed and was rewritten.
    pub previous_constraint: Option<String>,
}

/// Move both packages to `new_version`.
///
/// Every pubspec edit is prepared in memory first, so a manifest that cannot
/// be rewritten fails the run before anything touches the disk. Changelogs are
/// then generated while the files still carry the old version that scopes the
/// commit history, and finally the edited pubspecs are saved.
pub fn sync_to(layout: &ProjectLayout, config: &Config, new_version: &str) -> Result<SyncReport> {
    if !is_valid_version(new_version) {
        return Err(PubPairError::InvalidVersion(new_version.to_string()));
    }

    let previous = get_versions(layout)?;
    println!("Syncing all packages to version {new_version} ...");
    warn_if_not_newer(&previous.source, new_version);

    let mut source = Pubspec::load(&layout.pubspec_path(PackageRole::Source))?;
    let mut dependent = Pubspec::load(&layout.pubspec_path(PackageRole::Dependent))?;
    let old_source = source.set_version(new_version)?;
    let old_dependent = dependent.set_version(new_version)?;
    let new_constraint = expected_constraint(new_version);
    let previous_constraint = dependent.set_dependency(&layout.source.name, &new_constraint)?;

    generate_changelogs(layout, config, &previous.source, new_version)?;

    println!("\nUpdating pubspec versions ...");
    for (package, old, pubspec) in [
        (&layout.source, old_source, &source),
        (&layout.dependent, old_dependent, &dependent),
    ] {
        pubspec.save()?;
        println!("  {}: {} -> {}", package.name, old, new_version);
    }

    if let Some(old) = &previous_constraint {
        let old = match old.as_str() {
            "" => "(none)".to_string(),
            text => text.replace('\n', ", "),
        };
        println!(
            "\n  {} dependency {}: {} -> {}",
            layout.dependent.name, layout.source.name, old, new_constraint
        );
    }

    println!("\nDone.");
    Ok(SyncReport {
        previous,
        new_version: new_version.to_string(),
        previous_constraint,
    })
}

fn warn_if_not_newer(current: &str, requested: &str) {
    let (Ok(current_ver), Ok(requested_ver)) = (Version::parse(current), Version::parse(requested))
    else {
        return;
    };
    if requested_ver <= current_ver {
        eprintln!(
            "  [WARN] {} is not newer than the current version {}",
            requested, current
        );
    }
}
