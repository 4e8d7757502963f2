//! Ordered publish of the two packages: dry-run validation, confirmation,
//! source publish, registry polling, dependent refresh and publish.

use crate::adapters::{DryRunVerdict, PubTool, Registry, classify_dry_run};
use crate::config::Config;
use crate::errors::{PubPairError, Result};
use crate::sync::get_versions;
use crate::types::{PackageRole, ProjectLayout};
use std::thread;
use std::time::Duration;

/// Command-line switches of `publish`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Validate only; nothing is published and the registry is never queried.
    pub dry_run: bool,
    /// Skip validation and every confirmation, and pass `--force` to the tool.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    DryRunPassed { version: String },
    Published { version: String },
    /// The user declined the initial confirmation; nothing was published.
    Cancelled,
}

/// Yes/no confirmation, answered by a terminal prompt or a test double.
pub trait Prompter {
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// How long and how often to wait for a fresh version to show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.poll_interval,
            timeout: config.poll_timeout,
        }
    }
}

/// The external collaborators of a publish run.
pub struct PublishContext<'a> {
    pub tool: &'a dyn PubTool,
    pub registry: &'a dyn Registry,
    pub prompter: &'a dyn Prompter,
    pub poll: PollSettings,
}

/// Publish the source package, wait for it on the registry, then publish the
/// dependent package.
pub fn run_publish(
    layout: &ProjectLayout,
    options: PublishOptions,
    ctx: &PublishContext<'_>,
) -> Result<PublishOutcome> {
    let version = check_version_gate(layout)?;
    let source = &layout.source.name;
    let dependent = &layout.dependent.name;

    if !options.force {
        for (role, package) in layout.packages() {
            if !dry_run_package(ctx.tool, &package.name, &layout.package_dir(role))? {
                println!("\n[ABORT] Fix dry-run errors before publishing.");
                return Err(PubPairError::DryRun(format!(
                    "{} did not pass validation",
                    package.name
                )));
            }
        }
    }

    if options.dry_run {
        println!("\n[dry-run] All checks passed. No packages were published.");
        return Ok(PublishOutcome::DryRunPassed { version });
    }

    if !options.force
        && !ctx
            .prompter
            .confirm(&format!("Publish both packages at version {version}?"))?
    {
        println!("\n[ABORT] Cancelled by user.");
        return Ok(PublishOutcome::Cancelled);
    }

    publish_package(
        ctx.tool,
        source,
        &layout.package_dir(PackageRole::Source),
        options.force,
    )?;

    if !wait_for_registry(ctx.registry, source, &version, ctx.poll) {
        eprintln!("\n[WARN] {source} {version} not detected on the registry yet.");
        if !options.force
            && !ctx
                .prompter
                .confirm(&format!("Continue publishing {dependent} anyway?"))?
        {
            println!("\n[ABORT] Cancelled. Publish {dependent} manually later.");
            return Err(PubPairError::Cancelled(format!(
                "{source} {version} was published; {dependent} still needs publishing"
            )));
        }
    }

    refresh_dependent(ctx.tool, dependent, &layout.package_dir(PackageRole::Dependent))?;

    publish_package(
        ctx.tool,
        dependent,
        &layout.package_dir(PackageRole::Dependent),
        options.force,
    )?;

    println!("\n[DONE] Both packages published at version {version}.");
    Ok(PublishOutcome::Published { version })
}

/// Both packages must declare the same version. Returns that version.
pub fn check_version_gate(layout: &ProjectLayout) -> Result<String> {
    let versions = get_versions(layout)?;

    println!("Version check:");
    for (role, package) in layout.packages() {
        println!("  {}: {}", package.name, versions.get(role));
    }

    if !versions.are_equal() {
        eprintln!("\n[ERROR] Versions are out of sync! Run: sync-version <version>");
        return Err(PubPairError::OutOfSync(format!(
            "{} is at {} but {} is at {}",
            layout.source.name, versions.source, layout.dependent.name, versions.dependent
        )));
    }

    println!("\n  [OK] All packages at {}", versions.source);
    Ok(versions.source)
}

/// Run and report `publish --dry-run` for one package. Returns whether it passed.
pub fn dry_run_package(tool: &dyn PubTool, name: &str, dir: &std::path::Path) -> Result<bool> {
    println!("\n[dry-run] {name} ...");
    let output = tool.dry_run(dir)?;

    match classify_dry_run(&output) {
        DryRunVerdict::Passed => {
            println!("  [OK] {name} dry-run passed.");
            Ok(true)
        }
        DryRunVerdict::PassedWithWarnings(lines) => {
            println!("  [WARN] {name} dry-run passed with warnings:");
            for line in lines {
                println!("    {line}");
            }
            Ok(true)
        }
        DryRunVerdict::Failed => {
            println!("  [FAIL] {name} dry-run failed:");
            println!("{}", output.combined());
            Ok(false)
        }
    }
}

fn publish_package(
    tool: &dyn PubTool,
    name: &str,
    dir: &std::path::Path,
    force: bool,
) -> Result<()> {
    println!("\n[publish] {name} ...");
    if !tool.publish(dir, force)? {
        println!("  [FAIL] {name} publish failed.");
        return Err(PubPairError::Publish(format!("{name} publish failed")));
    }
    println!("  [OK] {name} published.");
    Ok(())
}

fn refresh_dependent(tool: &dyn PubTool, name: &str, dir: &std::path::Path) -> Result<()> {
    println!("\n[pub-get] {name} ...");
    let output = tool.get(dir)?;
    if !output.success() {
        println!("  [FAIL] {name} pub get failed:");
        println!("{}", output.combined());
        return Err(PubPairError::Publish(format!("{name} pub get failed")));
    }
    println!("  [OK] {name} dependencies updated.");
    Ok(())
}

/// Poll the registry until `version` of `package` is listed or the timeout
/// elapses. Lookup errors count as "not listed yet".
pub fn wait_for_registry(
    registry: &dyn Registry,
    package: &str,
    version: &str,
    poll: PollSettings,
) -> bool {
    let interval_secs = poll.interval.as_secs_f64();
    let timeout_secs = poll.timeout.as_secs_f64();
    println!("\n[wait] Waiting for {package} {version} on the registry ...");
    println!("  (timeout: {timeout_secs}s, interval: {interval_secs}s)");

    let mut elapsed = Duration::ZERO;
    while elapsed < poll.timeout {
        match registry.version_exists(package, version) {
            Ok(true) => {
                println!("  [OK] {package} {version} is live!");
                return true;
            }
            Ok(false) => {}
            Err(err) => tracing::debug!(%package, error = %err, "registry lookup failed"),
        }
        if poll.interval.is_zero() {
            break;
        }

        let remaining = (poll.timeout - elapsed).as_secs_f64();
        println!(
            "  Not yet available. Retrying in {interval_secs}s ... ({remaining}s remaining)"
        );
        thread::sleep(poll.interval);
        elapsed += poll.interval;
    }

    println!("  [TIMEOUT] {package} {version} not found after {timeout_secs}s.");
    false
}
