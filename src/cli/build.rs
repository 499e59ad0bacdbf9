//! Asset build orchestration.
//!
//! Build phases:
//! - **Collect** - Scan `assets/` and filter by extension into a manifest
//! - **Clean** - With the `clean` policy, wipe the output asset directory
//! - **Copy** - Parallel atomic copies, fail-fast
//! - **Stale** - Prune or keep files the previous build recorded
//! - **Record** - Persist which files this build is responsible for

use anyhow::{Context, Result};

use crate::{
    asset::{BuildContext, BuildRecord, CopyManifest, clean_output, copy_manifest},
    config::StalePolicy,
    debug, log,
    logger::ProgressLine,
    utils::plural_count,
};

/// Counts reported by one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Files in the manifest
    pub assets: usize,
    /// Files written
    pub copied: usize,
    /// Files already up to date
    pub fresh: usize,
    /// Stale files removed
    pub pruned: usize,
}

/// Copy every accepted asset into the output tree.
///
/// The build record is only written after all copies succeed, so a failed
/// build never forgets files an earlier build produced.
pub fn build_assets(ctx: &BuildContext, quiet: bool) -> Result<BuildSummary> {
    debug!("assets"; "extensions: {}", ctx.extensions.sorted().join(" "));

    let manifest = CopyManifest::collect(ctx).context("failed to collect assets")?;

    if ctx.dry_run() {
        return Ok(print_plan(ctx, &manifest));
    }

    let policy = ctx.stale_policy();
    if policy == StalePolicy::Clean {
        clean_output(&ctx.output_root, &ctx.record_path)
            .context("failed to clean asset output")?;
    }

    let previous = load_previous(ctx);

    let progress = create_progress(&manifest, quiet);
    let stats = copy_manifest(&manifest, ctx.force_copy(), progress.as_ref()).with_context(|| {
        format!(
            "failed to copy assets into {}",
            ctx.config.root_relative(&ctx.output_root).display()
        )
    })?;
    if let Some(p) = progress {
        p.finish();
    }

    let current = BuildRecord::from_manifest(&manifest);
    let mut pruned = 0;
    let record = match (policy, previous) {
        (StalePolicy::Keep, Some(previous)) => previous.merged(&current),
        (StalePolicy::Prune, Some(previous)) => {
            pruned = previous
                .prune(&current, &ctx.output_root)
                .context("failed to remove stale assets")?;
            current
        }
        _ => current,
    };

    // An empty project leaves no trace in the build directory
    if !record.files.is_empty() || ctx.record_path.exists() {
        record
            .save(&ctx.record_path)
            .context("failed to write build record")?;
    }

    let summary = BuildSummary {
        assets: manifest.len(),
        copied: stats.copied,
        fresh: stats.fresh,
        pruned,
    };
    if !quiet {
        log_summary(&summary);
    }

    Ok(summary)
}

/// Previous record, or `None` when missing or unreadable.
fn load_previous(ctx: &BuildContext) -> Option<BuildRecord> {
    match BuildRecord::load(&ctx.record_path) {
        Ok(record) => record,
        Err(e) => {
            log!("warning"; "{}, starting without a build record", e);
            None
        }
    }
}

fn create_progress(manifest: &CopyManifest, quiet: bool) -> Option<ProgressLine> {
    if quiet || manifest.is_empty() {
        return None;
    }
    Some(ProgressLine::new(&[("assets", manifest.len())]))
}

/// Print the manifest for `--dry-run`.
fn print_plan(ctx: &BuildContext, manifest: &CopyManifest) -> BuildSummary {
    for entry in manifest.entries() {
        log!(
            "assets";
            "{} -> {}",
            entry.url_path(),
            ctx.config.root_relative(&entry.destination).display()
        );
    }
    log!("assets"; "{} would be copied", plural_count(manifest.len(), "asset"));

    BuildSummary {
        assets: manifest.len(),
        ..Default::default()
    }
}

fn log_summary(summary: &BuildSummary) {
    if summary.assets == 0 {
        log!("assets"; "nothing to copy");
    } else {
        log!(
            "assets";
            "{} copied, {} up to date",
            plural_count(summary.copied, "asset"),
            summary.fresh
        );
    }
    if summary.pruned > 0 {
        log!("assets"; "removed {}", plural_count(summary.pruned, "stale file"));
    }
}
