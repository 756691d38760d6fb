//! The Scheduler (§4.5): drives compile/link execution for a build-ordered set of
//! projects — parallel compile, sequential module precompile and link, hook phases,
//! and platform packaging as a post-link step.

pub mod hooks;
pub mod link;
pub mod worker_pool;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::{BuildContext, Workspace};
use crate::resolver::{EffectiveProject, Resolver};
use crate::toolchain;
use worker_pool::CompileOutcome;

/// Outcome of building one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    Built,
    Failed,
    Skipped,
    Cancelled,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub statuses: Vec<(String, ProjectStatus)>,
}

impl BuildReport {
    pub fn success(&self) -> bool {
        self.statuses.iter().all(|(_, s)| matches!(s, ProjectStatus::Built | ProjectStatus::Skipped))
            && self.statuses.iter().any(|(_, s)| *s == ProjectStatus::Built)
    }

    pub fn cancelled(&self) -> bool {
        self.statuses.iter().any(|(_, s)| *s == ProjectStatus::Cancelled)
    }
}

/// Drives a full workspace build: resolves the build order, then runs each project's
/// 7-step plan in order (§4.5), skipping any project whose dependency failed.
pub struct Scheduler {
    cancel_token: Arc<AtomicBool>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler { cancel_token: Arc::new(AtomicBool::new(false)) }
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the cancellation flag a signal handler can flip from another thread.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_token)
    }

    pub fn cancel(&self) {
        self.cancel_token.store(true, Ordering::SeqCst);
    }

    pub fn build(&self, workspace: &Workspace, ctx: &BuildContext, no_cache: bool) -> Result<BuildReport> {
        self.build_subset(workspace, ctx, no_cache, &[])
    }

    /// Builds only `targets` and their transitive dependencies. An empty `targets`
    /// builds the whole workspace, same as `build` (§6 `--target PROJECT`).
    pub fn build_subset(
        &self,
        workspace: &Workspace,
        ctx: &BuildContext,
        no_cache: bool,
        targets: &[String],
    ) -> Result<BuildReport> {
        let resolver = Resolver::new();
        let (mut order, mut resolved) =
            resolver.resolve_workspace(workspace, ctx).context("failed to resolve workspace")?;

        if !targets.is_empty() {
            for t in targets {
                if !order.iter().any(|n| n == t) {
                    anyhow::bail!("unknown project `{t}`");
                }
            }
            let mut closure: HashSet<String> = targets.iter().cloned().collect();
            // `order` is topologically sorted, so a single backward pass over it
            // picks up every transitive dependency of anything already in the closure.
            for (name, project) in order.iter().zip(resolved.iter()).rev() {
                if closure.contains(name) {
                    closure.extend(project.depends_on.iter().cloned());
                }
            }
            let mut kept_order = Vec::new();
            let mut kept_resolved = Vec::new();
            for (name, project) in order.into_iter().zip(resolved.into_iter()) {
                if closure.contains(&name) {
                    kept_order.push(name);
                    kept_resolved.push(project);
                }
            }
            order = kept_order;
            resolved = kept_resolved;
        }

        let mut report = BuildReport::default();
        let mut failed: HashSet<String> = HashSet::new();
        let mut outputs: link::OutputIndex = HashMap::new();

        for (name, project) in order.into_iter().zip(resolved.into_iter()) {
            if self.cancel_token.load(Ordering::SeqCst) {
                report.statuses.push((name, ProjectStatus::Cancelled));
                continue;
            }

            if project.depends_on.iter().any(|dep| failed.contains(dep)) {
                failed.insert(name.clone());
                report.statuses.push((name, ProjectStatus::Skipped));
                continue;
            }

            match self.build_project(&project, no_cache, &outputs) {
                Ok(output_path) => {
                    outputs.insert(name.clone(), output_path);
                    report.statuses.push((name, ProjectStatus::Built));
                }
                Err(e) => {
                    if is_cancellation(&e) {
                        report.statuses.push((name, ProjectStatus::Cancelled));
                    } else {
                        tracing::error!(project = %project.name, "{e:#}");
                        failed.insert(name.clone());
                        report.statuses.push((name, ProjectStatus::Failed));
                    }
                }
            }
        }

        Ok(report)
    }

    fn build_project(
        &self,
        project: &EffectiveProject,
        no_cache: bool,
        outputs: &link::OutputIndex,
    ) -> Result<PathBuf> {
        hooks::run_hooks(&project.hooks.prebuild, &project.location).context("prebuild hook failed")?;

        let units = worker_pool::plan_units(project);
        let (module_units, regular_units): (Vec<_>, Vec<_>) = units.into_iter().partition(|u| u.is_module_interface);

        // Module interfaces precompile sequentially. A dependency-file pass orders them
        // so each compiles only after every interface it imports, and reports a cycle
        // as a build failure rather than compiling in declared source order regardless
        // (§4.5 step 2).
        let module_table: HashMap<&PathBuf, &worker_pool::CompileUnit> =
            module_units.iter().map(|u| (&u.source, u)).collect();

        let mut module_decls = Vec::with_capacity(module_units.len());
        for unit in &module_units {
            let source_text = std::fs::read_to_string(&unit.source)
                .with_context(|| format!("failed to read module interface {}", unit.source.display()))?;
            let (declared_name, imports) = toolchain::modules::scan_module_declarations(&source_text);
            let module_name = declared_name.unwrap_or_else(|| unit.source.display().to_string());
            module_decls.push(toolchain::modules::ModuleUnit { module_name, source: unit.source.clone(), imports });
        }
        let ordered_decls = toolchain::modules::order_module_units(&module_decls)
            .context("module interface dependency graph has a cycle")?;

        let mut objects = Vec::new();
        for decl in &ordered_decls {
            if self.cancel_token.load(Ordering::SeqCst) {
                anyhow::bail!("cancelled");
            }
            let unit = module_table[&decl.source];
            match worker_pool::compile_all(project, std::slice::from_ref(unit), no_cache, &self.cancel_token)
                .into_iter()
                .next()
            {
                Some(CompileOutcome::Failed { stderr }) => {
                    anyhow::bail!("module `{}` failed to compile:\n{stderr}", unit.source.display())
                }
                Some(CompileOutcome::Cancelled) => anyhow::bail!("cancelled"),
                _ => objects.push(unit.object.clone()),
            }
        }

        let outcomes = worker_pool::compile_all(project, &regular_units, no_cache, &self.cancel_token);

        // A `Cancelled` outcome can only come from the Scheduler's own cancel_token
        // (peer-failure-induced stops come back `Skipped`), so it always wins over
        // failure reporting: the build was aborted, not failed.
        if outcomes.iter().any(|o| matches!(o, CompileOutcome::Cancelled)) {
            anyhow::bail!("cancelled");
        }

        // Report failures in source declaration order (§5 ordering guarantee (i)).
        // `Skipped` units carry no stderr of their own; the sibling `Failed` entry
        // that triggered the skip is what gets reported.
        let mut failures = Vec::new();
        for (unit, outcome) in regular_units.iter().zip(outcomes.iter()) {
            if let CompileOutcome::Failed { stderr } = outcome {
                failures.push(format!("{}: {stderr}", unit.source.display()));
            }
        }
        if !failures.is_empty() {
            anyhow::bail!("compile failed for project `{}`:\n{}", project.name, failures.join("\n"));
        }

        for (unit, outcome) in regular_units.iter().zip(outcomes.iter()) {
            if matches!(outcome, CompileOutcome::Cached | CompileOutcome::Compiled) {
                objects.push(unit.object.clone());
            }
        }

        hooks::run_hooks(&project.hooks.prelink, &project.location).context("prelink hook failed")?;

        let output = link::link_project(project, &objects, outputs).context("link failed")?;

        crate::package::package_if_applicable(project, &output)?;

        hooks::run_hooks(&project.hooks.postlink, &project.location).context("postlink hook failed")?;
        hooks::run_hooks(&project.hooks.postbuild, &project.location).context("postbuild hook failed")?;

        Ok(output)
    }
}

fn is_cancellation(e: &anyhow::Error) -> bool {
    e.to_string().contains("cancelled")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_report_success_requires_at_least_one_built_project() {
        let mut report = BuildReport::default();
        report.statuses.push(("A".to_string(), ProjectStatus::Skipped));
        assert!(!report.success());
        report.statuses.push(("B".to_string(), ProjectStatus::Built));
        assert!(report.success());
    }

    #[test]
    fn build_report_detects_cancellation() {
        let mut report = BuildReport::default();
        report.statuses.push(("A".to_string(), ProjectStatus::Cancelled));
        assert!(report.cancelled());
    }
}
