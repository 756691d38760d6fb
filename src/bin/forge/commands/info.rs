//! `forge info` - emits the resolved workspace model (§6).

use anyhow::Result;
use forge::{BuildContext, GlobalContext, PlatformTriple, Resolver, Workspace};

use super::common::load_workspace;
use crate::cli::{GlobalFlags, InfoArgs, MessageFormat};

pub fn execute(args: InfoArgs, global: &GlobalFlags) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let workspace = load_workspace(&gctx)?;

    match global.message_format {
        MessageFormat::Json => print_json(&workspace, &args),
        MessageFormat::Human => print_human(&workspace, &args),
    }
}

fn resolve_context(workspace: &Workspace, args: &InfoArgs) -> Result<BuildContext> {
    let configuration = args
        .config
        .clone()
        .or_else(|| workspace.configurations.first().cloned())
        .unwrap_or_else(|| "Debug".to_string());
    let platform = match &args.platform {
        Some(p) => PlatformTriple::parse(p).map_err(|e| anyhow::anyhow!(e))?,
        None => PlatformTriple::host(),
    };
    Ok(BuildContext::new(configuration, platform))
}

fn print_human(workspace: &Workspace, args: &InfoArgs) -> Result<()> {
    println!("workspace: {}", workspace.name);
    println!("configurations: {}", workspace.configurations.join(", "));
    if !workspace.platforms.is_empty() {
        println!("platforms: {}", workspace.platforms.join(", "));
    }
    if let Some(startup) = &workspace.startup_project {
        println!("startup project: {startup}");
    }
    let mut toolchain_names: Vec<&str> = workspace.toolchains.keys().map(String::as_str).collect();
    toolchain_names.sort();
    println!("toolchains: {}", toolchain_names.join(", "));

    println!();
    println!("projects:");
    for project in &workspace.projects {
        println!("  {} ({:?})", project.name, project.kind);
        if !project.depends_on.is_empty() {
            println!("    depends on: {}", project.depends_on.join(", "));
        }
    }

    if args.verbose {
        let resolver = Resolver::new();
        let ctx = resolve_context(workspace, args)?;
        println!();
        println!("resolved under {} / {}:", ctx.configuration, ctx.platform);
        for project in &workspace.projects {
            let effective = resolver.resolve(workspace, &project.name, &ctx)?;
            println!("  {}:", effective.name);
            println!("    sources: {}", effective.sources.len());
            println!("    objdir: {}", effective.objdir.display());
            println!("    targetdir: {}", effective.targetdir.display());
            println!("    toolchain: {}", effective.toolchain.name);
        }
    }

    Ok(())
}

fn print_json(workspace: &Workspace, args: &InfoArgs) -> Result<()> {
    let mut toolchain_names: Vec<&str> = workspace.toolchains.keys().map(String::as_str).collect();
    toolchain_names.sort();

    let projects: Vec<serde_json::Value> = workspace
        .projects
        .iter()
        .map(|p| {
            serde_json::json!({
                "name": p.name,
                "kind": format!("{:?}", p.kind),
                "depends_on": p.depends_on,
            })
        })
        .collect();

    let mut doc = serde_json::json!({
        "workspace": workspace.name,
        "configurations": workspace.configurations,
        "platforms": workspace.platforms,
        "startup_project": workspace.startup_project,
        "toolchains": toolchain_names,
        "projects": projects,
    });

    if args.verbose {
        let resolver = Resolver::new();
        let ctx = resolve_context(workspace, args)?;
        let mut resolved = Vec::new();
        for project in &workspace.projects {
            let effective = resolver.resolve(workspace, &project.name, &ctx)?;
            resolved.push(serde_json::json!({
                "name": effective.name,
                "sources": effective.sources.len(),
                "objdir": effective.objdir,
                "targetdir": effective.targetdir,
                "toolchain": effective.toolchain.name,
            }));
        }
        doc["resolved"] = serde_json::json!({
            "configuration": ctx.configuration,
            "platform": ctx.platform.to_string(),
            "projects": resolved,
        });
    }

    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
