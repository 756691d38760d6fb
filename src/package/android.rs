//! Android APK assembly (§6 "Android packaging output"): wraps the project's linked
//! shared object into a universal APK with resources, a generated manifest, and
//! optional signing. SDK tool paths come from the environment (`ANDROID_SDK_ROOT` /
//! `ANDROID_HOME`, `ANDROID_NDK_ROOT`), mirroring how the toolchain inputs are passed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::project::AndroidMetadata;
use crate::resolver::EffectiveProject;
use crate::util::process::ProcessBuilder;

fn sdk_root() -> Result<PathBuf> {
    std::env::var_os("ANDROID_SDK_ROOT")
        .or_else(|| std::env::var_os("ANDROID_HOME"))
        .map(PathBuf::from)
        .context("ANDROID_SDK_ROOT or ANDROID_HOME must be set to package an Android project")
}

fn build_tools_dir(sdk: &Path) -> Result<PathBuf> {
    let build_tools = sdk.join("build-tools");
    let mut versions: Vec<_> = fs::read_dir(&build_tools)
        .with_context(|| format!("no build-tools under {}", build_tools.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    versions.sort();
    versions.pop().context("no build-tools version installed")
}

fn platform_jar(sdk: &Path, target_sdk: u32) -> PathBuf {
    sdk.join("platforms").join(format!("android-{target_sdk}")).join("android.jar")
}

fn generate_manifest(project: &EffectiveProject, meta: &AndroidMetadata) -> String {
    let permissions: String =
        meta.permissions.iter().map(|p| format!("\n    <uses-permission android:name=\"{p}\" />")).collect();
    let features: String = meta
        .features
        .iter()
        .map(|f| format!("\n    <uses-feature android:name=\"{f}\" android:required=\"true\" />"))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
        package="{package}">
    <uses-sdk android:minSdkVersion="{min_sdk}" android:targetSdkVersion="{target_sdk}" />{permissions}{features}
    <application android:hasCode="false" android:label="{label}">
        <activity android:name="android.app.NativeActivity" android:label="{label}" android:exported="true">
            <meta-data android:name="android.app.lib_name" android:value="{lib_name}" />
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
                <category android:name="android.intent.category.LAUNCHER" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#,
        package = meta.package,
        min_sdk = meta.min_sdk,
        target_sdk = meta.target_sdk,
        permissions = permissions,
        features = features,
        label = project.targetname,
        lib_name = project.targetname,
    )
}

/// Assembles a universal APK for `project` from its already-linked shared object,
/// across every ABI named in `meta.abis`. The build here only packages the ABI the
/// host toolchain just produced; a multi-ABI build re-invokes the Scheduler once per
/// `(configuration, platform)` pair and each pass adds its `.so` to the same staging
/// directory before the final `aapt add` pass.
pub fn package(project: &EffectiveProject, meta: &AndroidMetadata, linked_output: &Path) -> Result<()> {
    if meta.abis.is_empty() {
        bail!("project `{}` declares Android metadata with no target ABIs", project.name);
    }

    let sdk = sdk_root()?;
    let build_tools = build_tools_dir(&sdk)?;
    let aapt = build_tools.join("aapt");
    let zipalign = build_tools.join("zipalign");
    let apksigner = build_tools.join("apksigner");
    let android_jar = platform_jar(&sdk, meta.target_sdk);

    let stage = project.targetdir.join("android-stage");
    fs::create_dir_all(&stage).context("creating APK staging directory")?;

    let manifest_path = stage.join("AndroidManifest.xml");
    fs::write(&manifest_path, generate_manifest(project, meta)).context("writing AndroidManifest.xml")?;

    let res_dir = stage.join("res");
    fs::create_dir_all(&res_dir)?;

    let abi = primary_abi(&meta.abis);
    let lib_dir = stage.join("lib").join(abi);
    fs::create_dir_all(&lib_dir)?;
    let so_name = format!("lib{}.so", project.targetname);
    fs::copy(linked_output, lib_dir.join(&so_name))
        .with_context(|| format!("copying {} into APK staging tree", linked_output.display()))?;

    let unaligned_apk = stage.join(format!("{}-unaligned.apk", project.targetname));
    ProcessBuilder::new(&aapt)
        .arg("package")
        .arg("-f")
        .arg("-F")
        .arg(&unaligned_apk)
        .arg("-M")
        .arg(&manifest_path)
        .arg("-S")
        .arg(&res_dir)
        .arg("-I")
        .arg(&android_jar)
        .cwd(&stage)
        .exec_and_check()
        .context("aapt package failed")?;

    ProcessBuilder::new(&aapt)
        .arg("add")
        .arg(unaligned_apk.file_name().unwrap())
        .arg(format!("lib/{abi}/{so_name}"))
        .cwd(&stage)
        .exec_and_check()
        .context("aapt add (shared object) failed")?;

    let final_apk = project.targetdir.join(format!("{}.apk", project.targetname));
    ProcessBuilder::new(&zipalign)
        .arg("-f")
        .arg("4")
        .arg(&unaligned_apk)
        .arg(&final_apk)
        .exec_and_check()
        .context("zipalign failed")?;

    if let Some(keystore) = &meta.keystore_path {
        let alias = meta.keystore_alias.as_deref().unwrap_or("androiddebugkey");
        ProcessBuilder::new(&apksigner)
            .arg("sign")
            .arg("--ks")
            .arg(keystore)
            .arg("--ks-key-alias")
            .arg(alias)
            .arg(&final_apk)
            .exec_and_check()
            .context("apksigner sign failed")?;
    }

    tracing::info!(apk = %final_apk.display(), "packaged Android APK");
    Ok(())
}

fn primary_abi(abis: &[String]) -> &str {
    abis.first().map(|s| s.as_str()).unwrap_or("arm64-v8a")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::{Dialect, Language, PlatformMetadata, ProjectKind};
    use crate::core::toolchain::ToolchainFamily;
    use crate::core::{TargetArch, TargetOs, Toolchain};
    use crate::resolver::EffectiveProject;
    use std::sync::Arc;

    fn sample_effective_project(name: &str) -> EffectiveProject {
        let toolchain = Toolchain {
            name: "ndk".into(),
            family: ToolchainFamily::AndroidNdk,
            os: TargetOs::Linux,
            arch: TargetArch::Arm64,
            target_triple: Some("aarch64-linux-android".into()),
            sysroot: None,
            cc: "clang".into(),
            cxx: "clang++".into(),
            linker: None,
            archiver: "llvm-ar".into(),
            cflags: vec![],
            cxxflags: vec![],
            ldflags: vec![],
            asflags: vec![],
            arflags: vec![],
            defines: vec![],
            frameworks: vec![],
            framework_dirs: vec![],
        };
        EffectiveProject {
            name: name.to_string(),
            configuration: "Debug".into(),
            platform: "android-arm64".into(),
            kind: ProjectKind::SharedLib,
            language: Language::Cxx,
            dialect: Dialect::new("C++17"),
            location: PathBuf::from("."),
            sources: vec![],
            module_interfaces: vec![],
            include_dirs: vec![],
            lib_dirs: vec![],
            links: vec![],
            depends_on: vec![],
            defines: vec![],
            optimize: crate::core::project::OptimizationLevel::Off,
            debug_symbols: true,
            warnings: crate::core::project::WarningLevel::Default,
            objdir: PathBuf::from("obj"),
            targetdir: PathBuf::from("bin"),
            targetname: name.to_string(),
            pch: None,
            hooks: Default::default(),
            platform_metadata: PlatformMetadata::default(),
            toolchain: Arc::new(toolchain),
        }
    }

    #[test]
    fn manifest_includes_permissions_and_features() {
        let project = sample_effective_project("Game");
        let meta = AndroidMetadata {
            package: "com.example.game".into(),
            min_sdk: 21,
            target_sdk: 33,
            abis: vec!["arm64-v8a".into()],
            permissions: vec!["android.permission.INTERNET".into()],
            features: vec!["android.hardware.vulkan.version".into()],
            keystore_path: None,
            keystore_alias: None,
        };
        let xml = generate_manifest(&project, &meta);
        assert!(xml.contains("com.example.game"));
        assert!(xml.contains("android.permission.INTERNET"));
        assert!(xml.contains("android.hardware.vulkan.version"));
    }

    #[test]
    fn primary_abi_falls_back_when_empty() {
        assert_eq!(primary_abi(&[]), "arm64-v8a");
        assert_eq!(primary_abi(&["armeabi-v7a".to_string()]), "armeabi-v7a");
    }
}
