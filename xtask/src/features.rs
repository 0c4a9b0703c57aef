use std::process::Command;

use anyhow::{Context, Result};

/// Package and feature list pairs that must each build and pass tests
const FEATURE_COMBINATIONS: &[(&str, &[&str])] = &[
    ("metricore-common", &[]),
    ("metricore-common", &["runtime"]),
    ("metricore-core", &[]),
    ("metricore-core", &["test-utils"]),
    ("metricore-core", &["debug-dump", "test-utils"]),
    ("metricore-infra", &[]),
    ("metricore-infra", &["debug-dump"]),
];

/// Check that every required feature combination compiles and its tests
/// pass.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} metricore feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, (package, features)) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let is_default = features.is_empty();
        let display_label =
            if is_default { format!("{package} (default)") } else { format!("{package} [{joined}]") };

        println!(
            "\n[{}/{}] cargo test -p {package}{}",
            index + 1,
            FEATURE_COMBINATIONS.len(),
            if is_default { String::new() } else { format!(" --features {joined}") }
        );

        let mut command = Command::new("cargo");
        command.arg("test").arg("-p").arg(package);

        if !is_default {
            command.arg("--features").arg(&joined);
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo test for '{display_label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{display_label}' failed");
        }

        println!("✅ {display_label} passed");
    }

    println!("\n✅ All {} feature combinations passed!", FEATURE_COMBINATIONS.len());

    Ok(())
}
