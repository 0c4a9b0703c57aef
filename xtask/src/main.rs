//! Development automation tasks for the `metricore` workspace.
//!
//! Run with: `cargo xtask <command>`
//!
//! This is a CLI tool for developers, so `println!` and `eprintln!` are
//! intentionally used for user-facing output rather than structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::anyhow;

mod features;

fn main() -> ExitCode {
    let task = env::args().nth(1);

    let result = match task.as_deref() {
        Some("ci") => run_ci(),
        Some("fmt") => run_fmt(),
        Some("clippy") => run_clippy(),
        Some("test") => run_test(),
        Some("bench") => run_bench_build(),
        Some("deny") => run_deny(),
        Some("test-features") => features::test_feature_matrix(),
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(unknown) => {
            eprintln!("Unknown task: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow::anyhow!("Unknown task"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Task failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Metricore Development Tasks");
    println!();
    println!("USAGE:");
    println!("    cargo xtask <TASK>");
    println!();
    println!("TASKS:");
    println!("    ci             Run all CI checks (fmt, clippy, test, test-features, bench)");
    println!("    fmt            Check Rust code formatting");
    println!("    clippy         Run Clippy lints");
    println!("    test           Run all tests");
    println!("    test-features  Run each crate's tests under every supported feature set");
    println!("    bench          Build the criterion benchmarks without running them");
    println!("    deny           Check dependencies with cargo-deny");
    println!("    help           Show this help message");
}

/// Run all CI checks in sequence
fn run_ci() -> anyhow::Result<()> {
    println!("==> Running CI checks...\n");

    println!("==> Step 1/5: Checking Rust format...");
    run_fmt()?;

    println!("\n==> Step 2/5: Running Clippy...");
    run_clippy()?;

    println!("\n==> Step 3/5: Running tests...");
    run_test()?;

    println!("\n==> Step 4/5: Checking feature matrix...");
    features::test_feature_matrix()?;

    println!("\n==> Step 5/5: Building benchmarks...");
    run_bench_build()?;

    println!("\n✓ All CI checks passed!");
    Ok(())
}

fn cargo(args: &[&str], failure: &str) -> anyhow::Result<()> {
    let status = Command::new("cargo").args(args).status()?;

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("{failure}"))
    }
}

/// Check Rust code formatting
fn run_fmt() -> anyhow::Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "Format check failed. Run 'cargo fmt --all' to fix.")
}

/// Run Clippy lints
fn run_clippy() -> anyhow::Result<()> {
    cargo(
        &["clippy", "--workspace", "--all-targets", "--all-features", "--", "-D", "warnings"],
        "Clippy run failed. See output above.",
    )
}

/// Run all workspace tests
fn run_test() -> anyhow::Result<()> {
    cargo(&["test", "--workspace", "--all-features"], "Tests failed")
}

/// Compile benchmarks so they cannot rot
fn run_bench_build() -> anyhow::Result<()> {
    cargo(&["bench", "-p", "metricore-core", "--features", "test-utils", "--no-run"], "Benchmarks failed to build")
}

/// Check dependencies with cargo-deny
fn run_deny() -> anyhow::Result<()> {
    // Check if cargo-deny is installed
    let check_installed = Command::new("cargo").args(["deny", "--version"]).output();

    if check_installed.is_err() || !check_installed.as_ref().is_ok_and(|o| o.status.success()) {
        eprintln!("cargo-deny is not installed.");
        eprintln!("Install it with: cargo install cargo-deny");
        anyhow::bail!("cargo-deny not found");
    }

    cargo(&["deny", "check"], "cargo-deny found issues")
}
