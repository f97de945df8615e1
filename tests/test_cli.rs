//! Exit status of the command-line binary.

mod common;

use common::*;
use std::process::Command;

fn hyperveg() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hyperveg"))
}

#[test]
fn test_missing_image_flag_fails() -> anyhow::Result<()> {
    let output = hyperveg().output()?;
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn test_unreadable_image_fails() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let output = hyperveg().arg("-i").arg(dir.path().join("missing.hdr")).output()?;
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn test_successful_run_exits_cleanly() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let header = leaf_cube(dir.path());
    let output = hyperveg().arg("-i").arg(&header).output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Masked pixels: 32 of 64"));
    Ok(())
}
