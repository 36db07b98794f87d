//! Build Script for the edge-relay firmware
//!
//! Puts the memory layout of the MPS2-AN385 on the linker search path.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: CC0-1.0

use std::{env, error::Error, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn Error>> {
    arm_targets::process();
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    // the package root isn't always searched, so copy the linker script out
    fs::copy("memory.x", out_dir.join("memory.x"))?;
    // important - if the file changes, re-run the build
    println!("cargo::rerun-if-changed=memory.x");
    // tell the linker where to find it
    println!("cargo::rustc-link-search={}", out_dir.display());
    Ok(())
}

// End of File
