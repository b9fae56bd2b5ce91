use std::path::Path;

use anyhow::Result;
use fontbuild_core::io;
use log::debug;

pub fn clean(build_dirs: &[&Path]) -> Result<()> {
    let mut removed = 0;

    for dir in build_dirs {
        if io::clean(dir)? {
            println!("Removed {}", dir.display());
            removed += 1;
        } else {
            debug!("{} does not exist", dir.display());
            println!("Skipped {} (not found)", dir.display());
        }
    }

    println!("Cleaned {removed} directories");
    Ok(())
}
