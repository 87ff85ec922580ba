// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands that do not start the server

use bactrack::Config;
use bactrack::backends::camera::v4l2::enumerate_cameras;

/// List all available capture devices
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for camera in &cameras {
        println!("  {} {}", camera.path, camera.name);
        println!("      Driver: {}", camera.driver);
    }
    println!();
    println!("Use `bactrack serve --camera <path>` to pick one.");

    Ok(())
}

/// Print the effective configuration, optionally saving it
pub fn print_config(config: Config, save: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        let path = Config::default_path().ok_or("No config directory on this platform")?;
        config.save(&path)?;
        println!();
        println!("Saved to {}", path.display());
    }

    Ok(())
}
