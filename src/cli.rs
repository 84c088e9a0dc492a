// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::params::ClampPolicy;
use crate::scenes::SceneKind;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "scene-lab")]
#[command(about = "Interactive 3D demo scenes with live parameter controls", long_about = None)]
pub struct Cli {
    /// Scene to open
    #[arg(long, value_enum)]
    pub scene: Option<SceneKind>,

    /// Run without a window, rendering into an offscreen canvas
    #[arg(long)]
    pub headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, value_name = "N", default_value_t = 120)]
    pub frames: u64,

    /// Display refresh rate the frame scheduler paces ticks to
    #[arg(long, value_name = "HZ")]
    pub fps: Option<f32>,

    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// glTF file for the model scenes
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// JSON viewer configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON map of parameter values applied after setup
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,

    /// Set one parameter, e.g. `--set size=0.5` (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// What happens to numbers outside a parameter's bounds
    #[arg(long, value_enum)]
    pub clamp_policy: Option<ClampPolicy>,

    /// Hide the control panel
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Print the available scenes and exit
    #[arg(long)]
    pub list_scenes: bool,
}

/// Split `name=value`; the value may itself contain `=`
pub fn parse_assignment(input: &str) -> Result<(String, String), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{input}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{input}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
