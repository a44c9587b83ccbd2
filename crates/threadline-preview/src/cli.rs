use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "threadline-preview",
    author,
    version,
    about = "Preview the threadline backdrop in a desktop window"
)]
pub struct Cli {
    /// TOML file with a `[backdrop]` table; also read from `THREADLINE_CONFIG`.
    #[arg(long, value_name = "PATH", env = "THREADLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        value_parser = parse_size,
        default_value = "1280x720"
    )]
    pub size: (u32, u32),

    /// Line colour as three components in [0, 1] (e.g. `0.9,0.4,0.2`).
    #[arg(long, value_name = "R,G,B", value_parser = parse_color)]
    pub color: Option<[f64; 3]>,

    /// Vertical displacement strength of the lines.
    #[arg(long, value_name = "AMPLITUDE")]
    pub amplitude: Option<f64>,

    /// Per-line offset spread.
    #[arg(long, value_name = "DISTANCE")]
    pub distance: Option<f64>,

    /// Let the pointer steer the animation.
    #[arg(long, conflicts_with = "static_lines")]
    pub interactive: bool,

    /// Ignore the pointer even if the config file enables it.
    #[arg(long = "static")]
    pub static_lines: bool,
}

impl Cli {
    /// Interaction override requested on the command line, if any.
    pub fn interaction(&self) -> Option<bool> {
        if self.interactive {
            Some(true)
        } else if self.static_lines {
            Some(false)
        } else {
            None
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err("window size must be non-zero".to_string());
    }
    Ok((width, height))
}

pub fn parse_color(value: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("invalid colour '{value}'; expected R,G,B"));
    };
    let mut color = [0.0; 3];
    for (slot, part) in color.iter_mut().zip([r, g, b]) {
        let component: f64 = part
            .parse()
            .map_err(|_| format!("invalid colour component '{part}'"))?;
        if !(0.0..=1.0).contains(&component) {
            return Err(format!("colour component {component} is outside [0, 1]"));
        }
        *slot = component;
    }
    Ok(color)
}
