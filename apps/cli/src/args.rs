//! Command-line interface of the `asp` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "asp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Ames Stereo Pipeline command line tools")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON); `asp.*` in the working directory is used when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report which optional capabilities this build includes
    Capabilities {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the geometry and pixel statistics of an ISIS cube
    CubeInfo {
        cube: PathBuf,
    },
    /// Triangulate one pair of matching pixels
    Triangulate {
        /// Stereo session (defaults to `stereo.session` from the configuration)
        #[arg(short, long)]
        session: Option<String>,
        /// Left camera file (pinhole JSON or ISIS cube)
        #[arg(long)]
        left: PathBuf,
        /// Right camera file (pinhole JSON or ISIS cube)
        #[arg(long)]
        right: PathBuf,
        /// Pixel in the left image as `x,y`
        #[arg(long, value_parser = parse_pixel, allow_hyphen_values = true)]
        left_pixel: (f64, f64),
        /// Pixel in the right image as `x,y`
        #[arg(long, value_parser = parse_pixel, allow_hyphen_values = true)]
        right_pixel: (f64, f64),
        /// Adjustment file for the left cube (ISIS sessions)
        #[arg(long)]
        left_adjust: Option<PathBuf>,
        /// Adjustment file for the right cube (ISIS sessions)
        #[arg(long)]
        right_adjust: Option<PathBuf>,
    },
}

fn parse_pixel(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw.split_once(',').ok_or_else(|| format!("expected `x,y`, got '{raw}'"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("invalid coordinate '{v}': {e}"));
    Ok((parse(x)?, parse(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pixels_parse_as_pairs() {
        assert_eq!(parse_pixel("12.5, -3").unwrap(), (12.5, -3.0));
        assert!(parse_pixel("12.5").is_err());
        assert!(parse_pixel("a,b").unwrap_err().contains("invalid coordinate"));
    }
}
