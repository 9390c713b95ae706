use renderer_core::{DEFAULT_CANVAS_WIDTH, RenderConfig, render_file};

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(version, about = "Render an OSM XML extract to a PNG", long_about = None)]
struct Args {
    /// OSM XML file to read
    #[arg(short, long, default_value = "map.osm")]
    input: PathBuf,

    /// PNG file to write
    #[arg(short, long, default_value = "test.png")]
    output: PathBuf,

    /// Width of the image in pixels, the height follows the map's aspect ratio
    #[arg(short, long, default_value_t = DEFAULT_CANVAS_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Log every pipeline phase with timings
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let config = RenderConfig::with_width(args.width);

    render_file(&args.input, &args.output, &config).with_context(|| {
        format!(
            "Failed to render {} into {}",
            args.input.display(),
            args.output.display()
        )
    })?;

    println!("Saved map to: {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_file_names() {
        let args = Args::try_parse_from(["renderer-cli"]).unwrap();

        assert_eq!(args.input, PathBuf::from("map.osm"));
        assert_eq!(args.output, PathBuf::from("test.png"));
        assert_eq!(args.width, 2000);
        assert!(!args.verbose);
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(Args::try_parse_from(["renderer-cli", "--width", "0"]).is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "renderer-cli",
            "-i",
            "city.osm",
            "-o",
            "city.png",
            "-w",
            "640",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.input, PathBuf::from("city.osm"));
        assert_eq!(args.output, PathBuf::from("city.png"));
        assert_eq!(args.width, 640);
        assert!(args.verbose);
    }
}
