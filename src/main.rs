use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use ani_depthplot::{ani_depthplot, DepthPlotOptions, DepthScale, ImageFormat};

const USAGE: &str = "\
ani-depthplot — anisotropy depth profile from MagIC tables

USAGE:
    ani-depthplot [OPTIONS]

OPTIONS:
    --dir <path>     directory with the input tables (default .)
    --spec <file>    specimens table (default specimens.txt)
    --samp <file>    samples table (default samples.txt)
    --meas <file>    measurements table (default measurements.txt)
    --site <file>    sites table (default sites.txt)
    --age <file>     ages table; takes precedence over samples
    --sum <file>     core-summary CSV with horizon depths
    --fmt <fmt>      svg | png | jpg (default svg)
    --dmin <num>     minimum depth to plot
    --dmax <num>     maximum depth to plot
    --scale <name>   core_depth | composite_depth | age (default core_depth)
    --out <path>     output directory (default .)
    -h, --help       print this message
";

fn parse_args() -> Result<(DepthPlotOptions, PathBuf)> {
    let mut options = DepthPlotOptions::default();
    let mut out_dir = PathBuf::from(".");

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("{flag} requires a value"))
        };
        match arg.as_str() {
            "--dir" => options.dir_path = PathBuf::from(value("--dir")?),
            "--spec" => options.spec_file = value("--spec")?,
            "--samp" => options.samp_file = value("--samp")?,
            "--meas" => options.meas_file = value("--meas")?,
            "--site" => options.site_file = value("--site")?,
            "--age" => options.age_file = Some(value("--age")?),
            "--sum" => options.sum_file = Some(value("--sum")?),
            "--fmt" => {
                let name = value("--fmt")?;
                options.fmt = ImageFormat::from_name(&name)
                    .with_context(|| format!("unknown format '{name}'"))?;
            }
            "--dmin" => {
                options.dmin = Some(value("--dmin")?.parse().context("--dmin must be numeric")?)
            }
            "--dmax" => {
                options.dmax = Some(value("--dmax")?.parse().context("--dmax must be numeric")?)
            }
            "--scale" => {
                let name = value("--scale")?;
                options.depth_scale = DepthScale::from_name(&name)
                    .with_context(|| format!("unknown depth scale '{name}'"))?;
            }
            "--out" => out_dir = PathBuf::from(value("--out")?),
            "-h" | "--help" => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument '{other}'\n\n{USAGE}"),
        }
    }
    Ok((options, out_dir))
}

fn main() -> Result<()> {
    env_logger::init();

    let (options, out_dir) = parse_args()?;
    let plot = ani_depthplot(&options).context("could not build depth plot")?;
    let path = plot.save(&out_dir).context("could not save figure")?;
    println!("saved {}", path.display());
    Ok(())
}
