use crate::args::Commands;
use anyhow::Context;
use asp::capabilities;
use asp::domain::config::AspConfig;
use asp::kernel::nalgebra::Vector2;
use asp_stereo::{SessionInputs, SessionKind, open_session};
use std::io::{self, Write};
use std::path::Path;

pub fn run(command: Commands, cfg: &AspConfig) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match command {
        Commands::Capabilities { json } => report_capabilities(&mut out, json),
        Commands::CubeInfo { cube } => cube_info(&mut out, &cube),
        Commands::Triangulate { session, left, right, left_pixel, right_pixel, left_adjust, right_adjust } => {
            let kind = SessionKind::parse(session.as_deref().unwrap_or(&cfg.stereo.session))?;
            let inputs = SessionInputs { left, right, left_adjust, right_adjust };
            triangulate(&mut out, kind, &inputs, left_pixel, right_pixel, cfg)
        },
    }
}

fn report_capabilities(out: &mut impl Write, json: bool) -> anyhow::Result<()> {
    let report = capabilities::report();
    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        for status in &report {
            writeln!(out, "{}: {}", status.name, status.state())?;
        }
    }
    Ok(())
}

#[cfg(asp_isis)]
fn cube_info(out: &mut impl Write, cube: &Path) -> anyhow::Result<()> {
    use asp::isis_io::DiskImageResourceIsis;

    let resource = DiskImageResourceIsis::open(cube)?;
    let label = resource.label();
    let (min, max) = resource.valid_range();

    writeln!(out, "cube: {}", cube.display())?;
    writeln!(out, "size: {} x {} x {}", resource.cols(), resource.rows(), resource.planes())?;
    writeln!(out, "pixel type: {} ({:?})", resource.pixel_type(), label.byte_order)?;
    writeln!(out, "format: {:?}", label.format)?;
    writeln!(out, "valid range: [{min}, {max}]")?;

    let image = resource.read_all()?;
    for band in 0..image.planes {
        match image.plane_stats(band) {
            Some(stats) => writeln!(
                out,
                "band {}: valid {} min {} max {} mean {:.4}",
                band + 1,
                stats.valid,
                stats.min,
                stats.max,
                stats.mean
            )?,
            None => writeln!(out, "band {}: no valid pixels", band + 1)?,
        }
    }
    Ok(())
}

#[cfg(not(asp_isis))]
fn cube_info(_out: &mut impl Write, cube: &Path) -> anyhow::Result<()> {
    anyhow::bail!(
        "cannot read {}: this build lacks the ISIS capability (rebuild with `--features isis`)",
        cube.display()
    )
}

fn triangulate(
    out: &mut impl Write,
    kind: SessionKind,
    inputs: &SessionInputs,
    left_pixel: (f64, f64),
    right_pixel: (f64, f64),
    cfg: &AspConfig,
) -> anyhow::Result<()> {
    let session = open_session(kind, inputs, cfg).with_context(|| describe(kind, &inputs.left, &inputs.right))?;
    let hit = session.triangulate(
        &Vector2::new(left_pixel.0, left_pixel.1),
        &Vector2::new(right_pixel.0, right_pixel.1),
    )?;

    writeln!(out, "point: {:.6} {:.6} {:.6}", hit.point.x, hit.point.y, hit.point.z)?;
    writeln!(out, "error: {:.6}", hit.error)?;
    Ok(())
}

fn describe(kind: SessionKind, left: &Path, right: &Path) -> String {
    let name = |p: &Path| p.file_name().map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned());
    format!("Failed to open {kind} session for {} / {}", name(left), name(right))
}
