use std::path::Path;

use optolab_spe::{decode_path, subtract_background, FrameStats, SpeFrame, SpeHeader};
use serde::Serialize;

use crate::cmd::{SpeAction, SpeArgs};
use crate::exit::{decode_error, subtract_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct InfoOutput<'a> {
    schema_id: &'static str,
    path: String,
    header: &'a SpeHeader,
    frames: Vec<FrameStats>,
}

#[derive(Serialize)]
struct AxisOutput<'a> {
    schema_id: &'static str,
    path: String,
    wavelengths: &'a [f64],
}

#[derive(Serialize)]
struct SubtractOutput {
    schema_id: &'static str,
    path: String,
    background: String,
    shape: [usize; 3],
    frames: Vec<FrameStats>,
}

pub fn run(args: SpeArgs, format: OutputFormat) -> CliResult<i32> {
    match args.action {
        SpeAction::Info { file } => info(&file, format),
        SpeAction::Axis { file } => axis(&file, format),
        SpeAction::Subtract { file, background } => subtract(&file, &background, format),
    }
}

fn load(path: &Path) -> CliResult<SpeFrame> {
    decode_path(path).map_err(|err| decode_error(&format!("decode {}", path.display()), err))
}

fn info(path: &Path, format: OutputFormat) -> CliResult<i32> {
    let frame = load(path)?;
    let data = frame.data();
    let frames: Vec<FrameStats> = (0..data.num_frames())
        .filter_map(|i| data.frame_stats(i))
        .collect();
    let header = frame.header();

    match format {
        OutputFormat::Json => print_json(&InfoOutput {
            schema_id: "optolab/cli/v1/spe-info",
            path: path.display().to_string(),
            header,
            frames,
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            let calibration = &header.calibration;
            let coefficients = calibration.coefficients.map(|c| format!("{c}")).join(", ");
            print_table(
                &["FIELD", "VALUE"],
                [
                    vec!["file".to_string(), path.display().to_string()],
                    vec![
                        "image".to_string(),
                        format!("{} x {} x {} frames", header.x_dim, header.y_dim, header.num_frames),
                    ],
                    vec!["datatype".to_string(), header.datatype.to_string()],
                    vec![
                        "detector".to_string(),
                        format!("{} x {}", header.detector_x_dim, header.detector_y_dim),
                    ],
                    vec![
                        "calibration".to_string(),
                        format!(
                            "order {}, {} points",
                            calibration.polynom_order,
                            calibration.pixel_positions.len()
                        ),
                    ],
                    vec!["coefficients".to_string(), coefficients],
                ],
            );
            print_stats(&frames);
        }
        OutputFormat::Raw => {
            println!("{} {} {} {}", header.x_dim, header.y_dim, header.num_frames, header.datatype);
        }
    }
    Ok(SUCCESS)
}

fn axis(path: &Path, format: OutputFormat) -> CliResult<i32> {
    let frame = load(path)?;
    let axis = frame.wavelength_axis().to_vec();

    match format {
        OutputFormat::Json => print_json(&AxisOutput {
            schema_id: "optolab/cli/v1/spe-axis",
            path: path.display().to_string(),
            wavelengths: &axis,
        }),
        OutputFormat::Table | OutputFormat::Pretty => print_table(
            &["PIXEL", "WAVELENGTH"],
            axis.iter()
                .enumerate()
                .map(|(i, w)| vec![i.to_string(), format!("{w:.4}")]),
        ),
        OutputFormat::Raw => {
            for w in &axis {
                println!("{w}");
            }
        }
    }
    Ok(SUCCESS)
}

fn subtract(path: &Path, background_path: &Path, format: OutputFormat) -> CliResult<i32> {
    let image = load(path)?;
    let background = load(background_path)?;
    let corrected = subtract_background(&image, &background)
        .map_err(|err| subtract_error("background subtraction", err))?;

    let (num_frames, rows, cols) = corrected.dim();
    let frames: Vec<FrameStats> = corrected
        .outer_iter()
        .enumerate()
        .filter_map(|(frame, values)| {
            let min = values.iter().copied().reduce(f64::min)?;
            let max = values.iter().copied().reduce(f64::max)?;
            let mean = values.mean()?;
            Some(FrameStats {
                frame,
                min,
                max,
                mean,
            })
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&SubtractOutput {
            schema_id: "optolab/cli/v1/spe-subtract",
            path: path.display().to_string(),
            background: background_path.display().to_string(),
            shape: [num_frames, rows, cols],
            frames,
        }),
        OutputFormat::Table | OutputFormat::Pretty => print_stats(&frames),
        OutputFormat::Raw => {
            for frame in corrected.outer_iter() {
                for row in frame.rows() {
                    let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                    println!("{}", line.join(" "));
                }
            }
        }
    }
    Ok(SUCCESS)
}

fn print_stats(frames: &[FrameStats]) {
    print_table(
        &["FRAME", "MIN", "MAX", "MEAN"],
        frames.iter().map(|s| {
            vec![
                s.frame.to_string(),
                s.min.to_string(),
                s.max.to_string(),
                format!("{:.3}", s.mean),
            ]
        }),
    );
}
