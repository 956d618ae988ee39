use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender};
use std::thread;

use optolab_lcvr::{Lcvr, SimulatedLcvr};
use optolab_sweep::{
    drive, drive_nested, DataSink, NestedSweep, ResumePolicy, StepRecord, SweepConfig,
    SweepControl, SweepController, SweepEvent, SweepOutcome, SweepRange,
};
use optolab_transport::{ByteTransport, SerialTransport};
use optolab_zaber::{ActuatorConfig, Target};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cmd::zaber::{self, DynActuator};
use crate::cmd::{parse_duration, ResumeArg, SweepArgs};
use crate::exit::{
    actuator_error, io_error, lcvr_error, sweep_error, transport_error, CliError, CliResult,
    INTERNAL, SUCCESS,
};
use crate::output::{print_json, OutputFormat};

type DynLcvr = Lcvr<Box<dyn ByteTransport + Send>>;

/// What the worker thread hands to the printing thread.
enum Line {
    Step(StepRecord),
    Event(SweepEvent),
}

#[derive(Serialize)]
struct StepOutput<'a> {
    schema_id: &'static str,
    #[serde(flatten)]
    record: &'a StepRecord,
}

/// Forwards step records to the printing thread.
struct ChannelSink {
    tx: Sender<Line>,
}

impl DataSink for ChannelSink {
    type Error = io::Error;

    fn record(&mut self, record: &StepRecord) -> Result<(), io::Error> {
        self.tx
            .send(Line::Step(*record))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "output closed"))
    }
}

/// The actuator half of a nested sweep.
struct Outer {
    range: SweepRange,
    actuator: DynActuator,
    target: Target,
}

pub fn run(args: SweepArgs, format: OutputFormat) -> CliResult<i32> {
    let range = SweepRange::new(args.start, args.end, args.step)
        .map_err(|err| sweep_error("invalid voltage range", err))?;
    let channel = optolab_lcvr::protocol::check_channel(args.channel)
        .map_err(|err| lcvr_error("invalid channel", err))?;

    let pause_timeout = args
        .pause_timeout
        .as_deref()
        .map(|t| parse_duration("pause timeout", t))
        .transpose()?;
    let config = SweepConfig {
        pause_timeout,
        resume_policy: match args.resume {
            ResumeArg::Rewind => ResumePolicy::Rewind,
            ResumeArg::Continue => ResumePolicy::Continue,
        },
        ..SweepConfig::default()
    };

    let mut lcvr = open_lcvr(args.lcvr_port.as_deref(), args.simulate)?;
    let outer = open_outer(&args)?;

    let control = SweepControl::new();
    install_ctrlc_handler(control.clone())?;
    if args.interactive {
        spawn_stdin_control(control.clone());
    }

    let (tx, rx) = mpsc::channel::<Line>();
    let (event_tx, event_rx) = mpsc::channel::<SweepEvent>();
    let forward = tx.clone();
    thread::spawn(move || {
        for event in event_rx {
            if forward.send(Line::Event(event)).is_err() {
                break;
            }
        }
    });

    let worker = thread::Builder::new()
        .name("sweep".to_string())
        .spawn(move || -> CliResult<SweepOutcome> {
            let mut sink = ChannelSink { tx };
            let outcome = match outer {
                None => {
                    let mut sweep = SweepController::with_control(range, control)
                        .with_config(config)
                        .with_events(event_tx);
                    drive(&mut sweep, &mut lcvr, channel, &mut sink)
                }
                Some(mut outer) => {
                    let mut sweep = NestedSweep::with_control(outer.range, range, control)
                        .with_config(config)
                        .with_events(event_tx);
                    drive_nested(
                        &mut sweep,
                        &mut outer.actuator,
                        outer.target,
                        &mut lcvr,
                        channel,
                        &mut sink,
                    )
                }
            };
            outcome.map_err(|err| sweep_error("sweep failed", err))
        })
        .map_err(|err| io_error("failed to start sweep worker", err))?;

    for line in rx {
        print_line(line, format);
    }

    let outcome = worker
        .join()
        .map_err(|_| CliError::new(INTERNAL, "sweep worker panicked"))??;
    info!(?outcome, "sweep finished");
    Ok(SUCCESS)
}

fn open_lcvr(port: Option<&str>, simulate: bool) -> CliResult<DynLcvr> {
    let transport: Box<dyn ByteTransport + Send> = match (port, simulate) {
        (_, true) => Box::new(SimulatedLcvr::new()),
        (Some(port), false) => Box::new(
            SerialTransport::open(port, &optolab_lcvr::serial_settings())
                .map_err(|err| transport_error(&format!("open {port}"), err))?,
        ),
        (None, false) => {
            return Err(CliError::new(
                crate::exit::USAGE,
                "no voltage controller port given",
            ))
        }
    };
    Ok(Lcvr::new(transport))
}

fn open_outer(args: &SweepArgs) -> CliResult<Option<Outer>> {
    let (Some(start), Some(end), Some(step)) = (args.zaber_start, args.zaber_end, args.zaber_step)
    else {
        return Ok(None);
    };
    let range = SweepRange::from_units(start, end, step)
        .map_err(|err| sweep_error("invalid actuator range", err))?;
    let target = Target::one(args.zaber_device)
        .map_err(|err| actuator_error("invalid actuator", err))?;
    let timeout = parse_duration("zaber timeout", &args.zaber_timeout)?;
    let config = ActuatorConfig {
        reply_timeout: Some(timeout),
        ..ActuatorConfig::default()
    };

    let simulate = args.simulate.then_some(args.zaber_device);
    let mut actuator = zaber::open(args.zaber_port.as_deref(), simulate, config)?;
    actuator
        .renumber(Target::All, None)
        .map_err(|err| actuator_error("renumber failed", err))?;
    Ok(Some(Outer {
        range,
        actuator,
        target,
    }))
}

fn print_line(line: Line, format: OutputFormat) {
    match line {
        Line::Step(record) => match format {
            OutputFormat::Json => print_json(&StepOutput {
                schema_id: "optolab/cli/v1/sweep-step",
                record: &record,
            }),
            OutputFormat::Table | OutputFormat::Pretty => match record.outer_setpoint {
                Some(outer) => println!(
                    "outer={outer} setpoint={} reading={:.4}",
                    record.setpoint, record.reading
                ),
                None => println!("setpoint={} reading={:.4}", record.setpoint, record.reading),
            },
            OutputFormat::Raw => println!("{} {}", record.setpoint, record.reading),
        },
        Line::Event(event) => match event {
            SweepEvent::Step { .. } => debug!(?event, "sweep step"),
            SweepEvent::Started { depth: 0, steps } => info!(steps, "sweep started"),
            SweepEvent::Paused { depth, before } => info!(depth, before, "sweep paused"),
            SweepEvent::Resumed { depth, next } => info!(depth, next, "sweep resumed"),
            other => debug!(event = ?other, "sweep event"),
        },
    }
}

fn install_ctrlc_handler(control: SweepControl) -> CliResult<()> {
    ctrlc::set_handler(move || {
        control.kill();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

/// Accept `pause`, `resume` and `kill` (or `p`, `r`, `k`) on stdin.
fn spawn_stdin_control(control: SweepControl) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "p" | "pause" => control.pause(),
                "r" | "resume" => control.resume(),
                "k" | "kill" | "q" | "quit" => {
                    control.kill();
                    break;
                }
                "" => {}
                other => warn!(command = other, "unknown control command"),
            }
            info!(state = ?control.state(), "control");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_fails_once_output_is_gone() {
        let (tx, rx) = mpsc::channel();
        let mut sink = ChannelSink { tx };
        let record = StepRecord {
            index: 0,
            setpoint: 0.0,
            reading: 0.0,
            outer_setpoint: None,
        };
        sink.record(&record).unwrap();
        drop(rx);
        let err = sink.record(&record).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn simulated_controller_opens_without_port() {
        let mut lcvr = open_lcvr(None, true).unwrap();
        lcvr.set_voltage(1, 2.0).unwrap();
        assert!((lcvr.get_voltage(1).unwrap() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn missing_port_is_usage_error() {
        let err = open_lcvr(None, false).err().unwrap();
        assert_eq!(err.code, crate::exit::USAGE);
    }
}
