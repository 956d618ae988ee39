use optolab_transport::{ByteTransport, SerialSettings, SerialTransport};
use optolab_zaber::{
    Actuator, ActuatorConfig, ActuatorError, Position, SimulatedChain, StatusReport, Target,
};
use serde::Serialize;
use tracing::info;

use crate::cmd::{parse_duration, TargetArgs, ZaberAction, ZaberArgs};
use crate::exit::{actuator_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, print_table, OutputFormat};

/// Actuator over whichever transport the user picked.
pub type DynActuator = Actuator<Box<dyn ByteTransport + Send>>;

#[derive(Serialize)]
#[serde(untagged)]
enum Replies {
    Positions(Vec<Position>),
    Statuses(Vec<StatusReport>),
}

#[derive(Serialize)]
struct ZaberOutput {
    schema_id: &'static str,
    action: &'static str,
    target: String,
    replies: Replies,
}

pub fn run(args: ZaberArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration("timeout", &args.timeout)?;
    let config = ActuatorConfig {
        reply_timeout: Some(timeout),
        ..ActuatorConfig::default()
    };
    let mut actuator = open(args.port.as_deref(), args.simulate, config)?;

    let discovered = actuator
        .renumber(Target::All, None)
        .map_err(|err| actuator_error("renumber failed", err))?;
    info!(devices = discovered.len(), "chain ready");

    let (action, target, replies) = execute(&mut actuator, args.action, discovered)?;
    print_replies(
        &ZaberOutput {
            schema_id: "optolab/cli/v1/zaber-replies",
            action,
            target: target.to_string(),
            replies,
        },
        format,
    );
    Ok(SUCCESS)
}

/// Open a real port or build a simulated chain.
pub fn open(
    port: Option<&str>,
    simulate: Option<u8>,
    config: ActuatorConfig,
) -> CliResult<DynActuator> {
    let transport: Box<dyn ByteTransport + Send> = match (port, simulate) {
        (_, Some(0)) => {
            return Err(CliError::new(USAGE, "simulated chain needs at least one device"));
        }
        (_, Some(devices)) => Box::new(SimulatedChain::new(devices)),
        (Some(port), None) => Box::new(
            SerialTransport::open(port, &SerialSettings::default())
                .map_err(|err| transport_error(&format!("open {port}"), err))?,
        ),
        (None, None) => return Err(CliError::new(USAGE, "no actuator port given")),
    };
    Ok(Actuator::with_config(transport, config))
}

fn target(args: TargetArgs) -> CliResult<Target> {
    Target::from_option(args.device).map_err(|err| actuator_error("bad target", err))
}

fn execute(
    actuator: &mut DynActuator,
    action: ZaberAction,
    discovered: Vec<Position>,
) -> CliResult<(&'static str, Target, Replies)> {
    let result = match action {
        ZaberAction::Renumber => ("renumber", Target::All, Replies::Positions(discovered)),
        ZaberAction::Home(args) => {
            let t = target(args)?;
            ("home", t, Replies::Positions(actuator.home(t).map_err(failed("home"))?))
        }
        ZaberAction::Reset(args) => {
            let t = target(args)?;
            actuator.reset(t).map_err(failed("reset"))?;
            ("reset", t, Replies::Positions(Vec::new()))
        }
        ZaberAction::MoveAbs { target: args, position } => {
            let t = target(args)?;
            let replies = actuator.goto_absolute(t, position).map_err(failed("move"))?;
            ("move-abs", t, Replies::Positions(replies))
        }
        ZaberAction::MoveRel { target: args, distance } => {
            let t = target(args)?;
            let replies = actuator.goto_relative(t, distance).map_err(failed("move"))?;
            ("move-rel", t, Replies::Positions(replies))
        }
        ZaberAction::Position(args) => {
            let t = target(args)?;
            let replies = actuator.get_position(t).map_err(failed("position"))?;
            ("position", t, Replies::Positions(replies))
        }
        ZaberAction::Status(args) => {
            let t = target(args)?;
            let replies = actuator.get_status(t).map_err(failed("status"))?;
            ("status", t, Replies::Statuses(replies))
        }
        ZaberAction::Store { target: args, slot } => {
            let t = target(args)?;
            let replies = actuator.store_position(t, slot).map_err(failed("store"))?;
            ("store", t, Replies::Positions(replies))
        }
        ZaberAction::Recall { target: args, slot } => {
            let t = target(args)?;
            let replies = actuator.recall_position(t, slot).map_err(failed("recall"))?;
            ("recall", t, Replies::Positions(replies))
        }
        ZaberAction::GotoStored { target: args, slot } => {
            let t = target(args)?;
            let replies = actuator.goto_stored(t, slot).map_err(failed("goto-stored"))?;
            ("goto-stored", t, Replies::Positions(replies))
        }
    };
    Ok(result)
}

fn failed(what: &'static str) -> impl Fn(ActuatorError) -> CliError {
    move |err| actuator_error(&format!("{what} failed"), err)
}

fn print_replies(out: &ZaberOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => match &out.replies {
            Replies::Positions(replies) => print_table(
                &["DEVICE", "POSITION"],
                replies
                    .iter()
                    .map(|p| vec![p.device_id.to_string(), p.position.to_string()]),
            ),
            Replies::Statuses(replies) => print_table(
                &["DEVICE", "STATUS", "CODE"],
                replies.iter().map(|s| {
                    vec![
                        s.device_id.to_string(),
                        s.status.label().to_string(),
                        s.status.code().to_string(),
                    ]
                }),
            ),
        },
        OutputFormat::Pretty => {
            println!("{} ({}):", out.action, out.target);
            match &out.replies {
                Replies::Positions(replies) => {
                    for p in replies {
                        println!("  device {}: {}", p.device_id, p.position);
                    }
                }
                Replies::Statuses(replies) => {
                    for s in replies {
                        println!("  device {}: {}", s.device_id, s.status.label());
                    }
                }
            }
        }
        OutputFormat::Raw => match &out.replies {
            Replies::Positions(replies) => {
                for p in replies {
                    println!("{} {}", p.device_id, p.position);
                }
            }
            Replies::Statuses(replies) => {
                for s in replies {
                    println!("{} {}", s.device_id, s.status.code());
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulated(devices: u8) -> DynActuator {
        let config = ActuatorConfig::immediate();
        let mut actuator = open(None, Some(devices), config).unwrap();
        actuator.renumber(Target::All, None).unwrap();
        actuator
    }

    #[test]
    fn broadcast_home_reports_every_device() {
        let mut actuator = simulated(3);
        let (action, target, replies) = execute(
            &mut actuator,
            ZaberAction::Home(TargetArgs { device: None }),
            Vec::new(),
        )
        .unwrap();
        assert_eq!(action, "home");
        assert!(target.is_broadcast());
        match replies {
            Replies::Positions(p) => assert_eq!(p.len(), 3),
            Replies::Statuses(_) => panic!("expected positions"),
        }
    }

    #[test]
    fn device_zero_is_a_usage_error() {
        let mut actuator = simulated(1);
        let err = execute(
            &mut actuator,
            ZaberAction::Position(TargetArgs { device: Some(0) }),
            Vec::new(),
        )
        .err()
        .unwrap();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn move_out_of_range_is_a_device_fault() {
        let mut actuator = simulated(1);
        let err = execute(
            &mut actuator,
            ZaberAction::MoveAbs {
                target: TargetArgs { device: Some(1) },
                position: -5,
            },
            Vec::new(),
        )
        .err()
        .unwrap();
        assert_eq!(err.code, crate::exit::DEVICE_FAULT);
    }

    #[test]
    fn empty_simulated_chain_is_rejected() {
        let err = open(None, Some(0), ActuatorConfig::immediate()).err().unwrap();
        assert_eq!(err.code, USAGE);
    }
}
