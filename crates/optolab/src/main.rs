mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "optolab", version, about = "Optical lab automation CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{SpeAction, ZaberAction};

    #[test]
    fn parses_spe_subtract() {
        let cli = Cli::try_parse_from([
            "optolab",
            "spe",
            "subtract",
            "scan.spe",
            "--background",
            "dark.spe",
        ])
        .expect("spe subtract should parse");

        match cli.command {
            Command::Spe(args) => assert!(matches!(args.action, SpeAction::Subtract { .. })),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_zaber_broadcast_home() {
        let cli = Cli::try_parse_from(["optolab", "zaber", "--simulate", "3", "home"])
            .expect("zaber home should parse");
        match cli.command {
            Command::Zaber(args) => {
                assert_eq!(args.simulate, Some(3));
                assert!(matches!(args.action, ZaberAction::Home(ref t) if t.device.is_none()));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_port_with_simulator() {
        let err = Cli::try_parse_from([
            "optolab",
            "zaber",
            "--port",
            "/dev/ttyUSB0",
            "--simulate",
            "2",
            "position",
        ])
        .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_nested_sweep() {
        let cli = Cli::try_parse_from([
            "optolab",
            "sweep",
            "--start",
            "0",
            "--end",
            "2.5",
            "--step",
            "0.5",
            "--simulate",
            "--zaber-start",
            "0",
            "--zaber-end",
            "1000",
            "--zaber-step",
            "500",
        ])
        .expect("nested sweep should parse");
        assert!(matches!(cli.command, Command::Sweep(_)));
    }

    #[test]
    fn zaber_outer_range_needs_all_three_bounds() {
        let err = Cli::try_parse_from([
            "optolab",
            "sweep",
            "--start",
            "0",
            "--end",
            "1",
            "--step",
            "0.5",
            "--simulate",
            "--zaber-start",
            "0",
        ])
        .expect_err("partial outer range should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
