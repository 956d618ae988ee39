use optolab_transport::available_ports;
use serde::Serialize;

use crate::cmd::PortsArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct PortEntry {
    name: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize)]
struct PortsOutput {
    schema_id: &'static str,
    ports: Vec<PortEntry>,
}

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports: Vec<PortEntry> = available_ports()
        .map_err(|err| transport_error("list serial ports", err))?
        .into_iter()
        .map(|p| PortEntry {
            name: p.name,
            kind: p.kind,
            description: p.description,
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&PortsOutput {
            schema_id: "optolab/cli/v1/ports",
            ports,
        }),
        OutputFormat::Table => print_table(
            &["PORT", "KIND", "DESCRIPTION"],
            ports.into_iter().map(|p| {
                vec![p.name, p.kind.to_string(), p.description.unwrap_or_default()]
            }),
        ),
        OutputFormat::Pretty => {
            if ports.is_empty() {
                println!("no serial ports found");
            }
            for p in ports {
                match p.description {
                    Some(description) => println!("{} ({}, {description})", p.name, p.kind),
                    None => println!("{} ({})", p.name, p.kind),
                }
            }
        }
        OutputFormat::Raw => {
            for p in ports {
                println!("{}", p.name);
            }
        }
    }
    Ok(SUCCESS)
}
