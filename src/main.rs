use std::env;
use std::io;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use lead_lifecycle::csv::{read_leads, read_status_changes, write_menus, write_status_outcomes};
use lead_lifecycle::desk::{Command, Desk};
use lead_lifecycle::model::Role;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: lead-lifecycle menus <role> <leads.csv>\n       lead-lifecycle transitions <requests.csv>";

/// Environment variable overriding the reference clock, in unix seconds.
const NOW_VAR: &str = "LEAD_LIFECYCLE_NOW";

enum Mode {
    Menus { role: Role, path: String },
    Transitions { path: String },
}

fn parse_args(args: &[String]) -> Option<Mode> {
    match args {
        [mode, role, path] if mode == "menus" => match role.parse() {
            Ok(role) => Some(Mode::Menus {
                role,
                path: path.clone(),
            }),
            Err(e) => {
                error!("{e}");
                None
            }
        },
        [mode, path] if mode == "transitions" => Some(Mode::Transitions { path: path.clone() }),
        _ => None,
    }
}

fn now() -> i64 {
    if let Ok(raw) = env::var(NOW_VAR) {
        match raw.trim().parse() {
            Ok(now) => return now,
            Err(_) => warn!(value = %raw, "ignoring invalid {NOW_VAR}"),
        }
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn warn_if_not_csv(path: &str) {
    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(mode) = parse_args(&args) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let mut desk = Desk::new(now());
    let (cmd_sender, cmd_receiver) = mpsc::channel(16);

    match &mode {
        Mode::Menus { role, path } => {
            warn_if_not_csv(path);
            let rows = match read_leads(path.clone()) {
                Ok(rows) => rows,
                Err(e) => {
                    error!("{e}");
                    return ExitCode::FAILURE;
                }
            };
            let role = *role;
            tokio::spawn(async move {
                for result in rows {
                    match result {
                        Ok((lead, snapshot)) => {
                            let command = Command::Menu {
                                lead,
                                role,
                                snapshot,
                            };
                            if cmd_sender.send(command).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("{e}");
                        }
                    }
                }
            });
        }
        Mode::Transitions { path } => {
            warn_if_not_csv(path);
            let rows = match read_status_changes(path.clone()) {
                Ok(rows) => rows,
                Err(e) => {
                    error!("{e}");
                    return ExitCode::FAILURE;
                }
            };
            tokio::spawn(async move {
                for result in rows {
                    match result {
                        Ok((lead, request)) => {
                            let command = Command::ChangeStatus { lead, request };
                            if cmd_sender.send(command).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("{e}");
                        }
                    }
                }
            });
        }
    }

    desk.run(ReceiverStream::new(cmd_receiver)).await;

    let stdout = io::stdout();
    let written = match mode {
        Mode::Menus { .. } => write_menus(stdout.lock(), desk.outcomes()),
        Mode::Transitions { .. } => write_status_outcomes(stdout.lock(), desk.outcomes()),
    };
    if let Err(e) = written {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
