//! Executes one subcommand against the configured daemon.

use std::io::Write;
use std::sync::mpsc::{self, Receiver};

use wonder_client::{CallError, Reply, RpcClient};
use wonder_config::{Config, SocketEndpoint};
use wonder_proto::{Command, MAX_INFO_ITEMS, PlantRequest, StreamItem};

use crate::cli::CliCommand;
use crate::errors::AppError;
use crate::output::Renderer;

/// Events buffered between the receive loop and the renderer.
const EVENT_CAPACITY: usize = 1024;

pub(crate) fn execute<W: Write>(
    command: CliCommand,
    config: &Config,
    renderer: &mut Renderer<'_, W>,
) -> Result<(), AppError> {
    match command {
        CliCommand::Plant {
            what,
            color,
            number,
        } => {
            let client = connect(config.server_socket(), config)?;
            let request = PlantRequest {
                what,
                color,
                number,
            };
            let (replies, reply) = mpsc::sync_channel(1);
            client.plant(&request, replies)?;
            renderer.plant(&await_reply(Command::Plant, &reply)?)
        }
        CliCommand::Info => {
            let client = connect(config.server_socket(), config)?;
            // Room for a full snapshot, so a slow writer never loses `done`.
            let (items, received) = mpsc::sync_channel(MAX_INFO_ITEMS);
            client.info(items)?;
            for item in received {
                renderer.item(&item)?;
                if item.is_done() {
                    return Ok(());
                }
            }
            Err(AppError::StreamEnded {
                command: Command::GetInfo,
            })
        }
        CliCommand::Subscribe { limit } => {
            let client = connect(config.server_socket(), config)?;
            let (items, received) = mpsc::sync_channel(EVENT_CAPACITY);
            client.subscribe(items)?;
            follow(&received, limit, renderer)
        }
        CliCommand::List => {
            let client = connect(config.stage_socket(), config)?;
            let (replies, reply) = mpsc::sync_channel(1);
            client.list_servers(replies)?;
            renderer.members(&await_reply(Command::ListServers, &reply)?)
        }
        CliCommand::Report { address } => {
            let client = connect(config.stage_socket(), config)?;
            let (replies, reply) = mpsc::sync_channel(1);
            client.report_alive(&address, replies)?;
            renderer.acknowledgement(&await_reply(Command::ReportAlive, &reply)?)
        }
    }
}

fn connect(endpoint: &SocketEndpoint, config: &Config) -> Result<RpcClient, AppError> {
    RpcClient::connect(endpoint, config.dial_timeout()).map_err(AppError::from)
}

fn await_reply<T>(command: Command, reply: &Receiver<Reply<T>>) -> Result<T, AppError> {
    reply
        .recv()
        .unwrap_or(Err(CallError::Closed))
        .map_err(|source| AppError::Call { command, source })
}

fn follow<W: Write>(
    received: &Receiver<StreamItem>,
    limit: Option<usize>,
    renderer: &mut Renderer<'_, W>,
) -> Result<(), AppError> {
    let mut seen = 0;
    while limit.is_none_or(|limit| seen < limit) {
        let Ok(item) = received.recv() else {
            return Err(AppError::StreamEnded {
                command: Command::SubscribeEvents,
            });
        };
        renderer.item(&item)?;
        seen += 1;
    }
    Ok(())
}
