//! `intake fill`: a line-oriented submitter session.
//!
//! Each input line is one command:
//!
//! ```text
//! firstName=Ana       set a field
//! submit              validate and submit
//! show                print the local snapshot
//! quit                close the session
//! ```

use std::time::Instant;

use anyhow::Context;
use api_shared::ClientEvent;
use intake_core::{
    ClientConfig, IntakeController, IntakeError, PatientField, PatientSnapshot, Push,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::MissedTickBehavior;

use crate::link::{Link, LinkEvent};
use crate::render::render_snapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Set(PatientField, String),
    Submit,
    Show,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
///
/// Values keep their inner spacing but are trimmed at both ends.
pub fn parse_command(line: &str) -> Result<Option<Command>, IntakeError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some((name, value)) = line.split_once('=') {
        let field: PatientField = name.trim().parse()?;
        return Ok(Some(Command::Set(field, value.trim().to_string())));
    }

    match line {
        "submit" => Ok(Some(Command::Submit)),
        "show" => Ok(Some(Command::Show)),
        "quit" | "exit" => Ok(Some(Command::Quit)),
        other => Err(IntakeError::InvalidInput(format!(
            "expected <field>=<value>, submit, show or quit; got {other:?}"
        ))),
    }
}

/// Runs a submitter session until `quit` or end of input.
pub async fn run_fill<R>(
    cfg: &ClientConfig,
    initial: PatientSnapshot,
    input: R,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut controller = IntakeController::new(initial, cfg.idle_timeout(), Instant::now());
    let mut link = Link::spawn(cfg.socket_url().to_string(), cfg.reconnect_delay());
    let mut lines = input.lines();

    let mut idle_monitor = tokio::time::interval(cfg.idle_poll_interval());
    idle_monitor.set_missed_tick_behavior(MissedTickBehavior::Delay);

    println!("Connecting to {} ...", cfg.socket_url());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => apply(&mut controller, &link, command)?,
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
            event = link.next_event() => match event {
                Some(LinkEvent::Connected) => {
                    println!("Relay connection: live");
                    push(&link, controller.on_connected())?;
                }
                Some(LinkEvent::Disconnected) => {
                    controller.on_disconnected();
                    println!("Relay connection: offline");
                }
                Some(LinkEvent::Update(_)) => {}
                None => anyhow::bail!("relay link stopped unexpectedly"),
            },
            _ = idle_monitor.tick() => {
                let before = controller.snapshot().status;
                push(&link, controller.tick(Instant::now()))?;
                if controller.snapshot().status != before {
                    println!("No activity; session marked {}", controller.snapshot().status);
                }
            }
        }
    }

    link.shutdown().await;
    Ok(())
}

fn apply(controller: &mut IntakeController, link: &Link, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Set(field, value) => push(link, controller.edit(field, value, Instant::now())),
        Command::Submit => match controller.submit() {
            Ok(pushed) => {
                push(link, pushed)?;
                println!("Form submitted successfully!");
                Ok(())
            }
            Err(errors) => {
                for (field, message) in &errors {
                    println!("  {field}: {message}");
                }
                Ok(())
            }
        },
        Command::Show => {
            println!("{}", render_snapshot(controller.snapshot()));
            println!("connection: {}", controller.connection());
            Ok(())
        }
        Command::Quit => Ok(()),
    }
}

fn push(link: &Link, pushed: Push) -> anyhow::Result<()> {
    if let Some(snapshot) = pushed {
        link.send(ClientEvent::patient_update(&snapshot)?);
    }
    Ok(())
}
