//! `intake watch`: the dashboard role.

use std::future::Future;

use chrono::Local;
use intake_core::{ClientConfig, ObserverNotice, ObserverView};

use crate::link::{Link, LinkEvent};
use crate::render::render_view;

/// Prints every relayed snapshot until ctrl-c.
pub async fn run_watch(cfg: &ClientConfig) -> anyhow::Result<()> {
    println!("Watching {} (ctrl-c to stop)", cfg.socket_url());
    watch_until(cfg, tokio::signal::ctrl_c()).await
}

/// Runs the dashboard loop until `stop` resolves. `stop` is polled across loop turns, so a
/// signal arriving while updates are being printed is not lost.
async fn watch_until<F>(cfg: &ClientConfig, stop: F) -> anyhow::Result<()>
where
    F: Future,
{
    let mut view = ObserverView::new();
    let mut link = Link::spawn(cfg.socket_url().to_string(), cfg.reconnect_delay());

    tokio::pin!(stop);

    loop {
        tokio::select! {
            event = link.next_event() => {
                let Some(event) = event else {
                    anyhow::bail!("relay link stopped unexpectedly");
                };
                for line in observe(&mut view, event) {
                    println!("{line}");
                }
            }
            _ = &mut stop => break,
        }
    }

    link.shutdown().await;
    Ok(())
}

/// Applies one link event to the view and returns the lines to print.
fn observe(view: &mut ObserverView, event: LinkEvent) -> Vec<String> {
    match event {
        LinkEvent::Connected => {
            view.on_connected();
            vec!["Relay connection: live".to_string()]
        }
        LinkEvent::Disconnected => {
            view.on_disconnected();
            vec!["Relay connection: offline".to_string()]
        }
        LinkEvent::Update(payload) => match view.apply_update(payload, Local::now()) {
            Ok(notice) => {
                let mut lines = vec![render_view(view)];
                if notice == ObserverNotice::Submitted {
                    lines.push("*** Patient form submitted ***".to_string());
                }
                lines
            }
            Err(e) => {
                tracing::warn!("ignoring update: {e}");
                Vec::new()
            }
        },
    }
}
