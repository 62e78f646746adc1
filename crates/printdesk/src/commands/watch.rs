//! `printdesk watch`: follow the live status and log feed.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use printdesk_core::{Backend, ConnectionState};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output::{Painter, render_log};

pub async fn handle(backend: &Backend, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let painter = Painter::new(global.color);
    let channel = backend.status_channel();

    let mut logs = channel.subscribe_logs();
    let mut status = channel.watch_status();
    let mut state = channel.watch_state();
    channel.connect();

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    eprintln!("status: {}", painter.status(*status.borrow_and_update()));

    loop {
        tokio::select! {
            () = &mut deadline => break,
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            entry = logs.recv() => match entry {
                Ok(entry) => println!("{}", render_log(painter, &entry)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "log feed lagged"),
                Err(RecvError::Closed) => break,
            },
            Ok(()) = status.changed() => {
                eprintln!("status: {}", painter.status(*status.borrow_and_update()));
            }
            Ok(()) = state.changed() => {
                if let ConnectionState::Reconnecting { delay } = *state.borrow_and_update() {
                    eprintln!(
                        "{}",
                        painter.notice(&format!("reconnecting in {} ms", delay.as_millis()))
                    );
                }
            }
        }
    }

    channel.shutdown();
    Ok(())
}
