//! Command dispatch: bridges CLI args -> core operations -> output.

pub mod resource;
pub mod service;
pub mod url;
pub mod util;
pub mod watch;

use printdesk_core::Backend;

use crate::cli::{Command, GlobalOpts};
use crate::config::Settings;
use crate::error::CliError;

/// Dispatch a backend-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    backend: &Backend,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Url(args) => url::handle(backend, settings, args).await,
        Command::Get(args) => resource::get(backend, args, global).await,
        Command::Create(args) => resource::create(backend, args, global).await,
        Command::Update(args) => resource::update(backend, args, global).await,
        Command::Delete(args) => resource::delete(backend, args).await,
        Command::Watch(args) => watch::handle(backend, args, global).await,
        Command::Service(args) => service::handle(settings, args).await,
        Command::Completions(_) => Err(CliError::Internal(
            "completions are generated before dispatch".into(),
        )),
    }
}
