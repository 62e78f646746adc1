//! `printdesk get|create|update|delete`: CRUD through a resource store.

use printdesk_core::Backend;

use crate::cli::{BodyArgs, GlobalOpts, QueryArgs};
use crate::error::CliError;
use crate::output::render_json;
use super::util::{parse_query, read_body, store_for};

pub async fn get(backend: &Backend, args: QueryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let query = parse_query(&args.query)?;
    let store = store_for(backend, &args.endpoint);

    let items = store.get_all(query.as_ref()).await?;
    println!("{}", render_json(global.output, &items)?);
    Ok(())
}

pub async fn create(backend: &Backend, args: BodyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let body = read_body(&args)?;
    let store = store_for(backend, &args.endpoint);

    let created = store.create(&body).await;
    finish_mutation(store.is_error(), created, &args.endpoint.path, global)
}

pub async fn update(backend: &Backend, args: BodyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let body = read_body(&args)?;
    let store = store_for(backend, &args.endpoint);

    let updated = store.update(&body).await;
    finish_mutation(store.is_error(), updated, &args.endpoint.path, global)
}

pub async fn delete(backend: &Backend, args: QueryArgs) -> Result<(), CliError> {
    let query = parse_query(&args.query)?;
    let store = store_for(backend, &args.endpoint);

    if store.remove(query.as_ref()).await {
        Ok(())
    } else {
        Err(CliError::Rejected {
            path: args.endpoint.path,
        })
    }
}

fn finish_mutation(
    failed: bool,
    body: Option<serde_json::Value>,
    path: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if failed {
        return Err(CliError::Rejected { path: path.into() });
    }
    if let Some(body) = body {
        println!("{}", render_json(global.output, &body)?);
    }
    Ok(())
}
