//! Move command: plans (and optionally applies) a drag-and-drop move.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use hc_core::{MoveScope, ServiceDefinition, UpdateRequest, plan_move};

use super::util::save_services;

/// Plans the move of service `id`, returning the update to apply.
pub fn plan(
    services: &[ServiceDefinition],
    id: &str,
    date: NaiveDate,
    hour: u32,
    scope: MoveScope,
) -> Result<UpdateRequest> {
    let definition = services
        .iter()
        .find(|s| s.id.as_str() == id)
        .with_context(|| format!("no service with ID {id}"))?;

    Ok(plan_move(definition, date, hour, scope)?)
}

/// Replaces the targeted definition with its updated form.
pub fn apply(services: &[ServiceDefinition], request: &UpdateRequest) -> Vec<ServiceDefinition> {
    services
        .iter()
        .map(|s| request.apply_to(s).unwrap_or_else(|| s.clone()))
        .collect()
}

#[expect(clippy::too_many_arguments, reason = "mirrors the CLI flags")]
pub fn run<W: std::io::Write>(
    writer: &mut W,
    services: &[ServiceDefinition],
    services_path: &Path,
    id: &str,
    date: NaiveDate,
    hour: u32,
    scope: MoveScope,
    write_back: bool,
) -> Result<()> {
    let request = plan(services, id, date, hour, scope)?;
    writeln!(writer, "{}", serde_json::to_string_pretty(&request)?)?;

    if write_back {
        save_services(services_path, &apply(services, &request))?;
        tracing::info!(id = %request.id, path = %services_path.display(), "applied move");
    }

    Ok(())
}
