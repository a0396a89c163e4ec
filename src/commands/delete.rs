use anyhow::{Context, Result};

use super::{user_id, Globals};
use crate::cli::DeleteCommand;
use crate::ids::ResourceId;

pub async fn run(globals: &Globals, command: DeleteCommand) -> Result<()> {
    let client = globals.client()?;
    match command {
        DeleteCommand::Books { ids } => {
            let resources = ids
                .iter()
                .map(|id| ResourceId::parse_max(id, 3).context("delete book"))
                .collect::<Result<Vec<_>>>()?;
            for resource in resources {
                client
                    .delete_resource(&resource)
                    .await
                    .with_context(|| format!("delete book {}", resource))?;
                tracing::info!(%resource, "deleted");
            }
        }
        DeleteCommand::Users { ids } => {
            let ids = ids.iter().map(|id| user_id(id)).collect::<Result<Vec<_>>>()?;
            for id in ids {
                client
                    .delete_user(id)
                    .await
                    .with_context(|| format!("delete user {}", id))?;
                tracing::info!(user = id, "deleted");
            }
        }
    }
    Ok(())
}
