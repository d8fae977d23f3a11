//! Confirmation gate for destructive actions.

use async_trait::async_trait;
use tracing::info;

use treetag_core::result::AppResult;
use treetag_core::traits::gateway::Gateway;

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync {
    /// `true` to proceed.
    async fn confirm(&self, prompt: &str) -> bool;
}

#[async_trait]
impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn confirm(&self, prompt: &str) -> bool {
        (self)(prompt)
    }
}

/// Hard-delete `id` from `table` once the user confirms.
///
/// Returns `Ok(false)` without contacting the gateway when declined.
/// Gateway errors name the operation ("Failed to delete tree: ...").
pub async fn delete_confirmed(
    gateway: &dyn Gateway,
    confirm: &dyn Confirm,
    table: &str,
    id: &str,
    noun: &str,
) -> AppResult<bool> {
    if !confirm
        .confirm(&format!("Delete this {noun}? This cannot be undone."))
        .await
    {
        info!(table, id, "Delete declined");
        return Ok(false);
    }

    gateway
        .delete(table, id)
        .await
        .map_err(|e| e.during(&format!("delete {noun}")))?;
    info!(table, id, "Deleted {noun}");
    Ok(true)
}
