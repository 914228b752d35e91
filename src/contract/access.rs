//! Typed reads and writes over a transaction context, shared by every handler.

use crate::core::{LedgerError, Result};
use crate::events::StationCommand;
use crate::model::{HistoryEntry, LedgerEntity};
use crate::storage::{HistoryScan, ResultsScan};
use crate::transaction::TransactionContext;
use tracing::{Level, event};

/// Load the entity at `key`; absent keys are `NotFound`, undecodable values
/// come back as an empty-field entity.
pub(crate) async fn read_entity<T, C>(ctx: &C, key: &str) -> Result<T>
where
    T: LedgerEntity,
    C: TransactionContext + ?Sized,
{
    match ctx.get_state(key).await? {
        Some(bytes) => Ok(T::from_bytes_lenient(&bytes)),
        None => Err(LedgerError::NotFound(key.to_string())),
    }
}

/// Like [`read_entity`], but an absent key is reported as a missing
/// dependency of the entity being mutated.
pub(crate) async fn read_dependent<T, C>(ctx: &C, role: &'static str, key: &str) -> Result<T>
where
    T: LedgerEntity,
    C: TransactionContext + ?Sized,
{
    read_entity(ctx, key).await.map_err(|err| match err {
        LedgerError::NotFound(key) => {
            event!(Level::DEBUG, role, key = %key, "dependent {} missing", T::KIND);
            LedgerError::DependentNotFound { role, key }
        }
        other => other,
    })
}

/// Serialize `entity` and stage it at `key`.
pub(crate) async fn write_entity<T, C>(ctx: &mut C, key: &str, entity: &T) -> Result<()>
where
    T: LedgerEntity,
    C: TransactionContext + ?Sized,
{
    let bytes = entity.to_bytes()?;
    ctx.put_state(key, bytes).await?;
    event!(Level::DEBUG, kind = T::KIND, key = %key, "entity written");
    Ok(())
}

pub(crate) async fn key_exists<C>(ctx: &C, key: &str) -> Result<bool>
where
    C: TransactionContext + ?Sized,
{
    Ok(ctx.get_state(key).await?.is_some())
}

/// Every stored value that decodes as `T` and carries its discriminating
/// attribute. Values of other kinds are skipped silently.
pub(crate) async fn list_entities<T, C>(ctx: &C) -> Result<Vec<T>>
where
    T: LedgerEntity,
    C: TransactionContext + ?Sized,
{
    let scan = ResultsScan::new(ctx.get_state_by_range("", "").await?);

    let mut results = Vec::new();
    for item in scan {
        let kv = item?;
        if let Ok(entity) = T::from_bytes(&kv.value) {
            if entity.is_kind() {
                results.push(entity);
            }
        }
    }
    Ok(results)
}

pub(crate) async fn entity_history<T, C>(ctx: &C, key: &str) -> Result<Vec<HistoryEntry<T>>>
where
    T: LedgerEntity,
    C: TransactionContext + ?Sized,
{
    let scan = HistoryScan::new(ctx.get_history_for_key(key).await?);

    let mut results = Vec::new();
    for item in scan {
        results.push(HistoryEntry::from_modification(item?));
    }
    Ok(results)
}

pub(crate) async fn emit<C>(ctx: &mut C, topic: &str, command: StationCommand) -> Result<()>
where
    C: TransactionContext + ?Sized,
{
    event!(Level::DEBUG, topic = %topic, command = %command, "station event set");
    ctx.set_event(topic, command.to_payload()).await?;
    Ok(())
}

/// Reject empty identifiers and discriminating attributes up front.
pub(crate) fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(LedgerError::InvalidArgument(format!("{} must not be empty", name)));
    }
    Ok(())
}
