// ============================================================================
// Custody Contract
// ============================================================================
//
// The public operation set over participants, stations and assets. Every
// handler runs against one TransactionContext; whatever it writes or emits
// commits or aborts together with that context.
//
// ============================================================================

mod access;
mod asset;
pub mod dispatch;
mod participant;
mod station;

pub use dispatch::Operation;

use crate::config::{AddPolicy, LedgerConfig, UnauthorizedChangePolicy};
use crate::core::{LedgerError, Result};
use crate::transaction::TransactionContext;
use tracing::{Level, event};

/// Handlers for the custody ledger, parameterised by [`LedgerConfig`].
#[derive(Debug, Clone, Default)]
pub struct CustodyContract {
    config: LedgerConfig,
}

/// Outcome of an authorization mismatch in a `change*` mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mismatch {
    WriteBack,
    Unchanged,
}

impl CustodyContract {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Nothing to seed; kept so hosts that call it on instantiation succeed.
    pub async fn init_ledger<C>(&self, _ctx: &mut C) -> Result<()>
    where
        C: TransactionContext + ?Sized,
    {
        event!(Level::INFO, channel = %self.config.channel, "ledger initialised");
        Ok(())
    }

    async fn ensure_addable<C>(&self, ctx: &C, key: &str) -> Result<()>
    where
        C: TransactionContext + ?Sized,
    {
        if self.config.add_policy == AddPolicy::RejectExisting && access::key_exists(ctx, key).await? {
            return Err(LedgerError::AlreadyExists(key.to_string()));
        }
        Ok(())
    }

    /// Decide what a failed authorization predicate turns into.
    ///
    /// `write_back` is what the unconfigured behaviour does for this
    /// mutator: stations rewrite the unchanged record, assets do not.
    fn on_mismatch(&self, kind: &str, key: &str, caller: &str, write_back: bool) -> Result<Mismatch> {
        event!(
            Level::WARN,
            kind,
            key = %key,
            caller = %caller,
            policy = ?self.config.unauthorized_change,
            "change refused: caller does not match"
        );
        match self.config.unauthorized_change {
            UnauthorizedChangePolicy::Preserve if write_back => Ok(Mismatch::WriteBack),
            UnauthorizedChangePolicy::Preserve | UnauthorizedChangePolicy::Skip => {
                Ok(Mismatch::Unchanged)
            }
            UnauthorizedChangePolicy::Reject => Err(LedgerError::PermissionDenied(format!(
                "{} may not change {} {}",
                caller, kind, key
            ))),
        }
    }
}
