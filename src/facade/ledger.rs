use crate::config::LedgerConfig;
use crate::contract::CustodyContract;
use crate::core::{ErrorRecord, LedgerError, Result};
use crate::events::{EventBus, EventSubscription};
use crate::storage::WorldState;
use crate::transaction::{CommitReceipt, MemoryTransaction, TransactionManager};
use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

/// An in-process custody ledger: world state, event bus, transaction
/// manager and contract wired together.
///
/// # Examples
///
/// ```
/// use custody_ledger::Ledger;
///
/// # #[tokio::main]
/// # async fn main() -> custody_ledger::Result<()> {
/// let ledger = Ledger::default();
/// let args = ["pkA", "customer", "udp://a"].map(String::from);
/// ledger.submit_transaction("addParticipant", &args).await?;
///
/// let found = ledger
///     .evaluate_transaction("getParticipant", &["pkA".to_string()])
///     .await?;
/// assert_eq!(found["link"], "udp://a");
/// # Ok(())
/// # }
/// ```
pub struct Ledger {
    config: LedgerConfig,
    world: Arc<WorldState>,
    bus: Arc<EventBus>,
    manager: TransactionManager,
    contract: CustodyContract,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        config.validate().map_err(LedgerError::InvalidArgument)?;
        Ok(Self::build(config))
    }

    /// Build from a `custody://<channel>/<contract>?...` URL.
    pub fn from_url(url: &str) -> Result<Self> {
        let config = LedgerConfig::from_url(url).map_err(LedgerError::InvalidArgument)?;
        Self::new(config)
    }

    fn build(config: LedgerConfig) -> Self {
        let world = Arc::new(WorldState::new());
        let bus = Arc::new(EventBus::new(config.event_capacity));
        let manager = TransactionManager::new(world.clone(), bus.clone());
        let contract = CustodyContract::new(config.clone());
        Self {
            config,
            world,
            bus,
            manager,
            contract,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn contract(&self) -> &CustodyContract {
        &self.contract
    }

    pub fn world(&self) -> &Arc<WorldState> {
        &self.world
    }

    pub fn manager(&self) -> &TransactionManager {
        &self.manager
    }

    // ------------------------------------------------------------------
    // Typed transaction control
    // ------------------------------------------------------------------

    pub async fn begin(&self) -> MemoryTransaction {
        self.manager.begin().await
    }

    pub async fn commit(&self, txn: MemoryTransaction) -> Result<CommitReceipt> {
        self.manager.commit(txn).await
    }

    pub async fn rollback(&self, txn: MemoryTransaction) -> Result<()> {
        self.manager.rollback(txn).await
    }

    // ------------------------------------------------------------------
    // String operation surface
    // ------------------------------------------------------------------

    /// Run `function` in a fresh transaction and commit it. On error the
    /// transaction is rolled back and nothing is written or delivered.
    pub async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Value> {
        let txn = self.begin().await;
        let span = info_span!(
            "ledger.submit",
            channel = %self.config.channel,
            function = %function,
            tx_id = %txn.id()
        );

        self.run_and_commit(txn, function, args)
            .instrument(span)
            .await
    }

    /// Run `function` against current state and discard its effects.
    pub async fn evaluate_transaction(&self, function: &str, args: &[String]) -> Result<Value> {
        let txn = self.begin().await;
        let span = info_span!(
            "ledger.evaluate",
            channel = %self.config.channel,
            function = %function,
            tx_id = %txn.id()
        );

        self.run_and_discard(txn, function, args)
            .instrument(span)
            .await
    }

    async fn run_and_commit(
        &self,
        mut txn: MemoryTransaction,
        function: &str,
        args: &[String],
    ) -> Result<Value> {
        match self.contract.invoke(&mut txn, function, args).await {
            Ok(value) => {
                self.commit(txn).await?;
                Ok(value)
            }
            Err(err) => {
                event!(Level::ERROR, error = %err, "transaction failed");
                self.rollback(txn).await?;
                Err(err)
            }
        }
    }

    async fn run_and_discard(
        &self,
        mut txn: MemoryTransaction,
        function: &str,
        args: &[String],
    ) -> Result<Value> {
        let result = self.contract.invoke(&mut txn, function, args).await;
        if let Err(err) = &result {
            event!(Level::ERROR, error = %err, "evaluation failed");
        }
        self.rollback(txn).await?;
        result
    }

    /// Render an operation result the way a caller receives it: the result
    /// JSON itself, or an `{kind, message}` error record.
    pub fn respond(result: &Result<Value>) -> Value {
        match result {
            Ok(value) => value.clone(),
            Err(err) => serde_json::to_value(ErrorRecord::from(err)).unwrap_or(Value::Null),
        }
    }

    /// Administrative delete; see [`TransactionManager::purge`].
    pub async fn purge(&self, key: &str) -> bool {
        self.manager.purge(key).await
    }

    pub fn subscribe(&self) -> EventSubscription {
        self.bus.subscribe()
    }

    pub fn subscribe_topic(&self, topic: impl Into<String>) -> EventSubscription {
        self.bus.subscribe_topic(topic)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::build(LedgerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnauthorizedChangePolicy;
    use crate::core::ErrorKind;
    use serde_json::json;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_submit_commits_on_success() {
        let ledger = Ledger::default();
        ledger
            .submit_transaction("addParticipant", &strings(&["pkA", "customer", "udp://a"]))
            .await
            .unwrap();

        assert!(ledger.world().get("pkA").await.is_some());
        assert_eq!(ledger.manager().active_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_rolls_back_on_error() {
        let ledger = Ledger::default();
        let err = ledger
            .submit_transaction("changeParticipantLink", &strings(&["missing", "udp://x"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(ledger.world().is_empty().await);
        assert_eq!(ledger.manager().active_count(), 0);
        assert_eq!(ledger.manager().version().await, 0);
    }

    #[tokio::test]
    async fn test_evaluate_never_commits() {
        let ledger = Ledger::default();
        ledger
            .evaluate_transaction("addParticipant", &strings(&["pkA", "customer", "udp://a"]))
            .await
            .unwrap();

        assert!(ledger.world().get("pkA").await.is_none());
    }

    #[test]
    fn test_respond_renders_error_record() {
        let result: Result<Value> = Err(LedgerError::NotFound("x1".into()));
        assert_eq!(
            Ledger::respond(&result),
            json!({"kind": "NotFound", "message": "x1 does not exist"})
        );

        let ok: Result<Value> = Ok(json!({"Id": "x1"}));
        assert_eq!(Ledger::respond(&ok), json!({"Id": "x1"}));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LedgerConfig::default().event_capacity(0);
        assert!(Ledger::new(config).is_err());
    }

    #[test]
    fn test_from_url_carries_policy() {
        let ledger = Ledger::from_url("custody://ops/custody?unauthorized=reject").unwrap();
        assert_eq!(ledger.config().channel, "ops");
        assert_eq!(
            ledger.contract().config().unauthorized_change,
            UnauthorizedChangePolicy::Reject
        );
    }
}
