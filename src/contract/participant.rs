use super::{CustodyContract, access};
use crate::core::Result;
use crate::model::{HistoryEntry, Participant};
use crate::transaction::TransactionContext;
use tracing::{Level, event};

impl CustodyContract {
    /// Store a participant at `public_key`, replacing any existing record
    /// unless the add policy forbids it.
    pub async fn add_participant<C>(
        &self,
        ctx: &mut C,
        public_key: &str,
        role: &str,
        link: &str,
    ) -> Result<Participant>
    where
        C: TransactionContext + ?Sized,
    {
        access::require_non_empty("publicKey", public_key)?;
        access::require_non_empty("role", role)?;
        self.ensure_addable(&*ctx, public_key).await?;

        let parti = Participant::new(public_key, role, link);
        access::write_entity(ctx, public_key, &parti).await?;
        event!(Level::INFO, public_key = %public_key, role = %role, "participant added");
        Ok(parti)
    }

    pub async fn get_participant<C>(&self, ctx: &C, public_key: &str) -> Result<Participant>
    where
        C: TransactionContext + ?Sized,
    {
        access::read_entity(ctx, public_key).await
    }

    pub async fn list_participants<C>(&self, ctx: &C) -> Result<Vec<Participant>>
    where
        C: TransactionContext + ?Sized,
    {
        access::list_entities(ctx).await
    }

    pub async fn participant_history<C>(
        &self,
        ctx: &C,
        public_key: &str,
    ) -> Result<Vec<HistoryEntry<Participant>>>
    where
        C: TransactionContext + ?Sized,
    {
        access::entity_history(ctx, public_key).await
    }

    pub async fn change_participant_link<C>(
        &self,
        ctx: &mut C,
        public_key: &str,
        new_link: &str,
    ) -> Result<Participant>
    where
        C: TransactionContext + ?Sized,
    {
        let mut parti: Participant = access::read_entity(&*ctx, public_key).await?;
        parti.link = new_link.to_string();
        access::write_entity(ctx, public_key, &parti).await?;
        event!(Level::INFO, public_key = %public_key, "participant link changed");
        Ok(parti)
    }
}
