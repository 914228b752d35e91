use super::{CustodyContract, Mismatch, access};
use crate::core::{LedgerError, Result};
use crate::model::{HistoryEntry, Station};
use crate::transaction::TransactionContext;
use tracing::{Level, event};

impl CustodyContract {
    pub async fn add_station<C>(
        &self,
        ctx: &mut C,
        public_key: &str,
        owner: &str,
        area_type: &str,
    ) -> Result<Station>
    where
        C: TransactionContext + ?Sized,
    {
        access::require_non_empty("publicKey", public_key)?;
        access::require_non_empty("areaType", area_type)?;
        self.ensure_addable(&*ctx, public_key).await?;

        let station = Station::new(public_key, owner, area_type);
        access::write_entity(ctx, public_key, &station).await?;
        event!(Level::INFO, public_key = %public_key, owner = %owner, "station added");
        Ok(station)
    }

    pub async fn get_station<C>(&self, ctx: &C, public_key: &str) -> Result<Station>
    where
        C: TransactionContext + ?Sized,
    {
        access::read_entity(ctx, public_key).await
    }

    /// The station, provided `owner` controls it.
    pub async fn get_station_if_owner<C>(
        &self,
        ctx: &C,
        public_key: &str,
        owner: &str,
    ) -> Result<Station>
    where
        C: TransactionContext + ?Sized,
    {
        let station: Station = access::read_entity(ctx, public_key).await?;
        if !station.is_owned_by(owner) {
            return Err(LedgerError::PermissionDenied(format!(
                "{} does not own station {}",
                owner, public_key
            )));
        }
        Ok(station)
    }

    pub async fn list_stations<C>(&self, ctx: &C) -> Result<Vec<Station>>
    where
        C: TransactionContext + ?Sized,
    {
        access::list_entities(ctx).await
    }

    pub async fn station_history<C>(
        &self,
        ctx: &C,
        public_key: &str,
    ) -> Result<Vec<HistoryEntry<Station>>>
    where
        C: TransactionContext + ?Sized,
    {
        access::entity_history(ctx, public_key).await
    }

    pub async fn change_station_owner<C>(
        &self,
        ctx: &mut C,
        public_key: &str,
        current_owner: &str,
        new_owner: &str,
    ) -> Result<Station>
    where
        C: TransactionContext + ?Sized,
    {
        self.mutate_station(ctx, public_key, current_owner, |station| {
            station.owner = new_owner.to_string();
            Ok(())
        })
        .await
    }

    pub async fn change_station_area_type<C>(
        &self,
        ctx: &mut C,
        public_key: &str,
        current_owner: &str,
        new_area_type: &str,
    ) -> Result<Station>
    where
        C: TransactionContext + ?Sized,
    {
        self.mutate_station(ctx, public_key, current_owner, |station| {
            access::require_non_empty("areaType", new_area_type)?;
            station.area_type = new_area_type.to_string();
            Ok(())
        })
        .await
    }

    /// Load, apply `change` when `current_owner` owns the station, write back.
    /// `change` validates its own input, so a missing station or a foreign
    /// owner is reported before any argument error.
    async fn mutate_station<C, F>(
        &self,
        ctx: &mut C,
        public_key: &str,
        current_owner: &str,
        change: F,
    ) -> Result<Station>
    where
        C: TransactionContext + ?Sized,
        F: FnOnce(&mut Station) -> Result<()> + Send,
    {
        let mut station: Station = access::read_entity(&*ctx, public_key).await?;

        if station.is_owned_by(current_owner) {
            change(&mut station)?;
            event!(Level::INFO, public_key = %public_key, "station changed");
        } else if self.on_mismatch("station", public_key, current_owner, true)?
            == Mismatch::Unchanged
        {
            return Ok(station);
        }

        access::write_entity(ctx, public_key, &station).await?;
        Ok(station)
    }
}
