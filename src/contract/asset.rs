use super::{CustodyContract, access};
use crate::core::{LedgerError, Result};
use crate::events::StationCommand;
use crate::model::{Asset, HistoryEntry, Participant, Station};
use crate::transaction::TransactionContext;
use tracing::{Level, event};

impl CustodyContract {
    /// Store an asset at `id`. Referenced participants and station are not
    /// checked here; they are dereferenced only when the asset is mutated.
    pub async fn add_asset<C>(
        &self,
        ctx: &mut C,
        id: &str,
        holder: &str,
        owner: &str,
        station: &str,
    ) -> Result<Asset>
    where
        C: TransactionContext + ?Sized,
    {
        access::require_non_empty("id", id)?;
        self.ensure_addable(&*ctx, id).await?;

        let asset = Asset::new(id, holder, owner, station);
        access::write_entity(ctx, id, &asset).await?;
        event!(Level::INFO, id = %id, owner = %owner, holder = %holder, "asset added");
        Ok(asset)
    }

    pub async fn get_asset<C>(&self, ctx: &C, id: &str) -> Result<Asset>
    where
        C: TransactionContext + ?Sized,
    {
        access::read_entity(ctx, id).await
    }

    pub async fn get_asset_if_owner_or_holder<C>(
        &self,
        ctx: &C,
        id: &str,
        public_key: &str,
    ) -> Result<Asset>
    where
        C: TransactionContext + ?Sized,
    {
        let asset: Asset = access::read_entity(ctx, id).await?;
        if !asset.is_owner_or_holder(public_key) {
            return Err(LedgerError::PermissionDenied(format!(
                "{} neither owns nor holds asset {}",
                public_key, id
            )));
        }
        Ok(asset)
    }

    pub async fn list_assets<C>(&self, ctx: &C) -> Result<Vec<Asset>>
    where
        C: TransactionContext + ?Sized,
    {
        access::list_entities(ctx).await
    }

    pub async fn asset_history<C>(&self, ctx: &C, id: &str) -> Result<Vec<HistoryEntry<Asset>>>
    where
        C: TransactionContext + ?Sized,
    {
        access::entity_history(ctx, id).await
    }

    /// Transfer legal ownership. The asset's station is told to stop
    /// streaming to the old owner and start streaming to the new one.
    pub async fn change_asset_owner<C>(
        &self,
        ctx: &mut C,
        id: &str,
        current_owner: &str,
        new_owner: &str,
    ) -> Result<Asset>
    where
        C: TransactionContext + ?Sized,
    {
        let mut asset: Asset = access::read_entity(&*ctx, id).await?;
        if asset.owner != current_owner {
            self.on_mismatch("asset", id, current_owner, false)?;
            return Ok(asset);
        }

        let next: Participant = access::read_dependent(&*ctx, "new owner", new_owner).await?;
        let previous: Participant =
            access::read_dependent(&*ctx, "current owner", current_owner).await?;
        let station = self.station_topic(&*ctx, &asset).await?;

        if let Some(topic) = station {
            access::emit(ctx, &topic, StationCommand::Stop(previous.link)).await?;
            access::emit(ctx, &topic, StationCommand::Send(next.link)).await?;
        }

        asset.owner = new_owner.to_string();
        access::write_entity(ctx, id, &asset).await?;
        event!(Level::INFO, id = %id, owner = %new_owner, "asset owner changed");
        Ok(asset)
    }

    /// Hand the asset to a new holder, redirecting its station's stream.
    pub async fn change_asset_holder<C>(
        &self,
        ctx: &mut C,
        id: &str,
        current_holder: &str,
        new_holder: &str,
    ) -> Result<Asset>
    where
        C: TransactionContext + ?Sized,
    {
        let mut asset: Asset = access::read_entity(&*ctx, id).await?;
        if asset.holder != current_holder {
            self.on_mismatch("asset", id, current_holder, false)?;
            return Ok(asset);
        }

        let next: Participant = access::read_dependent(&*ctx, "new holder", new_holder).await?;
        let previous: Participant =
            access::read_dependent(&*ctx, "current holder", current_holder).await?;
        let station = self.station_topic(&*ctx, &asset).await?;

        if let Some(topic) = station {
            access::emit(ctx, &topic, StationCommand::Stop(previous.link)).await?;
            access::emit(ctx, &topic, StationCommand::Send(next.link)).await?;
        }

        asset.holder = new_holder.to_string();
        access::write_entity(ctx, id, &asset).await?;
        event!(Level::INFO, id = %id, holder = %new_holder, "asset holder changed");
        Ok(asset)
    }

    /// Move the asset to another station. The old station stops and the new
    /// one starts streaming to both the owner and the holder, owner first.
    pub async fn change_asset_station<C>(
        &self,
        ctx: &mut C,
        id: &str,
        current_holder: &str,
        new_station: &str,
    ) -> Result<Asset>
    where
        C: TransactionContext + ?Sized,
    {
        let mut asset: Asset = access::read_entity(&*ctx, id).await?;
        if asset.holder != current_holder {
            self.on_mismatch("asset", id, current_holder, false)?;
            return Ok(asset);
        }

        let holder: Participant =
            access::read_dependent(&*ctx, "current holder", current_holder).await?;
        let owner: Participant = access::read_dependent(&*ctx, "owner", &asset.owner).await?;

        let incoming = if new_station.is_empty() {
            None
        } else {
            let station: Station =
                access::read_dependent(&*ctx, "new station", new_station).await?;
            Some(station.public_key)
        };
        let outgoing = self.station_topic(&*ctx, &asset).await?;

        if let Some(topic) = outgoing {
            access::emit(ctx, &topic, StationCommand::Stop(owner.link.clone())).await?;
            access::emit(ctx, &topic, StationCommand::Stop(holder.link.clone())).await?;
        }
        if let Some(topic) = incoming {
            access::emit(ctx, &topic, StationCommand::Send(owner.link)).await?;
            access::emit(ctx, &topic, StationCommand::Send(holder.link)).await?;
        }

        asset.station = new_station.to_string();
        access::write_entity(ctx, id, &asset).await?;
        event!(Level::INFO, id = %id, station = %new_station, "asset station changed");
        Ok(asset)
    }

    /// Topic of the station currently observing `asset`, if it has one: the
    /// public key recorded in the stored station, not the key it is stored at.
    ///
    /// A non-empty station key that does not resolve is a missing dependency.
    async fn station_topic<C>(&self, ctx: &C, asset: &Asset) -> Result<Option<String>>
    where
        C: TransactionContext + ?Sized,
    {
        if !asset.has_station() {
            return Ok(None);
        }
        let station: Station = access::read_dependent(ctx, "station", &asset.station).await?;
        Ok(Some(station.public_key))
    }
}
