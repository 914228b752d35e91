//! Positional-string operation surface over [`CustodyContract`].
//!
//! Both the camelCase handler names and the legacy chaincode names resolve
//! to the same [`Operation`].

use super::CustodyContract;
use crate::core::{LedgerError, Result};
use crate::transaction::TransactionContext;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InitLedger,
    AddParticipant,
    GetParticipant,
    ListParticipants,
    ParticipantHistory,
    ChangeParticipantLink,
    AddStation,
    GetStation,
    GetStationIfOwner,
    ListStations,
    StationHistory,
    ChangeStationOwner,
    ChangeStationAreaType,
    AddAsset,
    GetAsset,
    GetAssetIfOwnerOrHolder,
    ListAssets,
    AssetHistory,
    ChangeAssetOwner,
    ChangeAssetHolder,
    ChangeAssetStation,
}

impl Operation {
    pub const ALL: [Operation; 21] = [
        Operation::InitLedger,
        Operation::AddParticipant,
        Operation::GetParticipant,
        Operation::ListParticipants,
        Operation::ParticipantHistory,
        Operation::ChangeParticipantLink,
        Operation::AddStation,
        Operation::GetStation,
        Operation::GetStationIfOwner,
        Operation::ListStations,
        Operation::StationHistory,
        Operation::ChangeStationOwner,
        Operation::ChangeStationAreaType,
        Operation::AddAsset,
        Operation::GetAsset,
        Operation::GetAssetIfOwnerOrHolder,
        Operation::ListAssets,
        Operation::AssetHistory,
        Operation::ChangeAssetOwner,
        Operation::ChangeAssetHolder,
        Operation::ChangeAssetStation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::InitLedger => "initLedger",
            Operation::AddParticipant => "addParticipant",
            Operation::GetParticipant => "getParticipant",
            Operation::ListParticipants => "listParticipants",
            Operation::ParticipantHistory => "participantHistory",
            Operation::ChangeParticipantLink => "changeParticipantLink",
            Operation::AddStation => "addStation",
            Operation::GetStation => "getStation",
            Operation::GetStationIfOwner => "getStationIfOwner",
            Operation::ListStations => "listStations",
            Operation::StationHistory => "stationHistory",
            Operation::ChangeStationOwner => "changeStationOwner",
            Operation::ChangeStationAreaType => "changeStationAreaType",
            Operation::AddAsset => "addAsset",
            Operation::GetAsset => "getAsset",
            Operation::GetAssetIfOwnerOrHolder => "getAssetIfOwnerOrHolder",
            Operation::ListAssets => "listAssets",
            Operation::AssetHistory => "assetHistory",
            Operation::ChangeAssetOwner => "changeAssetOwner",
            Operation::ChangeAssetHolder => "changeAssetHolder",
            Operation::ChangeAssetStation => "changeAssetStation",
        }
    }

    /// Name the operation was exported under by the original chaincode.
    pub fn legacy_name(self) -> &'static str {
        match self {
            Operation::InitLedger => "InitLedger",
            Operation::AddParticipant => "AddParticipant",
            Operation::GetParticipant => "QueryParticipant",
            Operation::ListParticipants => "QueryAllParticipants",
            Operation::ParticipantHistory => "GetParticipantHistory",
            Operation::ChangeParticipantLink => "ChangeParticipantLink",
            Operation::AddStation => "AddIOTLocalNetwork",
            Operation::GetStation => "QueryIOTLocalNetwork",
            Operation::GetStationIfOwner => "QueryIOTLocalNetworkByOwner",
            Operation::ListStations => "QueryAllLocalNetworks",
            Operation::StationHistory => "GetLocalNetworkHistory",
            Operation::ChangeStationOwner => "ChangeLocalNetworkOwner",
            Operation::ChangeStationAreaType => "ChangeLocalNetworkAreaType",
            Operation::AddAsset => "AddAsset",
            Operation::GetAsset => "QueryAsset",
            Operation::GetAssetIfOwnerOrHolder => "QueryAssetByOwnerOrHolder",
            Operation::ListAssets => "QueryAllAssets",
            Operation::AssetHistory => "GetAssetHistory",
            Operation::ChangeAssetOwner => "ChangeAssetOwner",
            Operation::ChangeAssetHolder => "ChangeAssetHolder",
            Operation::ChangeAssetStation => "ChangeAssetStation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name || op.legacy_name() == name)
    }

    /// Number of positional arguments the operation takes.
    pub fn arity(self) -> usize {
        match self {
            Operation::InitLedger
            | Operation::ListParticipants
            | Operation::ListStations
            | Operation::ListAssets => 0,
            Operation::GetParticipant
            | Operation::ParticipantHistory
            | Operation::GetStation
            | Operation::StationHistory
            | Operation::GetAsset
            | Operation::AssetHistory => 1,
            Operation::ChangeParticipantLink
            | Operation::GetStationIfOwner
            | Operation::GetAssetIfOwnerOrHolder => 2,
            Operation::AddParticipant
            | Operation::AddStation
            | Operation::ChangeStationOwner
            | Operation::ChangeStationAreaType
            | Operation::ChangeAssetOwner
            | Operation::ChangeAssetHolder
            | Operation::ChangeAssetStation => 3,
            Operation::AddAsset => 4,
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Operation::GetParticipant
                | Operation::ListParticipants
                | Operation::ParticipantHistory
                | Operation::GetStation
                | Operation::GetStationIfOwner
                | Operation::ListStations
                | Operation::StationHistory
                | Operation::GetAsset
                | Operation::GetAssetIfOwnerOrHolder
                | Operation::ListAssets
                | Operation::AssetHistory
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
            .ok_or_else(|| LedgerError::InvalidArgument(format!("unknown function '{}'", s)))
    }
}

/// Borrow exactly `N` positional arguments for `op`.
fn arguments<const N: usize>(op: Operation, args: &[String]) -> Result<[&str; N]> {
    debug_assert_eq!(N, op.arity());
    if args.len() != N {
        return Err(LedgerError::InvalidArgument(format!(
            "{} expects {} argument(s), got {}",
            op,
            N,
            args.len()
        )));
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

impl CustodyContract {
    /// Run `function` with positional string `args` and return its result as
    /// JSON. Unknown names and wrong argument counts are `InvalidArgument`.
    pub async fn invoke<C>(&self, ctx: &mut C, function: &str, args: &[String]) -> Result<Value>
    where
        C: TransactionContext + ?Sized,
    {
        let op: Operation = function.parse()?;

        match op {
            Operation::InitLedger => {
                let [] = arguments::<0>(op, args)?;
                self.init_ledger(ctx).await?;
                Ok(Value::Null)
            }

            Operation::AddParticipant => {
                let [public_key, role, link] = arguments::<3>(op, args)?;
                to_json(self.add_participant(ctx, public_key, role, link).await?)
            }
            Operation::GetParticipant => {
                let [public_key] = arguments::<1>(op, args)?;
                to_json(self.get_participant(&*ctx, public_key).await?)
            }
            Operation::ListParticipants => {
                let [] = arguments::<0>(op, args)?;
                to_json(self.list_participants(&*ctx).await?)
            }
            Operation::ParticipantHistory => {
                let [public_key] = arguments::<1>(op, args)?;
                to_json(self.participant_history(&*ctx, public_key).await?)
            }
            Operation::ChangeParticipantLink => {
                let [public_key, new_link] = arguments::<2>(op, args)?;
                to_json(self.change_participant_link(ctx, public_key, new_link).await?)
            }

            Operation::AddStation => {
                let [public_key, owner, area_type] = arguments::<3>(op, args)?;
                to_json(self.add_station(ctx, public_key, owner, area_type).await?)
            }
            Operation::GetStation => {
                let [public_key] = arguments::<1>(op, args)?;
                to_json(self.get_station(&*ctx, public_key).await?)
            }
            Operation::GetStationIfOwner => {
                let [public_key, owner] = arguments::<2>(op, args)?;
                to_json(self.get_station_if_owner(&*ctx, public_key, owner).await?)
            }
            Operation::ListStations => {
                let [] = arguments::<0>(op, args)?;
                to_json(self.list_stations(&*ctx).await?)
            }
            Operation::StationHistory => {
                let [public_key] = arguments::<1>(op, args)?;
                to_json(self.station_history(&*ctx, public_key).await?)
            }
            Operation::ChangeStationOwner => {
                let [public_key, current_owner, new_owner] = arguments::<3>(op, args)?;
                to_json(
                    self.change_station_owner(ctx, public_key, current_owner, new_owner)
                        .await?,
                )
            }
            Operation::ChangeStationAreaType => {
                let [public_key, current_owner, new_area_type] = arguments::<3>(op, args)?;
                to_json(
                    self.change_station_area_type(ctx, public_key, current_owner, new_area_type)
                        .await?,
                )
            }

            Operation::AddAsset => {
                let [id, holder, owner, station] = arguments::<4>(op, args)?;
                to_json(self.add_asset(ctx, id, holder, owner, station).await?)
            }
            Operation::GetAsset => {
                let [id] = arguments::<1>(op, args)?;
                to_json(self.get_asset(&*ctx, id).await?)
            }
            Operation::GetAssetIfOwnerOrHolder => {
                let [id, public_key] = arguments::<2>(op, args)?;
                to_json(self.get_asset_if_owner_or_holder(&*ctx, id, public_key).await?)
            }
            Operation::ListAssets => {
                let [] = arguments::<0>(op, args)?;
                to_json(self.list_assets(&*ctx).await?)
            }
            Operation::AssetHistory => {
                let [id] = arguments::<1>(op, args)?;
                to_json(self.asset_history(&*ctx, id).await?)
            }
            Operation::ChangeAssetOwner => {
                let [id, current_owner, new_owner] = arguments::<3>(op, args)?;
                to_json(self.change_asset_owner(ctx, id, current_owner, new_owner).await?)
            }
            Operation::ChangeAssetHolder => {
                let [id, current_holder, new_holder] = arguments::<3>(op, args)?;
                to_json(self.change_asset_holder(ctx, id, current_holder, new_holder).await?)
            }
            Operation::ChangeAssetStation => {
                let [id, current_holder, new_station] = arguments::<3>(op, args)?;
                to_json(
                    self.change_asset_station(ctx, id, current_holder, new_station)
                        .await?,
                )
            }
        }
    }
}
