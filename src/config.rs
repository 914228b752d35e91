use serde::{Deserialize, Serialize};

/// What a `change*` mutator does when the caller fails its authorization
/// predicate (e.g. `asset.owner != currentOwner`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnauthorizedChangePolicy {
    /// Return the entity unchanged. Station mutators still write the
    /// unchanged record back; asset mutators skip the write.
    #[default]
    Preserve,
    /// Return the entity unchanged and never write.
    Skip,
    /// Fail with `PermissionDenied`.
    Reject,
}

impl UnauthorizedChangePolicy {
    fn as_str(&self) -> &'static str {
        match self {
            UnauthorizedChangePolicy::Preserve => "preserve",
            UnauthorizedChangePolicy::Skip => "skip",
            UnauthorizedChangePolicy::Reject => "reject",
        }
    }

    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "preserve" => Ok(UnauthorizedChangePolicy::Preserve),
            "skip" => Ok(UnauthorizedChangePolicy::Skip),
            "reject" => Ok(UnauthorizedChangePolicy::Reject),
            other => Err(format!("Unknown unauthorized policy '{}'", other)),
        }
    }
}

/// Behaviour of `add*` when the key is already occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddPolicy {
    /// Replace the record; history keeps the previous version.
    #[default]
    Overwrite,
    /// Fail with `AlreadyExists`.
    RejectExisting,
}

impl AddPolicy {
    fn as_str(&self) -> &'static str {
        match self {
            AddPolicy::Overwrite => "overwrite",
            AddPolicy::RejectExisting => "reject",
        }
    }

    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "overwrite" => Ok(AddPolicy::Overwrite),
            "reject" => Ok(AddPolicy::RejectExisting),
            other => Err(format!("Unknown add policy '{}'", other)),
        }
    }
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Channel name, used for diagnostics
    pub channel: String,

    /// Contract name, used for diagnostics
    pub contract: String,

    pub unauthorized_change: UnauthorizedChangePolicy,

    pub add_policy: AddPolicy,

    /// Events buffered per subscriber before it starts lagging
    pub event_capacity: usize,
}

impl LedgerConfig {
    pub fn new(channel: &str, contract: &str) -> Self {
        Self {
            channel: channel.to_string(),
            contract: contract.to_string(),
            unauthorized_change: UnauthorizedChangePolicy::default(),
            add_policy: AddPolicy::default(),
            event_capacity: 1024,
        }
    }

    pub fn unauthorized_change(mut self, policy: UnauthorizedChangePolicy) -> Self {
        self.unauthorized_change = policy;
        self
    }

    pub fn add_policy(mut self, policy: AddPolicy) -> Self {
        self.add_policy = policy;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Parse from a ledger URL
    ///
    /// Format: `custody://channel/contract?unauthorized=skip&add=reject&events=256`
    ///
    /// # Examples
    ///
    /// ```
    /// use custody_ledger::{LedgerConfig, UnauthorizedChangePolicy};
    ///
    /// let config = LedgerConfig::from_url("custody://mychannel/chaincode?unauthorized=reject")
    ///     .unwrap();
    /// assert_eq!(config.unauthorized_change, UnauthorizedChangePolicy::Reject);
    /// ```
    pub fn from_url(url: &str) -> Result<Self, String> {
        let rest = url
            .strip_prefix("custody://")
            .ok_or_else(|| "URL must start with 'custody://'".to_string())?;

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let (channel, contract) = path
            .split_once('/')
            .ok_or_else(|| "Invalid channel/contract format".to_string())?;
        if contract.contains('/') {
            return Err("Invalid channel/contract format".to_string());
        }

        let mut config = Self::new(channel, contract);

        for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Invalid parameter '{}'", pair))?;
            match name {
                "unauthorized" => {
                    config.unauthorized_change = UnauthorizedChangePolicy::parse(value)?
                }
                "add" => config.add_policy = AddPolicy::parse(value)?,
                "events" => {
                    config.event_capacity = value
                        .parse()
                        .map_err(|_| "Invalid event capacity".to_string())?
                }
                other => return Err(format!("Unknown parameter '{}'", other)),
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn to_url(&self) -> String {
        format!(
            "custody://{}/{}?unauthorized={}&add={}&events={}",
            self.channel,
            self.contract,
            self.unauthorized_change.as_str(),
            self.add_policy.as_str(),
            self.event_capacity
        )
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.channel.is_empty() {
            return Err("Channel cannot be empty".to_string());
        }

        if self.contract.is_empty() {
            return Err("Contract cannot be empty".to_string());
        }

        if self.event_capacity == 0 {
            return Err("event_capacity must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new("mychannel", "chaincode")
    }
}
