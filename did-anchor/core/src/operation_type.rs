use crate::Error;

/// The kind of DID operation being anchored.  Only `Create` may appear for a DID that has never
/// been anchored; every other kind must reference the DID's latest anchor.
#[derive(
    Clone, Copy, Debug, serde::Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Create,
    Update,
    Deactivate,
    Recover,
}

impl OperationType {
    pub const VARIANTS: [OperationType; 4] = [
        OperationType::Create,
        OperationType::Update,
        OperationType::Deactivate,
        OperationType::Recover,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Create => "create",
            OperationType::Update => "update",
            OperationType::Deactivate => "deactivate",
            OperationType::Recover => "recover",
        }
    }
    /// Returns true iff operations of this type need the DID's previous anchor address.
    pub fn requires_previous_anchor(self) -> bool {
        self != OperationType::Create
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OperationType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(OperationType::Create),
            "update" => Ok(OperationType::Update),
            "deactivate" => Ok(OperationType::Deactivate),
            "recover" => Ok(OperationType::Recover),
            _ => Err(Error::Unrecognized(
                format!("operation type {:?}", s).into(),
            )),
        }
    }
}
