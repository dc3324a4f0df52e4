pub mod cloudflare;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// DNS record types understood by the tool.
///
/// Only `A` and `CNAME` records are managed by the reconciler. Every other
/// type still parses (a live zone usually carries MX, TXT, NS and friends)
/// but is never matched, created, updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Txt,
    Srv,
    Caa,
    Other(String),
}

impl RecordType {
    /// Whether the reconciler manages records of this type.
    pub fn is_managed(&self) -> bool {
        matches!(self, RecordType::A | RecordType::Cname)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Caa => "CAA",
            RecordType::Other(s) => s,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "TXT" => RecordType::Txt,
            "SRV" => RecordType::Srv,
            "CAA" => RecordType::Caa,
            _ => RecordType::Other(s),
        }
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(String::deserialize(deserializer)?.into())
    }
}

/// A record as currently held by the provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveRecord {
    /// Provider-assigned identifier, required for update and delete calls.
    pub id: String,
    /// Fully qualified record name.
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub content: String,
    /// Omitted by the API for record types that cannot be proxied.
    #[serde(default)]
    pub proxied: bool,
}
