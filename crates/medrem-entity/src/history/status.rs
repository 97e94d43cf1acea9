//! Resolution state of a dose occurrence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether a scheduled dose was missed.
///
/// Stored and serialized with the legacy text encoding: `Taken` is `"NO"`
/// (not missed), `Missed` is `"YES"`, and `Pending` is the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MissedStatus {
    /// The user confirmed taking the dose.
    #[serde(rename = "NO")]
    Taken,
    /// The user marked the dose as not taken.
    #[serde(rename = "YES")]
    Missed,
    /// Not yet resolved.
    #[default]
    #[serde(rename = "")]
    Pending,
}

impl MissedStatus {
    /// Map a user confirmation onto the resolved state.
    pub fn from_taken(has_medication_been_taken: bool) -> Self {
        if has_medication_been_taken {
            Self::Taken
        } else {
            Self::Missed
        }
    }

    /// Check whether the dose has been resolved either way.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Return the storage encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taken => "NO",
            Self::Missed => "YES",
            Self::Pending => "",
        }
    }
}

impl fmt::Display for MissedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO" => Ok(Self::Taken),
            "YES" => Ok(Self::Missed),
            "" => Ok(Self::Pending),
            other => Err(format!("invalid missed status: '{other}'")),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for MissedStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for MissedStatus {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for MissedStatus {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        raw.parse::<Self>().map_err(Into::into)
    }
}
