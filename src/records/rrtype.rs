// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource record type mnemonics.

use crate::errors::ZoneSyncError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Additional mnemonics accepted as [`RRType::Other`].
///
/// Types listed here are passed through to the control API untouched; the
/// engine applies no type-specific rules to them.
const ACCEPTED_OTHER_TYPES: &[&str] = &[
    "A6", "AFSDB", "APL", "ATMA", "CDNSKEY", "CDS", "CERT", "CSYNC", "DHCID", "DLV", "DNSKEY",
    "EID", "ENT", "EUI48", "EUI64", "GPOS", "HTTPS", "IPSECKEY", "ISDN", "KEY", "KX", "L32",
    "L64", "LP", "LUA", "MAILA", "MAILB", "MB", "MD", "MF", "MG", "MINFO", "MR", "NID",
    "NIMLOC", "NINFO", "NSAP", "NSAP-PTR", "NSEC", "NSEC3", "NSEC3PARAM", "NULL", "NXT",
    "OPENPGPKEY", "PX", "RKEY", "RP", "RRSIG", "RT", "SIG", "SINK", "SMIMEA", "SVCB", "TALINK",
    "TKEY", "TSIG", "WKS", "X25", "ZONEMD",
];

/// DNS resource record type.
///
/// Known types are closed variants; anything else must pass the
/// [`ACCEPTED_OTHER_TYPES`] table or be written in RFC 3597 `TYPEnnn` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RRType {
    A,
    AAAA,
    ALIAS,
    CAA,
    CNAME,
    DNAME,
    DS,
    HINFO,
    LOC,
    MX,
    NAPTR,
    NS,
    PTR,
    SOA,
    SPF,
    SRV,
    SSHFP,
    TLSA,
    TXT,
    URI,
    /// Validated mnemonic outside the closed set, stored upper-case
    Other(String),
}

impl RRType {
    /// Upper-case mnemonic as used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RRType::A => "A",
            RRType::AAAA => "AAAA",
            RRType::ALIAS => "ALIAS",
            RRType::CAA => "CAA",
            RRType::CNAME => "CNAME",
            RRType::DNAME => "DNAME",
            RRType::DS => "DS",
            RRType::HINFO => "HINFO",
            RRType::LOC => "LOC",
            RRType::MX => "MX",
            RRType::NAPTR => "NAPTR",
            RRType::NS => "NS",
            RRType::PTR => "PTR",
            RRType::SOA => "SOA",
            RRType::SPF => "SPF",
            RRType::SRV => "SRV",
            RRType::SSHFP => "SSHFP",
            RRType::TLSA => "TLSA",
            RRType::TXT => "TXT",
            RRType::URI => "URI",
            RRType::Other(name) => name,
        }
    }

    /// Types whose content is a domain name that must be absolute.
    #[must_use]
    pub fn requires_trailing_dot(&self) -> bool {
        matches!(self, RRType::MX | RRType::CNAME | RRType::SRV | RRType::NS)
    }

    /// Forward address types that drive PTR maintenance.
    #[must_use]
    pub fn is_address(&self) -> bool {
        matches!(self, RRType::A | RRType::AAAA)
    }
}

fn is_generic_type(value: &str) -> bool {
    value
        .strip_prefix("TYPE")
        .is_some_and(|digits| !digits.is_empty() && digits.parse::<u16>().is_ok())
}

impl RRType {
    /// Parse a type reported by the nameserver.
    ///
    /// Operator input goes through [`FromStr`]; a zone read back from the
    /// nameserver keeps any well-formed mnemonic as [`RRType::Other`] so one
    /// unfamiliar RRset does not make the whole zone unreadable.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSyncError::InvalidRecord`] when `value` is not a mnemonic.
    pub fn from_server(value: &str) -> Result<Self, ZoneSyncError> {
        value.parse().or_else(|err| {
            let upper = value.trim().to_ascii_uppercase();
            if is_mnemonic(&upper) {
                Ok(RRType::Other(upper))
            } else {
                Err(err)
            }
        })
    }
}

fn is_mnemonic(value: &str) -> bool {
    value.starts_with(|c: char| c.is_ascii_alphabetic())
        && value.len() <= 16
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// `deserialize_with` hook for RRsets read from the nameserver or history.
///
/// # Errors
///
/// Fails when the value is not a string holding a mnemonic.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<RRType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = <String as serde::Deserialize>::deserialize(deserializer)?;
    RRType::from_server(&value).map_err(serde::de::Error::custom)
}

impl FromStr for RRType {
    type Err = ZoneSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let rtype = match upper.as_str() {
            "A" => RRType::A,
            "AAAA" => RRType::AAAA,
            "ALIAS" => RRType::ALIAS,
            "CAA" => RRType::CAA,
            "CNAME" => RRType::CNAME,
            "DNAME" => RRType::DNAME,
            "DS" => RRType::DS,
            "HINFO" => RRType::HINFO,
            "LOC" => RRType::LOC,
            "MX" => RRType::MX,
            "NAPTR" => RRType::NAPTR,
            "NS" => RRType::NS,
            "PTR" => RRType::PTR,
            "SOA" => RRType::SOA,
            "SPF" => RRType::SPF,
            "SRV" => RRType::SRV,
            "SSHFP" => RRType::SSHFP,
            "TLSA" => RRType::TLSA,
            "TXT" => RRType::TXT,
            "URI" => RRType::URI,
            other if ACCEPTED_OTHER_TYPES.contains(&other) || is_generic_type(other) => {
                RRType::Other(other.to_string())
            }
            _ => {
                return Err(ZoneSyncError::InvalidRecord {
                    name: String::new(),
                    reason: format!("unsupported record type '{s}'"),
                })
            }
        };
        Ok(rtype)
    }
}

impl TryFrom<String> for RRType {
    type Error = ZoneSyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RRType> for String {
    fn from(value: RRType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RRType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Mnemonic order keeps grouping output stable regardless of variant order.
impl Ord for RRType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for RRType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
