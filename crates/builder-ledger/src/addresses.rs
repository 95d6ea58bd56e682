//! Known block-builder addresses
//!
//! Ethereum addresses are case-insensitive, but the dashboard shows each builder
//! with the checksum casing it was configured with. The allowlist keeps both.

use indexmap::IndexMap;
use thiserror::Error;

/// Builder accounts tracked when no `[builders]` section is configured.
pub const DEFAULT_BUILDERS: &[&str] = &[
    "0xf2f5c73fa04406b1995e397b55c24ab1f3ea726c",
    "0x036C9c0aaE7a8268F332bA968dac5963c6aDAca5",
    "0xf573d99385c05c23b24ed33de616ad16a43a0919",
    "0x000000000000d3B2C76221467d2f8c8f1dE832A2",
    "0x199D5ED7F45F4eE35960cF22EAde2076e95B253F",
    "0x4838b106fce9647bdf1e7877bf73ce8b0bad5f97",
    "0xaab27b150451726ec7738aa1d0a94505c8729bd1",
    "0x57865ba267d48671a41431f471933aec32a7c7d1",
    "0x0000000000675d852C8638Df2f227949052b1208",
    "0xdadb0d80178819f2319190d340ce9a924f783711",
    "0x4675c7e5baafbffbca748158becba61ef3b0a263",
    "0x396343362be2a4da1ce0c1c210945346fb82aa49",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllowlistError {
    #[error("builder address list is empty")]
    Empty,
    #[error("builder address list contains a blank entry")]
    Blank,
    #[error("builder address {0} is listed twice")]
    Duplicate(String),
    #[error("builder addresses {first} and {second} differ only in casing")]
    Conflict { first: String, second: String },
}

/// Set of builder addresses keyed by lowercase form, remembering display casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    canonical: IndexMap<String, String>,
}

impl Allowlist {
    /// Build an allowlist, rejecting entries whose lowercase forms collide.
    pub fn new<I, S>(addresses: I) -> Result<Self, AllowlistError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical: IndexMap<String, String> = IndexMap::new();

        for address in addresses {
            let address = address.as_ref().trim();
            if address.is_empty() {
                return Err(AllowlistError::Blank);
            }

            let key = address.to_lowercase();
            if let Some(existing) = canonical.get(&key) {
                return Err(if existing == address {
                    AllowlistError::Duplicate(address.to_string())
                } else {
                    AllowlistError::Conflict {
                        first: existing.clone(),
                        second: address.to_string(),
                    }
                });
            }
            canonical.insert(key, address.to_string());
        }

        if canonical.is_empty() {
            return Err(AllowlistError::Empty);
        }

        Ok(Self { canonical })
    }

    /// Case-insensitive membership check.
    pub fn contains(&self, address: &str) -> bool {
        self.canonical.contains_key(&address.to_lowercase())
    }

    /// Same as [`contains`](Self::contains) for an address that is already lowercase.
    pub fn contains_lower(&self, address_lower: &str) -> bool {
        self.canonical.contains_key(address_lower)
    }

    /// Configured casing for an address, if it is on the list.
    pub fn canonical(&self, address: &str) -> Option<&str> {
        self.canonical.get(&address.to_lowercase()).map(String::as_str)
    }

    /// Display form: configured casing when listed, the input otherwise.
    pub fn display<'a>(&'a self, address: &'a str) -> &'a str {
        self.canonical(address).unwrap_or(address)
    }

    /// Canonical addresses in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.canonical.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

impl Default for Allowlist {
    fn default() -> Self {
        let canonical = DEFAULT_BUILDERS
            .iter()
            .map(|addr| (addr.to_lowercase(), addr.to_string()))
            .collect();
        Self { canonical }
    }
}
