//! Item key layout.
//!
//! Keys are colon-separated: a type tag, a namespace tier, an optional
//! namespace name and a trailing unique identifier.
//!
//! ```text
//! item:1                          legacy, numeric id
//! item:global:<uid>               global tier (first migration)
//! item:g:default:<uid>            global tier, default namespace
//! item:my:<user>:<namespace>:<uid> user tier, named namespace
//! ```

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Type tag shared by every item key.
pub const ITEM_TAG: &str = "item";

/// Prefix of keys written by the first namespace migration.
pub const LEGACY_GLOBAL_PREFIX: &str = "item:global:";

/// Tier segment of the two-tier global namespace.
pub const GLOBAL_TIER: &str = "g";

/// Tier segment of user-scoped namespaces.
pub const USER_TIER: &str = "my";

/// Namespace every global key lands in during the second migration.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Which key generation a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTier {
    /// Any key not in one of the known layouts (`item:1`, `item:user:my:<uid>`, ...).
    Unversioned,
    LegacyGlobal,
    Global,
    User,
}

impl KeyTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unversioned => "unversioned",
            Self::LegacyGlobal => "legacy_global",
            Self::Global => "global",
            Self::User => "user",
        }
    }
}

impl fmt::Display for KeyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key in one of the layouts produced by the migrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKey {
    /// `item:global:<uid>`
    LegacyGlobal { uid: String },
    /// `item:g:<namespace>:<uid>`
    Global { namespace: String, uid: String },
    /// `item:my:<user>:<namespace>:<uid>`
    User {
        user: String,
        namespace: String,
        uid: String,
    },
}

impl ItemKey {
    /// Global key for a freshly generated identifier.
    #[must_use]
    pub fn new_legacy_global() -> Self {
        Self::LegacyGlobal {
            uid: Uuid::new_v4().to_string(),
        }
    }

    #[must_use]
    pub fn default_namespace(uid: impl Into<String>) -> Self {
        Self::Global {
            namespace: DEFAULT_NAMESPACE.to_string(),
            uid: uid.into(),
        }
    }

    /// Trailing identifier of the key.
    #[must_use]
    pub fn uid(&self) -> &str {
        match self {
            Self::LegacyGlobal { uid } | Self::Global { uid, .. } | Self::User { uid, .. } => uid,
        }
    }

    #[must_use]
    pub const fn tier(&self) -> KeyTier {
        match self {
            Self::LegacyGlobal { .. } => KeyTier::LegacyGlobal,
            Self::Global { .. } => KeyTier::Global,
            Self::User { .. } => KeyTier::User,
        }
    }

    /// Parse a key in one of the known layouts.
    ///
    /// Returns `None` for keys in none of the layouts, such as `item:1`.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        if let Some(uid) = key.strip_prefix(LEGACY_GLOBAL_PREFIX) {
            if uid.is_empty() || uid.contains(':') {
                return None;
            }
            return Some(Self::LegacyGlobal {
                uid: uid.to_string(),
            });
        }

        let parts: Vec<&str> = key.split(':').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [ITEM_TAG, GLOBAL_TIER, namespace, uid] => Some(Self::Global {
                namespace: (*namespace).to_string(),
                uid: (*uid).to_string(),
            }),
            [ITEM_TAG, USER_TIER, user, namespace, uid] => Some(Self::User {
                user: (*user).to_string(),
                namespace: (*namespace).to_string(),
                uid: (*uid).to_string(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegacyGlobal { uid } => write!(f, "{LEGACY_GLOBAL_PREFIX}{uid}"),
            Self::Global { namespace, uid } => {
                write!(f, "{ITEM_TAG}:{GLOBAL_TIER}:{namespace}:{uid}")
            }
            Self::User {
                user,
                namespace,
                uid,
            } => write!(f, "{ITEM_TAG}:{USER_TIER}:{user}:{namespace}:{uid}"),
        }
    }
}

/// Tier of any key; keys outside the known layouts are `Unversioned`.
#[must_use]
pub fn classify(key: &str) -> KeyTier {
    ItemKey::parse(key).map_or(KeyTier::Unversioned, |parsed| parsed.tier())
}

/// Last colon-separated segment of a key.
///
/// A key without colons is its own identifier.
#[must_use]
pub fn identifier_suffix(key: &str) -> &str {
    key.rsplit(':').next().unwrap_or(key)
}

/// Whether the key carries the item type tag as a plain string prefix.
#[must_use]
pub fn is_item_key(key: &str) -> bool {
    key.starts_with(ITEM_TAG)
}

/// Whether the key was already written by the first migration.
#[must_use]
pub fn is_legacy_global(key: &str) -> bool {
    key.starts_with(LEGACY_GLOBAL_PREFIX)
}
