//! Error types for the spell engine

use lorebound_core::ActorId;

/// Errors from encoding effect tokens
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("tier {0} is outside the encodable range 0..=10")]
    TierOutOfRange(u8),
}

/// Errors from weighted selection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("weighted table is empty")]
    EmptyTable,

    #[error("entry {index} has a non-positive weight")]
    ZeroWeight { index: usize },

    #[error("no eligible entry after {attempts} draws")]
    RetriesExhausted { attempts: usize },

    #[error("cast tier {0} is outside 1..=5")]
    InvalidCastTier(u8),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Fatal configuration errors raised while building the catalog and registries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate label '{label}' in {category} table")]
    DuplicateLabel {
        category: &'static str,
        label: String,
    },

    #[error("malformed tier table for '{label}': {reason}")]
    MalformedTiers { label: String, reason: String },

    #[error("'{label}' has a zero weight")]
    ZeroWeight { label: String },

    #[error("machine factory registered for unknown armor label '{0}'")]
    UnknownMachineLabel(String),

    #[error("armor effect '{0}' has neither a hit activation nor a machine")]
    Unwired(String),

    #[error("{category} table is empty")]
    EmptyTable { category: &'static str },
}

/// Failures reported by the host collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("actor {0} is not present")]
    UnknownActor(ActorId),

    #[error("actor {0} is dead")]
    DeadActor(ActorId),

    #[error("command rejected: {0}")]
    CommandRejected(String),
}

/// Failures inside a single effect activation or machine update
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Errors from the enchant operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnchantError {
    #[error("nothing equipped in that slot")]
    EmptySlot,

    #[error("items of this kind cannot be enchanted")]
    NotEnchantable,

    #[error("item already carries {0} spells")]
    LoreFull(usize),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Host(#[from] HostError),
}
