//! Local session identity.
//!
//! A session is either unauthenticated or identified by the id the server
//! handed out in its welcome. The only way back to unauthenticated is an
//! explicit eviction by the server.

use shoot_gate::PlayerId;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Session {
    #[default]
    Unauthenticated,
    Identified(PlayerId),
}

impl Session {
    /// Adopt the identity from a welcome. A second welcome replaces the first.
    pub fn identify(&mut self, id: PlayerId) {
        *self = Self::Identified(id);
    }

    /// Drop the identity, returning the one that was held.
    pub fn evict(&mut self) -> Option<PlayerId> {
        match std::mem::take(self) {
            Self::Identified(id) => Some(id),
            Self::Unauthenticated => None,
        }
    }

    pub fn local_id(&self) -> Option<&PlayerId> {
        match self {
            Self::Identified(id) => Some(id),
            Self::Unauthenticated => None,
        }
    }

    pub fn is_identified(&self) -> bool {
        matches!(self, Self::Identified(_))
    }
}
