//! Typed identifiers for agents, stations, missions and command engines.
//!
//! Agent and station ids are dense positions assigned by the builder, so the
//! simulation can index plain `Vec`s with [`index`](AgentId::index).

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Placeholder carried by messages that name no one, e.g. a
            /// negative `MobileNodeResponse`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Index of a UAV in the fleet.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a charging station.
    pub struct StationId(u32);
}

typed_id! {
    /// Identifier of a submitted mission.
    pub struct MissionId(u32);
}

typed_id! {
    /// Per-agent sequence number of a command execution engine.
    pub struct CommandId(u32);
}
