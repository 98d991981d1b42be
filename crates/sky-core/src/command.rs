//! Commands and missions.
//!
//! A [`Command`] is pure target/parameter data: where to go, how long to
//! hover, whom to exchange with.  All execution state lives in the
//! command execution engine (`sky-command`) that is created when the command
//! is dequeued.

use crate::{AgentId, Coord, MissionId, StationId};

/// One unit of work for an agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Fly in a straight line to `(x, y, z)` at `speed` m/s.
    Waypoint { x: f64, y: f64, z: f64, speed: f64 },

    /// Climb vertically to `altitude` metres.
    Takeoff { altitude: f64 },

    /// Hover in place for `duration` seconds.
    HoldPosition { duration: f64 },

    /// Fly to `station`, dock, and charge.
    Charge { station: StationId },

    /// Hand the running mission over to / take it over from a peer.
    ///
    /// The depleting agent does not know its peer yet (`peer: None`) and
    /// waits; the replacing agent knows whom it relieves and initiates.
    Exchange {
        peer:      Option<AgentId>,
        initiator: bool,
        mission:   bool,
    },
}

impl Command {
    /// Convenience constructor for a waypoint at `to`.
    pub fn waypoint(to: Coord, speed: f64) -> Self {
        Command::Waypoint { x: to.x, y: to.y, z: to.z, speed }
    }

    /// Fixed target coordinate, for commands that have one.
    pub fn target(&self) -> Option<Coord> {
        match *self {
            Command::Waypoint { x, y, z, .. } => Some(Coord::new(x, y, z)),
            _ => None,
        }
    }

    /// Short lower-case label, useful for logs and CSV columns.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Waypoint { .. }     => "waypoint",
            Command::Takeoff { .. }      => "takeoff",
            Command::HoldPosition { .. } => "hold",
            Command::Charge { .. }       => "charge",
            Command::Exchange { .. }     => "exchange",
        }
    }
}

/// An ordered list of commands, optionally repeated forever.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mission {
    pub id:       MissionId,
    pub commands: Vec<Command>,
    pub repeat:   bool,
}

impl Mission {
    pub fn new(id: MissionId, commands: Vec<Command>, repeat: bool) -> Self {
        Self { id, commands, repeat }
    }

    /// The first fixed coordinate of the mission, used to pick the closest
    /// agent.  `None` if the mission never names a position.
    pub fn anchor(&self) -> Option<Coord> {
        self.commands.iter().find_map(Command::target)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A mission together with the index of the next command to run.
///
/// Repeating missions wrap the cursor modulo the command count; this is the
/// whole of the "circular list" the mission needs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MissionCursor {
    pub mission: Mission,
    pub next:    usize,
}

impl MissionCursor {
    pub fn new(mission: Mission) -> Self {
        Self { mission, next: 0 }
    }

    /// Take the next command, advancing the cursor.
    pub fn advance(&mut self) -> Option<Command> {
        let cmd = self.peek_at(0)?.clone();
        self.next += 1;
        if self.mission.repeat && self.next >= self.mission.commands.len() {
            self.next = 0;
        }
        Some(cmd)
    }

    /// Step the cursor back by one command (used when an in-flight mission
    /// command is handed to another agent).
    pub fn rewind(&mut self) {
        let len = self.mission.commands.len();
        if len == 0 {
            return;
        }
        self.next = if self.next == 0 {
            if self.mission.repeat { len - 1 } else { 0 }
        } else {
            self.next - 1
        };
    }

    /// The command `ahead` positions after the cursor, wrapping for
    /// repeating missions.
    pub fn peek_at(&self, ahead: usize) -> Option<&Command> {
        let len = self.mission.commands.len();
        if len == 0 {
            return None;
        }
        let pos = self.next + ahead;
        if self.mission.repeat {
            self.mission.commands.get(pos % len)
        } else {
            self.mission.commands.get(pos)
        }
    }

    /// Commands left before a non-repeating mission ends.  `None` for
    /// repeating missions.
    pub fn remaining(&self) -> Option<usize> {
        if self.mission.repeat {
            None
        } else {
            Some(self.mission.commands.len().saturating_sub(self.next))
        }
    }

    pub fn is_finished(&self) -> bool {
        self.peek_at(0).is_none()
    }
}
