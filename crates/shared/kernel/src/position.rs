use plaza_domain::scene::Position;

/// Updates from the position source; the host never computes positions itself.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    /// The player moved while settled.
    Moved { position: Position },
    /// A teleport was requested; `label` replaces the default loading message.
    TeleportRequested { target: Position, label: Option<String> },
    /// The position became unsettled (initial spawn, respawn...).
    Unsettled { target: Position },
    /// The position source considers `position` final.
    Settled { position: Position },
}

impl PositionEvent {
    /// Position the event refers to.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Moved { position } | Self::Settled { position } => *position,
            Self::TeleportRequested { target, .. } | Self::Unsettled { target } => *target,
        }
    }

    /// Loading message for a teleport, e.g. `Teleporting to 10, -3`.
    #[must_use]
    pub fn teleport_message(&self) -> Option<String> {
        match self {
            Self::TeleportRequested { target, label } => Some(
                label
                    .clone()
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| format!("Teleporting to {}", target.parcel())),
            ),
            _ => None,
        }
    }
}
