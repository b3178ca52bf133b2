//! Imperative commands a host can send to a mounted card field.

/// A recognised command.
///
/// Hosts identify commands by string; anything other than `"focus"`,
/// `"blur"`, or `"clear"` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardFieldCommand {
    /// Request focus on the surface.
    Focus,
    /// Release focus.
    Blur,
    /// Reset every field to empty.  Focus is left where it is.
    Clear,
}

impl CardFieldCommand {
    /// Parses a host command identifier.  Unknown identifiers yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "focus" => Some(Self::Focus),
            "blur" => Some(Self::Blur),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::Clear => "clear",
        }
    }
}
