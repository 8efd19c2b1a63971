//! What a command asks the menu loop to do next.

/// Outcome of a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stay in the current menu and read the next command.
    Continue,
    /// Leave the current menu and return to its parent.
    Back,
    /// Leave every menu and end the program.
    Quit,
}

impl Action {
    /// Maps the result of a finished sub-menu onto its parent.
    ///
    /// Returning from a child keeps the parent running; quitting
    /// propagates upwards.
    #[must_use]
    pub const fn from_child(self) -> Self {
        match self {
            Self::Quit => Self::Quit,
            Self::Continue | Self::Back => Self::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_child() {
        assert_eq!(Action::Back.from_child(), Action::Continue);
        assert_eq!(Action::Quit.from_child(), Action::Quit);
        assert_eq!(Action::Continue.from_child(), Action::Continue);
    }
}
