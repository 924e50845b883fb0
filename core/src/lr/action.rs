use super::StateId;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Action {
    Shift(StateId),
    /// Reduce by the production of the given non-terminal.
    Reduce(String),
    Goto(StateId),
    Accept,
    /// Explicit diagnostic installed with [super::LrTable::set_error].
    Error(String),
}

impl Action {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Shift(to) => write!(f, "s{}", to),
            Action::Reduce(name) => write!(f, "r{}", name),
            Action::Goto(to) => write!(f, "g{}", to),
            Action::Accept => write!(f, "acc"),
            Action::Error(message) => write!(f, "err{:?}", message),
        }
    }
}
