use std::fmt;

/// A status that only ever moves forward through a fixed sequence.
pub trait LinearLifecycle: Copy + Eq + fmt::Debug {
    const INITIAL: Self;

    fn next(self) -> Option<Self>;

    fn label(self) -> &'static str;

    fn is_initial(self) -> bool {
        self == Self::INITIAL
    }

    fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Moves to `target` when it is the immediate successor of `self`.
    fn advance_to(self, target: Self) -> Result<Self, LifecycleError> {
        match self.next() {
            Some(next) if next == target => Ok(target),
            _ => Err(LifecycleError::InvalidTransition {
                from: self.label(),
                to: target.label(),
            }),
        }
    }

    fn ensure_deletable(self) -> Result<(), LifecycleError> {
        if self.is_initial() {
            Ok(())
        } else {
            Err(LifecycleError::DeleteNotAllowed {
                status: self.label(),
                initial: Self::INITIAL.label(),
            })
        }
    }

    fn ensure_editable(self) -> Result<(), LifecycleError> {
        if self.is_terminal() {
            Err(LifecycleError::Frozen {
                status: self.label(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot move from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error("only {initial} records can be deleted (current status: {status})")]
    DeleteNotAllowed {
        status: &'static str,
        initial: &'static str,
    },
    #[error("record is {status} and can no longer be edited")]
    Frozen { status: &'static str },
}
