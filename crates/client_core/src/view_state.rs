//! Load and mutation state machines held by each screen.

use crate::error::ClientError;

/// `Loading` resolves exactly once into `Ready` or `Failed`. Switching to
/// another record mounts a fresh state.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(ClientError),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

impl<T> LoadState<T> {
    /// Returns `false` and leaves the state untouched if it already resolved.
    pub fn resolve(&mut self, result: Result<T, ClientError>) -> bool {
        if !self.is_loading() {
            return false;
        }
        *self = match result {
            Ok(value) => LoadState::Ready(value),
            Err(err) => LoadState::Failed(err),
        };
        true
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum MutationState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(ClientError),
}

impl MutationState {
    /// Moves to `Submitting`. Returns `false` when a request is already in
    /// flight or the form already succeeded, in which case nothing should be
    /// sent.
    pub fn begin_submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        *self = MutationState::Submitting;
        true
    }

    /// Ignored unless a request is in flight.
    pub fn finish<T>(&mut self, result: &Result<T, ClientError>) {
        if !self.is_busy() {
            return;
        }
        *self = match result {
            Ok(_) => MutationState::Succeeded,
            Err(err) => MutationState::Failed(err.clone()),
        };
    }

    /// Validation failures never leave the form, but still show inline.
    pub fn reject(&mut self, err: ClientError) {
        if !self.is_busy() {
            *self = MutationState::Failed(err);
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, MutationState::Submitting)
    }

    pub fn can_submit(&self) -> bool {
        matches!(self, MutationState::Idle | MutationState::Failed(_))
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            MutationState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The form field a rejected draft tripped on, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        match self {
            MutationState::Failed(ClientError::Validation(err)) => Some(err.field()),
            _ => None,
        }
    }
}
