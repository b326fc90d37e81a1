//! Per-invocation argument container.

use std::collections::BTreeMap;
use std::path::Path;

use crate::argument::{Argument, ArgumentKind};
use crate::error::{MediaError, MediaResult};

/// Ordered collection holding at most one [`Argument`] per [`ArgumentKind`].
///
/// Iteration follows the kind order, not insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentContainer {
    arguments: BTreeMap<ArgumentKind, Argument>,
}

impl ArgumentContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, replacing any existing argument of the same kind.
    ///
    /// Returns the replaced argument.
    pub fn add(&mut self, argument: Argument) -> Option<Argument> {
        self.arguments.insert(argument.kind(), argument)
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, argument: Argument) -> Self {
        self.add(argument);
        self
    }

    /// Look up the argument of `kind`.
    pub fn get(&self, kind: ArgumentKind) -> MediaResult<&Argument> {
        self.arguments
            .get(&kind)
            .ok_or(MediaError::ArgumentNotFound(kind))
    }

    pub fn contains(&self, kind: ArgumentKind) -> bool {
        self.arguments.contains_key(&kind)
    }

    pub fn remove(&mut self, kind: ArgumentKind) -> Option<Argument> {
        self.arguments.remove(&kind)
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Arguments in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.values()
    }

    /// Whether a vendor hardware encoder is present.
    pub fn has_vendor_encoder(&self) -> bool {
        self.arguments.keys().any(ArgumentKind::is_vendor_encoder)
    }

    /// Declared output path.
    pub fn output_path(&self) -> MediaResult<&Path> {
        match self.arguments.get(&ArgumentKind::Output) {
            Some(Argument::Output(path)) => Ok(path),
            _ => Err(MediaError::MissingArgument(ArgumentKind::Output)),
        }
    }
}

impl FromIterator<Argument> for ArgumentContainer {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        let mut container = Self::new();
        container.extend(iter);
        container
    }
}

impl Extend<Argument> for ArgumentContainer {
    fn extend<I: IntoIterator<Item = Argument>>(&mut self, iter: I) {
        for argument in iter {
            self.add(argument);
        }
    }
}
