use courier_common::TypeKey;

/// Crate-wide result type for header routing.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The message shape was declared as an instantiation of the envelope
    /// with more than one body type, so no single body can be extracted.
    #[error("{message} resolves to more than one body type for {method}: {}", join(.candidates))]
    AmbiguousBody {
        method: &'static str,
        message: TypeKey,
        candidates: Vec<TypeKey>,
    },

    /// A body type was registered again with a different inherited list.
    #[error(
        "{body} is already registered for {method} as [{}], not [{}]",
        join(.registered),
        join(.requested)
    )]
    ConflictingSupertypes {
        method: &'static str,
        body: TypeKey,
        registered: Vec<TypeKey>,
        requested: Vec<TypeKey>,
    },

    /// An adapter was handed a message whose runtime type is not the shape
    /// it was built for. Callers must only route after a successful match on
    /// the same static type.
    #[error("{method}<{target}> expected a {expected} message")]
    ContractViolation {
        method: &'static str,
        expected: TypeKey,
        target: TypeKey,
    },
}

impl Error {
    /// True for errors raised while building routes, as opposed to while
    /// delivering a message.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousBody { .. } | Self::ConflictingSupertypes { .. }
        )
    }
}

fn join(keys: &[TypeKey]) -> String {
    keys.iter()
        .map(TypeKey::short_name)
        .collect::<Vec<_>>()
        .join(", ")
}
