use thiserror::Error;

/// Input rejected by [`Registry::subscribe`](super::Registry::subscribe).
///
/// "No subscribers" is not an error: `publish` and `unsubscribe` report it by returning
/// `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("event name must not be empty")]
    EmptyEventName,

    #[error("cannot subscribe an empty target to '{event}'")]
    EmptyTarget { event: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::EmptyEventName.to_string(),
            "event name must not be empty"
        );
        assert_eq!(
            Error::EmptyTarget {
                event: "login".into()
            }
            .to_string(),
            "cannot subscribe an empty target to 'login'"
        );
    }
}
