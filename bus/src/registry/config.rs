/// Registry behavior switches.
///
/// ```rust,ignore
/// // Keep native listeners attached after unsubscribe
/// let registry = Registry::with_config(Config::default().detach_on_unsubscribe(false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Detach the native listeners for the event from the members that
    /// [`unsubscribe`](super::Registry::unsubscribe) removes from the aggregate.
    ///
    /// With `false`, unsubscribe only updates bookkeeping and every listener attached by
    /// `subscribe` stays on its target.
    pub detach_on_unsubscribe: bool,
}

impl Config {
    /// The default configuration.
    pub const DEFAULT: Self = Self {
        detach_on_unsubscribe: true,
    };

    /// Sets [`detach_on_unsubscribe`](Self::detach_on_unsubscribe).
    #[must_use]
    pub const fn detach_on_unsubscribe(mut self, detach: bool) -> Self {
        self.detach_on_unsubscribe = detach;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
