//! View selection state shared by the engine and the renderer.

/// UI configuration options derived from config/environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}

/// Which list the left panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Tab {
    #[default]
    Sessions,
    Processes,
    History,
}

impl Tab {
    pub const ALL: [Self; 3] = [Self::Sessions, Self::Processes, Self::History];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Tab::Sessions => "Sessions",
            Tab::Processes => "Processes",
            Tab::History => "History",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Tab::Sessions => 0,
            Tab::Processes => 1,
            Tab::History => 2,
        }
    }
}

/// Which panel owns navigation keys in Normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    List,
    Log,
}

impl Panel {
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Panel::List => Panel::Log,
            Panel::Log => Panel::List,
        }
    }
}

/// Channel restriction applied to the sessions list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    Signal,
    Matrix,
}

impl SourceFilter {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            SourceFilter::All => SourceFilter::Signal,
            SourceFilter::Signal => SourceFilter::Matrix,
            SourceFilter::Matrix => SourceFilter::All,
        }
    }

    /// Channel name matched against `Session::channel`, `None` for all.
    #[must_use]
    pub const fn channel(self) -> Option<&'static str> {
        match self {
            SourceFilter::All => None,
            SourceFilter::Signal => Some("signal"),
            SourceFilter::Matrix => Some("matrix"),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.channel() {
            Some(channel) => channel,
            None => "all",
        }
    }
}
