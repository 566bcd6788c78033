use std::fmt;

/// Phase of the extension load pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadPhase {
    Discovery,
    Locale,
    Services,
    Registration,
}

impl LoadPhase {
    pub fn as_str(&self) -> &str {
        match self {
            LoadPhase::Discovery => "discovery",
            LoadPhase::Locale => "locale",
            LoadPhase::Services => "services",
            LoadPhase::Registration => "registration",
        }
    }
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an extension is in its load pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    Discovered,
    LocaleLoaded,
    ServicesLoaded,
    Registered,
    /// Terminal for this extension only
    Failed(LoadPhase),
}

impl DiscoveryState {
    pub fn is_registered(&self) -> bool {
        matches!(self, DiscoveryState::Registered)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DiscoveryState::Failed(_))
    }

    pub fn failed_phase(&self) -> Option<LoadPhase> {
        match self {
            DiscoveryState::Failed(phase) => Some(*phase),
            _ => None,
        }
    }
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryState::Discovered => write!(f, "discovered"),
            DiscoveryState::LocaleLoaded => write!(f, "locale loaded"),
            DiscoveryState::ServicesLoaded => write!(f, "services loaded"),
            DiscoveryState::Registered => write!(f, "registered"),
            DiscoveryState::Failed(phase) => write!(f, "failed ({})", phase),
        }
    }
}
