use std::{collections::BTreeSet, str::FromStr};

/// The set of controllers to run.
///
/// Parsed from a comma-separated list in which `*` stands for every
/// controller, `name` enables a controller and `-name` disables it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controllers(BTreeSet<&'static str>);

#[derive(Debug, thiserror::Error)]
#[error("unknown controller: {0}")]
pub struct UnknownController(String);

// === impl Controllers ===

impl Controllers {
    pub const CRD_SYNCHRONIZER: &'static str = "crd-synchronizer";
    pub const MCI_INDEX: &'static str = "mci-index";

    const ALL: [&'static str; 2] = [Self::CRD_SYNCHRONIZER, Self::MCI_INDEX];

    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    fn known(name: &str) -> Result<&'static str, UnknownController> {
        Self::ALL
            .into_iter()
            .find(|known| *known == name)
            .ok_or_else(|| UnknownController(name.to_string()))
    }
}

impl FromStr for Controllers {
    type Err = UnknownController;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut enabled = BTreeSet::new();
        let mut disabled = BTreeSet::new();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name == "*" {
                enabled.extend(Self::ALL);
            } else if let Some(name) = name.strip_prefix('-') {
                disabled.insert(Self::known(name)?);
            } else {
                enabled.insert(Self::known(name)?);
            }
        }
        Ok(Self(enabled.difference(&disabled).copied().collect()))
    }
}
