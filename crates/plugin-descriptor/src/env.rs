//! Runtime environment probing for the validation fallback.
//!
//! Some runtimes ship a validator that cannot be trusted. When the probed
//! signature matches a configured defective signature the loader retries a
//! failed strict parse once in lax mode.

/// Identifies the current runtime.
pub trait EnvironmentProbe: Send + Sync {
    fn signature(&self) -> String;
}

/// Probes the host this process runs on, as `<arch>-<os>-<family>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl EnvironmentProbe for HostProbe {
    fn signature(&self) -> String {
        use std::env::consts::{ARCH, FAMILY, OS};
        format!("{ARCH}-{OS}-{FAMILY}")
    }
}

/// Reports a fixed signature; used for configured overrides and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedProbe(pub String);

impl FixedProbe {
    pub fn new(signature: impl Into<String>) -> Self {
        Self(signature.into())
    }
}

impl EnvironmentProbe for FixedProbe {
    fn signature(&self) -> String {
        self.0.clone()
    }
}

/// Signatures of runtimes whose strict validation is known to be broken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackPolicy {
    defective: Vec<String>,
}

impl FallbackPolicy {
    /// A policy that never falls back.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn new<I, S>(signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            defective: signatures
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty())
                .collect(),
        }
    }

    pub fn signatures(&self) -> &[String] {
        &self.defective
    }

    /// The defective signature matched by `probe`, if any.
    ///
    /// Matching is a case-insensitive substring test.
    pub fn matching(&self, probe: &dyn EnvironmentProbe) -> Option<&str> {
        let signature = probe.signature().to_lowercase();
        self.defective
            .iter()
            .find(|d| signature.contains(&d.to_lowercase()))
            .map(String::as_str)
    }

    pub fn applies(&self, probe: &dyn EnvironmentProbe) -> bool {
        self.matching(probe).is_some()
    }
}
