//! Caller-supplied environment probes
//!
//! The executor never inspects the environment itself. It asks a
//! [`ComponentProbe`] whether a component exists and whether it is healthy;
//! both calls are synchronous and any latency or timeout policy belongs to
//! the implementation.

use thiserror::Error;

/// Result of a single health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Unhealthy(String),
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Health::Healthy)
    }
}

/// Error raised while probing a component (e.g. the status API was unreachable)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ProbeError(pub String);

impl ProbeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Existence and health probe for components
pub trait ComponentProbe {
    /// Whether the component exists in the environment being validated
    fn present(&self, id: &str) -> Result<bool, ProbeError>;

    /// Health predicate for a present component
    fn check(&self, id: &str) -> Result<Health, ProbeError>;
}

/// Probe built from two closures
pub struct FnProbe<P, C> {
    present: P,
    check: C,
}

impl<P, C> FnProbe<P, C>
where
    P: Fn(&str) -> Result<bool, ProbeError>,
    C: Fn(&str) -> Result<Health, ProbeError>,
{
    pub fn new(present: P, check: C) -> Self {
        Self { present, check }
    }
}

impl<P, C> ComponentProbe for FnProbe<P, C>
where
    P: Fn(&str) -> Result<bool, ProbeError>,
    C: Fn(&str) -> Result<Health, ProbeError>,
{
    fn present(&self, id: &str) -> Result<bool, ProbeError> {
        (self.present)(id)
    }

    fn check(&self, id: &str) -> Result<Health, ProbeError> {
        (self.check)(id)
    }
}
