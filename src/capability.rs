//! Precondition checks with a single remediation attempt.
//!
//! A [`Capability`] is something the process needs from its environment (a font family, a
//! helper resource) that may be missing but can sometimes be made available.  [`ensure`] probes
//! it, remediates at most once when the probe reports [`Error::MissingDependency`], and probes a
//! second time.  A second failure is returned to the caller unchanged.

use log::{error, info, warn};

use crate::error::{Error, Result};

/// An environmental precondition that can be probed and, possibly, remediated.
pub trait Capability {
    /// Value produced by a successful probe.
    type Output;

    /// Name used in log messages and errors.
    fn name(&self) -> &str;

    /// Checks the precondition.  Missing resources are reported as
    /// [`Error::MissingDependency`]; any other error is not remediated.
    fn probe(&self) -> Result<Self::Output>;

    /// Tries to make the capability available.
    fn remediate(&mut self) -> Result<()>;
}

/// Probes `capability`, remediating and re-probing exactly once if it is missing.
pub fn ensure<C: Capability>(capability: &mut C) -> Result<C::Output> {
    let reason = match capability.probe() {
        Ok(output) => return Ok(output),
        Err(Error::MissingDependency { reason, .. }) => reason,
        Err(other) => return Err(other),
    };

    warn!(
        "capability `{}` unavailable ({}); attempting remediation",
        capability.name(),
        reason
    );
    capability.remediate()?;

    match capability.probe() {
        Ok(output) => {
            info!("capability `{}` available after remediation", capability.name());
            Ok(output)
        }
        Err(err) => {
            error!(
                "capability `{}` still unavailable after remediation: {}",
                capability.name(),
                err
            );
            Err(err)
        }
    }
}
