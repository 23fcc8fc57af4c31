//! # Startup introspection of the container's registration entry point.
//!
//! The hosted framework shipped three incompatible signatures for "register a
//! provider" across versions (1, 2 or 3 positional arguments). [`AppProbe`]
//! inspects the container **once at startup**, pins the matching
//! [`RegisterShape`], and dispatches every subsequent registration through
//! it. An unrecognized arity is a fatal configuration error; a hypothetical
//! fourth shape is deliberately not guessed at (see the arity test below).

use super::container::Container;
use super::provider::ServiceProvider;
use crate::error::SetupError;

/// The provider-registration call shape pinned at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterShape {
    /// `register(provider)`
    Basic,
    /// `register(provider, force)`
    Force,
    /// `register(provider, options, force)`
    OptionsForce,
}

/// One-time probe of the container's registration surface.
#[derive(Clone, Copy, Debug)]
pub struct AppProbe {
    shape: RegisterShape,
}

impl AppProbe {
    /// Inspects `app` and pins its register shape.
    ///
    /// # Errors
    /// [`SetupError::UnknownRegisterShape`] for any arity outside `1..=3`;
    /// the worker must not start with an entry point the coordinator cannot
    /// drive.
    pub fn inspect(app: &Container) -> Result<Self, SetupError> {
        let shape = match app.register_method_arity() {
            1 => RegisterShape::Basic,
            2 => RegisterShape::Force,
            3 => RegisterShape::OptionsForce,
            arity => return Err(SetupError::UnknownRegisterShape { arity }),
        };
        Ok(Self { shape })
    }

    /// The pinned call shape.
    pub fn shape(&self) -> RegisterShape {
        self.shape
    }

    /// Re-registers `provider` into `app` through the pinned shape.
    ///
    /// The multi-argument shapes force registration: re-registering a known
    /// per-request provider is intentional and must not be swallowed by the
    /// framework's duplicate guard.
    pub fn register(&self, app: &Container, provider: &dyn ServiceProvider) {
        match self.shape {
            RegisterShape::Basic => app.register(provider),
            RegisterShape::Force => app.register_force(provider, true),
            RegisterShape::OptionsForce => app.register_with_options(provider, &[], true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_arities_map_to_shapes() {
        let cases = [
            (1, RegisterShape::Basic),
            (2, RegisterShape::Force),
            (3, RegisterShape::OptionsForce),
        ];
        for (arity, expected) in cases {
            let app = Container::with_register_arity(arity);
            let probe = AppProbe::inspect(&app).expect("supported arity");
            assert_eq!(probe.shape(), expected, "arity {arity}");
        }
    }

    // Pins the version-compatibility contract: a future framework line with
    // a fourth signature must fail startup, not be guessed at.
    #[test]
    fn unknown_arity_is_fatal() {
        let app = Container::with_register_arity(4);
        let err = AppProbe::inspect(&app).expect_err("arity 4 must be rejected");
        assert_eq!(err.as_label(), "unknown_register_shape");
        assert!(matches!(
            err,
            SetupError::UnknownRegisterShape { arity: 4 }
        ));
    }
}
