use crate::error::EditorError;
use crate::ops::effects::{Effect, FilterModule, NativeFilters};

// ============================================================================
// FILTER GATEWAY — boundary adapter to the external filter collaborator
// ============================================================================

/// Loader that produces the filter collaborator. Modeled after an async
/// module load step: invoked lazily, once, before first use.
pub type ModuleLoader = Box<dyn Fn() -> Result<Box<dyn FilterModule>, String>>;

/// Thin adapter between the session and the filter collaborator.
///
/// Hands raw pixel buffers plus dimensions to the collaborator's per-effect
/// functions and validates the result; performs no filter logic itself and
/// never retries. Stateless apart from the lazily-initialized module handle.
pub struct FilterGateway {
    module: Option<Box<dyn FilterModule>>,
    loader: ModuleLoader,
}

impl FilterGateway {
    /// Gateway over the built-in native filter module.
    pub fn native() -> Self {
        Self::with_loader(Box::new(|| Ok(Box::new(NativeFilters))))
    }

    /// Gateway over a custom collaborator loader (tests, alternate modules).
    pub fn with_loader(loader: ModuleLoader) -> Self {
        Self {
            module: None,
            loader,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.module.is_some()
    }

    /// Initialize the collaborator if it is not yet loaded. Idempotent after
    /// success; a load failure is surfaced as `FilterInitFailed` and not
    /// retried here — the next dispatch attempts a fresh load.
    pub fn ensure_initialized(&mut self) -> Result<(), EditorError> {
        if self.module.is_none() {
            crate::log_info!("gateway: initializing filter module");
            let module = (self.loader)().map_err(EditorError::FilterInitFailed)?;
            self.module = Some(module);
        }
        Ok(())
    }

    /// Dispatch a collaborator-backed effect. The input must be a fixed-
    /// stride RGBA buffer of length `4 * width * height`; the output is
    /// validated to the same length before being handed back.
    ///
    /// Effects that do not require the collaborator (invert, blur) are the
    /// session's responsibility, not the gateway's.
    pub fn dispatch(
        &mut self,
        effect: Effect,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, EditorError> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(EditorError::BufferSize {
                expected,
                got: pixels.len(),
            });
        }

        self.ensure_initialized()?;
        // ensure_initialized() succeeded, so the module is present
        let module = self.module.as_ref().ok_or_else(|| {
            EditorError::FilterInitFailed("module missing after init".to_string())
        })?;

        let out = match effect {
            Effect::Grayscale => module.grayscale(pixels, width, height),
            Effect::Sepia => module.sepia(pixels, width, height),
            Effect::ColdInverse => module.cold_inverse(pixels, width, height),
            Effect::SpectralGlow => module.spectral_glow(pixels, width, height),
            Effect::Invert | Effect::Blur => {
                return Err(EditorError::FilterInitFailed(format!(
                    "effect '{}' does not use the filter module",
                    effect
                )));
            }
        };

        if out.len() != expected {
            return Err(EditorError::BufferSize {
                expected,
                got: out.len(),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collaborator that violates the output-length contract.
    struct ShortModule;

    impl FilterModule for ShortModule {
        fn grayscale(&self, _: &[u8], _: u32, _: u32) -> Vec<u8> {
            vec![0; 3]
        }
        fn sepia(&self, p: &[u8], _: u32, _: u32) -> Vec<u8> {
            p.to_vec()
        }
        fn cold_inverse(&self, p: &[u8], _: u32, _: u32) -> Vec<u8> {
            p.to_vec()
        }
        fn spectral_glow(&self, p: &[u8], _: u32, _: u32) -> Vec<u8> {
            p.to_vec()
        }
    }

    #[test]
    fn init_is_lazy_and_idempotent() {
        let mut gateway = FilterGateway::native();
        assert!(!gateway.is_initialized());
        gateway.ensure_initialized().unwrap();
        assert!(gateway.is_initialized());
        gateway.ensure_initialized().unwrap();
        assert!(gateway.is_initialized());
    }

    #[test]
    fn failed_load_is_surfaced_not_swallowed() {
        let mut gateway =
            FilterGateway::with_loader(Box::new(|| Err("fetch failed: 404".to_string())));
        let err = gateway
            .dispatch(Effect::Grayscale, &[0; 4], 1, 1)
            .unwrap_err();
        assert!(matches!(err, EditorError::FilterInitFailed(_)));
        assert!(!gateway.is_initialized());
    }

    #[test]
    fn output_length_contract_is_enforced() {
        let mut gateway = FilterGateway::with_loader(Box::new(|| Ok(Box::new(ShortModule))));
        let err = gateway
            .dispatch(Effect::Grayscale, &[0; 16], 2, 2)
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::BufferSize {
                expected: 16,
                got: 3
            }
        ));
    }

    #[test]
    fn input_length_contract_is_enforced() {
        let mut gateway = FilterGateway::native();
        let err = gateway.dispatch(Effect::Sepia, &[0; 5], 2, 2).unwrap_err();
        assert!(matches!(err, EditorError::BufferSize { expected: 16, .. }));
    }

    #[test]
    fn dispatch_runs_collaborator_effect() {
        let mut gateway = FilterGateway::native();
        let red = [255u8, 0, 0, 255];
        let out = gateway.dispatch(Effect::Grayscale, &red, 1, 1).unwrap();
        assert_eq!(out, vec![76, 76, 76, 255]);
    }
}
