// ============================================================================
// EFFECTS ENGINE — rayon-parallelized pixel filters
// ============================================================================
//
// All functions operate on fixed-stride RGBA byte buffers of length
// `4 * width * height` and return a buffer of identical length, byte-for-byte
// compatible for direct re-composition onto the canvas.
//
// The four collaborator-backed effects (grayscale, sepia, cold-inverse,
// spectral-glow) live behind the [`FilterModule`] trait; invert and blur are
// in-process effects that never touch the collaborator.

use rayon::prelude::*;

// ============================================================================
// EFFECT SET
// ============================================================================

/// The canonical effect set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Grayscale,
    Sepia,
    ColdInverse,
    SpectralGlow,
    Invert,
    Blur,
}

impl Effect {
    pub fn all() -> &'static [Effect] {
        &[
            Effect::Grayscale,
            Effect::Sepia,
            Effect::ColdInverse,
            Effect::SpectralGlow,
            Effect::Invert,
            Effect::Blur,
        ]
    }

    /// Parse a user-facing effect name (CLI argument, button id).
    pub fn parse(name: &str) -> Option<Effect> {
        match name.trim().to_lowercase().as_str() {
            "grayscale" | "greyscale" => Some(Effect::Grayscale),
            "sepia" => Some(Effect::Sepia),
            "coldinverse" | "cold-inverse" | "cold_inverse" => Some(Effect::ColdInverse),
            "spectralglow" | "spectral-glow" | "spectral_glow" => Some(Effect::SpectralGlow),
            "invert" => Some(Effect::Invert),
            "blur" => Some(Effect::Blur),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Effect::Grayscale => "grayscale",
            Effect::Sepia => "sepia",
            Effect::ColdInverse => "cold-inverse",
            Effect::SpectralGlow => "spectral-glow",
            Effect::Invert => "invert",
            Effect::Blur => "blur",
        }
    }

    /// True for effects dispatched through the external filter collaborator.
    /// Invert and blur run in-process.
    pub fn requires_module(&self) -> bool {
        !matches!(self, Effect::Invert | Effect::Blur)
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// FILTER COLLABORATOR BOUNDARY
// ============================================================================

/// The external filter collaborator: one function per effect name, each
/// taking a raw RGBA buffer plus dimensions and returning a transformed
/// buffer of identical length. Implementations perform the actual pixel
/// math; the gateway performs none.
pub trait FilterModule {
    fn grayscale(&self, pixels: &[u8], width: u32, height: u32) -> Vec<u8>;
    fn sepia(&self, pixels: &[u8], width: u32, height: u32) -> Vec<u8>;
    fn cold_inverse(&self, pixels: &[u8], width: u32, height: u32) -> Vec<u8>;
    fn spectral_glow(&self, pixels: &[u8], width: u32, height: u32) -> Vec<u8>;
}

/// Built-in native implementation of the filter collaborator.
pub struct NativeFilters;

impl FilterModule for NativeFilters {
    fn grayscale(&self, pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
        per_pixel(pixels, width, height, |[r, g, b, a]| {
            let gray = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) as u8;
            [gray, gray, gray, a]
        })
    }

    fn sepia(&self, pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
        per_pixel(pixels, width, height, |[r, g, b, a]| {
            let (r, g, b) = (r as f32, g as f32, b as f32);
            let tr = (0.393 * r + 0.769 * g + 0.189 * b).min(255.0) as u8;
            let tg = (0.349 * r + 0.686 * g + 0.168 * b).min(255.0) as u8;
            let tb = (0.272 * r + 0.534 * g + 0.131 * b).min(255.0) as u8;
            [tr, tg, tb, a]
        })
    }

    fn cold_inverse(&self, pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
        per_pixel(pixels, width, height, |[r, g, b, a]| {
            let new_r = ((255 - r) as f32 * 0.5).min(255.0) as u8;
            let new_g = ((255 - g) as f32 * 0.8).min(255.0) as u8;
            let new_b = ((255 - b) as f32 * 1.1).min(255.0) as u8;
            let new_a = (a as f32 * 0.9).round() as u8;
            [new_r, new_g, new_b, new_a]
        })
    }

    fn spectral_glow(&self, pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
        per_pixel(pixels, width, height, |[r, g, b, a]| {
            let new_r = (r as f32 * 0.6).min(255.0) as u8;
            let new_g = (g as f32 * 0.7).min(255.0) as u8;
            let boosted_b = (b as f32 * 1.4 + r as f32 * 0.2).min(255.0) as u8;

            let intensity = (r as f32 + g as f32 + b as f32) / 3.0;
            let glow = ((intensity / 255.0).powf(1.5) * 50.0).min(60.0) as u8;

            let final_b = boosted_b.saturating_add(glow);
            let final_a = (a as f32 * 0.95 + glow as f32 * 0.2).min(255.0) as u8;
            [new_r, new_g, final_b, final_a]
        })
    }
}

// ============================================================================
// IN-PROCESS EFFECTS
// ============================================================================

/// Gaussian sigma used for the in-process blur effect.
pub const BLUR_SIGMA: f32 = 5.0;

/// Per-pixel RGB inversion; alpha preserved.
pub fn invert(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    per_pixel(pixels, width, height, |[r, g, b, a]| {
        [255 - r, 255 - g, 255 - b, a]
    })
}

/// Separable Gaussian blur on a raw RGBA buffer, parallel by row.
pub fn gaussian_blur(pixels: &[u8], width: u32, height: u32, sigma: f32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 || pixels.len() != w * h * 4 {
        return pixels.to_vec();
    }

    let kernel = build_gaussian_kernel(sigma);
    let radius = kernel.len() / 2;

    let buf_in: Vec<f32> = pixels.iter().map(|&b| b as f32).collect();

    // Horizontal pass
    let mut buf_h = vec![0.0f32; w * h * 4];
    buf_h.par_chunks_mut(w * 4).enumerate().for_each(|(y, row_out)| {
        let row_in_start = y * w * 4;
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kv) in kernel.iter().enumerate() {
                let sx = (x as isize + ki as isize - radius as isize)
                    .max(0)
                    .min(w as isize - 1) as usize;
                let idx = row_in_start + sx * 4;
                for c in 0..4 {
                    acc[c] += buf_in[idx + c] * kv;
                }
            }
            row_out[x * 4..x * 4 + 4].copy_from_slice(&acc);
        }
    });

    // Vertical pass
    let mut buf_v = vec![0.0f32; w * h * 4];
    buf_v.par_chunks_mut(w * 4).enumerate().for_each(|(y, row_out)| {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kv) in kernel.iter().enumerate() {
                let sy = (y as isize + ki as isize - radius as isize)
                    .max(0)
                    .min(h as isize - 1) as usize;
                let idx = sy * w * 4 + x * 4;
                for c in 0..4 {
                    acc[c] += buf_h[idx + c] * kv;
                }
            }
            row_out[x * 4..x * 4 + 4].copy_from_slice(&acc);
        }
    });

    buf_v
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// Build a 1-D Gaussian kernel truncated at ceil(3*sigma), normalized.
fn build_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    if radius == 0 {
        return vec![1.0];
    }
    let len = radius * 2 + 1;
    let mut kernel = vec![0.0f32; len];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;
    for (i, v) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *v = (-x * x / s2).exp();
        sum += *v;
    }
    let inv = 1.0 / sum;
    for v in &mut kernel {
        *v *= inv;
    }
    kernel
}

// ============================================================================
// SHARED HELPER
// ============================================================================

/// Apply a pure per-pixel transform, parallel by row.
fn per_pixel<F>(pixels: &[u8], width: u32, height: u32, transform: F) -> Vec<u8>
where
    F: Fn([u8; 4]) -> [u8; 4] + Sync,
{
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 || pixels.len() != w * h * 4 {
        return pixels.to_vec();
    }

    let stride = w * 4;
    let mut dst = vec![0u8; w * h * 4];
    dst.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &pixels[y * stride..(y + 1) * stride];
        for x in 0..w {
            let pi = x * 4;
            let px = [row_in[pi], row_in[pi + 1], row_in[pi + 2], row_in[pi + 3]];
            row_out[pi..pi + 4].copy_from_slice(&transform(px));
        }
    });
    dst
}
