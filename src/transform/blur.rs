use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{PixelFxError, PixelFxResult};
use crate::foundation::math::q16_to_u8;
use crate::surface::view::SourceView;
use crate::transform::effect::Effect;

/// Gaussian blur over a `(2r+1)^2` neighbourhood with edge clamping.
///
/// The Q16 kernel is built in [`Effect::on_begin_render`]; rendering before that is an error.
#[derive(Clone, Debug)]
pub struct GaussianBlurEffect {
    pub radius: u32,
    pub sigma: f32,
    kernel: Vec<u32>,
}

impl GaussianBlurEffect {
    /// Largest accepted radius; larger values fail in [`Effect::on_begin_render`].
    pub const MAX_RADIUS: u32 = 1024;

    pub fn new(radius: u32, sigma: f32) -> Self {
        Self {
            radius,
            sigma,
            kernel: Vec::new(),
        }
    }

    fn blur_pixel(&self, src: &SourceView<'_>, x: u32, y: u32) -> Rgba8 {
        let k = &self.kernel;
        let r = (k.len() / 2) as i64;
        let mut acc = [0u64; 4];
        for (ky, &wy) in k.iter().enumerate() {
            let sy = i64::from(y) + ky as i64 - r;
            for (kx, &wx) in k.iter().enumerate() {
                let sx = i64::from(x) + kx as i64 - r;
                let px = src.pixel_clamped(sx, sy).to_array();
                // Product of two Q16 weights is Q32; drop back to Q16 with rounding.
                let w = (u64::from(wy) * u64::from(wx) + 32768) >> 16;
                for c in 0..4 {
                    acc[c] += w * u64::from(px[c]);
                }
            }
        }
        Rgba8::new(
            q16_to_u8(acc[0]),
            q16_to_u8(acc[1]),
            q16_to_u8(acc[2]),
            q16_to_u8(acc[3]),
        )
    }
}

impl Effect for GaussianBlurEffect {
    fn on_begin_render(&mut self, src: &SourceView<'_>, roi: Rect) -> PixelFxResult<()> {
        self.kernel = gaussian_kernel_q16(self.radius, self.sigma)?;
        tracing::trace!(
            radius = self.radius,
            taps = self.kernel.len(),
            src_w = src.width(),
            src_h = src.height(),
            roi = ?roi,
            "gaussian kernel ready"
        );
        Ok(())
    }

    fn render_line(
        &self,
        src: &SourceView<'_>,
        dst: &mut [Rgba8],
        line: Rect,
    ) -> PixelFxResult<()> {
        if self.kernel.is_empty() {
            return Err(PixelFxError::render(
                "gaussian blur rendered before on_begin_render",
            ));
        }
        let y = line.y as u32;
        if self.kernel.len() == 1 {
            let span = src.span(line.x as u32, y);
            dst.copy_from_slice(&span[..dst.len()]);
            return Ok(());
        }
        for (i, px) in dst.iter_mut().enumerate() {
            *px = self.blur_pixel(src, line.x as u32 + i as u32, y);
        }
        Ok(())
    }

    fn render_pixel(&self, src: &SourceView<'_>, x: u32, y: u32) -> Rgba8 {
        if self.kernel.len() <= 1 {
            return src.pixel(x, y);
        }
        self.blur_pixel(src, x, y)
    }
}

const Q16_ONE: u32 = 1 << 16;

/// Normalized 1D Gaussian weights in Q16, summing to exactly `1 << 16`.
///
/// Radii above [`GaussianBlurEffect::MAX_RADIUS`] and non-positive sigmas are rejected.
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> PixelFxResult<Vec<u32>> {
    if radius > GaussianBlurEffect::MAX_RADIUS {
        return Err(PixelFxError::validation(format!(
            "blur radius {radius} exceeds the maximum of {}",
            GaussianBlurEffect::MAX_RADIUS
        )));
    }
    if radius == 0 {
        return Ok(vec![Q16_ONE]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PixelFxError::validation("blur sigma must be > 0"));
    }

    let taps = radius
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| PixelFxError::validation("blur radius overflows the tap count"))?;
    let two_sigma_sq = 2.0 * f64::from(sigma).powi(2);
    let falloff: Vec<f64> = (0..taps)
        .map(|i| {
            let d = f64::from(i) - f64::from(radius);
            (-d * d / two_sigma_sq).exp()
        })
        .collect();
    let total: f64 = falloff.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(PixelFxError::render("gaussian kernel has no weight"));
    }

    let one = f64::from(Q16_ONE);
    let mut kernel: Vec<u32> = falloff
        .iter()
        .map(|w| ((w / total) * one).round().clamp(0.0, one) as u32)
        .collect();

    // Rounding drift lands on the centre tap so the taps sum to exactly one.
    let drift = i64::from(Q16_ONE) - kernel.iter().map(|&w| i64::from(w)).sum::<i64>();
    let centre = &mut kernel[radius as usize];
    *centre = (i64::from(*centre) + drift).clamp(0, i64::from(Q16_ONE)) as u32;

    Ok(kernel)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/blur.rs"]
mod tests;
