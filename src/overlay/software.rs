//! CPU reference rasterizer for the overlay fragment rules.
//!
//! Implements exactly the quad construction, depth discard, circular
//! sprite mask, gamma, and alpha blending of
//! `assets/shaders/segment_overlay.wgsl`, writing into a dense f32 RGBA
//! buffer. It exists so the shader contract can be validated headlessly
//! (no GPU context) and backs the deterministic-capture tests.
//!
//! Coordinate conventions match the GPU path: projected endpoints live
//! in "scaled NDC" (NDC multiplied by the raster size, so one pixel
//! spans two units) and rows are ordered bottom-up in the output
//! buffer.

use glam::{Mat4, Vec2, Vec3};

use super::pass::{SegmentDraw, SegmentSink};
use crate::projection::ProjectionContext;

/// Software implementation of the segment-draw contract.
pub struct SoftwareRasterizer {
    size: (u32, u32),
    view_proj: Mat4,
    gamma: f32,
    pixels: Vec<f32>,
}

impl SoftwareRasterizer {
    /// New rasterizer over a buffer filled with `clear` (RGBA).
    #[must_use]
    pub fn new(
        projection: &ProjectionContext,
        gamma: f32,
        clear: [f32; 4],
    ) -> Self {
        let (w, h) = projection.raster_size;
        let mut pixels = Vec::with_capacity(w as usize * h as usize * 4);
        for _ in 0..(w as usize * h as usize) {
            pixels.extend_from_slice(&clear);
        }
        Self {
            size: projection.raster_size,
            view_proj: projection.view_proj,
            gamma,
            pixels,
        }
    }

    /// Raster size `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// The RGBA pixel at `(x, y)`, with `y` counted from the bottom row.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let idx = (y as usize * self.size.0 as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Consume the rasterizer, returning the row-major bottom-up RGBA
    /// buffer.
    #[must_use]
    pub fn into_pixels(self) -> Vec<f32> {
        self.pixels
    }

    /// Project a world point to (scaled-NDC xy, clip z before divide).
    fn project(&self, world: Vec3) -> (Vec2, f32) {
        let h = self.view_proj * world.extend(1.0);
        let size = Vec2::new(self.size.0 as f32, self.size.1 as f32);
        (Vec2::new(h.x, h.y) / h.w * size, h.z)
    }

    /// Scaled-NDC coordinates of the center of pixel `(x, y)`.
    fn pixel_center(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            2.0 * (x as f32 + 0.5) - self.size.0 as f32,
            2.0 * (y as f32 + 0.5) - self.size.1 as f32,
        )
    }

    /// Pixel-index bounds covering the scaled-NDC rect `[min, max]`.
    fn pixel_bounds(&self, min: Vec2, max: Vec2) -> (u32, u32, u32, u32) {
        // Conservative bounds: the per-pixel inside test governs, so
        // overshooting by one pixel on either side is harmless.
        let to_x = |s: f32| (s + self.size.0 as f32) * 0.5 - 0.5;
        let to_y = |s: f32| (s + self.size.1 as f32) * 0.5 - 0.5;
        let x0 = to_x(min.x).floor().max(0.0) as u32;
        let y0 = to_y(min.y).floor().max(0.0) as u32;
        let x1 = (to_x(max.x).ceil() as i64)
            .clamp(0, i64::from(self.size.0) - 1);
        let y1 = (to_y(max.y).ceil() as i64)
            .clamp(0, i64::from(self.size.1) - 1);
        (x0, y0, x1 as u32, y1 as u32)
    }

    fn blend(&mut self, x: u32, y: u32, rgb: [f32; 3], alpha: f32) {
        let idx = (y as usize * self.size.0 as usize + x as usize) * 4;
        let inv = 1.0 - alpha;
        self.pixels[idx] = rgb[0] * alpha + self.pixels[idx] * inv;
        self.pixels[idx + 1] = rgb[1] * alpha + self.pixels[idx + 1] * inv;
        self.pixels[idx + 2] = rgb[2] * alpha + self.pixels[idx + 2] * inv;
        self.pixels[idx + 3] = alpha + self.pixels[idx + 3] * inv;
    }

    fn shade(&self, color: [f32; 3]) -> [f32; 3] {
        [
            color[0].powf(self.gamma),
            color[1].powf(self.gamma),
            color[2].powf(self.gamma),
        ]
    }

    fn fill_sprite(&mut self, p: Vec2, segment: &SegmentDraw) {
        let half = segment.width * 0.5;
        let rgb = self.shade(segment.color);
        let (x0, y0, x1, y1) = self.pixel_bounds(
            p - Vec2::splat(half),
            p + Vec2::splat(half),
        );
        for y in y0..=y1 {
            for x in x0..=x1 {
                let u = (self.pixel_center(x, y) - p) / segment.width;
                if u.x.abs() > 0.5 || u.y.abs() > 0.5 {
                    continue;
                }
                let alpha = if !segment.rect && u.length() > 0.5 {
                    0.0
                } else {
                    1.0
                };
                if alpha > 0.0 {
                    self.blend(x, y, rgb, alpha);
                }
            }
        }
    }

    fn fill_quad(&mut self, p: Vec2, t: Vec2, segment: &SegmentDraw) {
        let len = p.distance(t);
        let dir = (t - p) / len;
        let half = segment.width * 0.5;
        let rgb = self.shade(segment.color);

        // Bounding box from the four rotated corners.
        let perp = Vec2::new(-dir.y, dir.x) * half;
        let corners =
            [p + perp, p - perp, t + perp, t - perp];
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }

        let (x0, y0, x1, y1) = self.pixel_bounds(min, max);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = self.pixel_center(x, y) - p;
                // Rotate into quad-local space: x along the segment,
                // y across it.
                let v = Vec2::new(
                    dir.x * d.x + dir.y * d.y,
                    -dir.y * d.x + dir.x * d.y,
                );
                if v.x < 0.0 || v.x > len || v.y.abs() > half {
                    continue;
                }
                let alpha = if segment.rect {
                    1.0
                } else {
                    let coord =
                        Vec2::new(v.x / len - 0.5, v.y / segment.width);
                    if coord.length() > 0.5 {
                        0.0
                    } else {
                        1.0
                    }
                };
                if alpha > 0.0 {
                    self.blend(x, y, rgb, alpha);
                }
            }
        }
    }
}

impl SegmentSink for SoftwareRasterizer {
    fn draw_segment(&mut self, segment: &SegmentDraw) {
        let (p, z_start) = self.project(segment.start);
        let (t, z_end) = self.project(segment.end);
        if !p.is_finite() || !t.is_finite() {
            return;
        }
        // The depth varying is flat (min of both endpoints), so the
        // behind-camera discard rejects the whole primitive at once.
        if z_start.min(z_end) < 0.0 {
            return;
        }
        if p == t {
            self.fill_sprite(p, segment);
        } else {
            self.fill_quad(p, t, segment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    fn identity_ctx(size: (u32, u32)) -> ProjectionContext {
        ProjectionContext {
            raster_size: size,
            view_proj: Mat4::IDENTITY,
        }
    }

    #[test]
    fn behind_camera_segment_is_fully_discarded() {
        let mut raster =
            SoftwareRasterizer::new(&identity_ctx((8, 8)), 1.0, CLEAR);
        // Identity projection: clip z equals world z, so a point behind
        // the view plane has negative depth.
        raster.draw_segment(&SegmentDraw::sprite(
            Vec3::new(0.0, 0.0, -1.0),
            [1.0, 1.0, 1.0],
            8.0,
        ));
        for pixel in raster.into_pixels().chunks_exact(4) {
            assert_eq!(pixel, CLEAR);
        }
    }

    #[test]
    fn one_behind_camera_endpoint_discards_the_link() {
        let mut raster =
            SoftwareRasterizer::new(&identity_ctx((8, 8)), 1.0, CLEAR);
        raster.draw_segment(&SegmentDraw::link(
            Vec3::new(-0.5, 0.0, 0.5),
            Vec3::new(0.5, 0.0, -0.5),
            [1.0, 1.0, 1.0],
            4.0,
        ));
        for pixel in raster.into_pixels().chunks_exact(4) {
            assert_eq!(pixel, CLEAR);
        }
    }

    #[test]
    fn sprite_applies_the_circular_mask() {
        let mut raster =
            SoftwareRasterizer::new(&identity_ctx((16, 16)), 1.0, CLEAR);
        // Width 10 around the origin covers pixels 5..=10 on each axis;
        // the quad corners sit at normalized distance sqrt(0.5) > 0.5.
        raster.draw_segment(&SegmentDraw::sprite(
            Vec3::ZERO,
            [1.0, 0.0, 0.0],
            10.0,
        ));
        // Center of the sprite is filled.
        assert_eq!(raster.pixel(7, 7), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(raster.pixel(8, 8), [1.0, 0.0, 0.0, 1.0]);
        // Quad corners fall outside the unit circle and stay clear.
        assert_eq!(raster.pixel(5, 5), CLEAR);
        assert_eq!(raster.pixel(10, 10), CLEAR);
    }

    #[test]
    fn link_quads_never_apply_the_circular_mask() {
        // A degenerate-thickness rectangle along x: corners of the quad
        // are inside, including where a circular mask would reject.
        let mut raster =
            SoftwareRasterizer::new(&identity_ctx((16, 16)), 1.0, CLEAR);
        raster.draw_segment(&SegmentDraw::link(
            Vec3::new(-5.0 / 16.0, 0.0, 0.1),
            Vec3::new(5.0 / 16.0, 0.0, 0.1),
            [0.0, 1.0, 0.0],
            10.0,
        ));
        // End-of-quad corner pixel: normalized coord length > 0.5, but
        // rect quads are fully opaque.
        assert_eq!(raster.pixel(5, 5), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(raster.pixel(10, 10), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn gamma_shapes_output_color() {
        let ctx = identity_ctx((4, 4));
        let mut live = SoftwareRasterizer::new(&ctx, 2.2, CLEAR);
        live.draw_segment(&SegmentDraw::sprite(
            Vec3::ZERO,
            [0.5, 0.5, 0.5],
            8.0,
        ));
        let shaded = live.pixel(1, 1)[0];
        assert!((shaded - 0.5f32.powf(2.2)).abs() < 1e-6);

        let mut capture = SoftwareRasterizer::new(&ctx, 1.0, CLEAR);
        capture.draw_segment(&SegmentDraw::sprite(
            Vec3::ZERO,
            [0.5, 0.5, 0.5],
            8.0,
        ));
        assert_eq!(capture.pixel(1, 1)[0], 0.5);
    }

    #[test]
    fn later_draws_blend_over_earlier_ones() {
        let mut raster =
            SoftwareRasterizer::new(&identity_ctx((8, 8)), 1.0, CLEAR);
        raster.draw_segment(&SegmentDraw::sprite(
            Vec3::ZERO,
            [1.0, 0.0, 0.0],
            6.0,
        ));
        raster.draw_segment(&SegmentDraw::sprite(
            Vec3::ZERO,
            [0.0, 0.0, 1.0],
            4.0,
        ));
        // The smaller, later sprite owns the center.
        assert_eq!(raster.pixel(4, 4), [0.0, 0.0, 1.0, 1.0]);
    }
}
