use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

/// Working width every image is scaled down to before scoring.
pub const FLOOF_TARGET_WIDTH: u32 = 256;

/// Produces the bounded working copy the scorer runs on.
///
/// Images narrower than [`FLOOF_TARGET_WIDTH`] keep their width, wider ones
/// are scaled down with the aspect ratio preserved. An empty source yields a
/// 1x1 transparent placeholder, which always scores zero.
pub fn resize_for_floof(src: &DynamicImage) -> RgbaImage {
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return RgbaImage::new(1, 1);
    }

    let target_width = width.min(FLOOF_TARGET_WIDTH).max(1);
    let aspect = height as f64 / width as f64;
    let target_height = (target_width as f64 * aspect).round().max(1.0) as u32;

    imageops::resize(&src.to_rgba8(), target_width, target_height, FilterType::Triangle)
}
