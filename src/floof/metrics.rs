use image::RgbaImage;

pub const FUR_BRIGHTNESS_THRESHOLD: f64 = 0.55;
pub const FUR_SATURATION_THRESHOLD: f64 = 0.25;
pub const TEXTURE_NORMALIZATION_RANGE: f64 = 0.2;
pub const TEXTURE_EDGE_THRESHOLD: f64 = 0.005;

pub const FUR_AREA_WEIGHT: f64 = 0.15;
pub const FUR_TEXTURE_WEIGHT: f64 = 0.2;
pub const FUR_COVERAGE_WEIGHT: f64 = 0.65;

/// Intermediate signals of a Floof Majesty evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloofMetrics {
    pub total_pixels: usize,
    pub fur_pixels: usize,
    /// Right/below neighbour pairs where both pixels are fur.
    pub gradient_pairs: usize,
    /// Pairs whose luma difference reaches [`TEXTURE_EDGE_THRESHOLD`].
    pub active_edges: usize,
    pub fur_fraction: f64,
    pub texture_score: f64,
    pub texture_coverage: f64,
}

impl FloofMetrics {
    /// Weighted combination of the three signals, clamped to `[0, 1]`.
    pub fn majesty(&self) -> f64 {
        if self.fur_pixels == 0 {
            return 0.0;
        }

        let combined = self.fur_fraction * FUR_AREA_WEIGHT
            + self.texture_score * FUR_TEXTURE_WEIGHT
            + self.texture_coverage * FUR_COVERAGE_WEIGHT;
        combined.clamp(0.0, 1.0)
    }
}

struct FurMask {
    width: usize,
    fur: Vec<bool>,
    luma: Vec<f64>,
    fur_pixels: usize,
}

// Channels are read alpha-premultiplied so transparent areas behave as black.
fn classify(img: &RgbaImage) -> FurMask {
    let (fur, luma): (Vec<bool>, Vec<f64>) = img
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            let alpha = a as f64 / 255.0;
            let rf = r as f64 / 255.0 * alpha;
            let gf = g as f64 / 255.0 * alpha;
            let bf = b as f64 / 255.0 * alpha;

            let maxv = rf.max(gf).max(bf);
            let minv = rf.min(gf).min(bf);
            let brightness = maxv;
            let saturation = if maxv > 0.0 { (maxv - minv) / maxv } else { 0.0 };

            let is_fur = brightness >= FUR_BRIGHTNESS_THRESHOLD
                && saturation <= FUR_SATURATION_THRESHOLD;
            (is_fur, 0.299 * rf + 0.587 * gf + 0.114 * bf)
        })
        .unzip();

    let fur_pixels = fur.iter().filter(|&&is_fur| is_fur).count();

    FurMask {
        width: img.width() as usize,
        fur,
        luma,
        fur_pixels,
    }
}

/// Runs the classifier and the texture analyser over a normalized image.
pub fn calculate_floof_metrics(img: &RgbaImage) -> FloofMetrics {
    let total_pixels = img.width() as usize * img.height() as usize;
    if total_pixels == 0 {
        return FloofMetrics::default();
    }

    let mask = classify(img);
    if mask.fur_pixels == 0 {
        return FloofMetrics {
            total_pixels,
            ..FloofMetrics::default()
        };
    }

    let width = mask.width;
    let fur = &mask.fur;
    let luma = &mask.luma;

    // Each pixel only looks right and down, so every pair is visited once.
    let (gradient_sum, gradient_pairs, active_edges) = (0..total_pixels)
        .filter(|&idx| fur[idx])
        .flat_map(move |idx| {
            let right = (idx % width + 1 < width).then_some(idx + 1);
            let below = (idx + width < total_pixels).then_some(idx + width);
            right
                .into_iter()
                .chain(below)
                .filter(move |&neighbour| fur[neighbour])
                .map(move |neighbour| (luma[idx] - luma[neighbour]).abs())
        })
        .fold((0.0, 0usize, 0usize), |(sum, pairs, active), diff| {
            let active = if diff >= TEXTURE_EDGE_THRESHOLD { active + 1 } else { active };
            (sum + diff, pairs + 1, active)
        });

    let texture_score = if gradient_pairs > 0 {
        let avg_diff = gradient_sum / gradient_pairs as f64;
        (avg_diff / TEXTURE_NORMALIZATION_RANGE).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let texture_coverage =
        (active_edges as f64 / (2 * mask.fur_pixels) as f64).clamp(0.0, 1.0);

    FloofMetrics {
        total_pixels,
        fur_pixels: mask.fur_pixels,
        gradient_pairs,
        active_edges,
        fur_fraction: mask.fur_pixels as f64 / total_pixels as f64,
        texture_score,
        texture_coverage,
    }
}

pub fn calculate_floof_majesty(img: &RgbaImage) -> f64 {
    calculate_floof_metrics(img).majesty()
}
