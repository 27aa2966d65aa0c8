// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image decoding and tensor preparation.

use image::imageops::FilterType;
use krishi_config::model::{Normalization, TensorLayout};
use krishi_core::KrishiError;
use ndarray::Array4;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decodes `bytes`, converts to RGB, resizes to `size`×`size` and
/// normalises into a single-image batch tensor.
pub fn preprocess(
    bytes: &[u8],
    size: u32,
    normalization: Normalization,
    layout: TensorLayout,
) -> Result<Array4<f32>, KrishiError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| KrishiError::InvalidImage(e.to_string()))?;
    let rgb = decoded
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();

    let s = size as usize;
    let shape = match layout {
        TensorLayout::Nchw => (1, 3, s, s),
        TensorLayout::Nhwc => (1, s, s, 3),
    };
    let mut tensor = Array4::<f32>::zeros(shape);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let v = normalize(pixel[c], c, normalization);
            match layout {
                TensorLayout::Nchw => tensor[[0, c, y, x]] = v,
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = v,
            }
        }
    }
    Ok(tensor)
}

fn normalize(value: u8, channel: usize, scheme: Normalization) -> f32 {
    let v = f32::from(value);
    match scheme {
        Normalization::Imagenet => (v / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel],
        Normalization::UnitScale => v / 255.0,
        Normalization::Mobilenet => v / 127.5 - 1.0,
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.iter().map(|e| e / sum).collect()
    } else {
        exps
    }
}
