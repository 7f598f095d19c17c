use std::path::Path;

use anyhow::Context;
use image::imageops::FilterType;
use image::DynamicImage;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::NdTensor;
use tracing::debug;

use super::BuildingClassifier;

/// Image classifier backed by an `rten` model
///
/// Input is a `[1, size, size, 3]` tensor of raw 0-255 values in BGR order, the
/// layout the campus classifier was trained with. Output is `[1, num_labels]`.
pub struct RtenClassifier {
    model: Model,
    input_size: u32,
}

impl RtenClassifier {
    pub fn load(path: &Path, input_size: u32) -> anyhow::Result<Self> {
        let model = Model::load_file(path)
            .with_context(|| format!("Failed to load classifier model {}", path.display()))?;
        Ok(Self { model, input_size })
    }

    fn prepare_input(&self, image: &DynamicImage) -> NdTensor<f32, 4> {
        let size = self.input_size;
        let resized = image.resize_exact(size, size, FilterType::Triangle).to_rgb8();

        let mut data = Vec::with_capacity((size * size * 3) as usize);
        for pixel in resized.pixels() {
            let [r, g, b] = pixel.0;
            data.extend([b as f32, g as f32, r as f32]);
        }

        NdTensor::from_data([1, size as usize, size as usize, 3], data)
    }
}

impl BuildingClassifier for RtenClassifier {
    fn classify(&self, image: &DynamicImage) -> anyhow::Result<usize> {
        let input = self.prepare_input(image);
        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow::anyhow!("Classifier inference failed: {}", e))?;
        let scores: NdTensor<f32, 2> = output
            .try_into()
            .map_err(|_| anyhow::anyhow!("Classifier output is not a rank-2 float tensor"))?;

        let [_, num_labels] = scores.shape();
        let best = argmax((0..num_labels).map(|i| scores[[0, i]]))
            .ok_or_else(|| anyhow::anyhow!("Classifier produced no scores"))?;
        debug!("Classifier picked index {} of {}", best, num_labels);

        Ok(best)
    }
}

/// Index of the largest value; the first one wins ties
pub fn argmax(values: impl IntoIterator<Item = f32>) -> Option<usize> {
    values
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
