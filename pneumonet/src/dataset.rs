//! Labeled chest X-ray dataset for batch evaluation.
//!
//! Samples come from a CSV manifest with `image` and `label` columns; image
//! filenames are resolved relative to the image directory. Preprocessing
//! matches the transform used at training time: resize to a fixed square
//! resolution, convert to RGB float, and normalize with the ImageNet
//! per-channel statistics.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use burn::{
    data::dataloader::batcher::Batcher,
    tensor::{backend::Backend, Tensor, TensorData},
};
use image::{imageops::FilterType, DynamicImage};
use serde::Deserialize;

use crate::error::{PneumoNetError, PneumoNetResult};

/// Per-channel normalization mean (ImageNet statistics, same as training).
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel normalization standard deviation.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// A single manifest entry: an image filename and its ground-truth label.
///
/// Immutable once read from the manifest. Label 0 is "Normal",
/// label 1 is "Pneumonia".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Image filename, resolved relative to the dataset image directory.
    pub filename: String,
    /// Ground-truth binary label (0 or 1).
    pub label: u8,
}

#[derive(Debug, Deserialize)]
struct ManifestRow {
    image: String,
    label: i64,
}

/// Load the manifest CSV into an ordered collection of samples.
///
/// Every row must carry a non-empty `image` and a `label` of 0 or 1; a
/// malformed row aborts the load with a dataset error (no best-effort
/// skipping). An empty manifest is rejected: metrics over zero samples are
/// undefined.
pub fn load_manifest(path: &Path) -> PneumoNetResult<Vec<Sample>> {
    let file = std::fs::File::open(path).map_err(|e| PneumoNetError::Dataset {
        message: format!("failed to open manifest {}: {e}", path.display()),
    })?;
    let samples = load_manifest_from_reader(file)?;
    println!("Loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Load a manifest from any reader. See [`load_manifest`] for the contract.
pub fn load_manifest_from_reader<R: Read>(reader: R) -> PneumoNetResult<Vec<Sample>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for required in ["image", "label"] {
        if !headers.iter().any(|h| h == required) {
            return Err(PneumoNetError::Dataset {
                message: format!("manifest is missing the required `{required}` column"),
            });
        }
    }

    let mut samples = Vec::new();
    for (index, row) in csv_reader.deserialize::<ManifestRow>().enumerate() {
        // Manifest rows are 1-based for the user, plus the header line.
        let line = index + 2;
        let row = row.map_err(|e| PneumoNetError::Dataset {
            message: format!("malformed manifest row at line {line}: {e}"),
        })?;

        if row.image.is_empty() {
            return Err(PneumoNetError::Dataset {
                message: format!("empty image filename at line {line}"),
            });
        }
        let label = match row.label {
            0 => 0,
            1 => 1,
            other => {
                return Err(PneumoNetError::Dataset {
                    message: format!("label must be 0 or 1, got {other} at line {line}"),
                })
            }
        };

        samples.push(Sample {
            filename: row.image,
            label,
        });
    }

    if samples.is_empty() {
        return Err(PneumoNetError::Dataset {
            message: "manifest contains no rows; metrics over an empty sample set are undefined"
                .to_owned(),
        });
    }

    Ok(samples)
}

/// Preprocess a decoded image into a normalized `[3, size, size]` tensor.
///
/// Resizes with Lanczos3 when the dimensions differ, converts to RGB float
/// in `[0, 1]`, permutes HWC to CHW, and applies ImageNet normalization.
pub fn preprocess_image<B: Backend>(
    img: DynamicImage,
    image_size: u32,
    device: &B::Device,
) -> Tensor<B, 3> {
    let img = if img.width() != image_size || img.height() != image_size {
        img.resize_exact(image_size, image_size, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.into_rgb32f();
    let (width, height) = rgb.dimensions();
    let data = TensorData::new(rgb.into_raw(), [height as usize, width as usize, 3]);
    let tensor = Tensor::<B, 3>::from_data(data.convert::<B::FloatElem>(), device);
    // HWC to CHW
    let tensor = tensor.permute([2, 0, 1]);

    normalize_tensor(tensor, device)
}

fn normalize_tensor<B: Backend>(tensor: Tensor<B, 3>, device: &B::Device) -> Tensor<B, 3> {
    let mean = Tensor::<B, 1>::from_data(TensorData::new(IMAGENET_MEAN.to_vec(), [3]), device);
    let std = Tensor::<B, 1>::from_data(TensorData::new(IMAGENET_STD.to_vec(), [3]), device);

    // Reshape for broadcasting: [3, 1, 1]
    let mean = mean.reshape([3, 1, 1]);
    let std = std.reshape([3, 1, 1]);

    (tensor - mean) / std
}

/// A single preprocessed evaluation item.
#[derive(Debug, Clone)]
pub struct XrayItem<B: Backend> {
    /// Normalized image tensor with shape [3, H, W].
    pub image: Tensor<B, 3>,
    /// Ground-truth binary label.
    pub label: u8,
    /// Manifest filename, carried through to the predictions report.
    pub filename: String,
}

/// A batch of evaluation items.
#[derive(Debug, Clone)]
pub struct XrayBatch<B: Backend> {
    /// Batched image tensor with shape [N, 3, H, W].
    pub images: Tensor<B, 4>,
    /// Ground-truth labels, one per batch row.
    pub labels: Vec<u8>,
    /// Filenames, one per batch row, in batch order.
    pub filenames: Vec<String>,
}

/// Batcher converting vectors of [`XrayItem`] into an [`XrayBatch`].
#[derive(Clone, Default)]
pub struct XrayBatcher<B: Backend> {
    _phantom: std::marker::PhantomData<B>,
}

impl<B: Backend> XrayBatcher<B> {
    /// Create a new batcher.
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B: Backend> Batcher<B, XrayItem<B>, XrayBatch<B>> for XrayBatcher<B> {
    fn batch(&self, items: Vec<XrayItem<B>>, _device: &B::Device) -> XrayBatch<B> {
        let batch_size = items.len();

        let mut images = Vec::with_capacity(batch_size);
        let mut labels = Vec::with_capacity(batch_size);
        let mut filenames = Vec::with_capacity(batch_size);

        for item in items {
            images.push(item.image);
            labels.push(item.label);
            filenames.push(item.filename);
        }

        // Stack along the batch dimension to create a [N, C, H, W] tensor.
        let images = Tensor::stack(images, 0);

        XrayBatch {
            images,
            labels,
            filenames,
        }
    }
}

/// Chest X-ray evaluation dataset.
///
/// Holds the manifest samples and preprocesses images on demand. Loading a
/// sample is fallible by design: a missing or undecodable image aborts the
/// evaluation run instead of being silently skipped.
pub struct XrayDataset<B: Backend> {
    samples: Vec<Sample>,
    image_dir: PathBuf,
    image_size: u32,
    device: B::Device,
}

impl<B: Backend> XrayDataset<B> {
    /// Create a dataset from an image directory and a manifest CSV.
    ///
    /// Validates that both paths exist before reading anything; missing
    /// paths are configuration errors with a remediation hint.
    pub fn new(
        image_dir: &Path,
        manifest_path: &Path,
        image_size: u32,
        device: &B::Device,
    ) -> PneumoNetResult<Self> {
        if !image_dir.is_dir() {
            return Err(PneumoNetError::Config {
                message: format!("image directory not found: {}", image_dir.display()),
                hint: "pass the directory that holds the evaluation X-ray images".to_owned(),
            });
        }
        if !manifest_path.is_file() {
            return Err(PneumoNetError::Config {
                message: format!("manifest CSV not found: {}", manifest_path.display()),
                hint: "pass a CSV with `image` and `label` columns".to_owned(),
            });
        }

        let samples = load_manifest(manifest_path)?;

        Ok(Self {
            samples,
            image_dir: image_dir.to_path_buf(),
            image_size,
            device: device.clone(),
        })
    }

    /// Number of samples in manifest order.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset is empty. Construction rejects empty manifests,
    /// so this is false for any successfully built dataset.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The manifest samples, in manifest order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Decode and preprocess the sample at `index`.
    pub fn load(&self, index: usize) -> PneumoNetResult<XrayItem<B>> {
        let sample = self
            .samples
            .get(index)
            .ok_or_else(|| PneumoNetError::Dataset {
                message: format!("sample index {index} out of range"),
            })?;

        let path = self.image_dir.join(&sample.filename);
        let img = image::open(&path).map_err(|e| PneumoNetError::Dataset {
            message: format!("failed to decode image {}: {e}", path.display()),
        })?;

        let image = preprocess_image(img, self.image_size, &self.device);

        Ok(XrayItem {
            image,
            label: sample.label,
            filename: sample.filename.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::ElementConversion;

    type TestBackend = NdArray<f32>;

    #[test]
    fn manifest_parses_rows_in_order() {
        let csv = "image,label\na.jpg,1\nb.jpg,0\nc.jpg,1\n";
        let samples = load_manifest_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].filename, "a.jpg");
        assert_eq!(samples[0].label, 1);
        assert_eq!(samples[1].filename, "b.jpg");
        assert_eq!(samples[1].label, 0);
        assert_eq!(samples[2].filename, "c.jpg");
    }

    #[test]
    fn manifest_rejects_empty() {
        let csv = "image,label\n";
        let err = load_manifest_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn manifest_rejects_bad_label() {
        let csv = "image,label\na.jpg,2\n";
        let err = load_manifest_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("label must be 0 or 1"));
    }

    #[test]
    fn manifest_rejects_malformed_row() {
        let csv = "image,label\na.jpg,not-a-number\n";
        assert!(load_manifest_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn manifest_rejects_missing_column() {
        let csv = "image,severity\na.jpg,1\n";
        let err = load_manifest_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("label"));
    }

    #[test]
    fn manifest_rejects_empty_filename() {
        let csv = "image,label\n,1\n";
        assert!(load_manifest_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn preprocess_resizes_and_normalizes() {
        let device = Default::default();

        // Uniform mid-gray image: every RGB channel is 128/255.
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            64,
            48,
            image::Rgb([128, 128, 128]),
        ));
        let tensor = preprocess_image::<TestBackend>(img, 32, &device);
        assert_eq!(tensor.dims(), [3, 32, 32]);

        // Channel 0 should hold (128/255 - mean[0]) / std[0] everywhere.
        let expected = (128.0 / 255.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        let value = tensor
            .slice([0..1, 0..1, 0..1])
            .into_scalar()
            .elem::<f32>();
        assert!((value - expected).abs() < 1e-3);
    }

    #[test]
    fn batcher_stacks_items() {
        let device = Default::default();
        let batcher = XrayBatcher::<TestBackend>::new();

        let items = vec![
            XrayItem {
                image: Tensor::<TestBackend, 3>::zeros([3, 16, 16], &device),
                label: 1,
                filename: "a.jpg".to_owned(),
            },
            XrayItem {
                image: Tensor::<TestBackend, 3>::ones([3, 16, 16], &device),
                label: 0,
                filename: "b.jpg".to_owned(),
            },
        ];

        let batch = batcher.batch(items, &device);
        assert_eq!(batch.images.dims(), [2, 3, 16, 16]);
        assert_eq!(batch.labels, vec![1, 0]);
        assert_eq!(batch.filenames, vec!["a.jpg", "b.jpg"]);
    }
}
