//! Image + boxes containers

use image::{DynamicImage, GenericImageView};

use super::bbox::{BoundingBox, TrackedBox};
use crate::error::Result;

/// An axis-aligned pixel rectangle (crop window)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// An image with its boxes, as seen by callers of the pipeline
///
/// Box `i` carries its own class id, so `class_ids()[i]` always
/// corresponds to `boxes[i]`.
#[derive(Debug, Clone)]
pub struct Sample {
    pub image: DynamicImage,
    pub boxes: Vec<BoundingBox>,
}

impl Sample {
    pub fn new(image: DynamicImage, boxes: Vec<BoundingBox>) -> Self {
        Self { image, boxes }
    }

    /// A sample with no annotations (a background image)
    pub fn background(image: DynamicImage) -> Self {
        Self {
            image,
            boxes: Vec::new(),
        }
    }

    /// Class ids in box order
    pub fn class_ids(&self) -> Vec<u32> {
        self.boxes.iter().map(|b| b.class_id).collect()
    }

    /// Validate every box and convert to the in-flight representation
    pub fn to_frame(&self) -> Result<Frame> {
        for bbox in &self.boxes {
            bbox.validate()?;
        }
        Ok(Frame {
            image: self.image.clone(),
            boxes: self.boxes.iter().map(TrackedBox::from_bbox).collect(),
        })
    }
}

/// A sample in flight through the compositor
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: DynamicImage,
    pub boxes: Vec<TrackedBox>,
}

impl Frame {
    pub fn new(image: DynamicImage, boxes: Vec<TrackedBox>) -> Self {
        Self { image, boxes }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Crop image and boxes to `window`
    ///
    /// The window is clamped to the image bounds and is at least 1x1.
    pub fn crop(self, window: PixelRect) -> Frame {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return self;
        }
        let x = window.x.min(width.saturating_sub(1));
        let y = window.y.min(height.saturating_sub(1));
        let window = PixelRect::new(
            x,
            y,
            window.width.clamp(1, width - x),
            window.height.clamp(1, height - y),
        );

        let image = self
            .image
            .crop_imm(window.x, window.y, window.width, window.height);
        let boxes = self
            .boxes
            .into_iter()
            .map(|mut b| {
                b.reframe(window, width, height);
                b
            })
            .collect();

        Frame { image, boxes }
    }

    /// Drop boxes below the visibility threshold or without area
    ///
    /// Returns the number of boxes removed.
    pub fn retain_visible(&mut self, min_visibility: f64) -> usize {
        let before = self.boxes.len();
        self.boxes
            .retain(|b| b.area() > 0.0 && b.visibility >= min_visibility);
        before - self.boxes.len()
    }

    /// Leave the pipeline: back to center-format boxes
    pub fn into_sample(self) -> Sample {
        Sample {
            image: self.image,
            boxes: self.boxes.iter().map(TrackedBox::to_bbox).collect(),
        }
    }
}
