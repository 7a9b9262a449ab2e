//! Image file I/O
//!
//! Everything is normalized to 8-bit RGB on load. Output format follows the
//! file extension.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::config::AugmentConfig;
use crate::error::{AugError, Result};
use crate::geometry::BoundingBox;

/// Image files directly inside `dir`, in directory listing order
///
/// The order is whatever the filesystem returns and is not sorted.
pub fn list_images(dir: &Path, config: &AugmentConfig) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| AugError::FileRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && config.is_image(&path) {
            images.push(path);
        }
    }
    Ok(images)
}

/// Label file path for `image` inside `labels_dir`
pub fn label_path_for(image: &Path, labels_dir: &Path) -> PathBuf {
    let mut name = image.file_stem().unwrap_or_default().to_os_string();
    name.push(".txt");
    labels_dir.join(name)
}

/// Load an image as 8-bit RGB
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(AugError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let image = image::open(path).map_err(|e| AugError::ImageDecode {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(DynamicImage::ImageRgb8(image.into_rgb8()))
}

/// Save an image in the format implied by the extension of `path`
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .to_rgb8()
        .save(path)
        .map_err(|e| AugError::ImageEncode {
            path: path.to_path_buf(),
            source: e,
        })
}

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_THICKNESS: i32 = 2;

/// Copy of `image` with every box outlined
pub fn draw_boxes(image: &DynamicImage, boxes: &[BoundingBox]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let (w, h) = (canvas.width() as f64, canvas.height() as f64);

    for bbox in boxes {
        let (x_min, y_min, x_max, y_max) = bbox.corners();
        let x = (x_min * w).round() as i32;
        let y = (y_min * h).round() as i32;
        let width = ((x_max - x_min) * w).round().max(1.0) as u32;
        let height = ((y_max - y_min) * h).round().max(1.0) as u32;

        // Thicker outlines grow inward so edge boxes stay on the canvas
        for offset in 0..BOX_THICKNESS {
            let inset = offset as u32 * 2;
            if width <= inset || height <= inset {
                break;
            }
            let rect = Rect::at(x + offset, y + offset).of_size(width - inset, height - inset);
            draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_images_filters_extensions() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.JPG", "c.txt", "d.jpeg", "e.gif"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let mut names: Vec<String> = list_images(dir.path(), &AugmentConfig::default())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.png", "b.JPG", "d.jpeg"]);
    }

    #[test]
    fn test_label_path_for() {
        assert_eq!(
            label_path_for(Path::new("/data/images/img_1.png"), Path::new("/data/labels")),
            PathBuf::from("/data/labels/img_1.txt")
        );
        assert_eq!(
            label_path_for(Path::new("shots/cat.photo.jpg"), Path::new("labels")),
            PathBuf::from("labels/cat.photo.txt")
        );
    }

    #[test]
    fn test_save_and_load_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("square.png");
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([10, 20, 30])));
        save_image(&image, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.as_bytes(), image.as_bytes());
    }

    #[test]
    fn test_load_undecodable_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();
        assert_eq!(load_image(&path).unwrap_err().error_code(), "IMAGE_DECODE");
    }

    #[test]
    fn test_draw_boxes_outlines() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(20, 20));
        let canvas = draw_boxes(&image, &[BoundingBox::new(0, 0.5, 0.5, 0.5, 0.5)]);
        assert_eq!(*canvas.get_pixel(5, 10), BOX_COLOR);
        assert_eq!(*canvas.get_pixel(10, 10), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_boxes_thickness_at_canvas_edge() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(20, 20));
        let canvas = draw_boxes(&image, &[BoundingBox::new(0, 0.25, 0.5, 0.5, 0.5)]);
        for x in [0, 1, 8, 9] {
            assert_eq!(*canvas.get_pixel(x, 10), BOX_COLOR, "x = {}", x);
        }
        assert_eq!(*canvas.get_pixel(2, 10), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(5, 10), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(15, 10), Rgb([0, 0, 0]));
    }
}
