//! Dataset processing
//!
//! Layout on disk: an `images/` directory and a `labels/` directory holding
//! one YOLO `.txt` file per image with the same base name. An image without
//! a label file is a background sample.

mod io;
mod labels;
mod naming;
mod runner;
mod showcase;

pub use io::{draw_boxes, label_path_for, list_images, load_image, save_image};
pub use labels::{format_labels, parse_label_line, parse_labels, read_labels, write_labels};
pub use naming::{output_stem, OutputName, OutputNamer, TIMESTAMP_FORMAT};
pub use runner::{DatasetDirs, DatasetRunner, ProgressFn, RunHandle, RunReport};
pub use showcase::{showcase, ShowcaseEntry};
