use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma};

use colony_core::error::ColonyError;
use colony_core::frame::SourceKind;
use colony_core::io::dataset::{MASKS_DIR, RAW_IMAGES_DIR};
use colony_core::io::image_io::{load_gray, load_mask};
use colony_core::io::load_sequence;

fn write_gray(path: &Path, w: u32, h: u32, f: impl Fn(u32, u32) -> u8) {
    GrayImage::from_fn(w, h, |x, y| Luma([f(x, y)])).save(path).unwrap();
}

fn write_gray16(path: &Path, w: u32, h: u32, f: impl Fn(u32, u32) -> u16) {
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(w, h, |x, y| Luma([f(x, y)]));
    img.save(path).unwrap();
}

#[test]
fn test_dataset_with_ground_truth() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join(RAW_IMAGES_DIR);
    let masks = dir.path().join(MASKS_DIR);
    std::fs::create_dir_all(&raw).unwrap();
    std::fs::create_dir_all(&masks).unwrap();

    // Written out of order; loading sorts by name.
    for i in [2u8, 0, 1] {
        write_gray(&raw.join(format!("t{i:03}.png")), 8, 6, |x, _| x as u8 * 10 + i);
        write_gray(&masks.join(format!("t{i:03}.png")), 8, 6, |x, _| u8::from(x < 2 + i as u32));
    }
    std::fs::write(raw.join("notes.txt"), "ignored").unwrap();

    let sequence = load_sequence(dir.path()).unwrap();
    assert_eq!(sequence.len(), 3);
    assert_eq!(sequence.source.kind, SourceKind::Dataset);
    assert_eq!(sequence.source.ground_truth_frames, 3);
    assert_eq!((sequence.source.width, sequence.source.height), (8, 6));
    for (i, frame) in sequence.frames.iter().enumerate() {
        assert_eq!(frame.metadata.frame_index, i);
        approx::assert_abs_diff_eq!(frame.data[[0, 0]], 0.0, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(frame.data[[0, 7]], 1.0, epsilon = 1e-6);
    }

    let gt = sequence.ground_truth.unwrap();
    for (i, mask) in gt.iter().enumerate() {
        assert_eq!(mask.iter().filter(|&&v| v).count(), (2 + i) * 6);
    }
}

#[test]
fn test_flat_directory_without_masks() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..4u8 {
        write_gray(&dir.path().join(format!("{i}.png")), 5, 5, |x, y| (x + y) as u8 + i);
    }
    let sequence = load_sequence(dir.path()).unwrap();
    assert_eq!(sequence.len(), 4);
    assert!(sequence.ground_truth.is_none());
    assert_eq!(sequence.source_name(), dir.path().file_name().unwrap().to_string_lossy());
}

#[test]
fn test_mismatched_frame_sizes_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_gray(&dir.path().join("a.png"), 5, 5, |x, _| x as u8);
    write_gray(&dir.path().join("b.png"), 6, 5, |x, _| x as u8);
    assert!(matches!(
        load_sequence(dir.path()),
        Err(ColonyError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_empty_directory_rejected() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_sequence(dir.path()),
        Err(ColonyError::EmptySequence)
    ));
}

#[test]
fn test_sixteen_bit_mask_cut_at_half_max() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.png");
    write_gray16(&path, 4, 1, |x, _| [0, 1000, 1001, 2000][x as usize]);
    let mask = load_mask(&path).unwrap();
    assert_eq!(mask.as_slice().unwrap(), &[false, false, true, true]);
}

#[test]
fn test_sixteen_bit_gray_keeps_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    write_gray16(&path, 2, 1, |x, _| if x == 0 { 300 } else { 40_000 });
    let data = load_gray(&path).unwrap();
    assert_eq!(data[[0, 0]], 300.0);
    assert_eq!(data[[0, 1]], 40_000.0);
}

#[test]
fn test_missing_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_sequence(&dir.path().join("nope.ser")),
        Err(ColonyError::Io(_))
    ));
}

#[test]
fn test_unsupported_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movie.mp4");
    std::fs::write(&path, b"not a video").unwrap();
    assert!(matches!(
        load_sequence(&path),
        Err(ColonyError::UnsupportedInput(_))
    ));
}
