use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use row_compactor::{CompactError, compact_rows, distinct_key_count};

const WIDTH: u32 = 24;

/// A synthetic "long screenshot": runs of blank rows broken by busy text-like rows.
fn screenshot(rng: &mut StdRng, height: u32) -> Vec<u8> {
    let mut buffer = Vec::with_capacity((WIDTH * height * 4) as usize);
    for _ in 0..height {
        let colors = rng.gen_range(1..=12u8);
        for x in 0..WIDTH {
            let shade = ((x as u8) % colors).wrapping_mul(21);
            buffer.extend_from_slice(&[shade, 255 - shade, shade / 2, rng.r#gen()]);
        }
    }
    buffer
}

fn rows(buffer: &[u8]) -> Vec<&[u8]> {
    buffer.chunks_exact((WIDTH * 4) as usize).collect()
}

#[test]
fn compaction_is_idempotent_for_identical_input() {
    let mut rng = StdRng::seed_from_u64(7);
    let buffer = screenshot(&mut rng, 64);
    let first = compact_rows(&buffer, WIDTH, 64, 5, 16).unwrap();
    let second = compact_rows(&buffer, WIDTH, 64, 5, 16).unwrap();
    assert_eq!(first, second);
}

#[test]
fn raising_threshold_never_grows_output() {
    let mut rng = StdRng::seed_from_u64(11);
    let buffer = screenshot(&mut rng, 80);
    let mut previous = u32::MAX;
    for threshold in 0..=15 {
        let height = compact_rows(&buffer, WIDTH, 80, threshold, 16).unwrap().height;
        assert!(height <= previous, "threshold {threshold} grew output to {height}");
        previous = height;
    }
}

#[test]
fn surviving_rows_keep_source_order_and_width() {
    let mut rng = StdRng::seed_from_u64(23);
    let buffer = screenshot(&mut rng, 50);
    let result = compact_rows(&buffer, WIDTH, 50, 4, 16).unwrap();
    assert_eq!(result.width, WIDTH);
    assert_eq!(result.pixels.len(), (result.height * WIDTH * 4) as usize);

    let expected: Vec<&[u8]> = rows(&buffer)
        .into_iter()
        .filter(|row| distinct_key_count(row, 16, 4) > 4)
        .collect();
    assert_eq!(rows(&result.pixels), expected);
}

#[test]
fn all_blank_image_compacts_to_zero_height() {
    let buffer: Vec<u8> = (0..WIDTH * 10).flat_map(|i| [250, 250, 250, (i % 255) as u8]).collect();
    let result = compact_rows(&buffer, WIDTH, 10, 3, 16).unwrap();
    assert_eq!(result.height, 0);
    assert_eq!(result.width, WIDTH);
    assert!(result.pixels.is_empty());
}

#[test]
fn all_content_image_is_returned_unchanged() {
    let buffer: Vec<u8> = (0..10u32)
        .flat_map(|_| (0..WIDTH).flat_map(|x| [(x * 10) as u8, 0, 0, 255]))
        .collect();
    let result = compact_rows(&buffer, WIDTH, 10, 3, 16).unwrap();
    assert_eq!(result.height, 10);
    assert_eq!(result.pixels, buffer);
}

#[test]
fn quantization_only_affects_classification() {
    // Shades 0..=15 share one bucket at factor 16 but are all distinct at factor 1.
    let buffer: Vec<u8> = (0..WIDTH).flat_map(|x| [(x % 16) as u8, 0, 0, 255]).collect();
    assert_eq!(compact_rows(&buffer, WIDTH, 1, 1, 16).unwrap().height, 0);
    let kept = compact_rows(&buffer, WIDTH, 1, 1, 1).unwrap();
    assert_eq!(kept.pixels, buffer);
}

#[test]
fn mismatched_buffer_is_rejected_up_front() {
    let buffer = vec![0u8; (WIDTH * 4 * 3 + 4) as usize];
    assert!(matches!(
        compact_rows(&buffer, WIDTH, 3, 1, 16),
        Err(CompactError::InvalidDimensions { .. })
    ));
}
