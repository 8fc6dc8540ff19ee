//! Cross-check the hand-written BMP encoder against the `image` crate's decoder.

use retouch::bitmap::Bitmap;
use retouch::imaging::{ExportFormat, Quality, encode};

fn decode(bytes: &[u8]) -> image::RgbImage {
    let format = image::guess_format(bytes).unwrap();
    assert_eq!(format, image::ImageFormat::Bmp);
    image::load_from_memory_with_format(bytes, image::ImageFormat::Bmp)
        .unwrap()
        .to_rgb8()
}

fn rgb(bitmap: &Bitmap) -> Vec<u8> {
    bitmap
        .pixels()
        .chunks(4)
        .flat_map(|p| [p[0], p[1], p[2]])
        .collect()
}

#[test]
fn two_by_two_decodes_top_down() {
    let src = Bitmap::from_rgba(
        2,
        2,
        vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ],
    )
    .unwrap();
    let bytes = encode(&src, ExportFormat::Bmp, Quality::default()).unwrap();
    let decoded = decode(&bytes);

    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0]);
    assert_eq!(decoded.get_pixel(1, 0).0, [0, 255, 0]);
    assert_eq!(decoded.get_pixel(0, 1).0, [0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 1).0, [255, 255, 255]);
}

#[test]
fn padded_widths_decode_exactly() {
    for width in 1..=9 {
        let src = Bitmap::from_fn(width, 3, |x, y| [x as u8 * 25, y as u8 * 80, 7, 255]).unwrap();
        let bytes = encode(&src, ExportFormat::Bmp, Quality::default()).unwrap();
        let decoded = decode(&bytes);
        assert_eq!(decoded.dimensions(), (width, 3));
        assert_eq!(decoded.as_raw(), &rgb(&src), "width {width}");
    }
}

#[test]
fn alpha_is_dropped() {
    let src = Bitmap::filled(3, 1, [10, 20, 30, 0]).unwrap();
    let bytes = encode(&src, ExportFormat::Bmp, Quality::default()).unwrap();
    assert_eq!(decode(&bytes).as_raw(), &vec![10, 20, 30, 10, 20, 30, 10, 20, 30]);
}
