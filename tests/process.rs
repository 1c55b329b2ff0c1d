use std::io::Cursor;
use std::path::Path;

use alpha_key::{AlphaKeyFilter, ImageCodec, ImageSource, PngCodec, ThresholdConfig};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

fn write_png(path: &Path, img: &RgbaImage) {
    std::fs::write(path, PngCodec::new().encode(img).unwrap()).unwrap();
}

fn half_black(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, _| {
        if x < w / 2 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([200, 30, 90, 255])
        }
    })
}

#[test]
fn process_file_writes_keyed_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("shirt.png");
    let output = dir.path().join("out").join("shirt_keyed.png");
    write_png(&input, &half_black(4, 2));

    let result = AlphaKeyFilter::default().process_file(&input, &output);

    assert!(result.success, "{}", result.message);
    assert_eq!(result.keyed_pixels, 4);
    assert_eq!(result.total_pixels, 8);
    assert_eq!(result.output.as_deref(), Some(output.as_path()));

    let written = image::open(&output).unwrap().to_rgba8();
    assert_eq!(written.get_pixel(0, 0)[3], 0);
    assert_eq!(written.get_pixel(3, 1), &Rgba([200, 30, 90, 255]));
}

#[test]
fn process_file_reports_decode_failure_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    let output = dir.path().join("broken_keyed.png");
    std::fs::write(&input, b"\x89PNG\r\n\x1a\n truncated").unwrap();

    let result = AlphaKeyFilter::default().process_file(&input, &output);

    assert!(!result.success);
    assert!(result.message.contains("decode"), "{}", result.message);
    assert!(!output.exists());
}

#[test]
fn process_file_refuses_non_png_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.png");
    let output = dir.path().join("a.jpg");
    write_png(&input, &half_black(2, 2));

    let result = AlphaKeyFilter::default().process_file(&input, &output);

    assert!(!result.success);
    assert!(!output.exists());
}

#[test]
fn process_directory_keys_every_supported_file() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    std::fs::create_dir(&input_dir).unwrap();
    write_png(&input_dir.join("a.png"), &half_black(2, 2));
    write_png(&input_dir.join("b.v2.png"), &half_black(6, 3));
    std::fs::write(input_dir.join("notes.txt"), "skip me").unwrap();

    let filter = AlphaKeyFilter::new(ThresholdConfig::new(1).unwrap());
    let results = filter.process_directory(&input_dir, &output_dir);

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.success));
    assert!(output_dir.join("a.png").exists());
    assert!(output_dir.join("b.v2.png").exists());
    assert!(!output_dir.join("notes.png").exists());
}

#[test]
fn process_directory_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let results = AlphaKeyFilter::default()
        .process_directory(&dir.path().join("missing"), &dir.path().join("out"));

    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
}

#[test]
fn path_source_reads_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mug.png");
    write_png(&input, &half_black(2, 1));

    let png = AlphaKeyFilter::default()
        .apply_source(&ImageSource::Path(&input))
        .unwrap();

    let out = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(out.get_pixel(0, 0)[3], 0);
    assert_eq!(out.get_pixel(1, 0)[3], 255);
}

#[test]
fn process_directory_never_reports_two_successes_for_one_output() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    std::fs::create_dir(&input_dir).unwrap();

    for i in 0..20u32 {
        write_png(&input_dir.join(format!("p{i}.png")), &half_black(4, 2));

        let mut jpeg = Vec::new();
        DynamicImage::ImageRgba8(half_black(16, 8))
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();
        std::fs::write(input_dir.join(format!("p{i}.jpg")), jpeg).unwrap();
    }

    let results = AlphaKeyFilter::default().process_directory(&input_dir, &output_dir);

    assert_eq!(results.len(), 40);
    let succeeded: Vec<_> = results.iter().filter(|r| r.success).collect();
    assert_eq!(succeeded.len(), 20);

    // Sorted order puts `pN.jpg` first, so it owns `pN.png` in the output.
    for r in &succeeded {
        assert_eq!(r.path.extension().unwrap(), "jpg");
        let written = image::open(r.output.as_ref().unwrap()).unwrap();
        assert_eq!((written.width(), written.height()), (16, 8));
    }
    for r in results.iter().filter(|r| !r.success) {
        assert_eq!(r.path.extension().unwrap(), "png");
        assert!(r.output.is_none());
        assert!(r.message.contains("clashes"), "{}", r.message);
    }
}
