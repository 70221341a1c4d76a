//! A 2 x 3 batch written as a zip reads back with every mockup, in
//! graphic-major order.

#![allow(clippy::unwrap_used)]

use std::io::{Cursor, Read};

use teemock_export::{ArchiveLayout, archive_entries, encode_png, write_zip};
use teemock_pipeline::{
    BatchOptions, MockupSettings, PlacementProfiles, RgbImage, Source, batch,
};

fn garment(id: &str, shade: u8) -> Source {
    let img = RgbImage::from_fn(80, 80, |x, y| {
        if (16..64).contains(&x) && (10..70).contains(&y) {
            image::Rgb([shade, shade, shade])
        } else {
            image::Rgb([255, 255, 255])
        }
    });
    Source::new(id, encode_png(&img).unwrap())
}

fn graphic(id: &str, rgb: [u8; 3]) -> Source {
    Source::new(id, encode_png(&RgbImage::from_pixel(20, 14, image::Rgb(rgb))).unwrap())
}

fn report() -> batch::BatchReport {
    batch::run(
        &[
            graphic("sun", [250, 180, 20]).with_label("Sunrise"),
            graphic("wave", [20, 90, 220]),
        ],
        &[
            garment("plain_white", 210),
            garment("model_front", 90),
            garment("plain_black", 40),
        ],
        &PlacementProfiles::default(),
        &MockupSettings::default(),
        &BatchOptions { threads: Some(2) },
    )
    .unwrap()
}

#[test]
fn flat_zip_lists_six_names_in_order() {
    let report = report();
    assert!(report.failures.is_empty());

    let entries = archive_entries(&report.results, ArchiveLayout::Flat).unwrap();
    let cursor = write_zip(&entries, Cursor::new(Vec::new())).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();

    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "Sunrise_plain_white_tee.png",
            "Sunrise_model_front_tee.png",
            "Sunrise_plain_black_tee.png",
            "wave_plain_white_tee.png",
            "wave_model_front_tee.png",
            "wave_plain_black_tee.png",
        ]
    );

    let mut bytes = Vec::new();
    archive.by_index(4).unwrap().read_to_end(&mut bytes).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(decoded, report.results[4].image);
}

#[test]
fn zip_per_graphic_nests_three_mockups_each() {
    let report = report();
    let entries = archive_entries(&report.results, ArchiveLayout::ZipPerGraphic).unwrap();
    let outer_bytes = write_zip(&entries, Cursor::new(Vec::new()))
        .unwrap()
        .into_inner();
    let mut outer = zip::ZipArchive::new(Cursor::new(outer_bytes)).unwrap();
    assert_eq!(outer.len(), 2);

    let mut inner_bytes = Vec::new();
    let mut first = outer.by_index(0).unwrap();
    assert_eq!(first.name(), "Sunrise.zip");
    first.read_to_end(&mut inner_bytes).unwrap();
    drop(first);
    assert_eq!(outer.by_index(1).unwrap().name(), "wave.zip");

    let mut inner = zip::ZipArchive::new(Cursor::new(inner_bytes)).unwrap();
    let names: Vec<String> = (0..inner.len())
        .map(|i| inner.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "Sunrise_plain_white_tee.png",
            "Sunrise_model_front_tee.png",
            "Sunrise_plain_black_tee.png",
        ]
    );
}
