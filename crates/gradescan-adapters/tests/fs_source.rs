//! Filesystem adapter tests against real files in a temp directory.

#![allow(clippy::unwrap_used)]

use std::fs;

use gradescan_adapters::{load_image, save_image, CropWriter, FsPageSource};
use gradescan_core::{PageSource, Region};
use gradescan_test_support::{png_data_url, write_image, SyntheticImageBuilder};

#[test]
fn test_loads_supported_pages_in_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_image(temp_dir.path(), "b.jpg", &SyntheticImageBuilder::sharp_image());
    write_image(temp_dir.path(), "a.png", &SyntheticImageBuilder::blurry_image());
    fs::write(temp_dir.path().join("notes.txt"), "not a page").unwrap();

    let source = FsPageSource::new(vec![temp_dir.path().to_path_buf()], false);
    assert_eq!(source.count_hint(), Some(2));

    let pages: Vec<_> = source.pages().map(Result::unwrap).collect();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].path.ends_with("a.png"));
    assert_eq!(pages[0].data_url.mime(), "image/png");
    assert!(pages[1].path.ends_with("b.jpg"));
    assert_eq!(pages[1].data_url.mime(), "image/jpeg");

    let decoded = pages[0].data_url.decode().unwrap();
    assert_eq!((decoded.width(), decoded.height()), (128, 128));
}

#[test]
fn test_recursion_is_opt_in() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested = temp_dir.path().join("week2");
    fs::create_dir(&nested).unwrap();
    write_image(&nested, "page.png", &SyntheticImageBuilder::sharp_image());

    let flat = FsPageSource::new(vec![temp_dir.path().to_path_buf()], false);
    assert_eq!(flat.pages().count(), 0);

    let deep = FsPageSource::new(vec![temp_dir.path().to_path_buf()], true);
    assert_eq!(deep.pages().count(), 1);
}

#[test]
fn test_missing_and_unsupported_paths_are_ignored() {
    let temp_dir = tempfile::tempdir().unwrap();
    let notes = temp_dir.path().join("notes.txt");
    fs::write(&notes, "text").unwrap();

    let source = FsPageSource::new(vec![notes, temp_dir.path().join("gone.png")], false);
    assert_eq!(source.count_hint(), Some(0));
    assert_eq!(source.pages().count(), 0);
}

#[test]
fn test_undecodable_page_still_loads_as_bytes() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("broken.png"), b"garbage").unwrap();

    let source = FsPageSource::new(vec![temp_dir.path().to_path_buf()], false);
    let page = source.pages().next().unwrap().unwrap();
    assert_eq!(page.data_url.bytes(), b"garbage");
    assert!(page.data_url.decode().is_err());
}

#[test]
fn test_save_image_creates_parents() {
    let temp_dir = tempfile::tempdir().unwrap();
    let img = SyntheticImageBuilder::coordinate_rgb(40, 30);

    let png = temp_dir.path().join("out/deep/page.png");
    save_image(&img, &png).unwrap();
    let loaded = load_image(&png).unwrap();
    assert_eq!(loaded.to_rgb8(), img.to_rgb8());

    let jpg = temp_dir.path().join("out/page.jpg");
    save_image(&img.to_rgba8().into(), &jpg).unwrap();
    let loaded = load_image(&jpg).unwrap();
    assert_eq!((loaded.width(), loaded.height()), (40, 30));
}

#[test]
fn test_load_image_reports_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing.png");
    let err = load_image(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("missing.png"));
}

#[test]
fn test_crop_writer_names_files_by_region() {
    let temp_dir = tempfile::tempdir().unwrap();
    let writer = CropWriter::create(temp_dir.path().join("crops")).unwrap();

    let regions = vec![
        Region {
            id: "region-1".into(),
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        },
        Region {
            id: "student-2".into(),
            x: 5,
            y: 5,
            width: 20,
            height: 8,
        },
    ];
    let crops = vec![
        png_data_url(&SyntheticImageBuilder::uniform_gray(10, 10, 30)),
        png_data_url(&SyntheticImageBuilder::uniform_gray(20, 8, 200)),
    ];

    let files = writer.write_all(&regions, &crops).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("region-1.jpg"));
    assert!(files[1].ends_with("student-2.jpg"));
    assert_eq!(fs::read(&files[1]).unwrap(), crops[1].bytes());
    assert!(writer.dir().ends_with("crops"));
}
