use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use iconprep::codec::RasterCodec;
use iconprep::config::Config;
use iconprep::diff::{build_check_plan, Status};
use iconprep::icon::{IconPreparer, PrepareOptions};
use iconprep::lockfile::Lockfile;

fn setup(dir: &Path) -> Config {
    let mut img = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 0]));
    for y in 8..40 {
        for x in 16..48 {
            img.put_pixel(x, y, Rgba([0, 200, 0, 255]));
        }
    }
    img.save(dir.join("src.png")).unwrap();
    Config::new(PathBuf::from("src.png"), "app".into())
}

fn prepare(dir: &Path, config: &Config) -> Lockfile {
    let source = config.source_path(dir);
    let (_, record) = IconPreparer::new(RasterCodec, PrepareOptions::default())
        .prepare(&source, &config.output_dir(dir), &config.source.name)
        .unwrap();
    Lockfile::from_record(&source, &record, dir).unwrap()
}

#[test]
fn fresh_outputs_are_up_to_date() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let lockfile = prepare(dir.path(), &config);

    let plan = build_check_plan(&config, &lockfile, dir.path()).unwrap();
    assert!(plan.is_up_to_date(), "{}", plan.summary());
    assert!(plan.warnings.is_empty());
    assert_eq!(plan.icons.len(), 4);
}

#[test]
fn no_lockfile_is_untracked() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let plan = build_check_plan(&config, &Lockfile::default(), dir.path()).unwrap();
    assert!(!plan.is_up_to_date());
    assert_eq!(plan.source, Status::Untracked);
    assert!(plan.icons.iter().all(|i| i.status == Status::Missing));
}

#[test]
fn deleted_icon_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let lockfile = prepare(dir.path(), &config);
    std::fs::remove_file(dir.path().join("app_icon_48.png")).unwrap();

    let plan = build_check_plan(&config, &lockfile, dir.path()).unwrap();
    assert!(!plan.is_up_to_date());
    let icon = plan.icons.iter().find(|i| i.size == 48).unwrap();
    assert_eq!(icon.status, Status::Missing);
    assert_eq!(plan.source, Status::UpToDate);
}

#[test]
fn edited_source_is_changed() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let lockfile = prepare(dir.path(), &config);

    let mut img = image::open(dir.path().join("src.png")).unwrap().into_rgba8();
    img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
    img.save(dir.path().join("src.png")).unwrap();

    let plan = build_check_plan(&config, &lockfile, dir.path()).unwrap();
    assert!(matches!(plan.source, Status::Changed { .. }));
    assert!(plan.icons.iter().all(|i| i.status == Status::UpToDate));
}

#[test]
fn replaced_icon_with_wrong_size_is_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let mut lockfile = prepare(dir.path(), &config);

    // Swap in a 20x20 image and record its hash, as if the lockfile were edited by hand.
    let icon = dir.path().join("app_icon_16.png");
    RgbaImage::from_pixel(20, 20, Rgba([1, 1, 1, 255]))
        .save(&icon)
        .unwrap();
    let entry = lockfile.icons.iter_mut().find(|l| l.size == 16).unwrap();
    entry.hash = iconprep::lockfile::hash_file(&icon).unwrap();

    let plan = build_check_plan(&config, &lockfile, dir.path()).unwrap();
    let status = &plan.icons.iter().find(|i| i.size == 16).unwrap().status;
    assert_eq!(
        status,
        &Status::WrongDimensions {
            width: 20,
            height: 20
        }
    );
}

#[test]
fn unknown_sizes_in_lockfile_warn() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let mut lockfile = prepare(dir.path(), &config);
    lockfile.icons.push(iconprep::lockfile::IconLock {
        size: 32,
        path: PathBuf::from("app_icon_32.png"),
        hash: "x".into(),
    });

    let plan = build_check_plan(&config, &lockfile, dir.path()).unwrap();
    assert_eq!(plan.warnings.len(), 1);
    assert!(plan.warnings[0].contains("32"));
    assert!(plan.is_up_to_date());
}

#[test]
fn dot_prefixed_source_path_does_not_warn() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    let config = Config::new(PathBuf::from("./src.png"), "app".into());
    let lockfile = prepare(dir.path(), &config);
    assert_eq!(lockfile.source, PathBuf::from("src.png"));

    let plan = build_check_plan(&config, &lockfile, dir.path()).unwrap();
    assert!(plan.warnings.is_empty(), "{:?}", plan.warnings);
    assert!(plan.is_up_to_date());
}

#[test]
fn moved_source_warns() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let mut lockfile = prepare(dir.path(), &config);
    lockfile.source = PathBuf::from("old/src.png");

    let plan = build_check_plan(&config, &lockfile, dir.path()).unwrap();
    assert_eq!(plan.warnings.len(), 1);
    assert!(plan.warnings[0].contains("old/src.png"));
}
