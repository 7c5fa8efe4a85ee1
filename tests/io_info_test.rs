mod common;

use std::fs;
use std::sync::Mutex;

use tempfile::TempDir;

use dwiflow::data::gradients::read_bvecs;
use dwiflow::{IoInfoArgs, IoInfoFlow, Workflow};

#[tokio::test]
async fn logs_total_number_of_unit_bvectors() {
    let tmp = TempDir::new().unwrap();
    let (fimg, fbval, fbvec) = common::write_small_25(tmp.path());

    let log_path = tmp.path().join("io_info.log");
    let log_file = fs::File::create(&log_path).unwrap();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);

    let mut flow = IoInfoFlow::new();
    flow.run(&IoInfoArgs {
        files: vec![fimg, fbval, fbvec],
        ..Default::default()
    })
    .await
    .unwrap();

    drop(guard);

    assert_eq!(flow.summary.unit_bvec_count, Some(25));
    assert_eq!(flow.summary.bval_count, Some(26));
    assert_eq!(flow.summary.b0_count, Some(1));
    assert_eq!(flow.summary.images.len(), 1);
    assert_eq!(flow.summary.images[0].shape, vec![4, 4, 4, 26]);

    let log = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert!(
        lines
            .iter()
            .any(|l| l.contains("Total number of unit bvectors 25")),
        "summary line missing from log:\n{}",
        log
    );
}

#[tokio::test]
async fn bvecs_only_run_still_logs_unit_count() {
    let tmp = TempDir::new().unwrap();
    let (_, _, fbvec) = common::write_small_25(tmp.path());

    let log_path = tmp.path().join("bvecs_only.log");
    let log_file = fs::File::create(&log_path).unwrap();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);

    let mut flow = IoInfoFlow::new();
    flow.run(&IoInfoArgs {
        files: vec![fbvec],
        ..Default::default()
    })
    .await
    .unwrap();

    drop(guard);

    // The unit-vector count does not depend on a paired bvals file.
    assert_eq!(flow.summary.unit_bvec_count, Some(25));
    assert_eq!(flow.summary.b0_count, None);
    assert_eq!(flow.summary.bval_count, None);

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(
        log.lines()
            .any(|l| l.contains("Total number of unit bvectors 25")),
        "summary line missing from log:\n{}",
        log
    );
}

#[tokio::test]
async fn custom_thresholds_change_the_counts() {
    let tmp = TempDir::new().unwrap();
    let (fimg, fbval, fbvec) = common::write_small_25(tmp.path());

    // A zero tolerance only admits directions whose parsed norm is exactly
    // 1.0; that count depends on how the fixture rounds its components, so
    // compute it from the file rather than hard-coding it.
    let bvecs = read_bvecs(&fbvec).unwrap();
    let exact_units = bvecs
        .iter()
        .filter(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt() == 1.0)
        .count();

    let mut flow = IoInfoFlow::new();
    flow.run(&IoInfoArgs {
        files: vec![fimg, fbval, fbvec],
        // Everything counts as a b0 now.
        b0_threshold: 2000.0,
        bvecs_tol: 0.0,
    })
    .await
    .unwrap();

    assert_eq!(flow.summary.b0_count, Some(26));
    assert_eq!(flow.summary.unit_bvec_count, Some(exact_units));
    assert!(
        exact_units < 25,
        "a zero tolerance should exclude most rounded directions"
    );
}

#[tokio::test]
async fn image_only_run_reports_no_gradient_counts() {
    let tmp = TempDir::new().unwrap();
    let (fimg, _, _) = common::write_small_25(tmp.path());

    let mut flow = IoInfoFlow::new();
    flow.run(&IoInfoArgs {
        files: vec![fimg],
        ..Default::default()
    })
    .await
    .unwrap();

    assert_eq!(flow.summary.images.len(), 1);
    assert_eq!(flow.summary.unit_bvec_count, None);
    assert_eq!(flow.summary.b0_count, None);
}

#[tokio::test]
async fn mismatched_gradient_files_are_an_error() {
    let tmp = TempDir::new().unwrap();
    let (_, fbval, _) = common::write_small_25(tmp.path());

    let fbvec = tmp.path().join("short.bvec");
    fs::write(&fbvec, "1 0\n0 1\n0 0\n").unwrap();

    let mut flow = IoInfoFlow::new();
    let err = flow
        .run(&IoInfoArgs {
            files: vec![fbval, fbvec],
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, dwiflow::FlowError::Gradient { .. }));
}
