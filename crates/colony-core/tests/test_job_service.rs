mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use colony_core::error::ColonyError;
use colony_core::frame::SourceKind;
use colony_core::jobs::{JobMetadata, JobRegistry, JobRequest, JobService, JobStatus};
use colony_core::pipeline::{AnalysisConfig, Predictor};

use common::{ConstantPredictor, FailingPredictor, SlowPredictor};

fn service(predictor: Arc<dyn Predictor>, root: &std::path::Path) -> JobService {
    JobService::new(Arc::new(JobRegistry::new()), predictor, root)
}

fn request(job_id: &str, n_frames: usize) -> JobRequest {
    JobRequest {
        job_id: job_id.into(),
        sequence: common::sequence_from_frames(common::identical_frames(n_frames, 24, 24), None),
        config: AnalysisConfig {
            min_area: 0,
            ..AnalysisConfig::default()
        },
    }
}

#[test]
fn test_submit_and_complete() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    let handle = svc.submit(request("job-1", 6)).unwrap();
    assert_eq!(handle.job_id, "job-1");
    let result = handle.join().unwrap();

    let status = svc.status("job-1").unwrap();
    assert_eq!(status.status, JobStatus::Completed);
    assert_eq!(status.progress, 100.0);
    assert!(status.error.is_none());

    let stored = svc.results("job-1").unwrap();
    assert_eq!(stored, result);
    assert_eq!(stored.n_frames, 2);
    assert!(stored.video.as_ref().unwrap().starts_with(svc.job_dir("job-1")));
    assert!(stored.metrics_csv.as_ref().unwrap().exists());
    assert!(stored.frames[0].pred.as_ref().unwrap().exists());
    assert!(stored.frames[0].gt.is_none());

    let job = svc.job("job-1").unwrap();
    assert_eq!(job.metadata.source_kind, SourceKind::Dataset);
    assert_eq!(job.metadata.filename, "synthetic");
}

#[test]
fn test_unknown_job() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    assert!(matches!(svc.status("ghost"), Err(ColonyError::JobNotFound(_))));
    assert!(matches!(svc.results("ghost"), Err(ColonyError::JobNotFound(_))));
    assert!(matches!(svc.delete("ghost"), Err(ColonyError::JobNotFound(_))));
}

#[test]
fn test_too_few_frames_rejected_before_registration() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    let err = svc.submit(request("short", 3)).err().unwrap();
    assert!(matches!(err, ColonyError::TooFewFrames { required: 5, actual: 3 }));
    assert!(svc.registry().is_empty());
    assert!(!svc.job_dir("short").exists());
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    let mut req = request("cfg", 6);
    req.config.window_size = 2;
    assert!(matches!(svc.submit(req), Err(ColonyError::InvalidConfig(_))));
    assert!(svc.list().is_empty());
}

#[test]
fn test_failed_job_results() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(FailingPredictor), dir.path());
    let handle = svc.submit(request("doomed", 5)).unwrap();
    assert!(handle.join().is_err());

    let status = svc.status("doomed").unwrap();
    assert_eq!(status.status, JobStatus::Failed);
    assert!(status.error.as_deref().unwrap().contains("model exploded"));
    match svc.results("doomed") {
        Err(ColonyError::JobFailed { job_id, error }) => {
            assert_eq!(job_id, "doomed");
            assert!(error.contains("model exploded"));
        }
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[test]
fn test_queued_job_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    svc.registry()
        .create(
            "waiting",
            JobMetadata {
                source_kind: SourceKind::Video,
                filename: "plate.ser".into(),
            },
        )
        .unwrap();
    assert!(matches!(
        svc.results("waiting"),
        Err(ColonyError::JobNotReady {
            status: JobStatus::Queued,
            ..
        })
    ));
}

#[test]
fn test_duplicate_job_id_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    svc.submit(request("dup", 5)).unwrap().join().unwrap();
    assert!(matches!(
        svc.submit(request("dup", 5)),
        Err(ColonyError::JobExists(_))
    ));
}

#[test]
fn test_delete_removes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    svc.submit(request("gone", 5)).unwrap().join().unwrap();
    assert!(svc.job_dir("gone").exists());

    svc.delete("gone").unwrap();
    assert!(!svc.job_dir("gone").exists());
    assert!(matches!(svc.status("gone"), Err(ColonyError::JobNotFound(_))));
}

#[test]
fn test_concurrent_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    let handles: Vec<_> = (0..3)
        .map(|i| svc.submit(request(&format!("par-{i}"), 5 + i)).unwrap())
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let jobs = svc.list();
    assert_eq!(jobs.len(), 3);
    for (i, job) in jobs.iter().enumerate() {
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.as_ref().unwrap().n_frames, 1 + i);
    }
}

#[test]
fn test_delete_right_after_submit_leaves_no_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(ConstantPredictor(1.0)), dir.path());
    for i in 0..20 {
        let job_id = format!("quick-{i}");
        let handle = svc.submit(request(&job_id, 6)).unwrap();
        svc.delete(&job_id).unwrap();
        let _ = handle.join();

        assert!(!svc.job_dir(&job_id).exists(), "{job_id} left artifacts behind");
        assert!(matches!(svc.status(&job_id), Err(ColonyError::JobNotFound(_))));
    }
    assert!(svc.list().is_empty());
}

#[test]
fn test_delete_running_job_cancels_worker() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(Arc::new(SlowPredictor(Duration::from_millis(20))), dir.path());
    let mut req = request("inflight", 30);
    req.config.parallel = false;
    req.config.progress_chunk = Some(1);
    let handle = svc.submit(req).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let status = svc.status("inflight").unwrap();
        assert_ne!(status.status, JobStatus::Completed, "job finished before it could be deleted");
        if status.status == JobStatus::Running && status.progress > 10.0 {
            break;
        }
        assert!(Instant::now() < deadline, "job never started");
        std::thread::sleep(Duration::from_millis(5));
    }

    svc.delete("inflight").unwrap();
    let outcome = handle.join();
    assert!(matches!(outcome, Err(ColonyError::Cancelled(ref id)) if id == "inflight"));
    assert!(!svc.job_dir("inflight").exists());
    assert!(matches!(svc.status("inflight"), Err(ColonyError::JobNotFound(_))));
}
