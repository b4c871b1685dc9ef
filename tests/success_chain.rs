//! Test: a full release sequence where every step succeeds

mod common;

use common::*;
use relgate::core::RunStatus;

const RELEASE_YAML: &str = r#"
name: "Full Release"

variables:
  wheel_dir: "dist"

registries:
  production:
    index: "https://upload.example.org/legacy/"
    container: "registry.example.org/acme"
  test:
    index: "https://test.upload.example.org/legacy/"
    container: "registry.test.example.org/acme"

stages:
  - id: "package"
    name: "Build package"
    steps:
      - id: "build_wheel"
        run: "python -m build --outdir {{ wheel_dir }}"
      - id: "checksum"
        run: "sha256sum {{ wheel_dir }}/*.whl"

  - id: "publish"
    name: "Upload artifacts"
    only: ["release", "rc"]
    steps:
      - id: "upload"
        run: "twine upload --repository-url {{ registry.index }} {{ wheel_dir }}/*.whl"
      - id: "image"
        run: "docker build -t {{ registry.container }}/tool:{{ version }} ."
      - id: "push"
        run: "docker push {{ registry.container }}/tool:{{ version }}"
"#;

#[tokio::test]
async fn test_all_steps_run_in_declared_order() {
    let mut release = release_from_yaml(RELEASE_YAML, "rc", "1.0rc1");
    let runner = MockRunner::new();

    run_release(&mut release, runner.clone(), host_vars(&[]))
        .await
        .unwrap();

    assert_eq!(release.state.status, RunStatus::Completed);
    assert_eq!(release.state.completed_steps, 5);
    assert_eq!(release.state.failed_steps, 0);
    assert_eq!(release.state.skipped_steps, 0);

    let executed = runner.executed();
    assert_eq!(executed.len(), 5);
    assert!(executed[0].starts_with("python -m build"));
    assert!(executed[1].starts_with("sha256sum"));
    assert!(executed[2].starts_with("twine upload"));
    assert!(executed[3].starts_with("docker build"));
    assert!(executed[4].starts_with("docker push"));
}

#[tokio::test]
async fn test_rc_build_targets_production_registries() {
    let mut release = release_from_yaml(RELEASE_YAML, "rc", "1.0rc1");
    let runner = MockRunner::new();

    run_release(&mut release, runner.clone(), host_vars(&[]))
        .await
        .unwrap();

    let executed = runner.executed();
    assert!(executed
        .iter()
        .any(|c| c.contains("https://upload.example.org/legacy/")));
    assert!(executed
        .iter()
        .any(|c| c.contains("registry.example.org/acme/tool:1.0rc1")));
}

#[tokio::test]
async fn test_dev_build_skips_publish_and_targets_nothing() {
    let mut release = release_from_yaml(RELEASE_YAML, "dev", "1.0a1");
    let runner = MockRunner::new();

    run_release(&mut release, runner.clone(), host_vars(&[]))
        .await
        .unwrap();

    assert_eq!(release.state.status, RunStatus::Completed);
    assert_eq!(release.state.completed_steps, 2);
    assert_eq!(release.state.skipped_steps, 3);

    assert_step_completed(&release, "build_wheel");
    assert_step_completed(&release, "checksum");
    assert_step_skipped(&release, "upload", "not selected for build type 'dev'");
    assert_step_skipped(&release, "push", "not selected for build type 'dev'");

    let executed = runner.executed();
    assert_eq!(executed.len(), 2);
    assert!(!executed.iter().any(|c| c.contains("twine")));
}

#[tokio::test]
async fn test_progress_reaches_one_when_all_terminal() {
    let mut release = release_from_yaml(RELEASE_YAML, "dev", "1.0a1");
    let runner = MockRunner::new();

    run_release(&mut release, runner, host_vars(&[]))
        .await
        .unwrap();

    assert_eq!(release.state.progress(), 1.0);
}
