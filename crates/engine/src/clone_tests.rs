// SPDX-License-Identifier: MIT

use super::*;
use cirun_container::fake::FakeContainerEngine;

#[test]
fn script_skips_lfs_skip_flag_when_lfs_enabled() {
    let effective = EffectiveCloneSettings {
        depth: CloneDepth::N(50),
        lfs: true,
        enabled: true,
    };
    let script = build_clone_script(&effective, "main", "deadbeef");
    assert!(!script.contains("GIT_LFS_SKIP_SMUDGE"));
    assert!(script.contains("--depth 50"));
}

#[test]
fn script_sets_lfs_skip_flag_when_lfs_disabled() {
    let effective = EffectiveCloneSettings {
        depth: CloneDepth::N(50),
        lfs: false,
        enabled: true,
    };
    let script = build_clone_script(&effective, "main", "deadbeef");
    assert!(script.contains("GIT_LFS_SKIP_SMUDGE=1 git clone"));
}

#[test]
fn script_omits_depth_flag_for_full_clone() {
    let effective = EffectiveCloneSettings {
        depth: CloneDepth::Full,
        lfs: false,
        enabled: true,
    };
    let script = build_clone_script(&effective, "main", "deadbeef");
    assert!(!script.contains("--depth"));
}

#[test]
fn script_resets_to_the_requested_commit() {
    let effective = EffectiveCloneSettings::default();
    let script = build_clone_script(&effective, "main", "deadbeef");
    assert!(script.contains("git reset --hard 'deadbeef'"));
    assert!(script.contains(".bitbucket/pipelines/generated"));
}

#[tokio::test]
async fn clone_is_skipped_when_disabled() {
    let engine = FakeContainerEngine::new();
    let effective = EffectiveCloneSettings {
        enabled: false,
        ..EffectiveCloneSettings::default()
    };
    clone(&engine, &effective, "main", "deadbeef", "build", "/host/repo", "ws-volume")
        .await
        .expect("skip");
    assert!(engine.pulled_images().is_empty());
}

#[tokio::test]
async fn clone_runs_script_on_a_side_container_sharing_the_build_network() {
    let engine = FakeContainerEngine::new();
    engine.set_exit_code(0);
    let effective = EffectiveCloneSettings::default();
    clone(&engine, &effective, "main", "deadbeef", "build", "/host/repo", "ws-volume")
        .await
        .expect("clone");

    assert_eq!(engine.pulled_images(), vec!["alpine/git".to_string()]);
    let calls = engine.exec_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].cmd.last().unwrap().contains("git clone"));
}

#[tokio::test]
async fn clone_fails_when_the_script_exits_nonzero() {
    let engine = FakeContainerEngine::new();
    engine.set_exit_code(1);
    let effective = EffectiveCloneSettings::default();
    let result = clone(&engine, &effective, "main", "deadbeef", "build", "/host/repo", "ws-volume").await;
    assert!(matches!(result, Err(EngineError::Repository(_))));
}
