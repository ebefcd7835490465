// SPDX-License-Identifier: MIT

use super::*;
use cirun_spec::CloneDepth;

fn settings(depth: Option<u32>, lfs: Option<bool>, enabled: Option<bool>) -> CloneSettings {
    CloneSettings {
        depth: depth.map(CloneDepth::N),
        lfs,
        enabled,
    }
}

#[test]
fn step_setting_wins_over_pipeline_and_default() {
    let step = settings(Some(5), None, None);
    let pipeline = EffectiveCloneSettings {
        depth: CloneDepth::N(20),
        lfs: true,
        enabled: true,
    };
    let resolved = resolve_clone_settings(Some(&step), Some(&pipeline), EffectiveCloneSettings::default());
    assert_eq!(resolved.depth, CloneDepth::N(5));
    assert!(resolved.lfs);
}

#[test]
fn pipeline_setting_wins_when_step_is_silent() {
    let pipeline = EffectiveCloneSettings {
        depth: CloneDepth::Full,
        lfs: true,
        enabled: false,
    };
    let resolved = resolve_clone_settings(None, Some(&pipeline), EffectiveCloneSettings::default());
    assert_eq!(resolved.depth, CloneDepth::Full);
    assert!(!resolved.enabled);
}

#[test]
fn falls_back_to_default_when_nothing_set() {
    let resolved = resolve_clone_settings(None, None, EffectiveCloneSettings::default());
    assert_eq!(resolved, EffectiveCloneSettings::default());
}

#[test]
fn pipeline_result_ok_iff_exit_code_zero() {
    let result = PipelineResult {
        exit_code: 0,
        build_number: 1,
        pipeline_uuid: PipelineUuid(uuid::Uuid::nil()),
    };
    assert!(result.ok());
    let failed = PipelineResult { exit_code: 2, ..result };
    assert!(!failed.ok());
}
