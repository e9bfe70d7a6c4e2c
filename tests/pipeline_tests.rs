//! Integration tests for pipeline construction and project scripts.
//!
//! These check the ordering properties every generated script must have,
//! independent of the exact stage list of a given option set.

use asl2c::backend::Backend;
use asl2c::core::Configuration;
use asl2c::pipeline::{script, Pipeline, PipelineBuilder, StageKind};

fn build(config: &Configuration) -> Pipeline {
    PipelineBuilder::new(config)
        .build()
        .unwrap_or_else(|e| panic!("pipeline for {config:?} failed: {e}"))
}

/// Option sets covering every optional stage and every code-generating backend.
fn option_matrix() -> Vec<Configuration> {
    let mut configs = Vec::new();
    for backend in [Backend::Ac, Backend::C23, Backend::Fallback, Backend::Mlir, Backend::Sc] {
        configs.push(Configuration {
            backend,
            ..Configuration::default()
        });
        configs.push(Configuration {
            backend,
            minimal: true,
            ..Configuration::default()
        });
        configs.push(Configuration {
            backend,
            instrument_unknown: true,
            wrap_variables: true,
            transform_int_slices: true,
            bounded_ints: true,
            split_thread_local: true,
            intermediates: Some("log".to_string()),
            ..Configuration::default()
        });
    }
    configs
}

#[test]
fn test_ordering_invariants() {
    for config in option_matrix() {
        let pipeline = build(&config);
        let stages = pipeline.without_snapshots();

        // exactly one code generation or final dump, directly before quit
        let finals: Vec<_> = stages
            .iter()
            .filter(|s| s.kind.is_codegen() || (s.kind == StageKind::Show && !s.is_snapshot()))
            .collect();
        assert_eq!(finals.len(), 1, "{config:?}");
        assert_eq!(stages.last().map(|s| s.kind), Some(StageKind::Quit));
        assert_eq!(&stages[stages.len() - 2], finals[0]);

        // reachability first
        assert_eq!(stages[0].kind, StageKind::FilterReachableFrom);

        // no lowering after code generation
        let codegen = stages.len() - 2;
        assert!(stages[codegen..].iter().all(|s| !s.kind.is_lowering()));

        // bounding is the last lowering pass
        if let Some(bounded) = pipeline.position(StageKind::XformBounded) {
            assert!(pipeline.stages()[bounded + 1..]
                .iter()
                .all(|s| !s.kind.is_lowering()));
        }
    }
}

#[test]
fn test_determinism() {
    for config in option_matrix() {
        assert_eq!(build(&config), build(&config));
        assert_eq!(
            build(&config).to_script(Some("asl2c")),
            build(&config).to_script(Some("asl2c"))
        );
    }
}

#[test]
fn test_script_round_trip() {
    for config in option_matrix() {
        let pipeline = build(&config);
        let text = pipeline.to_script(None);
        let parsed = script::parse(&text).unwrap();
        assert_eq!(parsed, pipeline.stages());
    }
}

#[test]
fn test_minimal_pipeline_is_shorter() {
    let full = build(&Configuration::default());
    let minimal = build(&Configuration {
        minimal: true,
        ..Configuration::default()
    });
    assert!(minimal.len() < full.len());
    assert_eq!(minimal.stages()[0], full.stages()[0]);
    assert!(minimal.position(StageKind::XformMonomorphize).is_none());
    assert!(minimal
        .codegen_stage()
        .unwrap()
        .has_arg("--num-c-files=1"));
}

#[test]
fn test_c23_split_output() {
    let config = Configuration {
        backend: Backend::C23,
        exports: vec!["Reset".to_string(), "Step".to_string()],
        num_c_files: 8,
        ..Configuration::default()
    };
    let pipeline = build(&config);

    let codegen: Vec<_> = pipeline.stages().iter().filter(|s| s.kind.is_codegen()).collect();
    assert_eq!(codegen.len(), 1);
    assert_eq!(codegen[0].kind, StageKind::GenerateC);
    assert!(codegen[0].has_arg("--runtime=c23"));
    assert!(codegen[0].has_arg("--num-c-files=8"));
    assert_eq!(pipeline.positions(StageKind::XformMonomorphize).len(), 2);
}

#[test]
fn test_snapshots_follow_each_stage() {
    let config = Configuration {
        intermediates: Some("trace/step".to_string()),
        ..Configuration::default()
    };
    let pipeline = build(&config);
    let plain = build(&Configuration::default());
    let stages = pipeline.stages();

    assert_eq!(pipeline.without_snapshots(), plain.stages());
    for (i, stage) in stages.iter().enumerate() {
        if stage.is_snapshot() {
            assert!(i > 0 && !stages[i - 1].is_snapshot());
            assert!(stage.args.iter().any(|a| a.starts_with("trace/step.")));
        }
    }
    assert_eq!(stages.last().map(|s| s.kind), Some(StageKind::Quit));
}

#[test]
fn test_show_final_asl_replaces_codegen() {
    let config = Configuration {
        show_final_asl: true,
        ..Configuration::default()
    };
    let pipeline = build(&config);
    assert!(pipeline.codegen_stage().is_none());
    let stages = pipeline.stages();
    assert_eq!(stages[stages.len() - 2].to_string(), ":show --format=raw");
}

#[test]
fn test_script_words_with_whitespace_are_rejected() {
    let spaced = Configuration {
        output_dir: "my out".to_string(),
        ..Configuration::default()
    };
    assert!(matches!(
        PipelineBuilder::new(&spaced).build(),
        Err(asl2c::core::DriverError::InvalidConfiguration { .. })
    ));
    assert!(PipelineBuilder::new(&Configuration::default())
        .output_dir("build dir")
        .build()
        .is_err());

    // single-word values survive the round trip unchanged
    let nested = Configuration {
        output_dir: "out/gen".to_string(),
        basename: "sim".to_string(),
        intermediates: Some("logs/step".to_string()),
        ..Configuration::default()
    };
    let pipeline = build(&nested);
    let parsed = script::parse(&pipeline.to_script(None)).unwrap();
    assert_eq!(parsed, pipeline.stages());
    assert!(pipeline.codegen_stage().unwrap().has_arg("--output-dir=out/gen"));
}
