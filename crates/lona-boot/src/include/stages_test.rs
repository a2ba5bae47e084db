// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the three inclusion stages, driven through a runtime.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use super::*;
use crate::platform::MockPlatform;
use crate::runtime::Runtime;
use crate::value::Namespace;

/// A runtime whose working directory is `/w`, with `files` mounted.
fn runtime(files: &[(&str, &str)]) -> Runtime<MockPlatform> {
    let mut platform = MockPlatform::new();
    platform.set_working_dir("/w");
    for (path, text) in files {
        platform.add_file(*path, text);
    }
    Runtime::new(platform)
}

/// Install every stage up to and including `stage`, defining placeholder
/// capabilities first.
fn advance(rt: &mut Runtime<MockPlatform>, stage: Stage) {
    for name in Stage::ALL.iter().flat_map(|s| s.required_capabilities()) {
        rt.eval_str(&format!("(def {name} nil)")).unwrap();
    }
    for s in Stage::ALL.into_iter().filter(|&s| s <= stage) {
        rt.install(s).unwrap();
    }
}

fn manifest_paths(rt: &Runtime<MockPlatform>) -> Vec<PathBuf> {
    rt.manifest().snapshot().map(|e| e.path.clone()).collect()
}

fn get(rt: &mut Runtime<MockPlatform>, name: &str) -> String {
    rt.eval_str(name).unwrap().to_string()
}

fn rewrite(from: &'static str, to: &'static str) -> Mapper {
    Mapper::Native(Rc::new(move |_: &Path, text: &str| {
        Ok::<_, String>(text.replace(from, to))
    }))
}

// =============================================================================
// Every stage
// =============================================================================

#[test]
fn include_without_stage_fails() {
    let mut rt = runtime(&[("/w/a.lona", "(def a 1)")]);
    let primary = Rc::clone(rt.primary());
    assert_eq!(
        rt.include(&primary, "a.lona"),
        Err(BootError::Stage(StageError::NoActivePrimitive))
    );
    assert!(rt.platform().reads().is_empty());
}

#[test]
fn single_constant_into_empty_namespace() {
    for stage in Stage::ALL {
        let mut rt = runtime(&[("/w/one.lona", "(def answer 42)")]);
        advance(&mut rt, stage);
        let scratch = Namespace::new_root("scratch");
        let resolved = rt.include(&scratch, "one.lona").unwrap();

        assert_eq!(resolved, PathBuf::from("/w/one.lona"));
        assert_eq!(rt.manifest().len(), 1);
        let entry = rt.manifest().last().unwrap();
        assert_eq!(entry.namespace, "scratch");
        assert_eq!(entry.path, resolved);
        assert_eq!(scratch.names(), ["answer"]);
        assert_eq!(scratch.get("answer"), Some(crate::value::Value::int(42)));
    }
}

#[test]
fn top_level_inclusion_resolves_against_working_dir() {
    for stage in Stage::ALL {
        let mut rt = runtime(&[("/w/lib/a.lona", "(def a 1)")]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        assert_eq!(
            rt.include(&primary, "./lib/../lib/a.lona").unwrap(),
            PathBuf::from("/w/lib/a.lona")
        );
    }
}

#[test]
fn nested_units_are_recorded_before_their_includer() {
    for stage in Stage::ALL {
        let mut rt = runtime(&[
            ("/w/a.lona", r#"(include "b.lona") (def a 1)"#),
            ("/w/b.lona", r#"(include "c.lona") (def b 2)"#),
            ("/w/c.lona", "(def c 3)"),
        ]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        rt.include(&primary, "a.lona").unwrap();
        assert_eq!(
            manifest_paths(&rt),
            [
                PathBuf::from("/w/c.lona"),
                PathBuf::from("/w/b.lona"),
                PathBuf::from("/w/a.lona")
            ]
        );
    }
}

#[test]
fn failed_inclusion_is_not_recorded() {
    for stage in Stage::ALL {
        let mut rt = runtime(&[
            ("/w/a.lona", r#"(def a 1) (include "missing.lona")"#),
            ("/w/bad.lona", "(def x (+ 1 :k))"),
        ]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());

        let err = rt.include(&primary, "a.lona").unwrap_err();
        assert!(matches!(err, BootError::UnreadableSource { .. }), "{err}");
        assert_eq!(err.path(), Some(Path::new("/w/missing.lona")));

        let err = rt.include(&primary, "bad.lona").unwrap_err();
        assert!(
            matches!(err, BootError::EvaluationFailure { line: 1, .. }),
            "{err}"
        );
        assert!(rt.manifest().is_empty());
        // Forms before the failure stay evaluated
        assert_eq!(get(&mut rt, "a"), "1");
    }
}

#[test]
fn include_form_returns_nil() {
    let mut rt = runtime(&[("/w/a.lona", "(def a 1)")]);
    advance(&mut rt, Stage::Primitive);
    assert_eq!(
        rt.eval_str(r#"(include "a.lona")"#).unwrap(),
        crate::value::Value::Nil
    );
}

// =============================================================================
// Primitive
// =============================================================================

#[test]
fn primitive_resolves_nested_inclusions_against_working_dir() {
    let mut rt = runtime(&[
        ("/w/sub/a.lona", r#"(include "b.lona")"#),
        ("/w/b.lona", "(def where :top)"),
        ("/w/sub/b.lona", "(def where :sub)"),
    ]);
    advance(&mut rt, Stage::Primitive);
    let primary = Rc::clone(rt.primary());
    rt.include(&primary, "sub/a.lona").unwrap();
    assert_eq!(get(&mut rt, "where"), ":top");
}

#[test]
fn primitive_writes_each_resolved_path_before_loading() {
    let mut rt = runtime(&[
        ("/w/a.lona", r#"(include "b.lona")"#),
        ("/w/b.lona", "(def b 1)"),
    ]);
    advance(&mut rt, Stage::Primitive);
    let primary = Rc::clone(rt.primary());
    rt.include(&primary, "a.lona").unwrap();
    rt.include(&primary, "nope.lona").unwrap_err();
    assert_eq!(
        rt.platform().diagnostics(),
        ["/w/a.lona", "/w/b.lona", "/w/nope.lona"]
    );
}

#[test]
fn later_stages_write_no_diagnostics() {
    for stage in [Stage::RelativePath, Stage::Final] {
        let mut rt = runtime(&[("/w/a.lona", "(def a 1)")]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        rt.include(&primary, "a.lona").unwrap();
        assert!(rt.platform().diagnostics().is_empty());
    }
}

#[test]
fn primitive_has_no_current_unit() {
    let mut rt = runtime(&[("/w/a.lona", "(def here (source-path))")]);
    advance(&mut rt, Stage::Primitive);
    let primary = Rc::clone(rt.primary());
    rt.include(&primary, "a.lona").unwrap();
    assert_eq!(get(&mut rt, "here"), "nil");
}

// =============================================================================
// Relative path and final
// =============================================================================

#[test]
fn nested_inclusion_resolves_against_includer() {
    for stage in [Stage::RelativePath, Stage::Final] {
        let mut rt = runtime(&[
            ("/x/a.src", r#"(include "b.src")"#),
            ("/x/b.src", "(def where :beside)"),
            ("/w/b.src", "(def where :workdir)"),
        ]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        rt.include(&primary, "/x/a.src").unwrap();
        assert_eq!(get(&mut rt, "where"), ":beside");
        assert_eq!(
            manifest_paths(&rt),
            [PathBuf::from("/x/b.src"), PathBuf::from("/x/a.src")]
        );
    }
}

#[test]
fn relative_chain_walks_directories() {
    for stage in [Stage::RelativePath, Stage::Final] {
        let mut rt = runtime(&[
            ("/x/a.src", r#"(include "sub/b.src")"#),
            ("/x/sub/b.src", r#"(include "../c.src")"#),
            ("/x/c.src", "(def c 3)"),
        ]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        rt.include(&primary, "/x/a.src").unwrap();
        assert_eq!(manifest_paths(&rt)[0], PathBuf::from("/x/c.src"));
    }
}

#[test]
fn current_unit_is_visible_while_loading() {
    for stage in [Stage::RelativePath, Stage::Final] {
        let mut rt = runtime(&[
            (
                "/x/a.src",
                r#"(def outer (source-path)) (include "sub/b.src") (def after (source-path))"#,
            ),
            ("/x/sub/b.src", "(def inner (source-path))"),
        ]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        rt.include(&primary, "/x/a.src").unwrap();
        assert_eq!(get(&mut rt, "outer"), r#""/x/a.src""#);
        assert_eq!(get(&mut rt, "inner"), r#""/x/sub/b.src""#);
        assert_eq!(get(&mut rt, "after"), r#""/x/a.src""#);
        assert_eq!(rt.current_source(), None);
    }
}

#[test]
fn current_unit_is_restored_after_failure() {
    for stage in [Stage::RelativePath, Stage::Final] {
        let mut rt = runtime(&[
            ("/x/a.src", r#"(include "missing.src")"#),
            ("/w/b.src", "(def b 1)"),
        ]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        let err = rt.include(&primary, "/x/a.src").unwrap_err();
        assert_eq!(err.path(), Some(Path::new("/x/missing.src")));
        assert_eq!(rt.current_source(), None);
        assert_eq!(
            rt.include(&primary, "b.src").unwrap(),
            PathBuf::from("/w/b.src")
        );
    }
}

#[test]
fn self_inclusion_fails_instead_of_recursing() {
    for stage in Stage::ALL {
        let mut rt = runtime(&[("/w/a.lona", r#"(include "a.lona")"#)]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        match rt.include(&primary, "a.lona") {
            Err(BootError::EvaluationFailure { path, reason, .. }) => {
                assert_eq!(path, PathBuf::from("/w/a.lona"));
                assert!(reason.contains("nested deeper"), "{reason}");
            }
            other => panic!("expected an evaluation failure under {stage}, got {other:?}"),
        }
        assert!(rt.manifest().is_empty());
        assert_eq!(rt.current_source(), None);
        assert_eq!(rt.eval_str("(+ 1 2)").unwrap().to_string(), "3");
    }
}

#[test]
fn deeply_nested_unit_fails_to_parse() {
    let src = format!("(def ok 1)\n(def x {}1", "[".repeat(200_000));
    let mut rt = runtime(&[("/w/deep.lona", src.as_str())]);
    advance(&mut rt, Stage::Primitive);
    let primary = Rc::clone(rt.primary());
    let err = rt.include(&primary, "deep.lona").unwrap_err();
    assert!(
        matches!(err, BootError::EvaluationFailure { line: 2, .. }),
        "{err}"
    );
    assert!(rt.manifest().is_empty());
}

#[test]
fn mutual_inclusion_fails_instead_of_recursing() {
    let mut rt = runtime(&[
        ("/w/a.lona", r#"(def a 1) (include "b.lona")"#),
        ("/w/b.lona", r#"(def b 2) (include "a.lona")"#),
    ]);
    advance(&mut rt, Stage::Final);
    let primary = Rc::clone(rt.primary());
    for start in ["a.lona", "b.lona"] {
        let err = rt.include(&primary, start).unwrap_err();
        assert!(matches!(err, BootError::EvaluationFailure { line: 0, .. }));
        // 32 units load, the 33rd is the starting unit again
        assert_eq!(err.path(), Some(Path::new("/w").join(start).as_path()));
    }
    assert!(rt.manifest().is_empty());
}

// =============================================================================
// Mapping functions
// =============================================================================

#[test]
fn earlier_stages_reject_mappers() {
    for stage in [Stage::Primitive, Stage::RelativePath] {
        let mut rt = runtime(&[("/w/a.lona", "(def a 1)")]);
        advance(&mut rt, stage);
        let primary = Rc::clone(rt.primary());
        assert_eq!(
            rt.include_with(&primary, "a.lona", rewrite("1", "2")),
            Err(BootError::Stage(StageError::MapperUnsupported { stage }))
        );
        assert!(rt.platform().reads().is_empty());
        assert!(rt.manifest().is_empty());
    }
}

#[test]
fn earlier_stages_reject_mappers_from_lonala() {
    let mut rt = runtime(&[("/w/a.lona", "(def a 1)")]);
    advance(&mut rt, Stage::RelativePath);
    let err = rt
        .eval_str(r#"(include (fn [s] s) "a.lona")"#)
        .unwrap_err();
    assert!(err.to_string().contains("mapping"), "{err}");
}

#[test]
fn final_applies_native_mapper() {
    let mut rt = runtime(&[("/w/a.lona", "(def a 41)")]);
    advance(&mut rt, Stage::Final);
    let primary = Rc::clone(rt.primary());
    rt.include_with(&primary, "a.lona", rewrite("41", "42"))
        .unwrap();
    assert_eq!(get(&mut rt, "a"), "42");
    assert_eq!(rt.manifest().len(), 1);
}

#[test]
fn final_applies_lonala_mapper() {
    let mut rt = runtime(&[
        ("/w/a.lona", r#"(include (fn [text] (%concat text " (def mapped true)")) "b.lona")"#),
        ("/w/b.lona", "(def b 2)"),
    ]);
    advance(&mut rt, Stage::Final);
    let primary = Rc::clone(rt.primary());
    rt.include(&primary, "a.lona").unwrap();
    assert_eq!(get(&mut rt, "b"), "2");
    assert_eq!(get(&mut rt, "mapped"), "true");
}

#[test]
fn mapper_failure_is_an_evaluation_failure() {
    let mut rt = runtime(&[("/w/a.lona", "(def a 1)")]);
    advance(&mut rt, Stage::Final);
    let primary = Rc::clone(rt.primary());

    let refuse = Mapper::Native(Rc::new(|_: &Path, _: &str| {
        Err::<String, _>(String::from("refused"))
    }));
    let err = rt.include_with(&primary, "a.lona", refuse).unwrap_err();
    assert_eq!(
        err,
        BootError::EvaluationFailure {
            path: PathBuf::from("/w/a.lona"),
            line: 0,
            reason: String::from("mapper: refused"),
        }
    );

    let not_text = Mapper::Callable(rt.eval_str("(fn [s] 7)").unwrap());
    let err = rt.include_with(&primary, "a.lona", not_text).unwrap_err();
    assert!(matches!(err, BootError::EvaluationFailure { line: 0, .. }), "{err}");
    assert!(rt.manifest().is_empty());
}

// =============================================================================
// Upgrades
// =============================================================================

#[test]
fn upgrades_require_capabilities() {
    let mut rt = runtime(&[]);
    rt.install(Stage::Primitive).unwrap();
    assert_eq!(
        rt.install(Stage::RelativePath),
        Err(StageError::MissingCapability {
            stage: Stage::RelativePath,
            capability: "dirname"
        })
    );
    assert_eq!(rt.stage(), Some(Stage::Primitive));
}

#[test]
fn upgrades_never_go_back() {
    let mut rt = runtime(&[]);
    advance(&mut rt, Stage::Final);
    for stage in Stage::ALL {
        assert!(matches!(
            rt.install(stage),
            Err(StageError::Regression { current: Stage::Final, .. })
        ));
    }
    assert_eq!(rt.stage_history(), &Stage::ALL);
}
