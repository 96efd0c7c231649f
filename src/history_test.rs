#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::shape::Shape;

fn scene_with_rect(x: f64) -> Scene {
    let mut scene = Scene::new();
    scene.insert(Shape::rectangle(x, 0.0));
    scene
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_history_has_no_steps() {
    let history = History::new(Scene::new());
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.redo_depth(), 0);
}

#[test]
fn present_is_the_initial_scene() {
    let initial = scene_with_rect(5.0);
    let history = History::new(initial.clone());
    assert_eq!(*history.present(), initial);
}

// =============================================================
// Commit
// =============================================================

#[test]
fn commit_moves_present_into_past() {
    let mut history = History::new(Scene::new());
    history.commit(scene_with_rect(1.0));
    assert!(history.can_undo());
    assert_eq!(history.undo_depth(), 1);
}

#[test]
fn commit_clears_redo() {
    let mut history = History::new(Scene::new());
    history.commit(scene_with_rect(1.0));
    history.commit(scene_with_rect(2.0));
    assert!(history.undo());
    assert!(history.can_redo());
    history.commit(scene_with_rect(3.0));
    assert!(!history.can_redo());
    assert_eq!(history.redo_depth(), 0);
}

#[test]
fn commit_evicts_oldest_beyond_cap() {
    let mut history = History::with_cap(Scene::new(), 3);
    for i in 0..10 {
        history.commit(scene_with_rect(f64::from(i)));
    }
    assert_eq!(history.undo_depth(), 3);
    // Walking back hits the bound, not the origin.
    while history.undo() {}
    assert_eq!(history.present().len(), 1);
    assert_eq!(history.present().iter().next().unwrap().x, 6.0);
}

// =============================================================
// Undo / redo
// =============================================================

#[test]
fn undo_at_boundary_is_silent_noop() {
    let mut history = History::new(scene_with_rect(1.0));
    assert!(!history.undo());
    assert_eq!(history.present().iter().next().unwrap().x, 1.0);
}

#[test]
fn redo_at_boundary_is_silent_noop() {
    let mut history = History::new(Scene::new());
    history.commit(scene_with_rect(1.0));
    assert!(!history.redo());
}

#[test]
fn undo_restores_previous_snapshot() {
    let mut history = History::new(scene_with_rect(1.0));
    history.commit(scene_with_rect(2.0));
    assert!(history.undo());
    assert_eq!(history.present().iter().next().unwrap().x, 1.0);
}

#[test]
fn redo_restores_undone_snapshot() {
    let mut history = History::new(scene_with_rect(1.0));
    history.commit(scene_with_rect(2.0));
    history.undo();
    assert!(history.redo());
    assert_eq!(history.present().iter().next().unwrap().x, 2.0);
}

#[test]
fn undo_then_redo_inverse_law() {
    let mut history = History::new(Scene::new());
    let n = 7;
    for i in 0..n {
        history.commit(scene_with_rect(f64::from(i)));
    }
    let final_state = history.present().clone();
    for _ in 0..n {
        assert!(history.undo());
    }
    assert!(history.present().is_empty());
    for _ in 0..n {
        assert!(history.redo());
    }
    assert_eq!(*history.present(), final_state);
}

#[test]
fn interleaved_undo_redo_keeps_depths_consistent() {
    let mut history = History::new(Scene::new());
    history.commit(scene_with_rect(1.0));
    history.commit(scene_with_rect(2.0));
    history.undo();
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.redo_depth(), 1);
    history.redo();
    assert_eq!(history.undo_depth(), 2);
    assert_eq!(history.redo_depth(), 0);
}

// =============================================================
// Snapshot independence
// =============================================================

#[test]
fn stored_snapshot_unaffected_by_live_mutation() {
    let mut history = History::new(Scene::new());
    let mut live = scene_with_rect(10.0);
    let id = live.iter().next().unwrap().id;
    let retained = live.clone();
    history.commit(live.clone());

    // Keep editing the live scene after the commit.
    live.get_mut(id).unwrap().x = 999.0;

    assert_eq!(*history.present(), retained);
    history.commit(live.clone());
    history.undo();
    assert_eq!(history.present().get(id).unwrap().x, 10.0);
}

// =============================================================
// Reset
// =============================================================

#[test]
fn reset_clears_both_stacks() {
    let mut history = History::new(Scene::new());
    history.commit(scene_with_rect(1.0));
    history.commit(scene_with_rect(2.0));
    history.undo();
    history.reset(scene_with_rect(7.0));
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.present().iter().next().unwrap().x, 7.0);
}

#[test]
fn cap_of_zero_still_keeps_one_step() {
    let mut history = History::with_cap(Scene::new(), 0);
    history.commit(scene_with_rect(1.0));
    history.commit(scene_with_rect(2.0));
    assert_eq!(history.undo_depth(), 1);
}
