use reprice_pipeline::PassOutcome;

use crate::helpers::{output_line, Workspace};

#[test]
fn two_rapid_edits_between_checks_run_one_pass() {
    let ws = Workspace::new();
    ws.write_products(&["A1,10.00,8.00,5"]);
    ws.write_sales(&["A1,40"]);
    let mut pipeline = ws.pipeline();
    pipeline.run_pass_if_changed().unwrap();

    ws.write_products(&["A1,20.00,8.00,5"]);
    ws.write_products(&["A1,40.00,8.00,5"]);

    assert!(matches!(
        pipeline.run_pass_if_changed().unwrap(),
        PassOutcome::Completed(_)
    ));
    assert!(matches!(
        pipeline.run_pass_if_changed().unwrap(),
        PassOutcome::Unchanged
    ));
    assert_eq!(pipeline.stats().passes_run, 2);
    // Reflects the final file state: 40.00 * 1.15.
    assert_eq!(output_line(&ws.read_output(), "A1"), Some("A1,$40.00,$46.00"));
}

#[test]
fn rewriting_identical_content_does_not_trigger_a_pass() {
    let ws = Workspace::new();
    ws.write_products(&["A1,10.00,8.00,5"]);
    ws.write_sales(&["A1,40"]);
    let mut pipeline = ws.pipeline();
    pipeline.run_pass_if_changed().unwrap();

    ws.write_sales(&["A1,40"]);
    assert!(matches!(
        pipeline.run_pass_if_changed().unwrap(),
        PassOutcome::Unchanged
    ));
}

#[test]
fn sales_change_alone_triggers_a_pass() {
    let ws = Workspace::new();
    ws.write_products(&["A1,10.00,8.00,5"]);
    ws.write_sales(&["A1,40"]);
    let mut pipeline = ws.pipeline();
    pipeline.run_pass_if_changed().unwrap();

    ws.write_sales(&["A1,10"]);
    assert!(matches!(
        pipeline.run_pass_if_changed().unwrap(),
        PassOutcome::Completed(_)
    ));
    assert_eq!(output_line(&ws.read_output(), "A1"), Some("A1,$10.00,$10.00"));
}

#[test]
fn sales_table_appearing_later_triggers_a_pass() {
    let ws = Workspace::new();
    ws.write_products(&["A1,10.00,8.00,5"]);
    let mut pipeline = ws.pipeline();
    assert!(pipeline.run_pass_if_changed().unwrap_err().is_missing_file());

    ws.write_sales(&["A1,40"]);
    assert!(matches!(
        pipeline.run_pass_if_changed().unwrap(),
        PassOutcome::Completed(_)
    ));
}
