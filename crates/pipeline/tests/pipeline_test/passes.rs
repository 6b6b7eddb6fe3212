use std::fs;

use reprice_core::{RoundingMode, Table};
use reprice_pipeline::{PassError, PassOutcome};

use crate::helpers::{output_line, write_table, Workspace};

#[test]
fn worked_examples_price_as_documented() {
    let ws = Workspace::new();
    ws.write_products(&["A1,10.00,8.00,5", "A2,10.00,9.00,5", "A3,10.00,9.00,300"]);
    ws.write_sales(&["A1,40", "A2,40", "A3,0"]);

    let report = ws.pipeline().run_pass().unwrap();
    assert_eq!(report.rows_written, 3);

    assert_eq!(
        ws.read_output(),
        "sku,old_price,new_price\n\
         A1,$10.00,$11.50\n\
         A2,$10.00,$11.50\n\
         A3,$10.00,$10.80\n"
    );
}

#[test]
fn sku_absent_from_sales_counts_as_zero_sold() {
    let ws = Workspace::new();
    ws.write_products(&["DS1,20.00,5.00,250"]);
    ws.write_sales(&["OTHER,12"]);

    ws.pipeline().run_pass().unwrap();
    // Dead stock (-30%) requires zero sales: 20.00 * 0.7 = 14.00, floor 6.00.
    assert_eq!(output_line(&ws.read_output(), "DS1"), Some("DS1,$20.00,$14.00"));
}

#[test]
fn overlapping_tiers_apply_only_the_first() {
    let ws = Workspace::new();
    // stock 250 with zero sales matches dead stock and overstock.
    ws.write_products(&["X1,100.00,10.00,250"]);
    ws.write_sales(&["X1,0"]);

    ws.pipeline().run_pass().unwrap();
    assert_eq!(output_line(&ws.read_output(), "X1"), Some("X1,$100.00,$70.00"));
}

#[test]
fn passthrough_columns_and_order_are_ignored() {
    let ws = Workspace::new();
    write_table(
        &ws.products(),
        "stock,name,sku,cost_price,category,current_price",
        &["150,Lamp,L1,2.00,home,10.00"],
    );
    write_table(&ws.sales(), "sku,store,quantity_sold", &["L1,north,3"]);

    ws.pipeline().run_pass().unwrap();
    // Overstock: 10.00 * 0.9 = 9.00.
    assert_eq!(
        ws.read_output(),
        "sku,old_price,new_price\nL1,$10.00,$9.00\n"
    );
}

#[test]
fn running_twice_on_unchanged_inputs_is_identical() {
    let ws = Workspace::new();
    ws.write_products(&["A1,10.00,8.00,5", "B1,3.33,1.11,150", "C1,0.99,0.10,10"]);
    ws.write_sales(&["A1,40", "B1,2"]);

    let mut pipeline = ws.pipeline();
    pipeline.run_pass().unwrap();
    let first = fs::read(ws.output()).unwrap();
    pipeline.run_pass().unwrap();
    let second = fs::read(ws.output()).unwrap();
    assert_eq!(first, second);

    // And the change-aware entry point does not even rewrite it.
    assert!(matches!(
        pipeline.run_pass_if_changed().unwrap(),
        PassOutcome::Completed(_)
    ));
    assert!(matches!(
        pipeline.run_pass_if_changed().unwrap(),
        PassOutcome::Unchanged
    ));
    assert_eq!(fs::read(ws.output()).unwrap(), first);
}

#[test]
fn rounding_mode_is_pinned_at_half_cent() {
    let ws = Workspace::new();
    // 12.30 * 1.15 = 14.145 exactly.
    ws.write_products(&["H1,12.30,1.00,3"]);
    ws.write_sales(&["H1,99"]);

    ws.pipeline_with(RoundingMode::HalfEven).run_pass().unwrap();
    assert_eq!(output_line(&ws.read_output(), "H1"), Some("H1,$12.30,$14.14"));

    ws.pipeline_with(RoundingMode::HalfUp).run_pass().unwrap();
    assert_eq!(output_line(&ws.read_output(), "H1"), Some("H1,$12.30,$14.15"));
}

#[test]
fn malformed_rows_are_isolated_and_summarised() {
    let ws = Workspace::new();
    ws.write_products(&[
        "A1,10.00,8.00,5",
        "NOSTOCK,10.00,8.00,",
        "NEG,-4.00,1.00,3",
        "Z1,5.00,1.00,30",
    ]);
    ws.write_sales(&["A1,40", "Z1,lots"]);

    let report = ws.pipeline().run_pass().unwrap();
    assert_eq!(report.rows_written, 2);
    assert!(!report.is_clean());

    let mut seen: Vec<_> = report
        .failures
        .iter()
        .map(|f| (f.table, f.sku.as_str(), f.field))
        .collect();
    seen.sort_by_key(|(_, sku, _)| *sku);
    assert_eq!(
        seen,
        vec![
            (Table::Products, "NEG", "current_price"),
            (Table::Products, "NOSTOCK", "stock"),
            (Table::Sales, "Z1", "quantity_sold"),
        ]
    );

    let out = ws.read_output();
    assert_eq!(output_line(&out, "A1"), Some("A1,$10.00,$11.50"));
    // Z1's sales row was rejected, so it prices as zero sold: no tier, floor 1.20.
    assert_eq!(output_line(&out, "Z1"), Some("Z1,$5.00,$5.00"));
}

#[test]
fn failed_pass_leaves_previous_output_in_place() {
    let ws = Workspace::new();
    ws.write_products(&["A1,10.00,8.00,5"]);
    ws.write_sales(&["A1,40"]);
    let mut pipeline = ws.pipeline();
    pipeline.run_pass().unwrap();
    let before = ws.read_output();

    write_table(&ws.products(), "sku,current_price,stock", &["A1,10.00,5"]);
    let err = pipeline.run_pass_if_changed().unwrap_err();
    assert!(matches!(
        err,
        PassError::MissingColumn {
            table: Table::Products,
            column: "cost_price",
            ..
        }
    ));
    assert_eq!(ws.read_output(), before);
    assert!(!ws.path(".updated_prices.csv.tmp").exists());
}

#[test]
fn missing_products_table_is_reported_as_missing_file() {
    let ws = Workspace::new();
    ws.write_sales(&["A1,40"]);
    let err = ws.pipeline().run_pass().unwrap_err();
    match err {
        PassError::MissingFile { table, path } => {
            assert_eq!(table, Table::Products);
            assert_eq!(path, ws.products());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn floor_is_not_undercut_by_rounding() {
    let ws = Workspace::new();
    // 8.01 * 1.2 = 9.612, so the nearest cent would fall under the floor.
    ws.write_products(&["F1,1.00,8.01,50"]);
    ws.write_sales(&[]);

    ws.pipeline().run_pass().unwrap();
    assert_eq!(output_line(&ws.read_output(), "F1"), Some("F1,$1.00,$9.62"));
}

#[test]
fn out_of_range_price_rejects_only_its_row() {
    let ws = Workspace::new();
    ws.write_products(&["OK,10.00,8.00,5", "BIG,1.00,79228162514264337593543950335,50"]);
    ws.write_sales(&[]);

    let report = ws.pipeline().run_pass().unwrap();
    assert_eq!(report.rows_written, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].sku, "BIG");
    assert_eq!(report.failures[0].field, "cost_price");
    assert_eq!(report.failures[0].reason, "out of range");
    assert_eq!(output_line(&ws.read_output(), "OK"), Some("OK,$10.00,$10.00"));
}

#[test]
fn undecodable_row_does_not_sink_the_pass() {
    let ws = Workspace::new();
    let mut products = b"sku,current_price,cost_price,stock\nA1,10.00,8.00,5\n".to_vec();
    products.extend_from_slice(b"B\xff2,10.00,8.00,5\n");
    products.extend_from_slice(b"A3,10.00,9.00,300\n");
    fs::write(ws.products(), products).unwrap();
    ws.write_sales(&["A1,40"]);

    let report = ws.pipeline().run_pass().unwrap();
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].line, 3);

    let out = ws.read_output();
    assert_eq!(output_line(&out, "A1"), Some("A1,$10.00,$11.50"));
    assert_eq!(output_line(&out, "A3"), Some("A3,$10.00,$10.80"));
}

#[test]
fn unwritable_output_fails_after_one_retry() {
    let ws = Workspace::new();
    ws.write_products(&["A1,10.00,8.00,5"]);
    ws.write_sales(&["A1,40"]);
    fs::write(ws.output(), "previous\n").unwrap();
    fs::create_dir(ws.path(".updated_prices.csv.tmp")).unwrap();

    let mut pipeline = ws.pipeline();
    let err = pipeline.run_pass().unwrap_err();
    assert!(matches!(err, PassError::OutputWrite { .. }));
    assert_eq!(pipeline.stats().output_retries, 1);
    assert_eq!(ws.read_output(), "previous\n");
}
