use sweeper_sheet::{CellValue, ColumnType, Table};

fn survey() -> Table {
    Table::from_csv_str(
        "respondent,age,score,comment\n\
         ann,34,7.5,ok\n\
         bob,,8.0,\n\
         ann,34,7.5,ok\n\
         cid,40,,meh\n\
         dee,,6.0,\n",
    )
    .unwrap()
}

#[test]
fn test_remove_duplicates_is_idempotent() {
    let mut once = survey();
    let removed = once.remove_duplicates();
    assert_eq!(removed, 1);

    let mut twice = once.clone();
    assert_eq!(twice.remove_duplicates(), 0);
    assert_eq!(once, twice);
}

#[test]
fn test_remove_duplicates_keeps_first_occurrence_order() {
    let mut table = survey();
    table.remove_duplicates();

    let names: Vec<String> = table
        .column_by_name("respondent")
        .unwrap()
        .into_iter()
        .map(CellValue::as_str)
        .collect();
    assert_eq!(names, vec!["ann", "bob", "cid", "dee"]);
}

#[test]
fn test_fill_missing_leaves_text_columns_unchanged() {
    let original = survey();
    let mut filled = original.clone();
    filled.fill_missing_with_mean();

    for name in ["respondent", "comment"] {
        assert_eq!(
            filled.column_by_name(name).unwrap(),
            original.column_by_name(name).unwrap()
        );
    }
}

#[test]
fn test_fill_missing_uses_mean_of_present_values() {
    let mut table = survey();
    assert_eq!(table.column_type(1), ColumnType::Integer);

    table.fill_missing_with_mean();

    // age: 34, 34, 40 -> 36
    let ages = table.column_by_name("age").unwrap();
    assert!(ages.iter().all(|v| !v.is_null()));
    assert_eq!(ages[1], &CellValue::Float(36.0));
    assert_eq!(ages[4], &CellValue::Float(36.0));
    assert_eq!(ages[0], &CellValue::Int(34));

    // score: 7.5, 8.0, 7.5, 6.0 -> 7.25
    let scores = table.column_by_name("score").unwrap();
    assert_eq!(scores[3], &CellValue::Float(7.25));
    assert_eq!(table.column_type(1), ColumnType::Float);
}

#[test]
fn test_cleaning_order_does_not_matter_for_exact_duplicates() {
    let mut a = survey();
    a.remove_duplicates();
    a.fill_missing_with_mean();

    let mut b = survey();
    b.fill_missing_with_mean();
    b.remove_duplicates();

    assert_eq!(a.row_count(), b.row_count());
    assert_eq!(a.column_names(), b.column_names());
}

#[test]
fn test_all_missing_numeric_column_stays_missing() {
    let mut table = Table::from_csv_str("id,blank\n1,\n2,\n").unwrap();
    assert_eq!(table.column_type(1), ColumnType::Empty);

    assert_eq!(table.fill_missing_with_mean(), 0);
    assert!(table.column_by_name("blank").unwrap().iter().all(|v| v.is_null()));
}

#[test]
fn test_degenerate_tables() {
    let mut empty = Table::new();
    assert_eq!(empty.remove_duplicates(), 0);
    assert_eq!(empty.fill_missing_with_mean(), 0);
    empty.select_columns::<&str>(&[]).unwrap();

    let mut header_only = Table::from_csv_str("a,b\n").unwrap();
    assert_eq!(header_only.remove_duplicates(), 0);
    assert_eq!(header_only.fill_missing_with_mean(), 0);
    assert_eq!(header_only.to_csv_string(), "a,b\n");
}

#[test]
fn test_select_columns_is_idempotent() {
    let mut once = survey();
    once.select_columns(&["score", "respondent"]).unwrap();

    let mut twice = once.clone();
    twice.select_columns(&["score", "respondent"]).unwrap();

    assert_eq!(once, twice);
    assert_eq!(once.column_names(), &["respondent", "score"]);
}
