// Property-based tests for the normalization steps.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use csvxl_core::{Cell, NormalizedTable, Separator};
use csvxl_io::clean::clean_table;
use csvxl_io::csv::{detect_separator, parse_table, repair_quoted_newlines};
use proptest::prelude::*;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Text built from the characters that matter to repair and detection
fn arb_csvish_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            3 => Just('a'),
            2 => Just(','),
            2 => Just(';'),
            2 => Just('"'),
            2 => Just('\n'),
            1 => Just(' '),
            1 => Just('\t'),
            1 => Just('\r'),
            1 => Just('ã'),
        ],
        0..120,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Cell value: mostly populated, often empty
fn arb_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        2 => Just(None),
        1 => Just(Some(String::new())),
        3 => r"[a-z0-9 ]{1,6}".prop_map(Some),
    ]
}

/// Headers padded with whitespace, unique once trimmed
fn arb_table() -> impl Strategy<Value = (Vec<String>, Vec<Vec<Cell>>)> {
    (1usize..7).prop_flat_map(|width| {
        let headers = prop::collection::vec(r"[ \t]{0,2}", width).prop_map(|pads| {
            pads.iter()
                .enumerate()
                .map(|(i, pad)| format!("{}col{}{}", pad, i, pad))
                .collect::<Vec<_>>()
        });
        let rows = prop::collection::vec(prop::collection::vec(arb_cell(), 0..=width), 0..12);
        (headers, rows)
    })
}

// ---------------------------------------------------------------------------
// Separator detection
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn comma_iff_sample_has_comma_and_no_semicolon(text in arb_csvish_text(), sample in 0usize..150) {
        let detected = detect_separator(&text, sample);
        let prefix: String = text.chars().take(sample).collect();
        let expect_comma = prefix.contains(',') && !prefix.contains(';');

        prop_assert!(matches!(detected, Separator::Comma | Separator::Semicolon));
        prop_assert_eq!(detected == Separator::Comma, expect_comma);
    }

    #[test]
    fn repair_is_idempotent(text in arb_csvish_text()) {
        let once = repair_quoted_newlines(&text).into_owned();
        let twice = repair_quoted_newlines(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn repair_never_grows_text(text in arb_csvish_text()) {
        let repaired = repair_quoted_newlines(&text);
        prop_assert!(repaired.len() <= text.len());
    }

    #[test]
    fn parse_never_panics_and_pads_rows(text in arb_csvish_text()) {
        for sep in [Separator::Comma, Separator::Semicolon] {
            if let Ok(parsed) = parse_table(&text, sep) {
                let rows = parsed.table.row_count();
                prop_assert!(parsed.table.columns.iter().all(|c| c.cells.len() == rows));
                prop_assert_eq!(parsed.rows_read, rows + parsed.rows_malformed);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning invariants
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn cleaned_rows_are_dense_enough((headers, rows) in arb_table(), min in 0usize..4) {
        let mut table = NormalizedTable::from_rows(headers, rows);
        clean_table(&mut table, min);

        for r in 0..table.row_count() {
            let populated = table.populated_in_row(r);
            prop_assert!(populated > 0, "row {} is empty", r);
            prop_assert!(populated > min, "row {} has {} cells, min {}", r, populated, min);
        }
    }

    #[test]
    fn cleaned_columns_are_never_empty((headers, rows) in arb_table()) {
        let mut table = NormalizedTable::from_rows(headers, rows);
        clean_table(&mut table, 2);

        if !table.is_empty() {
            for column in &table.columns {
                prop_assert!(!column.is_all_absent(), "column {:?} is empty", column.name);
            }
        }
    }

    #[test]
    fn cleaned_headers_are_trimmed_in_order((headers, rows) in arb_table()) {
        let trimmed: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let mut table = NormalizedTable::from_rows(headers, rows);
        clean_table(&mut table, 2);

        // Output headers are a subsequence of the trimmed input headers
        let mut remaining = trimmed.iter();
        for name in table.headers() {
            prop_assert!(
                remaining.any(|t| t == name),
                "header {:?} out of order or untrimmed", name
            );
        }
    }
}
