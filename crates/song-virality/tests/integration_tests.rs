//! Integration tests for the song virality pipeline.
//!
//! These tests load CSV fixtures and verify end-to-end cleaning, labeling,
//! export and reporting behavior.

use polars::prelude::*;
use song_virality::{
    ExplicitNormalization, Pipeline, PipelineConfig, PipelineStage, ReportGenerator,
    ViralityError, clean, describe_dataset, io,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> DataFrame {
    io::load_csv(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn i64_column(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
    df.column(name)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect()
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("song_virality_{}_{}", name, std::process::id()))
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_on_songs() {
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .process(load_fixture("songs.csv"))
        .unwrap();

    let report = &result.report;
    assert_eq!(report.rows_before, 8);
    assert_eq!(report.removed_duplicates, 1);
    assert_eq!(report.removed_missing, 1);
    assert_eq!(report.rows_after, 6);
    assert_eq!(report.viral_count, 3);
    assert_eq!(report.explicit, ExplicitNormalization::Converted);

    assert_eq!(
        i64_column(&result.data, "Viral"),
        vec![Some(1), Some(1), Some(0), Some(1), Some(0), Some(0)]
    );
    assert_eq!(
        i64_column(&result.data, "Explicit"),
        vec![Some(1), Some(0), Some(0), Some(1), Some(0), Some(0)]
    );
}

#[test]
fn test_cleaning_messages_in_order() {
    let (_, report) = clean(load_fixture("songs.csv"), &PipelineConfig::default()).unwrap();

    assert_eq!(
        report.actions,
        vec![
            "Dropped 1 duplicate rows.".to_string(),
            "Dropped 1 rows with missing values in important columns.".to_string(),
            "Converted 'Explicit' column to binary (1 for explicit, 0 for non-explicit)."
                .to_string(),
            "Created 'Viral' label based on Popularity (>= 80).".to_string(),
        ]
    );
}

#[test]
fn test_columns_preserved_with_label_last() {
    let df = load_fixture("songs.csv");
    let mut expected: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();
    expected.push("Viral".to_string());

    let (cleaned, _) = clean(df, &PipelineConfig::default()).unwrap();

    let actual: Vec<String> = cleaned
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_pipeline_is_idempotent() {
    let config = PipelineConfig::default();

    let (once, first_report) = clean(load_fixture("songs.csv"), &config).unwrap();
    let (twice, second_report) = clean(once.clone(), &config).unwrap();

    assert!(once.equals_missing(&twice));
    assert_eq!(second_report.removed_duplicates, 0);
    assert_eq!(second_report.removed_missing, 0);
    assert_eq!(second_report.explicit, ExplicitNormalization::AlreadyNumeric);
    assert_eq!(second_report.viral_count, first_report.viral_count);
}

#[test]
fn test_threshold_changes_labels() {
    let config = PipelineConfig::builder()
        .viral_threshold(90.0)
        .build()
        .unwrap();

    let (cleaned, report) = clean(load_fixture("songs.csv"), &config).unwrap();

    assert_eq!(report.viral_count, 1);
    assert_eq!(i64_column(&cleaned, "Viral")[0], Some(1));
}

#[test]
fn test_keep_duplicates() {
    let config = PipelineConfig::builder()
        .remove_duplicates(false)
        .build()
        .unwrap();

    let (cleaned, report) = clean(load_fixture("songs.csv"), &config).unwrap();

    assert_eq!(report.removed_duplicates, 0);
    assert_eq!(cleaned.height(), 7);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_missing_popularity_is_schema_error() {
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .process(load_fixture("no_popularity.csv"));

    match result {
        Err(ViralityError::Schema { missing }) => assert_eq!(missing, vec!["Popularity"]),
        other => panic!("Expected schema error, got {:?}", other.map(|r| r.report)),
    }
}

#[test]
fn test_numeric_explicit_and_missing_genre() {
    let config = PipelineConfig::default();
    let (cleaned, report) = clean(load_fixture("no_genre.csv"), &config).unwrap();

    assert_eq!(report.explicit, ExplicitNormalization::AlreadyNumeric);
    assert_eq!(
        i64_column(&cleaned, "Viral"),
        vec![Some(1), Some(0), Some(1)]
    );

    let stats = describe_dataset(&cleaned, &config).unwrap();
    assert!(stats.top_viral_genres.is_none());
    assert_eq!(stats.viral_rows, 2);
}

#[test]
fn test_example_rows_from_memory() {
    let df = df![
        "Popularity" => [Some(85i64), Some(85), Some(50), Some(90)],
        "Energy" => [Some(0.7), Some(0.7), None, Some(0.4)],
    ]
    .unwrap();
    let config = PipelineConfig::builder()
        .required_columns(["Popularity", "Energy"])
        .feature_columns(["Energy"])
        .build()
        .unwrap();

    let (cleaned, report) = clean(df, &config).unwrap();

    assert_eq!(report.removed_duplicates, 1);
    assert_eq!(report.removed_missing, 1);
    assert_eq!(cleaned.height(), 2);
    assert_eq!(i64_column(&cleaned, "Viral"), vec![Some(1), Some(1)]);
}

// ============================================================================
// Explicit Normalization
// ============================================================================

#[test]
fn test_mixed_case_explicit_fixture() {
    let (cleaned, report) =
        clean(load_fixture("explicit_mixed_case.csv"), &PipelineConfig::default()).unwrap();

    assert_eq!(report.explicit, ExplicitNormalization::Converted);
    assert_eq!(
        i64_column(&cleaned, "Explicit"),
        vec![Some(1), Some(0), Some(0), Some(0), Some(1), Some(0), Some(0)]
    );
    assert_eq!(
        i64_column(&cleaned, "Viral"),
        vec![Some(1), Some(0), Some(1), Some(0), Some(1), Some(0), Some(0)]
    );
}

#[test]
fn test_boolean_like_explicit_from_bytes_is_case_sensitive() {
    let csv = "Popularity,Energy,Explicit\n85,0.5,true\n40,0.6,TRUE\n90,0.7,True\n12,0.8,Yes\n";
    let config = PipelineConfig::builder()
        .required_columns(["Popularity", "Energy"])
        .feature_columns(["Energy"])
        .build()
        .unwrap();

    let df = io::read_csv_bytes(csv.as_bytes(), b',').unwrap();
    let (cleaned, _) = clean(df, &config).unwrap();

    assert_eq!(
        i64_column(&cleaned, "Explicit"),
        vec![Some(0), Some(0), Some(1), Some(1)]
    );
}

// ============================================================================
// Cleaning Properties
// ============================================================================

const POPULARITY_POOL: [Option<f64>; 6] = [
    Some(79.999),
    Some(80.0),
    Some(100.0),
    Some(12.0),
    None,
    Some(f64::NAN),
];
const ENERGY_POOL: [Option<f64>; 4] = [Some(0.5), None, Some(f64::NAN), Some(0.25)];
const EXPLICIT_POOL: [Option<&str>; 7] = [
    Some("Yes"),
    Some("No"),
    Some("True"),
    Some("false"),
    Some("TRUE"),
    Some("maybe"),
    None,
];

/// Deterministic frame mixing duplicates, missing values, NaN and
/// popularity on both sides of the threshold.
fn generated_frame(seed: usize, rows: usize) -> DataFrame {
    // Rows repeat after 24, so longer frames always carry exact duplicates.
    let pick = |i: usize, stride: usize, len: usize| ((i % 24) * stride + seed) % len;

    let popularity: Vec<Option<f64>> = (0..rows)
        .map(|i| POPULARITY_POOL[pick(i, 5, POPULARITY_POOL.len())])
        .collect();
    let energy: Vec<Option<f64>> = (0..rows)
        .map(|i| ENERGY_POOL[pick(i, 3, ENERGY_POOL.len())])
        .collect();
    let explicit: Vec<Option<&str>> = (0..rows)
        .map(|i| EXPLICIT_POOL[((i % 24) / 2 * (seed + 1) + seed) % EXPLICIT_POOL.len()])
        .collect();

    df![
        "Popularity" => popularity,
        "Energy" => energy,
        "Explicit" => explicit,
    ]
    .unwrap()
}

fn assert_cleaning_properties(cleaned: &DataFrame, config: &PipelineConfig) {
    let deduplicated = cleaned
        .unique_stable(None, UniqueKeepStrategy::First, None)
        .unwrap();
    assert_eq!(deduplicated.height(), cleaned.height(), "duplicate rows remain");

    for name in &config.required_columns {
        let column = cleaned.column(name).unwrap();
        assert_eq!(column.null_count(), 0, "nulls left in {}", name);
        let values = column.cast(&DataType::Float64).unwrap();
        assert!(
            values.f64().unwrap().into_iter().flatten().all(|v| !v.is_nan()),
            "NaN left in {}",
            name
        );
    }

    let popularity = cleaned
        .column(&config.popularity_column)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap();
    let viral = i64_column(cleaned, &config.viral_column);
    for (score, label) in popularity.f64().unwrap().into_iter().zip(viral) {
        let expected = i64::from(score.unwrap() >= config.viral_threshold);
        assert_eq!(label, Some(expected), "wrong label for popularity {:?}", score);
    }

    assert!(
        i64_column(cleaned, &config.explicit_column)
            .iter()
            .all(|flag| matches!(flag, Some(0) | Some(1)))
    );
}

#[test]
fn test_cleaning_properties_hold_on_generated_frames() {
    let config = PipelineConfig::builder()
        .required_columns(["Popularity", "Energy"])
        .feature_columns(["Energy"])
        .build()
        .unwrap();

    for seed in 0..12 {
        let df = generated_frame(seed, 40);
        let rows_before = df.height();

        let (once, report) = clean(df, &config).unwrap();
        assert_eq!(
            report.rows_before - report.removed_duplicates - report.removed_missing,
            report.rows_after
        );
        assert_eq!(rows_before, report.rows_before);
        assert!(report.removed_duplicates > 0, "seed {} made no duplicates", seed);
        assert_cleaning_properties(&once, &config);

        let (twice, _) = clean(once.clone(), &config).unwrap();
        assert!(once.equals_missing(&twice), "seed {} is not idempotent", seed);
    }
}

#[test]
fn test_threshold_boundary_values() {
    let config = PipelineConfig::builder()
        .required_columns(["Popularity"])
        .build()
        .unwrap();
    let df = df!["Popularity" => [79.999, 80.0, 100.0]].unwrap();

    let (cleaned, _) = clean(df, &config).unwrap();

    assert_eq!(
        i64_column(&cleaned, "Viral"),
        vec![Some(0), Some(1), Some(1)]
    );
}

// ============================================================================
// Export and Reporting
// ============================================================================

#[test]
fn test_export_round_trip() {
    let (mut cleaned, _) = clean(load_fixture("songs.csv"), &PipelineConfig::default()).unwrap();
    let dir = temp_dir("export");
    let path = dir.join("cleaned_spotify_data.csv");

    let written = io::write_csv(&mut cleaned, &path, b',').unwrap();
    let reloaded = io::load_csv(&written).unwrap();

    assert_eq!(reloaded.shape(), cleaned.shape());
    assert_eq!(i64_column(&reloaded, "Viral"), i64_column(&cleaned, "Viral"));
    assert_eq!(
        i64_column(&reloaded, "Explicit"),
        i64_column(&cleaned, "Explicit")
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_analysis_report_for_songs() {
    let config = PipelineConfig::default();
    let result = Pipeline::builder()
        .config(config.clone())
        .build()
        .unwrap()
        .process(load_fixture("songs.csv"))
        .unwrap();

    let report =
        ReportGenerator::build_analysis_report("songs.csv", None, &result, &config).unwrap();
    let stats = &report.statistics;

    assert_eq!(stats.distributions.len(), 9);
    assert_eq!(stats.correlation.columns.len(), 10);
    assert_eq!(stats.correlation.get("Viral", "Viral"), Some(1.0));

    let genres = stats.top_viral_genres.as_ref().unwrap();
    let ranked: Vec<(&str, usize)> = genres.iter().map(|g| (g.genre.as_str(), g.count)).collect();
    assert_eq!(ranked, vec![("pop", 2), ("edm", 1)]);

    let energy = &stats.distributions[0];
    assert_eq!(energy.feature, "Energy");
    assert_eq!(energy.viral.count, 3);
    assert_eq!(energy.non_viral.count, 3);
    assert_eq!(energy.viral.max, Some(0.92));
}

#[test]
fn test_report_written_as_json() {
    let config = PipelineConfig::default();
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .process(load_fixture("songs.csv"))
        .unwrap();
    let report =
        ReportGenerator::build_analysis_report("songs.csv", None, &result, &config).unwrap();
    let dir = temp_dir("report");

    let path = ReportGenerator::new(&dir)
        .write_report_to_file(&report, "songs")
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["cleaning"]["rows_after"], 6);
    assert_eq!(json["statistics"]["top_viral_genres"][0]["genre"], "pop");

    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================================
// Progress Reporting
// ============================================================================

#[test]
fn test_progress_updates_cover_all_stages() {
    let count = Arc::new(AtomicUsize::new(0));
    let stages = Arc::new(Mutex::new(Vec::new()));
    let count_clone = count.clone();
    let stages_clone = stages.clone();

    Pipeline::builder()
        .on_progress(move |update| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            let mut stages = stages_clone.lock().unwrap();
            if stages.last() != Some(&update.stage) {
                stages.push(update.stage);
            }
        })
        .build()
        .unwrap()
        .process(load_fixture("songs.csv"))
        .unwrap();

    assert!(count.load(Ordering::SeqCst) >= 7);
    assert_eq!(
        *stages.lock().unwrap(),
        vec![
            PipelineStage::Initializing,
            PipelineStage::Validating,
            PipelineStage::Deduplicating,
            PipelineStage::DroppingIncomplete,
            PipelineStage::NormalizingExplicit,
            PipelineStage::Labeling,
            PipelineStage::Complete,
        ]
    );
}
