use sales_forecast::predictor::{RegressionTree, TreeNode};
use sales_forecast::{FeatureRow, ForecastError, Predictor, RegressionForest};
use std::io::Write;
use tempfile::NamedTempFile;

const FOREST_JSON: &str = r#"{
    "feature_names": ["day", "month", "dayofweek"],
    "trees": [
        {"nodes": [
            {"feature": 2, "threshold": 4.5, "left": 1, "right": 2},
            {"value": 10.0},
            {"value": 20.0}
        ]},
        {"nodes": [
            {"feature": 0, "threshold": 15.5, "left": 1, "right": 2},
            {"value": 12.0},
            {"value": 16.0}
        ]}
    ]
}"#;

fn row(day: u32, month: u32, day_of_week: u32) -> FeatureRow {
    FeatureRow {
        day,
        month,
        day_of_week,
    }
}

#[test]
fn test_forest_averages_trees() {
    let forest = RegressionForest::from_json_str(FOREST_JSON).unwrap();
    assert_eq!(forest.len(), 2);

    let predictions = forest
        .predict(&[row(1, 1, 0), row(20, 1, 0), row(1, 1, 6), row(20, 1, 6)])
        .unwrap();
    assert_eq!(predictions, vec![11.0, 13.0, 16.0, 18.0]);
}

#[test]
fn test_forest_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", FOREST_JSON).unwrap();

    let forest = RegressionForest::from_json_file(file.path()).unwrap();
    assert_eq!(forest.name(), "Regression Forest");
    assert_eq!(forest.predict(&[]).unwrap(), Vec::<f64>::new());
}

#[test]
fn test_missing_artifact_is_model_error() {
    let result = RegressionForest::from_json_file("/nonexistent/model_rf.json");
    assert!(matches!(result, Err(ForecastError::ModelError(_))));
}

#[test]
fn test_invalid_artifacts_rejected() {
    let cases = [
        r#"{"trees": []}"#,
        r#"{"trees": [{"nodes": []}]}"#,
        r#"{"trees": [{"nodes": [{"feature": 7, "threshold": 1.0, "left": 1, "right": 2}, {"value": 1.0}, {"value": 2.0}]}]}"#,
        r#"{"trees": [{"nodes": [{"feature": 0, "threshold": 1.0, "left": 1, "right": 9}, {"value": 1.0}]}]}"#,
        r#"{"trees": [{"nodes": [{"feature": 0, "left": 1, "right": 2}, {"value": 1.0}, {"value": 2.0}]}]}"#,
        r#"{"feature_names": ["month", "day", "dayofweek"], "trees": [{"nodes": [{"value": 1.0}]}]}"#,
        r#"not json"#,
    ];

    for json in cases {
        assert!(
            matches!(
                RegressionForest::from_json_str(json),
                Err(ForecastError::ModelError(_))
            ),
            "accepted invalid model: {}",
            json
        );
    }
}

#[test]
fn test_forest_built_in_code() {
    let forest = RegressionForest::new(vec![RegressionTree {
        nodes: vec![TreeNode::leaf(7.25)],
    }])
    .unwrap();
    assert_eq!(forest.predict(&[row(3, 4, 2)]).unwrap(), vec![7.25]);
}

#[test]
fn test_closure_predictor() {
    let predictor = |rows: &[FeatureRow]| -> sales_forecast::Result<Vec<f64>> {
        Ok(rows.iter().map(|r| r.day as f64 * 2.0).collect())
    };
    assert_eq!(predictor.predict(&[row(4, 1, 3)]).unwrap(), vec![8.0]);
    assert_eq!(Predictor::name(&predictor), "predictor");
}
