use chrono::NaiveDate;
use rstest::rstest;
use sales_forecast::features::{FEATURE_COUNT, FEATURE_NAMES};
use sales_forecast::{DateRange, FeatureBuilder, FeatureRow, ForecastError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[rstest]
#[case(date(2024, 1, 1), 0)] // Monday
#[case(date(2024, 1, 6), 5)] // Saturday
#[case(date(2024, 1, 7), 6)] // Sunday
#[case(date(2024, 2, 29), 3)] // Thursday, leap day
fn test_day_of_week_starts_monday(#[case] day: NaiveDate, #[case] expected: u32) {
    assert_eq!(FeatureRow::from_date(day).day_of_week, expected);
}

#[test]
fn test_feature_row_fields() {
    let row = FeatureRow::from_date(date(2023, 12, 31));
    assert_eq!(row.day, 31);
    assert_eq!(row.month, 12);
    assert_eq!(row.day_of_week, 6);
    assert_eq!(row.values(), [31.0, 12.0, 6.0]);
    assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
}

#[test]
fn test_build_covers_range_inclusive() {
    let range = DateRange::new(date(2024, 1, 30), date(2024, 2, 2)).unwrap();
    let rows = FeatureBuilder::build(&range).unwrap();

    assert_eq!(range.num_days(), 4);
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows.iter().map(|r| (r.day, r.month)).collect::<Vec<_>>(),
        vec![(30, 1), (31, 1), (1, 2), (2, 2)]
    );
}

#[test]
fn test_single_day_range() {
    let range = DateRange::new(date(2024, 3, 15), date(2024, 3, 15)).unwrap();
    let dated = FeatureBuilder::build_dated(&range).unwrap();
    assert_eq!(dated.len(), 1);
    assert_eq!(dated[0].0, date(2024, 3, 15));
}

#[test]
fn test_range_across_year_end() {
    let range = DateRange::new(date(2023, 12, 30), date(2024, 1, 2)).unwrap();
    let dates: Vec<NaiveDate> = range.dates().collect();
    assert_eq!(
        dates,
        vec![
            date(2023, 12, 30),
            date(2023, 12, 31),
            date(2024, 1, 1),
            date(2024, 1, 2)
        ]
    );
}

#[test]
fn test_reversed_range_rejected() {
    let result = DateRange::new(date(2024, 1, 3), date(2024, 1, 1));
    match result {
        Err(ForecastError::InvalidRange { start, end }) => {
            assert_eq!(start, date(2024, 1, 3));
            assert_eq!(end, date(2024, 1, 1));
        }
        other => panic!("Expected InvalidRange, got {:?}", other),
    }
}

#[test]
fn test_deserialized_reversed_range_rejected_by_builder() {
    let range: DateRange =
        serde_json::from_str(r#"{"start":"2024-01-05","end":"2024-01-01"}"#).unwrap();
    assert!(matches!(
        FeatureBuilder::build(&range),
        Err(ForecastError::InvalidRange { .. })
    ));
}
