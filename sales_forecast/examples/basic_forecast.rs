use chrono::NaiveDate;
use sales_forecast::predictor::{RegressionTree, TreeNode};
use sales_forecast::{DateRange, ForecastService, HistoryStore, RegressionForest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Basic Example");
    println!("=============================\n");

    // Weekends sell more; the second tree adds a month-end bump
    let model = RegressionForest::new(vec![
        RegressionTree {
            nodes: vec![
                TreeNode::split(2, 4.5, 1, 2),
                TreeNode::leaf(120.0),
                TreeNode::leaf(180.0),
            ],
        },
        RegressionTree {
            nodes: vec![
                TreeNode::split(0, 25.5, 1, 2),
                TreeNode::leaf(130.0),
                TreeNode::leaf(160.0),
            ],
        },
    ])?;

    let dir = std::env::temp_dir().join("sales_forecast_example");
    let store = HistoryStore::new(dir.join("riwayat_prediksi.csv"));
    store.clear()?;
    let service = ForecastService::new(model, store);

    let first = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )?;
    let batch = service.forecast_and_record(&first)?;
    println!("Forecast created at {}", batch.created_at());
    println!("{}", batch.to_dataframe()?);

    let second = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
    )?;
    service.forecast_and_record(&second)?;

    let history = service.history()?;
    println!(
        "\nHistory holds {} forecasts from {} runs",
        history.len(),
        history.runs().len()
    );
    println!("{}", history.to_dataframe()?);

    service.clear_history()?;
    println!("History cleared: {} entries left", service.history()?.len());

    Ok(())
}
