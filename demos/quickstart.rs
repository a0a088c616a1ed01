use chrono::{DateTime, Utc};
use forecast_frame::models::linear_ar::LinearAr;
use forecast_frame::models::{ForecastModel, TrainedForecastModel};
use forecast_frame::reshape::{self, ReshapeOptions};
use forecast_frame::utils::{date_parser, Frequency};
use forecast_frame::TimeSeriesData;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Forecast Frame: Quickstart");
    println!("==========================\n");

    // Create a monthly sample series with trend and a yearly pattern
    println!("Creating sample data...");
    let data = create_sample_monthly_data()?;
    println!("Sample data created: {} monthly points\n", data.len());

    // Fit a model with 5 lagged inputs and a 3-step horizon
    println!("Training model...");
    let model = LinearAr::new(5, 3)?;
    let trained = model.train(&data)?;
    println!("Model trained: {}\n", trained.name());

    // In-sample predictions, reshaped into the target-indexed view
    let raw = trained.predict(&data)?;
    println!(
        "Raw predictions: {} origins x {} steps\n",
        raw.n_origins(),
        raw.n_forecasts()
    );

    let options = ReshapeOptions {
        decompose: true,
        residuals: true,
        include_history: true,
    };
    let by_target = reshape::target_indexed(&data, &raw, &options)?;
    println!("Target-indexed forecast table (tail):");
    println!("{}", by_target.tail(Some(6)));

    // The same predictions addressed by forecast origin
    let by_origin = reshape::origin_indexed(&raw, &options)?;
    println!("\nOrigin-indexed forecast table (tail):");
    println!("{}", by_origin.tail(Some(4)));

    // Only the latest forecast, keeping the two previous ones
    let latest = reshape::latest_forecast(&data, &raw, 2, false)?;
    println!("\nLatest forecast with two previous origins:");
    println!("{}", latest);

    // Out-of-sample forecast past the end of the series
    let future = trained.forecast()?;
    let future_table = reshape::target_indexed(
        &data,
        &future,
        &ReshapeOptions {
            include_history: false,
            ..ReshapeOptions::default()
        },
    )?;
    println!("\nOut-of-sample forecast:");
    println!("{}", future_table);

    Ok(())
}

fn create_sample_monthly_data() -> Result<TimeSeriesData, Box<dyn std::error::Error>> {
    let start = date_parser::parse_date("2012-01-01")?;
    let n = 144;

    let mut dates: Vec<DateTime<Utc>> = Vec::with_capacity(n);
    for i in 0..n {
        dates.push(Frequency::Monthly.advance(start, i)?);
    }

    let values: Vec<f64> = (0..n)
        .map(|i| {
            let trend = 200.0 + 1.5 * i as f64;
            let seasonal = 25.0 * (2.0 * std::f64::consts::PI * (i % 12) as f64 / 12.0).sin();
            trend + seasonal
        })
        .collect();

    Ok(TimeSeriesData::new(dates, values)?)
}
