use chrono::{DateTime, Utc};
use forecast_frame::models::linear_ar::LinearAr;
use forecast_frame::models::seasonal_naive::SeasonalNaive;
use forecast_frame::models::{ForecastModel, RawPredictions, TrainedForecastModel};
use forecast_frame::reshape::{latest_forecast, origin_indexed, target_indexed, ReshapeOptions};
use forecast_frame::utils::{date_parser, Frequency};
use forecast_frame::TimeSeriesData;
use pretty_assertions::assert_eq;
use rstest::rstest;

// Helper: monthly series with trend and a yearly pattern
fn monthly_series(n: usize) -> TimeSeriesData {
    let start = date_parser::parse_date("2010-01-01").unwrap();
    let dates: Vec<DateTime<Utc>> = (0..n)
        .map(|i| Frequency::Monthly.advance(start, i).unwrap())
        .collect();
    let values: Vec<f64> = (0..n)
        .map(|i| 10.0 + 0.5 * i as f64 + (i % 12) as f64)
        .collect();
    TimeSeriesData::new(dates, values).unwrap()
}

// Helper: daily series repeating with the given period
fn periodic_daily_series(n: usize, period: usize) -> TimeSeriesData {
    let start = date_parser::parse_date("2023-01-01").unwrap();
    let dates: Vec<DateTime<Utc>> = (0..n)
        .map(|i| Frequency::Daily.advance(start, i).unwrap())
        .collect();
    let values: Vec<f64> = (0..n).map(|i| 100.0 + (i % period) as f64 * 5.0).collect();
    TimeSeriesData::new(dates, values).unwrap()
}

fn ds_millis(df: &polars::prelude::DataFrame) -> Vec<i64> {
    df.column("ds")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

fn float_col(df: &polars::prelude::DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

#[test]
fn target_indexed_boundary_of_monthly_series() {
    // 144-row monthly series, 5 lagged inputs, 3-step horizon
    let data = monthly_series(144);
    let model = LinearAr::new(5, 3).unwrap();
    let trained = model.train(&data).unwrap();
    let raw = trained.predict(&data).unwrap();

    let fcst = target_indexed(&data, &raw, &ReshapeOptions::default()).unwrap();
    assert_eq!(fcst.height(), 144);

    let yhat1 = float_col(&fcst, "yhat1");
    let yhat2 = float_col(&fcst, "yhat2");
    let yhat3 = float_col(&fcst, "yhat3");

    // The last row keeps only the oldest prediction
    assert!(yhat1[143].is_none());
    assert!(yhat2[143].is_none());
    assert!(yhat3[143].is_some());

    // One step back, yhat2 appears as well
    assert!(yhat1[142].is_none());
    assert!(yhat2[142].is_some());
    assert!(yhat3[142].is_some());

    // Interior rows carry all three ages
    assert!(yhat1[141].is_some());
    assert!(yhat2[141].is_some());
    assert!(yhat3[141].is_some());

    // Leading edge: the first target only has the freshest prediction
    for row in 0..5 {
        assert!(yhat1[row].is_none());
        assert!(yhat2[row].is_none());
        assert!(yhat3[row].is_none());
    }
    assert!(yhat1[5].is_some());
    assert!(yhat2[5].is_none());
    assert!(yhat2[6].is_some());
    assert!(yhat3[6].is_none());
    assert!(yhat3[7].is_some());
}

#[test]
fn origin_and_target_views_are_consistent() {
    let data = monthly_series(60);
    let model = LinearAr::new(4, 3).unwrap();
    let trained = model.train(&data).unwrap();
    let raw = trained.predict(&data).unwrap();

    let options = ReshapeOptions::default();
    let by_target = target_indexed(&data, &raw, &options).unwrap();
    let by_origin = origin_indexed(&raw, &options).unwrap();

    assert_eq!(by_origin.height(), raw.n_origins());

    let target_ds = ds_millis(&by_target);
    for origin in 0..raw.n_origins() {
        for step in 0..raw.n_forecasts() {
            let step_col = float_col(&by_origin, &format!("step{}", step));
            let value = step_col[origin].unwrap();

            // The same prediction reached via the opposite indexing
            let target_ts = raw.targets()[origin][step].timestamp_millis();
            let row = target_ds.iter().position(|&ts| ts == target_ts).unwrap();
            let yhat_col = float_col(&by_target, &format!("yhat{}", step + 1));
            assert_eq!(yhat_col[row], Some(value));
        }
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
fn latest_forecast_keeps_requested_origins(#[case] n_previous: usize) {
    let data = monthly_series(144);
    let model = LinearAr::new(5, 3).unwrap();
    let trained = model.train(&data).unwrap();
    let raw = trained.predict(&data).unwrap();

    let latest = latest_forecast(&data, &raw, n_previous, false).unwrap();

    // ds, y, plus one column per retained origin
    assert_eq!(latest.width(), 2 + n_previous + 1);
    // Rows span the targets of the selected origins only
    assert_eq!(latest.height(), 3 + n_previous);

    // Count non-missing prediction cells per row
    let counts: Vec<usize> = (0..latest.height())
        .map(|row| {
            (0..=n_previous)
                .filter(|j| float_col(&latest, &format!("origin-{}", j))[row].is_some())
                .count()
        })
        .collect();

    // Where data permits, exactly n_previous + 1 predictions per row
    assert!(counts.contains(&(n_previous + 1)));
    // The final row only has the latest origin's last step
    assert_eq!(*counts.last().unwrap(), 1);
    assert!(float_col(&latest, "origin-0")
        .last()
        .unwrap()
        .is_some());
}

#[test]
fn latest_forecast_with_history_covers_full_timeline() {
    let data = monthly_series(144);
    let model = LinearAr::new(5, 3).unwrap();
    let trained = model.train(&data).unwrap();
    let raw = trained.predict(&data).unwrap();

    let latest = latest_forecast(&data, &raw, 1, true).unwrap();
    assert_eq!(latest.height(), 144);

    // History rows keep their observed values
    let y = float_col(&latest, "y");
    assert!(y.iter().all(|v| v.is_some()));
}

#[test]
fn decomposed_components_sum_to_prediction() {
    let data = monthly_series(72);
    let model = LinearAr::new(6, 2).unwrap();
    let trained = model.train(&data).unwrap();
    let raw = trained.predict(&data).unwrap();

    let options = ReshapeOptions {
        decompose: true,
        residuals: false,
        include_history: true,
    };

    let by_target = target_indexed(&data, &raw, &options).unwrap();
    for age in 1..=2 {
        let yhat = float_col(&by_target, &format!("yhat{}", age));
        let trend = float_col(&by_target, &format!("trend{}", age));
        let ar = float_col(&by_target, &format!("ar{}", age));

        for row in 0..by_target.height() {
            match (yhat[row], trend[row], ar[row]) {
                (Some(total), Some(t), Some(a)) => {
                    assert!((total - (t + a)).abs() < 1e-9);
                }
                (None, None, None) => {}
                other => panic!("Components out of sync at row {}: {:?}", row, other),
            }
        }
    }

    let by_origin = origin_indexed(&raw, &options).unwrap();
    for step in 0..2 {
        let total = float_col(&by_origin, &format!("step{}", step));
        let trend = float_col(&by_origin, &format!("trend{}", step));
        let ar = float_col(&by_origin, &format!("ar{}", step));
        for row in 0..by_origin.height() {
            assert!((total[row].unwrap() - (trend[row].unwrap() + ar[row].unwrap())).abs() < 1e-9);
        }
    }
}

#[test]
fn residual_columns_match_prediction_minus_observed() {
    let data = monthly_series(72);
    let model = LinearAr::new(4, 2).unwrap();
    let trained = model.train(&data).unwrap();
    let raw = trained.predict(&data).unwrap();

    let options = ReshapeOptions {
        decompose: false,
        residuals: true,
        include_history: true,
    };
    let fcst = target_indexed(&data, &raw, &options).unwrap();

    let y = float_col(&fcst, "y");
    for age in 1..=2 {
        let yhat = float_col(&fcst, &format!("yhat{}", age));
        let residual = float_col(&fcst, &format!("residual{}", age));
        for row in 0..fcst.height() {
            match (yhat[row], y[row]) {
                (Some(p), Some(a)) => {
                    assert!((residual[row].unwrap() - (p - a)).abs() < 1e-12);
                }
                _ => assert!(residual[row].is_none()),
            }
        }
    }
}

#[test]
fn out_of_sample_forecast_extends_past_history() {
    let data = monthly_series(48);
    let model = LinearAr::new(5, 3).unwrap();
    let trained = model.train(&data).unwrap();
    let raw = trained.forecast().unwrap();

    assert_eq!(raw.n_origins(), 1);

    let options = ReshapeOptions {
        decompose: false,
        residuals: false,
        include_history: false,
    };
    let fcst = target_indexed(&data, &raw, &options).unwrap();

    // Three future rows, no observed values, one age each
    assert_eq!(fcst.height(), 3);
    let y = float_col(&fcst, "y");
    assert!(y.iter().all(|v| v.is_none()));

    for (row, age) in (1..=3).enumerate() {
        for k in 1..=3 {
            let col = float_col(&fcst, &format!("yhat{}", k));
            assert_eq!(col[row].is_some(), k == age);
        }
    }

    // Future timestamps continue the monthly spacing
    let last_observed = data.timestamps().unwrap()[47];
    assert_eq!(
        raw.targets()[0][0],
        Frequency::Monthly.advance(last_observed, 1).unwrap()
    );
}

#[test]
fn manual_predictions_only_populate_matching_ages() {
    let start = date_parser::parse_date("2024-01-01").unwrap();
    let dates: Vec<DateTime<Utc>> = (0..6)
        .map(|i| Frequency::Daily.advance(start, i).unwrap())
        .collect();
    let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let data = TimeSeriesData::new(dates.clone(), values).unwrap();

    // Two origins forecasting two steps each: targets (d1, d2) and (d3, d4)
    let targets = vec![
        vec![dates[1], dates[2]],
        vec![dates[3], dates[4]],
    ];
    let raw = RawPredictions::new(targets, vec![vec![10.0, 20.0], vec![30.0, 40.0]], 2).unwrap();

    let fcst = target_indexed(&data, &raw, &ReshapeOptions::default()).unwrap();
    assert_eq!(fcst.height(), 6);

    let yhat1 = float_col(&fcst, "yhat1");
    let yhat2 = float_col(&fcst, "yhat2");

    assert_eq!(yhat1[1], Some(10.0));
    assert_eq!(yhat2[2], Some(20.0));
    assert_eq!(yhat1[3], Some(30.0));
    assert_eq!(yhat2[4], Some(40.0));

    // No other cell is populated
    let populated: usize = yhat1.iter().chain(yhat2.iter()).filter(|v| v.is_some()).count();
    assert_eq!(populated, 4);
}

#[test]
fn seasonal_naive_reproduces_periodic_data() {
    let data = periodic_daily_series(40, 4);
    let model = SeasonalNaive::new(4, 2).unwrap();
    let trained = model.train(&data).unwrap();
    let raw = trained.predict(&data).unwrap();

    let fcst = target_indexed(&data, &raw, &ReshapeOptions::default()).unwrap();
    let y = float_col(&fcst, "y");
    for age in 1..=2 {
        let yhat = float_col(&fcst, &format!("yhat{}", age));
        for row in 0..fcst.height() {
            if let Some(pred) = yhat[row] {
                assert_eq!(Some(pred), y[row]);
            }
        }
    }
}

#[test]
fn reshaping_requires_predictions() {
    let data = monthly_series(24);
    let raw = RawPredictions::new(Vec::new(), Vec::new(), 2).unwrap();

    let result = target_indexed(&data, &raw, &ReshapeOptions::default());
    assert!(matches!(
        result,
        Err(forecast_frame::ForecastError::ReshapeError(_))
    ));
}
