//! R² of a least-squares fit on standardized data equals the sum over
//! features of coefficient times correlation with the response.
//!
//! Uses the iris measurements with sepal width as the response.

use anyhow::{anyhow, ensure, Result};
use benchmarks::{init_logging, Metrics};
use linfa::prelude::*;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, Axis};

const FEATURES: [&str; 4] = ["sepal length", "sepal width", "petal length", "petal width"];
const RESPONSE: usize = 1;

/// Standardize every column of `x` independently.
fn standardize_columns(x: &Array2<f64>) -> Array2<f64> {
    let mut out = x.clone();
    for mut column in out.columns_mut() {
        let z = Metrics::standardize(&column.to_vec());
        column.assign(&Array1::from(z));
    }
    out
}

fn main() -> Result<()> {
    init_logging();

    let iris = linfa_datasets::iris();
    let records = iris.records();
    ensure!(
        records.ncols() == FEATURES.len(),
        "expected {} iris features, found {}",
        FEATURES.len(),
        records.ncols()
    );

    let predictors: Vec<usize> = (0..FEATURES.len()).filter(|&j| j != RESPONSE).collect();
    let y = Array1::from(Metrics::standardize(&records.column(RESPONSE).to_vec()));
    let x = standardize_columns(&records.select(Axis(1), &predictors));
    tracing::info!(samples = x.nrows(), response = FEATURES[RESPONSE], "fitting OLS");

    let model = LinearRegression::new()
        .fit(&Dataset::new(x.clone(), y.clone()))
        .map_err(|e| anyhow!("least squares fit failed: {e}"))?;
    let betas = model.params();
    let predictions = x.dot(betas) + model.intercept();

    let y_values = y.to_vec();
    let correlations: Vec<f64> = x
        .columns()
        .into_iter()
        .map(|column| Metrics::pearson(&column.to_vec(), &y_values))
        .collect();

    println!("Response: {}", FEATURES[RESPONSE]);
    println!();
    println!("{:<14} {:>12} {:>12} {:>14}", "feature", "corr", "beta", "beta x corr");
    println!("{}", "-".repeat(55));
    let mut decomposed = 0.0;
    for ((&j, &corr), &beta) in predictors.iter().zip(&correlations).zip(betas.iter()) {
        decomposed += beta * corr;
        println!(
            "{:<14} {:>12.6} {:>12.6} {:>14.6}",
            FEATURES[j],
            corr,
            beta,
            beta * corr
        );
    }

    let usual = Metrics::r_squared(&y_values, &predictions.to_vec());
    println!();
    println!("R² (1 - SS_res/SS_tot): {:.10}", usual);
    println!("R² (sum beta x corr):   {:.10}", decomposed);

    ensure!(
        (usual - decomposed).abs() < 1e-8,
        "decomposition disagrees: {usual} vs {decomposed}"
    );
    tracing::info!(r_squared = usual, "decomposition agrees");
    Ok(())
}
