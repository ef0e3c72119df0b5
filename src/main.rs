use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use no2_forecast::utils::input::{parse_date, prompt_manual_input};
use no2_forecast::{
    load_series, ExtrapolationPolicy, ManualInput, PlottersRenderer, PredictionPipeline,
    Predictor, SeriesRenderer,
};

#[derive(Parser)]
#[command(name = "no2-forecast")]
#[command(about = "NO2 concentration prediction from a pretrained model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Historical series CSV (t, day_index, NO2, NO2_scaled)
    #[arg(long, global = true, default_value = "data_no2.csv")]
    data: PathBuf,

    /// Bincode model bundle (regressor + scaler)
    #[arg(long, global = true, default_value = "model.bin")]
    model: PathBuf,

    /// Verbosity level, overridden by RUST_LOG
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Reject manual targets before the first observation
    #[arg(long, global = true)]
    reject_before_origin: bool,

    /// Reject manual targets more than N days past the last observation
    #[arg(long, global = true)]
    max_days_ahead: Option<i64>,
}

#[derive(Args)]
#[group(multiple = false)]
struct Target {
    /// Day index counted from the first observation
    #[arg(long, allow_hyphen_values = true)]
    index: Option<i64>,

    /// Calendar date (YYYY-MM-DD or DD-MM-YYYY)
    #[arg(long)]
    date: Option<String>,
}

impl Target {
    fn to_input(&self) -> Result<Option<ManualInput>> {
        if let Some(index) = self.index {
            return Ok(Some(ManualInput::Index(index)));
        }
        match &self.date {
            Some(date) => Ok(Some(ManualInput::Date(parse_date(date)?))),
            None => Ok(None),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the day after the last observation
    Next,

    /// Predict an arbitrary day index or date
    Manual {
        #[command(flatten)]
        target: Target,
    },

    /// Prompt for a day index or date
    Interactive,

    /// Show the category thresholds of the series
    Thresholds,

    /// Draw the series, the model fit and the predictions
    Plot {
        /// Output PNG path
        #[arg(short, long, default_value = "prediction_plot.png")]
        output: PathBuf,

        #[command(flatten)]
        target: Target,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let series = load_series(&cli.data)
        .with_context(|| format!("loading series from {}", cli.data.display()))?;
    let predictor = Predictor::load(&cli.model);
    let policy = ExtrapolationPolicy {
        allow_before_origin: !cli.reject_before_origin,
        max_days_ahead: cli.max_days_ahead,
    };
    let pipeline = PredictionPipeline::new(series, predictor)?.with_policy(policy);

    match cli.command {
        Commands::Next => {
            pipeline.predict_next_day()?.display();
        }
        Commands::Manual { target } => {
            let Some(input) = target.to_input()? else {
                bail!("pass --index or --date");
            };
            pipeline.predict_manual(input)?.display();
        }
        Commands::Interactive => {
            let mut reader = io::stdin().lock();
            let mut writer = io::stdout();
            loop {
                let input = prompt_manual_input(&mut reader, &mut writer)?;
                match pipeline.predict_manual(input) {
                    Ok(result) => {
                        result.display();
                        break;
                    }
                    Err(e) if e.is_recoverable() => println!("{}", e),
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Commands::Thresholds => {
            let thresholds = pipeline.thresholds();
            println!("Median (good limit): {:.6}", thresholds.median);
            println!("Upper quartile (moderate limit): {:.6}", thresholds.upper_quartile);
        }
        Commands::Plot { output, target } => {
            let manual = match target.to_input()? {
                Some(input) => Some(pipeline.predict_manual(input)?),
                None => None,
            };
            let chart = pipeline.chart_data(manual.as_ref())?;
            PlottersRenderer::new(&output).render(&chart)?;
        }
    }

    Ok(())
}
