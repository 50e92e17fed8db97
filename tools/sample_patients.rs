//! Sample Patient Generator
//!
//! Prints random `/predict` payloads as JSON lines for manual testing:
//!
//! ```bash
//! cargo run --bin sample-patients -- 20 0.3 | while read -r body; do
//!   curl -s -H 'content-type: application/json' -d "$body" localhost:8000/predict; echo
//! done
//! ```

use heart_risk_service::types::PatientRecord;
use rand::Rng;
use std::io::Write;
use tracing::info;

/// Patient generator for testing
struct PatientGenerator {
    rng: rand::rngs::ThreadRng,
}

impl PatientGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate a patient with a typical low-risk profile
    fn generate_low_risk(&mut self) -> PatientRecord {
        PatientRecord {
            age: self.rng.gen_range(29..55) as f64,
            sex: self.rng.gen_range(0..=1) as f64,
            cp: self.rng.gen_range(1..=2) as f64,
            trestbps: self.rng.gen_range(100..135) as f64,
            chol: self.rng.gen_range(150..240) as f64,
            fbs: 0.0,
            restecg: 0.0,
            thalach: self.rng.gen_range(150..200) as f64,
            exang: 0.0,
            oldpeak: round1(self.rng.gen_range(0.0..1.0)),
            slope: 2.0,
            ca: 0.0,
            thal: 2.0,
        }
    }

    /// Generate a patient with several high-risk indicators
    fn generate_high_risk(&mut self) -> PatientRecord {
        PatientRecord {
            age: self.rng.gen_range(55..78) as f64,
            sex: 1.0,
            cp: 0.0, // Typical angina
            trestbps: self.rng.gen_range(135..190) as f64,
            chol: self.rng.gen_range(240..400) as f64,
            fbs: self.rng.gen_range(0..=1) as f64,
            restecg: self.rng.gen_range(1..=2) as f64,
            thalach: self.rng.gen_range(90..140) as f64, // Low max heart rate
            exang: 1.0,
            oldpeak: round1(self.rng.gen_range(1.5..5.0)),
            slope: self.rng.gen_range(0..=1) as f64,
            ca: self.rng.gen_range(1..=3) as f64,
            thal: 3.0, // Reversible defect
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_patients=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10);
    let high_risk_rate: f64 = args
        .get(2)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.3)
        .clamp(0.0, 1.0);

    info!(count = count, high_risk_rate = high_risk_rate, "Generating patients");

    let mut generator = PatientGenerator::new();
    let mut rng = rand::thread_rng();
    let mut stdout = std::io::stdout().lock();

    let mut low_risk_count = 0;
    let mut high_risk_count = 0;

    for _ in 0..count {
        let patient = if rng.gen_bool(high_risk_rate) {
            high_risk_count += 1;
            generator.generate_high_risk()
        } else {
            low_risk_count += 1;
            generator.generate_low_risk()
        };

        serde_json::to_writer(&mut stdout, &patient)?;
        writeln!(stdout)?;
    }

    info!(
        "Completed! Generated {} patients ({} low risk, {} high risk)",
        count, low_risk_count, high_risk_count
    );

    Ok(())
}
