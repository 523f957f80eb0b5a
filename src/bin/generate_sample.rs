use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_PARTICIPANTS: usize = 2000;
const TABLE_PATH: &str = "participants.parquet";
const SELECTION_PATH: &str = "selection.json";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick an item with probability proportional to its weight.
    fn weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut r = self.next_f64() * total;
        for &(item, w) in items {
            if r < w {
                return item;
            }
            r -= w;
        }
        items.last().map_or("", |(item, _)| item)
    }
}

struct Participant {
    sex: &'static str,
    country: &'static str,
    age: i64,
    bmi: Option<f64>,
    smoker: bool,
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let countries = [("DE", 0.35), ("FR", 0.25), ("NL", 0.2), ("SE", 0.12), ("PL", 0.08)];

    let participants: Vec<Participant> = (0..N_PARTICIPANTS)
        .map(|_| {
            let sex = rng.weighted(&[("F", 0.52), ("M", 0.48)]);
            let age = rng.gauss(52.0, 14.0).clamp(18.0, 95.0).round() as i64;
            let smoker = rng.next_f64() < if age < 40 { 0.3 } else { 0.18 };
            let base = if sex == "M" { 27.0 } else { 25.5 };
            // Roughly one in twenty BMI measurements is missing.
            let bmi = (rng.next_f64() > 0.05)
                .then(|| (base + 0.04 * (age as f64 - 50.0) + rng.gauss(0.0, 3.5)).max(15.0));
            Participant {
                sex,
                country: rng.weighted(&countries),
                age,
                bmi,
                smoker,
            }
        })
        .collect();

    // Older participants from two countries are over-represented in the selection.
    let selection: Vec<usize> = participants
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            let p_keep = match (p.country, p.age >= 60) {
                ("DE" | "NL", true) => 0.6,
                ("DE" | "NL", false) => 0.25,
                (_, true) => 0.3,
                (_, false) => 0.1,
            };
            rng.next_f64() < p_keep
        })
        .map(|(i, _)| i)
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("participant_id", DataType::Int64, false),
        Field::new("sex", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("age", DataType::Int64, false),
        Field::new("bmi", DataType::Float64, true),
        Field::new("smoker", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(0..N_PARTICIPANTS as i64)),
            Arc::new(StringArray::from_iter_values(participants.iter().map(|p| p.sex))),
            Arc::new(StringArray::from_iter_values(
                participants.iter().map(|p| p.country),
            )),
            Arc::new(Int64Array::from_iter_values(participants.iter().map(|p| p.age))),
            Arc::new(Float64Array::from(
                participants.iter().map(|p| p.bmi).collect::<Vec<_>>(),
            )),
            Arc::new(BooleanArray::from(
                participants.iter().map(|p| p.smoker).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let file = std::fs::File::create(TABLE_PATH)
        .with_context(|| format!("creating {TABLE_PATH}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    let json = serde_json::to_string(&selection)?;
    std::fs::write(SELECTION_PATH, json).with_context(|| format!("writing {SELECTION_PATH}"))?;

    println!(
        "Wrote {N_PARTICIPANTS} participants to {TABLE_PATH} and a selection of {} to {SELECTION_PATH}",
        selection.len()
    );
    Ok(())
}
