//! Writes `sample_messy.csv`: a small table with the kind of dirt the
//! cleaning buttons exist for (duplicate rows, blank numbers, mixed case,
//! punctuation in free text).

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const NAMES: [&str; 8] = [
    "Alice", "BOB", "carol", "Dave", "Eve!", "Frank", "Grace", "heidi",
];
const CITIES: [&str; 6] = [
    "São Paulo",
    "New York",
    "london",
    "PARIS",
    "Berlin #2",
    "Tokyo (HQ)",
];

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let output_path = "sample_messy.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["name", "city", "age", "salary", "member"])?;

    let mut rows: Vec<[String; 5]> = Vec::new();
    for _ in 0..40 {
        let age = if rng.chance(0.15) {
            String::new()
        } else {
            format!("{}", rng.gauss(38.0, 9.0).round().max(18.0) as i64)
        };
        let salary = if rng.chance(0.1) {
            "NA".to_string()
        } else {
            format!("{:.2}", rng.gauss(52_000.0, 12_000.0).max(0.0))
        };
        let member = if rng.chance(0.5) { "True" } else { "False" };
        let row = [
            rng.pick(&NAMES).to_string(),
            rng.pick(&CITIES).to_string(),
            age,
            salary,
            member.to_string(),
        ];

        // Every so often repeat the previous row verbatim.
        if rng.chance(0.2) {
            if let Some(prev) = rows.last().cloned() {
                rows.push(prev);
            }
        }
        rows.push(row);
    }

    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    log::info!("Wrote {} rows to {output_path}", rows.len());
    println!("Wrote {} rows to {output_path}", rows.len());
    Ok(())
}
