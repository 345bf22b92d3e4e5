use anyhow::Result;

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
}

/// Idealized efficiency island: peaks along the design running line and
/// falls off towards choke and surge.
fn efficiency(speed: f64, flow: f64) -> f64 {
    let design_flow = 2.0 + 8.0 * (speed - 20_000.0) / 40_000.0;
    let spread = 0.8 + 1.2 * (speed - 20_000.0) / 40_000.0;
    let off_design = ((flow - design_flow) / spread).powi(2);
    0.86 * (-0.5 * off_design).exp() + 0.04
}

fn pressure_ratio(speed: f64, flow: f64) -> f64 {
    let base = 1.0 + 3.5 * (speed / 60_000.0).powi(2);
    base * (1.0 - 0.03 * (flow / 10.0).powi(2))
}

/// Write the sample dataset: two metadata rows (the layout the app skips
/// by default), then the header, then the test points.
fn write_sample<W: std::io::Write>(writer: &mut csv::Writer<W>) -> Result<usize> {
    let mut rng = SimpleRng::new(42);

    writer.write_record(["# synthetic compressor rig log", "", "", "", "", ""])?;
    writer.write_record(["# seed 42, five speed lines", "", "", "", "", ""])?;
    writer.write_record([
        "speed",
        "mass_flow",
        "pressure_ratio",
        "isentropic_efficiency",
        "rig",
        "operator",
    ])?;

    // Five speed lines, each traversed from near-surge to near-choke.
    let speeds = [20_000.0, 30_000.0, 40_000.0, 50_000.0, 60_000.0];
    let rigs = ["RIG-A", "RIG-B"];
    let operators = ["amy", "bruno", "carla"];
    let points_per_line = 20;

    let mut rows = 0usize;
    for (line, &speed) in speeds.iter().enumerate() {
        let flow_lo = 1.0 + 1.5 * line as f64;
        let flow_hi = 4.0 + 2.0 * line as f64;
        for i in 0..points_per_line {
            let flow = flow_lo + (flow_hi - flow_lo) * i as f64 / (points_per_line - 1) as f64;
            let measured_speed = rng.gauss(speed, 50.0);
            let measured_flow = rng.gauss(flow, 0.02);
            let eta = (efficiency(speed, flow) + rng.gauss(0.0, 0.005)).clamp(0.0, 1.0);
            let pr = pressure_ratio(speed, flow) + rng.gauss(0.0, 0.01);

            // A handful of dropouts, the way real rig logs look.
            let eta_field = if rng.next_f64() < 0.02 {
                "NA".to_string()
            } else {
                format!("{eta:.4}")
            };

            writer.write_record([
                format!("{measured_speed:.1}"),
                format!("{measured_flow:.3}"),
                format!("{pr:.3}"),
                eta_field,
                rigs[rows % rigs.len()].to_string(),
                operators[rng.next_u64() as usize % operators.len()].to_string(),
            ])?;
            rows += 1;
        }
    }
    Ok(rows)
}

fn main() -> Result<()> {
    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    let rows = write_sample(&mut writer)?;
    writer.flush()?;

    println!("Wrote {rows} test points to {output_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_word_advances() {
        let mut rng = SimpleRng::new(1);
        let before = rng.state;
        rng.next_u64();
        for i in 0..4 {
            assert_ne!(rng.state[i], before[i], "state[{i}] stuck");
        }
    }

    #[test]
    fn header_sits_after_two_metadata_rows() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_sample(&mut writer).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with('#'));
        assert!(lines[1].starts_with('#'));
        assert!(lines[2].starts_with("speed,mass_flow,"));
    }
}
