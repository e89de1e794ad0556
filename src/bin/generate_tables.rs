use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

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

/// A slightly oblate fabric with the minor axis near vertical, perturbed
/// per specimen. Components are kept trace-normalized like real MagIC data.
fn synthetic_tensor(rng: &mut SimpleRng) -> [f64; 6] {
    let spread = 0.004;
    let mut s = [
        0.335 + rng.gauss(0.0, spread),
        0.334 + rng.gauss(0.0, spread),
        0.331 + rng.gauss(0.0, spread),
        rng.gauss(0.0, 0.001),
        rng.gauss(0.0, 0.001),
        rng.gauss(0.0, 0.001),
    ];
    let trace = s[0] + s[1] + s[2];
    for v in &mut s[..3] {
        *v /= trace;
    }
    s
}

fn magic_writer(dir: &Path, name: &str, table: &str) -> Result<csv::Writer<File>> {
    let path = dir.join(name);
    let mut file =
        File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "tab\t{table}")?;
    Ok(csv::WriterBuilder::new().delimiter(b'\t').from_writer(file))
}

fn main() -> Result<()> {
    env_logger::init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| "sample_data".into());
    let dir = Path::new(&dir);
    std::fs::create_dir_all(dir)?;

    let mut rng = SimpleRng::new(42);

    let location = "Synthetic Hole A";
    let n_sites = 30;
    let specimens_per_sample = 2;

    // ---- sites ----
    let mut sites = magic_writer(dir, "sites.txt", "sites")?;
    sites.write_record(["site", "location", "core_depth"])?;
    for i in 0..n_sites {
        let depth = 2.0 + i as f64 * 3.5;
        sites.write_record([format!("st{i:02}"), location.into(), format!("{depth:.2}")])?;
    }
    sites.flush()?;

    // ---- samples ----
    let mut samples = magic_writer(dir, "samples.txt", "samples")?;
    samples.write_record(["sample", "site", "core_depth"])?;
    for i in 0..n_sites {
        let depth = 2.0 + i as f64 * 3.5 + rng.gauss(0.0, 0.2);
        samples.write_record([
            format!("sa{i:02}"),
            format!("st{i:02}"),
            format!("{depth:.2}"),
        ])?;
    }
    samples.flush()?;

    // ---- specimens ----
    let mut specimens = magic_writer(dir, "specimens.txt", "specimens")?;
    specimens.write_record([
        "specimen",
        "sample",
        "aniso_s",
        "aniso_s_n_measurements",
        "aniso_s_sigma",
    ])?;
    let mut specimen_names = Vec::new();
    for i in 0..n_sites {
        for j in 0..specimens_per_sample {
            let s = synthetic_tensor(&mut rng);
            let aniso_s = s
                .iter()
                .map(|v| format!("{v:.6}"))
                .collect::<Vec<_>>()
                .join(":");
            let name = format!("sp{i:02}{}", (b'a' + j as u8) as char);
            specimens.write_record([
                name.clone(),
                format!("sa{i:02}"),
                aniso_s,
                "15".into(),
                format!("{:.5}", 0.001 + rng.next_f64() * 0.002),
            ])?;
            specimen_names.push(name);
        }
    }
    specimens.flush()?;

    // ---- measurements (bulk susceptibility) ----
    let mut measurements = magic_writer(dir, "measurements.txt", "measurements")?;
    measurements.write_record(["measurement", "specimen", "susc_chi_volume"])?;
    for (k, name) in specimen_names.iter().enumerate() {
        let chi = 2.0e-4 + rng.gauss(0.0, 4.0e-5);
        measurements.write_record([
            format!("m{k:03}"),
            name.clone(),
            format!("{chi:.3e}"),
        ])?;
    }
    measurements.flush()?;

    println!(
        "wrote {} sites, {} specimens to {}",
        n_sites,
        specimen_names.len(),
        dir.display()
    );
    Ok(())
}
