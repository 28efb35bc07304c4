use acsurvey_core::{IDLE_FACTOR_FLOOR, SurveySample, survey_interference_factor};

pub fn run(busy: u64, tx: u64, total: u64, nf: i8, min_nf: Option<i8>) -> i32 {
    let sample = SurveySample::new(total, busy, tx, nf);
    let min_nf = min_nf.unwrap_or(nf);

    println!("Sample: total={total} busy={busy} tx={tx} nf={nf} dBm (sweep min {min_nf} dBm)");
    match survey_interference_factor(&sample, min_nf) {
        Some(factor) if factor <= IDLE_FACTOR_FLOOR => {
            println!("  Interference factor: {factor:.6} (idle apart from own traffic)");
            0
        }
        Some(factor) => {
            println!("  Interference factor: {factor:.6}");
            0
        }
        None => {
            eprintln!("  Degenerate sample: needs total > tx and busy >= tx");
            1
        }
    }
}
