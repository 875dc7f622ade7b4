use logspace_hmm::{HiddenMarkovModel, TrainConfig, Verbosity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Two hidden regimes emitting three symbols; the sequence alternates
    // between runs dominated by symbol 0 and runs dominated by symbol 2.
    let observations: Vec<usize> = [0, 0, 1, 0, 0, 2, 2, 1, 2, 2]
        .iter()
        .cycle()
        .take(200)
        .copied()
        .collect();

    let mut hmm = HiddenMarkovModel::builder(2, 3).with_seed(123).build()?;
    println!("Initial model\n{hmm}");

    let config = TrainConfig::new()
        .with_max_iterations(100)
        .with_tolerance(1e-3)
        .with_verbosity(Verbosity::Progress);
    let summary = hmm.train(&observations, &config)?;
    println!(
        "Trained for {} iterations (converged: {}, last deviation {:.6})",
        summary.iterations, summary.converged, summary.deviation
    );
    println!("{hmm}");

    let mut decoder = hmm.decoder();
    decoder.start(&observations[..5])?;
    let decoded = decoder.extend(&observations[5..10])?;
    println!("Observations: {:?}", &observations[..10]);
    println!("Viterbi path: {:?}", decoded.viterbi);
    println!("Filtered state distribution: {:.4}", decoded.forward);

    Ok(())
}
