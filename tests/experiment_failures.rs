use bb84_sim::errors::{OracleError, ProtocolError};
use bb84_sim::protocols::bb84::Condition;
use bb84_sim::{
    Basis, Bit, CancelToken, DensityMatrixOracle, ExperimentConfig, IdealOracle,
    MeasurementOracle, MeasurementRequest, OracleKind, QuantumChannel, RandomSource, oracle,
    run_experiment,
};

/// Fails its first `failures_left` batches with `Unavailable`.
struct FlakyOracle {
    inner: IdealOracle,
    failures_left: usize,
}

impl MeasurementOracle for FlakyOracle {
    fn name(&self) -> &str {
        "flaky"
    }

    fn measure(&mut self, bit: Bit, prep: Basis, meas: Basis) -> Result<Bit, OracleError> {
        self.inner.measure(bit, prep, meas)
    }

    fn measure_batch(&mut self, requests: &[MeasurementRequest]) -> Result<Vec<Bit>, OracleError> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(OracleError::Unavailable("backend offline".to_string()));
        }
        self.inner.measure_batch(requests)
    }
}

/// Cancels the shared token while answering its first batch.
struct CancellingOracle {
    inner: IdealOracle,
    token: CancelToken,
}

impl MeasurementOracle for CancellingOracle {
    fn name(&self) -> &str {
        "cancelling"
    }

    fn measure(&mut self, bit: Bit, prep: Basis, meas: Basis) -> Result<Bit, OracleError> {
        self.token.cancel();
        self.inner.measure(bit, prep, meas)
    }
}

#[test]
fn failed_trial_is_retried_and_reported() {
    let config = ExperimentConfig::new(16, 3).with_max_retries(2);
    let mut rng = RandomSource::from_seed(1);
    let mut oracle = FlakyOracle {
        inner: IdealOracle::from_seed(2),
        failures_left: 2,
    };

    let summary = run_experiment(&config, &mut rng, &mut oracle, &CancelToken::new()).unwrap();

    assert_eq!(summary.without_eve.qber.len(), 3);
    assert_eq!(summary.with_eve.qber.len(), 3);
    assert_eq!(summary.failures.len(), 2);
    assert_eq!(summary.failures[0].condition, Condition::NoEavesdropper);
    assert_eq!(summary.failures[0].trial, 0);
    assert_eq!(summary.failures[0].attempt, 0);
    assert_eq!(summary.failures[1].attempt, 1);
    assert!(summary.failures[0].reason.contains("backend offline"));
}

#[test]
fn exhausted_retries_fail_the_experiment_with_counts() {
    let config = ExperimentConfig::new(16, 4).with_max_retries(1);
    let mut rng = RandomSource::from_seed(1);
    let mut oracle = FlakyOracle {
        inner: IdealOracle::from_seed(2),
        failures_left: usize::MAX,
    };

    let err = run_experiment(&config, &mut rng, &mut oracle, &CancelToken::new()).unwrap_err();

    match err {
        ProtocolError::TrialsExhausted {
            condition,
            trial,
            succeeded,
            requested,
            failures,
            source,
        } => {
            assert_eq!(condition, Condition::NoEavesdropper);
            assert_eq!(trial, 0);
            assert_eq!(succeeded, 0);
            assert_eq!(requested, 8);
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].attempt, 0);
            assert_eq!(failures[1].attempt, 1);
            assert!(failures.iter().all(|f| f.trial == 0));
            assert!(failures.iter().all(|f| f.reason.contains("backend offline")));
            assert!(matches!(
                *source,
                ProtocolError::OracleFailure(OracleError::Unavailable(_))
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failure_after_some_trials_reports_progress() {
    struct FailAfter {
        inner: IdealOracle,
        ok_batches: usize,
    }

    impl MeasurementOracle for FailAfter {
        fn name(&self) -> &str {
            "fail-after"
        }

        fn measure(&mut self, bit: Bit, prep: Basis, meas: Basis) -> Result<Bit, OracleError> {
            self.inner.measure(bit, prep, meas)
        }

        fn measure_batch(
            &mut self,
            requests: &[MeasurementRequest],
        ) -> Result<Vec<Bit>, OracleError> {
            if self.ok_batches == 0 {
                return Err(OracleError::Unavailable("quota exceeded".to_string()));
            }
            self.ok_batches -= 1;
            self.inner.measure_batch(requests)
        }
    }

    // One no-Eve trial (1 batch) and one Eve trial (2 batches) succeed.
    let config = ExperimentConfig::new(10, 3);
    let mut rng = RandomSource::from_seed(1);
    let mut oracle = FailAfter {
        inner: IdealOracle::from_seed(2),
        ok_batches: 3,
    };

    let err = run_experiment(&config, &mut rng, &mut oracle, &CancelToken::new()).unwrap_err();

    assert!(matches!(
        err,
        ProtocolError::TrialsExhausted {
            trial: 1,
            succeeded: 2,
            requested: 6,
            ..
        }
    ));
    assert!(err.to_string().contains("2 of 6 trials succeeded"));
}

#[test]
fn exhausted_error_keeps_earlier_retried_failures() {
    /// Fails batch 0 once, then every batch from `fail_from` on.
    struct Scripted {
        inner: IdealOracle,
        batch: usize,
        fail_from: usize,
    }

    impl MeasurementOracle for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn measure(&mut self, bit: Bit, prep: Basis, meas: Basis) -> Result<Bit, OracleError> {
            self.inner.measure(bit, prep, meas)
        }

        fn measure_batch(
            &mut self,
            requests: &[MeasurementRequest],
        ) -> Result<Vec<Bit>, OracleError> {
            let batch = self.batch;
            self.batch += 1;
            if batch == 0 {
                return Err(OracleError::Unavailable("transient".to_string()));
            }
            if batch >= self.fail_from {
                return Err(OracleError::Unavailable("permanent".to_string()));
            }
            self.inner.measure_batch(requests)
        }
    }

    // Batch 0 fails and is retried as batch 1; batches 2-3 are trial 0 with Eve.
    let config = ExperimentConfig::new(12, 3).with_max_retries(1);
    let mut rng = RandomSource::from_seed(5);
    let mut oracle = Scripted {
        inner: IdealOracle::from_seed(6),
        batch: 0,
        fail_from: 4,
    };

    let err = run_experiment(&config, &mut rng, &mut oracle, &CancelToken::new()).unwrap_err();

    let ProtocolError::TrialsExhausted {
        trial,
        succeeded,
        requested,
        failures,
        ..
    } = &err
    else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(*trial, 1);
    assert_eq!(*succeeded, 2);
    assert_eq!(*requested, 6);

    let reasons: Vec<(usize, usize, bool)> = failures
        .iter()
        .map(|f| (f.trial, f.attempt, f.reason.contains("transient")))
        .collect();
    assert_eq!(reasons, vec![(0, 0, true), (1, 0, false), (1, 1, false)]);
    assert!(err.to_string().contains("3 failed attempts"));
}

#[test]
fn cancellation_from_another_thread_stops_the_experiment() {
    /// Cancels the token from a separate thread while answering, as a signal
    /// handler would.
    struct Interrupted {
        inner: IdealOracle,
        token: CancelToken,
    }

    impl MeasurementOracle for Interrupted {
        fn name(&self) -> &str {
            "interrupted"
        }

        fn measure(&mut self, bit: Bit, prep: Basis, meas: Basis) -> Result<Bit, OracleError> {
            self.inner.measure(bit, prep, meas)
        }

        fn measure_batch(
            &mut self,
            requests: &[MeasurementRequest],
        ) -> Result<Vec<Bit>, OracleError> {
            let remote = self.token.clone();
            std::thread::spawn(move || remote.cancel())
                .join()
                .expect("cancel thread panicked");
            self.inner.measure_batch(requests)
        }
    }

    let token = CancelToken::new();
    let config = ExperimentConfig::new(16, 3).with_max_retries(3);
    let mut rng = RandomSource::from_seed(1);
    let mut oracle = Interrupted {
        inner: IdealOracle::from_seed(2),
        token: token.clone(),
    };

    let err = run_experiment(&config, &mut rng, &mut oracle, &token).unwrap_err();
    assert!(matches!(err, ProtocolError::CancellationRequested));
    assert!(token.is_cancelled());
}

#[test]
fn cancellation_is_not_retried() {
    let token = CancelToken::new();
    let config = ExperimentConfig::new(16, 3).with_max_retries(5);
    let mut rng = RandomSource::from_seed(1);
    let mut oracle = CancellingOracle {
        inner: IdealOracle::from_seed(2),
        token: token.clone(),
    };

    let err = run_experiment(&config, &mut rng, &mut oracle, &token).unwrap_err();
    assert!(matches!(err, ProtocolError::CancellationRequested));
}

#[test]
fn density_matrix_oracle_detects_eve() {
    let config = ExperimentConfig::new(500, 20);
    let mut rng = RandomSource::from_seed(31);
    let mut oracle = DensityMatrixOracle::from_seed(32);

    let summary = run_experiment(&config, &mut rng, &mut oracle, &CancelToken::new()).unwrap();

    assert_eq!(summary.without_eve.mean_qber, 0.0);
    let with_eve = summary.with_eve.mean_qber;
    assert!((with_eve - 0.25).abs() < 0.05, "mean QBER with Eve {with_eve}");
}

#[test]
fn channel_noise_shows_without_eve() {
    let channel = QuantumChannel::depolarizing(0.2).unwrap();
    let config = ExperimentConfig::new(2_000, 10);
    let mut rng = RandomSource::from_seed(41);
    let mut oracle = DensityMatrixOracle::from_seed(42).with_channel(channel);

    let summary = run_experiment(&config, &mut rng, &mut oracle, &CancelToken::new()).unwrap();

    let without_eve = summary.without_eve.mean_qber;
    assert!((without_eve - 0.1).abs() < 0.03, "noise-only QBER {without_eve}");
    assert!(summary.with_eve.mean_qber > without_eve);
}

#[test]
fn configured_oracle_runs_end_to_end() {
    let config = ExperimentConfig::from_json_str(
        r#"{"n_bit": 200, "trials": 4, "seed": 9, "oracle": "density-matrix", "noise": 0.0}"#,
    )
    .unwrap();
    assert_eq!(config.oracle, OracleKind::DensityMatrix);

    let mut rng = RandomSource::from_seed(config.seed.unwrap());
    let mut backend = oracle::from_config(&config, &mut rng).unwrap();

    let summary =
        run_experiment(&config, &mut rng, backend.as_mut(), &CancelToken::new()).unwrap();

    assert_eq!(summary.n_bit, 200);
    assert_eq!(summary.without_eve.qber.len(), 4);
    assert_eq!(summary.without_eve.mean_qber, 0.0);
    assert!(summary.with_eve.sifted_bits() > 0);

    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("mean_qber"));
}
