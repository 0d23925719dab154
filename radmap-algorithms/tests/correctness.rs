#![allow(clippy::float_cmp, clippy::cast_possible_truncation)]
use radmap_algorithms::{
    aggregate, aggregate_parallel, CellAccumulators, DoseCalculator, SpatialBinner,
    ZeroDosePolicy,
};
use radmap_core::{
    AggregationConfig, DegenerateInput, Error, GridConfig, Location, Reading, Spectrum, Timestamp,
    CHANNEL_COUNT, OVERFLOW_CHANNEL,
};

fn reading(lat: f64, lon: f64, elapsed: u64, channels: &[(usize, u32)]) -> Reading {
    let mut histogram = vec![0; CHANNEL_COUNT];
    for &(channel, count) in channels {
        histogram[channel] = count;
    }
    Reading::new(
        Timestamp::default(),
        Location::fixed(lat, lon),
        Spectrum::new(elapsed, histogram).unwrap(),
    )
}

// A small survey track: three cells visited in an interleaved order.
fn survey() -> Vec<Reading> {
    let mut readings = Vec::new();
    for i in 0..60u32 {
        let (lat, lon) = match i % 3 {
            0 => (44.350_1, 26.049_1),
            1 => (44.352_3, 26.051_7),
            _ => (44.360_9, 26.043_2),
        };
        let channel = 80 + (i as usize * 13) % 900;
        readings.push(reading(
            lat,
            lon,
            u64::from(i % 4),
            &[(channel, i + 1), (OVERFLOW_CHANNEL, i % 2)],
        ));
    }
    readings
}

fn binner() -> SpatialBinner {
    SpatialBinner::new(GridConfig::default()).unwrap()
}

#[test]
fn test_accumulation_is_order_independent() {
    let readings = survey();

    let mut forward = CellAccumulators::new(binner());
    for r in &readings {
        forward.accumulate(r);
    }

    let mut reversed = CellAccumulators::new(binner());
    for r in readings.iter().rev() {
        reversed.accumulate(r);
    }

    // deterministic shuffle: stride through the sequence
    let mut strided = CellAccumulators::new(binner());
    let n = readings.len();
    for i in 0..n {
        strided.accumulate(&readings[(i * 7) % n]);
    }

    assert_eq!(forward, reversed);
    assert_eq!(forward, strided);
    assert_eq!(forward.len(), 3);
}

#[test]
fn test_parallel_matches_sequential() {
    let readings = survey();

    let mut sequential = CellAccumulators::new(binner());
    for r in &readings {
        sequential.accumulate(r);
    }
    let parallel = CellAccumulators::accumulate_parallel(binner(), &readings);
    assert_eq!(sequential, parallel);

    let a = aggregate(readings.clone(), AggregationConfig::default(), ZeroDosePolicy::Fail)
        .unwrap();
    let b = aggregate_parallel(&readings, AggregationConfig::default(), ZeroDosePolicy::Fail)
        .unwrap();
    assert_eq!(a.cells, b.cells);
}

#[test]
fn test_two_readings_accumulate_into_one_cell() {
    let readings = vec![
        reading(44.35, 26.05, 1, &[(0, 5)]),
        reading(44.35, 26.05, 2, &[(0, 3)]),
    ];
    let mut cells = CellAccumulators::new(binner());
    for r in &readings {
        cells.accumulate(r);
    }
    assert_eq!(cells.len(), 1);
    let (_, cell) = cells.iter().next().unwrap();
    assert_eq!(cell.total_elapsed_seconds(), 3);
    assert_eq!(cell.histogram_sum()[0], 8);
}

#[test]
fn test_normalized_output() {
    let output = aggregate(survey(), AggregationConfig::default(), ZeroDosePolicy::Fail).unwrap();
    assert_eq!(output.cells.len(), 3);

    let ones = output
        .cells
        .iter()
        .filter(|c| c.relative_intensity == 1.0)
        .count();
    assert_eq!(ones, 1);
    for cell in &output.cells {
        assert!((0.0..=1.0).contains(&cell.relative_intensity));
    }

    let report = output.map.report();
    assert_eq!(report.readings, 60);
    let (_, max_dose) = report.max_dose.unwrap();
    let top = output
        .cells
        .iter()
        .find(|c| c.relative_intensity == 1.0)
        .unwrap();
    assert_eq!(top.summary.dose_rate_usv_per_hour, max_dose);
}

#[test]
fn test_finalize_independent_of_other_cells() {
    let calc = DoseCalculator::default();
    let lone = vec![reading(44.35, 26.05, 1, &[(300, 9)])];
    let crowded = vec![
        reading(44.35, 26.05, 1, &[(300, 9)]),
        reading(44.45, 26.15, 1, &[(700, 100)]),
    ];

    let mut a = CellAccumulators::new(binner());
    let key = a.accumulate(&lone[0]);
    let mut b = CellAccumulators::new(binner());
    for r in &crowded {
        b.accumulate(r);
    }

    assert_eq!(
        calc.finalize(key, a.get(&key).unwrap()),
        calc.finalize(key, b.get(&key).unwrap())
    );
}

#[test]
fn test_overflow_only_cell_is_zero_dose() {
    let readings = vec![reading(44.35, 26.05, 1, &[(OVERFLOW_CHANNEL, 40)])];
    let err = aggregate(readings.clone(), AggregationConfig::default(), ZeroDosePolicy::Fail)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::DegenerateInput(DegenerateInput::ZeroDose)
    ));

    let output = aggregate(readings, AggregationConfig::default(), ZeroDosePolicy::AllZero).unwrap();
    let cell = &output.cells[0];
    assert_eq!(cell.summary.dose_rate_usv_per_hour, 0.0);
    assert_eq!(cell.summary.total_counts, 40.0);
    assert_eq!(cell.relative_intensity, 0.0);
}

#[test]
fn test_no_readings_is_degenerate() {
    let err = aggregate(Vec::new(), AggregationConfig::default(), ZeroDosePolicy::Fail).unwrap_err();
    assert!(matches!(err, Error::DegenerateInput(DegenerateInput::Empty)));
}
