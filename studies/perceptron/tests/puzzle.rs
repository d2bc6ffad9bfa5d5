use perceptron::{
    analysis,
    module::Frame,
    scoring::{ accuracy, learning_time, ways_count, HIDDEN_LAYERS },
    train::Readout,
    Environment,
    JudgeMode,
    ModuleData,
    ModuleEvent,
    PerceptronModule,
    Stage,
    Verdict,
};
use rand::{ rngs::StdRng, SeedableRng };

const TICK: u64 = 16;

fn set_topology(module: &mut PerceptronModule<StdRng>, sizes: &[u32; HIDDEN_LAYERS]) {
    for (layer, size) in sizes.iter().enumerate() {
        while module.topology().hidden_layers()[layer] != *size {
            module.edit_hidden_layer(layer).unwrap();
        }
    }
}

/// Ticks until the run finishes, returning every frame produced.
fn run(module: &mut PerceptronModule<StdRng>, start: u64) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut now = start;
    while module.stage() == Stage::Running {
        now += TICK;
        frames.push(module.advance(now));
    }
    frames
}

#[test]
fn worked_example_scores() {
    let sizes = [1, 1, 1, 1];
    assert_eq!(ways_count(2, 2, &sizes), [2, 1, 1, 1, 2]);
    assert_eq!(accuracy(2, 2, &sizes, &[500, 400, 300, 200, 100]), 21);
    assert_eq!(learning_time(2, 2, &sizes, &[150; 5]), 12);
}

#[test]
fn answer_example_solves_every_generated_instance() {
    for seed in 0..150u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let environment = Environment::mock(&mut rng);
        let mode = if seed % 2 == 0 { JudgeMode::AtSubmission } else { JudgeMode::AtFinish };
        let mut module = PerceptronModule::new(seed as u32, rng, environment, mode);
        assert!(module.activate());

        let answer = module.data().answer_example;
        set_topology(&mut module, &answer);
        let submission = module.submit(5_000).unwrap();
        assert_eq!(submission.target_accuracy, module.data().accuracy(&answer));

        let frames = run(&mut module, 5_000);
        let events: Vec<ModuleEvent> = frames.iter().filter_map(|frame| frame.event).collect();
        assert_eq!(events, vec![ModuleEvent::Solved], "seed {seed}");
        assert!(module.is_solved());
    }
}

#[test]
fn readout_sequence_rises_to_the_exact_target() {
    let mut rng = StdRng::seed_from_u64(77);
    let environment = Environment::mock(&mut rng);
    let mut module = PerceptronModule::new(1, rng, environment, JudgeMode::AtFinish);
    module.activate();
    let submission = module.submit(0).unwrap();

    let frames = run(&mut module, 0);
    let readouts: Vec<Readout> = frames.iter().filter_map(|frame| frame.readout).collect();
    let mut last = 0;
    for readout in &readouts[..readouts.len() - 1] {
        match readout {
            Readout::Training { accuracy, .. } => {
                assert!(*accuracy >= last);
                assert!(*accuracy <= submission.target_accuracy);
                last = *accuracy;
            }
            Readout::Finished { .. } => panic!("finished twice"),
        }
    }
    assert_eq!(
        readouts.last(),
        Some(&(Readout::Finished {
            accuracy: submission.target_accuracy,
            time: submission.target_time,
        }))
    );
}

#[test]
fn accuracy_shortfall_strikes_even_with_time_to_spare() {
    let data = ModuleData {
        inputs_count: 2,
        outputs_count: 2,
        required_accuracy: 22,
        max_learning_time: 999,
        convergence_rates: [500, 400, 300, 200, 100],
        answer_example: [2, 1, 1, 1],
        connections_delay: [150; 5],
    };
    for mode in [JudgeMode::AtSubmission, JudgeMode::AtFinish] {
        let mut module = PerceptronModule::with_data(
            9,
            StdRng::seed_from_u64(4),
            data.clone(),
            Environment::new(1, 0),
            mode,
            [1, 1, 1, 1]
        );
        module.activate();
        let submission = module.submit(0).unwrap();
        assert_eq!(submission.target_accuracy, 21);
        assert!(submission.target_time < module.judge().max_time);

        let frames = run(&mut module, 0);
        let events: Vec<ModuleEvent> = frames.iter().filter_map(|frame| frame.event).collect();
        assert_eq!(events, vec![ModuleEvent::Strike]);
        assert_eq!(module.stage(), Stage::Finished(Verdict::Fail));

        // same instance, new topology
        assert!(module.reset());
        assert_eq!(module.data(), &data);
        set_topology(&mut module, &[2, 1, 1, 1]);
        module.submit(10_000).unwrap();
        let events: Vec<ModuleEvent> = run(&mut module, 10_000)
            .iter()
            .filter_map(|frame| frame.event)
            .collect();
        assert_eq!(events, vec![ModuleEvent::Solved]);
    }
}

#[test]
fn topology_is_frozen_while_training() {
    let rng = StdRng::seed_from_u64(15);
    let environment = Environment::new(20, 3);
    let mut module = PerceptronModule::new(2, rng, environment, JudgeMode::AtSubmission);
    module.activate();
    let before = *module.topology().hidden_layers();
    module.submit(0).unwrap();
    for layer in 0..HIDDEN_LAYERS {
        assert_eq!(module.edit_hidden_layer(layer), None);
    }
    assert_eq!(module.inspect_connection_layer(0), None);
    assert_eq!(module.topology().hidden_layers(), &before);

    // sweep never leaves the connection arrays
    for step in 1..2_000u64 {
        if let Some(touched) = module.advance(step).touched {
            let layer = module.topology().connection_layer(touched.layer).unwrap();
            assert!(touched.index < layer.len());
        }
    }
}

#[test]
fn census_lists_the_answer_example() {
    let mut rng = StdRng::seed_from_u64(31);
    let data = ModuleData::generate(&mut rng);
    let environment = Environment::mock(&mut rng);
    let census = analysis::census(&data, &environment);
    assert!(census.solutions.contains(&data.answer_example));
    assert_eq!(census.total(), 256);
}
