use std::{
    env,
    fs::File,
    io::{ self, BufRead },
    path::{ Path, PathBuf },
    sync::{ mpsc, Arc, Mutex },
    thread,
};

use color_eyre::eyre::Result;
use perceptron::{
    analysis,
    display::{ format_factor, format_time },
    module::join_digits,
    script::{ ScriptRunner, HELP },
    PerceptronConfig,
    PerceptronModule,
};
use ui::{ editor::Editor, state::StatePerceptron, ui::App };

mod host;

const DEFAULT_CONFIG: &str = "perceptron.toml";
const DEFAULT_LOG: &str = "perceptron.log";
/// Id used in log lines; a single module runs per process.
const MODULE_ID: u32 = 1;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);
    let config_path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = PerceptronConfig::load(&config_path)?;

    match command {
        Some("play") | None => play(config),
        Some("script") => script(config),
        Some("analyze") => analyze(config),
        Some(other) => {
            println!("Invalid argument: {other} (expected play, script or analyze)");
            Ok(())
        }
    }
}

fn init_logging(file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    );
    if let Some(path) = file {
        builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.try_init()?;
    Ok(())
}

fn new_module(config: &PerceptronConfig) -> PerceptronModule<rand::rngs::StdRng> {
    let mut rng = config.rng();
    let environment = config.environment(&mut rng);
    PerceptronModule::new(MODULE_ID, rng, environment, config.judge_mode)
}

fn play(config: PerceptronConfig) -> Result<()> {
    let log_file = config.log_file.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_LOG));
    init_logging(Some(&log_file))?;

    let (tx, rx) = mpsc::channel();
    let (tx_control, rx_control) = mpsc::channel();
    let state_perceptron = Arc::new(Mutex::new(StatePerceptron::default()));

    let editor = Editor {
        rx,
        state: Arc::clone(&state_perceptron),
    };

    thread::spawn(move || {
        editor.listen_and_update();
    });

    let simulation = host::Simulation::new(new_module(&config), &config);
    thread::spawn(move || {
        simulation.run(rx_control, tx);
    });

    ui::launch(App::new(state_perceptron, tx_control))
}

fn script(config: PerceptronConfig) -> Result<()> {
    init_logging(config.log_file.as_deref())?;
    let mut runner = ScriptRunner::new(
        new_module(&config),
        config.tick_interval_ms,
        config.inspect_hold_ms
    );
    println!("{HELP}");

    let mut reported = 0;
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match runner.run_line(&line) {
            Ok(lines) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Err(err) => println!("{err}"),
        }
        for event in &runner.events()[reported..] {
            println!("{event:?}");
        }
        reported = runner.events().len();
    }
    Ok(())
}

fn analyze(config: PerceptronConfig) -> Result<()> {
    init_logging(config.log_file.as_deref())?;
    let module = new_module(&config);
    let data = module.data();
    let environment = module.environment();

    println!("indicators: {}", environment.indicators);
    println!("modules: {}", environment.active_modules);
    println!("inputs: {}", data.inputs_count);
    println!("outputs: {}", data.outputs_count);
    println!("accuracy: {}", data.required_accuracy);
    println!("time: {} s", format_time(module.judge().max_time));
    for (rate, delay) in data.convergence_rates.iter().zip(data.connections_delay.iter()) {
        println!("{} / {}", format_factor(*rate), format_factor(*delay));
    }
    println!("answer example: {}", join_digits(&data.answer_example));

    let census = analysis::census(data, environment);
    for (label, count) in [
        ("low accuracy, in time", census.low_accuracy_in_time),
        ("low accuracy, over time", census.low_accuracy_over_time),
        ("passing", census.passing),
        ("accurate, over time", census.accurate_over_time),
    ] {
        println!("{label}: {count} ({:.3}%)", census.share(count));
    }
    let solutions: Vec<String> = census.solutions.iter().map(join_digits).collect();
    println!("solutions: {}", solutions.join(" "));
    Ok(())
}
