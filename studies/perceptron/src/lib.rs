//! Puzzle engine of the perceptron module: instance generation, topology
//! scoring, the operator's topology editor and the cosmetic training run that
//! converges onto a precomputed accuracy and time.

pub mod analysis;
pub mod config;
pub mod data;
pub mod display;
pub mod environment;
pub mod error;
pub mod judge;
pub mod module;
pub mod rng;
pub mod scoring;
pub mod script;
pub mod topology;
pub mod train;

pub use config::PerceptronConfig;
pub use data::ModuleData;
pub use environment::Environment;
pub use judge::{ JudgeMode, SubmissionJudge, Verdict };
pub use module::{ ModuleEvent, PerceptronModule, Stage };
pub use topology::TopologyEditor;
pub use train::{ Millis, TrainingSimulator };
