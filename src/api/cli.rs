//! Command Line - flags, subcommands and their handlers

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use super::form::FormSession;
use super::presenter::{render_json, render_result, render_trace, CheckReport};
use crate::constants;
use crate::logic::artifacts::{self, ArtifactPaths};
use crate::logic::features::input::{
    EducationStage, Gender, Medication, SchoolSupport, YesNo, AGE_RANGE, SCORE_RANGE,
};
use crate::logic::features::{EncodingPolicy, FormInput, MissingFieldPolicy};
use crate::logic::model::ThresholdConfig;
use crate::logic::pipeline::{PipelineOptions, PredictionContext};

#[derive(Debug, Parser)]
#[command(
    name = "adhd-predictor",
    version,
    about = "Interactive ADHD prediction form over a pretrained classifier",
    long_about = "Collects the form fields, reproduces the training-time encoding and \
        scaling, and reports the classifier's probability and label.\n\n\
        EXAMPLES:\n\
        \n  adhd-predictor                                 Start the interactive form\n\
        \n  adhd-predictor predict --age 12 --inattention 8  One-shot prediction\n\
        \n  adhd-predictor check --json                    Verify and fingerprint artifacts\n\
        \n  adhd-predictor --columns demos/artifacts/columns.json \
        --encoded-columns demos/artifacts/encoded_columns.json \
        --scaler demos/artifacts/scaler.json --model demos/artifacts/model.json\n\
        \n                                                 Run against the bundled demo artifacts"
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive form (default)
    Form(OutputArgs),

    /// Predict once from flags
    Predict(PredictArgs),

    /// Verify artifacts and print their fingerprints
    Check(OutputArgs),
}

/// Artifact locations and pipeline options
#[derive(Debug, Clone, Default, Args)]
pub struct ArtifactArgs {
    /// Raw column list [env: ADHD_COLUMNS]
    #[arg(long, global = true)]
    pub columns: Option<PathBuf>,

    /// Encoded column list [env: ADHD_ENCODED_COLUMNS]
    #[arg(long, global = true)]
    pub encoded_columns: Option<PathBuf>,

    /// Fitted scaler [env: ADHD_SCALER]
    #[arg(long, global = true)]
    pub scaler: Option<PathBuf>,

    /// Classifier: .onnx for ONNX Runtime, .json for a linear model [env: ADHD_MODEL]
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Decision threshold, label is positive when p > threshold [env: ADHD_THRESHOLD]
    #[arg(long, global = true, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Reference-level policy: schema | observed [env: ADHD_ENCODING]
    #[arg(long, global = true)]
    pub encoding: Option<EncodingPolicy>,
}

impl ArtifactArgs {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            columns: self.columns.clone().unwrap_or_else(constants::get_columns_path),
            encoded_columns: self
                .encoded_columns
                .clone()
                .unwrap_or_else(constants::get_encoded_columns_path),
            scaler: self.scaler.clone().unwrap_or_else(constants::get_scaler_path),
            model: self.model.clone().unwrap_or_else(constants::get_model_path),
        }
    }

    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            threshold: ThresholdConfig::new(self.threshold.unwrap_or_else(constants::get_threshold)),
            encoding: self.encoding.unwrap_or_else(constants::get_encoding_policy),
            missing: MissingFieldPolicy::ZeroFill,
        }
    }
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("threshold must be within 0-1, got {}", value));
    }
    Ok(value)
}

#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Also print every encoded and scaled model input
    #[arg(long)]
    pub explain: bool,
}

/// Form fields as flags, defaults match the interactive form
#[derive(Debug, Clone, Args)]
pub struct FieldArgs {
    #[arg(long, default_value_t = 25,
          value_parser = clap::value_parser!(u8).range(i64::from(AGE_RANGE.0)..=i64::from(AGE_RANGE.1)))]
    pub age: u8,

    #[arg(long, default_value = "Male")]
    pub gender: Gender,

    #[arg(long, default_value = "Child")]
    pub education_stage: EducationStage,

    #[arg(long, default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(i64::from(SCORE_RANGE.0)..=i64::from(SCORE_RANGE.1)))]
    pub inattention: u8,

    #[arg(long, default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(i64::from(SCORE_RANGE.0)..=i64::from(SCORE_RANGE.1)))]
    pub hyperactivity: u8,

    #[arg(long, default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(i64::from(SCORE_RANGE.0)..=i64::from(SCORE_RANGE.1)))]
    pub impulsivity: u8,

    /// 3.0-12.0, step 0.5
    #[arg(long, default_value_t = 7.0)]
    pub sleep_hours: f64,

    /// 0.0-18.0, step 0.5
    #[arg(long, default_value_t = 4.0)]
    pub screen_time_hours: f64,

    #[arg(long, default_value = "No")]
    pub medication: Medication,

    #[arg(long, default_value = "None")]
    pub school_support: SchoolSupport,

    #[arg(long, default_value = "No")]
    pub family_history: YesNo,

    #[arg(long, default_value = "No")]
    pub daydreaming: YesNo,

    #[arg(long, default_value = "No")]
    pub rsd: YesNo,

    #[arg(long, default_value = "No")]
    pub comorbid_anxiety: YesNo,

    #[arg(long, default_value = "No")]
    pub comorbid_depression: YesNo,
}

impl FieldArgs {
    pub fn to_form(&self) -> FormInput {
        FormInput {
            age: self.age,
            gender: self.gender,
            education_stage: self.education_stage,
            inattention: self.inattention,
            hyperactivity: self.hyperactivity,
            impulsivity: self.impulsivity,
            sleep_hours: self.sleep_hours,
            screen_time_hours: self.screen_time_hours,
            medication: self.medication,
            school_support: self.school_support,
            family_history: self.family_history,
            daydreaming: self.daydreaming,
            rsd: self.rsd,
            comorbid_anxiety: self.comorbid_anxiety,
            comorbid_depression: self.comorbid_depression,
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Startup check + load. Nothing else runs if this fails.
pub fn load_context(args: &ArtifactArgs) -> anyhow::Result<PredictionContext> {
    let paths = args.paths();
    log::info!("Artifacts: {:?}", paths);

    let loaded = artifacts::load(&paths).context("cannot start without the training artifacts")?;
    Ok(PredictionContext::new(loaded, args.options()))
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = load_context(&cli.artifacts)?;

    match cli.command.unwrap_or(Command::Form(OutputArgs::default())) {
        Command::Form(output) => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            FormSession::new(&ctx, output.json)
                .run(stdin.lock(), &mut stdout)
                .context("form session failed")?;
        }
        Command::Predict(args) => {
            let form = args.fields.to_form();
            let trace = ctx.trace(&form).context("prediction failed")?;

            if args.explain {
                print!("{}", render_trace(&ctx, &trace));
            }
            if args.output.json {
                println!("{}", render_json(&trace.result)?);
            } else {
                println!("{}", render_result(&trace.result));
            }
        }
        Command::Check(output) => {
            let report = CheckReport::from_context(&ctx);
            if output.json {
                println!("{}", render_json(&report)?);
            } else {
                println!("{}", report.render());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_defaults_match_form_defaults() {
        let cli = Cli::try_parse_from(["adhd-predictor", "predict"]).unwrap();
        match cli.command {
            Some(Command::Predict(args)) => assert_eq!(args.fields.to_form(), FormInput::default()),
            other => panic!("expected predict, got {:?}", other),
        }
    }

    #[test]
    fn test_predict_field_flags() {
        let cli = Cli::try_parse_from([
            "adhd-predictor", "predict",
            "--age", "80",
            "--gender", "female",
            "--school-support", "504",
            "--medication", "Non-stimulant",
            "--rsd", "Yes",
        ])
        .unwrap();

        let Some(Command::Predict(args)) = cli.command else {
            panic!("expected predict");
        };
        let form = args.fields.to_form();
        assert_eq!(form.age, 80);
        assert_eq!(form.gender, Gender::Female);
        assert_eq!(form.school_support, SchoolSupport::Section504);
        assert_eq!(form.medication, Medication::NonStimulant);
        assert_eq!(form.rsd, YesNo::Yes);
    }

    #[test]
    fn test_out_of_range_flags_rejected() {
        assert!(Cli::try_parse_from(["adhd-predictor", "predict", "--age", "4"]).is_err());
        assert!(Cli::try_parse_from(["adhd-predictor", "predict", "--age", "81"]).is_err());
        assert!(Cli::try_parse_from(["adhd-predictor", "predict", "--impulsivity", "11"]).is_err());
        assert!(Cli::try_parse_from(["adhd-predictor", "predict", "--gender", "x"]).is_err());
        assert!(Cli::try_parse_from(["adhd-predictor", "--threshold", "1.5"]).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "adhd-predictor", "check",
            "--model", "/tmp/m.json",
            "--threshold", "0.7",
            "--encoding", "observed",
        ])
        .unwrap();

        assert_eq!(cli.artifacts.paths().model, PathBuf::from("/tmp/m.json"));
        let options = cli.artifacts.options();
        assert_eq!(options.threshold.base_threshold, 0.7);
        assert_eq!(options.encoding, EncodingPolicy::Observed);
    }

    #[test]
    fn test_missing_artifacts_stop_before_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let paths = crate::logic::testing::write_artifacts(dir.path());
        std::fs::remove_file(&paths.scaler).unwrap();

        let args = ArtifactArgs {
            columns: Some(paths.columns.clone()),
            encoded_columns: Some(paths.encoded_columns.clone()),
            scaler: Some(paths.scaler.clone()),
            model: Some(paths.model.clone()),
            ..Default::default()
        };

        let err = load_context(&args).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("missing required artifacts"));
        assert!(chain.contains("scaler.json"));
    }

    #[test]
    fn test_off_step_hours_rejected_by_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let paths = crate::logic::testing::write_artifacts(dir.path());
        let args = ArtifactArgs {
            columns: Some(paths.columns),
            encoded_columns: Some(paths.encoded_columns),
            scaler: Some(paths.scaler),
            model: Some(paths.model),
            ..Default::default()
        };
        let ctx = load_context(&args).unwrap();

        let cli = Cli::try_parse_from(["adhd-predictor", "predict", "--sleep-hours", "7.3"]).unwrap();
        let Some(Command::Predict(predict)) = cli.command else {
            panic!("expected predict");
        };
        assert!(ctx.trace(&predict.fields.to_form()).is_err());
    }

    #[test]
    fn test_demo_invocation_loads_bundled_artifacts() {
        use clap::CommandFactory;

        let about = Cli::command().get_long_about().map(|a| a.to_string()).unwrap_or_default();
        assert!(about.contains("--model demos/artifacts/model.json"));

        let demo = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/artifacts");
        let arg = |name: &str| demo.join(name).display().to_string();
        let cli = Cli::try_parse_from([
            "adhd-predictor".to_string(), "predict".to_string(),
            "--columns".to_string(), arg("columns.json"),
            "--encoded-columns".to_string(), arg("encoded_columns.json"),
            "--scaler".to_string(), arg("scaler.json"),
            "--model".to_string(), arg("model.json"),
        ])
        .unwrap();

        let ctx = load_context(&cli.artifacts).unwrap();
        assert_eq!(ctx.raw_schema().len(), 17);
        assert_eq!(ctx.encoded_schema().len(), 24);
        assert!(ctx.predict(&FormInput::default()).is_ok());
    }
}
