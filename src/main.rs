use clap::Parser;
use hardness_predictor::adapters::{csv_batch, input};
use hardness_predictor::utils::error::ErrorSeverity;
use hardness_predictor::utils::{logger, validation::Validate};
use hardness_predictor::{
    CliArgs, FeatureContract, ParameterMapping, PredictorFacade, Result,
};

fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting hardness-predict");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = run(&args) {
        tracing::error!(
            "❌ Prediction failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(args: &CliArgs) -> Result<()> {
    args.validate()?;
    let config = args.resolve_config()?;
    let contract = config.feature_contract()?;

    if args.print_contract {
        print_contract(&contract);
        return Ok(());
    }

    let facade = PredictorFacade::initialize_with_contract(config.model_path(), contract)?;
    tracing::info!("📦 Model loaded from: {}", config.model_path());

    let fitted = facade.model().feature_names();
    if fitted.as_slice() != facade.contract().required_fields() {
        tracing::warn!(
            "Model was fitted on {:?} but the contract lists {:?}; predictions will fail",
            fitted,
            facade.contract().required_fields()
        );
    }

    if let Some(batch_path) = &args.batch {
        let rows = csv_batch::read_mappings_from_file(facade.contract(), batch_path)?;
        tracing::info!("📄 Predicting {} rows from {}", rows.len(), batch_path.display());

        let results = csv_batch::predict_rows(&facade, rows);
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!("{} of {} rows could not be predicted", failed, results.len());
        }

        match &args.output {
            Some(path) => {
                csv_batch::write_results_to_file(path, &results)?;
                tracing::info!("📁 Results saved to: {}", path.display());
            }
            None => csv_batch::write_results(std::io::stdout().lock(), &results)?,
        }
        return Ok(());
    }

    let parameters = collect_parameters(args, facade.contract())?;
    for violation in facade.contract().out_of_range(&parameters) {
        tracing::warn!("⚠️ {}", violation);
    }

    let hardness = facade.predict(&parameters)?;
    println!("{}: {:.*}", config.label(), config.precision(), hardness);
    Ok(())
}

fn collect_parameters(args: &CliArgs, contract: &FeatureContract) -> Result<ParameterMapping> {
    if args.sample {
        return Ok(input::sample_steel());
    }

    let mut parameters = match &args.input {
        Some(path) => input::mapping_from_json_file(path)?,
        None => ParameterMapping::new(),
    };
    // --set 覆蓋 JSON 內的同名欄位
    parameters.extend(input::parse_assignments(contract, args.assignments.as_slice())?);
    Ok(parameters)
}

fn print_contract(contract: &FeatureContract) {
    println!("Expected features ({}):", contract.len());
    for (idx, spec) in contract.fields().iter().enumerate() {
        println!("  {:>2}. {:<20} {}", idx + 1, spec.name, spec.kind);
    }
}
