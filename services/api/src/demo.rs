use crate::infra::{
    load_history, load_scholarships, parse_date, InMemoryApplicationHistory,
    InMemoryScholarshipCatalog,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use scholarship_ai::error::AppError;
use scholarship_ai::workflows::scholarship::{
    ApplicantId, ApplicantProfile, ApplicationId, ApplicationStatus, DocumentStatus,
    HistoricalApplication, InMemoryModelRepository, ModelScope, ModelSelector, ModelStore,
    PredictionResult, PredictionService, Scholarship, ScholarshipId, ScholarshipServices,
    SubmittedDocument, TrainingConfig, TrainingReport, TrainingService, WeightCache, YearLevel,
};
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_TRAINER: &str = "demo";
const CLASSIFICATIONS: [YearLevel; 4] = [
    YearLevel::Freshman,
    YearLevel::Sophomore,
    YearLevel::Junior,
    YearLevel::Senior,
];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// JSON scholarship catalog (defaults to the bundled sample programs)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// CSV export of decided applications; a synthetic cohort is generated when omitted
    #[arg(long)]
    pub(crate) history: Option<PathBuf>,
    /// Size of the synthetic cohort
    #[arg(long, default_value_t = 160)]
    pub(crate) cohort: usize,
    /// Seed for cohort generation and the train/test split
    #[arg(long, default_value_t = 7)]
    pub(crate) seed: u64,
    /// Scholarship to score the demo applicant against
    #[arg(long, default_value = "merit-2025")]
    pub(crate) scholarship: String,
    /// Demo applicant GWA (1.0 best, 5.0 failing)
    #[arg(long, default_value_t = 1.5)]
    pub(crate) gwa: f64,
    /// Demo applicant annual family income
    #[arg(long, default_value_t = 180_000.0)]
    pub(crate) income: f64,
    /// Date the cohort was submitted (YYYY-MM-DD). Defaults to 30 days ago.
    #[arg(long, value_parser = parse_date)]
    pub(crate) submitted_on: Option<NaiveDate>,
}

type DemoServices =
    ScholarshipServices<InMemoryScholarshipCatalog, InMemoryApplicationHistory, InMemoryModelRepository>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let scholarships = load_scholarships(args.catalog.as_deref())?;
    let mut applications = load_history(args.history.as_deref())?;
    let synthetic = applications.is_empty();
    if synthetic {
        let submitted_on = args
            .submitted_on
            .unwrap_or_else(|| Local::now().date_naive() - Duration::days(30));
        applications = synthetic_cohort(&scholarships, args.cohort, args.seed, submitted_on);
    }

    println!("Scholarship approval prediction demo");
    println!(
        "Loaded {} scholarships and {} historical applications ({})",
        scholarships.len(),
        applications.len(),
        if synthetic { "synthetic cohort" } else { "imported" }
    );

    let scopes: Vec<ModelScope> = std::iter::once(ModelScope::Global)
        .chain(
            scholarships
                .iter()
                .map(|scholarship| ModelScope::Scholarship(scholarship.id.clone())),
        )
        .collect();

    let catalog = Arc::new(InMemoryScholarshipCatalog::from_scholarships(scholarships));
    let history = Arc::new(InMemoryApplicationHistory::from_applications(applications));
    let config = TrainingConfig {
        seed: Some(args.seed),
        ..TrainingConfig::default()
    };
    let services = build_services(catalog.clone(), history, config);

    if let Some(seeded) = services.training.ensure_global_model()? {
        println!("Seeded default global model {}", seeded.id);
    }

    println!("\nTraining");
    for scope in &scopes {
        render_training_report(&services.training.train_scope(scope, DEMO_TRAINER));
    }

    let applicant = demo_applicant(args.gwa, args.income);
    catalog.insert_applicant(applicant.clone())?;
    let scholarship_id = ScholarshipId(args.scholarship);

    match services
        .prediction
        .eligibility_check(&applicant, &scholarship_id)
    {
        Ok(eligibility) => {
            println!(
                "\nEligibility for {}: {}% ({}/{} checks)",
                scholarship_id, eligibility.percentage, eligibility.passed_count, eligibility.total_count
            );
            for check in &eligibility.checks {
                println!(
                    "  [{}] {:<30} applicant: {:<14} required: {}",
                    if check.passed { "x" } else { " " },
                    check.criterion,
                    check.applicant_value,
                    check.required_value
                );
            }
        }
        Err(err) => println!("\nEligibility unavailable: {err}"),
    }

    let prediction = services
        .prediction
        .predict_for_applicant(&applicant.applicant_id, &scholarship_id)?;
    render_prediction(&prediction);

    Ok(())
}

fn build_services(
    catalog: Arc<InMemoryScholarshipCatalog>,
    history: Arc<InMemoryApplicationHistory>,
    config: TrainingConfig,
) -> DemoServices {
    let store = Arc::new(ModelStore::new(
        Arc::new(InMemoryModelRepository::default()),
        Arc::new(WeightCache::new()),
    ));
    let selector = Arc::new(ModelSelector::with_threshold(
        store.clone(),
        history.clone(),
        config.min_samples,
    ));
    ScholarshipServices {
        prediction: PredictionService::new(catalog.clone(), selector),
        training: TrainingService::new(catalog, history, store, config),
    }
}

fn demo_applicant(gwa: f64, income: f64) -> ApplicantProfile {
    ApplicantProfile {
        applicant_id: ApplicantId("demo-applicant".to_string()),
        gwa: Some(gwa),
        classification: Some(YearLevel::Junior),
        college: Some("College of Engineering".to_string()),
        course: Some("BS Electrical Engineering".to_string()),
        citizenship: Some("Filipino".to_string()),
        annual_family_income: Some(income),
        has_failing_grade: Some(false),
        has_disciplinary_action: Some(false),
        has_other_scholarship: Some(false),
        documents: vec![
            SubmittedDocument {
                document_type: "transcript".to_string(),
                status: DocumentStatus::Verified,
            },
            SubmittedDocument {
                document_type: "income_certificate".to_string(),
                status: DocumentStatus::Pending,
            },
        ],
        ..ApplicantProfile::default()
    }
}

/// Decided applications whose outcome mostly follows the scholarship's own criteria.
fn synthetic_cohort(
    scholarships: &[Scholarship],
    size: usize,
    seed: u64,
    submitted_on: NaiveDate,
) -> Vec<HistoricalApplication> {
    let mut rng = StdRng::seed_from_u64(seed);
    let colleges = ["College of Engineering", "College of Science", "College of Arts"];
    let mut cohort = Vec::with_capacity(size);

    for index in 0..size {
        let Some(scholarship) = scholarships.get(index % scholarships.len().max(1)) else {
            break;
        };
        let gwa: f64 = rng.gen_range(1.0..3.5);
        let income: f64 = rng.gen_range(40_000.0..600_000.0);
        let classification = CLASSIFICATIONS.choose(&mut rng).copied();
        let college = colleges.choose(&mut rng).map(|name| name.to_string());
        let mut documents = Vec::new();
        for document in &scholarship.required_documents {
            if !rng.gen_bool(0.8) {
                continue;
            }
            let status = if rng.gen_bool(0.7) {
                DocumentStatus::Verified
            } else {
                DocumentStatus::Pending
            };
            documents.push(SubmittedDocument {
                document_type: document.clone(),
                status,
            });
        }

        let snapshot = ApplicantProfile {
            applicant_id: ApplicantId(format!("cohort-{index:04}")),
            gwa: Some((gwa * 100.0).round() / 100.0),
            classification,
            college,
            citizenship: Some("Filipino".to_string()),
            annual_family_income: Some(income.round()),
            has_failing_grade: Some(rng.gen_bool(0.1)),
            has_disciplinary_action: Some(rng.gen_bool(0.05)),
            has_other_scholarship: Some(rng.gen_bool(0.1)),
            documents,
            ..ApplicantProfile::default()
        };

        let criteria = &scholarship.criteria;
        let within_gwa = criteria.max_gwa.map_or(true, |ceiling| gwa <= ceiling);
        let within_income = criteria
            .max_annual_family_income
            .map_or(true, |ceiling| income <= ceiling);
        let approved = if within_gwa && within_income {
            rng.gen_bool(0.85)
        } else {
            rng.gen_bool(0.05)
        };

        cohort.push(HistoricalApplication {
            application_id: ApplicationId(format!("hist-{index:05}")),
            scholarship_id: scholarship.id.clone(),
            status: if approved {
                ApplicationStatus::Approved
            } else {
                ApplicationStatus::Rejected
            },
            applicant_snapshot: snapshot,
            submitted_on,
        });
    }

    cohort
}

fn render_training_report(report: &TrainingReport) {
    let status = match serde_json::to_value(report.status) {
        Ok(serde_json::Value::String(label)) => label,
        _ => format!("{:?}", report.status),
    };
    print!("  {:<28} {:<18} samples {:>4}", report.scope.to_string(), status, report.samples);
    match (&report.metrics, &report.training_stats) {
        (Some(metrics), Some(stats)) => println!(
            "  accuracy {:.2}  f1 {:.2}  train accuracy {:.2}  converged at epoch {}",
            metrics.accuracy, metrics.f1_score, stats.train_accuracy, metrics.convergence_epoch
        ),
        _ => println!("  {}", report.message),
    }
}

fn render_prediction(prediction: &PredictionResult) {
    if let Some(reason) = &prediction.degraded {
        println!("\nPrediction degraded: {reason:?}");
        return;
    }

    println!(
        "\nApproval probability for {}: {:.1}% ({:?}, {:?} confidence)",
        prediction.scholarship_id,
        prediction.probability * 100.0,
        prediction.predicted_outcome,
        prediction.confidence
    );
    if let (Some(model_type), Some(model_id)) = (&prediction.model_type, &prediction.model_id) {
        println!("Served by {model_type:?} model {model_id}");
    }
    println!("Top contributing features:");
    for contribution in prediction.feature_contributions.iter().take(5) {
        println!(
            "  {:<22} value {:.2}  weight {:+.3}  contribution {:+.3}",
            contribution.feature.to_string(),
            contribution.value,
            contribution.weight,
            contribution.contribution
        );
    }
}
