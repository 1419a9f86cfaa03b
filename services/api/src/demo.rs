use crate::infra::{demo_engagement, InMemoryEngagementStore, InMemoryNotifier, DEMO_ENGAGEMENT};
use clap::Args;
use client_engagement::config::AssessmentConfig;
use client_engagement::error::AppError;
use client_engagement::workflows::assessment::{
    normalize, score, AssessmentService, AssessmentWorkflow, BatchRecommendation,
    EngagementId, EngagementStore, IntakeBatch, IntakeForm, RecommendationInput,
    RecommendationOutput, Remedy, WorkflowStage,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct RecommendArgs {
    /// Exported intake CSV (needs separated by ';'); every row is scored
    #[arg(
        long,
        conflicts_with_all = [
            "current_state",
            "needs",
            "website_scope",
            "marketing_timing",
            "budget_range",
            "timeline",
            "target_date",
        ]
    )]
    pub(crate) csv: Option<PathBuf>,
    /// scratch, basics, refresh or marketing_only
    #[arg(long)]
    pub(crate) current_state: Option<String>,
    /// Comma separated need tags, e.g. website,seo
    #[arg(long, value_delimiter = ',')]
    pub(crate) needs: Vec<String>,
    /// compact, standard, comprehensive or extensive
    #[arg(long)]
    pub(crate) website_scope: Option<String>,
    /// foundation_first, together or ongoing
    #[arg(long)]
    pub(crate) marketing_timing: Option<String>,
    /// Budget band (foundation_budget, growth_budget, performance_budget, unsure or 1-3)
    #[arg(long)]
    pub(crate) budget_range: Option<String>,
    /// asap, normal, patient or specific_date
    #[arg(long)]
    pub(crate) timeline: Option<String>,
    /// Target launch date (YYYY-MM-DD), required with specific_date
    #[arg(long)]
    pub(crate) target_date: Option<String>,
    /// Print the full recommendation payload as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl RecommendArgs {
    fn form(&self) -> IntakeForm {
        IntakeForm {
            current_state: self.current_state.clone(),
            needs: self.needs.clone(),
            website_scope: self.website_scope.clone(),
            marketing_timing: self.marketing_timing.clone(),
            budget_range: self.budget_range.clone(),
            timeline_expectation: self.timeline.clone(),
            target_date: self.target_date.clone(),
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the number of remedies allowed before the workflow restarts
    #[arg(long)]
    pub(crate) max_attempts: Option<u8>,
    /// Print the workflow snapshot after every step
    #[arg(long)]
    pub(crate) show_snapshots: bool,
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    if let Some(path) = args.csv.as_ref() {
        let batch = IntakeBatch::from_path(path)?;
        render_batch(&batch, args.json);
        return Ok(());
    }

    let input = normalize(&args.form())?;
    let output = score(&input);
    if args.json {
        print_json("Recommendation", &output);
    } else {
        render_recommendation(&input, &output);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        max_attempts,
        show_snapshots,
    } = args;

    let store = Arc::new(InMemoryEngagementStore::seeded([demo_engagement()]));
    let notifier = Arc::new(InMemoryNotifier::default());
    let mut config = AssessmentConfig::default();
    if let Some(max_attempts) = max_attempts {
        config.max_resolution_attempts = max_attempts.max(1);
    }
    let service = AssessmentService::new(store.clone(), notifier.clone(), config);
    let engagement_id = EngagementId(DEMO_ENGAGEMENT.to_string());

    println!("Tier 1 assessment demo");
    let mut workflow = match service.begin(&engagement_id) {
        Ok(workflow) => workflow,
        Err(err) => {
            println!("  Unable to start assessment: {}", err);
            return Ok(());
        }
    };

    let form = demo_form();
    println!("\nIntake form");
    println!(
        "- scope: {} | timing: {} | budget: {} | timeline: {}",
        form.website_scope.as_deref().unwrap_or("-"),
        form.marketing_timing.as_deref().unwrap_or("-"),
        form.budget_range.as_deref().unwrap_or("-"),
        form.timeline_expectation.as_deref().unwrap_or("-"),
    );
    if let Err(err) = service.submit(&mut workflow, &form) {
        println!("  Submission rejected: {}", err);
        return Ok(());
    }
    render_stage(&workflow, show_snapshots);

    while workflow.stage() == WorkflowStage::Mismatch {
        let Some(mismatch) = workflow
            .recommendation()
            .and_then(|output| output.mismatch_type)
        else {
            break;
        };
        let remedy = Remedy::suggested_for(mismatch)[0];
        println!("\nApplying remedy: {}", remedy.label());
        if let Err(err) = service.apply_remedy(&mut workflow, remedy) {
            println!("  Remedy failed: {}", err);
            render_stage(&workflow, show_snapshots);
            return Ok(());
        }
        render_stage(&workflow, show_snapshots);
    }

    println!("\nAccepting recommendation");
    let record = match service.accept(&mut workflow) {
        Ok(record) => record,
        Err(err) => {
            println!(
                "  Accept failed (retryable: {}): {}",
                err.is_retryable(),
                err
            );
            return Ok(());
        }
    };
    print_json("  Assessment record", &record.view());

    match store.get_engagement(&engagement_id) {
        Ok(Some(engagement)) => println!(
            "  Engagement '{}' now {:?} with package {}",
            engagement.title,
            engagement.status,
            engagement
                .recommended_package
                .map(|package| package.label())
                .unwrap_or("-")
        ),
        Ok(None) => println!("  Engagement lookup returned no record"),
        Err(err) => println!("  Engagement store unavailable: {}", err),
    }

    let events = notifier.events();
    if events.is_empty() {
        println!("  Notifications: none dispatched");
    } else {
        println!("  Notifications:");
        for event in events {
            println!(
                "  - {} -> {} ({} for '{}')",
                event.template,
                event.recipient,
                event.package.label(),
                event.title
            );
        }
    }

    Ok(())
}

/// Ambitious brief on a small budget: every conflict fires at once.
fn demo_form() -> IntakeForm {
    IntakeForm {
        current_state: Some("refresh".to_string()),
        needs: vec![
            "website".to_string(),
            "brand".to_string(),
            "seo".to_string(),
        ],
        website_scope: Some("extensive".to_string()),
        marketing_timing: Some("together".to_string()),
        budget_range: Some("foundation_budget".to_string()),
        timeline_expectation: Some("asap".to_string()),
        target_date: None,
    }
}

fn render_stage(workflow: &AssessmentWorkflow, show_snapshot: bool) {
    println!("  Stage: {}", workflow.stage());
    if let (Some(input), Some(output)) = (workflow.input(), workflow.recommendation()) {
        render_recommendation(input, output);
    }
    if show_snapshot {
        print_json("  Workflow snapshot", workflow);
    }
}

fn render_recommendation(input: &RecommendationInput, output: &RecommendationOutput) {
    println!(
        "  Package: {} | confidence {} ({}%) | budget aligned: {}",
        output.recommended_package.label(),
        output.confidence_level.label(),
        output.confidence_percent,
        output.budget_aligned
    );
    println!(
        "  Inputs: {} scope, {} budget, {} timeline",
        input.website_scope.label(),
        input.budget_range.label(),
        input.timeline_expectation.label()
    );
    println!("  - {}", output.reasoning.primary_factor);
    println!("  - {}", output.reasoning.budget_fit);
    println!("  - {}", output.reasoning.scope_fit);
    println!("  - {}", output.reasoning.timeline_fit);

    if let Some(mismatch) = output.mismatch_type {
        println!("  Mismatch: {}", mismatch.label());
        for remedy in Remedy::suggested_for(mismatch) {
            println!("    option: {}", remedy.label());
        }
    }
}

fn render_batch(batch: &[BatchRecommendation], json: bool) {
    let mut rejected = 0usize;
    for entry in batch {
        match &entry.result {
            Ok((input, output)) => {
                println!("\nRow {}", entry.row);
                if json {
                    print_json("  Recommendation", output);
                } else {
                    render_recommendation(input, output);
                }
            }
            Err(errors) => {
                rejected += 1;
                println!("\nRow {}: rejected", entry.row);
                for error in errors.iter() {
                    println!("  - {}: {}", error.field(), error);
                }
            }
        }
    }
    println!(
        "\n{} row(s) scored, {} rejected",
        batch.len() - rejected,
        rejected
    );
}

fn print_json<T: serde::Serialize>(heading: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}:\n{}", heading, json),
        Err(err) => println!("{} unavailable: {}", heading, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_engagement::workflows::assessment::{MismatchType, PackageTier};

    #[test]
    fn demo_form_opens_on_the_mismatch_screen() {
        let input = normalize(&demo_form()).expect("demo form is valid");
        let output = score(&input);

        assert_eq!(output.recommended_package, PackageTier::Growth);
        assert_eq!(output.mismatch_type, Some(MismatchType::TimelineUnrealistic));
    }

    #[test]
    fn recommend_flags_build_the_intake_form() {
        let args = RecommendArgs {
            current_state: Some("basics".to_string()),
            needs: vec!["website".to_string()],
            website_scope: Some("compact".to_string()),
            marketing_timing: Some("foundation_first".to_string()),
            budget_range: Some("1".to_string()),
            timeline: Some("normal".to_string()),
            ..RecommendArgs::default()
        };

        let input = normalize(&args.form()).expect("flags are valid");
        assert_eq!(score(&input).recommended_package, PackageTier::Foundation);
    }

    #[test]
    fn recommend_reports_validation_errors() {
        let args = RecommendArgs {
            website_scope: Some("huge".to_string()),
            ..RecommendArgs::default()
        };

        match run_recommend(args) {
            Err(AppError::Validation(errors)) => assert!(errors.len() >= 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn demo_runs_to_completion() {
        assert!(run_demo(DemoArgs::default()).is_ok());
    }
}
