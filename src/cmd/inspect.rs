use crate::reports;
use clap::Args;
use shotlens::analysis::{RallyBundle, RecommendationList};
use shotlens::config::EngineConfig;
use shotlens::error::SlResult;
use shotlens::session::AnalysisSession;
use strum::IntoEnumIterator;

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub config: EngineConfig,

    /// Stroke to show; defaults to stroke 2 (or 1 in a one-stroke rally).
    #[arg(short, long)]
    pub stroke: Option<usize>,

    /// Print the derived views as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: InspectArgs, bundle: RallyBundle, config: EngineConfig) -> SlResult<()> {
    let mut session = AnalysisSession::new(bundle, config);
    if let Some(stroke) = args.stroke {
        session.select_stroke(stroke)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.views())?);
        return Ok(());
    }

    reports::print_rally_header(session.bundle());
    reports::print_diagnostics(&session.bundle().diagnostics);

    let views = session.views();
    let Some(ctx) = session.context() else {
        println!(
            "\nNo analysis available for stroke {}.",
            views.stroke.map_or("-".to_string(), |s| s.to_string())
        );
        return Ok(());
    };

    if let Some(prediction) = &views.prediction {
        reports::print_prediction(ctx.stroke(), prediction);
    }
    for list in RecommendationList::iter() {
        reports::print_recommendations(list, ctx.analysis().recommendations(list));
    }
    if let Some(flow) = &views.flow {
        reports::print_flow(flow);
    }
    Ok(())
}
