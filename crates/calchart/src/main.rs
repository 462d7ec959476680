use std::path::PathBuf;

use calchart_core::{ConfigManager, DotId, Editor, EditorEvent, Show, ShowManager};
use clap::Parser;

/// Recompute the movements of a drill show and report where dots collide.
#[derive(Parser, Debug)]
#[command(name = "calchart")]
#[command(about = "Calchart drill movement engine")]
struct Args {
    /// Show file to load
    show: PathBuf,

    /// Only report the sheet at this index
    #[arg(long)]
    sheet: Option<usize>,

    /// Settings file (default: config.json in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every dot, not just the ones that collide
    #[arg(short, long)]
    all: bool,

    /// Log recomputation and collision passes
    #[arg(short, long)]
    verbose: bool,
}

fn print_sheet(show: &Show, index: usize, all: bool) -> Result<(), anyhow::Error> {
    let id = show.sheet_id_at(index)?;
    let sheet = show.sheet(&id)?;
    println!(
        "Sheet {} ({} beats, {} continuities)",
        sheet.label(),
        sheet.num_beats(),
        sheet.all_continuities().values().map(Vec::len).sum::<usize>()
    );

    for dot in show.dots() {
        let collisions = sheet.collisions(dot.id).cloned().unwrap_or_default();
        if !all && collisions.is_empty() {
            continue;
        }
        let end = show.final_position(&id, dot.id)?;
        let beats: Vec<String> = collisions.iter().map(u32::to_string).collect();
        println!(
            "  {:>6}  ends at ({:.2}, {:.2}){}",
            dot.label,
            end.x,
            end.y,
            if beats.is_empty() {
                String::new()
            } else {
                format!("  collides on beats {}", beats.join(", "))
            }
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = ConfigManager::new(args.config.clone());
    let settings = config.load()?;

    let mut shows = ShowManager::new()?;
    let show = shows.load_show(&args.show)?.clone();
    log::info!(
        "Loaded show '{}' with {} dots and {} sheets",
        show.name,
        show.num_dots(),
        show.num_sheets()
    );

    let mut editor = Editor::new(show, settings).with_collision_queue();
    editor.recompute_all()?;
    editor.wait_for_collisions().await?;

    for event in editor.drain_events() {
        if let EditorEvent::CollisionsFailed { sheet, error, .. } = event {
            log::error!("Collision pass for sheet {} failed: {}", sheet, error);
        }
    }

    let show = editor.into_show();
    let sheets: Vec<usize> = match args.sheet {
        Some(index) => vec![index],
        None => (0..show.num_sheets()).collect(),
    };
    for index in sheets {
        print_sheet(&show, index, args.all)?;
    }

    let colliding = show
        .sheets()
        .filter(|sheet| {
            (0..show.num_dots()).any(|dot| {
                sheet
                    .collisions(DotId(dot))
                    .is_some_and(|beats| !beats.is_empty())
            })
        })
        .count();
    println!("{} of {} sheets have collisions", colliding, show.num_sheets());

    Ok(())
}
