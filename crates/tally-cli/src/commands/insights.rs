//! Panel commentary command

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tally_core::{
    AIClient, CommentaryBackend, CommentaryBoard, CommentaryRequest, Panel, PanelCommentary,
    PanelSnapshot, StateStore,
};

use super::{build_dashboard, print_json};

fn panel_title(panel: Panel) -> &'static str {
    match panel {
        Panel::Categories => "🗂️  Categories",
        Panel::Trend => "📈 Daily trend",
        Panel::Budgets => "💰 Budgets",
        Panel::Forecast => "🔮 Forecast",
    }
}

/// Request commentary for one panel, or every panel concurrently
///
/// A failing backend never fails the command; the affected panel prints
/// "analysis unavailable" instead.
pub async fn cmd_insights(
    store: &StateStore,
    ai: Option<&AIClient>,
    period: Option<&str>,
    panel: Option<&str>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let Some(client) = ai else {
        println!("💡 Tip: Set OLLAMA_HOST to enable insights");
        println!("   (or AI_BACKEND=openai_compatible with OPENAI_COMPATIBLE_HOST)");
        return Ok(());
    };

    let selected: Option<Panel> = panel.map(str::parse::<Panel>).transpose()?;
    let dashboard = build_dashboard(store, period, now)?;
    let board = Arc::new(CommentaryBoard::new());

    match selected {
        Some(panel) => match CommentaryRequest::for_panel(&dashboard, panel)? {
            Some(request) => {
                board.request(client, &request).await;
            }
            None => {
                board.clear(panel, dashboard.period);
            }
        },
        None => {
            for handle in board.refresh_all(client, &dashboard)? {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Commentary task failed");
                }
            }
        }
    }

    let panels: Vec<PanelSnapshot> = board
        .snapshot()
        .into_iter()
        .filter(|s| selected.map_or(true, |p| s.panel == p))
        .collect();

    if json {
        return print_json(&panels);
    }

    println!();
    println!("🤖 Insights");
    println!("   Period: {}", dashboard.period);
    println!("   Model: {} ({})", client.model(), client.host());
    println!("   ─────────────────────────────────────────────────────────────");

    for snapshot in &panels {
        println!();
        println!("   {}", panel_title(snapshot.panel));
        match &snapshot.commentary {
            PanelCommentary::Ready { text } => {
                for line in text.lines() {
                    println!("   {}", line);
                }
            }
            PanelCommentary::Unavailable { reason } => {
                debug!(panel = %snapshot.panel, %reason, "Commentary unavailable");
                println!("   analysis unavailable");
            }
            PanelCommentary::NoData => println!("   no data for this period"),
            PanelCommentary::Idle | PanelCommentary::Pending => println!("   (no response)"),
        }
    }

    Ok(())
}
