//! Terminal rendering of run reports, session state and match lists.
//! Everything returns a `String`; the binary decides where it goes.

use std::fmt::Write;

use console::style;

use crate::config::CostEstimate;
use crate::pipeline::{BatchOutcome, FollowerSource};
use crate::session::{Session, SessionStats};
use crate::types::Match;

pub fn render_outcome(outcome: &BatchOutcome, session: &Session, keyword: &str) -> String {
    let mut out = String::new();

    match outcome {
        BatchOutcome::FollowersUnavailable { reason } => {
            let _ = writeln!(out, "{} Could not fetch followers: {reason}", style("✗").red());
        }
        BatchOutcome::AllProcessed { followers } => {
            out.push_str(&render_followers(session));
            let _ = writeln!(
                out,
                "{} All {followers} followers processed",
                style("✓").green()
            );
        }
        BatchOutcome::ProfilesUnavailable { requested, reason } => {
            out.push_str(&render_followers(session));
            let _ = writeln!(
                out,
                "{} Could not fetch {requested} profiles: {reason}",
                style("✗").red()
            );
            let _ = writeln!(
                out,
                "They stay pending. If this keeps happening for the same followers, use `refetch` or `reset`."
            );
        }
        BatchOutcome::Batch(report) => {
            match report.followers {
                FollowerSource::Fetched(n) => {
                    let _ = writeln!(out, "{} Fetched {n} followers", style("✓").green());
                }
                FollowerSource::Cached(n) => {
                    let _ = writeln!(out, "Using {n} cached followers");
                }
            }
            out.push_str(&render_followers(session));
            let _ = writeln!(
                out,
                "{} Fetched {} of {} requested profiles",
                style("✓").green(),
                report.fetched,
                report.requested
            );
            let _ = writeln!(
                out,
                "Filter {:?}: {} new / {} total",
                keyword,
                style(report.new_matches.len()).bold(),
                report.total_matches
            );
            if report.unreturned > 0 {
                let _ = writeln!(
                    out,
                    "{} {} requested profiles were not returned. They stay pending and are requested again on the next run.",
                    style("!").yellow(),
                    report.unreturned
                );
            }
            if outcome.has_more() {
                let _ = writeln!(
                    out,
                    "{} {} followers still pending. Run again to continue.",
                    style("…").yellow(),
                    report.remaining
                );
            } else if report.unreturned == report.requested {
                let _ = writeln!(
                    out,
                    "{} No requested profile came back. The pending followers may be unavailable; use `refetch` or `reset` to move on.",
                    style("!").yellow()
                );
            }
        }
    }

    out
}

fn render_followers(session: &Session) -> String {
    let (total, public, private) = session.follower_counts();
    let pending = session.pending_count();
    format!("Followers: {total} (public {public}, private {private}) | pending {pending} / {total}\n")
}

pub fn render_matches(matches: &[Match]) -> String {
    if matches.is_empty() {
        return "No matches yet.\n".to_string();
    }

    let public = matches.iter().filter(|m| !m.is_private).count();
    let mut out = format!(
        "{}\nTotal {} | public {} | private {}\n\n",
        style("Matches (cumulative)").bold(),
        matches.len(),
        public,
        matches.len() - public
    );

    for (i, m) in matches.iter().enumerate() {
        let tag = if m.is_private {
            style("private").red()
        } else {
            style("public").green()
        };
        let _ = writeln!(out, "{}. [{}] @{} - {}", i + 1, tag, m.username, m.full_name);
        let _ = writeln!(out, "   Bio: {}", m.bio.replace('\n', "\n        "));
        let _ = writeln!(out, "   URL: {}", m.profile_url);
        let _ = writeln!(out, "   Status: {}", m.status.label());
    }
    out
}

pub fn render_status(stats: &SessionStats, cost: Option<CostEstimate>) -> String {
    let target = if stats.target.is_empty() {
        "<none>"
    } else {
        stats.target.as_str()
    };

    let mut out = String::new();
    let _ = writeln!(out, "Target:    {target}");
    if let Some(at) = stats.updated_at {
        let _ = writeln!(out, "Updated:   {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    let _ = writeln!(out, "Followers: {}", stats.followers);
    let _ = writeln!(out, "Processed: {}", stats.processed);
    let _ = writeln!(out, "Pending:   {}", stats.pending);
    let _ = writeln!(
        out,
        "Matches:   {} (public {}, private {})",
        stats.matches, stats.public_matches, stats.private_matches
    );
    if let Some(cost) = cost {
        let _ = writeln!(
            out,
            "Estimated cost per run: followers ~${:.2}, profiles ~${:.2}",
            cost.followers_usd, cost.profiles_usd
        );
    }
    out
}
